//! Profile edit.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Profile;
use crate::events::ProfileEvent;
use crate::model::{ProfilePatch, User};
use crate::router::Valid;
use crate::{AppState, ServerError};

#[derive(Debug, Validate, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[validate(length(min = 2, max = 50, message = "Name must be 2 to 50 characters long."))]
    full_name: Option<String>,
    #[validate(email(message = "Email must be formated."))]
    email: Option<String>,
    #[validate(length(min = 8, message = "Password must contain at least 8 characters."))]
    password: Option<String>,
}

pub async fn handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Valid(body): Valid<Body>,
) -> Result<Json<Profile>, ServerError> {
    let patch = ProfilePatch {
        full_name: body.full_name,
        email: body.email,
        password: body.password,
    };

    let users = state.users();
    if !users.update_profile(patch).await {
        return Err(ServerError::internal("profile could not be saved"));
    }
    state.events.publish(ProfileEvent::Updated { user_id: user.id });

    let user = users.current_user().await.ok_or(ServerError::Unauthorized)?;
    Ok(Json(Profile::new(&state, user).await))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::router::tests::{json, sign_in, state};
    use crate::*;

    #[tokio::test]
    async fn test_update_profile() {
        let state = state();
        sign_in(&state).await;
        let mut events = state.events.subscribe();

        let body = serde_json::json!({ "fullName": "Augusta Ada King" });
        let response =
            make_request(app(state.clone()), Method::PATCH, "/users/@me", body.to_string()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let profile: Profile = json(response).await;
        assert_eq!(profile.full_name, "Augusta Ada King");
        assert_eq!(profile.email, "ada@example.com");
        assert_eq!(profile.last_updated, Some(state.clock.now()));
        assert_eq!(
            events.recv().await.unwrap(),
            ProfileEvent::Updated { user_id: "ada42".into() }
        );
    }

    #[tokio::test]
    async fn test_short_password() {
        let state = state();
        sign_in(&state).await;

        let body = serde_json::json!({ "password": "short" });
        let response =
            make_request(app(state), Method::PATCH, "/users/@me", body.to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
