//! Sign-in and logout.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::events::ProfileEvent;
use crate::router::Valid;
use crate::router::users::Profile;
use crate::user::UserBuilder;
use crate::{AppState, ServerError};

#[derive(Debug, Validate, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[validate(length(min = 1, max = 64, message = "ID must be 1 to 64 characters long."))]
    id: String,
    #[validate(length(min = 2, max = 50, message = "Name must be 2 to 50 characters long."))]
    full_name: String,
    #[validate(email(message = "Email must be formated."))]
    email: String,
    #[validate(length(min = 8, message = "Password must contain at least 8 characters."))]
    password: String,
    /// Keep the learner across restarts.
    #[serde(default)]
    remember: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct Logout {
    /// Page the learner was on.
    from: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Redirect {
    pub redirect: String,
}

/// Store the learner handed over by the login flow.
pub async fn create(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Profile>), ServerError> {
    let user = UserBuilder::new()
        .id(body.id)
        .email(body.email)
        .full_name(body.full_name)
        .password(body.password)
        .build();

    if !state.users().sign_in(&user, body.remember).await {
        return Err(ServerError::internal("user record could not be stored"));
    }

    let profile = Profile::new(&state, user).await;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Logout. Remote failures never keep the learner signed in.
pub async fn delete(State(state): State<AppState>, Query(query): Query<Logout>) -> Json<Redirect> {
    // An attempt in progress is abandoned.
    state.quiz.lock().await.take();

    let origin = query.from.unwrap_or_default();
    let redirect = state.users().logout(&origin).await;
    state.events.publish(ProfileEvent::SignedOut);

    Json(Redirect {
        redirect: redirect.path().to_owned(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new()
        // `POST /session` goes to `create`, `DELETE /session` to `delete`.
        .route("/", post(create).delete(delete))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::router::tests::{json, sign_in, state};
    use crate::storage::{Scope, keys};
    use crate::user::{AuthGateway, GatewayError};
    use crate::*;

    #[tokio::test]
    async fn test_remember_goes_durable() {
        let state = state();
        let body = serde_json::json!({
            "id": "ada42",
            "fullName": "Ada Lovelace",
            "email": "ada@example.com",
            "password": "Password1234",
            "remember": true,
        });

        let response =
            make_request(app(state.clone()), Method::POST, "/session", body.to_string()).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let profile: serde_json::Value = json(response).await;
        assert_eq!(profile["id"], "ada42");
        assert!(profile.get("password").is_none());

        assert!(state.store.contains(Scope::Durable, keys::CURRENT_USER).await);
        assert!(!state.store.contains(Scope::Session, keys::CURRENT_USER).await);
    }

    #[tokio::test]
    async fn test_logout() {
        let state = state();
        sign_in(&state).await;
        let mut events = state.events.subscribe();

        let response = make_request(
            app(state.clone()),
            Method::DELETE,
            "/session?from=/admin/users",
            String::default(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Redirect = json(response).await;
        assert_eq!(body.redirect, "/admin/login");
        assert_eq!(events.recv().await.unwrap(), ProfileEvent::SignedOut);
        assert!(!state.users().is_logged_in().await);
    }

    struct Unreachable;

    #[async_trait::async_trait]
    impl AuthGateway for Unreachable {
        async fn sign_out(&self) -> Result<(), GatewayError> {
            Err(GatewayError("connection refused".into()))
        }

        fn clear_authorization(&self) {}
    }

    #[tokio::test]
    async fn test_logout_when_backend_is_down() {
        let state = state().with_gateway(Arc::new(Unreachable));
        sign_in(&state).await;

        let response = make_request(
            app(state.clone()),
            Method::DELETE,
            "/session?from=/instructor/courses",
            String::default(),
        )
        .await;
        let body: Redirect = json(response).await;
        assert_eq!(body.redirect, "/instructor/login");
        assert!(!state.users().is_logged_in().await);
    }

    #[tokio::test]
    async fn test_logout_without_origin() {
        let state = state();

        let response =
            make_request(app(state), Method::DELETE, "/session", String::default()).await;
        let body: Redirect = json(response).await;
        assert_eq!(body.redirect, "/login");
    }
}
