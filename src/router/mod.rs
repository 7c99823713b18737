//! HTTP surface over the learner state.
pub mod courses;
pub mod session;
pub mod status;
pub mod users;

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum::routing::get;
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::model::{Course, CourseId};
use crate::{AppState, ServerError};

/// JSON body checked with [`validator`] before reaching the handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Valid<T>(pub T);

impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(Valid(value))
    }
}

/// Custom middleware loading the signed-in learner.
///
/// A stored record that cannot be read is treated as nobody.
pub async fn signed_in(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let user = state
        .users()
        .current_user()
        .await
        .ok_or(ServerError::Unauthorized)?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Catalog entry for `course_id`.
pub fn course(state: &AppState, course_id: CourseId) -> Result<&Course, ServerError> {
    state
        .catalog
        .course(course_id)
        .ok_or(ServerError::NotAvailable("course"))
}

/// Refuse content the learner neither enrolled in nor subscribed to.
pub async fn require_access(state: &AppState, course_id: CourseId) -> Result<(), ServerError> {
    if state.enrollment().can_access(course_id).await {
        Ok(())
    } else {
        Err(ServerError::Forbidden {
            reason: "enroll or subscribe to open this course",
            redirect: Some(format!("/courses/{course_id}")),
        })
    }
}

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        // `GET /status.json` goes to `status`.
        .route("/status.json", get(status::status))
        // `GET /metrics` renders Prometheus metrics.
        .route("/metrics", get(status::metrics))
        .nest("/session", session::router())
        .nest("/users", users::router(state.clone()))
        .nest("/courses", courses::router(state))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;
    use serde::de::DeserializeOwned;

    use crate::catalog::tests::catalog;
    use crate::clock::FixedClock;
    use crate::config::Configuration;
    use crate::storage::SessionStore;
    use crate::*;

    /// In-memory state on a frozen clock.
    pub fn state() -> AppState {
        AppState::new(
            Arc::new(Configuration::default()),
            SessionStore::in_memory(),
            catalog(),
        )
        .with_clock(Arc::new(FixedClock::default_instant()))
    }

    pub async fn json<T: DeserializeOwned>(response: axum::http::Response<axum::body::Body>) -> T {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    /// Sign Ada in for the session only.
    pub async fn sign_in(state: &AppState) {
        let body = serde_json::json!({
            "id": "ada42",
            "fullName": "Ada Lovelace",
            "email": "ada@example.com",
            "password": "Password1234",
        });
        let response =
            make_request(app(state.clone()), Method::POST, "/session", body.to_string()).await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_signed_in_required() {
        let state = state();

        let response =
            make_request(app(state), Method::GET, "/users/@me", String::default()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let state = state();
        let body = serde_json::json!({
            "id": "ada42",
            "fullName": "Ada Lovelace",
            "email": "not an email",
            "password": "Password1234",
        });

        let response =
            make_request(app(state), Method::POST, "/session", body.to_string()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = json(response).await;
        assert_eq!(body["errors"][0]["field"], "email");
    }
}
