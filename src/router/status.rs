//! Public status page for front-end identification.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::{AppState, ServerError};

/// Structured configuration.
#[derive(Debug, Serialize, Deserialize)]
pub struct Status {
    version: String,
    name: String,
    url: String,
    courses: usize,
}

/// Public server status.
pub async fn status(State(state): State<AppState>) -> Json<Status> {
    Json(Status {
        version: state.config.version().to_owned(),
        name: state.config.name.clone(),
        url: state.config.url.clone(),
        courses: state.catalog.courses().len(),
    })
}

/// Prometheus text exposition.
pub async fn metrics(State(state): State<AppState>) -> Result<String, ServerError> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or(ServerError::NotAvailable("metrics"))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::router::tests::{json, state};
    use crate::*;

    #[tokio::test]
    async fn test_status() {
        let app = app(state());

        let response = make_request(app, Method::GET, "/status.json", String::default()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Status = json(response).await;
        assert_eq!(body.name, env!("CARGO_PKG_NAME"));
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(body.courses, 2);
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let app = app(state());

        let response = make_request(app, Method::GET, "/metrics", String::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
