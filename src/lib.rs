//! learnstate is a local learner agent: it keeps track of enrollments,
//! lesson progress, quiz results and certificates for the signed-in learner.

#![forbid(unsafe_code)]
pub mod catalog;
pub mod certificate;
pub mod clock;
pub mod config;
pub mod enrollment;
pub mod error;
pub mod events;
pub mod model;
pub mod progress;
pub mod quiz;
mod router;
pub mod storage;
pub mod telemetry;
pub mod user;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{Method, StatusCode, header};
use axum::{Router, middleware as AxumMiddleware};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};

pub use error::ServerError;

use crate::catalog::Catalog;
use crate::certificate::CertificateIssuer;
use crate::clock::{Clock, SystemClock};
use crate::config::Configuration;
use crate::enrollment::EnrollmentManager;
use crate::events::ProfileEvents;
use crate::progress::ProgressTracker;
use crate::quiz::{QuizEngine, QuizSession};
use crate::storage::{
    DEFAULT_CREDENTIALS, DEFAULT_DATABASE_NAME, DEFAULT_POOL_SIZE, MemoryStore, PostgresStore,
    SessionStore,
};
use crate::user::{AuthGateway, NoopGateway, UserRepository, UserService};

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    app.oneshot(
        Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Configuration>,
    pub store: SessionStore,
    pub catalog: Arc<Catalog>,
    pub clock: Arc<dyn Clock>,
    pub gateway: Arc<dyn AuthGateway>,
    pub events: ProfileEvents,
    /// At most one quiz attempt runs at a time.
    pub quiz: Arc<Mutex<Option<QuizSession>>>,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create a new [`AppState`] on the system clock with no remote backend.
    pub fn new(config: Arc<Configuration>, store: SessionStore, catalog: Catalog) -> Self {
        Self {
            config,
            store,
            catalog: Arc::new(catalog),
            clock: Arc::new(SystemClock),
            gateway: Arc::new(NoopGateway),
            events: ProfileEvents::default(),
            quiz: Arc::new(Mutex::new(None)),
            metrics: None,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_gateway(mut self, gateway: Arc<dyn AuthGateway>) -> Self {
        self.gateway = gateway;
        self
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn users(&self) -> UserService {
        UserService::new(
            self.store.clone(),
            Arc::clone(&self.clock),
            Arc::clone(&self.gateway),
        )
    }

    pub fn enrollment(&self) -> EnrollmentManager {
        EnrollmentManager::new(
            UserRepository::new(self.store.clone()),
            Arc::clone(&self.clock),
            self.config.policy.subscription_expiry,
        )
    }

    pub fn progress(&self) -> ProgressTracker {
        ProgressTracker::new(self.store.clone())
    }

    pub fn quizzes(&self) -> QuizEngine {
        QuizEngine::new(self.store.clone(), Arc::clone(&self.clock))
    }

    pub fn certificates(&self) -> CertificateIssuer {
        CertificateIssuer::new(
            self.progress(),
            self.quizzes(),
            Arc::clone(&self.clock),
            self.config.certificate.strategy,
        )
        .user_prefix(self.config.certificate.user_prefix)
    }

    /// Countdown tick of timed quizzes.
    pub fn quiz_tick(&self) -> Duration {
        Duration::from_millis(self.config.quiz.tick_ms)
    }
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Set a timeout.
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, Duration::from_secs(10)))
        // Remove senstive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
                .allow_headers(Any),
        );

    router::router(state.clone())
        .with_state(state)
        .route_layer(AxumMiddleware::from_fn(telemetry::track))
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state(
    config: Arc<Configuration>,
) -> Result<AppState, Box<dyn std::error::Error>> {
    let durable: Arc<dyn storage::KeyValueStore> = match config.postgres {
        Some(ref pg) => Arc::new(
            PostgresStore::connect(
                &pg.address,
                pg.username.as_deref().unwrap_or(DEFAULT_CREDENTIALS),
                pg.password.as_deref().unwrap_or(DEFAULT_CREDENTIALS),
                pg.database.as_deref().unwrap_or(DEFAULT_DATABASE_NAME),
                pg.pool_size.unwrap_or(DEFAULT_POOL_SIZE),
            )
            .await?,
        ),
        None => {
            tracing::warn!("missing `postgres` entry on `config.yaml` file, durable records stay in memory");
            Arc::new(MemoryStore::default())
        },
    };
    let store = SessionStore::new(durable, Arc::new(MemoryStore::default()));

    let catalog = Catalog::read(&config.catalog);

    Ok(AppState::new(config, store, catalog))
}
