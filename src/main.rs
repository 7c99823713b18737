use std::env;
use std::path::PathBuf;

use learnstate::config::Configuration;
use learnstate::{app, initialize_state, telemetry};
use opentelemetry::global;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Read configuration file. Let it in memory.
    let config = match env::var(CONFIG_PATH_ENV) {
        Ok(path) => Configuration::default().path(PathBuf::from(path)),
        Err(_) => Configuration::default(),
    }
    .read()?;

    // Initialize tracing and optional OTLP export.
    let endpoint = config.telemetry.otlp_endpoint.as_deref();
    let logs = endpoint.map(telemetry::setup_logging).transpose()?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(logs)
        .init();

    let tracer = endpoint.map(telemetry::setup_tracer).transpose()?;
    if let Some(ref provider) = tracer {
        global::set_tracer_provider(provider.clone());
    }

    let metrics = telemetry::setup_metrics_recorder()?;
    let state = initialize_state(config.clone()).await?.with_metrics(metrics);

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(
        port = config.port,
        version = config.version(),
        courses = state.catalog.courses().len(),
        "server listening"
    );

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(provider) = tracer {
        if let Err(err) = provider.shutdown() {
            tracing::warn!(error = ?err, "tracer provider did not shut down cleanly");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
