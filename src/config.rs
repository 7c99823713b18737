//! Configuration manager for learnstate.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::AppState;
use crate::catalog::DEFAULT_CATALOG_PATH;
use crate::certificate::{CertificateStrategy, DEFAULT_USER_PREFIX};
use crate::enrollment::SubscriptionPolicy;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TICK_MS: u64 = 1000;
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Public URL of current instance.
    pub url: String,
    /// Listening port.
    pub port: u16,
    /// Read-only course and quiz catalog.
    pub catalog: PathBuf,
    #[serde(skip_deserializing)]
    version: String,
    #[serde(skip)]
    path: PathBuf,
    /// Related to PostgreSQL configuration. Durable scope stays in memory
    /// without it.
    #[serde(skip_serializing)]
    pub postgres: Option<Postgres>,
    /// Access policies.
    pub policy: Policy,
    /// Related to certificate ids.
    pub certificate: Certificate,
    /// Related to timed quizzes.
    pub quiz: QuizConfig,
    /// Related to OpenTelemetry export.
    #[serde(skip_serializing)]
    pub telemetry: Telemetry,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_owned(),
            url: String::default(),
            port: DEFAULT_PORT,
            catalog: PathBuf::from(DEFAULT_CATALOG_PATH),
            version: VERSION.to_owned(),
            path: PathBuf::default(),
            postgres: None,
            policy: Policy::default(),
            certificate: Certificate::default(),
            quiz: QuizConfig::default(),
            telemetry: Telemetry::default(),
        }
    }
}

/// PostgreSQL configuration.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct Postgres {
    /// Hostname:(?port) for PostgreSQL instance.
    pub address: String,
    /// Database name.
    pub database: Option<String>,
    /// Username credential to connect.
    pub username: Option<String>,
    /// Password credential to connect.
    pub password: Option<String>,
    /// Maximum pool connections.
    pub pool_size: Option<u32>,
}

#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Policy {
    pub subscription_expiry: SubscriptionPolicy,
}

/// Certificate id generation.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Certificate {
    pub strategy: CertificateStrategy,
    /// Characters of the user id kept in the id.
    pub user_prefix: usize,
}

impl Default for Certificate {
    fn default() -> Self {
        Self {
            strategy: CertificateStrategy::default(),
            user_prefix: DEFAULT_USER_PREFIX,
        }
    }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Countdown tick in milliseconds.
    pub tick_ms: u64,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Telemetry {
    /// gRPC endpoint of an OTLP collector.
    pub otlp_endpoint: Option<String>,
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    pub fn path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }

    /// Normalizes a URL string by ensuring it starts with a valid scheme
    /// (`http` or `https`).
    fn normalize_url(&self, url: &str) -> Result<String, url::ParseError> {
        let url_with_scheme =
            if url.starts_with("http://") || url.starts_with("https://") {
                url.to_string()
            } else {
                format!("http://{url}")
            };

        let parsed_url = Url::parse(&url_with_scheme)?;
        Ok(parsed_url.to_string())
    }

    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(self) -> Result<Arc<Self>, url::ParseError> {
        let file_path = if self.path.is_file() {
            &self.path
        } else {
            &Path::new(DEFAULT_CONFIG_PATH).to_path_buf()
        };

        match File::open(file_path) {
            Ok(file) => {
                let mut config: Configuration =
                    match serde_yaml::from_reader(file) {
                        Ok(config) => config,
                        Err(err) => {
                            return Ok(Arc::new(self.error(err)));
                        },
                    };

                // set app version.
                config.version = VERSION.to_owned();
                config.path = file_path.clone();

                if config.url.is_empty() {
                    config.url = format!("localhost:{}", config.port);
                }
                config.url = self.normalize_url(&config.url)?;

                if config.quiz.tick_ms == 0 {
                    tracing::warn!("`quiz.tick_ms` cannot be zero, using default");
                    config.quiz.tick_ms = DEFAULT_TICK_MS;
                }

                Ok(Arc::new(config))
            },
            Err(err) => Ok(Arc::new(self.error(err))),
        }
    }

    /// Return a default configuration as fallback.
    fn error(&self, err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file not found or invalid");
        Self::default()
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}
