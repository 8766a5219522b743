/**
 * Server Configuration
 *
 * This module handles loading and validation of server configuration, and
 * the optional PostgreSQL connection.
 *
 * # Configuration Sources
 *
 * Applied in order, later sources winning:
 *
 * 1. Built-in defaults
 * 2. A TOML file, if `SOCIALHUB_CONFIG` names one
 * 3. Environment variables (a `.env` file is loaded first via `dotenv`)
 *
 * | Variable              | Default | Notes                                   |
 * |-----------------------|---------|-----------------------------------------|
 * | `SERVER_PORT`         | 3000    |                                         |
 * | `DATABASE_URL`        | unset   | unset means in-memory store             |
 * | `JWT_SECRET`          | dev key | set-but-empty is an error               |
 * | `WORKER_COUNT`        | 4       | at least 1                              |
 * | `TASK_QUEUE_CAPACITY` | 1024    | at least 1                              |
 * | `RUST_LOG`            | `info`  | `tracing-subscriber` filter directive   |
 *
 * # Error Handling
 *
 * Malformed values are a `ConfigError` and stop startup. A database that
 * cannot be reached is not: it is logged and the server falls back to the
 * in-memory store.
 */

use std::path::{Path, PathBuf};

use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;

/// Secret used when `JWT_SECRET` is not set at all
pub const DEVELOPMENT_JWT_SECRET: &str = "socialhub-development-secret";

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_WORKER_COUNT: usize = 4;
pub const DEFAULT_TASK_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Fully resolved server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub worker_count: usize,
    pub task_queue_capacity: usize,
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            jwt_secret: DEVELOPMENT_JWT_SECRET.to_string(),
            worker_count: DEFAULT_WORKER_COUNT,
            task_queue_capacity: DEFAULT_TASK_QUEUE_CAPACITY,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

/// Shape of the optional TOML file; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub database_url: Option<String>,
    pub jwt_secret: Option<String>,
    pub worker_count: Option<usize>,
    pub task_queue_capacity: Option<usize>,
    pub log_filter: Option<String>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

impl ServerConfig {
    /// Create a new ServerConfigBuilder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Load from `.env`, the optional TOML file and the process environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let file = match std::env::var("SOCIALHUB_CONFIG") {
            Ok(path) if !path.is_empty() => Some(FileConfig::read(Path::new(&path))?),
            _ => None,
        };

        Self::from_sources(file, |key| std::env::var(key).ok())
    }

    /// Merge defaults, an optional file and an environment lookup
    pub fn from_sources(
        file: Option<FileConfig>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let mut jwt_secret = None;

        if let Some(file) = file {
            if let Some(port) = file.port {
                config.port = port;
            }
            if file.database_url.is_some() {
                config.database_url = file.database_url;
            }
            jwt_secret = file.jwt_secret;
            if let Some(workers) = file.worker_count {
                config.worker_count = workers;
            }
            if let Some(capacity) = file.task_queue_capacity {
                config.task_queue_capacity = capacity;
            }
            if let Some(filter) = file.log_filter {
                config.log_filter = filter;
            }
        }

        if let Some(port) = env("SERVER_PORT") {
            config.port = parse_env("SERVER_PORT", port)?;
        }
        if let Some(url) = env("DATABASE_URL") {
            config.database_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        if let Some(secret) = env("JWT_SECRET") {
            jwt_secret = Some(secret);
        }
        if let Some(workers) = env("WORKER_COUNT") {
            config.worker_count = parse_env("WORKER_COUNT", workers)?;
        }
        if let Some(capacity) = env("TASK_QUEUE_CAPACITY") {
            config.task_queue_capacity = parse_env("TASK_QUEUE_CAPACITY", capacity)?;
        }
        if let Some(filter) = env("RUST_LOG") {
            config.log_filter = filter;
        }

        if let Some(secret) = jwt_secret {
            config.jwt_secret = secret;
        }

        config.validate()?;
        Ok(config)
    }

    /// True when no secret was configured and the built-in one is in use
    pub fn uses_development_secret(&self) -> bool {
        self.jwt_secret == DEVELOPMENT_JWT_SECRET
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidValue {
                key: "WORKER_COUNT",
                value: "0".to_string(),
            });
        }
        if self.task_queue_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "TASK_QUEUE_CAPACITY",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.jwt_secret = secret.into();
        self
    }

    pub fn worker_count(mut self, workers: usize) -> Self {
        self.config.worker_count = workers;
        self
    }

    pub fn task_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.task_queue_capacity = capacity;
        self
    }

    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.log_filter = filter.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Connect to PostgreSQL and run migrations
///
/// # Returns
///
/// - `Some(PgPool)` if the database is reachable
/// - `None` if no URL is configured or the connection fails
///
/// Migration failures are logged but do not discard the pool; the schema
/// may already be up to date.
pub async fn load_database(database_url: Option<&str>) -> Option<PgPool> {
    let Some(database_url) = database_url else {
        tracing::warn!("DATABASE_URL not set. Using in-memory notification store.");
        return None;
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Falling back to in-memory notification store.");
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}
