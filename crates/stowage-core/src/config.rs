//! Configuration module
//!
//! Settings are read from the process environment (after loading an optional
//! `.env` file). Unparseable numeric values fall back to their defaults; a
//! malformed `PORT` or `STOWAGE_BACKEND` is a hard error.

use std::env;

use crate::backend::StoreBackend;

const SERVER_HOST: &str = "0.0.0.0";
const SERVER_PORT: u16 = 5000;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const FOLDER_PATH: &str = "/tmp/files_manager";
const SESSION_TTL_SECONDS: i64 = 86_400;
const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;
const WORKER_MAX_WORKERS: usize = 2;
const WORKER_POLL_INTERVAL_MS: u64 = 1000;
const WORKER_JOB_TIMEOUT_SECONDS: u64 = 60;
const WORKER_MAX_RETRIES: i32 = 3;

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Raw service settings, see [`Config`] for the accessor API.
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub server_host: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub backend: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub folder_path: String,
    pub session_ttl_seconds: i64,
    pub max_upload_bytes: usize,
    pub worker_max_workers: usize,
    pub worker_poll_interval_ms: u64,
    pub worker_job_timeout_seconds: u64,
    pub worker_max_retries: i32,
    pub log_format: LogFormat,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServiceConfig>);

impl Config {
    fn inner(&self) -> &ServiceConfig {
        &self.0
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_host(&self) -> &str {
        &self.inner().server_host
    }

    pub fn server_port(&self) -> u16 {
        self.inner().server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().cors_origins
    }

    pub fn backend(&self) -> StoreBackend {
        self.inner().backend
    }

    pub fn database_url(&self) -> Option<&str> {
        self.inner().database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().db_timeout_seconds
    }

    pub fn folder_path(&self) -> &str {
        &self.inner().folder_path
    }

    pub fn session_ttl_seconds(&self) -> i64 {
        self.inner().session_ttl_seconds
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.inner().max_upload_bytes
    }

    pub fn worker_max_workers(&self) -> usize {
        self.inner().worker_max_workers
    }

    pub fn worker_poll_interval_ms(&self) -> u64 {
        self.inner().worker_poll_interval_ms
    }

    pub fn worker_job_timeout_seconds(&self) -> u64 {
        self.inner().worker_job_timeout_seconds
    }

    pub fn worker_max_retries(&self) -> i32 {
        self.inner().worker_max_retries
    }

    pub fn log_format(&self) -> LogFormat {
        self.inner().log_format
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let backend = match env::var("STOWAGE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StoreBackend::Postgres,
        };

        let log_format = match env::var("LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let config = ServiceConfig {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| SERVER_HOST.to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            backend,
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            folder_path: env::var("FOLDER_PATH")
                .ok()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| FOLDER_PATH.to_string()),
            session_ttl_seconds: env::var("SESSION_TTL_SECONDS")
                .unwrap_or_else(|_| SESSION_TTL_SECONDS.to_string())
                .parse()
                .unwrap_or(SESSION_TTL_SECONDS),
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| MAX_UPLOAD_BYTES.to_string())
                .parse()
                .unwrap_or(MAX_UPLOAD_BYTES),
            worker_max_workers: env::var("WORKER_MAX_WORKERS")
                .unwrap_or_else(|_| WORKER_MAX_WORKERS.to_string())
                .parse()
                .unwrap_or(WORKER_MAX_WORKERS),
            worker_poll_interval_ms: env::var("WORKER_POLL_INTERVAL_MS")
                .unwrap_or_else(|_| WORKER_POLL_INTERVAL_MS.to_string())
                .parse()
                .unwrap_or(WORKER_POLL_INTERVAL_MS),
            worker_job_timeout_seconds: env::var("WORKER_JOB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| WORKER_JOB_TIMEOUT_SECONDS.to_string())
                .parse()
                .unwrap_or(WORKER_JOB_TIMEOUT_SECONDS),
            worker_max_retries: env::var("WORKER_MAX_RETRIES")
                .unwrap_or_else(|_| WORKER_MAX_RETRIES.to_string())
                .parse()
                .unwrap_or(WORKER_MAX_RETRIES),
            log_format,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.backend == StoreBackend::Postgres {
            match self.database_url.as_deref() {
                None => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be set when using the postgres backend"
                    ))
                }
                Some(url) if !url.starts_with("postgres://") && !url.starts_with("postgresql://") => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ))
                }
                Some(_) => {}
            }
        }

        if self.worker_max_workers == 0 {
            return Err(anyhow::anyhow!("WORKER_MAX_WORKERS must be at least 1"));
        }

        if self.worker_job_timeout_seconds == 0 || self.db_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("timeouts must be greater than zero"));
        }

        if self.worker_max_retries < 0 {
            return Err(anyhow::anyhow!("WORKER_MAX_RETRIES cannot be negative"));
        }

        if self.session_ttl_seconds <= 0 {
            return Err(anyhow::anyhow!("SESSION_TTL_SECONDS must be positive"));
        }

        if self.folder_path.trim().is_empty() {
            return Err(anyhow::anyhow!("FOLDER_PATH cannot be empty"));
        }

        Ok(())
    }
}

impl Default for ServiceConfig {
    /// In-memory configuration with every default applied.
    fn default() -> Self {
        Self {
            server_host: SERVER_HOST.to_string(),
            server_port: SERVER_PORT,
            cors_origins: vec!["*".to_string()],
            backend: StoreBackend::Memory,
            database_url: None,
            db_max_connections: MAX_CONNECTIONS,
            db_timeout_seconds: CONNECTION_TIMEOUT_SECS,
            folder_path: FOLDER_PATH.to_string(),
            session_ttl_seconds: SESSION_TTL_SECONDS,
            max_upload_bytes: MAX_UPLOAD_BYTES,
            worker_max_workers: WORKER_MAX_WORKERS,
            worker_poll_interval_ms: WORKER_POLL_INTERVAL_MS,
            worker_job_timeout_seconds: WORKER_JOB_TIMEOUT_SECONDS,
            worker_max_retries: WORKER_MAX_RETRIES,
            log_format: LogFormat::Pretty,
        }
    }
}
