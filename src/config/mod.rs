use std::env;
use std::time::Duration;

use crate::client::view::UpdateMatch;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}: {source}")]
    Missing {
        key: &'static str,
        source: env::VarError,
    },

    #[error("{key}: invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|source| ConfigError::Missing { key, source })
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// When unset, tasks live in process memory.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub body_limit_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").ok().filter(|v| !v.is_empty()),
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            body_limit_bytes: env::var("BODY_LIMIT_BYTES")
                .unwrap_or_else(|_| "65536".to_string())
                .parse()
                .unwrap_or(64 * 1024),
        })
    }
}

/// Terminal dashboard configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub api_url: String,
    pub poll_interval: Duration,
    pub update_match: UpdateMatch,
    pub identity_secret: String,
    /// ID token presented at sign-in; absent means sign-in fails.
    pub id_token: Option<String>,
}

impl DashboardConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let update_match = match env::var("RMDN_UPDATE_MATCH") {
            Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "RMDN_UPDATE_MATCH",
                value,
            })?,
            Err(_) => UpdateMatch::default(),
        };

        Ok(Self {
            api_url: env::var("RMDN_API_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            poll_interval: Duration::from_millis(
                env::var("RMDN_POLL_INTERVAL_MS")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            ),
            update_match,
            identity_secret: required("IDENTITY_SECRET")?,
            id_token: env::var("RMDN_ID_TOKEN").ok().filter(|v| !v.is_empty()),
        })
    }
}
