use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use rtdb_protocol::Endpoint;

use crate::error::{DbError, DbResult};

/// Settings for a [`DatabaseClient`](crate::DatabaseClient).
///
/// Loaded from TOML or built in code; the base URL is fixed once the client
/// is constructed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the database, e.g. `https://my-db.example.com`.
    pub database_url: String,
    /// Identity the backend's security rules should evaluate requests as.
    pub auth_override: Option<serde_json::Value>,
    pub request_timeout_ms: u64,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            database_url: "http://127.0.0.1:9000".into(),
            auth_override: None,
            request_timeout_ms: 30_000,
            user_agent: rtdb_protocol::http::DEFAULT_USER_AGENT.into(),
        }
    }
}

impl ClientConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    pub fn from_toml_str(s: &str) -> DbResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| DbError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> DbResult<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| DbError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> DbResult<()> {
        if self.database_url.trim().is_empty() {
            return Err(DbError::Config("database_url must not be empty".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(DbError::Config("request_timeout_ms must be positive".into()));
        }
        self.endpoint().map(|_| ())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// The endpoint every reference of the client resolves against.
    pub fn endpoint(&self) -> DbResult<Endpoint> {
        let auth_override = match &self.auth_override {
            Some(value) => Some(
                serde_json::to_string(value).map_err(|e| DbError::Config(e.to_string()))?,
            ),
            None => None,
        };
        Ok(Endpoint::new(&self.database_url)?.with_auth_override(auth_override))
    }
}
