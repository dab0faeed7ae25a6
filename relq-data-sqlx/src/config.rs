use crate::error::{RepoResult, SqlxErrorExt};
use serde::Deserialize;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use std::sync::Once;
use std::time::Duration;

static DRIVERS: Once = Once::new();

/// Database section of the application configuration.
///
/// Deserializable so it can live inside an app's config file; `from_env`
/// covers the plain env-var case (`.env` loading is the embedding app's
/// concern).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            acquire_timeout_secs: 30,
        }
    }
}

impl DbConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Build from the `RELQ_DATABASE_URL` environment variable.
    pub fn from_env() -> RepoResult<Self> {
        let url = std::env::var("RELQ_DATABASE_URL")
            .map_err(|_| relq_data::Error::Binding("RELQ_DATABASE_URL is not set".into()))?;
        Ok(Self::new(url))
    }

    /// Open the process-wide pool. Drivers are installed on first call only;
    /// connections are created lazily as they are acquired.
    pub async fn connect(&self) -> RepoResult<AnyPool> {
        DRIVERS.call_once(sqlx::any::install_default_drivers);
        AnyPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
            .connect(&self.url)
            .await
            .map_err(|e| e.into_repo_error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = DbConfig::new("sqlite::memory:");
        assert_eq!(cfg.max_connections, 10);
        assert_eq!(cfg.acquire_timeout_secs, 30);
    }

    #[test]
    fn test_deserialize_partial_section() {
        let cfg: DbConfig =
            serde_json::from_str(r#"{"url": "sqlite::memory:", "max_connections": 2}"#).unwrap();
        assert_eq!(cfg.url, "sqlite::memory:");
        assert_eq!(cfg.max_connections, 2);
        assert_eq!(cfg.acquire_timeout_secs, 30);
    }
}
