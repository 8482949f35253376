//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/default.toml, config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub remote: RemoteConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Local API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub host: String,
    /// Port number (e.g., 8787)
    pub port: u16,
}

/// Local cache database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
}

/// Remote document store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the document store API (e.g., "https://docs.example.com")
    pub base_url: String,
    /// Bearer token sent with every request
    pub api_key: Option<String>,
    /// Per-request timeout in seconds (default: 30)
    pub timeout_seconds: u64,
}

/// Synchronization tuning
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Maximum age of a cached record that is trusted without a remote check
    /// (default: 600 = 10 minutes)
    pub freshness_window_seconds: u64,
    /// Background bulk refresh interval in seconds, 0 disables it
    pub refresh_interval_seconds: u64,
    /// Run bulk ingestion once at startup
    pub ingest_on_startup: bool,
}

impl SyncConfig {
    pub fn freshness_window(&self) -> Duration {
        Duration::from_secs(self.freshness_window_seconds)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            freshness_window_seconds: 600,
            refresh_interval_seconds: 0,
            ingest_on_startup: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (GOODFOOD__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        Self::load_with(config::Environment::with_prefix("GOODFOOD"))
    }

    fn load_with(environment: config::Environment) -> Result<Self, crate::error::AppError> {
        use config::{Config, File};

        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8787)?
            .set_default("database.path", "data/goodfood.db")?
            .set_default("remote.timeout_seconds", 30)?
            .set_default("sync.freshness_window_seconds", 600)?
            .set_default("sync.refresh_interval_seconds", 0)?
            .set_default("sync.ingest_on_startup", true)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(environment.separator("__").try_parsing(true))
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub(crate) fn validate(&self) -> Result<(), crate::error::AppError> {
        if self.sync.freshness_window_seconds == 0 {
            return Err(crate::error::AppError::Config(
                "sync.freshness_window_seconds must be greater than 0".to_string(),
            ));
        }

        let base_url = url::Url::parse(&self.remote.base_url).map_err(|e| {
            crate::error::AppError::Config(format!("remote.base_url is not a valid URL: {e}"))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(crate::error::AppError::Config(format!(
                "remote.base_url must use http or https, got {}",
                base_url.scheme()
            )));
        }

        if self.remote.timeout_seconds == 0 {
            tracing::warn!("remote.timeout_seconds=0 disables the remote request timeout");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8787,
            },
            database: DatabaseConfig {
                path: PathBuf::from("/tmp/goodfood-test.db"),
            },
            remote: RemoteConfig {
                base_url: "https://docs.example.com".to_string(),
                api_key: None,
                timeout_seconds: 30,
            },
            sync: SyncConfig::default(),
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    #[test]
    fn environment_overrides_file_values() {
        let vars: config::Map<String, String> = [
            ("GOODFOOD__REMOTE__BASE_URL", "https://docs.example.com"),
            ("GOODFOOD__LOGGING__FORMAT", "json"),
            ("GOODFOOD__SYNC__FRESHNESS_WINDOW_SECONDS", "120"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

        let config =
            AppConfig::load_with(config::Environment::with_prefix("GOODFOOD").source(Some(vars)))
                .unwrap();

        assert_eq!(config.logging.format, "json");
        assert_eq!(config.remote.base_url, "https://docs.example.com");
        assert_eq!(config.sync.freshness_window(), Duration::from_secs(120));
    }

    #[test]
    fn validate_accepts_defaults() {
        let config = valid_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.sync.freshness_window(), Duration::from_secs(600));
    }

    #[test]
    fn validate_rejects_zero_freshness_window() {
        let mut config = valid_config();
        config.sync.freshness_window_seconds = 0;

        let error = config
            .validate()
            .expect_err("a zero freshness window must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("freshness_window_seconds")
        ));
    }

    #[test]
    fn validate_rejects_non_http_remote() {
        let mut config = valid_config();
        config.remote.base_url = "ftp://docs.example.com".to_string();

        let error = config
            .validate()
            .expect_err("non-http remotes must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message) if message.contains("http or https")
        ));
    }

    #[test]
    fn validate_rejects_garbage_remote() {
        let mut config = valid_config();
        config.remote.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
