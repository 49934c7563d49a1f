//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Snapshot store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// In-memory snapshot store configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// JSON file holding an array of trip snapshots loaded at startup.
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Default `tracing` filter directive, used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "wayfare=debug,tower_http=debug".to_string()
}

impl AppConfig {
    /// Loads configuration from config files and `WAYFARE__*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("WAYFARE").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Returns the `host:port` address the server binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        temp_env::with_vars_unset(
            [
                "WAYFARE__SERVER__HOST",
                "WAYFARE__SERVER__PORT",
                "WAYFARE__STORE__SEED_PATH",
                "WAYFARE__LOG__FILTER",
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(config.server.port, 8080);
                assert!(config.store.seed_path.is_none());
                assert_eq!(config.log.filter, "wayfare=debug,tower_http=debug");
            },
        );
    }

    #[test]
    fn test_load_from_env() {
        temp_env::with_vars(
            [
                ("WAYFARE__SERVER__HOST", Some("127.0.0.1")),
                ("WAYFARE__SERVER__PORT", Some("3000")),
                ("WAYFARE__STORE__SEED_PATH", Some("seed/trips.json")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.bind_address(), "127.0.0.1:3000");
                assert_eq!(
                    config.store.seed_path,
                    Some(PathBuf::from("seed/trips.json"))
                );
            },
        );
    }
}
