//! Configuration module for twok.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::{Result, TwokError};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Rate limit for API endpoints (requests per minute per IP).
    #[serde(default = "default_api_rate_limit")]
    pub api_rate_limit: u32,
    /// Take the client address from X-Forwarded-For / X-Real-IP headers.
    ///
    /// Only enable this behind a reverse proxy that overwrites those headers.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_api_rate_limit() -> u32 {
    300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            api_rate_limit: default_api_rate_limit(),
            trust_proxy_headers: false,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file (or a connection URL for PostgreSQL).
    #[serde(default = "default_db_path")]
    pub path: String,
    /// Maximum number of pooled connections.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/twok.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// Upper bound for `board.items_per_page`.
pub const MAX_ITEMS_PER_PAGE: u32 = 1000;

/// Board behaviour configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BoardConfig {
    /// Number of entities returned per page.
    #[serde(default = "default_items_per_page")]
    pub items_per_page: u32,
    /// Minimum interval between two posts from the same IP, in milliseconds.
    #[serde(default = "default_post_time_limit_ms")]
    pub post_time_limit_ms: u64,
}

fn default_items_per_page() -> u32 {
    5
}

fn default_post_time_limit_ms() -> u64 {
    1000
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            items_per_page: default_items_per_page(),
            post_time_limit_ms: default_post_time_limit_ms(),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Path to the file storage directory.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_storage_path() -> String {
    "data/uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    10
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/twok.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Board behaviour.
    #[serde(default)]
    pub board: BoardConfig,
    /// File storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(TwokError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| TwokError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `TWOK_DATABASE_PATH`: Override the database path
    /// - `TWOK_PORT`: Override the HTTP port
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("TWOK_DATABASE_PATH") {
            if !path.is_empty() {
                self.database.path = path;
            }
        }
        if let Ok(port) = std::env::var("TWOK_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid TWOK_PORT"),
            }
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.board.items_per_page == 0 || self.board.items_per_page > MAX_ITEMS_PER_PAGE {
            return Err(TwokError::Config(format!(
                "board.items_per_page must be between 1 and {MAX_ITEMS_PER_PAGE}"
            )));
        }
        if self.database.max_connections == 0 {
            return Err(TwokError::Config(
                "database.max_connections must be greater than 0".to_string(),
            ));
        }
        if self.server.api_rate_limit == 0 {
            return Err(TwokError::Config(
                "server.api_rate_limit must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Board settings handed to the services that need them.
    pub fn board_settings(&self) -> BoardSettings {
        BoardSettings::from(&self.board)
    }
}

/// Runtime board settings.
///
/// Built once from [`BoardConfig`] and passed explicitly to the components
/// that paginate or throttle posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardSettings {
    /// Page size for all paginated listings.
    pub items_per_page: u32,
    /// Minimum interval between posts from one requester.
    pub post_time_limit: Duration,
}

impl From<&BoardConfig> for BoardSettings {
    fn from(config: &BoardConfig) -> Self {
        Self {
            items_per_page: config.items_per_page,
            post_time_limit: Duration::from_millis(config.post_time_limit_ms),
        }
    }
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self::from(&BoardConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert!(config.server.cors_origins.is_empty());
        assert_eq!(config.server.api_rate_limit, 300);
        assert!(!config.server.trust_proxy_headers);

        assert_eq!(config.database.path, "data/twok.db");
        assert_eq!(config.database.max_connections, 5);

        assert_eq!(config.board.items_per_page, 5);
        assert_eq!(config.board.post_time_limit_ms, 1000);

        assert_eq!(config.files.storage_path, "data/uploads");
        assert_eq!(config.files.max_upload_size_mb, 10);

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/twok.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 3000
cors_origins = ["http://localhost:5173"]
api_rate_limit = 60
trust_proxy_headers = true

[database]
path = "custom/forum.db"
max_connections = 10

[board]
items_per_page = 20
post_time_limit_ms = 5000

[files]
storage_path = "custom/uploads"
max_upload_size_mb = 2

[logging]
level = "debug"
file = "custom/logs/app.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.server.api_rate_limit, 60);
        assert!(config.server.trust_proxy_headers);

        assert_eq!(config.database.path, "custom/forum.db");
        assert_eq!(config.database.max_connections, 10);

        assert_eq!(config.board.items_per_page, 20);
        assert_eq!(config.board.post_time_limit_ms, 5000);

        assert_eq!(config.files.storage_path, "custom/uploads");
        assert_eq!(config.files.max_upload_size_mb, 2);

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/app.log");
    }

    #[test]
    fn test_parse_partial_config_uses_defaults() {
        let toml = r#"
[board]
items_per_page = 10
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.board.items_per_page, 10);
        assert_eq!(config.board.post_time_limit_ms, 1000);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = Config::parse("[server\nport = ");
        assert!(matches!(result, Err(TwokError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_page_size() {
        let mut config = Config::default();
        config.board.items_per_page = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_caps_page_size() {
        let mut config = Config::default();
        config.board.items_per_page = MAX_ITEMS_PER_PAGE;
        assert!(config.validate().is_ok());

        config.board.items_per_page = MAX_ITEMS_PER_PAGE + 1;
        assert!(matches!(config.validate(), Err(TwokError::Config(_))));
    }

    #[test]
    fn test_validate_default_is_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_board_settings_from_config() {
        let mut config = Config::default();
        config.board.items_per_page = 7;
        config.board.post_time_limit_ms = 1500;

        let settings = config.board_settings();
        assert_eq!(settings.items_per_page, 7);
        assert_eq!(settings.post_time_limit, Duration::from_millis(1500));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Config::load("/nonexistent/twok/config.toml");
        assert!(matches!(result, Err(TwokError::Io(_))));
    }
}
