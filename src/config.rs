//! Configuration module for cloudnest.

use serde::Deserialize;
use std::path::Path;

use crate::{CloudError, Result};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins (empty = permissive development mode).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Metadata store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/cloudnest.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Which blob store implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Objects are files under `bucket_path`.
    Local,
    /// Objects live in process memory (development only).
    Memory,
}

/// Blob store and quota configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Blob store backend.
    #[serde(default = "default_storage_backend")]
    pub backend: StorageBackend,
    /// Root directory of the local bucket.
    #[serde(default = "default_bucket_path")]
    pub bucket_path: String,
    /// Maximum size of a single upload in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Nominal per-user storage limit in megabytes.
    #[serde(default = "default_quota_limit")]
    pub quota_limit_mb: u64,
    /// Usage above this many megabytes shows the quota banner.
    #[serde(default = "default_quota_warning")]
    pub quota_warning_mb: u64,
    /// Interval of the orphaned blob sweep in seconds (0 = disabled).
    #[serde(default = "default_orphan_sweep_interval")]
    pub orphan_sweep_interval_secs: u64,
}

fn default_storage_backend() -> StorageBackend {
    StorageBackend::Local
}

fn default_bucket_path() -> String {
    "data/bucket".to_string()
}

fn default_max_upload_size() -> u64 {
    10
}

fn default_quota_limit() -> u64 {
    50
}

fn default_quota_warning() -> u64 {
    45
}

fn default_orphan_sweep_interval() -> u64 {
    3600 // 1 hour
}

impl StorageConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            bucket_path: default_bucket_path(),
            max_upload_size_mb: default_max_upload_size(),
            quota_limit_mb: default_quota_limit(),
            quota_warning_mb: default_quota_warning(),
            orphan_sweep_interval_secs: default_orphan_sweep_interval(),
        }
    }
}

/// Session provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Shared secret used to verify session tokens.
    #[serde(default)]
    pub jwt_secret: String,
    /// Lifetime of tokens minted by `SessionProvider::issue`, in seconds.
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,
    /// Name of the cookie carrying the session token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Route unauthenticated page requests are redirected to.
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

fn default_token_expiry() -> u64 {
    3600
}

fn default_cookie_name() -> String {
    "cloudnest_session".to_string()
}

fn default_login_path() -> String {
    "/login".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_secs: default_token_expiry(),
            cookie_name: default_cookie_name(),
            login_path: default_login_path(),
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
    "logs/cloudnest.log".to_string()
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
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Blob storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(CloudError::Io)?;
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
        toml::from_str(s).map_err(|e| CloudError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `CLOUDNEST_JWT_SECRET`: Override the session token secret
    pub fn apply_env_overrides(&mut self) {
        if let Ok(jwt_secret) = std::env::var("CLOUDNEST_JWT_SECRET") {
            if !jwt_secret.is_empty() {
                self.session.jwt_secret = jwt_secret;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the session secret is not set
    /// - the quota warning threshold exceeds the quota limit
    /// - the login path is not an absolute route
    pub fn validate(&self) -> Result<()> {
        if self.session.jwt_secret.is_empty() {
            return Err(CloudError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via CLOUDNEST_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.storage.quota_warning_mb > self.storage.quota_limit_mb {
            return Err(CloudError::Config(format!(
                "quota_warning_mb ({}) must not exceed quota_limit_mb ({})",
                self.storage.quota_warning_mb, self.storage.quota_limit_mb
            )));
        }
        if !self.session.login_path.starts_with('/') {
            return Err(CloudError::Config(
                "login_path must start with '/'".to_string(),
            ));
        }
        Ok(())
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

        assert_eq!(config.database.path, "data/cloudnest.db");

        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert_eq!(config.storage.bucket_path, "data/bucket");
        assert_eq!(config.storage.max_upload_size_mb, 10);
        assert_eq!(config.storage.quota_limit_mb, 50);
        assert_eq!(config.storage.quota_warning_mb, 45);
        assert_eq!(config.storage.orphan_sweep_interval_secs, 3600);

        assert!(config.session.jwt_secret.is_empty());
        assert_eq!(config.session.token_expiry_secs, 3600);
        assert_eq!(config.session.cookie_name, "cloudnest_session");
        assert_eq!(config.session.login_path, "/login");

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.file, "logs/cloudnest.log");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 3000
cors_origins = ["http://localhost:3000"]

[database]
path = "custom/meta.sqlite"

[storage]
backend = "memory"
bucket_path = "custom/bucket"
max_upload_size_mb = 20
quota_limit_mb = 100
quota_warning_mb = 90
orphan_sweep_interval_secs = 0

[session]
jwt_secret = "test-secret-key"
token_expiry_secs = 600
cookie_name = "sid"
login_path = "/signin"

[logging]
level = "debug"
file = "custom/logs/app.log"
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.cors_origins, vec!["http://localhost:3000"]);

        assert_eq!(config.database.path, "custom/meta.sqlite");

        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.bucket_path, "custom/bucket");
        assert_eq!(config.storage.max_upload_size_mb, 20);
        assert_eq!(config.storage.max_upload_size_bytes(), 20 * 1024 * 1024);
        assert_eq!(config.storage.quota_limit_mb, 100);
        assert_eq!(config.storage.quota_warning_mb, 90);
        assert_eq!(config.storage.orphan_sweep_interval_secs, 0);

        assert_eq!(config.session.jwt_secret, "test-secret-key");
        assert_eq!(config.session.token_expiry_secs, 600);
        assert_eq!(config.session.cookie_name, "sid");
        assert_eq!(config.session.login_path, "/signin");

        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.file, "custom/logs/app.log");
    }

    #[test]
    fn test_parse_partial_config() {
        let toml = r#"
[server]
port = 9000

[storage]
quota_warning_mb = 40
"#;

        let config = Config::parse(toml).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.storage.quota_warning_mb, 40);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.quota_limit_mb, 50);
        assert_eq!(config.database.path, "data/cloudnest.db");
    }

    #[test]
    fn test_parse_empty_config() {
        let config = Config::parse("").unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.path, "data/cloudnest.db");
    }

    #[test]
    fn test_parse_invalid_config() {
        let result = Config::parse("this is not valid toml [[[");

        assert!(result.is_err());
        if let Err(CloudError::Config(msg)) = result {
            assert!(msg.contains("config parse error"));
        } else {
            panic!("Expected Config error");
        }
    }

    #[test]
    fn test_parse_unknown_backend() {
        let result = Config::parse("[storage]\nbackend = \"s3\"\n");
        assert!(matches!(result, Err(CloudError::Config(_))));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let result = Config::load("nonexistent.toml");

        assert!(matches!(result, Err(CloudError::Io(_))));
    }

    #[test]
    fn test_apply_env_overrides_jwt_secret() {
        let original = std::env::var("CLOUDNEST_JWT_SECRET").ok();

        std::env::set_var("CLOUDNEST_JWT_SECRET", "env-secret-key");

        let mut config = Config::default();
        config.apply_env_overrides();

        assert_eq!(config.session.jwt_secret, "env-secret-key");

        if let Some(val) = original {
            std::env::set_var("CLOUDNEST_JWT_SECRET", val);
        } else {
            std::env::remove_var("CLOUDNEST_JWT_SECRET");
        }
    }

    #[test]
    fn test_validate_requires_secret() {
        let config = Config::default();
        let result = config.validate();
        assert!(matches!(result, Err(CloudError::Config(msg)) if msg.contains("jwt_secret")));
    }

    #[test]
    fn test_validate_warning_above_limit() {
        let mut config = Config::default();
        config.session.jwt_secret = "secret".to_string();
        config.storage.quota_warning_mb = 60;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_login_path() {
        let mut config = Config::default();
        config.session.jwt_secret = "secret".to_string();
        config.session.login_path = "login".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_ok() {
        let mut config = Config::default();
        config.session.jwt_secret = "secret".to_string();

        assert!(config.validate().is_ok());
    }
}
