//! Configuration management for the VIEWS forecast API
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with VFA__ prefix

use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

/// Deployment environments the service accepts
pub const ENVIRONMENTS: [&str; 3] = ["development", "staging", "production"];

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, staging, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// API surface configuration
    pub api: ApiConfig,

    /// CORS configuration
    pub cors: CorsConfig,

    /// Snapshot cache configuration
    pub cache: CacheConfig,

    /// Forecast data source configuration
    pub data: DataConfig,

    /// Connection pool settings for the database backend
    pub database: DatabaseConfig,

    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Path prefix for the versioned API
    pub prefix: String,

    /// Shared secret expected in the X-API-Key header
    #[serde(default)]
    pub key: Option<String>,
}

impl ApiConfig {
    /// Configured key, ignoring an empty value
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref().filter(|k| !k.is_empty())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    /// Allowed origins; "*" allows any
    pub origins: Vec<String>,
}

impl CorsConfig {
    pub fn allow_any(&self) -> bool {
        self.origins.iter().any(|o| o == "*")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Snapshot time-to-live in seconds
    pub ttl_seconds: u64,
}

/// Where forecast rows are loaded from
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataBackend {
    /// Parquet and CSV files in `data.path`
    #[serde(alias = "csv", alias = "parquet")]
    Files,
    Database,
    /// One export fetched from `data.remote_url`
    Remote,
    #[serde(alias = "cloud")]
    S3,
}

impl DataBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataBackend::Files => "files",
            DataBackend::Database => "database",
            DataBackend::Remote => "remote",
            DataBackend::S3 => "s3",
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DataConfig {
    pub backend: DataBackend,

    /// Directory of Parquet/CSV files for the files backend
    pub path: String,

    /// PostgreSQL connection URL for the database backend
    #[serde(default)]
    pub database_url: Option<String>,

    /// Export URL for the remote backend
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Bucket settings for the s3 backend
    pub s3: S3Config,
}

#[derive(Debug, Deserialize, Clone)]
pub struct S3Config {
    #[serde(default)]
    pub bucket: Option<String>,

    pub region: String,

    /// Key prefix listed for forecast objects
    pub prefix: String,

    /// Single object to read instead of listing the prefix
    #[serde(default)]
    pub key: Option<String>,

    /// Custom endpoint for S3-compatible stores
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub access_key_id: Option<String>,

    #[serde(default)]
    pub secret_access_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("VFA_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let builder = Self::defaults(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (VFA__ prefix)
            .add_source(
                Environment::with_prefix("VFA")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.origins")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    /// Builder pre-populated with default values
    pub fn defaults(environment: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        config::Config::builder()
            .set_default("environment", environment)?
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("api.prefix", "/api/v1")?
            .set_default(
                "cors.origins",
                vec!["http://localhost:3000", "http://localhost:8000"],
            )?
            .set_default("cache.ttl_seconds", 3600)?
            .set_default("data.backend", "files")?
            .set_default("data.path", "data/sample")?
            .set_default("data.s3.region", "eu-north-1")?
            .set_default("data.s3.prefix", "api_ready/")?
            .set_default("database.max_connections", 5)?
            .set_default("database.min_connections", 1)?
            .set_default("log_level", "info")
    }

    /// Build, deserialize and validate
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !ENVIRONMENTS.contains(&self.environment.as_str()) {
            return Err(ConfigError::Message(format!(
                "environment must be one of {:?}, got '{}'",
                ENVIRONMENTS, self.environment
            )));
        }

        let prefix = &self.api.prefix;
        if !prefix.starts_with('/') || prefix.len() < 2 || prefix.ends_with('/') {
            return Err(ConfigError::Message(format!(
                "api.prefix must look like '/api/v1', got '{}'",
                prefix
            )));
        }

        let missing = match self.data.backend {
            DataBackend::Database if self.data.database_url.is_none() => Some("data.database_url"),
            DataBackend::Remote if self.data.remote_url.is_none() => Some("data.remote_url"),
            DataBackend::S3 if self.data.s3.bucket.is_none() => Some("data.s3.bucket"),
            _ => None,
        };
        if let Some(key) = missing {
            return Err(ConfigError::Message(format!(
                "{} is required for the '{}' data backend",
                key,
                self.data.backend.as_str()
            )));
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Whether 5xx responses may carry internal error detail
    pub fn expose_error_detail(&self) -> bool {
        !self.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_builder(Config::defaults("development").unwrap()).unwrap();

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.api.prefix, "/api/v1");
        assert_eq!(config.api.key(), None);
        assert_eq!(config.cors.origins.len(), 2);
        assert!(!config.cors.allow_any());
        assert_eq!(config.cache.ttl_seconds, 3600);
        assert_eq!(config.data.backend, DataBackend::Files);
        assert_eq!(config.data.path, "data/sample");
        assert_eq!(config.data.s3.region, "eu-north-1");
        assert_eq!(config.data.s3.prefix, "api_ready/");
        assert_eq!(config.data.s3.bucket, None);
        assert_eq!(config.log_level, "info");
        assert!(config.expose_error_detail());
    }

    #[test]
    fn test_overrides() {
        let builder = Config::defaults("production")
            .unwrap()
            .set_override("server.port", 9000)
            .unwrap()
            .set_override("api.key", "secret")
            .unwrap()
            .set_override("cors.origins", vec!["*"])
            .unwrap();
        let config = Config::from_builder(builder).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.api.key(), Some("secret"));
        assert!(config.cors.allow_any());
        assert!(config.is_production());
        assert!(!config.expose_error_detail());
    }

    #[test]
    fn test_empty_api_key_means_open() {
        let builder = Config::defaults("development")
            .unwrap()
            .set_override("api.key", "")
            .unwrap();
        let config = Config::from_builder(builder).unwrap();
        assert_eq!(config.api.key(), None);
    }

    #[test]
    fn test_unknown_environment_rejected() {
        assert!(Config::from_builder(Config::defaults("qa").unwrap()).is_err());
    }

    #[test]
    fn test_bad_prefix_rejected() {
        for prefix in ["", "/", "api/v1", "/api/v1/"] {
            let builder = Config::defaults("development")
                .unwrap()
                .set_override("api.prefix", prefix)
                .unwrap();
            assert!(Config::from_builder(builder).is_err(), "{prefix:?}");
        }
    }

    #[test]
    fn test_backend_requires_location() {
        let builder = Config::defaults("development")
            .unwrap()
            .set_override("data.backend", "database")
            .unwrap();
        assert!(Config::from_builder(builder).is_err());

        let builder = Config::defaults("development")
            .unwrap()
            .set_override("data.backend", "remote")
            .unwrap()
            .set_override("data.remote_url", "https://example.org/forecasts.csv")
            .unwrap();
        let config = Config::from_builder(builder).unwrap();
        assert_eq!(config.data.backend, DataBackend::Remote);
    }

    #[test]
    fn test_s3_backend_requires_bucket() {
        let builder = Config::defaults("development")
            .unwrap()
            .set_override("data.backend", "s3")
            .unwrap();
        assert!(Config::from_builder(builder).is_err());

        let builder = Config::defaults("development")
            .unwrap()
            .set_override("data.backend", "cloud")
            .unwrap()
            .set_override("data.s3.bucket", "views-forecasts")
            .unwrap()
            .set_override("data.s3.key", "api_ready/forecasts.parquet")
            .unwrap();
        let config = Config::from_builder(builder).unwrap();
        assert_eq!(config.data.backend, DataBackend::S3);
        assert_eq!(config.data.s3.bucket.as_deref(), Some("views-forecasts"));
        assert_eq!(config.data.s3.key.as_deref(), Some("api_ready/forecasts.parquet"));
    }

    #[test]
    fn test_flat_file_backend_aliases() {
        for name in ["files", "csv", "parquet"] {
            let builder = Config::defaults("development")
                .unwrap()
                .set_override("data.backend", name)
                .unwrap();
            let config = Config::from_builder(builder).unwrap();
            assert_eq!(config.data.backend, DataBackend::Files, "{name}");
        }
    }
}
