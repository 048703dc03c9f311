use domain::models::BoundingBox;
use serde::Deserialize;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub fixtures: FixturesConfig,
    pub feed: FeedConfig,
    #[serde(default)]
    pub map: MapConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Allowed browser origins for the dashboard. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Which key-value store backs the reference tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_backend")]
    pub backend: StorageBackend,

    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
        }
    }
}

impl From<&DatabaseConfig> for persistence::db::DatabaseConfig {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout_secs: config.connect_timeout_secs,
            idle_timeout_secs: config.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixturesConfig {
    /// Base URL serving Location.json, Vessel.json and BeaconReader.json.
    /// Empty means tables start out empty.
    #[serde(default)]
    pub base_url: String,

    #[serde(default = "default_fixture_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Sighting feed endpoint; the sequence number is appended as `?i=N`.
    pub url: String,

    #[serde(default = "default_feed_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_feed_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Start polling at boot instead of waiting for `POST /api/v1/feed/start`.
    #[serde(default)]
    pub autostart: bool,
}

impl FeedConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_min_latitude")]
    pub min_latitude: f64,
    #[serde(default = "default_max_latitude")]
    pub max_latitude: f64,
    #[serde(default = "default_min_longitude")]
    pub min_longitude: f64,
    #[serde(default = "default_max_longitude")]
    pub max_longitude: f64,
}

impl MapConfig {
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox {
            min_latitude: self.min_latitude,
            max_latitude: self.max_latitude,
            min_longitude: self.min_longitude,
            max_longitude: self.max_longitude,
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            min_latitude: default_min_latitude(),
            max_latitude: default_max_latitude(),
            min_longitude: default_min_longitude(),
            max_longitude: default_max_longitude(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_storage_backend() -> StorageBackend {
    StorageBackend::Memory
}
fn default_max_connections() -> u32 {
    5
}
fn default_min_connections() -> u32 {
    1
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_fixture_timeout_ms() -> u64 {
    10_000
}
fn default_feed_interval_ms() -> u64 {
    3000
}
fn default_feed_request_timeout_ms() -> u64 {
    2500
}
fn default_min_latitude() -> f64 {
    36.0
}
fn default_max_latitude() -> f64 {
    42.0
}
fn default_min_longitude() -> f64 {
    26.0
}
fn default_max_longitude() -> f64 {
    45.0
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with FB__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("FB").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration from embedded defaults plus overrides.
    ///
    /// Does not touch the file system, so tests can run from any directory.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "127.0.0.1"
            port = 8080
            request_timeout_secs = 30

            [logging]
            level = "info"
            format = "json"

            [storage]
            backend = "memory"

            [fixtures]
            base_url = ""

            [feed]
            url = "http://localhost:4200/assets/BeaconData.json"
            interval_ms = 3000
            request_timeout_ms = 2500
            autostart = false
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.storage.backend == StorageBackend::Postgres {
            if self.storage.database.url.is_empty() {
                return Err(ConfigValidationError::MissingRequired(
                    "FB__STORAGE__DATABASE__URL must be set for the postgres backend".to_string(),
                ));
            }
            if self.storage.database.min_connections > self.storage.database.max_connections {
                return Err(ConfigValidationError::InvalidValue(
                    "min_connections cannot exceed max_connections".to_string(),
                ));
            }
        }

        if self.feed.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "FB__FEED__URL must be set".to_string(),
            ));
        }

        if self.feed.interval_ms == 0 || self.feed.request_timeout_ms == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "feed interval_ms and request_timeout_ms must be greater than 0".to_string(),
            ));
        }

        // A fetch that outlives its tick is always overtaken by the next sequence.
        if self.feed.request_timeout_ms >= self.feed.interval_ms {
            return Err(ConfigValidationError::InvalidValue(
                "feed request_timeout_ms must be shorter than interval_ms".to_string(),
            ));
        }

        if self.map.min_latitude >= self.map.max_latitude
            || self.map.min_longitude >= self.map.max_longitude
        {
            return Err(ConfigValidationError::InvalidValue(
                "map bounding box minimums must be below maximums".to_string(),
            ));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .expect("Invalid socket address")
    }
}
