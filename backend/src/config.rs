//! Configuration management for the weather harvester and read API
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with WEATHER_ prefix

use std::time::Duration;

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::{is_known_province, QueryDefaults, DEFAULT_LIMIT, DEFAULT_LOCATION, DEFAULT_MAX_LIMIT};

/// Default hourly-forecast endpoint of the Thai Meteorological Department
pub const TMD_HOURLY_FORECAST_URL: &str =
    "https://data.tmd.go.th/nwpapi/v1/forecast/location/hourly/place";

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Remote forecast API configuration
    pub forecast_api: ForecastApiConfig,

    /// Harvest cycle configuration
    pub harvest: HarvestConfig,

    /// Read API query defaults
    pub query: QueryConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Seconds to wait for a pooled connection
    pub acquire_timeout_secs: u64,

    /// Apply embedded migrations at startup
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ForecastApiConfig {
    /// Hourly forecast endpoint
    pub base_url: String,

    /// Bearer token, only needed for harvesting
    pub token: String,

    /// Field selector sent with every request
    pub fields: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HarvestConfig {
    /// Minimum spacing between outbound calls in milliseconds
    pub min_interval_ms: u64,

    /// Number of fetches allowed in flight at once
    pub max_concurrency: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct QueryConfig {
    /// Province used when a request does not name one
    pub default_location: String,

    pub default_limit: i64,

    pub max_limit: i64,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("WEATHER_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 1)?
            .set_default("database.acquire_timeout_secs", 30)?
            .set_default("database.run_migrations", true)?
            .set_default("forecast_api.base_url", TMD_HOURLY_FORECAST_URL)?
            .set_default("forecast_api.token", "")?
            .set_default("forecast_api.fields", "tc,rh,cond")?
            .set_default("forecast_api.timeout_secs", 15)?
            .set_default("harvest.min_interval_ms", 1500)?
            .set_default("harvest.max_concurrency", 1)?
            .set_default("query.default_location", DEFAULT_LOCATION)?
            .set_default("query.default_limit", DEFAULT_LIMIT)?
            .set_default("query.max_limit", DEFAULT_MAX_LIMIT)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (WEATHER_ prefix)
            .add_source(
                Environment::with_prefix("WEATHER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would only fail later at runtime
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Message(
                "database.url must be set (WEATHER_DATABASE__URL)".to_string(),
            ));
        }
        if !is_known_province(&self.query.default_location) {
            return Err(ConfigError::Message(format!(
                "query.default_location '{}' is not a known province",
                self.query.default_location
            )));
        }
        if !(0..=self.query.max_limit).contains(&self.query.default_limit) {
            return Err(ConfigError::Message(
                "query.default_limit must be between 0 and query.max_limit".to_string(),
            ));
        }
        if self.harvest.max_concurrency == 0 {
            return Err(ConfigError::Message(
                "harvest.max_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl ForecastApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl HarvestConfig {
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

impl QueryConfig {
    pub fn defaults(&self) -> QueryDefaults {
        QueryDefaults {
            location: self.default_location.clone(),
            limit: self.default_limit,
            max_limit: self.max_limit,
            ..QueryDefaults::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for ForecastApiConfig {
    fn default() -> Self {
        Self {
            base_url: TMD_HOURLY_FORECAST_URL.to_string(),
            token: String::new(),
            fields: "tc,rh,cond".to_string(),
            timeout_secs: 15,
        }
    }
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            min_interval_ms: 1500,
            max_concurrency: 1,
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_location: DEFAULT_LOCATION.to_string(),
            default_limit: DEFAULT_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }
}
