//! Configuration management for the PharmaNet console
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with PHARMANET_ prefix

use config::{ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::engine::{PricingPolicy, PriorityPolicy};

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Pricing and purchasing engine configuration
    pub engine: EngineConfig,
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
    /// PostgreSQL connection URL. Without one the console runs in memory only.
    pub url: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

/// What to do with a negative price found in a supplier upload
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NegativePricePolicy {
    /// Reject the whole upload with a validation error
    #[default]
    Reject,
    /// Clamp the price to zero, log it and keep going
    Clamp,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// Default restock threshold for shortfall reports
    pub shortfall_threshold: i64,

    /// Default high-water mark for overstock reports
    pub overstock_threshold: i64,

    /// Aggregate shortfall ratio above which a product is Media
    pub media_ratio: Decimal,

    /// Fold the early-payment discount into the ranked final price
    pub compound_early_payment: bool,

    pub negative_price_policy: NegativePricePolicy,

    /// Products compared per blocking worker during a search
    pub parallel_chunk_size: usize,
}

impl EngineConfig {
    pub fn pricing_policy(&self) -> PricingPolicy {
        PricingPolicy {
            compound_early_payment: self.compound_early_payment,
        }
    }

    pub fn priority_policy(&self) -> PriorityPolicy {
        PriorityPolicy {
            media_ratio: self.media_ratio,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("PHARMANET_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("engine.shortfall_threshold", 5)?
            .set_default("engine.overstock_threshold", 50)?
            .set_default("engine.media_ratio", "0.5")?
            .set_default("engine.compound_early_payment", false)?
            .set_default("engine.negative_price_policy", "reject")?
            .set_default("engine.parallel_chunk_size", 256)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (PHARMANET_ prefix)
            .add_source(
                Environment::with_prefix("PHARMANET")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            min_connections: 2,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shortfall_threshold: 5,
            overstock_threshold: 50,
            media_ratio: Decimal::new(5, 1),
            compound_early_payment: false,
            negative_price_policy: NegativePricePolicy::Reject,
            parallel_chunk_size: 256,
        }
    }
}
