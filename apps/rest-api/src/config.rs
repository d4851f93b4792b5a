//! REST API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults. Secrets have NO defaults: a missing `JWT_SECRET` or
//! `PROCESSOR_SECRET_KEY` fails startup instead of silently running
//! with a baked-in value.

use std::env;

/// REST API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub port: u16,

    /// Path to the SQLite database file
    pub database_path: String,

    /// JWT secret key for signing tokens (required)
    pub jwt_secret: String,

    /// JWT access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,

    /// JWT refresh token lifetime in seconds
    pub jwt_refresh_lifetime_secs: i64,

    /// Payment processor API base URL
    pub processor_base_url: String,

    /// Payment processor secret key (required)
    pub processor_secret_key: String,

    /// Flat delivery fee added to delivered tickets, in cents
    pub delivery_fee_cents: i64,

    /// Sales tax rate in basis points (1000 = 10%)
    pub tax_rate_bps: u32,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let config = ApiConfig {
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,

            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "./pressline.db".to_string()),

            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| ConfigError::MissingRequired("JWT_SECRET".to_string()))?,

            jwt_access_lifetime_secs: env::var("JWT_ACCESS_LIFETIME_SECS")
                .unwrap_or_else(|_| "3600".to_string()) // 1 hour
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_ACCESS_LIFETIME_SECS".to_string()))?,

            jwt_refresh_lifetime_secs: env::var("JWT_REFRESH_LIFETIME_SECS")
                .unwrap_or_else(|_| "604800".to_string()) // 7 days
                .parse()
                .map_err(|_| ConfigError::InvalidValue("JWT_REFRESH_LIFETIME_SECS".to_string()))?,

            processor_base_url: env::var("PROCESSOR_BASE_URL")
                .unwrap_or_else(|_| "https://api.processor.test".to_string()),

            processor_secret_key: env::var("PROCESSOR_SECRET_KEY")
                .map_err(|_| ConfigError::MissingRequired("PROCESSOR_SECRET_KEY".to_string()))?,

            delivery_fee_cents: env::var("DELIVERY_FEE_CENTS")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DELIVERY_FEE_CENTS".to_string()))?,

            tax_rate_bps: env::var("TAX_RATE_BPS")
                .unwrap_or_else(|_| "1000".to_string()) // flat 10%
                .parse()
                .map_err(|_| ConfigError::InvalidValue("TAX_RATE_BPS".to_string()))?,
        };

        Ok(config)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
