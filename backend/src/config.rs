//! Configuration management for Stockroom
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with STOCKROOM__ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Signing key used when none is configured; accepted only in development
pub const DEV_JWT_SECRET: &str = "development-secret-key";

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Storage backend selection
    pub storage: StorageConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Log output configuration
    pub log: LogConfig,
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
}

/// Which `InventoryStore` implementation backs the server
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    /// Secret key for signing JWT tokens
    pub jwt_secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,

    /// bcrypt work factor for stored passwords
    pub bcrypt_cost: u32,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LogConfig {
    /// Emit JSON lines instead of the human-readable format
    pub json: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("STOCKROOM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.url", "postgres://localhost/stockroom")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("storage.backend", "postgres")?
            .set_default("auth.jwt_secret", DEV_JWT_SECRET)?
            .set_default("auth.access_token_expiry", 86400)?
            .set_default("auth.bcrypt_cost", i64::from(bcrypt::DEFAULT_COST))?
            .set_default("log.json", false)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (STOCKROOM__ prefix)
            .add_source(
                Environment::with_prefix("STOCKROOM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize::<Self>()?.checked()
    }

    /// Reject settings that are only safe for local development
    fn checked(self) -> Result<Self, ConfigError> {
        if !self.is_development() && self.auth.jwt_secret == DEV_JWT_SECRET {
            return Err(ConfigError::Message(format!(
                "auth.jwt_secret must be set in the {} environment",
                self.environment
            )));
        }
        Ok(self)
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
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

#[cfg(test)]
mod tests {
    use super::*;

    fn config(environment: &str, jwt_secret: &str) -> Config {
        Config {
            environment: environment.to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: "postgres://localhost/stockroom".to_string(),
                max_connections: 10,
                min_connections: 2,
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
            },
            auth: AuthConfig {
                jwt_secret: jwt_secret.to_string(),
                access_token_expiry: 86400,
                bcrypt_cost: 4,
            },
            log: LogConfig::default(),
        }
    }

    #[test]
    fn test_default_secret_allowed_in_development() {
        assert!(config("development", DEV_JWT_SECRET).checked().is_ok());
    }

    #[test]
    fn test_default_secret_rejected_in_production() {
        let err = config("production", DEV_JWT_SECRET).checked().unwrap_err();
        assert!(err.to_string().contains("auth.jwt_secret"));
        assert!(config("production", "a-real-secret").checked().is_ok());
    }
}
