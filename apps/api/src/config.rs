//! API configuration module.
//!
//! Configuration is layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. `config/default.toml` (optional)
//! 3. `config/local.toml` (optional, not committed)
//! 4. `ECOFINDS__*` environment variables, e.g. `ECOFINDS__SERVER__PORT=9000`
//!
//! A `.env` file is loaded into the environment first when present.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

const DEV_JWT_SECRET: &str = "ecofinds-dev-secret-change-in-production";

/// Minimum secret length outside development.
const MIN_SECRET_LEN: usize = 16;

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// `development` or `production`. Controls secret checks.
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path, or `:memory:`.
    pub path: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing access tokens.
    pub jwt_secret: String,
    /// Access token lifetime in seconds.
    pub token_lifetime_secs: i64,
}

impl ApiConfig {
    /// Load configuration from files and environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env file is normal.
        let _ = dotenvy::dotenv();

        let raw = Self::builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("ECOFINDS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: ApiConfig = raw.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults only. Used by tests and as the base layer of [`load`](Self::load).
    pub fn defaults() -> Result<Self, ConfigError> {
        let config: ApiConfig = Self::builder()?.build()?.try_deserialize()?;
        Ok(config)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        let builder = Config::builder()
            .set_default("environment", "development")?
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080_i64)?
            .set_default("database.path", "./data/ecofinds.db")?
            .set_default("database.max_connections", 8_i64)?
            .set_default("database.run_migrations", true)?
            .set_default("auth.jwt_secret", DEV_JWT_SECRET)?
            .set_default("auth.token_lifetime_secs", 86_400_i64)?;
        Ok(builder)
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Checks values the deserializer cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue("server.port".to_string()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database.max_connections".to_string(),
            ));
        }

        if self.auth.token_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue(
                "auth.token_lifetime_secs".to_string(),
            ));
        }

        if !self.is_development() {
            if self.auth.jwt_secret == DEV_JWT_SECRET {
                return Err(ConfigError::MissingRequired("auth.jwt_secret".to_string()));
            }
            if self.auth.jwt_secret.len() < MIN_SECRET_LEN {
                return Err(ConfigError::WeakSecret(MIN_SECRET_LEN));
            }
        }

        Ok(())
    }

    /// Socket address to bind.
    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue("server.host".to_string()))
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("JWT secret must be at least {0} bytes")]
    WeakSecret(usize),

    #[error("Configuration error: {0}")]
    Source(#[from] config::ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::defaults().unwrap();

        assert!(config.is_development());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.max_connections, 8);
        assert!(config.database.run_migrations);
        assert_eq!(config.auth.token_lifetime_secs, 86_400);
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address().unwrap().port(), 8080);
    }

    #[test]
    fn test_production_rejects_dev_secret() {
        let mut config = ApiConfig::defaults().unwrap();
        config.environment = "production".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired(_))
        ));

        config.auth.jwt_secret = "short".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::WeakSecret(16))));

        config.auth.jwt_secret = "a-much-longer-production-secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = ApiConfig::defaults().unwrap();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }
}
