/**
 * Server Configuration
 *
 * Typed configuration read from the environment (optionally populated from a
 * `.env` file by the binary), plus the optional PostgreSQL connection.
 *
 * # Environment Variables
 *
 * | Variable                | Default       |
 * |-------------------------|---------------|
 * | `SERVER_PORT`           | `3000`        |
 * | `DATABASE_URL`          | unset: in-memory store |
 * | `JWT_SECRET`            | development secret (warned) |
 * | `RATE_LIMIT_PER_MINUTE` | `60`          |
 * | `PUSH_ENDPOINT`         | unset: pushes are logged |
 * | `PUSH_SERVER_KEY`       | empty         |
 * | `SWAPIN_ENV`            | `development` |
 * | `CORS_ALLOW_ORIGIN`     | unset: any origin |
 *
 * # Error Handling
 *
 * Malformed values fail with `ConfigError`. A database that cannot be
 * reached is logged and the server falls back to the in-memory store.
 */

use sqlx::PgPool;
use thiserror::Error;

use crate::backend::ratelimit::DEFAULT_REQUESTS_PER_MINUTE;

const DEV_JWT_SECRET: &str = "swapin-dev-secret-change-me";

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Some(Environment::Development),
            "production" | "prod" => Some(Environment::Production),
            _ => None,
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub rate_limit_per_minute: u32,
    pub push_endpoint: Option<String>,
    pub push_server_key: String,
    pub environment: Environment,
    pub cors_allow_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            database_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            rate_limit_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
            push_endpoint: None,
            push_server_key: String::new(),
            environment: Environment::Development,
            cors_allow_origin: None,
        }
    }
}

impl ServerConfig {
    /// Create a new ServerConfigBuilder
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Read the configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut builder = Self::builder();
        if let Some(port) = get("SERVER_PORT") {
            builder = builder.port(parse_number("SERVER_PORT", &port)?);
        }
        if let Some(url) = get("DATABASE_URL") {
            builder = builder.database_url(url);
        }
        if let Some(secret) = get("JWT_SECRET") {
            builder = builder.jwt_secret(secret);
        }
        if let Some(limit) = get("RATE_LIMIT_PER_MINUTE") {
            builder = builder.rate_limit_per_minute(parse_number("RATE_LIMIT_PER_MINUTE", &limit)?);
        }
        if let Some(endpoint) = get("PUSH_ENDPOINT") {
            builder = builder.push_endpoint(endpoint);
        }
        if let Some(key) = get("PUSH_SERVER_KEY") {
            builder = builder.push_server_key(key);
        }
        if let Some(env) = get("SWAPIN_ENV") {
            let environment = Environment::from_str(&env).ok_or_else(|| ConfigError::InvalidValue {
                key: "SWAPIN_ENV",
                value: env.clone(),
            })?;
            builder = builder.environment(environment);
        }
        if let Some(origin) = get("CORS_ALLOW_ORIGIN") {
            builder = builder.cors_allow_origin(origin);
        }
        builder.build()
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rate_limit_per_minute == 0 {
            return Err(ConfigError::InvalidValue {
                key: "RATE_LIMIT_PER_MINUTE",
                value: "0".to_string(),
            });
        }
        if self.jwt_secret.is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        if self.is_production() && self.jwt_secret == DEV_JWT_SECRET {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        if let Some(endpoint) = &self.push_endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(ConfigError::InvalidUrl(endpoint.clone()));
            }
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

/// Builder for ServerConfig
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.jwt_secret = secret.into();
        self
    }

    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.config.rate_limit_per_minute = limit;
        self
    }

    pub fn push_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.push_endpoint = Some(endpoint.into());
        self
    }

    pub fn push_server_key(mut self, key: impl Into<String>) -> Self {
        self.config.push_server_key = key.into();
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.config.environment = environment;
        self
    }

    pub fn cors_allow_origin(mut self, origin: impl Into<String>) -> Self {
        self.config.cors_allow_origin = Some(origin.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Connect to PostgreSQL and run migrations
///
/// # Returns
///
/// - `Some(PgPool)` if the database is reachable
/// - `None` if `url` is `None` or the connection fails
pub async fn load_database(url: Option<&str>) -> Option<PgPool> {
    let Some(database_url) = url else {
        tracing::warn!("DATABASE_URL not set. Using the in-memory document store.");
        return None;
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Falling back to the in-memory document store.");
            return None;
        }
    };

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            tracing::error!("Failed to run database migrations: {}", e);
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Some(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.rate_limit_per_minute, 60);
        assert!(config.database_url.is_none());
        assert!(!config.is_production());
    }

    #[test]
    fn test_reads_variables() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("SERVER_PORT", "8080"),
            ("RATE_LIMIT_PER_MINUTE", "120"),
            ("JWT_SECRET", "s3cret"),
            ("SWAPIN_ENV", "production"),
            ("PUSH_ENDPOINT", "https://push.example/send"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.rate_limit_per_minute, 120);
        assert!(config.is_production());
        assert_eq!(config.push_endpoint.as_deref(), Some("https://push.example/send"));
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            ServerConfig::from_lookup(lookup(&[("SERVER_PORT", "eighty")])).unwrap_err(),
            ConfigError::InvalidValue {
                key: "SERVER_PORT",
                value: "eighty".into()
            }
        );
        assert!(ServerConfig::from_lookup(lookup(&[("RATE_LIMIT_PER_MINUTE", "0")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("PUSH_ENDPOINT", "push.example")])).is_err());
    }

    #[test]
    fn test_production_requires_real_secret() {
        let result = ServerConfig::from_lookup(lookup(&[("SWAPIN_ENV", "production")]));
        assert_eq!(result.unwrap_err(), ConfigError::MissingValue("JWT_SECRET"));
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_ignores_blank_values() {
        std::env::set_var("SERVER_PORT", "4100");
        std::env::set_var("DATABASE_URL", "  ");
        let config = ServerConfig::from_env();
        std::env::remove_var("SERVER_PORT");
        std::env::remove_var("DATABASE_URL");

        let config = config.unwrap();
        assert_eq!(config.port, 4100);
        assert!(config.database_url.is_none());
    }
}
