//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PROSHOP_JWT_SECRET` - Session token signing secret (min 32 chars)
//!
//! ## Optional
//! - `PROSHOP_DATABASE_URL` - `SQLite` connection string
//!   (default: `sqlite:proshop.db`)
//! - `PROSHOP_HOST` - Bind address (default: 127.0.0.1)
//! - `PROSHOP_PORT` - Listen port (default: 5000)
//! - `PROSHOP_ENV` - `development`, `test`, or `production`
//!   (default: development)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Blocklist of common placeholder patterns (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &["your-", "changeme", "replace", "placeholder", "example"];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Deployment environment.
///
/// The session cookie is only marked `Secure` in production, so local and
/// test clients over plain HTTP keep session continuity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "development" | "dev" => Ok(Self::Development),
            "test" => Ok(Self::Test),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::InvalidEnvVar(
                "PROSHOP_ENV".to_owned(),
                format!("unknown environment: {other}"),
            )),
        }
    }
}

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `SQLite` database connection URL.
    pub database_url: SecretString,
    /// IP address to bind the server to.
    pub host: IpAddr,
    /// Port to listen on.
    pub port: u16,
    /// Session token signing secret.
    pub jwt_secret: SecretString,
    /// Deployment environment.
    pub environment: Environment,
    /// Sentry DSN for error tracking.
    pub sentry_dsn: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid,
    /// or if the JWT secret fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url =
            SecretString::from(get_env_or_default("PROSHOP_DATABASE_URL", "sqlite:proshop.db"));
        let host = get_env_or_default("PROSHOP_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PROSHOP_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("PROSHOP_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PROSHOP_PORT".to_owned(), e.to_string()))?;
        let jwt_secret = get_required_env("PROSHOP_JWT_SECRET").map(SecretString::from)?;
        validate_jwt_secret(&jwt_secret, "PROSHOP_JWT_SECRET")?;
        let environment = Environment::parse(&get_env_or_default("PROSHOP_ENV", "development"))?;
        let sentry_dsn = std::env::var("SENTRY_DSN").ok().filter(|v| !v.is_empty());

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            environment,
            sentry_dsn,
        })
    }

    /// Socket address to bind the listener to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn get_required_env(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.to_owned()))
}

fn get_env_or_default(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_owned())
}

/// Reject short or obviously-placeholder signing secrets.
fn validate_jwt_secret(secret: &SecretString, name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();

    if value.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            name.to_owned(),
            format!("must be at least {MIN_JWT_SECRET_LENGTH} characters"),
        ));
    }

    let lowered = value.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lowered.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                name.to_owned(),
                format!("looks like a placeholder (contains \"{pattern}\")"),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_secrets() {
        let secret = SecretString::from("short");
        assert!(matches!(
            validate_jwt_secret(&secret, "X"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn rejects_placeholder_secrets() {
        let secret = SecretString::from("changeme-changeme-changeme-changeme-changeme");
        assert!(matches!(
            validate_jwt_secret(&secret, "X"),
            Err(ConfigError::InsecureSecret(_, _))
        ));
    }

    #[test]
    fn accepts_long_opaque_secrets() {
        let secret = SecretString::from("kD93hfZ01mPqWvXcR8tL5yUaGnB2sJe7oQ4iN6dM");
        assert!(validate_jwt_secret(&secret, "X").is_ok());
    }

    #[test]
    fn environment_parsing_accepts_aliases() {
        assert_eq!(Environment::parse("dev").unwrap(), Environment::Development);
        assert_eq!(Environment::parse("prod").unwrap(), Environment::Production);
        assert!(Environment::parse("staging").is_err());
    }
}
