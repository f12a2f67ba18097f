// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Handles environment variables, deployment modes, and runtime configuration parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Booking Platform

//! Environment-based configuration management for production deployment

use crate::constants::{env_config, limits};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Errors only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    #[default]
    Info,
    /// Debug output
    Debug,
    /// Everything
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    #[must_use]
    pub const fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Error => tracing::Level::ERROR,
            Self::Warn => tracing::Level::WARN,
            Self::Info => tracing::Level::INFO,
            Self::Debug => tracing::Level::DEBUG,
            Self::Trace => tracing::Level::TRACE,
        }
    }

    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `SQLite` database with file path
    SQLite {
        /// Database file
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse a `sqlite:` URL or a bare file path
    #[must_use]
    pub fn parse_url(s: &str) -> Self {
        let path_str = s.strip_prefix("sqlite://").or_else(|| s.strip_prefix("sqlite:")).unwrap_or(s);
        if path_str == ":memory:" {
            Self::Memory
        } else {
            Self::SQLite {
                path: PathBuf::from(path_str),
            }
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from("./data/salon_booking.db"),
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
    /// Pool size for file databases
    pub max_connections: u32,
}

/// Token signing configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HS256 signing secret
    #[serde(skip_serializing)]
    pub jwt_secret: Vec<u8>,
    /// JWT expiry time in hours
    pub jwt_expiry_hours: i64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .finish()
    }
}

/// Cross-origin configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins, `*` for any
    pub allowed_origins: Vec<String>,
}

/// Complete server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP API port
    pub http_port: u16,
    /// Bind address
    pub host: String,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// Database configuration
    pub database: DatabaseConfig,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// CORS configuration
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable fails to parse, if `JWT_SECRET`
    /// is missing in production, or if validation fails
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {e}");
        }

        let environment = Environment::from_str_or_default(&env_var_or("ENVIRONMENT", "development"));

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret.into_bytes(),
            _ if environment.is_production() => {
                return Err(anyhow::anyhow!("JWT_SECRET must be set in production"));
            }
            _ => {
                warn!("JWT_SECRET not set, generating an ephemeral development secret");
                crate::auth::generate_jwt_secret()
            }
        };

        let config = Self {
            http_port: env_config::http_port(),
            host: env_config::host(),
            log_level: LogLevel::from_str_or_default(&env_config::log_level()),
            environment,
            database: DatabaseConfig {
                url: DatabaseUrl::parse_url(&env_config::database_url()),
                max_connections: env_var_or(
                    "DATABASE_MAX_CONNECTIONS",
                    &limits::DEFAULT_MAX_CONNECTIONS.to_string(),
                )
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS value")?,
            },
            auth: AuthConfig {
                jwt_secret,
                jwt_expiry_hours: env_var_or(
                    "JWT_EXPIRY_HOURS",
                    &limits::DEFAULT_JWT_EXPIRY_HOURS.to_string(),
                )
                .parse()
                .context("Invalid JWT_EXPIRY_HOURS value")?,
            },
            cors: CorsConfig {
                allowed_origins: parse_origins(&env_var_or("CORS_ALLOWED_ORIGINS", "*")),
            },
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range
    pub fn validate(&self) -> Result<()> {
        if self.http_port == 0 {
            return Err(anyhow::anyhow!("HTTP_PORT must be non-zero"));
        }
        if self.auth.jwt_expiry_hours <= 0 {
            return Err(anyhow::anyhow!("JWT_EXPIRY_HOURS must be positive"));
        }
        if self.database.max_connections == 0 {
            return Err(anyhow::anyhow!("DATABASE_MAX_CONNECTIONS must be positive"));
        }
        if self.environment.is_production() && self.cors.allowed_origins.iter().any(|o| o == "*") {
            warn!("CORS allows any origin in production");
        }
        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Salon Booking Server Configuration:\n\
             - Environment: {}\n\
             - HTTP: {}:{}\n\
             - Log Level: {}\n\
             - Database: {}\n\
             - JWT Expiry: {}h\n\
             - CORS Origins: {}",
            self.environment,
            self.host,
            self.http_port,
            self.log_level,
            if self.database.url.is_memory() {
                "SQLite (memory)"
            } else {
                "SQLite (file)"
            },
            self.auth.jwt_expiry_hours,
            self.cors.allowed_origins.join(", ")
        )
    }

    /// Configuration used by tests and local tooling: in-memory database,
    /// fixed secret, permissive CORS
    #[must_use]
    pub fn for_testing(jwt_secret: &[u8]) -> Self {
        Self {
            http_port: env_config::http_port(),
            host: "127.0.0.1".to_owned(),
            log_level: LogLevel::Info,
            environment: Environment::Testing,
            database: DatabaseConfig {
                url: DatabaseUrl::Memory,
                max_connections: 1,
            },
            auth: AuthConfig {
                jwt_secret: jwt_secret.to_vec(),
                jwt_expiry_hours: limits::DEFAULT_JWT_EXPIRY_HOURS,
            },
            cors: CorsConfig {
                allowed_origins: vec!["*".to_owned()],
            },
        }
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("https://a.example, https://b.example,"),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str_or_default("DEBUG"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str_or_default("nonsense"), LogLevel::Info);
        assert_eq!(LogLevel::Warn.to_string(), "warn");
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!(Environment::from_str_or_default("prod"), Environment::Production);
        assert_eq!(Environment::from_str_or_default("test"), Environment::Testing);
        assert_eq!(Environment::from_str_or_default(""), Environment::Development);
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_database_url_parsing() {
        assert_eq!(DatabaseUrl::parse_url("sqlite::memory:"), DatabaseUrl::Memory);
        assert_eq!(
            DatabaseUrl::parse_url("sqlite:./data/test.db").to_connection_string(),
            "sqlite:./data/test.db"
        );
        assert_eq!(
            DatabaseUrl::parse_url("/tmp/bookings.db"),
            DatabaseUrl::SQLite {
                path: PathBuf::from("/tmp/bookings.db")
            }
        );
    }

    #[test]
    fn test_config_validation() {
        let mut config = ServerConfig::for_testing(b"secret");
        assert!(config.validate().is_ok());
        config.auth.jwt_expiry_hours = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_summary_hides_secret() {
        let config = ServerConfig::for_testing(b"super-secret-value");
        assert!(!config.summary().contains("super-secret-value"));
        assert!(!format!("{:?}", config.auth).contains("super"));
    }
}
