//! Configuration management for Patotas
//!
//! Configuration is layered: built-in defaults, then an optional TOML file,
//! then `PATOTAS_<SECTION>_<KEY>` environment variables. The result is
//! validated before use.

use serde::{Deserialize, Serialize};
use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

mod error;

pub use error::ConfigError;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Store configuration
    pub store: StoreConfig,

    /// Identity provider configuration
    pub identity: IdentityConfig,

    /// Invite code configuration
    pub invite: InviteConfig,

    /// Patota rules
    pub patota: PatotaConfig,

    /// Logging configuration
    pub logging: LoggingConfig,

    /// Metrics configuration
    pub metrics: MetricsConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// Graceful shutdown timeout
    #[serde(with = "humantime_serde")]
    pub shutdown_timeout: Duration,
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// Maximum pooled connections
    pub pool_size: u32,
}

/// Identity provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Minimum accepted password length on sign-up
    pub min_password_length: usize,

    /// Argon2 memory cost in KiB
    pub password_hash_memory_kib: u32,

    /// Argon2 iteration count
    pub password_hash_iterations: u32,

    /// How long a session stays valid after sign-in
    #[serde(with = "humantime_serde")]
    pub session_ttl: Duration,
}

/// Invite code configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InviteConfig {
    /// Number of characters in a generated invite code
    pub code_length: usize,

    /// How many fresh codes to try when a generated code collides
    pub max_generation_attempts: u32,
}

/// Patota rules
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PatotaConfig {
    /// Maximum name length in characters
    pub max_name_length: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON formatting
    pub json_format: bool,

    /// Include timestamps
    pub with_timestamp: bool,

    /// Include target module
    pub with_target: bool,
}

/// Metrics configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable the Prometheus exporter
    pub enabled: bool,

    /// Exporter bind address
    pub bind_address: SocketAddr,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            identity: IdentityConfig::default(),
            invite: InviteConfig::default(),
            patota: PatotaConfig::default(),
            logging: LoggingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([127, 0, 0, 1], 8080)),
            shutdown_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("./data/patotas.db"),
            pool_size: 8,
        }
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            min_password_length: 6,
            password_hash_memory_kib: 19 * 1024,
            password_hash_iterations: 2,
            session_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            code_length: 6,
            max_generation_attempts: 5,
        }
    }
}

impl Default for PatotaConfig {
    fn default() -> Self {
        Self { max_name_length: 100 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            with_timestamp: true,
            with_target: true,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: SocketAddr::from(([127, 0, 0, 1], 9090)),
        }
    }
}

/// Parse `raw` into `slot`, reporting `key` on failure
fn parse_into<T>(slot: &mut T, key: &'static str, raw: &str) -> Result<(), ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    *slot = raw.trim().parse().map_err(|e| ConfigError::invalid(key, e))?;
    Ok(())
}

impl Config {
    /// Load configuration from environment variables on top of the defaults
    ///
    /// Environment variables follow the pattern: PATOTAS_<SECTION>_<KEY>
    /// Example: PATOTAS_SERVER_BIND_ADDRESS=0.0.0.0:8080
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError(e.to_string()))?;

        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Load an optional file, then apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PATOTAS_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("PATOTAS_SERVER_BIND_ADDRESS") {
            parse_into(&mut self.server.bind_address, "server.bind_address", &v)?;
        }
        if let Some(v) = lookup("PATOTAS_SERVER_SHUTDOWN_TIMEOUT") {
            self.server.shutdown_timeout = humantime_serde::re::humantime::parse_duration(v.trim())
                .map_err(|e| ConfigError::invalid("server.shutdown_timeout", e))?;
        }

        if let Some(v) = lookup("PATOTAS_STORE_DATABASE_PATH") {
            self.store.database_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("PATOTAS_STORE_POOL_SIZE") {
            parse_into(&mut self.store.pool_size, "store.pool_size", &v)?;
        }

        if let Some(v) = lookup("PATOTAS_IDENTITY_MIN_PASSWORD_LENGTH") {
            parse_into(&mut self.identity.min_password_length, "identity.min_password_length", &v)?;
        }
        if let Some(v) = lookup("PATOTAS_IDENTITY_SESSION_TTL") {
            self.identity.session_ttl = humantime_serde::re::humantime::parse_duration(v.trim())
                .map_err(|e| ConfigError::invalid("identity.session_ttl", e))?;
        }

        if let Some(v) = lookup("PATOTAS_INVITE_CODE_LENGTH") {
            parse_into(&mut self.invite.code_length, "invite.code_length", &v)?;
        }
        if let Some(v) = lookup("PATOTAS_INVITE_MAX_GENERATION_ATTEMPTS") {
            parse_into(
                &mut self.invite.max_generation_attempts,
                "invite.max_generation_attempts",
                &v,
            )?;
        }

        if let Some(v) = lookup("PATOTAS_PATOTA_MAX_NAME_LENGTH") {
            parse_into(&mut self.patota.max_name_length, "patota.max_name_length", &v)?;
        }

        if let Some(v) = lookup("PATOTAS_LOG_LEVEL") {
            self.logging.level = v.trim().to_lowercase();
        }
        if let Some(v) = lookup("PATOTAS_LOG_JSON") {
            parse_into(&mut self.logging.json_format, "logging.json_format", &v)?;
        }

        if let Some(v) = lookup("PATOTAS_METRICS_ENABLED") {
            parse_into(&mut self.metrics.enabled, "metrics.enabled", &v)?;
        }
        if let Some(v) = lookup("PATOTAS_METRICS_BIND_ADDRESS") {
            parse_into(&mut self.metrics.bind_address, "metrics.bind_address", &v)?;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.pool_size == 0 {
            return Err(ConfigError::ValidationFailed(
                "pool_size must be greater than 0".to_string(),
            ));
        }

        if self.identity.min_password_length == 0 {
            return Err(ConfigError::ValidationFailed(
                "min_password_length must be greater than 0".to_string(),
            ));
        }

        if self.identity.password_hash_memory_kib < 8 || self.identity.password_hash_iterations == 0 {
            return Err(ConfigError::ValidationFailed(
                "password hash cost must be at least 8 KiB and 1 iteration".to_string(),
            ));
        }

        if self.identity.session_ttl.is_zero() {
            return Err(ConfigError::ValidationFailed(
                "session_ttl must be greater than 0".to_string(),
            ));
        }

        if !(4..=32).contains(&self.invite.code_length) {
            return Err(ConfigError::ValidationFailed(format!(
                "invite code_length must be between 4 and 32, got {}",
                self.invite.code_length
            )));
        }

        if self.invite.max_generation_attempts == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_generation_attempts must be greater than 0".to_string(),
            ));
        }

        if self.patota.max_name_length == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_name_length must be greater than 0".to_string(),
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid log level: {}",
                self.logging.level
            )));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let contents =
            toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, contents).map_err(|e| ConfigError::FileWriteError(e.to_string()))?;

        Ok(())
    }
}
