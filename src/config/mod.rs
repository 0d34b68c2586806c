use serde::Deserialize;
use std::{env, fmt::Display, str::FromStr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} is invalid: {reason}")]
    Invalid { key: &'static str, reason: String },
}

// Root configuration, one section per concern
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub session: SessionConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("expected pretty or json, got {other}")),
        }
    }
}

// Application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub log_format: LogFormat,
}

// Database settings
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub pool_size: u32,
}

// Redis settings (session storage)
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub ttl_seconds: u64,
    pub bcrypt_cost: u32,
}

// Demo data inserted on an empty catalog at startup
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    pub enabled: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source. `from_env` passes
    /// the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bcrypt_cost: u32 = parse_or(&lookup, "BCRYPT_COST", bcrypt::DEFAULT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                reason: format!("{bcrypt_cost} is outside 4..=31"),
            });
        }

        Ok(Config {
            app: AppConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "PORT", 8000)?,
                rust_log: lookup("RUST_LOG")
                    .unwrap_or_else(|| "movie_booking=debug,tower_http=debug".to_string()),
                log_format: parse_or(&lookup, "LOG_FORMAT", LogFormat::Pretty)?,
            },
            database: DatabaseConfig {
                url: required(&lookup, "DATABASE_URL")?,
                pool_size: parse_or(&lookup, "DB_POOL_SIZE", 20)?,
            },
            redis: RedisConfig {
                url: required(&lookup, "REDIS_URL")?,
            },
            session: SessionConfig {
                ttl_seconds: parse_or(&lookup, "SESSION_TTL_SECONDS", 86_400)?,
                bcrypt_cost,
            },
            seed: SeedConfig {
                enabled: parse_or(&lookup, "SEED_DEMO_DATA", true)?,
            },
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
