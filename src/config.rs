use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub request_timeout_seconds: u64,
    pub shutdown_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_seconds: 10,
            shutdown_timeout_seconds: 30,
        }
    }
}

impl Config {
    /// Build the configuration from the environment, falling back to defaults
    pub fn init() -> Result<Config> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let config = Config {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT", defaults.port)?,
            request_timeout_seconds: parse_var(
                &lookup,
                "REQUEST_TIMEOUT_SECONDS",
                defaults.request_timeout_seconds,
            )?,
            shutdown_timeout_seconds: parse_var(
                &lookup,
                "SHUTDOWN_TIMEOUT_SECONDS",
                defaults.shutdown_timeout_seconds,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AppError::ConfigError("HOST must not be empty".to_string()));
        }
        if self.request_timeout_seconds == 0 {
            return Err(AppError::ConfigError(
                "REQUEST_TIMEOUT_SECONDS must be > 0".to_string(),
            ));
        }
        if self.shutdown_timeout_seconds == 0 {
            return Err(AppError::ConfigError(
                "SHUTDOWN_TIMEOUT_SECONDS must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Address to bind (host:port)
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_seconds)
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| AppError::ConfigError(format!("{} must be a number, got '{}'", key, raw))),
        None => Ok(default),
    }
}
