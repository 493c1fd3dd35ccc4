//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use thiserror::Error;

use storefront_observability::LogFormat;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be set when {reason}")]
    Missing { var: &'static str, reason: &'static str },

    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration of the API process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// `BIND_ADDR`, default `0.0.0.0:8080`.
    pub bind_addr: SocketAddr,
    /// `USE_PERSISTENT_STORES`: Postgres repositories instead of in-memory ones.
    pub use_persistent_stores: bool,
    /// `DATABASE_URL`, required when `use_persistent_stores` is set.
    pub database_url: Option<String>,
    /// `DATABASE_MAX_CONNECTIONS`, default 5.
    pub database_max_connections: u32,
    /// `SEED_INVENTORY`: load the demo stock rows at startup (default true).
    pub seed_inventory: bool,
    /// `LOG_FORMAT`: `json` (default) or `pretty`.
    pub log_format: LogFormat,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            use_persistent_stores: false,
            database_url: None,
            database_max_connections: 5,
            seed_inventory: true,
            log_format: LogFormat::Json,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from any variable source (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let bind_addr = match lookup("BIND_ADDR") {
            Some(v) => v.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
                var: "BIND_ADDR",
                value: v.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.bind_addr,
        };

        let use_persistent_stores =
            parse_bool("USE_PERSISTENT_STORES", lookup("USE_PERSISTENT_STORES"), false)?;
        let seed_inventory = parse_bool("SEED_INVENTORY", lookup("SEED_INVENTORY"), true)?;

        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
        if use_persistent_stores && database_url.is_none() {
            return Err(ConfigError::Missing {
                var: "DATABASE_URL",
                reason: "USE_PERSISTENT_STORES=true",
            });
        }

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(v) => match v.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "DATABASE_MAX_CONNECTIONS",
                        value: v,
                        reason: "expected a positive integer".to_string(),
                    });
                }
            },
            None => defaults.database_max_connections,
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(v) => v.parse::<LogFormat>().map_err(|e| {
                ConfigError::Invalid {
                    var: "LOG_FORMAT",
                    value: v.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => defaults.log_format,
        };

        Ok(Self {
            bind_addr,
            use_persistent_stores,
            database_url,
            database_max_connections,
            seed_inventory,
            log_format,
        })
    }
}

fn parse_bool(var: &'static str, value: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = value else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: raw,
            reason: "expected a boolean".to_string(),
        }),
    }
}
