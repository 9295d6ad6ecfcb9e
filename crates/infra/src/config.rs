//! Configuration loading and representation.
//!
//! Everything comes from environment variables; see [`AppConfig::from_env`].

use std::net::SocketAddr;

use thiserror::Error;

use stockpile_core::Locale;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is required when USE_PERSISTENT_STORES=true")]
    Missing { var: &'static str },

    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Which store backs the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres {
        database_url: String,
        max_connections: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub backend: StoreBackend,
    pub locale: Locale,
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// | variable | default |
    /// |----------|---------|
    /// | `BIND_ADDR` | `0.0.0.0:8080` |
    /// | `USE_PERSISTENT_STORES` | `false` |
    /// | `DATABASE_URL` | required when persistent |
    /// | `DATABASE_MAX_CONNECTIONS` | `10` |
    /// | `APP_LOCALE` | `es` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = match get("BIND_ADDR") {
            Some(raw) => raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
                var: "BIND_ADDR",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_BIND_ADDR
                .parse::<SocketAddr>()
                .map_err(|e| ConfigError::Invalid {
                    var: "BIND_ADDR",
                    value: DEFAULT_BIND_ADDR.to_string(),
                    reason: e.to_string(),
                })?,
        };

        let persistent = match get("USE_PERSISTENT_STORES") {
            Some(raw) => parse_bool("USE_PERSISTENT_STORES", &raw)?,
            None => false,
        };

        let backend = if persistent {
            let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing {
                var: "DATABASE_URL",
            })?;
            let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
                Some(raw) => match raw.parse::<u32>() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        return Err(ConfigError::Invalid {
                            var: "DATABASE_MAX_CONNECTIONS",
                            value: raw,
                            reason: "expected a positive integer".to_string(),
                        });
                    }
                },
                None => DEFAULT_MAX_CONNECTIONS,
            };
            StoreBackend::Postgres {
                database_url,
                max_connections,
            }
        } else {
            StoreBackend::InMemory
        };

        let locale = match get("APP_LOCALE") {
            Some(raw) => raw.parse::<Locale>().map_err(|_| ConfigError::Invalid {
                var: "APP_LOCALE",
                value: raw.clone(),
                reason: "expected `es` or `en`".to_string(),
            })?,
            None => Locale::default(),
        };

        Ok(Self {
            bind_addr,
            backend,
            locale,
        })
    }
}

fn parse_bool(var: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}
