//! Configuration loading and representation.
//!
//! Everything comes from environment variables:
//!
//! | Variable | Default |
//! |---|---|
//! | `BIND_ADDR` | `0.0.0.0:3000` |
//! | `JWT_SECRET` | insecure dev secret (with a warning) |
//! | `TOKEN_TTL_SECS` | `3600` |
//! | `DATABASE_URL` | unset: in-memory stores |
//! | `DATABASE_MAX_CONNECTIONS` | `10` |

use std::net::SocketAddr;

use chrono::Duration;
use thiserror::Error;

use ledgerly_auth::DEFAULT_TOKEN_TTL_SECS;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not valid: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl: Duration,
    /// `None` selects the in-memory stores.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (used by tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = match get("BIND_ADDR") {
            Some(v) => v.parse().map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: "BIND_ADDR",
                reason: e.to_string(),
            })?,
            None => SocketAddr::from(([0, 0, 0, 0], 3000)),
        };

        let jwt_secret = get("JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        let ttl_secs = match get("TOKEN_TTL_SECS") {
            Some(v) => {
                let secs = v.trim().parse::<i64>().map_err(|e| ConfigError::Invalid {
                    var: "TOKEN_TTL_SECS",
                    reason: e.to_string(),
                })?;
                if secs <= 0 {
                    return Err(ConfigError::Invalid {
                        var: "TOKEN_TTL_SECS",
                        reason: "must be positive".to_string(),
                    });
                }
                secs
            }
            None => DEFAULT_TOKEN_TTL_SECS,
        };

        let database_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v.trim().parse::<u32>().map_err(|e| ConfigError::Invalid {
                var: "DATABASE_MAX_CONNECTIONS",
                reason: e.to_string(),
            })?,
            None => 10,
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl: Duration::seconds(ttl_secs),
            database_url: get("DATABASE_URL"),
            database_max_connections,
        })
    }
}

impl core::fmt::Debug for Config {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Config")
            .field("bind_addr", &self.bind_addr)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("database_max_connections", &self.database_max_connections)
            .finish()
    }
}
