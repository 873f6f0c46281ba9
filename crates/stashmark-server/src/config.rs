//! Configuration from the environment
//!
//! Settings are read from `STASHMARK_*` variables, optionally seeded from a
//! `.env` file:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `STASHMARK_ADDRESS` | `127.0.0.1` |
//! | `STASHMARK_PORT` | `8080` |
//! | `STASHMARK_ROOT_PATH` | `/` |
//! | `STASHMARK_BODY_LIMIT` | `1048576` |
//! | `STASHMARK_ASSET_MAX_AGE` | `3600` |
//! | `STASHMARK_TRACKING_PARAMS` | empty (comma separated) |
//! | `STASHMARK_ENV` | `development` |

use crate::app::DEFAULT_BODY_LIMIT;
use serde::Deserialize;
use std::fmt;
use std::net::{AddrParseError, IpAddr, SocketAddr};
use thiserror::Error;

pub const ENV_PREFIX: &str = "STASHMARK_";
pub const ENV_PROFILE_VAR: &str = "STASHMARK_ENV";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Env(#[from] envy::Error),

    #[error("invalid listen address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddrParseError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Path the application is mounted under; also the service worker scope
    pub root_path: String,
    pub body_limit: usize,
    pub asset_max_age: u64,
    /// Query parameters stripped from shared URLs on top of `utm_*`
    pub tracking_params: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
            root_path: "/".to_string(),
            body_limit: DEFAULT_BODY_LIMIT,
            asset_max_age: 3600,
            tracking_params: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Read `STASHMARK_*` variables, falling back to defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: Self = envy::prefixed(ENV_PREFIX).from_env()?;
        Ok(config.normalized())
    }

    /// Ensure `root_path` starts and ends with `/`
    pub fn normalized(mut self) -> Self {
        let trimmed = self.root_path.trim().trim_matches('/');
        self.root_path = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        };
        self
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .address
            .parse()
            .map_err(|source| ConfigError::InvalidAddress {
                address: self.address.clone(),
                source,
            })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Deployment profile, read from `STASHMARK_ENV`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Custom(String),
}

impl Environment {
    /// `production`/`prod` and `development`/`dev` are recognised; unset
    /// means development
    pub fn current() -> Self {
        match std::env::var(ENV_PROFILE_VAR).as_deref() {
            Ok("production") | Ok("prod") => Self::Production,
            Ok("development") | Ok("dev") | Err(_) => Self::Development,
            Ok(other) => Self::Custom(other.to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Level for our own crates when `RUST_LOG` is unset
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Self::Development => "debug",
            Self::Production | Self::Custom(_) => "info",
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load `.env` from the working directory, if there is one.
///
/// Variables already set in the process environment win.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Load variables from a specific file; a missing file is an error
pub fn load_dotenv_from<P: AsRef<std::path::Path>>(path: P) -> Result<(), dotenvy::Error> {
    dotenvy::from_path(path)
}
