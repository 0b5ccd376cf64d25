//! Runtime configuration
//!
//! The server is configured entirely from the process environment.

use std::fmt;
use thiserror::Error;

/// Environment variable holding the bearer token.
pub const API_KEY_VAR: &str = "TOPZ_API_KEY";

/// Environment variable holding the API origin, e.g. `https://app.topz.ai`.
pub const BASE_URL_VAR: &str = "TOPZ_BASE_URL";

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set. Please set the {0} environment variable ({1}).")]
    MissingVar(&'static str, &'static str),
}

/// API connection settings, immutable once the server has started
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub base_url: String,
    pub api_key: String,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unset and empty variables are both reported as missing. The API key is
    /// checked first.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar(API_KEY_VAR, "your API key"))?;

        let base_url = lookup(BASE_URL_VAR)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::MissingVar(BASE_URL_VAR, "the base URL of the API"))?;

        Ok(Self::new(base_url, api_key))
    }

    /// Build a config directly. Trailing slashes on the base URL are dropped so
    /// endpoint paths can be appended as-is.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self {
            base_url,
            api_key: api_key.into().trim().to_string(),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
