//! Client configuration.
//!
//! Values come from `Default`, the `with_*` setters, or the environment via
//! [`Configuration::from_env`].

use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_BASE_PATH: &str = "http://petstore.swagger.io/v2";

pub const DEFAULT_USER_AGENT: &str = concat!("store-client/", env!("CARGO_PKG_VERSION"));

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings shared by `StoreClient` and `UreqClient`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub base_path: String,
    /// Sent as the `api_key` header on calls that require it.
    pub api_key: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            base_path: DEFAULT_BASE_PATH.to_string(),
            api_key: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Configuration {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read `STORE_BASE_PATH`, `STORE_API_KEY` and `STORE_TIMEOUT_SECS`,
    /// falling back to defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(base_path) = lookup("STORE_BASE_PATH") {
            config.base_path = base_path;
        }
        if let Some(api_key) = lookup("STORE_API_KEY").filter(|k| !k.is_empty()) {
            config.api_key = Some(api_key);
        }
        if let Some(raw) = lookup("STORE_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidVar {
                    name: "STORE_TIMEOUT_SECS",
                    value: raw.clone(),
                    reason: e.to_string(),
                }
            })?;
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}
