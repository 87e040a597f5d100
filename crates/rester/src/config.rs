use std::env;

use thiserror::Error;

use rester_core::persistence::{AdapterConfig, StoreFailurePolicy};

const DEFAULT_LOG_FILTER: &str = "rester=debug,rester_core=debug";

/// Errors raised while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },
}

/// Configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// How backend failures are reported (default: distinct)
    pub store_failure: StoreFailurePolicy,
    /// Log filter used when `RUST_LOG` is unset (default: "rester=debug,rester_core=debug")
    pub log_filter: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RESTER_STORE_FAILURE` - `distinct` or `legacy` (default: distinct)
    /// - `RESTER_LOG` - fallback log filter (default: "rester=debug,rester_core=debug")
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store_failure = match lookup("RESTER_STORE_FAILURE") {
            Some(value) => value
                .parse::<StoreFailurePolicy>()
                .map_err(|reason| ConfigError::InvalidValue {
                    var: "RESTER_STORE_FAILURE",
                    reason,
                })?,
            None => StoreFailurePolicy::default(),
        };

        Ok(Self {
            store_failure,
            log_filter: lookup("RESTER_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        })
    }

    /// Adapter settings derived from this configuration.
    pub fn adapter_config(&self) -> AdapterConfig {
        AdapterConfig {
            store_failure: self.store_failure,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_failure: StoreFailurePolicy::default(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}
