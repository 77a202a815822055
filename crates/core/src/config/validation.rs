//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::Config(err.to_string())
    }
}

/// Longest search freshness window accepted, one year.
pub const MAX_SEARCH_FRESHNESS_HOURS: u64 = 24 * 365;

fn check_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if value < 100 {
        return Err(ConfigError::Invalid { field: field.into(), reason: "must be at least 100ms".into() });
    }
    if value > 300_000 {
        return Err(ConfigError::Invalid {
            field: field.into(),
            reason: "must not exceed 5 minutes (300000ms)".into(),
        });
    }
    Ok(())
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `timeout_ms` or `search_timeout_ms` is under 100ms or over 5 minutes
    /// - `user_agent` is empty
    /// - `search_freshness_hours` or `page_size` is 0
    /// - `search_freshness_hours` exceeds one year
    /// - `warm_probability` is outside `[0, 1]`
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_timeout("timeout_ms", self.timeout_ms)?;
        check_timeout("search_timeout_ms", self.search_timeout_ms)?;

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.search_freshness_hours == 0 {
            return Err(ConfigError::Invalid {
                field: "search_freshness_hours".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.search_freshness_hours > MAX_SEARCH_FRESHNESS_HOURS {
            return Err(ConfigError::Invalid {
                field: "search_freshness_hours".into(),
                reason: format!("must not exceed one year ({MAX_SEARCH_FRESHNESS_HOURS} hours)"),
            });
        }

        if self.page_size == 0 {
            return Err(ConfigError::Invalid { field: "page_size".into(), reason: "must be greater than 0".into() });
        }

        if !(0.0..=1.0).contains(&self.warm_probability) {
            return Err(ConfigError::Invalid {
                field: "warm_probability".into(),
                reason: "must be between 0 and 1".into(),
            });
        }

        if self.warm_batch_size == 0 && self.warm_probability > 0.0 {
            tracing::warn!(
                warm_probability = self.warm_probability,
                "warm_batch_size is 0; opportunistic warming will never fetch anything"
            );
        }

        Ok(())
    }
}
