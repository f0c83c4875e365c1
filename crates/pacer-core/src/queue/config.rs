//! Dispatch queue configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::RateLimit;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Dispatch queue configuration.
///
/// Every field has a default, so `{}` is a valid config (2 sends/second, no timeout).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Sends the provider permits per second. The inter-send delay is the inverse.
    pub sends_per_second: f64,

    /// Explicit inter-send delay. Overrides `sends_per_second` when set.
    pub inter_send_delay_ms: Option<u64>,

    /// Per-send timeout. `None` means a hung send stalls the backlog.
    pub send_timeout_ms: Option<u64>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            sends_per_second: RateLimit::DEFAULT_SENDS_PER_SECOND,
            inter_send_delay_ms: None,
            send_timeout_ms: None,
        }
    }
}

impl DispatchConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// - `sends_per_second` unusable while no explicit delay is given
    /// - `send_timeout_ms` of zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.inter_send_delay_ms.is_none()
            && RateLimit::per_second(self.sends_per_second).is_none()
        {
            return Err(ConfigError::Invalid(format!(
                "sends_per_second must be a positive finite number, got {}",
                self.sends_per_second
            )));
        }
        if self.send_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "send_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Rate limit described by this config. Call `validate` first; an
    /// unusable rate falls back to the default.
    pub fn rate_limit(&self) -> RateLimit {
        match self.inter_send_delay_ms {
            Some(ms) => RateLimit::from_spacing(Duration::from_millis(ms)),
            None => RateLimit::per_second(self.sends_per_second).unwrap_or_default(),
        }
    }

    pub fn send_timeout(&self) -> Option<Duration> {
        self.send_timeout_ms.map(Duration::from_millis)
    }
}
