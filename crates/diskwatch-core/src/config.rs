use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::duration::{parse_duration, DurationError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("polling interval: {0}")]
    PollingInterval(#[source] DurationError),
    #[error("nag interval: {0}")]
    NagInterval(#[source] DurationError),
    #[error("threshold must be within 0..=100, got {0}")]
    ThresholdOutOfRange(f64),
    #[error("target must not be empty")]
    EmptyTarget,
}

#[derive(Clone)]
pub struct Credentials {
    pub app_token: String,
    pub user_key: String,
}

impl Credentials {
    pub fn new(app_token: impl Into<String>, user_key: impl Into<String>) -> Self {
        Self {
            app_token: app_token.into(),
            user_key: user_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("app_token", &"<redacted>")
            .field("user_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub target: String,
    pub polling_interval: Duration,
    pub threshold: f64,
    pub nag_interval: Duration,
    pub credentials: Credentials,
    pub collect_diagnostics: bool,
}

impl MonitorConfig {
    pub fn new(
        target: impl Into<String>,
        polling_interval: &str,
        threshold: f64,
        nag_interval: &str,
        credentials: Credentials,
    ) -> Result<Self, ConfigError> {
        let target = target.into();
        if target.trim().is_empty() {
            return Err(ConfigError::EmptyTarget);
        }
        if !(0.0..=100.0).contains(&threshold) {
            return Err(ConfigError::ThresholdOutOfRange(threshold));
        }

        Ok(Self {
            target,
            polling_interval: parse_duration(polling_interval).map_err(ConfigError::PollingInterval)?,
            threshold,
            nag_interval: parse_duration(nag_interval).map_err(ConfigError::NagInterval)?,
            credentials,
            collect_diagnostics: true,
        })
    }

    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.collect_diagnostics = enabled;
        self
    }
}
