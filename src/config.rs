//! Detector configuration
//!
//! All fields are optional in JSON; missing ones take the defaults below.

use crate::detector::error::{DetectorError, DetectorResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable naming a JSON config file
pub const CONFIG_ENV_VAR: &str = "SELECTION_DETECTOR_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectorConfig {
    /// Interval between input samples
    pub poll_interval_ms: u64,
    /// Press-to-release travel must exceed this to count as a drag
    pub drag_threshold_px: f64,
    /// Pause after release before querying accessibility
    pub settle_delay_ms: u64,
    /// Window in which identical text is reported as cooling down
    pub cooldown_ms: u64,
    /// Whether the host clears the last emitted text after each event
    pub rearm_after_consume: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 300,
            drag_threshold_px: 5.0,
            settle_delay_ms: 500,
            cooldown_ms: 1000,
            rearm_after_consume: false,
        }
    }
}

impl DetectorConfig {
    /// Load and validate a JSON config file
    pub fn load(path: impl AsRef<Path>) -> DetectorResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the file named by `SELECTION_DETECTOR_CONFIG`, or defaults
    pub fn from_env() -> DetectorResult<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => {
                tracing::info!("Loading detector config from {:?}", path);
                Self::load(path)
            }
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> DetectorResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(DetectorError::ConfigurationError(
                "pollIntervalMs must be greater than zero".to_string(),
            ));
        }
        if !self.drag_threshold_px.is_finite() || self.drag_threshold_px < 0.0 {
            return Err(DetectorError::ConfigurationError(format!(
                "dragThresholdPx must be a non-negative number, got {}",
                self.drag_threshold_px
            )));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
