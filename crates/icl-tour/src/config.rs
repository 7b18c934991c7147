#![forbid(unsafe_code)]

//! Tour playback configuration.
//!
//! Values are layered: defaults, then an optional JSON file, then
//! `ICL_TOUR_*` environment variables. Command-line flags (handled by the
//! driver binary) override all of them.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{TourError, TourResult};
use crate::sequencer::DEFAULT_CLOSING_DELAY;

pub const ENV_SPEED: &str = "ICL_TOUR_SPEED";
pub const ENV_CLOSING_DELAY_MS: &str = "ICL_TOUR_CLOSING_DELAY_MS";
pub const ENV_AUTOPLAY: &str = "ICL_TOUR_AUTOPLAY";

/// Speeds offered by the control panel.
pub const SPEED_PRESETS: [f64; 4] = [0.5, 1.0, 1.5, 2.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TourConfig {
    /// Playback speed multiplier; step durations are divided by it.
    pub speed: f64,
    /// Pause between the last step and the close notification.
    #[serde(rename = "closing_delay_ms", with = "crate::step::duration_ms")]
    pub closing_delay: Duration,
    /// Start playing as soon as the tour is opened.
    pub autoplay: bool,
    /// Number of step markers shown in the jump grid.
    pub max_overlay_steps: usize,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self {
            speed: 1.0,
            closing_delay: DEFAULT_CLOSING_DELAY,
            autoplay: false,
            max_overlay_steps: 15,
        }
    }
}

impl TourConfig {
    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> TourResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> TourResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> TourResult<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(TourError::InvalidConfig(format!(
                "speed must be a positive number, got {}",
                self.speed
            )));
        }
        if self.max_overlay_steps == 0 {
            return Err(TourError::InvalidConfig(
                "max_overlay_steps must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`. Unparseable values are logged and
    /// ignored.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup(ENV_SPEED) {
            match val.trim().parse::<f64>() {
                Ok(speed) if speed.is_finite() && speed > 0.0 => self.speed = speed,
                _ => warn!(var = ENV_SPEED, value = %val, "ignoring invalid speed"),
            }
        }
        if let Some(val) = lookup(ENV_CLOSING_DELAY_MS) {
            match val.trim().parse::<u64>() {
                Ok(ms) => self.closing_delay = Duration::from_millis(ms),
                Err(_) => warn!(var = ENV_CLOSING_DELAY_MS, value = %val, "ignoring invalid delay"),
            }
        }
        if let Some(val) = lookup(ENV_AUTOPLAY) {
            match parse_flag(&val) {
                Some(flag) => self.autoplay = flag,
                None => warn!(var = ENV_AUTOPLAY, value = %val, "ignoring invalid flag"),
            }
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
