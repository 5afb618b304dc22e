//! Animator configuration.

use serde::{Deserialize, Serialize};

use crate::error::CadenceError;
use crate::presets::DEFAULT_DURATION;
use crate::step::{Easing, Seconds};

/// What to do with a step whose kind the target has no path for
/// (for example a text transition on a plain view).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchPolicy {
    /// Complete the step immediately without touching the target.
    #[default]
    Skip,
    /// Wait out the step's delay and duration without touching the target,
    /// so the rest of a sequence keeps its timing.
    Hold,
}

/// Configuration for an [`Animator`](crate::animator::Animator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimatorConfig {
    /// Duration applied to steps built from documents that omit one.
    pub default_duration: Seconds,
    /// Easing applied to steps built from documents that omit one.
    pub default_easing: Easing,
    pub mismatch_policy: MismatchPolicy,
    /// Token start delays above this are clamped.
    pub max_start_delay: Option<Seconds>,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            default_duration: DEFAULT_DURATION,
            default_easing: Easing::EaseInOut,
            mismatch_policy: MismatchPolicy::Skip,
            max_start_delay: None,
        }
    }
}

impl AnimatorConfig {
    /// Parse and validate a JSON configuration. Missing fields take defaults.
    pub fn from_json(s: &str) -> Result<Self, CadenceError> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), CadenceError> {
        if !self.default_duration.is_finite() || self.default_duration < 0.0 {
            return Err(CadenceError::InvalidConfig {
                reason: "default_duration must be finite and non-negative".to_string(),
            });
        }
        if let Some(max) = self.max_start_delay {
            if !max.is_finite() || max < 0.0 {
                return Err(CadenceError::InvalidConfig {
                    reason: "max_start_delay must be finite and non-negative".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Sanitize a token start delay: negative or non-finite becomes zero, and
    /// values above `max_start_delay` are clamped.
    pub fn clamp_start_delay(&self, delay: Seconds) -> Seconds {
        let delay = crate::step::sanitize_seconds(delay, "start delay");
        match self.max_start_delay {
            Some(max) if delay > max => {
                log::warn!("cadence: start delay {delay} exceeds max_start_delay {max}; clamping");
                max
            }
            _ => delay,
        }
    }
}
