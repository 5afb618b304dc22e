//! Error types for the fallible input surfaces (configuration and sequence documents).
//!
//! The animation path itself never returns errors: expired targets, empty step
//! lists, redundant triggers and capability mismatches all resolve to a benign
//! default instead.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum CadenceError {
    /// Step duration was negative or not finite
    #[error("Invalid duration: {duration}")]
    InvalidDuration { duration: f64 },

    /// Step or start delay was negative or not finite
    #[error("Invalid delay: {delay}")]
    InvalidDelay { delay: f64 },

    /// Configuration rejected by validation
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// JSON document could not be parsed
    #[error("Parse error: {reason}")]
    Parse { reason: String },

    /// Step kind cannot be represented in a serialized sequence
    #[error("Unsupported step kind: {kind}")]
    UnsupportedStep { kind: String },
}

impl CadenceError {
    /// Check if this error came from malformed timing values
    #[inline]
    pub fn is_timing_error(&self) -> bool {
        matches!(self, Self::InvalidDuration { .. } | Self::InvalidDelay { .. })
    }
}

impl From<serde_json::Error> for CadenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}
