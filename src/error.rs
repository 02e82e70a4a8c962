//! Error types for the spectromorph crate.

use std::fmt;

/// Errors that can occur while configuring a morphing engine.
///
/// The real-time path (`process`) is infallible: every numerical anomaly is
/// recovered locally and tallied, never propagated. Errors only surface at
/// construction and reconfiguration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MorphError {
    /// Invalid engine configuration (non-positive sizes, unusable ratios).
    InvalidConfig(String),
    /// The analysis window is too short for the requested overlap.
    WindowTooShort { window_len: usize, minimum: usize },
}

impl fmt::Display for MorphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MorphError::InvalidConfig(msg) => write!(f, "invalid configuration: {}", msg),
            MorphError::WindowTooShort {
                window_len,
                minimum,
            } => {
                write!(
                    f,
                    "analysis window too short: {} samples, {} required",
                    window_len, minimum
                )
            }
        }
    }
}

impl std::error::Error for MorphError {}
