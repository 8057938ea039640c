//! Error types for the companion core
//!
//! Animation paths never fail: out-of-range input is clamped where it is
//! used. Only configuration loading and validation can return an error.

use thiserror::Error;

/// Core PCPOS errors
#[derive(Error, Debug)]
pub enum PcposError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Configuration parse error: {0}")]
    ConfigParse(String),
}

impl From<serde_json::Error> for PcposError {
    fn from(err: serde_json::Error) -> Self {
        PcposError::ConfigParse(err.to_string())
    }
}

/// Result type for PCPOS operations
pub type PcposResult<T> = Result<T, PcposError>;

/// Fail with `InvalidConfig` unless `value` lies in `(0, 1]`
pub fn ensure_unit_factor(name: &str, value: f32) -> PcposResult<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(PcposError::InvalidConfig(format!(
            "{name} must be in (0, 1], got {value}"
        )))
    }
}

/// Fail with `InvalidConfig` unless `value` is strictly positive
pub fn ensure_positive(name: &str, value: f32) -> PcposResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(PcposError::InvalidConfig(format!(
            "{name} must be positive, got {value}"
        )))
    }
}
