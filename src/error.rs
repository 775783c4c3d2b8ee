//! Error Taxonomy Module
//!
//! Every failure the calculation can produce. Core functions never recover
//! locally; they propagate one of these to the caller.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    /// Malformed or out-of-range request input, one message per field
    #[error("invalid request: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("no timezone found for latitude {latitude}, longitude {longitude}")]
    LocationResolution { latitude: f64, longitude: f64 },

    #[error("irradiance data unavailable: {0}")]
    DataUnavailable(String),

    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}
