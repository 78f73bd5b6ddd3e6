//! Validation Error Types

use thiserror::Error;

/// Reasons a detection is rejected at ingestion
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Bounding box corners not ordered (x1 < x2, y1 < y2)
    #[error("Malformed bounding box {bbox:?}")]
    MalformedBBox { bbox: [f64; 4] },

    /// NaN or infinite value (unusable timestamp, bearing, ...)
    #[error("{0} is not a finite number")]
    NonFinite(&'static str),

    /// Required text field is empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
