//! Detection Validation
//!
//! Rejects malformed detections before they reach the fusion buffers:
//! bounding box ordering, bearing/range/timestamp sanity, and value ranges
//! for confidence and intensity.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{ValidationConfig, ValidationReport, Validator};
