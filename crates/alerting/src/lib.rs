//! Alerting System
//!
//! Raises and clears proximity alerts for tracked objects that come within a
//! distance threshold of the platform.

mod manager;

pub use detection_types::TrackKey;
pub use manager::{
    AlertState, ProximityConfig, ProximityAlertManager, ProximityEvent, DEFAULT_THRESHOLD_M,
};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlertError {
    #[error("Invalid proximity threshold: {0} (must be finite and positive)")]
    InvalidThreshold(f64),
}
