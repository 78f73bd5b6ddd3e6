//! Detection Fusion
//!
//! Combines camera detections (bounding boxes in per-camera pixel space)
//! with ranging detections (bearing + distance) into unified
//! [`FusedDetection`] records.
//!
//! Each fuse pass:
//! 1. Projects camera bounding boxes onto absolute bearings
//! 2. Runs sector/angle/time gated greedy association
//! 3. Synthesizes matched, camera-only and ranging-only records
//! 4. Records a [`SensorFrame`] in bounded history and notifies listeners
//!
//! Two operating modes are supported: a buffered cycle, where detections
//! accumulate until [`FusionManager::process_frame`] drains them, and
//! snapshot replacement, where each sensor publishes its full current view
//! and [`FusionManager::fuse`] re-fuses without clearing.

pub mod classifier;
pub mod config;
pub mod listener;
pub mod manager;
pub mod synthesizer;

pub use classifier::RangingClassifier;
pub use config::{FusionConfig, FusionMode};
pub use listener::{ChannelListener, FusionListener};
pub use manager::FusionManager;
pub use synthesizer::{FusionSynthesizer, SynthesisConfig};

pub use detection_types::{
    CameraDetection, FusedDetection, FusionSource, RangingDetection, SensorFrame,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FusionError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Association error: {0}")]
    Association(#[from] association::AssociationError),

    #[error("Geometry error: {0}")]
    Geometry(#[from] sector_geometry::GeometryError),

    #[error("Detection rejected: {0}")]
    Rejected(#[from] data_validator::ValidationError),

    #[error("Operation '{operation}' is not available in {mode} mode")]
    WrongMode {
        operation: &'static str,
        mode: FusionMode,
    },

    #[error("Fusion state lock poisoned")]
    Lock,
}
