//! Detection Association
//!
//! Pairs camera detections with ranging detections:
//! - projects each camera bbox into bearing space (sector geometry)
//! - hard gates: same sector, bearing delta, timestamp delta
//! - weighted quality score for pairs that pass every gate
//! - deterministic greedy one-to-one assignment

pub mod config;
pub mod distance;
pub mod engine;

pub use config::AssociationConfig;
pub use distance::{angle_distance, time_distance};
pub use engine::{AssociationEngine, Assignment, GateFailure, GateStats, MatchedPair};

use thiserror::Error;

/// Association configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssociationError {
    #[error("{name} must be positive and finite, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("{name} must be non-negative, got {value}")]
    InvalidWeight { name: &'static str, value: f64 },

    #[error("angle_weight + time_weight must equal 1.0, got {0}")]
    WeightSum(f64),
}
