//! Sector Geometry
//!
//! Projects camera detections into the bearing space of the ranging sensor.
//! Every camera owns a disjoint angular sector of the 360° sweep; the
//! horizontal position of a bounding box inside the frame maps linearly onto
//! that sector.

pub mod mapper;
pub mod sector;

pub use mapper::{GeometryMapper, Projection, DEFAULT_FRAME_WIDTH};
pub use sector::{Sector, SectorTable, DEFAULT_FALLBACK_CAMERA};

use thiserror::Error;

/// Geometry configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Sector table is empty")]
    EmptyTable,

    #[error("Camera {camera_id}: span {span_deg} must be in (0, 360]")]
    InvalidSpan { camera_id: u32, span_deg: f64 },

    #[error("Camera {0}: sector start is not finite")]
    NonFiniteStart(u32),

    #[error("Camera {0} appears more than once")]
    DuplicateCamera(u32),

    #[error("Sectors of cameras {first} and {second} overlap")]
    Overlap { first: u32, second: u32 },

    #[error("Fallback camera {0} has no sector")]
    MissingFallback(u32),

    #[error("Frame width must be positive, got {0}")]
    InvalidFrameWidth(f64),
}
