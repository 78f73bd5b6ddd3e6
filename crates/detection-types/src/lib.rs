//! Detection Records
//!
//! Value types exchanged between the detection producers, the fusion engine
//! and the display side:
//! - [`CameraDetection`] - pixel-space, classified, per-camera
//! - [`RangingDetection`] - bearing + range from a radar/lidar-like sensor
//! - [`FusedDetection`] - one output record per fused obstacle
//! - [`SensorFrame`] - immutable snapshot of one fuse cycle

pub mod camera;
pub mod frame;
pub mod fused;
pub mod ranging;

pub use camera::{BBox, CameraDetection};
pub use frame::SensorFrame;
pub use fused::{FusedDetection, FusionSource, TrackKey, UNKNOWN_CLASS};
pub use ranging::{normalize_angle, RangingDetection};
