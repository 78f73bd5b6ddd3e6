//! Tactical Overlay
//!
//! Turns fused detections into labelled obstacles for a polar tactical map.
//! Entries are keyed by track so repeated sightings update in place, and
//! tracks not seen for a configurable number of cycles are evicted.

mod adapter;
mod obstacle;

pub use adapter::{OverlayAdapter, OverlayConfig, OverlayEntry, OverlayListener};
pub use obstacle::{display_label, ObstacleType};
