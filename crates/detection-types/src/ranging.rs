//! Ranging sensor detections

use serde::{Deserialize, Serialize};

/// Normalize a bearing into [0, 360)
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Detection from the ranging sensor (radar/lidar)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangingDetection {
    /// Bearing in degrees, [0, 360)
    pub angle: f64,

    /// Range in meters
    pub distance: f64,

    /// Measurement timestamp (seconds)
    pub timestamp: f64,

    /// Return intensity (0.0 to 1.0)
    pub intensity: Option<f64>,

    /// Elevation angle (degrees)
    pub elevation: Option<f64>,

    /// Track ID assigned by the ranging sensor
    pub track_id: Option<u32>,
}

impl RangingDetection {
    /// Create a detection; the bearing is normalized into [0, 360)
    pub fn new(angle: f64, distance: f64, timestamp: f64) -> Self {
        Self {
            angle: normalize_angle(angle),
            distance,
            timestamp,
            intensity: None,
            elevation: None,
            track_id: None,
        }
    }

    pub fn with_intensity(mut self, intensity: f64) -> Self {
        self.intensity = Some(intensity);
        self
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }

    pub fn with_track_id(mut self, track_id: u32) -> Self {
        self.track_id = Some(track_id);
        self
    }
}
