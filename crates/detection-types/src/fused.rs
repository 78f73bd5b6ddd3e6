//! Fused output records

use serde::{Deserialize, Serialize};

use crate::camera::BBox;

/// Class label for ranging-only records without heuristic classification
pub const UNKNOWN_CLASS: &str = "UNKNOWN";

/// Which streams contributed to a fused record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionSource {
    /// Camera and ranging detection paired
    Matched,
    /// Camera detection without a ranging partner
    CameraOnly,
    /// Ranging detection without a camera partner
    RangingOnly,
}

impl FusionSource {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            FusionSource::Matched => "matched",
            FusionSource::CameraOnly => "camera_only",
            FusionSource::RangingOnly => "ranging_only",
        }
    }

    /// Number of input detections consumed by one record of this kind
    pub fn contributions(&self) -> usize {
        match self {
            FusionSource::Matched => 2,
            FusionSource::CameraOnly | FusionSource::RangingOnly => 1,
        }
    }
}

/// Identity under which consumers follow a record across cycles.
///
/// Camera tracker IDs are only unique per camera, and the ranging sensor
/// numbers its tracks independently, so the stream is part of the key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKey {
    /// Camera tracker ID, scoped to the reporting camera
    Camera { camera_id: Option<u32>, track_id: u32 },
    /// Ranging sensor track ID
    Ranging(u32),
}

/// Obstacle produced by one fuse cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusedDetection {
    /// Object class (camera label, or ranging fallback)
    pub class_name: String,

    /// Camera tracker ID
    pub track_id: Option<u32>,

    /// Bearing in degrees, [0, 360)
    pub angle: f64,

    /// Range in meters (ranging > camera estimate > sentinel)
    pub distance: f64,

    /// Record timestamp (seconds)
    pub timestamp: f64,

    pub has_camera: bool,
    pub has_ranging: bool,

    /// Source camera
    pub camera_id: Option<u32>,

    /// Bounding box from the camera
    pub bbox: Option<BBox>,

    /// Detection confidence from the camera
    pub confidence: Option<f64>,

    /// Return intensity from the ranging sensor
    pub ranging_intensity: Option<f64>,

    /// Ranging sensor track ID
    pub ranging_track_id: Option<u32>,

    /// Fusion quality score (0.0 to 1.0)
    pub fusion_quality: f64,

    /// Bearing difference between the paired detections (matched only)
    pub angle_diff: Option<f64>,

    /// Timestamp difference between the paired detections (matched only)
    pub time_diff: Option<f64>,
}

impl FusedDetection {
    /// Which streams produced this record
    pub fn source(&self) -> FusionSource {
        match (self.has_camera, self.has_ranging) {
            (true, true) => FusionSource::Matched,
            (true, false) => FusionSource::CameraOnly,
            _ => FusionSource::RangingOnly,
        }
    }

    /// Camera track, falling back to the ranging track
    pub fn track_key(&self) -> Option<TrackKey> {
        match (self.track_id, self.ranging_track_id) {
            (Some(track_id), _) => Some(TrackKey::Camera {
                camera_id: self.camera_id,
                track_id,
            }),
            (None, Some(track_id)) => Some(TrackKey::Ranging(track_id)),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranging_only() -> FusedDetection {
        FusedDetection {
            class_name: UNKNOWN_CLASS.to_string(),
            track_id: None,
            angle: 10.0,
            distance: 30.0,
            timestamp: 1.0,
            has_camera: false,
            has_ranging: true,
            camera_id: None,
            bbox: None,
            confidence: None,
            ranging_intensity: Some(0.2),
            ranging_track_id: Some(4),
            fusion_quality: 0.3,
            angle_diff: None,
            time_diff: None,
        }
    }

    #[test]
    fn test_source_from_flags() {
        let mut det = ranging_only();
        assert_eq!(det.source(), FusionSource::RangingOnly);
        det.has_camera = true;
        assert_eq!(det.source(), FusionSource::Matched);
        det.has_ranging = false;
        assert_eq!(det.source(), FusionSource::CameraOnly);
    }

    #[test]
    fn test_track_key_prefers_camera_track() {
        let mut det = ranging_only();
        assert_eq!(det.track_key(), Some(TrackKey::Ranging(4)));
        det.track_id = Some(9);
        det.camera_id = Some(2);
        assert_eq!(
            det.track_key(),
            Some(TrackKey::Camera {
                camera_id: Some(2),
                track_id: 9
            })
        );
        det.track_id = None;
        det.ranging_track_id = None;
        assert_eq!(det.track_key(), None);
    }

    #[test]
    fn test_track_key_separates_streams_and_cameras() {
        let mut camera = ranging_only();
        camera.ranging_track_id = None;
        camera.track_id = Some(4);
        let ranging = ranging_only();
        assert_ne!(camera.track_key(), ranging.track_key());

        let mut other_camera = camera.clone();
        other_camera.camera_id = Some(3);
        assert_ne!(camera.track_key(), other_camera.track_key());
    }
}
