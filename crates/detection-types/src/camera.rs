//! Vision-classified detections

use serde::{Deserialize, Serialize};

/// Bounding box [x1, y1, x2, y2] in pixels
pub type BBox = [f64; 4];

/// Detection from one of the cameras
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraDetection {
    /// Bounding box [x1, y1, x2, y2], x1 < x2 and y1 < y2
    pub bbox: BBox,

    /// Detected object class
    pub class_name: String,

    /// Tracker ID assigned by the detection producer
    pub track_id: Option<u32>,

    /// Capture timestamp (seconds)
    pub timestamp: f64,

    /// Detection confidence (0.0 to 1.0)
    pub confidence: Option<f64>,

    /// Source camera, selects the angular sector
    pub camera_id: Option<u32>,

    /// Monocular distance estimate (meters)
    pub distance: Option<f64>,
}

impl CameraDetection {
    /// Create a detection with only the mandatory fields set
    pub fn new(bbox: BBox, class_name: impl Into<String>, timestamp: f64) -> Self {
        Self {
            bbox,
            class_name: class_name.into(),
            track_id: None,
            timestamp,
            confidence: None,
            camera_id: None,
            distance: None,
        }
    }

    pub fn with_track_id(mut self, track_id: u32) -> Self {
        self.track_id = Some(track_id);
        self
    }

    pub fn with_camera_id(mut self, camera_id: u32) -> Self {
        self.camera_id = Some(camera_id);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    /// Horizontal center of the bounding box
    pub fn center_x(&self) -> f64 {
        (self.bbox[0] + self.bbox[2]) / 2.0
    }

    /// Bounding box width in pixels (negative if malformed)
    pub fn width(&self) -> f64 {
        self.bbox[2] - self.bbox[0]
    }

    /// Bounding box height in pixels (negative if malformed)
    pub fn height(&self) -> f64 {
        self.bbox[3] - self.bbox[1]
    }
}
