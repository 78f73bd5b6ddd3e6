//! Fuse cycle snapshots

use serde::{Deserialize, Serialize};

use crate::camera::CameraDetection;
use crate::fused::{FusedDetection, FusionSource};
use crate::ranging::RangingDetection;

/// Inputs and outputs of one fuse cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorFrame {
    /// Sequence number within the owning manager
    pub frame_id: u64,

    /// Cycle timestamp (seconds)
    pub frame_timestamp: f64,

    pub camera_detections: Vec<CameraDetection>,
    pub ranging_detections: Vec<RangingDetection>,
    pub fused_detections: Vec<FusedDetection>,
}

impl SensorFrame {
    fn count(&self, source: FusionSource) -> usize {
        self.fused_detections
            .iter()
            .filter(|d| d.source() == source)
            .count()
    }

    pub fn matched_count(&self) -> usize {
        self.count(FusionSource::Matched)
    }

    pub fn camera_only_count(&self) -> usize {
        self.count(FusionSource::CameraOnly)
    }

    pub fn ranging_only_count(&self) -> usize {
        self.count(FusionSource::RangingOnly)
    }

    /// Input detections accounted for by the fused records
    pub fn contribution_count(&self) -> usize {
        self.fused_detections
            .iter()
            .map(|d| d.source().contributions())
            .sum()
    }

    /// Whether every input appears in exactly one contribution role
    pub fn is_conserved(&self) -> bool {
        self.contribution_count() == self.camera_detections.len() + self.ranging_detections.len()
    }

    /// Mean fusion quality over the fused records (0.0 if empty)
    pub fn mean_quality(&self) -> f64 {
        if self.fused_detections.is_empty() {
            return 0.0;
        }
        let total: f64 = self.fused_detections.iter().map(|d| d.fusion_quality).sum();
        total / self.fused_detections.len() as f64
    }
}
