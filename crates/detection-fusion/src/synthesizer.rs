//! Fused record synthesis
//!
//! Turns an association result into exactly one output record per input
//! detection role: matched pairs, camera-only and ranging-only records.

use association::{Assignment, MatchedPair};
use detection_types::{CameraDetection, FusedDetection, RangingDetection};
use serde::{Deserialize, Serialize};
use sector_geometry::Projection;

use crate::classifier::RangingClassifier;

/// Policy for single-sensor records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Distance reported for camera-only records without an estimate (meters)
    pub camera_only_distance_m: f64,

    /// Fusion quality of camera-only records
    pub camera_only_quality: f64,

    /// Fusion quality of ranging-only records
    pub ranging_only_quality: f64,

    /// Label fallback for ranging-only records
    pub classifier: RangingClassifier,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            camera_only_distance_m: 100.0,
            camera_only_quality: 0.5,
            ranging_only_quality: 0.3,
            classifier: RangingClassifier::default(),
        }
    }
}

impl SynthesisConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(self.camera_only_distance_m.is_finite() && self.camera_only_distance_m >= 0.0) {
            return Err(format!(
                "camera_only_distance_m must be non-negative, got {}",
                self.camera_only_distance_m
            ));
        }
        for (name, value) in [
            ("camera_only_quality", self.camera_only_quality),
            ("ranging_only_quality", self.ranging_only_quality),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be in [0, 1], got {}", name, value));
            }
        }
        self.classifier.validate()
    }
}

/// Builds fused records from an assignment
#[derive(Debug, Clone)]
pub struct FusionSynthesizer {
    config: SynthesisConfig,
}

impl FusionSynthesizer {
    pub fn new(config: SynthesisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    /// Matched pairs (camera order), then camera-only, then ranging-only
    pub fn synthesize(
        &self,
        cameras: &[CameraDetection],
        ranging: &[RangingDetection],
        assignment: &Assignment,
    ) -> Vec<FusedDetection> {
        let mut fused = Vec::with_capacity(
            assignment.matches.len()
                + assignment.unmatched_camera.len()
                + assignment.unmatched_ranging.len(),
        );

        for pair in &assignment.matches {
            fused.push(self.matched(&cameras[pair.camera_index], &ranging[pair.ranging_index], pair));
        }
        for &index in &assignment.unmatched_camera {
            fused.push(self.camera_only(&cameras[index], &assignment.projections[index]));
        }
        for &index in &assignment.unmatched_ranging {
            fused.push(self.ranging_only(&ranging[index]));
        }

        fused
    }

    /// Ranging supplies position, camera supplies identity
    pub fn matched(
        &self,
        camera: &CameraDetection,
        ranging: &RangingDetection,
        pair: &MatchedPair,
    ) -> FusedDetection {
        FusedDetection {
            class_name: camera.class_name.clone(),
            track_id: camera.track_id,
            angle: ranging.angle,
            distance: ranging.distance,
            timestamp: (camera.timestamp + ranging.timestamp) / 2.0,
            has_camera: true,
            has_ranging: true,
            camera_id: camera.camera_id,
            bbox: Some(camera.bbox),
            confidence: camera.confidence,
            ranging_intensity: ranging.intensity,
            ranging_track_id: ranging.track_id,
            fusion_quality: pair.score,
            angle_diff: Some(pair.angle_diff),
            time_diff: Some(pair.time_diff),
        }
    }

    /// Camera detection without ranging confirmation
    pub fn camera_only(&self, camera: &CameraDetection, projection: &Projection) -> FusedDetection {
        FusedDetection {
            class_name: camera.class_name.clone(),
            track_id: camera.track_id,
            angle: projection.angle,
            distance: camera.distance.unwrap_or(self.config.camera_only_distance_m),
            timestamp: camera.timestamp,
            has_camera: true,
            has_ranging: false,
            camera_id: camera.camera_id,
            bbox: Some(camera.bbox),
            confidence: camera.confidence,
            ranging_intensity: None,
            ranging_track_id: None,
            fusion_quality: self.config.camera_only_quality,
            angle_diff: None,
            time_diff: None,
        }
    }

    /// Ranging detection without camera confirmation
    pub fn ranging_only(&self, ranging: &RangingDetection) -> FusedDetection {
        FusedDetection {
            class_name: self.config.classifier.classify(ranging).to_string(),
            track_id: None,
            angle: ranging.angle,
            distance: ranging.distance,
            timestamp: ranging.timestamp,
            has_camera: false,
            has_ranging: true,
            camera_id: None,
            bbox: None,
            confidence: None,
            ranging_intensity: ranging.intensity,
            ranging_track_id: ranging.track_id,
            fusion_quality: self.config.ranging_only_quality,
            angle_diff: None,
            time_diff: None,
        }
    }
}

impl Default for FusionSynthesizer {
    fn default() -> Self {
        Self::new(SynthesisConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use association::{AssociationConfig, AssociationEngine};
    use detection_types::{FusionSource, UNKNOWN_CLASS};
    use sector_geometry::GeometryMapper;

    fn strict_engine() -> AssociationEngine {
        AssociationEngine::new(AssociationConfig::strict(), GeometryMapper::default()).unwrap()
    }

    fn scenario_camera() -> CameraDetection {
        CameraDetection::new([1780.0, 400.0, 1846.0, 520.0], "boat", 100.00)
            .with_camera_id(1)
            .with_track_id(3)
            .with_confidence(0.87)
    }

    #[test]
    fn test_matched_record() {
        let cameras = [scenario_camera()];
        let ranging = [RangingDetection::new(132.0, 120.0, 100.01)
            .with_intensity(0.6)
            .with_track_id(11)];
        let assignment = strict_engine().associate(&cameras, &ranging);
        let fused = FusionSynthesizer::default().synthesize(&cameras, &ranging, &assignment);

        assert_eq!(fused.len(), 1);
        let det = &fused[0];
        assert_eq!(det.source(), FusionSource::Matched);
        assert_eq!(det.angle, 132.0);
        assert_eq!(det.distance, 120.0);
        assert_eq!(det.class_name, "boat");
        assert_eq!(det.track_id, Some(3));
        assert_eq!(det.ranging_track_id, Some(11));
        assert_eq!(det.confidence, Some(0.87));
        assert_eq!(det.ranging_intensity, Some(0.6));
        assert!((det.timestamp - 100.005).abs() < 1e-9);
        assert_eq!(det.fusion_quality, assignment.matches[0].score);
        assert!(det.angle_diff.is_some());
        assert!(det.time_diff.is_some());
    }

    #[test]
    fn test_unmatched_records() {
        let cameras = [scenario_camera()];
        let ranging = [RangingDetection::new(10.0, 120.0, 100.01)];
        let assignment = strict_engine().associate(&cameras, &ranging);
        let fused = FusionSynthesizer::default().synthesize(&cameras, &ranging, &assignment);

        assert_eq!(fused.len(), 2);
        let camera_only = &fused[0];
        assert_eq!(camera_only.source(), FusionSource::CameraOnly);
        assert_eq!(camera_only.distance, 100.0);
        assert_eq!(camera_only.fusion_quality, 0.5);
        assert!((camera_only.angle - 129.984375).abs() < 1e-9);
        assert!(camera_only.angle_diff.is_none());

        let ranging_only = &fused[1];
        assert_eq!(ranging_only.source(), FusionSource::RangingOnly);
        assert_eq!(ranging_only.class_name, UNKNOWN_CLASS);
        assert_eq!(ranging_only.fusion_quality, 0.3);
        assert!(ranging_only.bbox.is_none());
        assert_eq!(ranging_only.angle, 10.0);
    }

    #[test]
    fn test_camera_estimate_used_when_present() {
        let synthesizer = FusionSynthesizer::default();
        let camera = scenario_camera().with_distance(37.5);
        let projection = GeometryMapper::default().project(&camera);
        assert_eq!(synthesizer.camera_only(&camera, &projection).distance, 37.5);
    }

    #[test]
    fn test_heuristic_label_for_ranging_only() {
        let synthesizer = FusionSynthesizer::new(SynthesisConfig {
            classifier: RangingClassifier::heuristic(),
            ..Default::default()
        });
        let det = synthesizer.ranging_only(&RangingDetection::new(10.0, 200.0, 0.0));
        assert_eq!(det.class_name, "VESSEL");
    }

    #[test]
    fn test_validate_quality_range() {
        let config = SynthesisConfig {
            ranging_only_quality: 1.3,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        let config = SynthesisConfig {
            camera_only_distance_m: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
