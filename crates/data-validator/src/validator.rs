//! Detection Validator

use crate::error::ValidationError;
use detection_types::{normalize_angle, CameraDetection, RangingDetection};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Camera confidence valid range
    pub confidence_range: (f64, f64),
    /// Ranging intensity valid range
    pub intensity_range: (f64, f64),
    /// Distance valid range (meters), shared by both streams
    pub distance_range: (f64, f64),
    /// Elevation valid range (degrees)
    pub elevation_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            confidence_range: (0.0, 1.0),
            intensity_range: (0.0, 1.0),
            distance_range: (0.0, 10_000.0),
            elevation_range: (-90.0, 90.0),
        }
    }
}

impl ValidationConfig {
    /// Every range must be finite with `min <= max`; distances start at zero
    pub fn validate(&self) -> Result<(), String> {
        let ranges = [
            ("confidence_range", self.confidence_range),
            ("intensity_range", self.intensity_range),
            ("distance_range", self.distance_range),
            ("elevation_range", self.elevation_range),
        ];
        for (name, (min, max)) in ranges {
            if !(min.is_finite() && max.is_finite()) {
                return Err(format!("validation.{} must be finite", name));
            }
            if min > max {
                return Err(format!("validation.{} min {} exceeds max {}", name, min, max));
            }
        }
        if self.distance_range.0 < 0.0 {
            return Err(format!(
                "validation.distance_range must start at or above 0, got {}",
                self.distance_range.0
            ));
        }
        Ok(())
    }
}

/// Outcome of validating a batch of detections
#[derive(Debug, Clone)]
pub struct ValidationReport<T> {
    /// Detections that passed, in input order
    pub accepted: Vec<T>,
    /// One error per rejected detection
    pub rejected: Vec<ValidationError>,
}

impl<T> ValidationReport<T> {
    /// Whether every detection passed
    pub fn all_valid(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Ingestion validator for both detection streams
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite(field));
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate a timestamp (must be finite)
    pub fn validate_timestamp(&self, timestamp: f64) -> Result<(), ValidationError> {
        if timestamp.is_finite() {
            Ok(())
        } else {
            Err(ValidationError::NonFinite("timestamp"))
        }
    }

    /// Validate bounding box ordering
    pub fn validate_bbox(&self, bbox: &[f64; 4]) -> Result<(), ValidationError> {
        if bbox.iter().any(|v| !v.is_finite()) {
            return Err(ValidationError::NonFinite("bbox"));
        }
        if bbox[0] >= bbox[2] || bbox[1] >= bbox[3] {
            return Err(ValidationError::MalformedBBox { bbox: *bbox });
        }
        Ok(())
    }

    /// Validate a camera detection
    pub fn validate_camera(&self, det: CameraDetection) -> Result<CameraDetection, ValidationError> {
        self.validate_timestamp(det.timestamp)?;
        self.validate_bbox(&det.bbox)?;
        if det.class_name.trim().is_empty() {
            return Err(ValidationError::MissingField("class_name"));
        }
        if let Some(confidence) = det.confidence {
            self.validate_range("confidence", confidence, self.config.confidence_range)?;
        }
        if let Some(distance) = det.distance {
            self.validate_range("distance", distance, self.config.distance_range)?;
        }
        Ok(det)
    }

    /// Validate a ranging detection, re-normalizing its bearing into [0, 360)
    pub fn validate_ranging(
        &self,
        mut det: RangingDetection,
    ) -> Result<RangingDetection, ValidationError> {
        self.validate_timestamp(det.timestamp)?;
        if !det.angle.is_finite() {
            return Err(ValidationError::NonFinite("angle"));
        }
        det.angle = normalize_angle(det.angle);
        self.validate_range("angle", det.angle, (0.0, 360.0))?;
        self.validate_range("distance", det.distance, self.config.distance_range)?;
        if let Some(intensity) = det.intensity {
            self.validate_range("intensity", intensity, self.config.intensity_range)?;
        }
        if let Some(elevation) = det.elevation {
            self.validate_range("elevation", elevation, self.config.elevation_range)?;
        }
        Ok(det)
    }

    /// Validate a full camera snapshot, keeping the valid entries
    pub fn validate_camera_batch(
        &self,
        detections: Vec<CameraDetection>,
    ) -> ValidationReport<CameraDetection> {
        Self::partition(detections, |d| self.validate_camera(d))
    }

    /// Validate a full ranging snapshot, keeping the valid entries
    pub fn validate_ranging_batch(
        &self,
        detections: Vec<RangingDetection>,
    ) -> ValidationReport<RangingDetection> {
        Self::partition(detections, |d| self.validate_ranging(d))
    }

    fn partition<T>(
        detections: Vec<T>,
        mut check: impl FnMut(T) -> Result<T, ValidationError>,
    ) -> ValidationReport<T> {
        let mut report = ValidationReport {
            accepted: Vec::with_capacity(detections.len()),
            rejected: Vec::new(),
        };
        for det in detections {
            match check(det) {
                Ok(det) => report.accepted.push(det),
                Err(err) => {
                    debug!("Batch entry rejected: {}", err);
                    report.rejected.push(err);
                }
            }
        }
        report
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
