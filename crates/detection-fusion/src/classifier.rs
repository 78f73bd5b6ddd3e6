//! Ranging-only classification fallback
//!
//! Distance/intensity banding heuristic for ranging detections that no camera
//! confirmed. It is a plausible guess, not a classifier: close bright returns
//! look like buoys, close dull ones like debris, and so on. Disabled by
//! default; unconfirmed ranging records are then labeled `UNKNOWN`.

use detection_types::{RangingDetection, UNKNOWN_CLASS};
use serde::{Deserialize, Serialize};

/// Band table for the ranging-only label heuristic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangingClassifier {
    /// Apply the heuristic instead of labeling everything `UNKNOWN`
    pub enabled: bool,

    /// Upper bound of the near band (meters, exclusive)
    pub near_limit_m: f64,
    /// Upper bound of the mid band (meters, exclusive)
    pub far_limit_m: f64,

    /// Intensity above which a near return counts as bright
    pub near_intensity: f64,
    /// Intensity above which a mid return counts as bright
    pub mid_intensity: f64,

    pub near_bright_label: String,
    pub near_dim_label: String,
    pub mid_bright_label: String,
    pub mid_dim_label: String,
    pub far_label: String,
}

impl Default for RangingClassifier {
    fn default() -> Self {
        Self {
            enabled: false,
            near_limit_m: 50.0,
            far_limit_m: 150.0,
            near_intensity: 0.8,
            mid_intensity: 0.7,
            near_bright_label: "BUOY".to_string(),
            near_dim_label: "DEBRIS".to_string(),
            mid_bright_label: "BOAT".to_string(),
            mid_dim_label: "PERSON".to_string(),
            far_label: "VESSEL".to_string(),
        }
    }
}

impl RangingClassifier {
    /// Default band table with the heuristic switched on
    pub fn heuristic() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    /// Label for a ranging-only record; missing intensity counts as dim
    pub fn classify(&self, detection: &RangingDetection) -> &str {
        if !self.enabled {
            return UNKNOWN_CLASS;
        }

        let intensity = detection.intensity.unwrap_or(0.0);
        if detection.distance < self.near_limit_m {
            if intensity > self.near_intensity {
                self.near_bright_label.as_str()
            } else {
                self.near_dim_label.as_str()
            }
        } else if detection.distance < self.far_limit_m {
            if intensity > self.mid_intensity {
                self.mid_bright_label.as_str()
            } else {
                self.mid_dim_label.as_str()
            }
        } else {
            self.far_label.as_str()
        }
    }

    /// Check band ordering
    pub fn validate(&self) -> Result<(), String> {
        if !(self.near_limit_m.is_finite() && self.near_limit_m > 0.0) {
            return Err(format!("near_limit_m must be positive, got {}", self.near_limit_m));
        }
        if !(self.far_limit_m.is_finite() && self.far_limit_m > self.near_limit_m) {
            return Err(format!(
                "far_limit_m {} must exceed near_limit_m {}",
                self.far_limit_m, self.near_limit_m
            ));
        }
        for (name, value) in [
            ("near_intensity", self.near_intensity),
            ("mid_intensity", self.mid_intensity),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be in [0, 1], got {}", name, value));
            }
        }
        Ok(())
    }
}
