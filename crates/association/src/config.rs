//! Association configuration

use serde::{Deserialize, Serialize};

use crate::AssociationError;

/// Tolerance when checking that the weights sum to one
const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// Gating thresholds and score weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssociationConfig {
    /// Maximum bearing difference for a valid pair (degrees)
    pub max_angle_delta_deg: f64,

    /// Maximum timestamp difference for a valid pair (seconds)
    pub max_time_delta_s: f64,

    /// Weight of bearing agreement in the quality score
    pub angle_weight: f64,

    /// Weight of time agreement in the quality score
    pub time_weight: f64,

    /// Require the ranging bearing to fall in the camera's own sector
    pub sector_gating: bool,
}

impl Default for AssociationConfig {
    fn default() -> Self {
        Self {
            max_angle_delta_deg: 45.0,
            max_time_delta_s: 6.0,
            angle_weight: 0.6,
            time_weight: 0.4,
            sector_gating: true,
        }
    }
}

impl AssociationConfig {
    /// Create strict config (tight gates, synchronized sensors)
    pub fn strict() -> Self {
        Self {
            max_angle_delta_deg: 10.0,
            max_time_delta_s: 0.2,
            ..Default::default()
        }
    }

    /// Create lenient config (loose gates, poorly synchronized sensors)
    pub fn lenient() -> Self {
        Self {
            max_angle_delta_deg: 60.0,
            max_time_delta_s: 10.0,
            ..Default::default()
        }
    }

    /// Check thresholds and weights
    pub fn validate(&self) -> Result<(), AssociationError> {
        for (name, value) in [
            ("max_angle_delta_deg", self.max_angle_delta_deg),
            ("max_time_delta_s", self.max_time_delta_s),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(AssociationError::InvalidThreshold { name, value });
            }
        }

        for (name, value) in [
            ("angle_weight", self.angle_weight),
            ("time_weight", self.time_weight),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(AssociationError::InvalidWeight { name, value });
            }
        }

        let sum = self.angle_weight + self.time_weight;
        if (sum - 1.0).abs() > WEIGHT_SUM_EPSILON {
            return Err(AssociationError::WeightSum(sum));
        }

        Ok(())
    }
}
