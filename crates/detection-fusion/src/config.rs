//! Fusion configuration

use std::fmt;
use std::str::FromStr;

use association::AssociationConfig;
use data_validator::ValidationConfig;
use sector_geometry::{
    GeometryMapper, Sector, SectorTable, DEFAULT_FALLBACK_CAMERA, DEFAULT_FRAME_WIDTH,
};
use serde::{Deserialize, Serialize};

use crate::synthesizer::SynthesisConfig;
use crate::FusionError;

/// How detections reach the fuse pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionMode {
    /// `add_*` accumulates, `process_frame` fuses and clears
    #[default]
    BufferedCycle,
    /// `update_*` replaces the last snapshot, `fuse` re-runs at will
    SnapshotReplace,
}

impl FusionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FusionMode::BufferedCycle => "buffered_cycle",
            FusionMode::SnapshotReplace => "snapshot_replace",
        }
    }
}

impl fmt::Display for FusionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FusionMode {
    type Err = FusionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "buffered_cycle" | "buffered" => Ok(FusionMode::BufferedCycle),
            "snapshot_replace" | "snapshot" => Ok(FusionMode::SnapshotReplace),
            other => Err(FusionError::Config(format!("unknown operating mode '{}'", other))),
        }
    }
}

/// Fusion manager configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Operating mode
    pub mode: FusionMode,

    /// Gates and score weights
    pub association: AssociationConfig,

    /// Camera frame width (pixels)
    pub frame_width: f64,

    /// Fuse cycles kept in history
    pub history_capacity: usize,

    /// Camera sector table
    pub sectors: Vec<Sector>,

    /// Camera whose sector is used for unknown camera ids
    pub fallback_camera: u32,

    /// Output record policy
    pub synthesis: SynthesisConfig,

    /// Ingestion checks
    pub validation: ValidationConfig,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            mode: FusionMode::default(),
            association: AssociationConfig::default(),
            frame_width: DEFAULT_FRAME_WIDTH,
            history_capacity: 100,
            sectors: SectorTable::default().sectors().to_vec(),
            fallback_camera: DEFAULT_FALLBACK_CAMERA,
            synthesis: SynthesisConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl FusionConfig {
    /// Default config in snapshot-replace mode
    pub fn snapshot() -> Self {
        Self {
            mode: FusionMode::SnapshotReplace,
            ..Default::default()
        }
    }

    /// Check every section; the manager refuses to start on failure
    pub fn validate(&self) -> Result<(), FusionError> {
        self.association.validate()?;
        if self.history_capacity == 0 {
            return Err(FusionError::Config("history_capacity must be positive".to_string()));
        }
        self.synthesis.validate().map_err(FusionError::Config)?;
        self.validation.validate().map_err(FusionError::Config)?;
        self.build_mapper()?;
        Ok(())
    }

    /// Geometry mapper for the configured sectors and frame width
    pub fn build_mapper(&self) -> Result<GeometryMapper, FusionError> {
        let table = SectorTable::new(self.sectors.clone(), self.fallback_camera)?;
        Ok(GeometryMapper::new(table, self.frame_width)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(FusionConfig::default().validate().is_ok());
        assert!(FusionConfig::snapshot().validate().is_ok());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("buffered".parse::<FusionMode>().unwrap(), FusionMode::BufferedCycle);
        assert_eq!(
            "Snapshot_Replace".parse::<FusionMode>().unwrap(),
            FusionMode::SnapshotReplace
        );
        assert!(matches!("realtime".parse::<FusionMode>(), Err(FusionError::Config(_))));
    }

    #[test]
    fn test_unknown_mode_fails_deserialization() {
        let json = r#"{ "mode": "realtime" }"#;
        assert!(serde_json::from_str::<FusionConfig>(json).is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{ "mode": "snapshot_replace", "association": { "max_angle_delta_deg": 10.0 } }"#;
        let config: FusionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.mode, FusionMode::SnapshotReplace);
        assert_eq!(config.association.max_angle_delta_deg, 10.0);
        assert_eq!(config.association.max_time_delta_s, 6.0);
        assert_eq!(config.history_capacity, 100);
        assert_eq!(config.sectors.len(), 4);
    }

    #[test]
    fn test_invalid_sections_rejected() {
        let config = FusionConfig {
            history_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(FusionError::Config(_))));

        let config = FusionConfig {
            frame_width: -5.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(FusionError::Geometry(_))));

        let mut config = FusionConfig::default();
        config.association.time_weight = 0.9;
        assert!(matches!(config.validate(), Err(FusionError::Association(_))));

        let config = FusionConfig {
            fallback_camera: 9,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(FusionError::Geometry(_))));

        let mut config = FusionConfig::default();
        config.validation.distance_range = (500.0, 10.0);
        assert!(matches!(config.validate(), Err(FusionError::Config(_))));
    }
}
