//! Obstacle types and display labels

use detection_types::FusedDetection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Obstacle category drawn on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObstacleType {
    Boat,
    Vessel,
    Person,
    Debris,
    Buoy,
    Unknown,
}

/// Known class names, matched case-insensitively
const CLASS_TABLE: &[(&str, ObstacleType)] = &[
    ("boat", ObstacleType::Boat),
    ("ship", ObstacleType::Vessel),
    ("person", ObstacleType::Person),
    ("swimmer", ObstacleType::Person),
    ("debris", ObstacleType::Debris),
    ("floating_object", ObstacleType::Debris),
    ("buoy", ObstacleType::Buoy),
    ("vessel", ObstacleType::Vessel),
    ("unknown", ObstacleType::Unknown),
];

impl ObstacleType {
    /// Map a detector class name: exact match, then substring either way
    pub fn from_class_name(class_name: &str) -> Self {
        let lower = class_name.trim().to_lowercase();
        if lower.is_empty() {
            return Self::Unknown;
        }

        if let Some((_, kind)) = CLASS_TABLE.iter().find(|(name, _)| *name == lower) {
            return *kind;
        }

        CLASS_TABLE
            .iter()
            .find(|(name, _)| lower.contains(name) || name.contains(lower.as_str()))
            .map(|(_, kind)| *kind)
            .unwrap_or(Self::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Boat => "BOAT",
            Self::Vessel => "VESSEL",
            Self::Person => "PERSON",
            Self::Debris => "DEBRIS",
            Self::Buoy => "BUOY",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ObstacleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multi-line map label: class, whole metres, quality stars, confidence
pub fn display_label(det: &FusedDetection) -> String {
    let mut label = format!("{}\n{:.0}m", det.class_name.to_uppercase(), det.distance);

    if det.fusion_quality > 0.0 {
        let stars = (det.fusion_quality * 5.0).floor().clamp(0.0, 5.0) as usize;
        label.push('\n');
        label.push_str(&"★".repeat(stars));
    }

    if let Some(confidence) = det.confidence.filter(|c| *c > 0.0) {
        label.push_str(&format!("\n{:.0}%", confidence * 100.0));
    }

    label
}
