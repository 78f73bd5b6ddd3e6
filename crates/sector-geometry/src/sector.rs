//! Camera sector table

use detection_types::normalize_angle;
use serde::{Deserialize, Serialize};

use crate::GeometryError;

/// Camera used when a detection names no known camera
pub const DEFAULT_FALLBACK_CAMERA: u32 = 4;

/// Tolerance when checking sector adjacency
const ADJACENCY_EPSILON: f64 = 1e-9;

/// Angular range [start, start + span) observed by one camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub camera_id: u32,
    /// Sector start bearing (degrees)
    pub start_deg: f64,
    /// Sector width (degrees)
    pub span_deg: f64,
}

impl Sector {
    pub fn new(camera_id: u32, start_deg: f64, span_deg: f64) -> Self {
        Self {
            camera_id,
            start_deg,
            span_deg,
        }
    }

    /// Clockwise-agnostic offset of `angle` from the sector start, in [0, 360)
    pub fn offset_of(&self, angle: f64) -> f64 {
        normalize_angle(angle - self.start_deg)
    }

    /// Whether `angle` falls inside the sector (wrap-aware)
    pub fn contains(&self, angle: f64) -> bool {
        self.offset_of(angle) < self.span_deg
    }

    /// Whether the sector passes through 0°/360°
    pub fn wraps(&self) -> bool {
        normalize_angle(self.start_deg) + self.span_deg > 360.0
    }

    /// Bearing of the sector end, in [0, 360)
    pub fn end_deg(&self) -> f64 {
        normalize_angle(self.start_deg + self.span_deg)
    }

    fn overlaps(&self, other: &Sector) -> bool {
        let offset = self.offset_of(other.start_deg);
        offset < self.span_deg - ADJACENCY_EPSILON
            || offset + other.span_deg > 360.0 + ADJACENCY_EPSILON
    }
}

/// Validated mapping camera_id -> sector
#[derive(Debug, Clone, PartialEq)]
pub struct SectorTable {
    sectors: Vec<Sector>,
    fallback_index: usize,
}

impl SectorTable {
    /// Build a table; sectors must be disjoint and the fallback camera present
    pub fn new(sectors: Vec<Sector>, fallback_camera: u32) -> Result<Self, GeometryError> {
        if sectors.is_empty() {
            return Err(GeometryError::EmptyTable);
        }

        let mut normalized = Vec::with_capacity(sectors.len());
        for sector in sectors {
            if !sector.start_deg.is_finite() {
                return Err(GeometryError::NonFiniteStart(sector.camera_id));
            }
            if !(sector.span_deg > 0.0 && sector.span_deg <= 360.0) {
                return Err(GeometryError::InvalidSpan {
                    camera_id: sector.camera_id,
                    span_deg: sector.span_deg,
                });
            }
            if normalized.iter().any(|s: &Sector| s.camera_id == sector.camera_id) {
                return Err(GeometryError::DuplicateCamera(sector.camera_id));
            }
            normalized.push(Sector {
                start_deg: normalize_angle(sector.start_deg),
                ..sector
            });
        }

        for (i, a) in normalized.iter().enumerate() {
            for b in &normalized[i + 1..] {
                if a.overlaps(b) {
                    return Err(GeometryError::Overlap {
                        first: a.camera_id,
                        second: b.camera_id,
                    });
                }
            }
        }

        let fallback_index = normalized
            .iter()
            .position(|s| s.camera_id == fallback_camera)
            .ok_or(GeometryError::MissingFallback(fallback_camera))?;

        Ok(Self {
            sectors: normalized,
            fallback_index,
        })
    }

    /// Sector owned by `camera_id`
    pub fn get(&self, camera_id: u32) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.camera_id == camera_id)
    }

    /// Sector used for unknown cameras
    pub fn fallback(&self) -> &Sector {
        &self.sectors[self.fallback_index]
    }

    /// Sector whose range contains `angle`
    pub fn sector_containing(&self, angle: f64) -> Option<&Sector> {
        self.sectors.iter().find(|s| s.contains(angle))
    }

    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}

impl Default for SectorTable {
    /// Four 90° cameras, 0° = east, anti-clockwise; camera 4 wraps through 0°
    fn default() -> Self {
        Self {
            sectors: vec![
                Sector::new(1, 45.0, 90.0),
                Sector::new(2, 135.0, 90.0),
                Sector::new(3, 225.0, 90.0),
                Sector::new(4, 315.0, 90.0),
            ],
            fallback_index: 3,
        }
    }
}
