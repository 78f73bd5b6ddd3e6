//! Bounding box <-> bearing projection

use detection_types::{normalize_angle, BBox, CameraDetection};
use tracing::{debug, warn};

use crate::sector::{Sector, SectorTable};
use crate::GeometryError;

/// Default camera frame width (pixels)
pub const DEFAULT_FRAME_WIDTH: f64 = 1920.0;

/// Camera detection projected into bearing space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Global bearing of the bbox center, [0, 360)
    pub angle: f64,
    /// Sector used for the projection
    pub sector: Sector,
    /// Whether the fallback sector was used
    pub fallback: bool,
}

/// Maps camera pixel positions onto global bearings
#[derive(Debug, Clone)]
pub struct GeometryMapper {
    table: SectorTable,
    frame_width: f64,
}

impl GeometryMapper {
    /// Create a mapper; `frame_width` is used by [`GeometryMapper::project`]
    pub fn new(table: SectorTable, frame_width: f64) -> Result<Self, GeometryError> {
        if !(frame_width.is_finite() && frame_width > 0.0) {
            return Err(GeometryError::InvalidFrameWidth(frame_width));
        }
        Ok(Self { table, frame_width })
    }

    pub fn table(&self) -> &SectorTable {
        &self.table
    }

    pub fn frame_width(&self) -> f64 {
        self.frame_width
    }

    /// Sector for a camera, or the fallback sector when unknown
    pub fn sector_for(&self, camera_id: Option<u32>) -> (&Sector, bool) {
        match camera_id {
            Some(id) => match self.table.get(id) {
                Some(sector) => (sector, false),
                None => {
                    let fallback = self.table.fallback();
                    warn!(
                        "Unknown camera {}, using sector of camera {}",
                        id, fallback.camera_id
                    );
                    (fallback, true)
                }
            },
            None => {
                let fallback = self.table.fallback();
                debug!(
                    "Detection without camera id, using sector of camera {}",
                    fallback.camera_id
                );
                (fallback, true)
            }
        }
    }

    /// Bearing of the bbox horizontal center
    pub fn bbox_to_angle(&self, bbox: &BBox, camera_id: Option<u32>, frame_width: f64) -> f64 {
        let (sector, _) = self.sector_for(camera_id);
        Self::angle_in_sector(sector, bbox, frame_width)
    }

    /// Pixel x inside the frame that projects onto `angle` (inverse of
    /// [`GeometryMapper::bbox_to_angle`]); bearings outside the sector clamp to
    /// the nearest frame edge
    pub fn angle_to_bbox_x(&self, angle: f64, camera_id: Option<u32>, frame_width: f64) -> f64 {
        let (sector, _) = self.sector_for(camera_id);
        let mut offset = sector.offset_of(angle);
        if offset > sector.span_deg {
            offset = if offset - sector.span_deg < 360.0 - offset {
                sector.span_deg
            } else {
                0.0
            };
        }
        offset / sector.span_deg * frame_width
    }

    /// Project a camera detection using the configured frame width
    pub fn project(&self, detection: &CameraDetection) -> Projection {
        let (sector, fallback) = self.sector_for(detection.camera_id);
        Projection {
            angle: Self::angle_in_sector(sector, &detection.bbox, self.frame_width),
            sector: *sector,
            fallback,
        }
    }

    fn angle_in_sector(sector: &Sector, bbox: &BBox, frame_width: f64) -> f64 {
        let center_x = (bbox[0] + bbox[2]) / 2.0;
        let norm = if frame_width > 0.0 {
            (center_x / frame_width).clamp(0.0, 1.0)
        } else {
            0.0
        };
        normalize_angle(sector.start_deg + norm * sector.span_deg)
    }
}

impl Default for GeometryMapper {
    fn default() -> Self {
        Self {
            table: SectorTable::default(),
            frame_width: DEFAULT_FRAME_WIDTH,
        }
    }
}
