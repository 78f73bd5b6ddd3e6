//! Association engine

use std::cmp::Ordering;

use detection_types::{CameraDetection, RangingDetection};
use sector_geometry::{GeometryMapper, Projection};
use tracing::{debug, info, trace};

use crate::config::AssociationConfig;
use crate::distance::{angle_distance, time_distance};
use crate::AssociationError;

/// Gate a candidate pair failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateFailure {
    /// Ranging bearing outside the camera's sector
    Sector,
    /// Bearing difference above threshold
    Angle,
    /// Timestamp difference above threshold
    Time,
}

/// Candidate pairs rejected per gate during one pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateStats {
    pub sector: usize,
    pub angle: usize,
    pub time: usize,
}

impl GateStats {
    fn record(&mut self, failure: GateFailure) {
        match failure {
            GateFailure::Sector => self.sector += 1,
            GateFailure::Angle => self.angle += 1,
            GateFailure::Time => self.time += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.sector + self.angle + self.time
    }
}

/// Camera/ranging pair that passed every gate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchedPair {
    pub camera_index: usize,
    pub ranging_index: usize,
    /// Bearing difference (degrees)
    pub angle_diff: f64,
    /// Timestamp difference (seconds)
    pub time_diff: f64,
    /// Quality score (0.0 to 1.0)
    pub score: f64,
}

/// Result of one association pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Assignment {
    /// Selected pairs, ordered by camera index
    pub matches: Vec<MatchedPair>,
    /// Camera indices without a partner, ascending
    pub unmatched_camera: Vec<usize>,
    /// Ranging indices without a partner, ascending
    pub unmatched_ranging: Vec<usize>,
    /// Projection of every camera detection, by camera index
    pub projections: Vec<Projection>,
    /// Gate rejections seen while building candidates
    pub gate_stats: GateStats,
}

/// Gated greedy associator
#[derive(Debug, Clone)]
pub struct AssociationEngine {
    config: AssociationConfig,
    mapper: GeometryMapper,
}

impl AssociationEngine {
    /// Create an engine; fails on invalid thresholds or weights
    pub fn new(config: AssociationConfig, mapper: GeometryMapper) -> Result<Self, AssociationError> {
        config.validate()?;
        info!(
            "Association engine: max_angle={}deg max_time={}s weights=({}, {}) sector_gating={}",
            config.max_angle_delta_deg,
            config.max_time_delta_s,
            config.angle_weight,
            config.time_weight,
            config.sector_gating
        );
        Ok(Self { config, mapper })
    }

    pub fn config(&self) -> &AssociationConfig {
        &self.config
    }

    pub fn mapper(&self) -> &GeometryMapper {
        &self.mapper
    }

    /// Quality of a gated pair, clamped to [0, 1]
    pub fn score(&self, angle_diff: f64, time_diff: f64) -> f64 {
        let angle_score = 1.0 - angle_diff / self.config.max_angle_delta_deg;
        let time_score = 1.0 - time_diff / self.config.max_time_delta_s;
        (self.config.angle_weight * angle_score + self.config.time_weight * time_score)
            .clamp(0.0, 1.0)
    }

    /// Apply all gates to one pair; returns (angle_diff, time_diff) on success
    pub fn gate(
        &self,
        projection: &Projection,
        camera: &CameraDetection,
        ranging: &RangingDetection,
    ) -> Result<(f64, f64), GateFailure> {
        if self.config.sector_gating && !projection.sector.contains(ranging.angle) {
            return Err(GateFailure::Sector);
        }

        let angle_diff = angle_distance(projection.angle, ranging.angle);
        if angle_diff > self.config.max_angle_delta_deg {
            return Err(GateFailure::Angle);
        }

        let time_diff = time_distance(camera.timestamp, ranging.timestamp);
        if time_diff > self.config.max_time_delta_s {
            return Err(GateFailure::Time);
        }

        Ok((angle_diff, time_diff))
    }

    /// Associate the two detection lists
    pub fn associate(
        &self,
        cameras: &[CameraDetection],
        ranging: &[RangingDetection],
    ) -> Assignment {
        let projections: Vec<Projection> = cameras.iter().map(|c| self.mapper.project(c)).collect();

        let mut gate_stats = GateStats::default();
        let mut candidates = Vec::new();
        for (ci, (camera, projection)) in cameras.iter().zip(&projections).enumerate() {
            for (ri, rng) in ranging.iter().enumerate() {
                match self.gate(projection, camera, rng) {
                    Ok((angle_diff, time_diff)) => candidates.push(MatchedPair {
                        camera_index: ci,
                        ranging_index: ri,
                        angle_diff,
                        time_diff,
                        score: self.score(angle_diff, time_diff),
                    }),
                    Err(failure) => {
                        trace!(
                            "Pair camera#{} ranging#{} failed {:?} gate ({:.2}deg vs {:.2}deg)",
                            ci,
                            ri,
                            failure,
                            projection.angle,
                            rng.angle
                        );
                        gate_stats.record(failure);
                    }
                }
            }
        }

        // Highest score first; lower index pair wins ties
        candidates.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.camera_index.cmp(&b.camera_index))
                .then(a.ranging_index.cmp(&b.ranging_index))
        });

        let mut camera_used = vec![false; cameras.len()];
        let mut ranging_used = vec![false; ranging.len()];
        let mut matches = Vec::new();
        for pair in candidates {
            if camera_used[pair.camera_index] || ranging_used[pair.ranging_index] {
                continue;
            }
            camera_used[pair.camera_index] = true;
            ranging_used[pair.ranging_index] = true;
            matches.push(pair);
        }
        matches.sort_by(|a, b| match a.camera_index.cmp(&b.camera_index) {
            Ordering::Equal => a.ranging_index.cmp(&b.ranging_index),
            other => other,
        });

        let unmatched_camera: Vec<usize> = (0..cameras.len()).filter(|&i| !camera_used[i]).collect();
        let unmatched_ranging: Vec<usize> = (0..ranging.len()).filter(|&i| !ranging_used[i]).collect();

        debug!(
            "Associated {} camera / {} ranging: {} matched, {} camera-only, {} ranging-only, {} gated out",
            cameras.len(),
            ranging.len(),
            matches.len(),
            unmatched_camera.len(),
            unmatched_ranging.len(),
            gate_stats.total()
        );

        Assignment {
            matches,
            unmatched_camera,
            unmatched_ranging,
            projections,
            gate_stats,
        }
    }
}
