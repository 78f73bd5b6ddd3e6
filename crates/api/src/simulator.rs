//! Synthetic camera + ranging detection source
//!
//! Each cycle emits a handful of objects. Most are seen by both sensors with
//! a small bearing and time offset, some by the camera alone (with an
//! estimated range) and some by the ranging sensor alone.

use detection_types::{CameraDetection, RangingDetection};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sector_geometry::GeometryMapper;
use serde::{Deserialize, Serialize};
use tracing::debug;

const CLASS_NAMES: &[&str] = &["boat", "person", "debris", "vessel", "buoy", "unknown"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub enabled: bool,
    /// Cycle period
    pub interval_ms: u64,
    pub min_objects: usize,
    pub max_objects: usize,
    /// Share of objects seen by both sensors
    pub matched_ratio: f64,
    /// Share of objects seen by the camera only; the rest are ranging-only
    pub camera_only_ratio: f64,
    pub min_range_m: f64,
    pub max_range_m: f64,
    /// Bearing noise applied to the camera view of a shared object (±degrees)
    pub camera_angle_noise_deg: f64,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_ms: 3000,
            min_objects: 1,
            max_objects: 3,
            matched_ratio: 0.7,
            camera_only_ratio: 0.2,
            min_range_m: 5.0,
            max_range_m: 300.0,
            camera_angle_noise_deg: 2.0,
            seed: None,
        }
    }
}

impl SimulatorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.interval_ms == 0 {
            return Err("simulator.interval_ms must be positive".to_string());
        }
        if self.min_objects > self.max_objects {
            return Err("simulator.min_objects exceeds max_objects".to_string());
        }
        let ratios_ok = (0.0..=1.0).contains(&self.matched_ratio)
            && (0.0..=1.0).contains(&self.camera_only_ratio)
            && self.matched_ratio + self.camera_only_ratio <= 1.0;
        if !ratios_ok {
            return Err("simulator ratios must lie in [0, 1] and sum to at most 1".to_string());
        }
        if !(self.min_range_m > 0.0 && self.min_range_m < self.max_range_m) {
            return Err("simulator range must satisfy 0 < min_range_m < max_range_m".to_string());
        }
        if !(self.camera_angle_noise_deg >= 0.0 && self.camera_angle_noise_deg.is_finite()) {
            return Err("simulator.camera_angle_noise_deg must be non-negative".to_string());
        }
        Ok(())
    }
}

/// Detections generated for one cycle
#[derive(Debug, Clone, Default)]
pub struct SimulatedCycle {
    pub cameras: Vec<CameraDetection>,
    pub ranging: Vec<RangingDetection>,
}

pub struct DetectionSimulator {
    config: SimulatorConfig,
    mapper: GeometryMapper,
    rng: StdRng,
    cycle: u32,
}

impl DetectionSimulator {
    pub fn new(config: SimulatorConfig, mapper: GeometryMapper) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            mapper,
            rng,
            cycle: 0,
        }
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    /// Generate one cycle of detections stamped around `timestamp`
    pub fn generate(&mut self, timestamp: f64) -> SimulatedCycle {
        self.cycle = self.cycle.wrapping_add(1);
        let count = self
            .rng
            .gen_range(self.config.min_objects..=self.config.max_objects);

        let mut out = SimulatedCycle::default();
        for index in 0..count {
            let track_id = self.cycle.wrapping_mul(10).wrapping_add(index as u32);
            let roll: f64 = self.rng.gen();

            if roll < self.config.matched_ratio {
                let angle = self.rng.gen_range(0.0..360.0);
                let distance = self.random_range();
                let noise = self.config.camera_angle_noise_deg;
                let camera_angle = angle + self.rng.gen_range(-noise..=noise);
                let confidence = self.rng.gen_range(0.75..0.98);
                out.cameras
                    .push(self.camera_at(camera_angle, track_id, timestamp, confidence));
                out.ranging.push(
                    RangingDetection::new(angle, distance, timestamp + self.rng.gen_range(0.001..0.01))
                        .with_intensity(self.rng.gen_range(0.6..0.95))
                        .with_track_id(track_id),
                );
            } else if roll < self.config.matched_ratio + self.config.camera_only_ratio {
                let angle = self.rng.gen_range(0.0..360.0);
                let confidence = self.rng.gen_range(0.65..0.85);
                // camera-only objects skew closer
                let upper = (self.config.max_range_m * 0.7).max(self.config.min_range_m + 1.0);
                let estimate = self.rng.gen_range(self.config.min_range_m..upper);
                let camera = self
                    .camera_at(angle, track_id, timestamp, confidence)
                    .with_distance(estimate);
                out.cameras.push(camera);
            } else {
                let angle = self.rng.gen_range(0.0..360.0);
                let distance = self.random_range();
                out.ranging.push(
                    RangingDetection::new(angle, distance, timestamp)
                        .with_intensity(self.rng.gen_range(0.5..0.8))
                        .with_track_id(track_id),
                );
            }
        }

        debug!(
            "Simulated cycle {}: {} camera, {} ranging",
            self.cycle,
            out.cameras.len(),
            out.ranging.len()
        );
        out
    }

    fn random_range(&mut self) -> f64 {
        self.rng
            .gen_range(self.config.min_range_m..self.config.max_range_m)
    }

    /// Camera detection whose bbox center projects back onto `angle`
    fn camera_at(
        &mut self,
        angle: f64,
        track_id: u32,
        timestamp: f64,
        confidence: f64,
    ) -> CameraDetection {
        let table = self.mapper.table();
        let camera_id = table
            .sector_containing(angle)
            .unwrap_or_else(|| table.fallback())
            .camera_id;

        let frame_width = self.mapper.frame_width();
        // keeps the box non-empty on very narrow frames
        let margin = (frame_width / 4.0).min(2.0);
        let center = self
            .mapper
            .angle_to_bbox_x(angle, Some(camera_id), frame_width)
            .clamp(margin, frame_width - margin);
        let half_width = self.rng.gen_range(15.0..60.0f64).min(center).min(frame_width - center);
        let top = self.rng.gen_range(300.0..500.0);
        let height = self.rng.gen_range(40.0..200.0);

        let class_name = CLASS_NAMES[self.rng.gen_range(0..CLASS_NAMES.len())];
        CameraDetection::new(
            [center - half_width, top, center + half_width, top + height],
            class_name,
            timestamp,
        )
        .with_camera_id(camera_id)
        .with_track_id(track_id)
        .with_confidence(confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sector_geometry::SectorTable;

    fn bearing_gap(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    fn seeded(config: SimulatorConfig) -> DetectionSimulator {
        DetectionSimulator::new(
            SimulatorConfig {
                seed: Some(7),
                ..config
            },
            GeometryMapper::default(),
        )
    }

    #[test]
    fn test_default_config_valid() {
        assert!(SimulatorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_ratios() {
        let config = SimulatorConfig {
            matched_ratio: 0.9,
            camera_only_ratio: 0.2,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_object_count_bounds() {
        let mut sim = seeded(SimulatorConfig::default());
        for i in 0..50 {
            let cycle = sim.generate(i as f64);
            let objects = cycle.cameras.len().max(cycle.ranging.len());
            assert!(objects >= 1);
            assert!(cycle.cameras.len() <= 3 && cycle.ranging.len() <= 3);
        }
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let mut a = seeded(SimulatorConfig::default());
        let mut b = seeded(SimulatorConfig::default());
        for i in 0..10 {
            let (ca, cb) = (a.generate(i as f64), b.generate(i as f64));
            assert_eq!(ca.cameras, cb.cameras);
            assert_eq!(ca.ranging, cb.ranging);
        }
    }

    #[test]
    fn test_matched_objects_project_near_ranging_bearing() {
        let config = SimulatorConfig {
            matched_ratio: 1.0,
            camera_only_ratio: 0.0,
            ..Default::default()
        };
        let mapper = GeometryMapper::default();
        let mut sim = seeded(config);

        for i in 0..20 {
            let cycle = sim.generate(i as f64);
            assert_eq!(cycle.cameras.len(), cycle.ranging.len());
            for (camera, ranging) in cycle.cameras.iter().zip(&cycle.ranging) {
                let projected = mapper.project(camera).angle;
                assert!(bearing_gap(projected, ranging.angle) <= 2.2);
                assert_eq!(camera.track_id, ranging.track_id);
                assert!(camera.bbox[0] < camera.bbox[2]);
            }
        }
    }

    #[test]
    fn test_narrow_frame_boxes_stay_inside() {
        let mapper = GeometryMapper::new(SectorTable::default(), 3.0).unwrap();
        let config = SimulatorConfig {
            matched_ratio: 0.5,
            camera_only_ratio: 0.5,
            seed: Some(11),
            ..Default::default()
        };
        let mut sim = DetectionSimulator::new(config, mapper);
        for i in 0..30 {
            for camera in sim.generate(i as f64).cameras {
                assert!(camera.bbox[0] >= 0.0);
                assert!(camera.bbox[0] < camera.bbox[2]);
                assert!(camera.bbox[2] <= 3.0);
            }
        }
    }

    #[test]
    fn test_camera_only_carries_estimate() {
        let config = SimulatorConfig {
            matched_ratio: 0.0,
            camera_only_ratio: 1.0,
            ..Default::default()
        };
        let mut sim = seeded(config);
        let cycle = sim.generate(1.0);
        assert!(cycle.ranging.is_empty());
        assert!(cycle.cameras.iter().all(|c| c.distance.is_some()));
    }
}
