//! Keyed overlay state with cycle-based eviction

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use detection_fusion::FusionListener;
use detection_types::{FusedDetection, FusionSource, TrackKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::obstacle::{display_label, ObstacleType};

/// Overlay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Cycles a tracked entry may go unseen before removal (0 = must appear every cycle)
    pub max_missed_cycles: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            max_missed_cycles: 3,
        }
    }
}

/// One obstacle on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayEntry {
    /// Track identity; `None` for untracked records that live for one cycle
    pub key: Option<TrackKey>,
    pub obstacle_type: ObstacleType,
    pub label: String,
    pub class_name: String,
    pub angle: f64,
    pub distance: f64,
    pub fusion_quality: f64,
    pub source: FusionSource,
    /// Cycle in which this entry was last updated
    pub last_cycle: u64,
}

/// Maintains the set of obstacles drawn on the tactical map
#[derive(Debug)]
pub struct OverlayAdapter {
    config: OverlayConfig,
    keyed: HashMap<TrackKey, OverlayEntry>,
    anonymous: Vec<OverlayEntry>,
    cycle: u64,
}

impl OverlayAdapter {
    pub fn new(config: OverlayConfig) -> Self {
        debug!("Creating overlay adapter: max_missed_cycles={}", config.max_missed_cycles);
        Self {
            config,
            keyed: HashMap::new(),
            anonymous: Vec::new(),
            cycle: 0,
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Start a new cycle; untracked entries from the previous one are dropped
    pub fn begin_cycle(&mut self) {
        self.cycle += 1;
        self.anonymous.clear();
    }

    /// Add or update the obstacle for a fused record
    pub fn apply(&mut self, det: &FusedDetection) -> Option<TrackKey> {
        let key = det.track_key();
        let entry = OverlayEntry {
            key,
            obstacle_type: ObstacleType::from_class_name(&det.class_name),
            label: display_label(det),
            class_name: det.class_name.clone(),
            angle: det.angle,
            distance: det.distance,
            fusion_quality: det.fusion_quality,
            source: det.source(),
            last_cycle: self.cycle,
        };

        match key {
            Some(key) => {
                self.keyed.insert(key, entry);
            }
            None => self.anonymous.push(entry),
        }
        key
    }

    /// Finish the cycle, evicting tracks unseen for too long; returns evicted keys
    pub fn end_cycle(&mut self) -> Vec<TrackKey> {
        let cycle = self.cycle;
        let max_missed = self.config.max_missed_cycles;

        let stale: Vec<TrackKey> = self
            .keyed
            .iter()
            .filter(|(_, entry)| cycle.saturating_sub(entry.last_cycle) > max_missed)
            .map(|(key, _)| *key)
            .collect();

        for key in &stale {
            self.keyed.remove(key);
        }
        if !stale.is_empty() {
            debug!("Evicted {} stale overlay entries", stale.len());
        }
        stale
    }

    /// Replace the overlay contents with one fuse cycle's output
    pub fn apply_cycle(&mut self, detections: &[FusedDetection]) -> Vec<TrackKey> {
        self.begin_cycle();
        for det in detections {
            self.apply(det);
        }
        self.end_cycle()
    }

    pub fn remove(&mut self, key: &TrackKey) -> Option<OverlayEntry> {
        self.keyed.remove(key)
    }

    pub fn clear(&mut self) {
        self.keyed.clear();
        self.anonymous.clear();
    }

    pub fn get(&self, key: &TrackKey) -> Option<&OverlayEntry> {
        self.keyed.get(key)
    }

    pub fn len(&self) -> usize {
        self.keyed.len() + self.anonymous.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All entries ordered by bearing
    pub fn entries(&self) -> Vec<OverlayEntry> {
        let mut entries: Vec<OverlayEntry> = self
            .keyed
            .values()
            .chain(self.anonymous.iter())
            .cloned()
            .collect();
        entries.sort_by(|a, b| {
            a.angle
                .total_cmp(&b.angle)
                .then(a.distance.total_cmp(&b.distance))
        });
        entries
    }
}

impl Default for OverlayAdapter {
    fn default() -> Self {
        Self::new(OverlayConfig::default())
    }
}

/// Shares an [`OverlayAdapter`] with the fusion manager as a listener.
///
/// Records are applied to the current cycle; callers bracket each fuse pass
/// with `begin_cycle` / `end_cycle` on the shared adapter.
#[derive(Debug, Clone)]
pub struct OverlayListener {
    adapter: Arc<Mutex<OverlayAdapter>>,
}

impl OverlayListener {
    pub fn new(adapter: Arc<Mutex<OverlayAdapter>>) -> Self {
        Self { adapter }
    }

    pub fn adapter(&self) -> &Arc<Mutex<OverlayAdapter>> {
        &self.adapter
    }
}

impl FusionListener for OverlayListener {
    fn on_fused_detection(&self, detection: &FusedDetection) {
        match self.adapter.lock() {
            Ok(mut adapter) => {
                adapter.apply(detection);
            }
            Err(_) => warn!("Overlay lock poisoned, dropping record"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use detection_fusion::{FusionConfig, FusionManager};
    use detection_types::{CameraDetection, RangingDetection};

    fn camera_record(track_id: u32, distance: f64) -> FusedDetection {
        FusedDetection {
            class_name: "boat".to_string(),
            track_id: Some(track_id),
            angle: 90.0,
            distance,
            timestamp: 1.0,
            has_camera: true,
            has_ranging: false,
            camera_id: Some(1),
            bbox: Some([0.0, 0.0, 10.0, 10.0]),
            confidence: Some(0.8),
            ranging_intensity: None,
            ranging_track_id: None,
            fusion_quality: 0.5,
            angle_diff: None,
            time_diff: None,
        }
    }

    fn camera_key(camera_id: u32, track_id: u32) -> TrackKey {
        TrackKey::Camera {
            camera_id: Some(camera_id),
            track_id,
        }
    }

    fn untracked_ranging(angle: f64) -> FusedDetection {
        FusedDetection {
            class_name: "UNKNOWN".to_string(),
            track_id: None,
            angle,
            distance: 40.0,
            timestamp: 1.0,
            has_camera: false,
            has_ranging: true,
            camera_id: None,
            bbox: None,
            confidence: None,
            ranging_intensity: Some(0.4),
            ranging_track_id: None,
            fusion_quality: 0.3,
            angle_diff: None,
            time_diff: None,
        }
    }

    #[test]
    fn test_tracked_entries_update_in_place() {
        let mut adapter = OverlayAdapter::default();
        adapter.apply_cycle(&[camera_record(1, 100.0)]);
        adapter.apply_cycle(&[camera_record(1, 80.0)]);

        assert_eq!(adapter.len(), 1);
        let entry = adapter.get(&camera_key(1, 1)).unwrap();
        assert_eq!(entry.distance, 80.0);
        assert_eq!(entry.obstacle_type, ObstacleType::Boat);
        assert_eq!(entry.source, FusionSource::CameraOnly);
        assert_eq!(entry.last_cycle, 2);
    }

    #[test]
    fn test_same_track_id_on_two_cameras_kept_apart() {
        let mut adapter = OverlayAdapter::default();
        let mut other = camera_record(7, 60.0);
        other.camera_id = Some(2);
        other.angle = 180.0;
        adapter.apply_cycle(&[camera_record(7, 50.0), other]);

        assert_eq!(adapter.len(), 2);
        assert_eq!(adapter.get(&camera_key(1, 7)).unwrap().distance, 50.0);
        assert_eq!(adapter.get(&camera_key(2, 7)).unwrap().distance, 60.0);
    }

    #[test]
    fn test_untracked_entries_last_one_cycle() {
        let mut adapter = OverlayAdapter::default();
        adapter.apply_cycle(&[untracked_ranging(10.0), untracked_ranging(20.0)]);
        assert_eq!(adapter.len(), 2);

        adapter.apply_cycle(&[]);
        assert!(adapter.is_empty());
    }

    #[test]
    fn test_eviction_after_missed_cycles() {
        let mut adapter = OverlayAdapter::new(OverlayConfig {
            max_missed_cycles: 2,
        });
        adapter.apply_cycle(&[camera_record(5, 50.0)]);

        assert!(adapter.apply_cycle(&[]).is_empty());
        assert!(adapter.apply_cycle(&[]).is_empty());
        assert_eq!(adapter.apply_cycle(&[]), vec![camera_key(1, 5)]);
        assert!(adapter.is_empty());
    }

    #[test]
    fn test_zero_missed_cycles_requires_presence() {
        let mut adapter = OverlayAdapter::new(OverlayConfig {
            max_missed_cycles: 0,
        });
        adapter.apply_cycle(&[camera_record(1, 50.0), camera_record(2, 60.0)]);
        let evicted = adapter.apply_cycle(&[camera_record(2, 55.0)]);
        assert_eq!(evicted, vec![camera_key(1, 1)]);
        assert_eq!(adapter.len(), 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut adapter = OverlayAdapter::default();
        adapter.apply_cycle(&[camera_record(1, 50.0), untracked_ranging(5.0)]);

        assert!(adapter.remove(&camera_key(1, 1)).is_some());
        assert!(adapter.remove(&camera_key(1, 1)).is_none());
        assert_eq!(adapter.len(), 1);

        adapter.clear();
        assert!(adapter.is_empty());
    }

    #[test]
    fn test_entries_sorted_by_bearing() {
        let mut adapter = OverlayAdapter::default();
        let mut far = camera_record(1, 50.0);
        far.angle = 200.0;
        adapter.apply_cycle(&[far, untracked_ranging(30.0), camera_record(2, 10.0)]);

        let angles: Vec<f64> = adapter.entries().iter().map(|e| e.angle).collect();
        assert_eq!(angles, vec![30.0, 90.0, 200.0]);
    }

    #[test]
    fn test_entry_serializes_obstacle_type() {
        let mut adapter = OverlayAdapter::default();
        adapter.apply_cycle(&[camera_record(1, 50.0)]);
        let json = serde_json::to_value(adapter.entries()).unwrap();
        assert_eq!(json[0]["obstacle_type"], "BOAT");
    }

    #[test]
    fn test_listener_applies_manager_output() {
        let manager = FusionManager::new(FusionConfig::default()).unwrap();
        let adapter = Arc::new(Mutex::new(OverlayAdapter::default()));
        manager
            .add_listener(Arc::new(OverlayListener::new(Arc::clone(&adapter))))
            .unwrap();

        adapter.lock().unwrap().begin_cycle();
        manager
            .add_camera_detection(
                CameraDetection::new([900.0, 10.0, 1000.0, 90.0], "person", 1.0)
                    .with_camera_id(2)
                    .with_track_id(3),
            )
            .unwrap();
        manager
            .add_ranging_detection(RangingDetection::new(300.0, 25.0, 1.0).with_track_id(8))
            .unwrap();
        manager.process_frame(1.0).unwrap();
        adapter.lock().unwrap().end_cycle();

        let adapter = adapter.lock().unwrap();
        assert_eq!(adapter.len(), 2);
        assert_eq!(
            adapter.get(&camera_key(2, 3)).unwrap().obstacle_type,
            ObstacleType::Person
        );
        assert!(adapter.get(&TrackKey::Ranging(8)).is_some());
    }
}
