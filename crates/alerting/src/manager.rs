//! Proximity Alert Manager Implementation

use detection_types::{FusedDetection, TrackKey};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use crate::AlertError;

/// Default alert distance in metres
pub const DEFAULT_THRESHOLD_M: f64 = 10.0;

/// Proximity alert configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Objects strictly closer than this raise an alert (metres)
    pub threshold_m: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            threshold_m: DEFAULT_THRESHOLD_M,
        }
    }
}

/// Per-object alert state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertState {
    pub key: TrackKey,
    pub alerting: bool,
    pub class_name: String,
    /// Last observed distance (metres)
    pub distance: f64,
    pub angle: f64,
    /// Timestamp of the last observation
    pub last_seen: f64,
}

/// Transition emitted by [`ProximityAlertManager::check`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProximityEvent {
    Raised {
        key: TrackKey,
        class_name: String,
        distance: f64,
    },
    Cleared {
        key: TrackKey,
        class_name: String,
        distance: f64,
    },
}

impl ProximityEvent {
    pub fn key(&self) -> TrackKey {
        match self {
            Self::Raised { key, .. } | Self::Cleared { key, .. } => *key,
        }
    }

    /// Human-readable message
    pub fn message(&self) -> String {
        match self {
            Self::Raised { key, class_name, distance } => format!(
                "CAUTION: {} detected at {:.1}m ({})",
                class_name,
                distance,
                key_label(key)
            ),
            Self::Cleared { class_name, distance, .. } => format!(
                "Alert cleared: {} now at safe distance ({:.1}m)",
                class_name, distance
            ),
        }
    }
}

fn key_label(key: &TrackKey) -> String {
    match key {
        TrackKey::Camera {
            camera_id: Some(camera_id),
            track_id,
        } => format!("C{}-{}", camera_id, track_id),
        TrackKey::Camera {
            camera_id: None,
            track_id,
        } => format!("T{}", track_id),
        TrackKey::Ranging(track_id) => format!("R{}", track_id),
    }
}

/// Tracks which objects are inside the alert zone
pub struct ProximityAlertManager {
    config: ProximityConfig,
    states: HashMap<TrackKey, AlertState>,
}

impl ProximityAlertManager {
    /// Create a new proximity alert manager
    pub fn new(config: ProximityConfig) -> Result<Self, AlertError> {
        validate_threshold(config.threshold_m)?;
        info!("Creating proximity alert manager: threshold {}m", config.threshold_m);
        Ok(Self {
            config,
            states: HashMap::new(),
        })
    }

    pub fn threshold(&self) -> f64 {
        self.config.threshold_m
    }

    /// Update the alert distance; existing states are re-evaluated on next check
    pub fn set_threshold(&mut self, threshold_m: f64) -> Result<(), AlertError> {
        validate_threshold(threshold_m)?;
        info!(
            "Proximity threshold updated from {}m to {}m",
            self.config.threshold_m, threshold_m
        );
        self.config.threshold_m = threshold_m;
        Ok(())
    }

    /// Evaluate one fused record; returns an event on a state transition.
    ///
    /// Records without any track id cannot be followed across cycles and are
    /// ignored.
    pub fn check(&mut self, det: &FusedDetection) -> Option<ProximityEvent> {
        let key = det.track_key()?;
        let inside = det.distance < self.config.threshold_m;

        let state = self.states.entry(key).or_insert_with(|| AlertState {
            key,
            alerting: false,
            class_name: det.class_name.clone(),
            distance: det.distance,
            angle: det.angle,
            last_seen: det.timestamp,
        });
        let was_alerting = state.alerting;
        state.alerting = inside;
        state.class_name.clone_from(&det.class_name);
        state.distance = det.distance;
        state.angle = det.angle;
        state.last_seen = det.timestamp;

        let event = match (was_alerting, inside) {
            (false, true) => ProximityEvent::Raised {
                key,
                class_name: det.class_name.clone(),
                distance: det.distance,
            },
            (true, false) => ProximityEvent::Cleared {
                key,
                class_name: det.class_name.clone(),
                distance: det.distance,
            },
            _ => return None,
        };

        match &event {
            ProximityEvent::Raised { .. } => warn!("PROXIMITY ALERT: {}", event.message()),
            ProximityEvent::Cleared { .. } => info!("{}", event.message()),
        }
        Some(event)
    }

    /// Evaluate a whole cycle, then forget objects no longer present
    pub fn check_all(&mut self, detections: &[FusedDetection]) -> Vec<ProximityEvent> {
        let events: Vec<ProximityEvent> = detections.iter().filter_map(|d| self.check(d)).collect();
        let active: HashSet<TrackKey> =
            detections.iter().filter_map(FusedDetection::track_key).collect();
        self.cleanup_stale(&active);
        events
    }

    /// Drop state for objects whose keys are not in `active_keys`
    pub fn cleanup_stale(&mut self, active_keys: &HashSet<TrackKey>) -> usize {
        let before = self.states.len();
        self.states.retain(|key, _| active_keys.contains(key));
        let removed = before - self.states.len();
        if removed > 0 {
            debug!("Removed {} stale proximity states", removed);
        }
        removed
    }

    /// Number of objects currently inside the alert zone
    pub fn active_alert_count(&self) -> usize {
        self.states.values().filter(|s| s.alerting).count()
    }

    /// Objects currently inside the alert zone, closest first
    pub fn active_alerts(&self) -> Vec<AlertState> {
        let mut alerts: Vec<AlertState> =
            self.states.values().filter(|s| s.alerting).cloned().collect();
        alerts.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.key.cmp(&b.key)));
        alerts
    }

    pub fn state(&self, key: &TrackKey) -> Option<&AlertState> {
        self.states.get(key)
    }

    pub fn summary(&self) -> String {
        match self.active_alert_count() {
            0 => "No active proximity alerts".to_string(),
            1 => "1 object within alert zone".to_string(),
            n => format!("{} objects within alert zone", n),
        }
    }

    /// Clear all alert states
    pub fn clear(&mut self) {
        self.states.clear();
    }
}

impl Default for ProximityAlertManager {
    fn default() -> Self {
        Self {
            config: ProximityConfig::default(),
            states: HashMap::new(),
        }
    }
}

fn validate_threshold(threshold_m: f64) -> Result<(), AlertError> {
    if threshold_m.is_finite() && threshold_m > 0.0 {
        Ok(())
    } else {
        Err(AlertError::InvalidThreshold(threshold_m))
    }
}
