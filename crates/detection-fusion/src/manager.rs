//! Fusion manager: buffers, fuse cycles, history and notification

use std::sync::{Arc, Mutex, MutexGuard};

use association::AssociationEngine;
use data_validator::{ValidationError, Validator};
use detection_types::{CameraDetection, FusedDetection, RangingDetection, SensorFrame};
use ring_buffer::RingBuffer;
use tracing::{debug, info, warn};

use crate::config::{FusionConfig, FusionMode};
use crate::listener::FusionListener;
use crate::synthesizer::FusionSynthesizer;
use crate::FusionError;

/// Mutable state, serialized through one mutex
struct ManagerState {
    /// Camera buffer (buffered mode) or last snapshot (snapshot mode)
    camera: Vec<CameraDetection>,
    /// Ranging buffer (buffered mode) or last snapshot (snapshot mode)
    ranging: Vec<RangingDetection>,
    history: RingBuffer<Arc<SensorFrame>>,
    next_frame_id: u64,
    listeners: Vec<Arc<dyn FusionListener>>,
}

/// Orchestrates ingestion, association, synthesis and history
pub struct FusionManager {
    config: FusionConfig,
    validator: Validator,
    engine: AssociationEngine,
    synthesizer: FusionSynthesizer,
    state: Mutex<ManagerState>,
}

impl FusionManager {
    /// Create a manager; invalid configuration is refused
    pub fn new(config: FusionConfig) -> Result<Self, FusionError> {
        config.validate()?;
        let engine = AssociationEngine::new(config.association.clone(), config.build_mapper()?)?;

        info!(
            "Creating fusion manager: mode={} history_capacity={} frame_width={}",
            config.mode, config.history_capacity, config.frame_width
        );

        Ok(Self {
            validator: Validator::new(config.validation.clone()),
            synthesizer: FusionSynthesizer::new(config.synthesis.clone()),
            state: Mutex::new(ManagerState {
                camera: Vec::new(),
                ranging: Vec::new(),
                history: RingBuffer::new(config.history_capacity),
                next_frame_id: 1,
                listeners: Vec::new(),
            }),
            engine,
            config,
        })
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    pub fn mode(&self) -> FusionMode {
        self.config.mode
    }

    fn lock(&self) -> Result<MutexGuard<'_, ManagerState>, FusionError> {
        self.state.lock().map_err(|_| FusionError::Lock)
    }

    fn require_mode(&self, mode: FusionMode, operation: &'static str) -> Result<(), FusionError> {
        if self.config.mode == mode {
            Ok(())
        } else {
            Err(FusionError::WrongMode {
                operation,
                mode: self.config.mode,
            })
        }
    }

    /// Register a per-record listener
    pub fn add_listener(&self, listener: Arc<dyn FusionListener>) -> Result<(), FusionError> {
        self.lock()?.listeners.push(listener);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Buffered-cycle mode
    // ---------------------------------------------------------------------

    /// Buffer a camera detection for the next cycle
    pub fn add_camera_detection(&self, detection: CameraDetection) -> Result<(), FusionError> {
        self.require_mode(FusionMode::BufferedCycle, "add_camera_detection")?;
        let detection = self
            .validator
            .validate_camera(detection)
            .map_err(|err| reject("camera", err))?;
        self.lock()?.camera.push(detection);
        Ok(())
    }

    /// Buffer a ranging detection for the next cycle
    pub fn add_ranging_detection(&self, detection: RangingDetection) -> Result<(), FusionError> {
        self.require_mode(FusionMode::BufferedCycle, "add_ranging_detection")?;
        let detection = self
            .validator
            .validate_ranging(detection)
            .map_err(|err| reject("ranging", err))?;
        self.lock()?.ranging.push(detection);
        Ok(())
    }

    /// Fuse the buffered detections, record the frame and clear the buffers
    pub fn process_frame(&self, frame_timestamp: f64) -> Result<Arc<SensorFrame>, FusionError> {
        self.require_mode(FusionMode::BufferedCycle, "process_frame")?;
        self.validator.validate_timestamp(frame_timestamp)?;

        let (frame, listeners) = {
            let mut state = self.lock()?;
            let camera = std::mem::take(&mut state.camera);
            let ranging = std::mem::take(&mut state.ranging);
            let frame = self.run_cycle(&mut state, frame_timestamp, camera, ranging);
            (frame, state.listeners.clone())
        };

        notify(&listeners, &frame);
        Ok(frame)
    }

    // ---------------------------------------------------------------------
    // Snapshot-replace mode
    // ---------------------------------------------------------------------

    /// Replace the camera snapshot; returns the number of accepted detections
    pub fn update_camera_detections(
        &self,
        detections: Vec<CameraDetection>,
    ) -> Result<usize, FusionError> {
        self.require_mode(FusionMode::SnapshotReplace, "update_camera_detections")?;
        let report = self.validator.validate_camera_batch(detections);
        for err in report.rejected {
            reject("camera", err);
        }
        let accepted = report.accepted.len();
        self.lock()?.camera = report.accepted;
        Ok(accepted)
    }

    /// Replace the ranging snapshot; returns the number of accepted detections
    pub fn update_ranging_detections(
        &self,
        detections: Vec<RangingDetection>,
    ) -> Result<usize, FusionError> {
        self.require_mode(FusionMode::SnapshotReplace, "update_ranging_detections")?;
        let report = self.validator.validate_ranging_batch(detections);
        for err in report.rejected {
            reject("ranging", err);
        }
        let accepted = report.accepted.len();
        self.lock()?.ranging = report.accepted;
        Ok(accepted)
    }

    /// Re-fuse the latest snapshots without clearing them
    pub fn fuse(&self) -> Result<Vec<FusedDetection>, FusionError> {
        self.require_mode(FusionMode::SnapshotReplace, "fuse")?;

        let (frame, listeners) = {
            let mut state = self.lock()?;
            let camera = state.camera.clone();
            let ranging = state.ranging.clone();
            let frame_timestamp = camera
                .iter()
                .map(|c| c.timestamp)
                .chain(ranging.iter().map(|r| r.timestamp))
                .fold(None, |newest: Option<f64>, t| Some(newest.map_or(t, |n| n.max(t))))
                .unwrap_or(0.0);
            let frame = self.run_cycle(&mut state, frame_timestamp, camera, ranging);
            (frame, state.listeners.clone())
        };

        notify(&listeners, &frame);
        Ok(frame.fused_detections.clone())
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// Most recent frame in history
    pub fn get_latest_frame(&self) -> Option<Arc<SensorFrame>> {
        self.state
            .lock()
            .ok()
            .and_then(|state| state.history.latest().cloned())
    }

    /// Fused records of the most recent frame (empty if none)
    pub fn get_fused_detections(&self) -> Vec<FusedDetection> {
        self.get_latest_frame()
            .map(|frame| frame.fused_detections.clone())
            .unwrap_or_default()
    }

    /// History, oldest first
    pub fn history(&self) -> Vec<Arc<SensorFrame>> {
        self.state
            .lock()
            .map(|state| state.history.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn history_len(&self) -> usize {
        self.state.lock().map(|state| state.history.len()).unwrap_or(0)
    }

    /// (camera, ranging) detections waiting for the next fuse pass
    pub fn buffered_counts(&self) -> (usize, usize) {
        self.state
            .lock()
            .map(|state| (state.camera.len(), state.ranging.len()))
            .unwrap_or((0, 0))
    }

    /// Drop buffered (or snapshot) detections
    pub fn clear_buffers(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.camera.clear();
            state.ranging.clear();
        }
    }

    /// Drop all recorded frames
    pub fn clear_history(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.history.clear();
        }
    }

    fn run_cycle(
        &self,
        state: &mut ManagerState,
        frame_timestamp: f64,
        camera: Vec<CameraDetection>,
        ranging: Vec<RangingDetection>,
    ) -> Arc<SensorFrame> {
        let assignment = self.engine.associate(&camera, &ranging);
        let fused = self.synthesizer.synthesize(&camera, &ranging, &assignment);

        let frame = Arc::new(SensorFrame {
            frame_id: state.next_frame_id,
            frame_timestamp,
            camera_detections: camera,
            ranging_detections: ranging,
            fused_detections: fused,
        });
        state.next_frame_id += 1;

        if let Some(evicted) = state.history.push(Arc::clone(&frame)) {
            debug!("History full, evicted frame {}", evicted.frame_id);
        }

        debug!(
            "Frame {} @ {:.3}: {} matched, {} camera-only, {} ranging-only, mean quality {:.2}",
            frame.frame_id,
            frame.frame_timestamp,
            frame.matched_count(),
            frame.camera_only_count(),
            frame.ranging_only_count(),
            frame.mean_quality()
        );

        metrics::counter!("fusion_cycles_total").increment(1);
        for det in &frame.fused_detections {
            metrics::counter!("fusion_detections_total", "source" => det.source().as_str())
                .increment(1);
        }
        metrics::gauge!("fusion_mean_quality").set(frame.mean_quality());

        frame
    }
}

/// Log and count a rejected detection
fn reject(stream: &'static str, err: ValidationError) -> FusionError {
    warn!("Dropping {} detection: {}", stream, err);
    metrics::counter!("fusion_rejected_total", "stream" => stream).increment(1);
    FusionError::Rejected(err)
}

fn notify(listeners: &[Arc<dyn FusionListener>], frame: &SensorFrame) {
    if listeners.is_empty() {
        return;
    }
    for det in &frame.fused_detections {
        for listener in listeners {
            listener.on_fused_detection(det);
        }
    }
}
