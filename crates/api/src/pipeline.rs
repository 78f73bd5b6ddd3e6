//! Periodic ingest → fuse → overlay → alert loop

use std::time::Duration;

use alerting::ProximityEvent;
use detection_fusion::FusionMode;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::simulator::DetectionSimulator;
use crate::SharedState;

/// Outcome of one pipeline cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleSummary {
    pub frame_id: u64,
    pub fused: usize,
    pub matched: usize,
    pub rejected: usize,
    pub events: Vec<ProximityEvent>,
}

/// Drive the pipeline forever at a fixed period
pub async fn run_pipeline(state: SharedState, mut simulator: DetectionSimulator, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    loop {
        ticker.tick().await;
        if let Err(e) = run_cycle(&state, &mut simulator, now_seconds()).await {
            warn!("Pipeline cycle failed: {}", e);
        }
    }
}

/// Generate detections, fuse them and update the overlay and alerts
pub async fn run_cycle(
    state: &SharedState,
    simulator: &mut DetectionSimulator,
    timestamp: f64,
) -> Result<CycleSummary, ApiError> {
    let cycle = simulator.generate(timestamp);
    let mut state = state.write().await;
    let fusion = std::sync::Arc::clone(&state.fusion);

    state.overlay.lock().map_err(|_| ApiError::Lock)?.begin_cycle();

    let mut rejected = 0;
    let frame = match fusion.mode() {
        FusionMode::BufferedCycle => {
            for camera in cycle.cameras {
                if fusion.add_camera_detection(camera).is_err() {
                    rejected += 1;
                }
            }
            for ranging in cycle.ranging {
                if fusion.add_ranging_detection(ranging).is_err() {
                    rejected += 1;
                }
            }
            fusion.process_frame(timestamp)?
        }
        FusionMode::SnapshotReplace => {
            let offered = cycle.cameras.len() + cycle.ranging.len();
            let accepted = fusion.update_camera_detections(cycle.cameras)?
                + fusion.update_ranging_detections(cycle.ranging)?;
            rejected = offered - accepted;
            fusion.fuse()?;
            fusion
                .get_latest_frame()
                .ok_or_else(|| ApiError::Setting("fuse produced no frame".to_string()))?
        }
    };

    let evicted = state.overlay.lock().map_err(|_| ApiError::Lock)?.end_cycle();
    if !evicted.is_empty() {
        debug!("Overlay evicted {:?}", evicted);
    }

    let events = state.alerts.check_all(&frame.fused_detections);
    for event in &events {
        state.recent_events.push(event.clone());
    }
    metrics::gauge!("fusion_active_alerts").set(state.alerts.active_alert_count() as f64);

    info!(
        "Frame {}: {} fused ({} matched, {} camera-only, {} ranging-only), {}",
        frame.frame_id,
        frame.fused_detections.len(),
        frame.matched_count(),
        frame.camera_only_count(),
        frame.ranging_only_count(),
        state.alerts.summary()
    );

    Ok(CycleSummary {
        frame_id: frame.frame_id,
        fused: frame.fused_detections.len(),
        matched: frame.matched_count(),
        rejected,
        events,
    })
}

fn now_seconds() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
