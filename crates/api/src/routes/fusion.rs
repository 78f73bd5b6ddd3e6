//! Fusion Routes

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use detection_types::{FusedDetection, FusionSource, SensorFrame};
use serde::{Deserialize, Serialize};

use crate::SharedState;

/// Query parameters for the fused endpoint
#[derive(Debug, Deserialize)]
pub struct FusedQuery {
    /// Only records of this source (`matched`, `camera_only`, `ranging_only`)
    pub source: Option<FusionSource>,
    /// Minimum fusion quality
    pub min_quality: Option<f64>,
    /// Maximum number of records
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

/// Response for the fused endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct FusedResponse {
    pub frame_id: Option<u64>,
    pub frame_timestamp: Option<f64>,
    pub data: Vec<FusedDetection>,
    pub count: usize,
}

/// Fused records of the latest frame
pub async fn get_fused(
    State(state): State<SharedState>,
    Query(params): Query<FusedQuery>,
) -> Json<FusedResponse> {
    let state = state.read().await;
    let latest = state.fusion.get_latest_frame();
    let limit = params.limit.min(1000);

    let data: Vec<FusedDetection> = latest
        .as_ref()
        .map(|frame| {
            frame
                .fused_detections
                .iter()
                .filter(|d| params.source.map_or(true, |s| d.source() == s))
                .filter(|d| params.min_quality.map_or(true, |q| d.fusion_quality >= q))
                .take(limit)
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    Json(FusedResponse {
        frame_id: latest.as_ref().map(|f| f.frame_id),
        frame_timestamp: latest.as_ref().map(|f| f.frame_timestamp),
        count: data.len(),
        data,
    })
}

/// Full latest frame: inputs plus fused output
pub async fn get_latest_frame(
    State(state): State<SharedState>,
) -> Result<Json<SensorFrame>, StatusCode> {
    let state = state.read().await;
    state
        .fusion
        .get_latest_frame()
        .map(|frame| Json(frame.as_ref().clone()))
        .ok_or(StatusCode::NOT_FOUND)
}
