//! Alert Routes

use alerting::{AlertState, ProximityEvent};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::SharedState;

/// Query parameters for alerts endpoint
#[derive(Debug, Deserialize)]
pub struct AlertQuery {
    /// Maximum number of recent events
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// Response for alerts endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct AlertResponse {
    pub summary: String,
    pub threshold_m: f64,
    pub active: Vec<AlertState>,
    /// Newest first
    pub recent: Vec<ProximityEvent>,
}

/// Get active proximity alerts and recent transitions
pub async fn get_alerts(
    State(state): State<SharedState>,
    Query(params): Query<AlertQuery>,
) -> Json<AlertResponse> {
    let state = state.read().await;

    Json(AlertResponse {
        summary: state.alerts.summary(),
        threshold_m: state.alerts.threshold(),
        active: state.alerts.active_alerts(),
        recent: state.recent_events.read_last(params.limit),
    })
}
