//! Overlay Routes

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tactical_overlay::OverlayEntry;

use crate::SharedState;

#[derive(Debug, Serialize, Deserialize)]
pub struct OverlayResponse {
    pub cycle: u64,
    pub data: Vec<OverlayEntry>,
    pub count: usize,
}

/// Current tactical-map obstacles
pub async fn get_overlay(
    State(state): State<SharedState>,
) -> Result<Json<OverlayResponse>, StatusCode> {
    let state = state.read().await;
    let overlay = state
        .overlay
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let data = overlay.entries();

    Ok(Json(OverlayResponse {
        cycle: overlay.cycle(),
        count: data.len(),
        data,
    }))
}
