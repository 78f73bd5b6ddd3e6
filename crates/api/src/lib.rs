//! Sensor Fusion API Server
//!
//! REST API over the fusion pipeline: fused detections, frame history,
//! tactical overlay entries, proximity alerts and Prometheus metrics.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

pub mod error;
pub mod pipeline;
mod routes;
pub mod settings;
pub mod simulator;

pub use error::ApiError;
pub use settings::{LoggingSettings, ServiceConfig};

use alerting::{ProximityAlertManager, ProximityEvent};
use detection_fusion::FusionManager;
use ring_buffer::RingBuffer;
use simulator::DetectionSimulator;
use tactical_overlay::{OverlayAdapter, OverlayListener};

pub type SharedState = Arc<RwLock<AppState>>;

/// Application state shared across handlers
pub struct AppState {
    pub fusion: Arc<FusionManager>,
    /// Shared with the fusion manager through an [`OverlayListener`]
    pub overlay: Arc<Mutex<OverlayAdapter>>,
    pub alerts: ProximityAlertManager,
    /// Most recent raise/clear transitions
    pub recent_events: RingBuffer<ProximityEvent>,
    pub metrics: Option<PrometheusHandle>,
    pub version: String,
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Build the pipeline components and wire the overlay to fusion output
    pub fn new(config: &ServiceConfig) -> Result<Self, ApiError> {
        let fusion = Arc::new(FusionManager::new(config.fusion.clone())?);
        let overlay = Arc::new(Mutex::new(OverlayAdapter::new(config.overlay.clone())));
        fusion.add_listener(Arc::new(OverlayListener::new(Arc::clone(&overlay))))?;

        Ok(Self {
            fusion,
            overlay,
            alerts: ProximityAlertManager::new(config.proximity.clone())?,
            recent_events: RingBuffer::new(config.server.recent_events),
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        })
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub mode: String,
    pub fusion: FusionStatus,
}

#[derive(Debug, Serialize)]
pub struct FusionStatus {
    pub history_len: usize,
    pub history_capacity: usize,
    pub latest_frame_id: Option<u64>,
    pub latest_frame_timestamp: Option<f64>,
    pub buffered_camera: usize,
    pub buffered_ranging: usize,
    pub active_alerts: usize,
}

/// Create the application router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/fused", get(routes::fusion::get_fused))
        .route("/api/v1/frames/latest", get(routes::fusion::get_latest_frame))
        .route("/api/v1/overlay", get(routes::overlay::get_overlay))
        .route("/api/v1/alerts", get(routes::alerts::get_alerts))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let state = state.read().await;
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let latest = state.fusion.get_latest_frame();
    let (buffered_camera, buffered_ranging) = state.fusion.buffered_counts();

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        mode: state.fusion.mode().to_string(),
        fusion: FusionStatus {
            history_len: state.fusion.history_len(),
            history_capacity: state.fusion.config().history_capacity,
            latest_frame_id: latest.as_ref().map(|f| f.frame_id),
            latest_frame_timestamp: latest.as_ref().map(|f| f.frame_timestamp),
            buffered_camera,
            buffered_ranging,
            active_alerts: state.alerts.active_alert_count(),
        },
    })
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<SharedState>) -> impl IntoResponse {
    let state = state.read().await;
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::SERVICE_UNAVAILABLE, "metrics recorder not installed".to_string()),
    }
}

/// Initialize logging
pub fn init_logging(settings: &LoggingSettings) -> Result<(), ApiError> {
    let level = settings.max_level()?;
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if settings.json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

/// Run the server
pub async fn run_server(config: ServiceConfig) -> Result<(), ApiError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    let state: SharedState = Arc::new(RwLock::new(AppState::new(&config)?.with_metrics(handle)));

    if config.simulator.enabled {
        let simulator = DetectionSimulator::new(config.simulator.clone(), config.fusion.build_mapper()?);
        let interval = Duration::from_millis(config.simulator.interval_ms);
        info!("Starting detection simulator every {:?}", interval);
        tokio::spawn(pipeline::run_pipeline(Arc::clone(&state), simulator, interval));
    }

    let app = create_router(state);

    info!("Starting API server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use detection_types::{CameraDetection, RangingDetection};
    use tower::ServiceExt;

    fn test_state() -> SharedState {
        Arc::new(RwLock::new(AppState::new(&ServiceConfig::default()).unwrap()))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, value)
    }

    /// One matched object close by, one ranging-only object far away
    async fn fuse_one_cycle(state: &SharedState) {
        let state = state.read().await;
        state.overlay.lock().unwrap().begin_cycle();
        state
            .fusion
            .add_camera_detection(
                CameraDetection::new([1780.0, 400.0, 1846.0, 520.0], "boat", 100.0)
                    .with_camera_id(1)
                    .with_track_id(1),
            )
            .unwrap();
        state
            .fusion
            .add_ranging_detection(RangingDetection::new(132.0, 8.0, 100.01).with_track_id(2))
            .unwrap();
        state
            .fusion
            .add_ranging_detection(RangingDetection::new(10.0, 250.0, 100.01).with_track_id(3))
            .unwrap();
        state.fusion.process_frame(100.02).unwrap();
        state.overlay.lock().unwrap().end_cycle();
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_json(create_router(test_state()), "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["mode"], "buffered_cycle");
        assert_eq!(body["fusion"]["history_len"], 0);
    }

    #[tokio::test]
    async fn test_latest_frame_missing_then_present() {
        let state = test_state();
        let (status, _) = get_json(create_router(Arc::clone(&state)), "/api/v1/frames/latest").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        fuse_one_cycle(&state).await;
        let (status, body) = get_json(create_router(state), "/api/v1/frames/latest").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["frame_id"], 1);
        assert_eq!(body["fused_detections"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_fused_filters_by_source() {
        let state = test_state();
        fuse_one_cycle(&state).await;

        let (_, all) = get_json(create_router(Arc::clone(&state)), "/api/v1/fused").await;
        assert_eq!(all["count"], 2);

        let (status, matched) =
            get_json(create_router(state), "/api/v1/fused?source=matched").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(matched["count"], 1);
        assert_eq!(matched["data"][0]["class_name"], "boat");
        assert_eq!(matched["data"][0]["distance"], 8.0);
    }

    #[tokio::test]
    async fn test_overlay_entries() {
        let state = test_state();
        fuse_one_cycle(&state).await;

        let (status, body) = get_json(create_router(state), "/api/v1/overlay").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["cycle"], 1);
    }

    #[tokio::test]
    async fn test_alerts_after_pipeline_update() {
        let state = test_state();
        fuse_one_cycle(&state).await;
        {
            let mut guard = state.write().await;
            let frame = guard.fusion.get_latest_frame().unwrap();
            let events = guard.alerts.check_all(&frame.fused_detections);
            for event in events {
                guard.recent_events.push(event);
            }
        }

        let (status, body) = get_json(create_router(state), "/api/v1/alerts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"], "1 object within alert zone");
        assert_eq!(body["active"].as_array().unwrap().len(), 1);
        assert_eq!(body["recent"][0]["event"], "raised");
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
