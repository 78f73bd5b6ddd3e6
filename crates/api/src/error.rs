//! Service error type

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid setting: {0}")]
    Setting(String),

    #[error("Fusion error: {0}")]
    Fusion(#[from] detection_fusion::FusionError),

    #[error("Alerting error: {0}")]
    Alert(#[from] alerting::AlertError),

    #[error("Failed to install metrics recorder: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("Failed to set tracing subscriber: {0}")]
    Logging(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Shared state lock poisoned")]
    Lock,
}
