//! Layered service configuration
//!
//! Sources, lowest precedence first:
//! 1. Built-in defaults
//! 2. Optional TOML file (path from `FUSION_CONFIG`, default `config/fusion.toml`)
//! 3. Environment variables `FUSION__<SECTION>__<KEY>`, e.g. `FUSION__SERVER__BIND_ADDR`

use alerting::ProximityConfig;
use detection_fusion::FusionConfig;
use serde::{Deserialize, Serialize};
use tactical_overlay::OverlayConfig;
use tracing::Level;

use crate::error::ApiError;
use crate::simulator::SimulatorConfig;

/// Env var naming the config file
pub const CONFIG_PATH_ENV: &str = "FUSION_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/fusion.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub fusion: FusionConfig,
    pub overlay: OverlayConfig,
    pub proximity: ProximityConfig,
    pub simulator: SimulatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
    /// Proximity events retained for `/api/v1/alerts`
    pub recent_events: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            recent_events: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// trace | debug | info | warn | error
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl LoggingSettings {
    pub fn max_level(&self) -> Result<Level, ApiError> {
        self.level
            .parse::<Level>()
            .map_err(|_| ApiError::Setting(format!("unknown log level '{}'", self.level)))
    }
}

impl ServiceConfig {
    /// Load from the file named by `FUSION_CONFIG` plus environment overrides
    pub fn load() -> Result<Self, ApiError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(&path)
    }

    /// Load from a specific file (missing file is fine) plus environment overrides
    pub fn load_from(path: &str) -> Result<Self, ApiError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("FUSION")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let service: ServiceConfig = settings.try_deserialize()?;
        service.validate()?;
        Ok(service)
    }

    /// Reject settings the service cannot start with
    pub fn validate(&self) -> Result<(), ApiError> {
        self.logging.max_level()?;
        self.fusion.validate()?;
        self.simulator.validate().map_err(ApiError::Setting)?;
        if self.server.recent_events == 0 {
            return Err(ApiError::Setting("server.recent_events must be positive".to_string()));
        }
        if !(self.proximity.threshold_m.is_finite() && self.proximity.threshold_m > 0.0) {
            return Err(alerting::AlertError::InvalidThreshold(self.proximity.threshold_m).into());
        }
        Ok(())
    }
}
