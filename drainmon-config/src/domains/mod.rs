//! Domain-specific configuration modules

pub mod http;
pub mod logging;
pub mod monitor;
pub mod utils;

use crate::error::ConfigResult;
use serde::{Deserialize, Serialize};

/// Main drainmon configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DrainmonConfig {
    /// Monitoring run configuration
    #[serde(default)]
    pub monitor: monitor::MonitorConfig,

    /// Metrics endpoint probe configuration
    #[serde(default)]
    pub http: http::HttpConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl DrainmonConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        crate::validation::validate_config(self)
    }
}
