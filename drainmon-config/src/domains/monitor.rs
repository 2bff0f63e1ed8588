//! Monitoring run configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, validate_url, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for a single monitoring run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Expected duration of the load test
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_test_duration"
    )]
    pub test_duration: Duration,

    /// Interval between samples (fractional seconds supported)
    #[serde(
        with = "crate::domains::utils::serde_duration_f64",
        default = "default_sample_interval"
    )]
    pub sample_interval: Duration,

    /// Maximum time to wait for background tasks after the test ends
    #[serde(
        with = "crate::domains::utils::serde_duration",
        default = "default_max_drain_wait"
    )]
    pub max_drain_wait: Duration,

    /// URL of the server's internal metrics endpoint
    #[serde(default = "default_metrics_url")]
    pub metrics_url: String,

    /// Explicit target process ID; when absent the process locator scans for one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,

    /// Command-line markers identifying the target process
    #[serde(default)]
    pub process_markers: ProcessMarkers,
}

/// Substrings that must both appear in the target's command line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessMarkers {
    /// Launcher marker, e.g. the server runner binary
    #[serde(default = "default_launcher_marker")]
    pub launcher: String,

    /// Application module identifier passed to the launcher
    #[serde(default = "default_module_marker")]
    pub module: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            test_duration: default_test_duration(),
            sample_interval: default_sample_interval(),
            max_drain_wait: default_max_drain_wait(),
            metrics_url: default_metrics_url(),
            pid: None,
            process_markers: ProcessMarkers::default(),
        }
    }
}

impl Default for ProcessMarkers {
    fn default() -> Self {
        Self {
            launcher: default_launcher_marker(),
            module: default_module_marker(),
        }
    }
}

impl Validatable for MonitorConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(
            self.test_duration.as_secs(),
            "test_duration",
            self.domain_name(),
        )?;

        if self.sample_interval.is_zero() {
            return Err(self.validation_error("sample_interval must be greater than 0"));
        }

        validate_positive(
            self.max_drain_wait.as_secs(),
            "max_drain_wait",
            self.domain_name(),
        )?;

        validate_url(&self.metrics_url, "metrics_url", self.domain_name())?;

        self.process_markers.validate()?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "monitor"
    }
}

impl Validatable for ProcessMarkers {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.launcher, "launcher", self.domain_name())?;
        validate_required_string(&self.module, "module", self.domain_name())?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "monitor.process_markers"
    }
}

// Default value functions
fn default_test_duration() -> Duration {
    Duration::from_secs(30)
}

fn default_sample_interval() -> Duration {
    Duration::from_secs_f64(1.0)
}

fn default_max_drain_wait() -> Duration {
    Duration::from_secs(60)
}

fn default_metrics_url() -> String {
    "http://localhost:8000/metrics".to_string()
}

fn default_launcher_marker() -> String {
    "uvicorn".to_string()
}

fn default_module_marker() -> String {
    "app.main:app".to_string()
}
