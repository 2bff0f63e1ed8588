//! Configuration loading and environment variable handling

use crate::domains::DrainmonConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::time::Duration;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "DRAINMON".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<DrainmonConfig> {
        let content = std::fs::read_to_string(path)?;
        let mut config: DrainmonConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<DrainmonConfig> {
        let mut config = DrainmonConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<DrainmonConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut DrainmonConfig) -> ConfigResult<()> {
        self.apply_monitor_overrides(&mut config.monitor)?;
        self.apply_http_overrides(&mut config.http)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    /// Apply monitor config overrides
    fn apply_monitor_overrides(
        &self,
        config: &mut crate::domains::monitor::MonitorConfig,
    ) -> ConfigResult<()> {
        if let Ok(duration) = self.get_env_var("TEST_DURATION") {
            let seconds: u64 = duration
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid TEST_DURATION: {}", e)))?;
            config.test_duration = Duration::from_secs(seconds);
        }

        if let Ok(interval) = self.get_env_var("SAMPLE_INTERVAL") {
            let seconds: f64 = interval
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid SAMPLE_INTERVAL: {}", e)))?;
            config.sample_interval = Duration::from_secs_f64(seconds);
        }

        if let Ok(max_wait) = self.get_env_var("MAX_DRAIN_WAIT") {
            let seconds: u64 = max_wait
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid MAX_DRAIN_WAIT: {}", e)))?;
            config.max_drain_wait = Duration::from_secs(seconds);
        }

        if let Ok(url) = self.get_env_var("METRICS_URL") {
            config.metrics_url = url;
        }

        if let Ok(pid) = self.get_env_var("PID") {
            config.pid = Some(
                pid.parse()
                    .map_err(|e| ConfigError::EnvError(format!("Invalid PID: {}", e)))?,
            );
        }

        Ok(())
    }

    /// Apply HTTP probe config overrides
    fn apply_http_overrides(
        &self,
        config: &mut crate::domains::http::HttpConfig,
    ) -> ConfigResult<()> {
        if let Ok(timeout) = self.get_env_var("HTTP_TIMEOUT") {
            let seconds: f64 = timeout
                .parse()
                .map_err(|e| ConfigError::EnvError(format!("Invalid HTTP_TIMEOUT: {}", e)))?;
            config.timeout = Duration::from_secs_f64(seconds);
        }

        if let Ok(user_agent) = self.get_env_var("HTTP_USER_AGENT") {
            config.user_agent = user_agent;
        }

        Ok(())
    }

    /// Apply logging config overrides
    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            use std::str::FromStr;
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            use std::str::FromStr;
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
