//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the client
//! configuration from a YAML file.

use std::fs;
use std::path::Path;

use crate::error::{AttendanceError, AttendanceResult};

use super::types::ClientConfig;

/// Loads and validates the client configuration.
///
/// # File Format
///
/// ```text
/// api:
///   base_url: "https://hr.example.com/api"
///   timeout_secs: 30
/// retry:
///   max_attempts: 3
///   backoff_ms: 1000
/// refresh:
///   poll_interval_ms: 250
///   poll_timeout_ms: 3000
/// notifications:
///   pre_shift_reminder_minutes: 30
///   end_of_shift_reminder_minutes: 30
///   long_break_minutes: 60
/// timezone: "Asia/Dhaka"
/// tick_interval_secs: 30
/// ```
///
/// # Example
///
/// ```no_run
/// use attendance_client::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/client.yaml").unwrap();
/// println!("Backend: {}", loader.config().api.base_url);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: ClientConfig,
}

impl ConfigLoader {
    /// Loads configuration from the YAML file at `path`.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - The file is missing
    /// - The file contains invalid YAML or an unknown time zone
    /// - A value fails validation (empty base URL, zero attempts)
    pub fn load<P: AsRef<Path>>(path: P) -> AttendanceResult<Self> {
        let path = path.as_ref();
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| AttendanceError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::parse(&content, &path_str)
    }

    /// Parses configuration from YAML text.
    pub fn from_yaml_str(content: &str) -> AttendanceResult<Self> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> AttendanceResult<Self> {
        let config: ClientConfig =
            serde_yaml::from_str(content).map_err(|e| AttendanceError::ConfigParseError {
                path: origin.to_string(),
                message: e.to_string(),
            })?;

        Self::validate(&config, origin)?;
        Ok(Self { config })
    }

    fn validate(config: &ClientConfig, origin: &str) -> AttendanceResult<()> {
        let invalid = |message: &str| AttendanceError::ConfigParseError {
            path: origin.to_string(),
            message: message.to_string(),
        };

        if config.api.base_url.trim().is_empty() {
            return Err(invalid("api.base_url must not be empty"));
        }
        if config.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts must be at least 1"));
        }
        if config.refresh.poll_interval_ms == 0 {
            return Err(invalid("refresh.poll_interval_ms must be positive"));
        }
        Ok(())
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Consumes the loader and returns the configuration.
    pub fn into_config(self) -> ClientConfig {
        self.config
    }
}
