//! Configuration types for the attendance client.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the client's YAML configuration file. Every section
//! falls back to its defaults when omitted.

use std::time::Duration;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL including the backend's API prefix (e.g., "https://hr.example.com/api").
    pub base_url: String,
    /// Bearer token attached to every request, when present.
    pub auth_token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Optional user agent override.
    pub user_agent: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            auth_token: None,
            timeout_secs: 30,
            user_agent: None,
        }
    }
}

/// Retry policy of the shared HTTP client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total number of attempts (initial try + retries).
    pub max_attempts: usize,
    /// Linear backoff step in milliseconds; retry `n` waits `n * backoff_ms`.
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 1000,
        }
    }
}

/// How the store resynchronizes after a break action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Pause between reads while waiting for the new break state.
    pub poll_interval_ms: u64,
    /// Upper bound on the total wait for the new break state.
    pub poll_timeout_ms: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            poll_timeout_ms: 3000,
        }
    }
}

/// Thresholds for advisory notifications, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Remind this many minutes before shift start.
    pub pre_shift_reminder_minutes: i64,
    /// Remind this many minutes before shift end.
    pub end_of_shift_reminder_minutes: i64,
    /// Warn once an open break has run longer than this.
    pub long_break_minutes: i64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            pre_shift_reminder_minutes: 30,
            end_of_shift_reminder_minutes: 30,
            long_break_minutes: 60,
        }
    }
}

fn default_timezone() -> Tz {
    chrono_tz::UTC
}

/// The complete client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend connection settings.
    pub api: ApiConfig,
    /// Retry policy for network and server errors.
    pub retry: RetryConfig,
    /// Break-action resynchronization policy.
    pub refresh: RefreshConfig,
    /// Advisory notification thresholds.
    pub notifications: NotificationConfig,
    /// IANA zone in which shift `HH:MM` times are interpreted.
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    /// How often the status ticker re-evaluates derived status.
    pub tick_interval_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            retry: RetryConfig::default(),
            refresh: RefreshConfig::default(),
            notifications: NotificationConfig::default(),
            timezone: default_timezone(),
            tick_interval_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Returns a configuration pointing at `base_url` with all other defaults.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let mut config = Self::default();
        config.api.base_url = base_url.into();
        config
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Linear backoff step between retries.
    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry.backoff_ms)
    }

    /// Pause between break-state polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.refresh.poll_interval_ms)
    }

    /// Bound on the total break-state polling time.
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.refresh.poll_timeout_ms)
    }

    /// Status ticker period.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs.max(1))
    }
}
