//! Request payloads and server summaries for clock actions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::record::{
    WorkMode, lenient, lenient_minutes, lenient_minutes_or_zero, null_as_default,
};

/// Coordinates captured at clock-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLocation {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Reported accuracy radius in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}

/// Device details captured at clock-in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Operating system or platform name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    /// Client user agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Stable device identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

/// When and how the clock-in data was captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureMetadata {
    /// Capture timestamp on the device.
    pub captured_at: DateTime<Utc>,
    /// Capture source (e.g., "gps", "manual").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Body of `POST /employee/attendance/clock-in`.
///
/// # Example
///
/// ```
/// use attendance_client::models::{ClockInRequest, WorkMode};
///
/// let request = ClockInRequest::new(WorkMode::Field)
///     .with_location_details("Client site, building B")
///     .with_location(23.81, 90.41, Some(12.0));
///
/// let json = serde_json::to_value(&request).unwrap();
/// assert_eq!(json["workMode"], "field");
/// assert_eq!(json["location"]["latitude"], 23.81);
/// assert!(json.get("deviceInfo").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockInRequest {
    /// Declared work mode for the day.
    pub work_mode: WorkMode,
    /// Free-text location details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_details: Option<String>,
    /// Captured coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoLocation>,
    /// Captured device details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_info: Option<DeviceInfo>,
    /// Capture metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_metadata: Option<CaptureMetadata>,
}

impl ClockInRequest {
    /// Creates a request carrying only the work mode.
    pub fn new(work_mode: WorkMode) -> Self {
        Self {
            work_mode,
            location_details: None,
            location: None,
            device_info: None,
            capture_metadata: None,
        }
    }

    /// Attaches free-text location details.
    pub fn with_location_details(mut self, details: impl Into<String>) -> Self {
        self.location_details = Some(details.into());
        self
    }

    /// Attaches captured coordinates.
    pub fn with_location(mut self, latitude: f64, longitude: f64, accuracy: Option<f64>) -> Self {
        self.location = Some(GeoLocation {
            latitude,
            longitude,
            accuracy,
        });
        self
    }

    /// Attaches device details.
    pub fn with_device_info(mut self, device_info: DeviceInfo) -> Self {
        self.device_info = Some(device_info);
        self
    }

    /// Attaches capture metadata.
    pub fn with_capture_metadata(mut self, metadata: CaptureMetadata) -> Self {
        self.capture_metadata = Some(metadata);
        self
    }
}

/// The backend's summary of a successful clock-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockInSummary {
    /// The recorded clock-in time.
    #[serde(alias = "clockIn")]
    pub clock_in_time: DateTime<Utc>,
    /// Whether the backend marked the clock-in late.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_late: bool,
    /// Minutes late according to the backend.
    #[serde(default, deserialize_with = "lenient_minutes_or_zero")]
    pub late_minutes: i64,
}

/// The backend's summary of a successful clock-out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockOutSummary {
    /// The recorded clock-out time.
    #[serde(default, alias = "clockOut")]
    pub clock_out_time: Option<DateTime<Utc>>,
    /// Minutes worked over the day.
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub total_worked_minutes: Option<i64>,
    /// Overtime worked.
    #[serde(default, deserialize_with = "lenient")]
    pub overtime_hours: Option<Decimal>,
    /// Whether the employee left before shift end.
    #[serde(default, deserialize_with = "lenient")]
    pub is_early_departure: Option<bool>,
    /// Minutes left early.
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub early_exit_minutes: Option<i64>,
}
