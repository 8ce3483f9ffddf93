//! Response envelope and failure classification for the attendance backend.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::error::AttendanceError;

fn default_success() -> bool {
    true
}

/// The `{success, data?, message?}` shape every backend response uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    /// Whether the backend accepted the request.
    #[serde(default = "default_success")]
    pub success: bool,
    /// The payload, when the endpoint returns one.
    #[serde(default)]
    pub data: Option<T>,
    /// Human-readable outcome.
    #[serde(default)]
    pub message: Option<String>,
}

/// Payload and message of a successful call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiReply<T> {
    /// The decoded payload, if the backend sent one this client understands.
    pub data: Option<T>,
    /// The backend's message.
    pub message: Option<String>,
}

/// Builds the error for a non-2xx response.
///
/// The server's `message` is passed through; without one a generic fallback
/// naming the status is used.
pub(crate) fn classify_failure(status: StatusCode, message: Option<String>) -> AttendanceError {
    let message =
        message.unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));

    match status.as_u16() {
        401 => AttendanceError::Unauthorized { message },
        500..=599 => AttendanceError::Server {
            status: status.as_u16(),
            message,
        },
        code => AttendanceError::Rejected {
            status: code,
            message,
        },
    }
}

/// Whether a backend message reports a duplicate clock-in.
pub(crate) fn is_already_clocked_in(message: &str) -> bool {
    message.to_lowercase().contains("already clocked in")
}

/// Turns a 400 "already clocked in" rejection into its dedicated error.
pub(crate) fn reclassify_clock_in_failure(error: AttendanceError) -> AttendanceError {
    match error {
        AttendanceError::Rejected {
            status: 400,
            message,
        } if is_already_clocked_in(&message) => AttendanceError::AlreadyClockedIn { message },
        other => other,
    }
}
