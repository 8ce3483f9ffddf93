//! Error types for the attendance client.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the client can surface: transport problems, server
//! rejections, the "already clocked in" special case and configuration issues.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stable, programmatic error codes surfaced to callers.
///
/// These mirror the taxonomy a UI uses to choose between an error toast,
/// an informational toast or a silent resync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No response was received from the backend.
    NetworkError,
    /// The backend answered with a 5xx status.
    ServerError,
    /// The backend rejected the request (4xx or `success: false`).
    ValidationError,
    /// Clock-in was rejected because the employee is already clocked in.
    AlreadyClockedIn,
    /// The backend rejected the credentials.
    Unauthorized,
    /// The backend answered with a body that could not be decoded.
    InvalidResponse,
    /// The same action is already running.
    ActionInProgress,
    /// The client configuration could not be loaded.
    ConfigError,
}

impl ErrorCode {
    /// Returns the wire representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::ServerError => "SERVER_ERROR",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::AlreadyClockedIn => "ALREADY_CLOCKED_IN",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::InvalidResponse => "INVALID_RESPONSE",
            ErrorCode::ActionInProgress => "ACTION_IN_PROGRESS",
            ErrorCode::ConfigError => "CONFIG_ERROR",
        }
    }
}

/// The main error type for the attendance client.
///
/// # Example
///
/// ```
/// use attendance_client::error::{AttendanceError, ErrorCode};
///
/// let error = AttendanceError::Rejected {
///     status: 422,
///     message: "Work mode is required".to_string(),
/// };
/// assert_eq!(error.to_string(), "Work mode is required");
/// assert_eq!(error.code(), ErrorCode::ValidationError);
/// ```
#[derive(Debug, Error)]
pub enum AttendanceError {
    /// The request never produced a response (connect failure, timeout).
    #[error("Network error: {message}")]
    Network {
        /// A description of the transport failure.
        message: String,
    },

    /// The backend failed with a 5xx status after all retries.
    #[error("{message}")]
    Server {
        /// The HTTP status code.
        status: u16,
        /// The server's message or a generic fallback.
        message: String,
    },

    /// The backend rejected the request as invalid or against a business rule.
    #[error("{message}")]
    Rejected {
        /// The HTTP status code (200 when the envelope reported `success: false`).
        status: u16,
        /// The server's message or a generic fallback.
        message: String,
    },

    /// Clock-in was refused because a session is already open.
    #[error("already clocked in")]
    AlreadyClockedIn {
        /// The server's message.
        message: String,
    },

    /// The backend rejected the credentials.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// The server's message or a generic fallback.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Invalid response from {endpoint}: {message}")]
    InvalidResponse {
        /// The endpoint that produced the body.
        endpoint: String,
        /// A description of the decode failure.
        message: String,
    },

    /// The same action is already running and this call was dropped.
    #[error("{action} is already in progress")]
    ActionInProgress {
        /// The action name.
        action: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl AttendanceError {
    /// Returns the programmatic code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            AttendanceError::Network { .. } => ErrorCode::NetworkError,
            AttendanceError::Server { .. } => ErrorCode::ServerError,
            AttendanceError::Rejected { .. } => ErrorCode::ValidationError,
            AttendanceError::AlreadyClockedIn { .. } => ErrorCode::AlreadyClockedIn,
            AttendanceError::Unauthorized { .. } => ErrorCode::Unauthorized,
            AttendanceError::InvalidResponse { .. } => ErrorCode::InvalidResponse,
            AttendanceError::ActionInProgress { .. } => ErrorCode::ActionInProgress,
            AttendanceError::ConfigNotFound { .. } | AttendanceError::ConfigParseError { .. } => {
                ErrorCode::ConfigError
            }
        }
    }

    /// Returns the message a user should see for this error.
    ///
    /// For server-originated errors this is the server's own message.
    pub fn user_message(&self) -> String {
        match self {
            AttendanceError::AlreadyClockedIn { message } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Whether the transport layer may retry the failed request.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AttendanceError::Network { .. } | AttendanceError::Server { .. }
        )
    }
}

/// A type alias for Results that return AttendanceError.
pub type AttendanceResult<T> = Result<T, AttendanceError>;
