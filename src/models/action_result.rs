//! The uniform result shape of store actions.

use serde::{Deserialize, Serialize};

use crate::error::{AttendanceError, ErrorCode};

/// Outcome of a mutating store action.
///
/// Actions never return `Err` or panic; success and failure share this
/// shape so calling UI code can pick a toast from `success` and `code`.
///
/// # Example
///
/// ```
/// use attendance_client::error::{AttendanceError, ErrorCode};
/// use attendance_client::models::ActionResult;
///
/// let result: ActionResult<()> = ActionResult::failed(&AttendanceError::AlreadyClockedIn {
///     message: "You have already clocked in today".to_string(),
/// });
/// assert!(!result.success);
/// assert_eq!(result.error.as_deref(), Some("already clocked in"));
/// assert_eq!(result.code, Some(ErrorCode::AlreadyClockedIn));
/// assert!(result.is_informational());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult<T> {
    /// Whether the backend accepted the action.
    pub success: bool,
    /// The backend's payload for a successful action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Short error description for a failed action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Programmatic code of a failed action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    /// Message suitable for display.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ActionResult<T> {
    /// A successful result carrying the backend payload.
    pub fn ok(data: Option<T>, message: Option<String>) -> Self {
        Self {
            success: true,
            data,
            error: None,
            code: None,
            message,
        }
    }

    /// A failed result describing `error`.
    pub fn failed(error: &AttendanceError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.to_string()),
            code: Some(error.code()),
            message: Some(error.user_message()),
        }
    }

    /// Whether the action succeeded.
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Whether a failure should be shown as information rather than an error.
    pub fn is_informational(&self) -> bool {
        self.code == Some(ErrorCode::AlreadyClockedIn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_result_serialization_skips_error_fields() {
        let result = ActionResult::ok(Some(5), Some("Break started".to_string()));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "data": 5, "message": "Break started"})
        );
    }

    #[test]
    fn test_failed_result_carries_code_and_message() {
        let result: ActionResult<()> = ActionResult::failed(&AttendanceError::Rejected {
            status: 400,
            message: "No active break found".to_string(),
        });

        assert!(!result.is_success());
        assert!(!result.is_informational());
        assert_eq!(result.code, Some(ErrorCode::ValidationError));
        assert_eq!(result.error.as_deref(), Some("No active break found"));
        assert_eq!(result.message.as_deref(), Some("No active break found"));
    }
}
