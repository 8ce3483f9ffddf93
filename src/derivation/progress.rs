//! Shift progress calculation.
//!
//! This module computes how far through the scheduled shift the current time
//! is and whether a still-open session has run into overtime.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::AttendanceRecord;

use super::shift_window::{ShiftWindow, shift_window};

/// Progress through the day's shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftProgress {
    /// The resolved shift window.
    pub window: ShiftWindow,
    /// Elapsed share of the shift, clamped to `[0, 100]`.
    pub percentage: f64,
    /// Minutes since shift start (zero before the start).
    pub elapsed_minutes: i64,
    /// Scheduled shift length in minutes.
    pub total_minutes: i64,
    /// Minutes until shift end (zero after the end).
    pub remaining_minutes: i64,
    /// Still clocked in after shift end.
    pub is_overtime: bool,
    /// Minutes past shift end while still clocked in.
    pub overtime_minutes: i64,
    /// `overtime_minutes` expressed in hours, rounded to two places.
    pub overtime_hours: Decimal,
}

/// Calculates shift progress for `record` at `now`.
///
/// Returns `None` when the record carries no usable shift, or when the
/// shift has no length.
///
/// # Examples
///
/// ```
/// use attendance_client::derivation::calculate_shift_progress;
/// use attendance_client::models::AttendanceRecord;
/// use chrono::{DateTime, Utc};
///
/// let record: AttendanceRecord = serde_json::from_value(serde_json::json!({
///     "id": 1,
///     "date": "2026-01-15",
///     "clockIn": "2026-01-15T09:00:00Z",
///     "shift": {"shiftStartTime": "09:00", "shiftEndTime": "17:00", "gracePeriodMinutes": 10}
/// }))
/// .unwrap();
/// let now = DateTime::parse_from_rfc3339("2026-01-15T13:00:00Z").unwrap().with_timezone(&Utc);
///
/// let progress = calculate_shift_progress(&record, chrono_tz::UTC, now).unwrap();
/// assert_eq!(progress.percentage, 50.0);
/// assert!(!progress.is_overtime);
/// ```
pub fn calculate_shift_progress(
    record: &AttendanceRecord,
    tz: Tz,
    now: DateTime<Utc>,
) -> Option<ShiftProgress> {
    let window = shift_window(record, tz, now)?;
    let total_minutes = window.total_minutes();
    if total_minutes <= 0 {
        return None;
    }

    let elapsed_minutes = (now - window.start).num_minutes().clamp(0, total_minutes);
    let remaining_minutes = (window.end - now).num_minutes().max(0);
    let percentage = (elapsed_minutes as f64 / total_minutes as f64 * 100.0).clamp(0.0, 100.0);

    let is_overtime = record.is_active() && now > window.end;
    let overtime_minutes = if is_overtime {
        (now - window.end).num_minutes()
    } else {
        0
    };
    let overtime_hours = (Decimal::from(overtime_minutes) / Decimal::from(60)).round_dp(2);

    Some(ShiftProgress {
        window,
        percentage,
        elapsed_minutes,
        total_minutes,
        remaining_minutes,
        is_overtime,
        overtime_minutes,
        overtime_hours,
    })
}
