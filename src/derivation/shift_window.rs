//! Shift window resolution and clock-in lateness.
//!
//! Shift definitions carry wall-clock `HH:MM` times. This module anchors them
//! on a calendar day in the employee's time zone and evaluates a clock-in
//! against the grace period.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::models::AttendanceRecord;

/// Upper bound on a usable grace period; larger values are clamped.
pub const MAX_GRACE_MINUTES: i64 = 24 * 60;

/// A shift anchored on a concrete day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftWindow {
    /// Expected start.
    pub start: DateTime<Utc>,
    /// Expected end; after `start`, on the next day for overnight shifts.
    pub end: DateTime<Utc>,
    /// Minutes after start during which a clock-in is not late.
    pub grace_period_minutes: i64,
    /// Minutes of lateness beyond which lateness is severe.
    pub late_threshold_minutes: Option<i64>,
}

impl ShiftWindow {
    /// Length of the shift in minutes.
    pub fn total_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// The last instant a clock-in is still on time.
    ///
    /// The grace period is clamped to `0..=MAX_GRACE_MINUTES`.
    pub fn grace_deadline(&self) -> DateTime<Utc> {
        let grace = self.grace_period_minutes.clamp(0, MAX_GRACE_MINUTES);
        self.start
            .checked_add_signed(Duration::minutes(grace))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Client-side evaluation of a clock-in against the shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lateness {
    /// Clock-in happened after the grace deadline.
    pub is_late: bool,
    /// Minutes after shift start, when late; zero otherwise.
    pub late_minutes: i64,
    /// Lateness exceeds the late threshold.
    pub is_severe: bool,
}

/// Resolves the shift window of `record`.
///
/// The anchor day is the record's date, else the clock-in's local date,
/// else `now`'s local date, all in `tz`. An end at or before the start rolls
/// over to the next day. Returns `None` when the record has no shift or its
/// times are malformed.
pub fn shift_window(record: &AttendanceRecord, tz: Tz, now: DateTime<Utc>) -> Option<ShiftWindow> {
    let shift = record.shift.as_ref()?;
    let start_time = shift.start_time()?;
    let end_time = shift.end_time()?;

    let anchor = record
        .date
        .or_else(|| record.clock_in.map(|t| t.with_timezone(&tz).date_naive()))
        .unwrap_or_else(|| now.with_timezone(&tz).date_naive());

    let start = local_to_utc(tz, anchor, start_time)?;
    let end_date = if end_time <= start_time {
        anchor.succ_opt()?
    } else {
        anchor
    };
    let end = local_to_utc(tz, end_date, end_time)?;

    Some(ShiftWindow {
        start,
        end,
        grace_period_minutes: shift.grace_period_minutes.clamp(0, MAX_GRACE_MINUTES),
        late_threshold_minutes: shift.late_threshold_minutes,
    })
}

fn local_to_utc(tz: Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|t| t.with_timezone(&Utc))
}

/// Evaluates `clock_in` against the window's grace period.
///
/// # Examples
///
/// ```
/// use attendance_client::derivation::{ShiftWindow, evaluate_clock_in_lateness};
/// use chrono::{DateTime, Utc};
///
/// let at = |s: &str| DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc);
/// let window = ShiftWindow {
///     start: at("2026-01-15T09:00:00Z"),
///     end: at("2026-01-15T17:00:00Z"),
///     grace_period_minutes: 10,
///     late_threshold_minutes: Some(30),
/// };
///
/// assert!(!evaluate_clock_in_lateness(&window, at("2026-01-15T09:05:00Z")).is_late);
///
/// let late = evaluate_clock_in_lateness(&window, at("2026-01-15T09:15:00Z"));
/// assert!(late.is_late);
/// assert_eq!(late.late_minutes, 15);
/// assert!(!late.is_severe);
/// ```
pub fn evaluate_clock_in_lateness(window: &ShiftWindow, clock_in: DateTime<Utc>) -> Lateness {
    if clock_in <= window.grace_deadline() {
        return Lateness {
            is_late: false,
            late_minutes: 0,
            is_severe: false,
        };
    }

    let late_minutes = (clock_in - window.start).num_minutes();
    Lateness {
        is_late: true,
        late_minutes,
        is_severe: window
            .late_threshold_minutes
            .is_some_and(|threshold| late_minutes > threshold),
    }
}
