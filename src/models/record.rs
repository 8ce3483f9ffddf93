//! Attendance record model and related types.
//!
//! This module defines the server-provided day record, its break sessions
//! and the shift definition attached to it. The client never constructs
//! these records itself; it only reads what the backend returns.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Treats an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes a value that does not have the expected shape as `None`.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decodes a minute count sent as an integer, a float or a numeric string.
///
/// Fractions are rounded; anything else decodes as `None`.
pub(crate) fn lenient_minutes<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(minutes_from_value(&value))
}

/// Like [`lenient`], falling back to the type's default.
pub(crate) fn lenient_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

pub(crate) fn lenient_minutes_or_zero<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_minutes(deserializer)?.unwrap_or_default())
}

fn minutes_from_value(value: &Value) -> Option<i64> {
    if let Some(minutes) = value.as_i64() {
        return Some(minutes);
    }
    let float = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    // `as` saturates out-of-range floats.
    float.is_finite().then(|| float.round() as i64)
}

/// The employee's declared working context for the day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkMode {
    /// Working from the office.
    #[default]
    Office,
    /// Working from home.
    Wfh,
    /// Split between office and home.
    Hybrid,
    /// Working on site away from the office.
    Field,
}

impl fmt::Display for WorkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkMode::Office => "office",
            WorkMode::Wfh => "wfh",
            WorkMode::Hybrid => "hybrid",
            WorkMode::Field => "field",
        };
        f.write_str(label)
    }
}

/// A bounded interval within a working session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakSession {
    /// When the break started.
    pub break_in: DateTime<Utc>,
    /// When the break ended; `None` while the break is running.
    #[serde(default)]
    pub break_out: Option<DateTime<Utc>>,
    /// Server-computed duration in minutes, set once the break is closed.
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub duration: Option<i64>,
}

impl BreakSession {
    /// Whether the break is still running.
    pub fn is_open(&self) -> bool {
        self.break_out.is_none()
    }

    /// Returns the break length in minutes as of `now`.
    ///
    /// Closed breaks prefer the server's duration; open breaks run until `now`.
    pub fn duration_minutes(&self, now: DateTime<Utc>) -> i64 {
        match (self.break_out, self.duration) {
            (Some(_), Some(duration)) => duration.max(0),
            (Some(end), None) => (end - self.break_in).num_minutes().max(0),
            (None, _) => (now - self.break_in).num_minutes().max(0),
        }
    }
}

/// The shift template attached to a day record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDefinition {
    /// Display name of the shift.
    #[serde(default)]
    pub shift_name: Option<String>,
    /// Expected start as `HH:MM` or `HH:MM:SS`; empty when unassigned.
    #[serde(default, deserialize_with = "null_as_default")]
    pub shift_start_time: String,
    /// Expected end as `HH:MM` or `HH:MM:SS`; empty when unassigned.
    #[serde(default, deserialize_with = "null_as_default")]
    pub shift_end_time: String,
    /// Minutes after start during which a clock-in is not late.
    #[serde(default, deserialize_with = "lenient_minutes_or_zero")]
    pub grace_period_minutes: i64,
    /// Minutes of lateness beyond which lateness is treated as severe.
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub late_threshold_minutes: Option<i64>,
}

impl ShiftDefinition {
    /// Parses the shift start time; `None` when malformed.
    pub fn start_time(&self) -> Option<NaiveTime> {
        parse_clock_time(&self.shift_start_time)
    }

    /// Parses the shift end time; `None` when malformed.
    pub fn end_time(&self) -> Option<NaiveTime> {
        parse_clock_time(&self.shift_end_time)
    }
}

/// Parses a wall-clock time written as `HH:MM` or `HH:MM:SS`.
pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

/// One employee's attendance for one calendar day.
///
/// Created by the backend on the first clock-in of the day and mutated only
/// through the clock and break endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    /// Backend identifier of the record.
    pub id: i64,
    /// The employee the record belongs to.
    #[serde(default)]
    pub employee_id: Option<i64>,
    /// The calendar day of the record.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// Clock-in timestamp.
    #[serde(default)]
    pub clock_in: Option<DateTime<Utc>>,
    /// Clock-out timestamp.
    #[serde(default)]
    pub clock_out: Option<DateTime<Utc>>,
    /// Breaks in chronological order; only the last may be open.
    #[serde(default, deserialize_with = "null_as_default")]
    pub break_sessions: Vec<BreakSession>,
    /// The shift the employee is scheduled on; `None` when absent or unreadable.
    #[serde(default, deserialize_with = "lenient")]
    pub shift: Option<ShiftDefinition>,
    /// Server-computed late flag.
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub is_late: bool,
    /// Server-computed minutes late.
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub late_minutes: Option<i64>,
    /// Server-computed early departure flag.
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub is_early_departure: bool,
    /// Server-computed minutes left early.
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub early_exit_minutes: Option<i64>,
    /// Server-computed overtime.
    #[serde(default, deserialize_with = "lenient")]
    pub overtime_hours: Option<Decimal>,
    /// Server-computed worked minutes.
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub total_worked_minutes: Option<i64>,
    /// Server-computed break minutes.
    #[serde(default, deserialize_with = "lenient_minutes")]
    pub total_break_minutes: Option<i64>,
    /// Declared work mode.
    #[serde(default, deserialize_with = "lenient_or_default")]
    pub work_mode: WorkMode,
    /// Free-text location entered at clock-in.
    #[serde(default)]
    pub location_details: Option<String>,
}

impl AttendanceRecord {
    /// Whether the employee is currently clocked in.
    pub fn is_active(&self) -> bool {
        self.clock_in.is_some() && self.clock_out.is_none()
    }

    /// Whether a break is currently running.
    pub fn is_on_break(&self) -> bool {
        self.break_sessions.iter().any(BreakSession::is_open)
    }

    /// Whether the day's session has been closed.
    pub fn has_clocked_out(&self) -> bool {
        self.clock_out.is_some()
    }

    /// Returns the running break, if any.
    pub fn open_break(&self) -> Option<&BreakSession> {
        self.break_sessions.iter().rev().find(|b| b.is_open())
    }

    /// Total break minutes as of `now`, counting a running break up to `now`.
    pub fn break_minutes_at(&self, now: DateTime<Utc>) -> i64 {
        self.break_sessions
            .iter()
            .map(|b| b.duration_minutes(now))
            .fold(0, i64::saturating_add)
    }

    /// Minutes worked between clock-in and `now` (or clock-out), excluding breaks.
    pub fn worked_minutes_at(&self, now: DateTime<Utc>) -> i64 {
        let Some(clock_in) = self.clock_in else {
            return 0;
        };
        let end = self.clock_out.unwrap_or(now);
        let gross = (end - clock_in).num_minutes().max(0);
        gross.saturating_sub(self.break_minutes_at(end)).max(0)
    }
}
