//! Status derivation from today's record.
//!
//! This module turns the raw record into the view a UI renders: whether the
//! employee is clocked in or on a break and a summary of the running session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AttendanceRecord, WorkMode};

use super::state::DayState;

/// Status tag of a running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Working.
    Active,
    /// A break is running.
    OnBreak,
}

/// A break in the uniform `{startTime, endTime, duration}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionBreak {
    /// Break start.
    pub start_time: DateTime<Utc>,
    /// Break end; `None` while running.
    pub end_time: Option<DateTime<Utc>>,
    /// Length in minutes (running breaks measured up to the evaluation time).
    pub duration: i64,
}

/// Summary of the running working session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    /// When the session started.
    pub clock_in: DateTime<Utc>,
    /// Declared work mode.
    pub work_mode: WorkMode,
    /// Free-text location details.
    pub location_details: Option<String>,
    /// The session's breaks in order.
    pub breaks: Vec<SessionBreak>,
    /// Sum of break lengths.
    pub total_break_minutes: i64,
    /// Minutes worked so far, excluding breaks.
    pub worked_minutes: i64,
    /// Whether the session is working or on a break.
    pub status: SessionStatus,
}

/// The derived status of today's attendance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStatus {
    /// Clocked in and not yet clocked out.
    pub is_clocked_in: bool,
    /// A break entry is open.
    pub is_on_break: bool,
    /// The running session, while clocked in.
    pub active_session: Option<ActiveSession>,
    /// The day's session has been closed.
    pub has_completed_sessions: bool,
    /// Position in the day's state machine.
    pub state: DayState,
}

/// Derives the status view from today's record as of `now`.
///
/// This is a pure function: the same record and `now` always produce the
/// same status, and it never fails. Without a record the default "not
/// clocked in" status is returned.
///
/// # Examples
///
/// ```
/// use attendance_client::derivation::derive_status;
/// use chrono::Utc;
///
/// let status = derive_status(None, Utc::now());
/// assert!(!status.is_clocked_in);
/// assert!(!status.is_on_break);
/// assert!(status.active_session.is_none());
/// assert!(!status.has_completed_sessions);
/// ```
pub fn derive_status(record: Option<&AttendanceRecord>, now: DateTime<Utc>) -> AttendanceStatus {
    let Some(record) = record else {
        return AttendanceStatus::default();
    };

    let is_clocked_in = record.is_active();
    let is_on_break = record.is_on_break();

    let active_session = match record.clock_in {
        Some(clock_in) if is_clocked_in => Some(build_session(record, clock_in, is_on_break, now)),
        _ => None,
    };

    AttendanceStatus {
        is_clocked_in,
        is_on_break,
        active_session,
        has_completed_sessions: record.has_clocked_out(),
        state: DayState::from_record(Some(record)),
    }
}

fn build_session(
    record: &AttendanceRecord,
    clock_in: DateTime<Utc>,
    is_on_break: bool,
    now: DateTime<Utc>,
) -> ActiveSession {
    let breaks: Vec<SessionBreak> = record
        .break_sessions
        .iter()
        .map(|b| SessionBreak {
            start_time: b.break_in,
            end_time: b.break_out,
            duration: b.duration_minutes(now),
        })
        .collect();
    let total_break_minutes = breaks.iter().map(|b| b.duration).fold(0, i64::saturating_add);

    ActiveSession {
        clock_in,
        work_mode: record.work_mode,
        location_details: record.location_details.clone(),
        breaks,
        total_break_minutes,
        worked_minutes: record.worked_minutes_at(now),
        status: if is_on_break {
            SessionStatus::OnBreak
        } else {
            SessionStatus::Active
        },
    }
}
