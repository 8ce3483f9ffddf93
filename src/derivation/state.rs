//! The per-day attendance state machine.
//!
//! ```text
//! NotClockedIn -> Active <-> OnBreak
//!                 Active  -> ClockedOut
//! ```
//!
//! Transitions follow server responses only; the client never moves state
//! optimistically.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::AttendanceRecord;

/// A mutating action the employee can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceAction {
    /// Open the day's working session.
    ClockIn,
    /// Close the day's working session.
    ClockOut,
    /// Start a break.
    StartBreak,
    /// End the running break.
    EndBreak,
}

impl fmt::Display for AttendanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AttendanceAction::ClockIn => "clock-in",
            AttendanceAction::ClockOut => "clock-out",
            AttendanceAction::StartBreak => "break-in",
            AttendanceAction::EndBreak => "break-out",
        };
        f.write_str(label)
    }
}

/// Where the employee is in the day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayState {
    /// No clock-in yet today.
    #[default]
    NotClockedIn,
    /// Clocked in and working.
    Active,
    /// Clocked in with a break running.
    OnBreak,
    /// Clocked out; terminal for the day.
    ClockedOut,
}

impl DayState {
    /// Derives the state from today's record.
    pub fn from_record(record: Option<&AttendanceRecord>) -> Self {
        match record {
            None => DayState::NotClockedIn,
            Some(r) if r.has_clocked_out() => DayState::ClockedOut,
            Some(r) if r.clock_in.is_none() => DayState::NotClockedIn,
            Some(r) if r.is_on_break() => DayState::OnBreak,
            Some(_) => DayState::Active,
        }
    }

    /// The actions a UI should offer in this state.
    pub fn available_actions(&self) -> &'static [AttendanceAction] {
        match self {
            DayState::NotClockedIn => &[AttendanceAction::ClockIn],
            DayState::Active => &[AttendanceAction::StartBreak, AttendanceAction::ClockOut],
            DayState::OnBreak => &[AttendanceAction::EndBreak],
            DayState::ClockedOut => &[],
        }
    }

    /// The state a successful `action` leads to, if the action is valid here.
    pub fn after(&self, action: AttendanceAction) -> Option<DayState> {
        match (self, action) {
            (DayState::NotClockedIn, AttendanceAction::ClockIn) => Some(DayState::Active),
            (DayState::Active, AttendanceAction::StartBreak) => Some(DayState::OnBreak),
            (DayState::Active, AttendanceAction::ClockOut) => Some(DayState::ClockedOut),
            (DayState::OnBreak, AttendanceAction::EndBreak) => Some(DayState::Active),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BreakSession, WorkMode};
    use chrono::{DateTime, Utc};

    fn ts(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn record(clock_in: Option<&str>, clock_out: Option<&str>, open_break: bool) -> AttendanceRecord {
        let break_sessions = if open_break {
            vec![BreakSession {
                break_in: ts("2026-01-15T12:00:00Z"),
                break_out: None,
                duration: None,
            }]
        } else {
            vec![]
        };
        AttendanceRecord {
            id: 1,
            employee_id: None,
            date: None,
            clock_in: clock_in.map(ts),
            clock_out: clock_out.map(ts),
            break_sessions,
            shift: None,
            is_late: false,
            late_minutes: None,
            is_early_departure: false,
            early_exit_minutes: None,
            overtime_hours: None,
            total_worked_minutes: None,
            total_break_minutes: None,
            work_mode: WorkMode::Office,
            location_details: None,
        }
    }

    #[test]
    fn test_state_from_record() {
        assert_eq!(DayState::from_record(None), DayState::NotClockedIn);

        let active = record(Some("2026-01-15T09:00:00Z"), None, false);
        assert_eq!(DayState::from_record(Some(&active)), DayState::Active);

        let on_break = record(Some("2026-01-15T09:00:00Z"), None, true);
        assert_eq!(DayState::from_record(Some(&on_break)), DayState::OnBreak);

        let done = record(
            Some("2026-01-15T09:00:00Z"),
            Some("2026-01-15T17:00:00Z"),
            true,
        );
        assert_eq!(DayState::from_record(Some(&done)), DayState::ClockedOut);

        let placeholder = record(None, None, false);
        assert_eq!(
            DayState::from_record(Some(&placeholder)),
            DayState::NotClockedIn
        );
    }

    #[test]
    fn test_full_day_walk() {
        let state = DayState::NotClockedIn;
        let state = state.after(AttendanceAction::ClockIn).unwrap();
        let state = state.after(AttendanceAction::StartBreak).unwrap();
        assert_eq!(state, DayState::OnBreak);
        let state = state.after(AttendanceAction::EndBreak).unwrap();
        let state = state.after(AttendanceAction::ClockOut).unwrap();
        assert_eq!(state, DayState::ClockedOut);
        assert!(state.available_actions().is_empty());
    }

    #[test]
    fn test_invalid_transitions_are_rejected() {
        assert_eq!(DayState::OnBreak.after(AttendanceAction::ClockOut), None);
        assert_eq!(DayState::ClockedOut.after(AttendanceAction::ClockIn), None);
        assert_eq!(DayState::NotClockedIn.after(AttendanceAction::StartBreak), None);
    }

    #[test]
    fn test_available_actions_match_transitions() {
        for state in [
            DayState::NotClockedIn,
            DayState::Active,
            DayState::OnBreak,
            DayState::ClockedOut,
        ] {
            for action in state.available_actions() {
                assert!(state.after(*action).is_some(), "{:?} -> {:?}", state, action);
            }
        }
    }

    #[test]
    fn test_action_display_matches_endpoint_names() {
        assert_eq!(AttendanceAction::StartBreak.to_string(), "break-in");
        assert_eq!(AttendanceAction::ClockIn.to_string(), "clock-in");
    }
}
