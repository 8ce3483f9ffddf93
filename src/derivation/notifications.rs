//! Advisory notifications derived from the record and the wall clock.
//!
//! Notifications are informational only. They are re-evaluated on every UI
//! tick and never change the record or block an action.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::config::NotificationConfig;
use crate::models::AttendanceRecord;

use super::shift_window::{ShiftWindow, evaluate_clock_in_lateness, shift_window};

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The shift starts soon and the employee has not clocked in.
    PreShiftReminder,
    /// The employee clocked in (or is still not in) past the grace period.
    LateWarning,
    /// The shift ends soon.
    ShiftEndingSoon,
    /// The employee is still clocked in after shift end.
    Overtime,
    /// The running break is longer than allowed.
    LongBreak,
}

/// How prominently a notification should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Plain reminder.
    Info,
    /// Needs attention.
    Warning,
    /// Exceeds a configured limit.
    Critical,
}

/// A single advisory notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// What the notification is about.
    pub kind: NotificationKind,
    /// How prominently to show it.
    pub severity: Severity,
    /// Text for display.
    pub message: String,
    /// The minute count the message refers to.
    pub minutes: i64,
}

impl Notification {
    fn new(kind: NotificationKind, severity: Severity, minutes: i64, message: String) -> Self {
        Self {
            kind,
            severity,
            message,
            minutes,
        }
    }
}

/// Rounds a positive remaining span up to whole minutes.
fn minutes_until(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let seconds = (to - from).num_seconds();
    (seconds + 59).div_euclid(60)
}

/// Generates the notifications that apply to `record` at `now`.
///
/// Shift-based notifications need a resolvable shift window; the long-break
/// warning only needs an open break.
pub fn generate_notifications(
    record: &AttendanceRecord,
    tz: Tz,
    now: DateTime<Utc>,
    thresholds: &NotificationConfig,
) -> Vec<Notification> {
    let mut notifications = Vec::new();

    if let Some(window) = shift_window(record, tz, now) {
        if record.clock_in.is_none() {
            not_clocked_in_notifications(&window, now, thresholds, &mut notifications);
        } else if record.is_active() {
            clocked_in_notifications(record, &window, now, thresholds, &mut notifications);
        }
    }

    if record.is_active() {
        if let Some(open) = record.open_break() {
            let running = (now - open.break_in).num_minutes();
            if running > thresholds.long_break_minutes {
                notifications.push(Notification::new(
                    NotificationKind::LongBreak,
                    Severity::Warning,
                    running,
                    format!("Your break has been running for {} minutes", running),
                ));
            }
        }
    }

    notifications
}

fn not_clocked_in_notifications(
    window: &ShiftWindow,
    now: DateTime<Utc>,
    thresholds: &NotificationConfig,
    out: &mut Vec<Notification>,
) {
    if now < window.start {
        let until_start = minutes_until(now, window.start);
        if until_start <= thresholds.pre_shift_reminder_minutes {
            out.push(Notification::new(
                NotificationKind::PreShiftReminder,
                Severity::Info,
                until_start,
                format!("Your shift starts in {} minutes", until_start),
            ));
        }
        return;
    }

    if now > window.grace_deadline() && now < window.end {
        let late_by = (now - window.start).num_minutes();
        out.push(Notification::new(
            NotificationKind::LateWarning,
            late_severity(window, late_by),
            late_by,
            format!("You are {} minutes late for your shift", late_by),
        ));
    }
}

fn clocked_in_notifications(
    record: &AttendanceRecord,
    window: &ShiftWindow,
    now: DateTime<Utc>,
    thresholds: &NotificationConfig,
    out: &mut Vec<Notification>,
) {
    if let Some(clock_in) = record.clock_in {
        let lateness = evaluate_clock_in_lateness(window, clock_in);
        if lateness.is_late {
            out.push(Notification::new(
                NotificationKind::LateWarning,
                if lateness.is_severe {
                    Severity::Critical
                } else {
                    Severity::Warning
                },
                lateness.late_minutes,
                format!("You clocked in {} minutes late", lateness.late_minutes),
            ));
        }
    }

    if now < window.end {
        let until_end = minutes_until(now, window.end);
        if until_end <= thresholds.end_of_shift_reminder_minutes {
            out.push(Notification::new(
                NotificationKind::ShiftEndingSoon,
                Severity::Info,
                until_end,
                format!("Your shift ends in {} minutes", until_end),
            ));
        }
    } else if now > window.end {
        let past_end = (now - window.end).num_minutes();
        out.push(Notification::new(
            NotificationKind::Overtime,
            Severity::Warning,
            past_end,
            format!("You are working {} minutes past your shift end", past_end),
        ));
    }
}

fn late_severity(window: &ShiftWindow, late_by: i64) -> Severity {
    match window.late_threshold_minutes {
        Some(threshold) if late_by > threshold => Severity::Critical,
        _ => Severity::Warning,
    }
}
