//! Pure derivations over today's attendance record.
//!
//! This module contains the status view (clocked in, on break, running
//! session), the per-day state machine, shift window resolution with
//! clock-in lateness, shift progress with overtime, and advisory
//! notifications. None of these functions perform I/O; each takes the
//! evaluation time explicitly.

mod notifications;
mod progress;
mod shift_window;
mod state;
mod status;

pub use notifications::{Notification, NotificationKind, Severity, generate_notifications};
pub use progress::{ShiftProgress, calculate_shift_progress};
pub use shift_window::{
    Lateness, MAX_GRACE_MINUTES, ShiftWindow, evaluate_clock_in_lateness, shift_window,
};
pub use state::{AttendanceAction, DayState};
pub use status::{ActiveSession, AttendanceStatus, SessionBreak, SessionStatus, derive_status};
