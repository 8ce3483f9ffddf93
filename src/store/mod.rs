//! Today's attendance state for the signed-in employee.
//!
//! [`AttendanceStore`] caches today's record, runs the clock and break
//! actions against the backend and exposes the derived status.
//! [`StatusTicker`] re-evaluates that status on a fixed interval.

mod attendance_store;
mod in_flight;
mod ticker;

pub use attendance_store::{AttendanceStore, StoreSnapshot};
pub use ticker::{StatusTick, StatusTicker};
