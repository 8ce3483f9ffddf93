//! Core data models for the attendance client.
//!
//! This module contains the wire types exchanged with the attendance backend
//! and the uniform result shape of store actions.

mod action_result;
mod clock;
mod record;

pub use action_result::ActionResult;
pub use clock::{
    CaptureMetadata, ClockInRequest, ClockInSummary, ClockOutSummary, DeviceInfo, GeoLocation,
};
pub use record::{AttendanceRecord, BreakSession, ShiftDefinition, WorkMode, parse_clock_time};
