//! REST client for the attendance backend.
//!
//! This module wraps the five attendance endpoints, decodes the shared
//! `{success, data, message}` envelope and maps failures onto
//! [`AttendanceError`](crate::error::AttendanceError).

mod client;
mod envelope;

pub use client::{
    AttendanceApi, BREAK_IN_PATH, BREAK_OUT_PATH, CLOCK_IN_PATH, CLOCK_OUT_PATH, TODAY_PATH,
};
pub use envelope::{ApiEnvelope, ApiReply};
