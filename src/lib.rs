//! Attendance client for an HR workforce backend.
//!
//! This crate keeps today's attendance record for the signed-in employee,
//! runs the clock-in, clock-out and break actions against the backend's REST
//! API, and derives the status a UI renders: clocked in or on a break, the
//! running session, shift progress, lateness, overtime and advisory
//! notifications.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod derivation;
pub mod error;
pub mod http;
pub mod models;
pub mod store;
