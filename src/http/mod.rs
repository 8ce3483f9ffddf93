//! Shared HTTP transport.
//!
//! Retries and backoff live here and nowhere else; callers above this layer
//! see either a response or a final error.

mod client;

pub use client::{HttpClient, HttpClientBuilder, REQUEST_ID_HEADER};
