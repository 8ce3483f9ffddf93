//! Configuration loading and management for the attendance client.
//!
//! This module loads the client configuration (backend location, retry
//! policy, break refresh policy, notification thresholds and the employee's
//! time zone) from a YAML file.
//!
//! # Example
//!
//! ```no_run
//! use attendance_client::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/client.yaml").unwrap();
//! println!("Shift times interpreted in {}", config.config().timezone);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{ApiConfig, ClientConfig, NotificationConfig, RefreshConfig, RetryConfig};
