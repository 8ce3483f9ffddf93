//! Periodic re-evaluation of derived status for UI ticks.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::derivation::{AttendanceStatus, Notification, ShiftProgress};

use super::attendance_store::AttendanceStore;

/// Everything a UI renders on one tick, evaluated from one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusTick {
    /// The time the tick was evaluated at.
    pub evaluated_at: DateTime<Utc>,
    /// Derived attendance status.
    pub status: AttendanceStatus,
    /// Shift progress, when a shift is known.
    pub progress: Option<ShiftProgress>,
    /// Advisory notifications.
    pub notifications: Vec<Notification>,
}

impl StatusTick {
    fn empty(now: DateTime<Utc>) -> Self {
        Self {
            evaluated_at: now,
            status: AttendanceStatus::default(),
            progress: None,
            notifications: Vec::new(),
        }
    }
}

/// Background task that re-evaluates the store on a fixed interval.
///
/// Ticks are published on a `watch` channel, so slow readers only ever see
/// the latest tick. The task stops when the ticker is dropped.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use attendance_client::config::ClientConfig;
/// use attendance_client::store::{AttendanceStore, StatusTicker};
///
/// # async fn run() -> attendance_client::error::AttendanceResult<()> {
/// let store = Arc::new(AttendanceStore::from_config(ClientConfig::default())?);
/// let ticker = StatusTicker::spawn(store.clone());
///
/// let mut ticks = ticker.subscribe();
/// while ticks.changed().await.is_ok() {
///     let tick = ticks.borrow().clone();
///     println!("on break: {}", tick.status.is_on_break);
/// }
/// # Ok(())
/// # }
/// ```
pub struct StatusTicker {
    receiver: watch::Receiver<StatusTick>,
    handle: JoinHandle<()>,
}

impl StatusTicker {
    /// Starts ticking at the store's configured interval.
    pub fn spawn(store: Arc<AttendanceStore>) -> Self {
        let period = store.config().tick_interval();
        Self::spawn_with_interval(store, period)
    }

    /// Starts ticking every `period`; the first tick is immediate.
    pub fn spawn_with_interval(store: Arc<AttendanceStore>, period: Duration) -> Self {
        let (sender, receiver) = watch::channel(StatusTick::empty(Utc::now()));

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                let tick = store.tick_at(Utc::now()).await;
                debug!(
                    notifications = tick.notifications.len(),
                    state = ?tick.status.state,
                    "status tick"
                );
                if sender.send(tick).is_err() {
                    break;
                }
            }
        });

        Self { receiver, handle }
    }

    /// A receiver that is notified on every tick.
    pub fn subscribe(&self) -> watch::Receiver<StatusTick> {
        self.receiver.clone()
    }

    /// The most recent tick.
    pub fn latest(&self) -> StatusTick {
        self.receiver.borrow().clone()
    }

    /// Stops the background task.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for StatusTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
