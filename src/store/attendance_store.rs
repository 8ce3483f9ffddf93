//! The today-record cache and the attendance actions.

use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::api::AttendanceApi;
use crate::config::ClientConfig;
use crate::derivation::{
    AttendanceAction, AttendanceStatus, Notification, ShiftProgress, calculate_shift_progress,
    derive_status, generate_notifications,
};
use crate::error::{AttendanceError, AttendanceResult};
use crate::models::{
    ActionResult, AttendanceRecord, ClockInRequest, ClockInSummary, ClockOutSummary,
};

use super::in_flight::InFlight;
use super::ticker::StatusTick;

/// A consistent copy of the store's state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreSnapshot {
    /// Today's record; `None` before the first clock-in or before the first fetch.
    pub today_record: Option<AttendanceRecord>,
    /// At least one foreground fetch is running.
    pub loading: bool,
    /// Message of the last failed fetch, cleared by the next successful one.
    pub error: Option<String>,
    /// When the record was last replaced from the backend.
    pub last_updated: Option<DateTime<Utc>>,
    /// At least one fetch has completed, successfully or not.
    pub initialized: bool,
}

impl StoreSnapshot {
    /// Derives the status view of this snapshot at `now`.
    pub fn attendance_status_at(&self, now: DateTime<Utc>) -> AttendanceStatus {
        derive_status(self.today_record.as_ref(), now)
    }
}

/// Cache of today's attendance record plus the actions that mutate it.
///
/// One store belongs to one signed-in employee: build it at login and call
/// [`reset`](Self::reset) (or drop it) at logout. The cache is written only by
/// the store's own fetches and actions; consumers read snapshots. Share it
/// between tasks through `Arc`.
///
/// Actions never fail with `Err`: every outcome is an [`ActionResult`].
/// State changes only after the backend has answered.
pub struct AttendanceStore {
    api: AttendanceApi,
    config: ClientConfig,
    state: RwLock<StoreSnapshot>,
    in_flight: InFlight,
    pending_loads: AtomicUsize,
}

/// Counts one foreground fetch for as long as it lives.
struct LoadingGuard<'a> {
    pending: &'a AtomicUsize,
}

impl<'a> LoadingGuard<'a> {
    fn new(pending: &'a AtomicUsize) -> Self {
        pending.fetch_add(1, Ordering::SeqCst);
        Self { pending }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.pending.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AttendanceStore {
    /// Creates an empty store over `api`.
    pub fn new(api: AttendanceApi, config: ClientConfig) -> Self {
        Self {
            api,
            config,
            state: RwLock::new(StoreSnapshot::default()),
            in_flight: InFlight::default(),
            pending_loads: AtomicUsize::new(0),
        }
    }

    /// Creates an empty store talking to the backend named in `config`.
    pub fn from_config(config: ClientConfig) -> AttendanceResult<Self> {
        let api = AttendanceApi::from_config(&config)?;
        Ok(Self::new(api, config))
    }

    /// The configuration the store was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns a copy of the current state.
    pub async fn snapshot(&self) -> StoreSnapshot {
        let mut snapshot = self.state.read().await.clone();
        snapshot.loading = self.is_loading();
        snapshot
    }

    /// Whether a foreground fetch is running.
    pub fn is_loading(&self) -> bool {
        self.pending_loads.load(Ordering::SeqCst) > 0
    }

    /// Returns a copy of today's record.
    pub async fn today_record(&self) -> Option<AttendanceRecord> {
        self.state.read().await.today_record.clone()
    }

    /// Whether `action` is currently running.
    pub fn is_in_flight(&self, action: AttendanceAction) -> bool {
        self.in_flight.contains(action)
    }

    /// The actions currently running.
    pub fn in_flight_actions(&self) -> Vec<AttendanceAction> {
        self.in_flight.snapshot()
    }

    /// Clears all cached state; used at logout.
    pub async fn reset(&self) {
        *self.state.write().await = StoreSnapshot::default();
        info!("attendance store reset");
    }

    /// Fetches today's record from the backend.
    ///
    /// A foreground fetch (`silent == false`) keeps the loading flag set
    /// until it resolves, even when other fetches overlap it or its future is
    /// dropped; `silent` fetches never touch the flag. On success the record
    /// replaces the cache and the error is cleared; on failure the previous
    /// record is kept and the error message stored.
    pub async fn fetch_today_record(
        &self,
        silent: bool,
    ) -> AttendanceResult<Option<AttendanceRecord>> {
        let _loading = (!silent).then(|| LoadingGuard::new(&self.pending_loads));

        let result = self.api.today().await;

        let mut state = self.state.write().await;
        state.initialized = true;

        match result {
            Ok(record) => {
                debug!(has_record = record.is_some(), silent, "fetched today's record");
                state.today_record = record.clone();
                state.error = None;
                state.last_updated = Some(Utc::now());
                Ok(record)
            }
            Err(err) => {
                warn!(error = %err, code = err.code().as_str(), "failed to fetch today's record");
                state.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Clocks in with the given work mode and capture data.
    ///
    /// On success the record is refreshed and the backend's clock-in summary
    /// returned. An "already clocked in" rejection forces a refresh and comes
    /// back as an informational failure.
    pub async fn clock_in(&self, request: &ClockInRequest) -> ActionResult<ClockInSummary> {
        let _guard = match self.in_flight.begin(AttendanceAction::ClockIn) {
            Ok(guard) => guard,
            Err(err) => return ActionResult::failed(&err),
        };

        match self.api.clock_in(request).await {
            Ok(reply) => {
                self.refresh_silently().await;
                if let Some(summary) = &reply.data {
                    info!(is_late = summary.is_late, late_minutes = summary.late_minutes, "clocked in");
                }
                ActionResult::ok(reply.data, reply.message)
            }
            Err(err @ AttendanceError::AlreadyClockedIn { .. }) => {
                info!("backend reports an open session, resynchronizing");
                self.refresh_silently().await;
                ActionResult::failed(&err)
            }
            Err(err) => {
                warn!(error = %err, "clock-in failed");
                ActionResult::failed(&err)
            }
        }
    }

    /// Clocks out and refreshes the record.
    pub async fn clock_out(&self) -> ActionResult<ClockOutSummary> {
        let _guard = match self.in_flight.begin(AttendanceAction::ClockOut) {
            Ok(guard) => guard,
            Err(err) => return ActionResult::failed(&err),
        };

        match self.api.clock_out().await {
            Ok(reply) => {
                self.refresh_silently().await;
                ActionResult::ok(reply.data, reply.message)
            }
            Err(err) => {
                warn!(error = %err, "clock-out failed");
                ActionResult::failed(&err)
            }
        }
    }

    /// Starts a break; `data` is the record showing the break.
    pub async fn start_break(&self) -> ActionResult<AttendanceRecord> {
        self.break_action(AttendanceAction::StartBreak, true).await
    }

    /// Ends the running break; `data` is the record showing it closed.
    pub async fn end_break(&self) -> ActionResult<AttendanceRecord> {
        self.break_action(AttendanceAction::EndBreak, false).await
    }

    async fn break_action(
        &self,
        action: AttendanceAction,
        expect_on_break: bool,
    ) -> ActionResult<AttendanceRecord> {
        let _guard = match self.in_flight.begin(action) {
            Ok(guard) => guard,
            Err(err) => return ActionResult::failed(&err),
        };

        let reply = match action {
            AttendanceAction::StartBreak => self.api.break_in().await,
            _ => self.api.break_out().await,
        };

        match reply {
            Ok(reply) => {
                let record = match reply.data {
                    Some(record) => {
                        self.store_record(record.clone()).await;
                        Some(record)
                    }
                    None => self.poll_until_break_state(expect_on_break).await,
                };
                ActionResult::ok(record, reply.message)
            }
            Err(err) => {
                warn!(%action, error = %err, "break action failed");
                ActionResult::failed(&err)
            }
        }
    }

    /// Re-reads the record until its break state matches `expect_on_break`.
    ///
    /// Bounded by the configured poll timeout; on timeout the last fetched
    /// record stays cached.
    async fn poll_until_break_state(&self, expect_on_break: bool) -> Option<AttendanceRecord> {
        let interval = self.config.poll_interval();
        let deadline = Instant::now() + self.config.poll_timeout();
        let mut reads = 0u32;

        loop {
            reads += 1;
            if let Ok(Some(record)) = self.fetch_today_record(true).await {
                if record.is_on_break() == expect_on_break {
                    debug!(reads, expect_on_break, "break state observed");
                    return Some(record);
                }
            }

            if Instant::now() + interval > deadline {
                warn!(reads, expect_on_break, "break state not observed before poll timeout");
                return self.today_record().await;
            }
            sleep(interval).await;
        }
    }

    async fn refresh_silently(&self) {
        // Errors are recorded in the snapshot by the fetch itself.
        let _ = self.fetch_today_record(true).await;
    }

    async fn store_record(&self, record: AttendanceRecord) {
        let mut state = self.state.write().await;
        state.today_record = Some(record);
        state.error = None;
        state.last_updated = Some(Utc::now());
        state.initialized = true;
    }

    /// Derives the status view at the current time.
    pub async fn attendance_status(&self) -> AttendanceStatus {
        self.attendance_status_at(Utc::now()).await
    }

    /// Derives the status view at `now`.
    pub async fn attendance_status_at(&self, now: DateTime<Utc>) -> AttendanceStatus {
        self.state.read().await.attendance_status_at(now)
    }

    /// Shift progress at `now`, when today's record has a usable shift.
    pub async fn shift_progress_at(&self, now: DateTime<Utc>) -> Option<ShiftProgress> {
        let state = self.state.read().await;
        let record = state.today_record.as_ref()?;
        calculate_shift_progress(record, self.config.timezone, now)
    }

    /// Advisory notifications at `now`.
    pub async fn notifications_at(&self, now: DateTime<Utc>) -> Vec<Notification> {
        let state = self.state.read().await;
        match state.today_record.as_ref() {
            Some(record) => {
                generate_notifications(record, self.config.timezone, now, &self.config.notifications)
            }
            None => Vec::new(),
        }
    }

    /// Evaluates status, progress and notifications from one snapshot.
    pub async fn tick_at(&self, now: DateTime<Utc>) -> StatusTick {
        let state = self.state.read().await;
        let record = state.today_record.as_ref();

        StatusTick {
            evaluated_at: now,
            status: derive_status(record, now),
            progress: record.and_then(|r| calculate_shift_progress(r, self.config.timezone, now)),
            notifications: record
                .map(|r| {
                    generate_notifications(r, self.config.timezone, now, &self.config.notifications)
                })
                .unwrap_or_default(),
        }
    }
}
