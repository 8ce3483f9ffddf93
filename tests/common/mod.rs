//! In-process fake of the attendance backend used by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use chrono::Utc;
use serde_json::{Value, json};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use attendance_client::config::ClientConfig;
use attendance_client::models::{AttendanceRecord, BreakSession, ShiftDefinition, WorkMode};
use attendance_client::store::AttendanceStore;

/// Request counters per endpoint.
#[derive(Debug, Default, Clone, Copy)]
pub struct Counts {
    pub today: usize,
    pub clock_in: usize,
    pub clock_out: usize,
    pub break_in: usize,
    pub break_out: usize,
}

/// Mutable behaviour and data of the fake backend.
#[derive(Debug, Default)]
pub struct FakeState {
    pub record: Option<AttendanceRecord>,
    pub shift: Option<ShiftDefinition>,
    /// Reads served from the pre-action snapshot after each break action.
    pub stale_reads_after_break: usize,
    pending_stale_reads: usize,
    stale_snapshot: Option<AttendanceRecord>,
    /// Whether break endpoints answer with the full record.
    pub return_record_on_break: bool,
    /// Number of upcoming `today` reads that fail with a 500.
    pub today_failures: usize,
    /// Artificial latency of the break-in endpoint.
    pub break_in_delay: Duration,
    /// Latency of each upcoming `today` read, consumed in arrival order.
    pub today_delays: VecDeque<Duration>,
    /// Raw `data` payload served by `today` instead of the record.
    pub today_payload: Option<Value>,
    /// When set, requests without this bearer token get a 401.
    pub required_token: Option<String>,
    pub last_clock_in_body: Option<Value>,
    pub counts: Counts,
}

type Shared = Arc<Mutex<FakeState>>;

type Reply = (StatusCode, Json<Value>);

fn reject(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({"success": false, "message": message})))
}

fn authorized(state: &FakeState, headers: &HeaderMap) -> bool {
    match &state.required_token {
        None => true,
        Some(token) => headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == format!("Bearer {}", token)),
    }
}

async fn today(State(shared): State<Shared>, headers: HeaderMap) -> Reply {
    let delay = shared.lock().unwrap().today_delays.pop_front();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut state = shared.lock().unwrap();
    state.counts.today += 1;

    if !authorized(&state, &headers) {
        return reject(StatusCode::UNAUTHORIZED, "Token expired");
    }
    if state.today_failures > 0 {
        state.today_failures -= 1;
        return reject(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
    }

    if let Some(payload) = state.today_payload.clone() {
        return (
            StatusCode::OK,
            Json(json!({"success": true, "data": payload})),
        );
    }

    let record = if state.pending_stale_reads > 0 {
        state.pending_stale_reads -= 1;
        state.stale_snapshot.clone()
    } else {
        state.record.clone()
    };

    (
        StatusCode::OK,
        Json(json!({"success": true, "data": record})),
    )
}

async fn clock_in(State(shared): State<Shared>, Json(body): Json<Value>) -> Reply {
    let mut state = shared.lock().unwrap();
    state.counts.clock_in += 1;
    state.last_clock_in_body = Some(body.clone());

    if state.record.as_ref().is_some_and(|r| r.clock_in.is_some()) {
        return reject(StatusCode::BAD_REQUEST, "You have already clocked in today");
    }

    let now = Utc::now();
    let work_mode: WorkMode = serde_json::from_value(body["workMode"].clone()).unwrap_or_default();
    let shift = state.shift.clone();
    state.record = Some(AttendanceRecord {
        id: 1,
        employee_id: Some(42),
        date: Some(now.date_naive()),
        clock_in: Some(now),
        clock_out: None,
        break_sessions: vec![],
        shift,
        is_late: false,
        late_minutes: Some(0),
        is_early_departure: false,
        early_exit_minutes: None,
        overtime_hours: None,
        total_worked_minutes: None,
        total_break_minutes: None,
        work_mode,
        location_details: body["locationDetails"].as_str().map(str::to_string),
    });

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Clocked in successfully",
            "data": {"clockInTime": now, "isLate": false, "lateMinutes": 0}
        })),
    )
}

async fn clock_out(State(shared): State<Shared>) -> Reply {
    let mut state = shared.lock().unwrap();
    state.counts.clock_out += 1;

    let now = Utc::now();
    let Some(record) = state.record.as_mut().filter(|r| r.is_active()) else {
        return reject(StatusCode::BAD_REQUEST, "No active clock-in found for today");
    };
    record.clock_out = Some(now);

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message": "Clocked out successfully",
            "data": {"clockOutTime": now, "totalWorkedMinutes": 0}
        })),
    )
}

async fn break_in(State(shared): State<Shared>) -> Reply {
    let delay = shared.lock().unwrap().break_in_delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let mut state = shared.lock().unwrap();
    state.counts.break_in += 1;

    let Some(previous) = state
        .record
        .clone()
        .filter(|r| r.is_active() && !r.is_on_break())
    else {
        return reject(StatusCode::BAD_REQUEST, "Cannot start a break right now");
    };

    let now = Utc::now();
    let mut updated = previous.clone();
    updated.break_sessions.push(BreakSession {
        break_in: now,
        break_out: None,
        duration: None,
    });
    finish_break_action(&mut state, previous, updated, json!({"breakIn": now}), "Break started")
}

async fn break_out(State(shared): State<Shared>) -> Reply {
    let mut state = shared.lock().unwrap();
    state.counts.break_out += 1;

    let Some(previous) = state.record.clone().filter(|r| r.is_on_break()) else {
        return reject(StatusCode::BAD_REQUEST, "No active break found");
    };

    let now = Utc::now();
    let mut updated = previous.clone();
    if let Some(open) = updated.break_sessions.iter_mut().find(|b| b.break_out.is_none()) {
        open.break_out = Some(now);
        open.duration = Some((now - open.break_in).num_minutes());
    }
    finish_break_action(&mut state, previous, updated, json!({"breakOut": now}), "Break ended")
}

fn finish_break_action(
    state: &mut FakeState,
    previous: AttendanceRecord,
    updated: AttendanceRecord,
    summary: Value,
    message: &str,
) -> Reply {
    state.stale_snapshot = Some(previous);
    state.pending_stale_reads = state.stale_reads_after_break;
    state.record = Some(updated.clone());

    let data = if state.return_record_on_break {
        serde_json::to_value(&updated).unwrap()
    } else {
        summary
    };
    (
        StatusCode::OK,
        Json(json!({"success": true, "message": message, "data": data})),
    )
}

/// A running fake backend.
#[derive(Clone)]
pub struct FakeBackend {
    pub state: Shared,
    pub base_url: String,
    shutdown: Arc<Notify>,
    server: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl FakeBackend {
    /// Binds a random local port and starts serving.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState::default()));

        let router = Router::new()
            .route("/api/employee/attendance/today", get(today))
            .route("/api/employee/attendance/clock-in", post(clock_in))
            .route("/api/employee/attendance/clock-out", post(clock_out))
            .route("/api/employee/attendance/break-in", post(break_in))
            .route("/api/employee/attendance/break-out", post(break_out))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = Arc::new(Notify::new());
        let signal = shutdown.clone();
        let server = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { signal.notified().await })
                .await
                .unwrap();
        });

        Self {
            state,
            base_url: format!("http://{}/api", addr),
            shutdown,
            server: Arc::new(Mutex::new(Some(server))),
        }
    }

    /// Stops serving and waits until the listening socket is closed.
    pub async fn stop(&self) {
        self.shutdown.notify_one();
        let server = self.server.lock().unwrap().take();
        if let Some(server) = server {
            tokio::time::timeout(Duration::from_secs(2), server)
                .await
                .expect("fake backend did not shut down")
                .unwrap();
        }
    }

    /// Client configuration with fast retries and polling.
    pub fn config(&self) -> ClientConfig {
        let mut config = ClientConfig::with_base_url(self.base_url.clone());
        config.api.timeout_secs = 5;
        config.retry.max_attempts = 3;
        config.retry.backoff_ms = 5;
        config.refresh.poll_interval_ms = 10;
        config.refresh.poll_timeout_ms = 1000;
        config
    }

    /// A store talking to this backend.
    pub fn store(&self) -> AttendanceStore {
        AttendanceStore::from_config(self.config()).unwrap()
    }

    /// Runs `f` with the backend state locked.
    pub fn with<R>(&self, f: impl FnOnce(&mut FakeState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    /// Request counters so far.
    pub fn counts(&self) -> Counts {
        self.with(|s| s.counts)
    }
}

/// A 09:00-17:00 shift with a 10 minute grace period.
pub fn day_shift() -> ShiftDefinition {
    ShiftDefinition {
        shift_name: Some("Day".to_string()),
        shift_start_time: "09:00".to_string(),
        shift_end_time: "17:00".to_string(),
        grace_period_minutes: 10,
        late_threshold_minutes: Some(30),
    }
}
