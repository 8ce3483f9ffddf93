//! Typed wrapper over the attendance endpoints.

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::{AttendanceError, AttendanceResult};
use crate::http::HttpClient;
use crate::models::{AttendanceRecord, ClockInRequest, ClockInSummary, ClockOutSummary};

use super::envelope::{ApiEnvelope, ApiReply, classify_failure, reclassify_clock_in_failure};

/// Path of today's record.
pub const TODAY_PATH: &str = "/employee/attendance/today";
/// Path of the clock-in action.
pub const CLOCK_IN_PATH: &str = "/employee/attendance/clock-in";
/// Path of the clock-out action.
pub const CLOCK_OUT_PATH: &str = "/employee/attendance/clock-out";
/// Path of the break-start action.
pub const BREAK_IN_PATH: &str = "/employee/attendance/break-in";
/// Path of the break-end action.
pub const BREAK_OUT_PATH: &str = "/employee/attendance/break-out";

/// Client for the attendance endpoints of the backend.
///
/// All calls go through the shared [`HttpClient`], so network and 5xx
/// failures are retried before an error reaches the caller.
#[derive(Clone)]
pub struct AttendanceApi {
    http: HttpClient,
    base_url: String,
}

impl AttendanceApi {
    /// Creates a client for the backend at `base_url` (including its API prefix).
    pub fn new(http: HttpClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    /// Creates a client from the `api` and `retry` configuration sections.
    pub fn from_config(config: &ClientConfig) -> AttendanceResult<Self> {
        let http = HttpClient::from_config(config)?;
        Ok(Self::new(http, config.api.base_url.clone()))
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /employee/attendance/today`.
    ///
    /// Returns `None` when the backend has no record for today yet.
    pub async fn today(&self) -> AttendanceResult<Option<AttendanceRecord>> {
        let builder = self.http.request(Method::GET, self.url(TODAY_PATH));
        let envelope = self.execute(TODAY_PATH, builder).await?;

        match envelope.data {
            None | Some(Value::Null) => Ok(None),
            Some(data) => serde_json::from_value(data).map(Some).map_err(|e| {
                AttendanceError::InvalidResponse {
                    endpoint: TODAY_PATH.to_string(),
                    message: e.to_string(),
                }
            }),
        }
    }

    /// `POST /employee/attendance/clock-in`.
    ///
    /// A 400 answer saying the employee is already clocked in comes back as
    /// [`AttendanceError::AlreadyClockedIn`].
    pub async fn clock_in(
        &self,
        request: &ClockInRequest,
    ) -> AttendanceResult<ApiReply<ClockInSummary>> {
        info!(work_mode = %request.work_mode, "clocking in");
        let builder = self
            .http
            .request(Method::POST, self.url(CLOCK_IN_PATH))
            .json(request);

        let envelope = self
            .execute(CLOCK_IN_PATH, builder)
            .await
            .map_err(reclassify_clock_in_failure)?;
        Ok(lenient_reply(envelope))
    }

    /// `POST /employee/attendance/clock-out`.
    pub async fn clock_out(&self) -> AttendanceResult<ApiReply<ClockOutSummary>> {
        info!("clocking out");
        let builder = self.http.request(Method::POST, self.url(CLOCK_OUT_PATH));
        let envelope = self.execute(CLOCK_OUT_PATH, builder).await?;
        Ok(lenient_reply(envelope))
    }

    /// `POST /employee/attendance/break-in`.
    ///
    /// `data` holds the updated record when the backend returns one.
    pub async fn break_in(&self) -> AttendanceResult<ApiReply<AttendanceRecord>> {
        info!("starting break");
        let builder = self.http.request(Method::POST, self.url(BREAK_IN_PATH));
        let envelope = self.execute(BREAK_IN_PATH, builder).await?;
        Ok(lenient_reply(envelope))
    }

    /// `POST /employee/attendance/break-out`.
    ///
    /// `data` holds the updated record when the backend returns one.
    pub async fn break_out(&self) -> AttendanceResult<ApiReply<AttendanceRecord>> {
        info!("ending break");
        let builder = self.http.request(Method::POST, self.url(BREAK_OUT_PATH));
        let envelope = self.execute(BREAK_OUT_PATH, builder).await?;
        Ok(lenient_reply(envelope))
    }

    async fn execute(
        &self,
        endpoint: &str,
        builder: RequestBuilder,
    ) -> AttendanceResult<ApiEnvelope<Value>> {
        let response = self.http.send(builder).await?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AttendanceError::Network {
                message: e.to_string(),
            })?;

        let envelope = serde_json::from_slice::<ApiEnvelope<Value>>(&body).ok();
        debug!(endpoint, %status, decoded = envelope.is_some(), "attendance response");

        if !status.is_success() {
            let message = envelope.and_then(|e| e.message);
            return Err(classify_failure(status, message));
        }

        let envelope = envelope.ok_or_else(|| AttendanceError::InvalidResponse {
            endpoint: endpoint.to_string(),
            message: "body is not a JSON response envelope".to_string(),
        })?;

        if !envelope.success {
            return Err(AttendanceError::Rejected {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| format!("{} was rejected", endpoint)),
            });
        }

        Ok(envelope)
    }
}

/// Keeps the message and decodes `data` only when it has the expected shape.
fn lenient_reply<T: DeserializeOwned>(envelope: ApiEnvelope<Value>) -> ApiReply<T> {
    let data = envelope
        .data
        .and_then(|value| serde_json::from_value::<T>(value).ok());
    ApiReply {
        data,
        message: envelope.message,
    }
}
