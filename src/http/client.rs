//! HTTP client with bearer auth, request ids and retries.

use std::time::Duration;

use reqwest::header::{HeaderValue, USER_AGENT};
use reqwest::{Client as ReqwestClient, IntoUrl, Method, RequestBuilder, Response};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{AttendanceError, AttendanceResult};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// HTTP client with timeout, bearer auth and linear-backoff retries.
///
/// Network failures and 5xx responses are retried up to `max_attempts`
/// total attempts; retry `n` waits `n * backoff`. 4xx responses are
/// returned to the caller on the first attempt.
#[derive(Clone)]
pub struct HttpClient {
    client: ReqwestClient,
    max_attempts: usize,
    backoff: Duration,
    auth_token: Option<String>,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Builds a client from the `api` and `retry` sections of `config`.
    pub fn from_config(config: &ClientConfig) -> AttendanceResult<Self> {
        let mut builder = Self::builder()
            .timeout(config.request_timeout())
            .max_attempts(config.retry.max_attempts)
            .backoff(config.retry_backoff());

        if let Some(token) = &config.api.auth_token {
            builder = builder.auth_token(token.clone());
        }
        if let Some(agent) = &config.api.user_agent {
            builder = builder.user_agent(agent.clone());
        }

        builder.build()
    }

    /// Create a request builder, with the bearer token attached when configured.
    pub fn request<U: IntoUrl>(&self, method: Method, url: U) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Execute the provided request builder with retry semantics.
    ///
    /// Every attempt of one logical request carries the same request id.
    pub async fn send(&self, builder: RequestBuilder) -> AttendanceResult<Response> {
        let attempts = self.max_attempts.max(1);
        let request_id = Uuid::new_v4();
        let builder = builder.header(REQUEST_ID_HEADER, request_id.to_string());

        for attempt in 1..=attempts {
            let cloned_builder = builder.try_clone().ok_or_else(|| AttendanceError::Network {
                message: "request body cannot be cloned for retry".to_string(),
            })?;

            let request = cloned_builder
                .build()
                .map_err(|err| AttendanceError::Network {
                    message: err.to_string(),
                })?;

            let method = request.method().clone();
            let url = request.url().clone();
            debug!(%request_id, attempt, %method, %url, "sending HTTP request");

            match self.client.execute(request).await {
                Ok(response) => {
                    let status = response.status();
                    debug!(%request_id, attempt, %method, %url, %status, "received HTTP response");

                    if status.is_server_error() && attempt < attempts {
                        warn!(%request_id, attempt, %status, "server error, retrying");
                        self.sleep_with_backoff(attempt).await;
                        continue;
                    }

                    return Ok(response);
                }
                Err(err) => {
                    debug!(%request_id, attempt, %method, %url, error = %err, "HTTP request failed");

                    if attempt < attempts && should_retry_error(&err) {
                        warn!(%request_id, attempt, error = %err, "network error, retrying");
                        self.sleep_with_backoff(attempt).await;
                        continue;
                    }

                    return Err(AttendanceError::Network {
                        message: err.to_string(),
                    });
                }
            }
        }

        Err(AttendanceError::Network {
            message: "http client exhausted retries without producing a result".to_string(),
        })
    }

    fn backoff_delay(&self, retry_number: usize) -> Duration {
        self.backoff.saturating_mul(retry_number as u32)
    }

    async fn sleep_with_backoff(&self, retry_number: usize) {
        let delay = self.backoff_delay(retry_number);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    max_attempts: usize,
    backoff: Duration,
    user_agent: Option<String>,
    auth_token: Option<String>,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            backoff: Duration::from_millis(1000),
            user_agent: None,
            auth_token: None,
        }
    }
}

impl HttpClientBuilder {
    /// Per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Configure the total number of attempts (initial try + retries).
    pub fn max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Linear backoff step between retries.
    pub fn backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// User agent sent with every request.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Bearer token sent with every request.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Builds the client.
    pub fn build(self) -> AttendanceResult<HttpClient> {
        let mut builder = ReqwestClient::builder().timeout(self.timeout).no_proxy();

        if let Some(agent) = self.user_agent {
            let value = HeaderValue::from_str(&agent).map_err(|err| AttendanceError::Network {
                message: format!("invalid user agent: {err}"),
            })?;
            let mut headers = reqwest::header::HeaderMap::new();
            headers.insert(USER_AGENT, value);
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(|err| AttendanceError::Network {
            message: format!("failed to build HTTP client: {err}"),
        })?;

        Ok(HttpClient {
            client,
            max_attempts: self.max_attempts.max(1),
            backoff: self.backoff,
            auth_token: self.auth_token,
        })
    }
}

fn should_retry_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect() || err.is_request()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::Router;
    use axum::extract::State;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use reqwest::Method;

    use super::*;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client_with_defaults() -> HttpClient {
        HttpClient::builder()
            .backoff(Duration::from_millis(5))
            .max_attempts(3)
            .build()
            .expect("http client")
    }

    async fn failing_then_ok(State(counter): State<Arc<AtomicUsize>>) -> StatusCode {
        let current = counter.fetch_add(1, Ordering::SeqCst);
        if current < 2 {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::OK
        }
    }

    async fn always_bad_request(State(counter): State<Arc<AtomicUsize>>) -> StatusCode {
        counter.fetch_add(1, Ordering::SeqCst);
        StatusCode::BAD_REQUEST
    }

    async fn always_unavailable(State(counter): State<Arc<AtomicUsize>>) -> StatusCode {
        counter.fetch_add(1, Ordering::SeqCst);
        StatusCode::SERVICE_UNAVAILABLE
    }

    async fn echo_headers(headers: HeaderMap) -> String {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        let request_id = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        format!("{auth}|{request_id}")
    }

    #[tokio::test]
    async fn test_retries_server_errors_until_success() {
        let counter = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route("/", get(failing_then_ok))
            .with_state(counter.clone());
        let base = serve(router).await;

        let client = client_with_defaults();
        let response = client
            .send(client.request(Method::GET, &base))
            .await
            .expect("response");

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let counter = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route("/", get(always_bad_request))
            .with_state(counter.clone());
        let base = serve(router).await;

        let client = client_with_defaults();
        let response = client
            .send(client.request(Method::GET, &base))
            .await
            .expect("response");

        assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_returns_last_server_error_after_exhausting_attempts() {
        let counter = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route("/", get(always_unavailable))
            .with_state(counter.clone());
        let base = serve(router).await;

        let client = client_with_defaults();
        let response = client
            .send(client.request(Method::GET, &base))
            .await
            .expect("response");

        assert_eq!(response.status(), reqwest::StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = client_with_defaults();
        let result = client
            .send(client.request(Method::GET, format!("http://{}", addr)))
            .await;

        assert!(matches!(result, Err(AttendanceError::Network { .. })));
    }

    #[tokio::test]
    async fn test_sends_bearer_token_and_request_id() {
        let router = Router::new().route("/", get(echo_headers));
        let base = serve(router).await;

        let client = HttpClient::builder()
            .auth_token("secret-token")
            .build()
            .unwrap();
        let body = client
            .send(client.request(Method::GET, &base))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();

        let (auth, request_id) = body.split_once('|').unwrap();
        assert_eq!(auth, "Bearer secret-token");
        assert!(Uuid::parse_str(request_id).is_ok());
    }

    #[test]
    fn test_backoff_is_linear() {
        let client = HttpClient::builder()
            .backoff(Duration::from_millis(100))
            .build()
            .unwrap();
        assert_eq!(client.backoff_delay(1), Duration::from_millis(100));
        assert_eq!(client.backoff_delay(2), Duration::from_millis(200));
        assert_eq!(client.backoff_delay(3), Duration::from_millis(300));
    }

    #[test]
    fn test_max_attempts_never_zero() {
        let client = HttpClient::builder().max_attempts(0).build().unwrap();
        assert_eq!(client.max_attempts, 1);
    }

    #[test]
    fn test_from_config_copies_retry_policy() {
        let mut config = ClientConfig::default();
        config.retry.max_attempts = 5;
        config.retry.backoff_ms = 50;
        config.api.auth_token = Some("t".to_string());

        let client = HttpClient::from_config(&config).unwrap();
        assert_eq!(client.max_attempts, 5);
        assert_eq!(client.backoff, Duration::from_millis(50));
        assert_eq!(client.auth_token.as_deref(), Some("t"));
    }
}
