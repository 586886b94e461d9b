//! HTTP transport abstraction for testability.
//!
//! The [`Transport`] trait abstracts the remote JSON API, allowing production
//! code to use [`ReqwestTransport`] while tests use `MockTransport`
//! (behind the `mock` feature).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ CredentialCache / ApiSession │
//! └──────────────┬───────────────┘
//!                │
//!                ▼
//!         ┌─────────────┐
//!         │  Transport  │ (trait)
//!         └─────────────┘
//!            │       │
//!            ▼       ▼
//!      ┌─────────┐ ┌──────┐
//!      │ Reqwest │ │ Mock │
//!      └────┬────┘ └──────┘
//!           │
//!           ▼
//!      Remote REST API
//! ```
//!
//! Every request carries its own bounded timeout. Non-2xx responses are not
//! errors at this layer; callers decide via [`ApiResponse::error_for_status`].

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::FreightcheckConfig;
use crate::error::FreightcheckError;

/// HTTP method subset used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

/// A single API request, relative to the transport's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Path starting with `/`
    pub path: String,
    /// Raw `Authorization` header value
    pub authorization: Option<String>,
    /// JSON body
    pub body: Option<serde_json::Value>,
    /// Per-call timeout
    pub timeout: Duration,
}

impl ApiRequest {
    /// Default per-call timeout when none is set explicitly.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path, None)
    }

    /// Creates a `POST` request with a JSON body.
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self::new(Method::Post, path, Some(body))
    }

    /// Creates a `DELETE` request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path, None)
    }

    fn new(method: Method, path: impl Into<String>, body: Option<serde_json::Value>) -> Self {
        Self {
            method,
            path: path.into(),
            authorization: None,
            body,
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Sets the `Authorization` header value (used verbatim).
    pub fn with_authorization(mut self, token: impl Into<String>) -> Self {
        self.authorization = Some(token.into());
        self
    }

    /// Sets the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Raw API response: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    /// Body, verbatim
    pub body: String,
}

impl ApiResponse {
    /// Creates a response from a status and raw body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Creates a response whose body is the serialized JSON value.
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, value.to_string())
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Converts a non-2xx response into `FreightcheckError::Http`.
    ///
    /// The status code and body are carried verbatim.
    pub fn error_for_status(self, request: &ApiRequest) -> Result<Self, FreightcheckError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(FreightcheckError::Http {
                method: request.method.as_str().to_owned(),
                path: request.path.clone(),
                status: self.status,
                body: self.body,
            })
        }
    }

    /// Decodes the body into a typed record.
    ///
    /// # Errors
    ///
    /// Returns `FreightcheckError::Decode` when the body does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self, path: &str) -> Result<T, FreightcheckError> {
        serde_json::from_str(&self.body).map_err(|e| FreightcheckError::Decode {
            path: path.to_owned(),
            reason: e.to_string(),
        })
    }
}

/// Trait abstracting the remote API.
///
/// The trait is `Send + Sync + 'static`, allowing sharing across tasks via `Arc`.
///
/// # Implementations
///
/// - [`ReqwestTransport`]: production implementation over `reqwest`
/// - `MockTransport`: scripted responses with a request log (feature `mock`)
///
/// # Error Handling
///
/// Only failures to obtain a response (connection refused, timeout) are
/// errors here, reported as `FreightcheckError::Transport`.
pub trait Transport: Send + Sync + 'static {
    /// Sends a request and returns the raw response.
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, FreightcheckError>> + Send;
}

/// Production transport using `reqwest`.
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Creates a transport for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns `FreightcheckError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, FreightcheckError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("freightcheck/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FreightcheckError::Transport(format!("failed to build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        })
    }

    /// Creates a transport from the effective configuration.
    pub fn from_config(config: &FreightcheckConfig) -> Result<Self, FreightcheckError> {
        Self::new(config.base_url())
    }

    /// Base URL every request path is appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, FreightcheckError> {
        let url = format!("{}{}", self.base_url, request.path);
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self
            .client
            .request(method, &url)
            .timeout(request.timeout);
        if let Some(token) = &request.authorization {
            builder = builder.header(reqwest::header::AUTHORIZATION, token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                FreightcheckError::Transport(format!(
                    "{} {} timed out after {:?}",
                    request.method.as_str(),
                    request.path,
                    request.timeout
                ))
            } else {
                FreightcheckError::Transport(format!(
                    "{} {} failed: {e}",
                    request.method.as_str(),
                    request.path
                ))
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            FreightcheckError::Transport(format!("failed to read body of {}: {e}", request.path))
        })?;

        debug!(
            method = request.method.as_str(),
            path = %request.path,
            status,
            "api call completed"
        );

        Ok(ApiResponse { status, body })
    }
}

/// Scripted transport for tests.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;

    use super::{ApiRequest, ApiResponse, Method, Transport};
    use crate::error::FreightcheckError;

    /// Mock transport returning scripted responses per `(method, path)`.
    ///
    /// Responses queued for a route are returned in order; the last one
    /// repeats once the queue is down to a single entry. Unknown routes
    /// return 404. Every request is recorded.
    #[derive(Default)]
    pub struct MockTransport {
        routes: Mutex<HashMap<(Method, String), VecDeque<ApiResponse>>>,
        failures: Mutex<HashMap<(Method, String), String>>,
        requests: Mutex<Vec<ApiRequest>>,
        latency: Option<Duration>,
    }

    impl MockTransport {
        /// Creates a mock with no routes.
        pub fn new() -> Self {
            Self::default()
        }

        /// Delays every response, so concurrent callers overlap.
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = Some(latency);
            self
        }

        /// Queues a response for a route.
        pub fn on(self, method: Method, path: &str, response: ApiResponse) -> Self {
            self.push(method, path, response);
            self
        }

        /// Queues a JSON response for a route.
        pub fn on_json(
            self,
            method: Method,
            path: &str,
            status: u16,
            body: serde_json::Value,
        ) -> Self {
            self.on(method, path, ApiResponse::json(status, &body))
        }

        /// Makes a route fail at the transport level.
        pub fn fail(self, method: Method, path: &str, reason: &str) -> Self {
            if let Ok(mut failures) = self.failures.lock() {
                failures.insert((method, path.to_owned()), reason.to_owned());
            }
            self
        }

        /// Queues a response on an already shared mock.
        pub fn push(&self, method: Method, path: &str, response: ApiResponse) {
            if let Ok(mut routes) = self.routes.lock() {
                routes
                    .entry((method, path.to_owned()))
                    .or_default()
                    .push_back(response);
            }
        }

        /// All recorded requests, in order.
        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests
                .lock()
                .map(|r| r.clone())
                .unwrap_or_default()
        }

        /// Number of recorded requests for a route.
        pub fn count(&self, method: Method, path: &str) -> usize {
            self.requests()
                .iter()
                .filter(|r| r.method == method && r.path == path)
                .count()
        }

        /// Last recorded request for a route.
        pub fn last(&self, method: Method, path: &str) -> Option<ApiRequest> {
            self.requests()
                .into_iter()
                .rev()
                .find(|r| r.method == method && r.path == path)
        }
    }

    impl Transport for MockTransport {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, FreightcheckError> {
            let key = (request.method, request.path.clone());
            if let Ok(mut log) = self.requests.lock() {
                log.push(request);
            }

            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }

            let failure = self
                .failures
                .lock()
                .ok()
                .and_then(|f| f.get(&key).cloned());
            if let Some(reason) = failure {
                return Err(FreightcheckError::Transport(reason));
            }

            let response = self.routes.lock().ok().and_then(|mut routes| {
                let queue = routes.get_mut(&key)?;
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            });

            Ok(response.unwrap_or_else(|| {
                ApiResponse::new(404, format!("no mock route for {} {}", key.0.as_str(), key.1))
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockTransport;
    use super::*;

    #[test]
    fn request_builder_sets_fields() {
        let request = ApiRequest::post("/tariffs/list", serde_json::json!({"itemsPerPage": 100}))
            .with_authorization("Bearer x.y.z")
            .with_timeout(Duration::from_secs(30));
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.authorization.as_deref(), Some("Bearer x.y.z"));
        assert_eq!(request.timeout, Duration::from_secs(30));
    }

    #[test]
    fn get_request_uses_default_timeout() {
        let request = ApiRequest::get("/order/1/details");
        assert_eq!(request.timeout, ApiRequest::DEFAULT_TIMEOUT);
        assert!(request.body.is_none());
    }

    #[test]
    fn error_for_status_keeps_body_verbatim() {
        let request = ApiRequest::get("/order/1/details");
        let err = ApiResponse::new(500, "<html>oops</html>")
            .error_for_status(&request)
            .unwrap_err();
        match err {
            FreightcheckError::Http {
                method,
                path,
                status,
                body,
            } => {
                assert_eq!(method, "GET");
                assert_eq!(path, "/order/1/details");
                assert_eq!(status, 500);
                assert_eq!(body, "<html>oops</html>");
            }
            other => panic!("expected Http error, got {other:?}"),
        }
    }

    #[test]
    fn error_for_status_passes_success() {
        let request = ApiRequest::get("/dictionaries");
        let response = ApiResponse::new(204, "").error_for_status(&request).unwrap();
        assert_eq!(response.status, 204);
    }

    #[test]
    fn decode_shape_mismatch_is_decode_error() {
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Points {
            points: Vec<serde_json::Value>,
        }
        let err = ApiResponse::new(200, r#"{"data": []}"#)
            .decode::<Points>("/contractor-point/list-info")
            .unwrap_err();
        assert!(matches!(err, FreightcheckError::Decode { .. }));
        assert!(err.to_string().contains("points"));
    }

    #[tokio::test]
    async fn mock_returns_queued_responses_then_repeats_last() {
        let mock = MockTransport::new()
            .on(Method::Get, "/x", ApiResponse::new(200, "1"))
            .on(Method::Get, "/x", ApiResponse::new(200, "2"));

        let first = mock.send(ApiRequest::get("/x")).await.unwrap();
        let second = mock.send(ApiRequest::get("/x")).await.unwrap();
        let third = mock.send(ApiRequest::get("/x")).await.unwrap();
        assert_eq!(first.body, "1");
        assert_eq!(second.body, "2");
        assert_eq!(third.body, "2");
        assert_eq!(mock.count(Method::Get, "/x"), 3);
    }

    #[tokio::test]
    async fn mock_unknown_route_is_404() {
        let mock = MockTransport::new();
        let response = mock.send(ApiRequest::get("/missing")).await.unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn mock_failure_is_transport_error() {
        let mock = MockTransport::new().fail(Method::Post, "/user/login", "connection refused");
        let err = mock
            .send(ApiRequest::post("/user/login", serde_json::json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, FreightcheckError::Transport(ref r) if r == "connection refused"));
    }

    #[test]
    fn reqwest_transport_trims_base_url() {
        let transport = ReqwestTransport::new("https://api.example.com/v1/").unwrap();
        assert_eq!(transport.base_url(), "https://api.example.com/v1");
    }

    #[test]
    fn transports_are_send_sync() {
        fn assert_send_sync<T: Send + Sync + 'static>() {}
        assert_send_sync::<ReqwestTransport>();
        assert_send_sync::<MockTransport>();
    }
}
