//! Outbound HTTP transport.
//!
//! The session drives a [`Transport`] without knowing what sits behind it:
//! [`ReqwestTransport`] for real requests, [`MockTransport`] for tests that
//! must not touch the network.

use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A fully resolved outbound request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Resolved absolute URL, query string included.
    pub url: String,
    /// Effective headers (global and request-scoped merged).
    pub headers: HeaderMap,
    /// Request body, if one was set.
    pub body: Option<String>,
}

/// The raw response handed back by a transport.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body; `None` when the exchange carried none (e.g. HEAD).
    pub body: Option<Bytes>,
}

/// Issues HTTP requests on behalf of a session.
///
/// Any error is fatal to the calling step: the session performs no retries
/// and no partial-result handling.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes the request and returns the raw response.
    async fn execute(&self, request: TransportRequest) -> ApiResult<TransportResponse>;
}

/// Real outbound transport backed by [`reqwest`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Creates a transport from a preconfigured client (timeouts, proxies, ...).
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: TransportRequest) -> ApiResult<TransportResponse> {
        let mut builder = self
            .client
            .request(request.method, request.url.as_str())
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(TransportResponse {
            status,
            headers,
            body: if bytes.is_empty() { None } else { Some(bytes) },
        })
    }
}

/// Handler function type backing a [`MockTransport`].
pub type MockHandler = Arc<
    dyn Fn(TransportRequest) -> Pin<Box<dyn Future<Output = ApiResult<TransportResponse>> + Send>>
        + Send
        + Sync,
>;

/// In-memory transport for testing step definitions without a network.
///
/// # Example
///
/// ```
/// use gardenia_api::{MockTransport, TransportResponse};
/// use http::{HeaderMap, StatusCode};
///
/// let transport = MockTransport::new(|req| async move {
///     assert_eq!(req.url, "http://api.test/items");
///     Ok(TransportResponse {
///         status: StatusCode::OK,
///         headers: HeaderMap::new(),
///         body: Some("[]".into()),
///     })
/// });
/// ```
#[must_use]
pub struct MockTransport {
    handler: MockHandler,
}

impl MockTransport {
    /// Creates a mock transport from a handler closure.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(TransportRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ApiResult<TransportResponse>> + Send + 'static,
    {
        Self {
            handler: Arc::new(move |req| Box::pin(handler(req))),
        }
    }

    /// A transport that always answers with a fixed status and body.
    pub fn fixed(status: StatusCode, body: impl Into<String>) -> Self {
        let body = Bytes::from(body.into());
        Self::new(move |_req| {
            let body = body.clone();
            async move {
                Ok(TransportResponse {
                    status,
                    headers: HeaderMap::new(),
                    body: Some(body),
                })
            }
        })
    }

    /// A transport that echoes the method and URL back as JSON.
    pub fn echo() -> Self {
        Self::new(|req| async move {
            let body = format!("{{\"method\":\"{}\",\"url\":\"{}\"}}", req.method, req.url);
            let mut headers = HeaderMap::new();
            headers.insert(
                http::header::CONTENT_TYPE,
                http::HeaderValue::from_static("application/json"),
            );
            Ok(TransportResponse {
                status: StatusCode::OK,
                headers,
                body: Some(Bytes::from(body)),
            })
        })
    }

    /// A transport that always fails, for exercising the fatal error path.
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(move |_req| {
            let message = message.clone();
            async move { Err(ApiError::Transport(message)) }
        })
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: TransportRequest) -> ApiResult<TransportResponse> {
        (self.handler)(request).await
    }
}
