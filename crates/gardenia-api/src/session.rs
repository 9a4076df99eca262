//! The request/response session.
//!
//! An [`ApiSession`] is the single stateful object behind a set of BDD step
//! definitions: one instance per scenario. Builder calls accumulate
//! parameters, headers, and a body for the next request; a terminal HTTP
//! call consumes them, captures the response, and assertion calls then read
//! that response until the next terminal call replaces it.
//!
//! The session moves between two effective states: *idle* (nothing pending)
//! and *building* (pending request non-empty). Every terminal call returns
//! the session to idle, whatever state it was in.

use crate::config::SessionConfig;
use crate::error::{ApiError, ApiResult};
use crate::observer::{SessionObserver, TracingObserver};
use crate::response::{JsonComparer, SessionResponse};
use crate::table::{KeyValues, RequestBody};
use crate::transport::{ReqwestTransport, Transport, TransportRequest};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// Parameters and headers that persist across requests within one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Globals {
    /// Query parameters appended to every request.
    pub parameters: IndexMap<String, String>,
    /// Headers sent with every request.
    pub headers: IndexMap<String, String>,
}

/// State accumulated for the next request, consumed by a terminal call.
#[derive(Debug, Default)]
struct PendingRequest {
    parameters: IndexMap<String, String>,
    headers: IndexMap<String, String>,
    body: Option<String>,
}

/// A stateful HTTP request/response session for scenario-style tests.
///
/// # Example
///
/// ```
/// use gardenia_api::{ApiSession, MockTransport, SessionConfig};
/// use http::StatusCode;
///
/// # async fn scenario() -> gardenia_api::ApiResult<()> {
/// let config = SessionConfig::new("http://api.test");
/// let mut session =
///     ApiSession::with_transport(config, MockTransport::fixed(StatusCode::OK, "{\"a\":1}"));
///
/// session.add_parameters([("q", "x")]);
/// session.get("/items").await?;
///
/// session.assert_status(200)?;
/// session.assert_json(&serde_json::json!({"a": 1}))?;
/// # Ok(())
/// # }
/// ```
pub struct ApiSession {
    config: SessionConfig,
    globals: Globals,
    pending: PendingRequest,
    last_response: Option<SessionResponse>,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn SessionObserver>,
}

impl ApiSession {
    /// Creates a session using the real [`ReqwestTransport`].
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }

    /// Creates a session with a caller-supplied transport.
    #[must_use]
    pub fn with_transport(config: SessionConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            globals: Globals::default(),
            pending: PendingRequest::default(),
            last_response: None,
            transport: Arc::new(transport),
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replaces the session observer.
    #[must_use]
    pub fn with_observer(mut self, observer: impl SessionObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Returns the session configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the session-wide parameters and headers.
    #[must_use]
    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    /// Returns the last captured response, if any terminal call happened.
    #[must_use]
    pub fn last_response(&self) -> Option<&SessionResponse> {
        self.last_response.as_ref()
    }

    /// Returns the last response or [`ApiError::NoResponse`].
    pub fn response(&self) -> ApiResult<&SessionResponse> {
        self.last_response.as_ref().ok_or(ApiError::NoResponse)
    }

    // Request builders

    /// Merges parameters into the pending request; new entries win.
    pub fn add_parameters(&mut self, params: impl Into<KeyValues>) -> &mut Self {
        self.pending.parameters.extend(params.into().into_map());
        self
    }

    /// Merges headers into the pending request; new entries win.
    pub fn add_headers(&mut self, headers: impl Into<KeyValues>) -> &mut Self {
        self.pending.headers.extend(headers.into().into_map());
        self
    }

    /// Merges parameters into the session globals; persists across requests.
    pub fn add_global_parameters(&mut self, params: impl Into<KeyValues>) -> &mut Self {
        self.globals.parameters.extend(params.into().into_map());
        self.observer
            .on_debug(&format!("global parameters: {:?}", self.globals.parameters));
        self
    }

    /// Replaces the session-wide headers wholesale.
    pub fn add_global_headers(&mut self, headers: impl Into<KeyValues>) -> &mut Self {
        self.globals.headers = headers.into().into_map();
        self.observer
            .on_debug(&format!("global headers: {:?}", self.globals.headers));
        self
    }

    /// Replaces the entire globals object.
    pub fn set_globals(&mut self, globals: Globals) -> &mut Self {
        self.globals = globals;
        self
    }

    /// Sets the body for the next request.
    ///
    /// Raw input is stored verbatim; tabular input is form-encoded as
    /// `key=value&...` with URL-encoded values.
    pub fn set_body(&mut self, body: impl Into<RequestBody>) -> &mut Self {
        self.pending.body = Some(body.into().into_string());
        self
    }

    // Terminal HTTP calls

    /// Issues a GET request.
    pub async fn get(&mut self, path: &str) -> ApiResult<&SessionResponse> {
        self.http(path, Method::GET).await
    }

    /// Issues a HEAD request.
    pub async fn head(&mut self, path: &str) -> ApiResult<&SessionResponse> {
        self.http(path, Method::HEAD).await
    }

    /// Issues a PUT request.
    pub async fn put(&mut self, path: &str) -> ApiResult<&SessionResponse> {
        self.http(path, Method::PUT).await
    }

    /// Issues a PATCH request.
    pub async fn patch(&mut self, path: &str) -> ApiResult<&SessionResponse> {
        self.http(path, Method::PATCH).await
    }

    /// Issues a POST request.
    pub async fn post(&mut self, path: &str) -> ApiResult<&SessionResponse> {
        self.http(path, Method::POST).await
    }

    /// Issues a DELETE request.
    pub async fn delete(&mut self, path: &str) -> ApiResult<&SessionResponse> {
        self.http(path, Method::DELETE).await
    }

    /// Issues a DELETE request.
    #[deprecated(since = "0.1.0", note = "use `delete`")]
    pub async fn del(&mut self, path: &str) -> ApiResult<&SessionResponse> {
        self.http(path, Method::DELETE).await
    }

    /// Issues a request with an arbitrary method.
    ///
    /// Resolves the URL, merges headers (request-scoped entries override
    /// globals), hands the request to the transport, then clears the pending
    /// request and captures the response. A transport error is fatal to the
    /// current step; nothing is retried.
    pub async fn http(&mut self, path: &str, method: Method) -> ApiResult<&SessionResponse> {
        let url = self.resolve_url(path)?;
        let headers = self.effective_headers()?;
        let body = self.pending.body.clone();

        self.observer
            .on_request(&method, &url, &headers, body.as_deref());

        let request = TransportRequest {
            method,
            url,
            headers,
            body,
        };
        let raw = self.transport.execute(request).await?;

        self.pending = PendingRequest::default();

        let body = raw.body.map_or_else(String::new, |bytes| {
            String::from_utf8_lossy(&bytes).into_owned()
        });
        let response = SessionResponse::new(raw.status, raw.headers, body);
        self.observer.on_response(&response);

        Ok(self.last_response.insert(response))
    }

    /// Resolves a request path against the configured host and the merged
    /// parameter sets.
    ///
    /// Merge precedence, later wins: global parameters, then pending
    /// parameters, then any query string embedded in `path`. A path carrying
    /// its own scheme and host is used as-is instead of the configured host.
    fn resolve_url(&self, path: &str) -> ApiResult<String> {
        let (base, path_component, embedded_query) = match Url::parse(path) {
            Ok(parsed) if parsed.has_host() => {
                let mut base = format!(
                    "{}://{}",
                    parsed.scheme(),
                    parsed.host_str().unwrap_or_default()
                );
                if let Some(port) = parsed.port() {
                    base.push(':');
                    base.push_str(&port.to_string());
                }
                (
                    base,
                    parsed.path().to_string(),
                    parsed.query().map(str::to_string),
                )
            }
            _ => {
                let (path_part, query) = match path.split_once('?') {
                    Some((p, q)) => (p, Some(q.to_string())),
                    None => (path, None),
                };
                (self.config.host.clone(), path_part.to_string(), query)
            }
        };

        let mut merged = self.globals.parameters.clone();
        merged.extend(self.pending.parameters.clone());
        if let Some(query) = embedded_query {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                merged.insert(key.into_owned(), value.into_owned());
            }
        }

        let mut resolved = format!("{base}{path_component}");
        if !merged.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(merged.iter())
                .finish();
            resolved.push('?');
            resolved.push_str(&query);
        }

        // Catches a misconfigured host before the transport does.
        Url::parse(&resolved)?;
        Ok(resolved)
    }

    /// Merges global and pending headers; request-scoped entries win.
    fn effective_headers(&self) -> ApiResult<HeaderMap> {
        let mut merged = self.globals.headers.clone();
        merged.extend(self.pending.headers.clone());

        let mut headers = HeaderMap::with_capacity(merged.len());
        for (name, value) in &merged {
            let header_name = HeaderName::try_from(name.as_str())
                .map_err(|e| ApiError::InvalidHeader(format!("{name}: {e}")))?;
            let header_value = HeaderValue::try_from(value.as_str())
                .map_err(|e| ApiError::InvalidHeader(format!("{name}: {e}")))?;
            headers.insert(header_name, header_value);
        }
        Ok(headers)
    }

    // Assertions over the last response. Each is a pure read and may be
    // repeated; all fail with `ApiError::NoResponse` before the first
    // terminal call.

    /// Asserts that the last status code equals `expected`.
    pub fn assert_status(&self, expected: u16) -> ApiResult<&SessionResponse> {
        self.response()?.assert_status(expected)
    }

    /// Asserts that the last status code differs from `unexpected`.
    pub fn assert_status_not(&self, unexpected: u16) -> ApiResult<&SessionResponse> {
        self.response()?.assert_status_not(unexpected)
    }

    /// Asserts that the last Content-Type contains `expected`.
    pub fn assert_content_type(&self, expected: &str) -> ApiResult<&SessionResponse> {
        self.response()?.assert_content_type(expected)
    }

    /// Asserts that the last body is JSON deep-equal to `expected`.
    pub fn assert_json(&self, expected: &Value) -> ApiResult<&SessionResponse> {
        self.response()?.assert_json(expected)
    }

    /// Asserts that the values selected by `path` equal `expected`.
    pub fn assert_json_contains(&self, path: &str, expected: &Value) -> ApiResult<&SessionResponse> {
        self.observer.on_debug(&format!("JSON path: {path}"));
        self.response()?.assert_json_contains(path, expected)
    }

    /// Asserts that `path` selects at least one value in the last body.
    pub fn assert_json_present(&self, path: &str) -> ApiResult<&SessionResponse> {
        self.observer.on_debug(&format!("JSON path: {path}"));
        self.response()?.assert_json_present(path)
    }

    /// Asserts that `path` selects nothing in the last body.
    pub fn assert_json_absent(&self, path: &str) -> ApiResult<&SessionResponse> {
        self.observer.on_debug(&format!("JSON path: {path}"));
        self.response()?.assert_json_absent(path)
    }

    /// Asserts that the result of `path` has exactly the given key set.
    pub fn assert_keys_equal(&self, path: &str, keys: &[&str]) -> ApiResult<&SessionResponse> {
        self.observer.on_debug(&format!("JSON path: {path}"));
        self.response()?.assert_keys_equal(path, keys)
    }

    /// Asserts that the values selected by `path` deep-equal `expected`.
    pub fn assert_values_equal(&self, path: &str, expected: &Value) -> ApiResult<&SessionResponse> {
        self.observer.on_debug(&format!("JSON path: {path}"));
        self.response()?.assert_values_equal(path, expected)
    }

    /// Asserts that the result of `path` has exactly `expected` keys.
    pub fn assert_json_length(&self, path: &str, expected: usize) -> ApiResult<&SessionResponse> {
        self.observer.on_debug(&format!("JSON path: {path}"));
        self.response()?.assert_json_length(path, expected)
    }

    /// Asserts that the last body equals `expected` exactly.
    pub fn assert_text(&self, expected: &str) -> ApiResult<&SessionResponse> {
        self.response()?.assert_text(expected)
    }

    /// Asserts that the last body contains `expected`.
    pub fn assert_contains(&self, expected: &str) -> ApiResult<&SessionResponse> {
        self.response()?.assert_contains(expected)
    }

    /// Asserts that the named response header's value contains `expected`.
    pub fn assert_header_equals(&self, name: &str, expected: &str) -> ApiResult<&SessionResponse> {
        self.response()?.assert_header_equals(name, expected)
    }

    /// Asserts that the named response header is present.
    pub fn assert_header_exists(&self, name: &str) -> ApiResult<&SessionResponse> {
        self.response()?.assert_header_exists(name)
    }

    /// Asserts that the named response header is absent.
    pub fn assert_header_not_exists(&self, name: &str) -> ApiResult<&SessionResponse> {
        self.response()?.assert_header_not_exists(name)
    }

    /// Parses the last body as JSON and hands it to `transform` for masked
    /// comparison; see
    /// [`SessionResponse::modify_and_assert_json`].
    pub fn modify_and_assert_json<F>(&self, transform: F) -> ApiResult<&SessionResponse>
    where
        F: FnOnce(Value, &JsonComparer) -> ApiResult<()>,
    {
        self.response()?.modify_and_assert_json(transform)
    }
}
