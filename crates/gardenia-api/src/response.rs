//! Captured responses and the assertion family.

use crate::error::{ApiError, ApiResult};
use crate::json_path;
use http::{header, HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// The response captured by the most recent terminal HTTP call.
///
/// Header names are stored lower-cased by [`HeaderMap`], so all header
/// assertions are case-insensitive. The body is always a string; exchanges
/// that carried none (e.g. HEAD) yield the empty string.
///
/// Every assertion is a pure read: it either returns `&self` for further
/// chaining or an [`ApiError::Assertion`] describing the mismatch, and
/// repeating an assertion without an intervening request gives the same
/// result.
pub struct SessionResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl SessionResponse {
    /// Creates a response from raw parts.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: String) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status code as a u16.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns a reference to the headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Gets a header value as a string, case-insensitively.
    #[must_use]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header_str(header::CONTENT_TYPE.as_str())
    }

    /// Returns the body text.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_str(&self.body).map_err(ApiError::from)
    }

    /// Parses the body as a JSON value.
    pub fn json_value(&self) -> ApiResult<Value> {
        self.json()
    }

    fn matches(&self, path: &str) -> ApiResult<Vec<Value>> {
        let document = self.json_value()?;
        Ok(json_path::apply(path, &document))
    }

    // Assertions

    /// Asserts that the status code equals `expected`.
    pub fn assert_status(&self, expected: u16) -> ApiResult<&Self> {
        if self.status_code() == expected {
            Ok(self)
        } else {
            Err(ApiError::assertion(format!(
                "expected status {expected}, got {}",
                self.status_code()
            )))
        }
    }

    /// Asserts that the status code differs from `unexpected`.
    pub fn assert_status_not(&self, unexpected: u16) -> ApiResult<&Self> {
        if self.status_code() == unexpected {
            Err(ApiError::assertion(format!(
                "expected status other than {unexpected}"
            )))
        } else {
            Ok(self)
        }
    }

    /// Asserts that the Content-Type header contains `expected`.
    pub fn assert_content_type(&self, expected: &str) -> ApiResult<&Self> {
        let actual = self
            .content_type()
            .ok_or_else(|| ApiError::assertion("content-type header not present".to_string()))?;
        if actual.contains(expected) {
            Ok(self)
        } else {
            Err(ApiError::assertion(format!(
                "content-type '{actual}' does not contain '{expected}'"
            )))
        }
    }

    /// Asserts that the body parses as JSON deep-equal to `expected`.
    ///
    /// Comparison is structural, so object key order never matters.
    pub fn assert_json(&self, expected: &Value) -> ApiResult<&Self> {
        let actual = self.json_value()?;
        if actual == *expected {
            Ok(self)
        } else {
            Err(ApiError::assertion(format!(
                "json mismatch: expected {expected}, got {actual}"
            )))
        }
    }

    /// Asserts that the values selected by `path` equal `expected`.
    ///
    /// A single match is compared directly; multiple matches are compared as
    /// an array.
    pub fn assert_json_contains(&self, path: &str, expected: &Value) -> ApiResult<&Self> {
        let matches = self.matches(path)?;
        let direct_hit = matches.len() == 1 && matches[0] == *expected;
        if direct_hit || Value::Array(matches.clone()) == *expected {
            Ok(self)
        } else {
            Err(ApiError::assertion(format!(
                "path '{path}' selected {}, expected {expected}",
                Value::Array(matches)
            )))
        }
    }

    /// Asserts that `path` selects at least one value.
    pub fn assert_json_present(&self, path: &str) -> ApiResult<&Self> {
        if self.matches(path)?.is_empty() {
            Err(ApiError::assertion(format!(
                "element '{path}' is not present"
            )))
        } else {
            Ok(self)
        }
    }

    /// Asserts that `path` selects nothing.
    pub fn assert_json_absent(&self, path: &str) -> ApiResult<&Self> {
        if self.matches(path)?.is_empty() {
            Ok(self)
        } else {
            Err(ApiError::assertion(format!("element '{path}' is present")))
        }
    }

    /// Asserts that the result of `path` has exactly the given key set.
    ///
    /// A single object match contributes its field names; any other result
    /// contributes its match indices.
    pub fn assert_keys_equal(&self, path: &str, keys: &[&str]) -> ApiResult<&Self> {
        let matches = self.matches(path)?;
        let actual = result_keys(&matches);
        if actual.len() != keys.len() {
            return Err(ApiError::assertion(format!(
                "path '{path}' has {} keys, expected {}",
                actual.len(),
                keys.len()
            )));
        }
        for key in keys {
            if !actual.iter().any(|k| k == key) {
                return Err(ApiError::assertion(format!(
                    "path '{path}' is missing key '{key}'"
                )));
            }
        }
        Ok(self)
    }

    /// Asserts that the values selected by `path` deep-equal `expected`.
    ///
    /// An array `expected` is compared against all matches; anything else is
    /// compared against a sole match.
    pub fn assert_values_equal(&self, path: &str, expected: &Value) -> ApiResult<&Self> {
        let matches = self.matches(path)?;
        let holds = if expected.is_array() {
            Value::Array(matches.clone()) == *expected
        } else {
            matches.len() == 1 && matches[0] == *expected
        };
        if holds {
            Ok(self)
        } else {
            Err(ApiError::assertion(format!(
                "path '{path}' selected {}, expected {expected}",
                Value::Array(matches)
            )))
        }
    }

    /// Asserts that the result of `path` has exactly `expected` keys.
    pub fn assert_json_length(&self, path: &str, expected: usize) -> ApiResult<&Self> {
        let matches = self.matches(path)?;
        let actual = result_keys(&matches).len();
        if actual == expected {
            Ok(self)
        } else {
            Err(ApiError::assertion(format!(
                "path '{path}' has length {actual}, expected {expected}"
            )))
        }
    }

    /// Asserts that the body equals `expected` exactly.
    pub fn assert_text(&self, expected: &str) -> ApiResult<&Self> {
        if self.body == expected {
            Ok(self)
        } else {
            Err(ApiError::assertion(format!(
                "body mismatch: expected '{expected}', got '{}'",
                self.body
            )))
        }
    }

    /// Asserts that the body contains `expected` as a substring.
    pub fn assert_contains(&self, expected: &str) -> ApiResult<&Self> {
        if self.body.contains(expected) {
            Ok(self)
        } else {
            Err(ApiError::assertion(format!(
                "body does not contain '{expected}': {}",
                self.body
            )))
        }
    }

    /// Asserts that the named header's value contains `expected`.
    pub fn assert_header_equals(&self, name: &str, expected: &str) -> ApiResult<&Self> {
        let actual = self
            .header_str(name)
            .ok_or_else(|| ApiError::assertion(format!("header '{name}' not present")))?;
        if actual.contains(expected) {
            Ok(self)
        } else {
            Err(ApiError::assertion(format!(
                "header '{name}': '{actual}' does not contain '{expected}'"
            )))
        }
    }

    /// Asserts that the named header is present.
    pub fn assert_header_exists(&self, name: &str) -> ApiResult<&Self> {
        if self.headers.contains_key(name) {
            Ok(self)
        } else {
            Err(ApiError::assertion(format!("header '{name}' not present")))
        }
    }

    /// Asserts that the named header is absent.
    pub fn assert_header_not_exists(&self, name: &str) -> ApiResult<&Self> {
        if self.headers.contains_key(name) {
            Err(ApiError::assertion(format!(
                "header '{name}' unexpectedly present"
            )))
        } else {
            Ok(self)
        }
    }

    /// Parses the body as JSON and hands it to `transform` together with a
    /// [`JsonComparer`], letting the caller mask non-deterministic fields
    /// (timestamps, generated ids) before deep-comparing.
    ///
    /// # Example
    ///
    /// ```
    /// use gardenia_api::SessionResponse;
    /// use http::{HeaderMap, StatusCode};
    ///
    /// let response = SessionResponse::new(
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     "{\"id\":\"f81d4fae\",\"name\":\"alice\"}".to_string(),
    /// );
    ///
    /// response
    ///     .modify_and_assert_json(|mut actual, compare| {
    ///         actual["id"] = serde_json::json!("<masked>");
    ///         compare.compare("{\"id\":\"<masked>\",\"name\":\"alice\"}", &actual)
    ///     })
    ///     .unwrap();
    /// ```
    pub fn modify_and_assert_json<F>(&self, transform: F) -> ApiResult<&Self>
    where
        F: FnOnce(Value, &JsonComparer) -> ApiResult<()>,
    {
        let actual = self.json_value()?;
        transform(actual, &JsonComparer)?;
        Ok(self)
    }
}

impl fmt::Debug for SessionResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}

/// Deep-equality helper handed to
/// [`modify_and_assert_json`](SessionResponse::modify_and_assert_json)
/// transforms.
#[derive(Debug, Clone, Copy)]
pub struct JsonComparer;

impl JsonComparer {
    /// Parses `expected_text` as JSON and deep-compares it to `modified`.
    pub fn compare(&self, expected_text: &str, modified: &Value) -> ApiResult<()> {
        let expected: Value = serde_json::from_str(expected_text)?;
        if expected == *modified {
            Ok(())
        } else {
            Err(ApiError::assertion(format!(
                "json mismatch: expected {expected}, got {modified}"
            )))
        }
    }
}

/// Key set of a JSON-path result: a single object match contributes its
/// field names, anything else contributes the match indices.
fn result_keys(matches: &[Value]) -> Vec<String> {
    match matches {
        [Value::Object(map)] => map.keys().cloned().collect(),
        other => (0..other.len()).map(|i| i.to_string()).collect(),
    }
}
