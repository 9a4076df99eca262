//! Session configuration.
//!
//! A [`SessionConfig`] carries the base host every relative request path is
//! resolved against, plus arbitrary passthrough options for step definitions
//! that need environment-specific values (credentials, tenant ids, ...).

use indexmap::IndexMap;
use serde::Deserialize;

/// Configuration for an [`ApiSession`](crate::ApiSession).
///
/// # Example
///
/// ```
/// use gardenia_api::SessionConfig;
///
/// let config = SessionConfig::builder()
///     .host("http://api.test")
///     .option("tenant", serde_json::json!("acme"))
///     .build();
///
/// assert_eq!(config.host, "http://api.test");
/// assert_eq!(config.option("tenant"), Some(&serde_json::json!("acme")));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionConfig {
    /// Base URL prefixed to every request path that lacks its own host,
    /// e.g. `http://api.test`.
    pub host: String,

    /// Additional passthrough options, opaque to the session itself.
    #[serde(flatten, default)]
    pub options: IndexMap<String, serde_json::Value>,
}

impl SessionConfig {
    /// Creates a configuration with just a host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            options: IndexMap::new(),
        }
    }

    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    /// Looks up a passthrough option by key.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&serde_json::Value> {
        self.options.get(key)
    }
}

/// Builder for [`SessionConfig`].
#[derive(Debug, Default)]
#[must_use]
pub struct SessionConfigBuilder {
    host: String,
    options: IndexMap<String, serde_json::Value>,
}

impl SessionConfigBuilder {
    /// Sets the base host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Adds a passthrough option.
    pub fn option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> SessionConfig {
        SessionConfig {
            host: self.host,
            options: self.options,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let config = SessionConfig::new("http://localhost:8080");
        assert_eq!(config.host, "http://localhost:8080");
        assert!(config.options.is_empty());
    }

    #[test]
    fn test_builder() {
        let config = SessionConfig::builder()
            .host("http://api.test")
            .option("timeout_secs", serde_json::json!(30))
            .build();

        assert_eq!(config.host, "http://api.test");
        assert_eq!(config.option("timeout_secs"), Some(&serde_json::json!(30)));
        assert_eq!(config.option("missing"), None);
    }

    #[test]
    fn test_deserialize_with_passthrough() {
        let config: SessionConfig = serde_json::from_str(
            r#"{"host": "http://api.test", "env": "staging"}"#,
        )
        .unwrap();

        assert_eq!(config.host, "http://api.test");
        assert_eq!(config.option("env"), Some(&serde_json::json!("staging")));
    }
}
