//! Session observation hooks.
//!
//! The session reports request/response lifecycle events through a
//! [`SessionObserver`] instead of logging directly, so embedding test
//! frameworks can route them wherever they like. [`TracingObserver`] is the
//! default and forwards everything to [`tracing`] at debug level.

use crate::response::SessionResponse;
use http::{HeaderMap, Method};

/// Receives session lifecycle events.
///
/// All methods default to no-ops; implement only what you need.
pub trait SessionObserver: Send + Sync {
    /// Called just before a request is handed to the transport.
    fn on_request(&self, _method: &Method, _url: &str, _headers: &HeaderMap, _body: Option<&str>) {}

    /// Called after a response has been captured.
    fn on_response(&self, _response: &SessionResponse) {}

    /// Called for miscellaneous diagnostics (e.g. JSON-path selections).
    fn on_debug(&self, _message: &str) {}
}

/// Observer that emits [`tracing`] debug events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn on_request(&self, method: &Method, url: &str, headers: &HeaderMap, body: Option<&str>) {
        tracing::debug!(%method, url, headers = ?headers, "issuing request");
        if let Some(body) = body {
            tracing::debug!(body, "with body");
        }
    }

    fn on_response(&self, response: &SessionResponse) {
        tracing::debug!(
            status = response.status_code(),
            body_len = response.body().len(),
            "captured response"
        );
    }

    fn on_debug(&self, message: &str) {
        tracing::debug!("{message}");
    }
}

/// Observer that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SessionObserver for NoopObserver {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingObserver {
        debug_events: Arc<AtomicUsize>,
    }

    impl SessionObserver for CountingObserver {
        fn on_debug(&self, _message: &str) {
            self.debug_events.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_default_methods_are_noops() {
        let observer = NoopObserver;
        observer.on_debug("ignored");
        observer.on_request(&Method::GET, "http://api.test", &HeaderMap::new(), None);
    }

    #[test]
    fn test_custom_observer_receives_events() {
        let counter = Arc::new(AtomicUsize::new(0));
        let observer = CountingObserver {
            debug_events: Arc::clone(&counter),
        };
        observer.on_debug("one");
        observer.on_debug("two");
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
