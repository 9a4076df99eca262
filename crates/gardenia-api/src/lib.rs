//! # Gardenia API
//!
//! A fluent HTTP request/response session for BDD-style API tests. The crate
//! is step-definition glue: a [`ApiSession`] issues requests against a
//! configured host, captures the response, and exposes chained assertions
//! over status code, headers, and JSON or text body content.
//!
//! ## Key Features
//!
//! - **Stateful Session**: one instance per scenario; builder calls
//!   accumulate parameters, headers, and a body for the next request
//! - **Chained Assertions**: every assertion returns the response for `?`
//!   chaining and fails with a descriptive error
//! - **Data Tables**: row-oriented fixtures from BDD runners convert into
//!   parameters, headers, and form bodies
//! - **Pluggable Transport**: real requests through [`reqwest`], or
//!   [`MockTransport`] for tests that must not touch the network
//! - **JSON Path Queries**: dotted-path selection over JSON bodies for
//!   targeted assertions
//!
//! ## Example
//!
//! ```ignore
//! use gardenia_api::{ApiSession, SessionConfig};
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_list_items() -> gardenia_api::ApiResult<()> {
//!     let mut session = ApiSession::new(SessionConfig::new("http://api.test"));
//!
//!     session.add_global_headers([("authorization", "Bearer token")]);
//!     session.add_parameters([("page", "1")]);
//!     session.get("/items").await?;
//!
//!     session.assert_status(200)?;
//!     session.assert_content_type("application/json")?;
//!     session.assert_json_contains("items.0.name", &json!("first"))?;
//!     Ok(())
//! }
//! ```
//!
//! ## Session Lifecycle
//!
//! ```text
//! build request state → terminal HTTP call → captured response → assertions
//!        ^                                                          |
//!        └──────────────────── next request ───────────────────────┘
//! ```
//!
//! The pending request is consumed by exactly one terminal call; the
//! captured response stays readable until the next terminal call replaces
//! it. One session drives one linear scenario — it is not meant to be shared
//! across concurrent test flows.

#![doc(html_root_url = "https://docs.rs/gardenia-api/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
pub mod json_path;
mod observer;
mod response;
mod session;
mod table;
mod transport;

pub use config::{SessionConfig, SessionConfigBuilder};
pub use error::{ApiError, ApiResult};
pub use observer::{NoopObserver, SessionObserver, TracingObserver};
pub use response::{JsonComparer, SessionResponse};
pub use session::{ApiSession, Globals};
pub use table::{KeyValues, RequestBody, Table};
pub use transport::{
    MockHandler, MockTransport, ReqwestTransport, Transport, TransportRequest, TransportResponse,
};
