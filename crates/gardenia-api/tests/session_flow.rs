//! End-to-end session flows against an in-memory transport.

use bytes::Bytes;
use gardenia_api::{
    ApiSession, MockTransport, SessionConfig, SessionObserver, Table, TransportRequest,
    TransportResponse,
};
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use serde_json::json;
use std::sync::{Arc, Mutex};

fn config() -> SessionConfig {
    SessionConfig::new("http://api.test")
}

/// Transport that records every request and replies from a fixed script.
fn scripted(
    responses: Vec<TransportResponse>,
) -> (MockTransport, Arc<Mutex<Vec<TransportRequest>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let script = Arc::new(Mutex::new(responses));
    let sink = Arc::clone(&requests);
    let transport = MockTransport::new(move |req| {
        let sink = Arc::clone(&sink);
        let script = Arc::clone(&script);
        async move {
            sink.lock().unwrap().push(req);
            Ok(script.lock().unwrap().remove(0))
        }
    });
    (transport, requests)
}

fn json_response(status: u16, body: &str) -> TransportResponse {
    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    TransportResponse {
        status: StatusCode::from_u16(status).unwrap(),
        headers,
        body: Some(Bytes::from(body.to_string())),
    }
}

#[tokio::test]
async fn full_scenario_build_call_assert_rebuild() {
    let (transport, requests) = scripted(vec![
        json_response(200, r#"{"items":[{"id":1,"name":"tea"},{"id":2,"name":"mate"}]}"#),
        json_response(201, r#"{"id":3,"name":"coffee"}"#),
    ]);
    let mut session = ApiSession::with_transport(config(), transport);

    // First request: list with a query parameter.
    session.add_parameters([("page", "1")]);
    session.get("/items").await.unwrap();

    session.assert_status(200).unwrap();
    session.assert_content_type("application/json").unwrap();
    session.assert_json_length("items", 2).unwrap();
    session
        .assert_json_contains("items.0.name", &json!("tea"))
        .unwrap();
    session
        .assert_values_equal("items.name", &json!(["tea", "mate"]))
        .unwrap();
    session
        .assert_keys_equal("items.0", &["id", "name"])
        .unwrap();
    session.assert_json_present("items.1.id").unwrap();
    session.assert_json_absent("items.9").unwrap();

    // Second request: create, with a fresh pending state.
    session.set_body(r#"{"name":"coffee"}"#);
    session.add_headers([("content-type", "application/json")]);
    session.post("/items").await.unwrap();
    session.assert_status(201).unwrap();

    let log = requests.lock().unwrap();
    assert_eq!(log[0].url, "http://api.test/items?page=1");
    assert_eq!(log[0].method, Method::GET);
    // The page parameter did not leak into the second request.
    assert_eq!(log[1].url, "http://api.test/items");
    assert_eq!(log[1].body.as_deref(), Some(r#"{"name":"coffee"}"#));
}

#[tokio::test]
async fn global_state_spans_requests_but_pending_does_not() {
    let (transport, requests) = scripted(vec![
        json_response(200, "{}"),
        json_response(200, "{}"),
    ]);
    let mut session = ApiSession::with_transport(config(), transport);

    session.add_global_parameters([("tenant", "acme")]);
    session.add_global_headers([("x-api-key", "secret")]);

    session.add_headers([("x-request-id", "one")]);
    session.get("/a").await.unwrap();
    session.get("/b").await.unwrap();

    let log = requests.lock().unwrap();
    assert_eq!(log[0].url, "http://api.test/a?tenant=acme");
    assert_eq!(log[0].headers.get("x-request-id").unwrap(), "one");
    assert_eq!(log[1].url, "http://api.test/b?tenant=acme");
    assert_eq!(log[1].headers.get("x-api-key").unwrap(), "secret");
    assert!(log[1].headers.get("x-request-id").is_none());
}

#[tokio::test]
async fn tabular_fixtures_feed_headers_and_body() {
    let (transport, requests) = scripted(vec![json_response(200, "{}")]);
    let mut session = ApiSession::with_transport(config(), transport);

    let headers = Table::new(vec![
        vec!["header".into(), "value".into()],
        vec!["X-Custom".into(), "yes".into()],
    ]);
    let body: Table = [("a", "1"), ("b", "two words")].into_iter().collect();

    session.add_headers(headers);
    session.set_body(body);
    session.post("/form").await.unwrap();

    let log = requests.lock().unwrap();
    assert_eq!(log[0].headers.get("x-custom").unwrap(), "yes");
    assert_eq!(log[0].body.as_deref(), Some("a=1&b=two%20words"));
}

#[tokio::test]
async fn absolute_url_bypasses_configured_host() {
    let (transport, requests) = scripted(vec![json_response(200, "{}")]);
    let mut session = ApiSession::with_transport(config(), transport);

    session.get("http://other.test/status?probe=1").await.unwrap();

    assert_eq!(
        requests.lock().unwrap()[0].url,
        "http://other.test/status?probe=1"
    );
}

#[tokio::test]
async fn response_header_assertions_are_case_insensitive() {
    let (transport, _requests) = scripted(vec![json_response(200, "{}")]);
    let mut session = ApiSession::with_transport(config(), transport);

    session.get("/items").await.unwrap();
    session.assert_header_exists("content-type").unwrap();
    session.assert_header_exists("Content-Type").unwrap();
    session
        .assert_header_equals("CONTENT-TYPE", "json")
        .unwrap();
    session.assert_header_not_exists("x-absent").unwrap();
}

#[tokio::test]
async fn masked_json_comparison() {
    let (transport, _requests) = scripted(vec![json_response(
        201,
        r#"{"id":"a1b2c3","name":"tea","created_at":"2026-08-25T09:30:00Z"}"#,
    )]);
    let mut session = ApiSession::with_transport(config(), transport);

    session.post("/items").await.unwrap();
    session
        .modify_and_assert_json(|mut actual, compare| {
            actual["id"] = json!("<id>");
            actual["created_at"] = json!("<ts>");
            compare.compare(
                r#"{"id":"<id>","name":"tea","created_at":"<ts>"}"#,
                &actual,
            )
        })
        .unwrap();
}

#[tokio::test]
async fn observer_sees_request_and_response() {
    struct Recorder {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl SessionObserver for Recorder {
        fn on_request(
            &self,
            method: &Method,
            url: &str,
            _headers: &HeaderMap,
            _body: Option<&str>,
        ) {
            self.events.lock().unwrap().push(format!("{method} {url}"));
        }

        fn on_response(&self, response: &gardenia_api::SessionResponse) {
            self.events
                .lock()
                .unwrap()
                .push(format!("status {}", response.status_code()));
        }
    }

    let events = Arc::new(Mutex::new(Vec::new()));
    let (transport, _requests) = scripted(vec![json_response(204, "{}")]);
    let mut session = ApiSession::with_transport(config(), transport).with_observer(Recorder {
        events: Arc::clone(&events),
    });

    session.delete("/items/1").await.unwrap();

    let events = events.lock().unwrap();
    assert_eq!(events[0], "DELETE http://api.test/items/1");
    assert_eq!(events[1], "status 204");
}

#[tokio::test]
async fn transport_failure_leaves_previous_response_readable() {
    // First call succeeds, second fails at the transport.
    let flaky_calls = Arc::new(Mutex::new(0usize));
    let calls = Arc::clone(&flaky_calls);
    let flaky = MockTransport::new(move |_req| {
        let calls = Arc::clone(&calls);
        async move {
            let mut count = calls.lock().unwrap();
            *count += 1;
            if *count == 1 {
                Ok(TransportResponse {
                    status: StatusCode::OK,
                    headers: HeaderMap::new(),
                    body: Some(Bytes::from("first")),
                })
            } else {
                Err(gardenia_api::ApiError::Transport("boom".to_string()))
            }
        }
    });

    let mut session = ApiSession::with_transport(config(), flaky);
    session.get("/one").await.unwrap();
    let err = session.get("/two").await.unwrap_err();
    assert!(err.is_transport());

    // The earlier response is still there and assertions still work.
    session.assert_status(200).unwrap();
    session.assert_text("first").unwrap();
}
