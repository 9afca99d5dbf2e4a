//! Integration tests for the Tenet HTTP host.
//!
//! Uses axum-test to test the API handlers without starting a real server.

// Holding the MutexGuard across await in auth tests is intentional: tests that
// touch TENET_API_KEY are serialized.
#![allow(clippy::unwrap_used, clippy::panic, clippy::await_holding_lock)]

use axum::http::HeaderValue;
use axum_test::TestServer;
use serde_json::json;
use std::sync::Mutex;
use tenet::api::{
    API_KEY_ENV, AppState, CallRequest, DefineResponse, ErrorResponse, HealthResponse,
    QueryResponse, StatusResponse, create_router,
};
use tenet_core::{Bridge, OutputMode};

/// Mutex to serialize tests since some modify env vars.
static AUTH_TEST_MUTEX: Mutex<()> = Mutex::new(());

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Guard that holds the mutex and clears the API key on drop.
struct TestGuard {
    _guard: std::sync::MutexGuard<'static, ()>,
}

impl Drop for TestGuard {
    fn drop(&mut self) {
        // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
        unsafe { std::env::remove_var(API_KEY_ENV) };
    }
}

fn lock() -> TestGuard {
    let guard = AUTH_TEST_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    // SAFETY: Tests run sequentially under AUTH_TEST_MUTEX, so no concurrent env access.
    unsafe { std::env::remove_var(API_KEY_ENV) };
    TestGuard { _guard: guard }
}

/// Create a test server around a fresh bridge.
fn create_test_server(mode: OutputMode) -> (TestServer, TestGuard) {
    let guard = lock();
    let router = create_router(AppState::new(Bridge::new(mode)));
    (TestServer::new(router).unwrap(), guard)
}

/// Create a test server with `foo(1,2). bar("baz").` loaded.
fn create_populated_test_server(mode: OutputMode) -> (TestServer, TestGuard) {
    let guard = lock();
    let mut bridge = Bridge::new(mode);
    assert_eq!(bridge.define(&["foo(1, 2). bar(\"baz\")."]), None);
    let router = create_router(AppState::new(bridge));
    (TestServer::new(router).unwrap(), guard)
}

/// Create a test server with an API key configured.
fn create_auth_test_server(api_key: &str) -> TestServer {
    // SAFETY: Caller holds AUTH_TEST_MUTEX.
    unsafe { std::env::set_var(API_KEY_ENV, api_key) };
    let router = create_router(AppState::new(Bridge::default()));
    TestServer::new(router).unwrap()
}

// =============================================================================
// HEALTH ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (server, _guard) = create_test_server(OutputMode::Structured);

    let response = server.get("/health").await;

    response.assert_status_ok();
    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

// =============================================================================
// DEFINE ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_define_success_returns_null_error() {
    let (server, _guard) = create_test_server(OutputMode::Structured);

    let response = server
        .post("/define")
        .json(&CallRequest::single("edge(1,2). edge(2,3)."))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "error": null }));
}

#[tokio::test]
async fn test_define_syntax_error() {
    let (server, _guard) = create_test_server(OutputMode::Structured);

    let response = server.post("/define").json(&CallRequest::single("foo(")).await;

    assert_eq!(response.status_code().as_u16(), 400);
    let body: DefineResponse = response.json();
    let error = body.error.unwrap();
    assert!(error.starts_with("Error: "), "{}", error);
}

#[tokio::test]
async fn test_define_wrong_arity() {
    let (server, _guard) = create_test_server(OutputMode::Structured);

    let response = server
        .post("/define")
        .json(&json!({ "args": ["f(1).", "g(2)."] }))
        .await;
    assert_eq!(response.status_code().as_u16(), 400);
    let body: DefineResponse = response.json();
    assert_eq!(body.error.as_deref(), Some("Invalid number of arguments"));

    let response = server.post("/define").json(&json!({})).await;
    let body: DefineResponse = response.json();
    assert_eq!(body.error.as_deref(), Some("Invalid number of arguments"));

    // nothing was loaded
    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.facts, 0);
}

#[tokio::test]
async fn test_define_then_query_across_requests() {
    let (server, _guard) = create_test_server(OutputMode::Flat);

    server
        .post("/define")
        .json(&CallRequest::single("edge(1,2). edge(2,3)."))
        .await
        .assert_status_ok();
    server
        .post("/define")
        .json(&CallRequest::single(
            "path(X,Y) :- edge(X,Y). path(X,Z) :- path(X,Y), edge(Y,Z).",
        ))
        .await
        .assert_status_ok();

    let response = server
        .post("/query")
        .json(&CallRequest::single("path(1,X)"))
        .await;
    response.assert_status_ok();
    let body: QueryResponse = response.json();
    assert_eq!(body.result, "path(1,2)\npath(1,3)");
}

// =============================================================================
// QUERY ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_query_structured() {
    let (server, _guard) = create_populated_test_server(OutputMode::Structured);

    let response = server
        .post("/query")
        .json(&CallRequest::single("foo(X,Y)"))
        .await;

    response.assert_status_ok();
    let body: QueryResponse = response.json();
    assert_eq!(body.result, r#"[{"X":"1","Y":"2"}]"#);
}

#[tokio::test]
async fn test_query_flat() {
    let (server, _guard) = create_populated_test_server(OutputMode::Flat);

    let body: QueryResponse = server
        .post("/query")
        .json(&CallRequest::single("bar(X)"))
        .await
        .json();
    assert_eq!(body.result, "bar(\"baz\")");
}

#[tokio::test]
async fn test_query_no_solutions() {
    let (server, _guard) = create_populated_test_server(OutputMode::Structured);

    let body: QueryResponse = server
        .post("/query")
        .json(&CallRequest::single("foo(9,Y)"))
        .await
        .json();
    assert_eq!(body.result, "[]");
}

#[tokio::test]
async fn test_query_ground_marker() {
    let (server, _guard) = create_populated_test_server(OutputMode::Structured);

    let body: QueryResponse = server
        .post("/query")
        .json(&CallRequest::single("foo(1,2)"))
        .await
        .json();
    assert_eq!(body.result, "[{}]");
}

#[tokio::test]
async fn test_query_unknown_relation_keeps_session() {
    let (server, _guard) = create_populated_test_server(OutputMode::Structured);

    let response = server
        .post("/query")
        .json(&CallRequest::single("missing(X)"))
        .await;
    assert_eq!(response.status_code().as_u16(), 422);
    let body: QueryResponse = response.json();
    assert_eq!(body.result, "Error: unknown predicate missing/1");

    let body: QueryResponse = server
        .post("/query")
        .json(&CallRequest::single("foo(X,2)"))
        .await
        .json();
    assert_eq!(body.result, r#"[{"X":"1"}]"#);
}

#[tokio::test]
async fn test_query_non_string_argument_is_coerced() {
    let (server, _guard) = create_populated_test_server(OutputMode::Structured);

    // 42 becomes the text "42", which is not a valid query
    let response = server.post("/query").json(&json!({ "args": [42] })).await;
    assert_eq!(response.status_code().as_u16(), 400);
    let body: QueryResponse = response.json();
    assert!(body.result.starts_with("Error: "));
}

// =============================================================================
// STATUS ENDPOINT TESTS
// =============================================================================

#[tokio::test]
async fn test_status_reports_program() {
    let (server, _guard) = create_populated_test_server(OutputMode::Flat);

    server
        .post("/define")
        .json(&CallRequest::single("pair(X) :- foo(X, _)."))
        .await
        .assert_status_ok();

    let status: StatusResponse = server.get("/status").await.json();
    assert_eq!(status.mode, OutputMode::Flat);
    assert_eq!(status.facts, 2);
    assert_eq!(status.rules, 1);
    assert_eq!(status.derived, 1);
    assert_eq!(status.relations, vec!["bar/1", "foo/2", "pair/1"]);
}

// =============================================================================
// AUTHENTICATION TESTS
// =============================================================================

#[tokio::test]
async fn test_auth_valid_bearer_token() {
    let _guard = lock();
    let api_key = "test-secret-key-12345";
    let server = create_auth_test_server(api_key);

    let response = server
        .get("/status")
        .add_header(
            axum::http::header::AUTHORIZATION,
            format!("Bearer {}", api_key)
                .parse::<HeaderValue>()
                .unwrap(),
        )
        .await;

    response.assert_status_ok();
}

#[tokio::test]
async fn test_auth_invalid_token_rejected() {
    let _guard = lock();
    let server = create_auth_test_server("correct-key");

    let response = server
        .post("/query")
        .add_header(
            axum::http::header::AUTHORIZATION,
            "Bearer wrong-key".parse::<HeaderValue>().unwrap(),
        )
        .json(&CallRequest::single("f(X)"))
        .await;

    assert_eq!(response.status_code().as_u16(), 401);
}

#[tokio::test]
async fn test_auth_missing_header_rejected() {
    let _guard = lock();
    let server = create_auth_test_server("required-key");

    let response = server.post("/define").json(&CallRequest::single("f(1).")).await;

    assert_eq!(response.status_code().as_u16(), 401);
    let body: ErrorResponse = response.json();
    assert_eq!(body.error, "Error: unauthorized");
}

#[tokio::test]
async fn test_auth_health_is_public() {
    let _guard = lock();
    let server = create_auth_test_server("required-key");

    server.get("/health").await.assert_status_ok();
}
