//! Unit tests for API types serialization/deserialization.

#![allow(clippy::unwrap_used, clippy::panic)]

use serde_json::json;
use tenet::api::{CallRequest, DefineResponse, HealthResponse, QueryResponse, StatusResponse};
use tenet_core::{EngineStats, OutputMode};

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_health_response_deserialization() {
    let json = r#"{"status":"healthy","version":"1.0.0"}"#;
    let health: HealthResponse = serde_json::from_str(json).unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, "1.0.0");
}

// =============================================================================
// CALL REQUEST TESTS
// =============================================================================

#[test]
fn test_call_request_single() {
    let request = CallRequest::single("f(X)");
    assert_eq!(serde_json::to_value(&request).unwrap(), json!({ "args": ["f(X)"] }));
    assert_eq!(request.texts(), vec!["f(X)"]);
}

#[test]
fn test_call_request_missing_args_is_empty() {
    let request: CallRequest = serde_json::from_str("{}").unwrap();
    assert!(request.args.is_empty());
    assert!(request.texts().is_empty());
}

#[test]
fn test_call_request_non_strings_keep_json_text() {
    let request: CallRequest =
        serde_json::from_value(json!({ "args": ["a", 1, true, null] })).unwrap();
    assert_eq!(request.texts(), vec!["a", "1", "true", "null"]);
}

// =============================================================================
// DEFINE RESPONSE TESTS
// =============================================================================

#[test]
fn test_define_response_success_serializes_null() {
    let json = serde_json::to_string(&DefineResponse::success()).unwrap();
    assert_eq!(json, r#"{"error":null}"#);
}

#[test]
fn test_define_response_error() {
    let response = DefineResponse::error("Error: syntax error at 1:5: expected term");
    let back: DefineResponse =
        serde_json::from_str(&serde_json::to_string(&response).unwrap()).unwrap();
    assert_eq!(back, response);
}

// =============================================================================
// QUERY RESPONSE TESTS
// =============================================================================

#[test]
fn test_query_response_keeps_result_as_string() {
    let response = QueryResponse::new(r#"[{"X":"1"}]"#);
    let json = serde_json::to_string(&response).unwrap();
    assert_eq!(json, r#"{"result":"[{\"X\":\"1\"}]"}"#);
}

// =============================================================================
// STATUS RESPONSE TESTS
// =============================================================================

#[test]
fn test_status_response_from_stats() {
    let stats = EngineStats {
        predicates: 3,
        facts: 10,
        rules: 2,
        derived: 7,
    };
    let status = StatusResponse::new(OutputMode::Flat, stats, vec!["edge/2".to_string()]);
    let value = serde_json::to_value(&status).unwrap();

    assert_eq!(value["mode"], "flat");
    assert_eq!(value["facts"], 10);
    assert_eq!(value["derived"], 7);
    assert_eq!(value["relations"], json!(["edge/2"]));
}
