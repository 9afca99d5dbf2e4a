//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.

use super::{
    AppState,
    types::{CallRequest, DefineResponse, HealthResponse, QueryResponse, StatusResponse},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tenet_core::{ErrorKind, Operation, TenetError, flatten_error};

/// Status code for a rejected call. The body always carries the flattened
/// error, so hosts that ignore status codes see the same strings.
fn status_for(op: Operation, err: &TenetError) -> StatusCode {
    let kind = ErrorKind::classify(op, err);
    tracing::warn!(op = %op, kind = %kind, "{} rejected: {}", op, err);
    match kind {
        ErrorKind::Arity | ErrorKind::Load | ErrorKind::Parse => StatusCode::BAD_REQUEST,
        ErrorKind::Evaluation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Encoding => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// STATUS HANDLER
// =============================================================================

/// Get session status.
pub async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let bridge = state.bridge.read().await;
    let session = bridge.session();
    let relations = session
        .predicates()
        .iter()
        .map(ToString::to_string)
        .collect();

    let response = StatusResponse::new(bridge.mode(), session.stats(), relations);
    (StatusCode::OK, Json(response))
}

// =============================================================================
// DEFINE HANDLER
// =============================================================================

/// Load program text.
pub async fn define_handler(
    State(state): State<AppState>,
    Json(request): Json<CallRequest>,
) -> impl IntoResponse {
    let args = request.texts();

    let mut bridge = state.bridge.write().await;
    let outcome = bridge.try_define(&args);
    crate::trace_output(&bridge);

    match outcome {
        Ok(()) => (StatusCode::OK, Json(DefineResponse::success())),
        Err(e) => (
            status_for(Operation::Define, &e),
            Json(DefineResponse::error(flatten_error(&e))),
        ),
    }
}

// =============================================================================
// QUERY HANDLER
// =============================================================================

/// Evaluate a query.
pub async fn query_handler(
    State(state): State<AppState>,
    Json(request): Json<CallRequest>,
) -> impl IntoResponse {
    let args = request.texts();

    let bridge = state.bridge.read().await;
    match bridge.try_query(&args) {
        Ok(result) => (StatusCode::OK, Json(QueryResponse::new(result))),
        Err(e) => (
            status_for(Operation::Query, &e),
            Json(QueryResponse::new(flatten_error(&e))),
        ),
    }
}
