//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tenet_core::primitives::ERROR_PREFIX;
use tenet_core::{EngineStats, OutputMode};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// STATUS RESPONSE
// =============================================================================

/// Session status response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub mode: OutputMode,
    pub predicates: usize,
    pub facts: usize,
    pub rules: usize,
    pub derived: usize,
    /// Known relations as `name/arity`.
    pub relations: Vec<String>,
}

impl StatusResponse {
    pub fn new(mode: OutputMode, stats: EngineStats, relations: Vec<String>) -> Self {
        Self {
            mode,
            predicates: stats.predicates,
            facts: stats.facts,
            rules: stats.rules,
            derived: stats.derived,
            relations,
        }
    }
}

// =============================================================================
// CALL REQUEST
// =============================================================================

/// Argument list of a host call, shared by `/define` and `/query`.
///
/// Arguments are taken as they arrive. Non-string JSON values are passed on
/// in their JSON text form; the bridge decides whether the count is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallRequest {
    #[serde(default)]
    pub args: Vec<Value>,
}

impl CallRequest {
    /// Single-argument request.
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            args: vec![Value::String(text.into())],
        }
    }

    /// Arguments as text.
    pub fn texts(&self) -> Vec<String> {
        crate::arg_texts(&self.args)
    }
}

// =============================================================================
// DEFINE RESPONSE
// =============================================================================

/// Define response. `error` is `null` on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefineResponse {
    pub error: Option<String>,
}

impl DefineResponse {
    pub fn success() -> Self {
        Self { error: None }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            error: Some(msg.into()),
        }
    }
}

// =============================================================================
// QUERY RESPONSE
// =============================================================================

/// Query response: the encoded solutions or the flattened error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub result: String,
}

impl QueryResponse {
    pub fn new(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of a call the host turned away before it reached the bridge
/// (missing key, throttled). Same `"Error: "` text as bridge failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(reason: impl std::fmt::Display) -> Self {
        Self {
            error: format!("{}{}", ERROR_PREFIX, reason),
        }
    }
}
