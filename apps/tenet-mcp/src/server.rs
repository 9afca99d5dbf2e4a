//! # Tenet MCP Server
//!
//! Implements `ServerHandler` with three tools that proxy to the HTTP host.

use crate::client::TenetClient;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    schemars, tool, tool_handler, tool_router,
};
use serde::Deserialize;
use serde_json::Value;

const ERROR_PREFIX: &str = "Error: ";
const ARITY_ERROR: &str = "Invalid number of arguments";

// =============================================================================
// MCP SERVER
// =============================================================================

/// MCP server that bridges to a Tenet HTTP host.
#[derive(Clone)]
pub struct TenetMcp {
    client: TenetClient,
    #[allow(dead_code)]
    tool_router: ToolRouter<Self>,
}

// =============================================================================
// TOOL PARAMETER STRUCTS
// =============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DefineParams {
    /// Datalog facts and rules, e.g. `edge(1,2). path(X,Y) :- edge(X,Y).`
    #[schemars(
        description = "Datalog facts and rules, e.g. 'edge(1,2). path(X,Y) :- edge(X,Y).'"
    )]
    pub program: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct QueryParams {
    /// A single atom; uppercase arguments are variables, e.g. `path(1, X)`.
    #[schemars(description = "A single atom; uppercase arguments are variables, e.g. 'path(1, X)'")]
    pub query: String,
}

// =============================================================================
// TOOL IMPLEMENTATIONS
// =============================================================================

#[tool_router]
impl TenetMcp {
    pub fn new(client: TenetClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(description = "Load Datalog facts and rules into the Tenet session")]
    async fn tenet_define(
        &self,
        params: Parameters<DefineParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.client.define(&params.0.program).await {
            Ok(None) => Ok(CallToolResult::success(vec![Content::text("Loaded.")])),
            Ok(Some(err)) => Ok(CallToolResult::error(vec![Content::text(err)])),
            Err(e) => Err(McpError::internal_error(format!("{e}"), None)),
        }
    }

    #[tool(description = "Ask which facts match an atom; returns variable bindings or matching facts")]
    async fn tenet_query(
        &self,
        params: Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        match self.client.query(&params.0.query).await {
            Ok(result) if is_bridge_error(&result) => {
                Ok(CallToolResult::error(vec![Content::text(result)]))
            }
            Ok(result) => Ok(CallToolResult::success(vec![Content::text(
                format_query_result(&result),
            )])),
            Err(e) => Err(McpError::internal_error(format!("{e}"), None)),
        }
    }

    #[tool(description = "Get session statistics (predicates, facts, rules, derived facts)")]
    async fn tenet_status(&self) -> Result<CallToolResult, McpError> {
        match self.client.status().await {
            Ok(resp) => Ok(CallToolResult::success(vec![Content::text(
                format_status(&resp),
            )])),
            Err(e) => Err(McpError::internal_error(format!("{e}"), None)),
        }
    }
}

// =============================================================================
// SERVER HANDLER
// =============================================================================

#[tool_handler]
impl ServerHandler for TenetMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Tenet Datalog engine. Use tenet_define to load facts and rules, \
                 tenet_query to ask which facts match an atom, and tenet_status \
                 to see what is loaded."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// =============================================================================
// RESPONSE FORMATTING
// =============================================================================

fn is_bridge_error(result: &str) -> bool {
    result.starts_with(ERROR_PREFIX) || result == ARITY_ERROR
}

/// Render a query result for a human reader.
///
/// Structured results become one `X = 1, Y = 2` line per solution; flat
/// results are already one fact per line.
fn format_query_result(result: &str) -> String {
    if result.is_empty() || result == "[]" {
        return "No solutions.".to_string();
    }
    if result == "[{}]" {
        return "Yes (no variables to bind).".to_string();
    }

    let Ok(Value::Array(rows)) = serde_json::from_str::<Value>(result) else {
        let count = result.lines().count();
        return format!("{count} solution(s):\n{result}");
    };

    let lines: Vec<String> = rows
        .iter()
        .filter_map(|row| row.as_object())
        .map(|bindings| {
            bindings
                .iter()
                .map(|(var, value)| format!("{var} = {}", value.as_str().unwrap_or("?")))
                .collect::<Vec<_>>()
                .join(", ")
        })
        .collect();
    format!("{} solution(s):\n{}", lines.len(), lines.join("\n"))
}

fn format_status(resp: &Value) -> String {
    let field = |name: &str| resp.get(name).and_then(|v| v.as_u64()).unwrap_or(0);
    let mode = resp.get("mode").and_then(|v| v.as_str()).unwrap_or("?");
    let relations = resp
        .get("relations")
        .and_then(|v| v.as_array())
        .map(|rels| {
            rels.iter()
                .filter_map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        })
        .unwrap_or_default();

    format!(
        "Session Status:\n  Mode: {mode}\n  Predicates: {}\n  Facts: {}\n  Rules: {}\n  Derived: {}\n  Relations: {relations}",
        field("predicates"),
        field("facts"),
        field("rules"),
        field("derived"),
    )
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_results() {
        assert_eq!(format_query_result(""), "No solutions.");
        assert_eq!(format_query_result("[]"), "No solutions.");
        assert_eq!(format_query_result("[{}]"), "Yes (no variables to bind).");
    }

    #[test]
    fn structured_results() {
        let text = format_query_result(r#"[{"X":"1","Y":"2"},{"X":"3","Y":"4"}]"#);
        assert_eq!(text, "2 solution(s):\nX = 1, Y = 2\nX = 3, Y = 4");
    }

    #[test]
    fn flat_results() {
        let text = format_query_result("f(1,2)\nf(3,4)");
        assert_eq!(text, "2 solution(s):\nf(1,2)\nf(3,4)");
    }

    #[test]
    fn bridge_errors_are_detected() {
        assert!(is_bridge_error("Error: unknown predicate g/1"));
        assert!(is_bridge_error("Invalid number of arguments"));
        assert!(!is_bridge_error("[]"));
    }

    #[test]
    fn status_text() {
        let resp = serde_json::json!({
            "mode": "flat", "predicates": 2, "facts": 3, "rules": 1, "derived": 2,
            "relations": ["edge/2", "path/2"]
        });
        let text = format_status(&resp);
        assert!(text.contains("Mode: flat"));
        assert!(text.contains("Facts: 3"));
        assert!(text.contains("Relations: edge/2, path/2"));
    }
}
