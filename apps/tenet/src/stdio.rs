//! # Stdio Host
//!
//! JSON lines in, JSON lines out. One request per line:
//!
//! ```text
//! {"op":"define","args":["edge(1,2)."]}   → {"result":null}
//! {"op":"query","args":["edge(X,Y)"]}     → {"result":"[{\"X\":\"1\",\"Y\":\"2\"}]"}
//! {"op":"status"}                         → {"result":"{\"predicates\":1,...}"}
//! {"op":"run","args":["a(1). a(X)."]}      → {"result":"{\"status\":\"success\",...}"}
//! ```
//!
//! `run` evaluates a self-contained program in a throwaway interpreter and
//! leaves the session alone.
//!
//! Malformed lines and unknown ops get an `"Error: ..."` result; the loop
//! keeps going until stdin closes. Blank lines are ignored.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tenet_core::primitives::{ARITY_ERROR, ERROR_PREFIX};
use tenet_core::{Bridge, TenetError, run_program_json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

// =============================================================================
// WIRE TYPES
// =============================================================================

/// One request line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StdioRequest {
    pub op: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

/// One reply line. `result` is `null` only for a successful define.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StdioReply {
    pub result: Option<String>,
}

impl StdioReply {
    fn error(msg: impl std::fmt::Display) -> Self {
        Self {
            result: Some(format!("{}{}", ERROR_PREFIX, msg)),
        }
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Handle one request line.
pub fn handle_line(bridge: &mut Bridge, line: &str) -> StdioReply {
    let request: StdioRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => return StdioReply::error(format!("malformed request: {}", e)),
    };
    let args = crate::arg_texts(&request.args);

    let reply = match request.op.as_str() {
        "define" => StdioReply {
            result: bridge.define(&args),
        },
        "query" => StdioReply {
            result: Some(bridge.query(&args)),
        },
        "status" => match serde_json::to_string(&bridge.session().stats()) {
            Ok(json) => StdioReply { result: Some(json) },
            Err(e) => StdioReply::error(e),
        },
        "run" => match args.as_slice() {
            [program] => StdioReply {
                result: Some(run_program_json(program)),
            },
            _ => StdioReply {
                result: Some(ARITY_ERROR.to_string()),
            },
        },
        other => StdioReply::error(format!("unknown op '{}'", other)),
    };
    crate::trace_output(bridge);
    reply
}

/// Serve requests from `reader` until end of input.
///
/// Returns the number of requests answered.
pub async fn serve<R, W>(bridge: &mut Bridge, reader: R, mut writer: W) -> Result<usize, TenetError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut answered = 0;

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| TenetError::IoError(format!("stdin: {}", e)))?
    {
        if line.trim().is_empty() {
            continue;
        }

        let reply = handle_line(bridge, &line);
        let mut out = serde_json::to_string(&reply)
            .map_err(|e| TenetError::Encoding(e.to_string()))?;
        out.push('\n');

        writer
            .write_all(out.as_bytes())
            .await
            .map_err(|e| TenetError::IoError(format!("stdout: {}", e)))?;
        writer
            .flush()
            .await
            .map_err(|e| TenetError::IoError(format!("stdout: {}", e)))?;
        answered += 1;
    }

    tracing::info!("stdin closed after {} requests", answered);
    Ok(answered)
}

// =============================================================================
// TESTS
// =============================================================================
