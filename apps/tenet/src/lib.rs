//! # Tenet Hosts
//!
//! Everything that puts a [`tenet_core::Bridge`] in front of a caller:
//!
//! - `api`: HTTP host (`POST /define`, `POST /query`)
//! - `stdio`: JSON-lines host on stdin/stdout
//! - `cli`: argument parsing and command dispatch
//! - `config`: TOML configuration and preloading

pub mod api;
pub mod cli;
pub mod config;
pub mod stdio;

use serde_json::Value;
use tenet_core::{Bridge, Engine};

/// Call arguments as text: strings verbatim, anything else as its JSON text.
///
/// Non-string arguments are not rejected here; only their count matters to
/// the bridge.
pub fn arg_texts(args: &[Value]) -> Vec<String> {
    args.iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect()
}

/// Drain engine diagnostics and emit them as debug events.
pub fn trace_output<E: Engine>(bridge: &Bridge<E>) {
    for line in bridge.drain_output() {
        tracing::debug!(target: "tenet::engine", "{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn arg_texts_keep_strings_verbatim() {
        let args = vec![json!("f(\"x\")."), json!(7), json!({"k": [1]}), json!(null)];
        assert_eq!(
            arg_texts(&args),
            vec!["f(\"x\").", "7", r#"{"k":[1]}"#, "null"]
        );
    }
}
