//! # Tenet WASM bindings
//!
//! One [`TenetSession`] wraps one [`Bridge`]. `define` and `query` take the
//! raw JavaScript argument list so the arity contract holds exactly as it
//! does for every other host: anything but one argument yields the sentinel.
//!
//! Engine diagnostics are forwarded to `console.debug`.

use tenet_core::{Bridge, OutputMode, run_program_json};
use wasm_bindgen::prelude::*;

/// Install the panic hook once the module is instantiated.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Text of one JavaScript argument.
///
/// Strings pass through; other values use their JSON text (`42`, `true`).
/// Values JSON cannot represent become the empty string.
fn arg_text(value: &JsValue) -> String {
    if let Some(s) = value.as_string() {
        return s;
    }
    js_sys::JSON::stringify(value)
        .ok()
        .and_then(|s| s.as_string())
        .unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
fn forward_output(lines: Vec<String>) {
    for line in lines {
        web_sys::console::debug_1(&JsValue::from_str(&line));
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn forward_output(lines: Vec<String>) {
    drop(lines);
}

// =============================================================================
// SESSION
// =============================================================================

#[wasm_bindgen]
pub struct TenetSession {
    bridge: Bridge,
}

#[wasm_bindgen]
impl TenetSession {
    /// `mode` is `"structured"` (default) or `"flat"`.
    #[wasm_bindgen(constructor)]
    pub fn new(mode: Option<String>) -> Result<TenetSession, JsValue> {
        let mode = match mode {
            Some(m) => m
                .parse::<OutputMode>()
                .map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => OutputMode::default(),
        };
        Ok(Self::with_mode(mode))
    }

    /// `undefined` on success, otherwise the error string.
    pub fn define(&mut self, args: Vec<JsValue>) -> Option<String> {
        let texts: Vec<String> = args.iter().map(arg_text).collect();
        self.define_texts(&texts)
    }

    /// Encoded results, or the error string.
    pub fn query(&self, args: Vec<JsValue>) -> String {
        let texts: Vec<String> = args.iter().map(arg_text).collect();
        self.query_texts(&texts)
    }

    #[wasm_bindgen(getter)]
    pub fn mode(&self) -> String {
        self.bridge.mode().to_string()
    }

    /// Session counters as a JSON string.
    pub fn stats(&self) -> String {
        serde_json::to_string(&self.bridge.session().stats()).unwrap_or_default()
    }
}

impl TenetSession {
    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            bridge: Bridge::new(mode),
        }
    }

    pub fn define_texts(&mut self, args: &[String]) -> Option<String> {
        let outcome = self.bridge.define(args);
        forward_output(self.bridge.drain_output());
        outcome
    }

    pub fn query_texts(&self, args: &[String]) -> String {
        self.bridge.query(args)
    }
}

/// Evaluate a self-contained program whose last clause is the question.
///
/// Returns `{"status":"success","data":[...]}` or
/// `{"status":"error","message":"..."}`.
#[wasm_bindgen(js_name = runProgram)]
pub fn run_program(text: &str) -> String {
    run_program_json(text)
}

// =============================================================================
// TESTS
// =============================================================================
