//! # Result Encoder
//!
//! Serializes a query's solutions into the string a host receives.
//!
//! - **Structured**: JSON array of binding objects. Solutions whose binding
//!   map is empty are dropped; if that drops every solution, the output is
//!   the single marker `[{}]` instead of `[]`, so "succeeded with nothing to
//!   bind" stays distinguishable from "no solutions".
//! - **Flat**: each solution rendered as `pred(a,b)`, newline-joined.

use crate::bindings::{BindingMap, extract_all};
use crate::primitives::{EMPTY_BINDINGS_MARKER, FLAT_SEPARATOR};
use crate::{Atom, TenetError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How query results are encoded. A deployment picks one and keeps it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Structured,
    Flat,
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Structured => f.write_str("structured"),
            Self::Flat => f.write_str("flat"),
        }
    }
}

impl FromStr for OutputMode {
    type Err = TenetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" | "json" => Ok(Self::Structured),
            "flat" | "text" => Ok(Self::Flat),
            other => Err(TenetError::Program(format!(
                "unknown output mode '{}' (expected structured or flat)",
                other
            ))),
        }
    }
}

/// Encode solutions of `query` in the given mode.
pub fn encode(query: &Atom, solutions: &[Atom], mode: OutputMode) -> Result<String, TenetError> {
    match mode {
        OutputMode::Structured => encode_structured(query, solutions),
        OutputMode::Flat => Ok(encode_flat(solutions)),
    }
}

pub fn encode_structured(query: &Atom, solutions: &[Atom]) -> Result<String, TenetError> {
    let maps: Vec<BindingMap> = extract_all(query, solutions)?
        .into_iter()
        .filter(|m| !m.is_empty())
        .collect();

    if maps.is_empty() && !solutions.is_empty() {
        return Ok(EMPTY_BINDINGS_MARKER.to_string());
    }

    serde_json::to_string(&maps).map_err(|e| TenetError::Encoding(e.to_string()))
}

pub fn encode_flat(solutions: &[Atom]) -> String {
    solutions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(FLAT_SEPARATOR)
}

// =============================================================================
// TESTS
// =============================================================================
