//! # Bridge Module
//!
//! The two string-in/string-out entry points a host exposes.
//!
//! A host call carries a list of arguments. Both operations require exactly
//! one. Errors never cross the boundary as values:
//!
//! | Outcome                | `define`                       | `query`                        |
//! |------------------------|--------------------------------|--------------------------------|
//! | success                | `None`                         | encoded results                |
//! | wrong argument count   | `Some("Invalid number of arguments")` | `"Invalid number of arguments"` |
//! | any other failure      | `Some("Error: " + message)`    | `"Error: " + message`          |
//!
//! Hosts that can carry typed errors use [`Bridge::try_define`] and
//! [`Bridge::try_query`] instead.

use crate::encoder::OutputMode;
use crate::engine::{Engine, Interpreter};
use crate::primitives::{ARITY_ERROR, ERROR_PREFIX};
use crate::session::Session;
use crate::TenetError;
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// ERROR TAXONOMY
// =============================================================================

/// Which bridge operation an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Define,
    Query,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Define => f.write_str("define"),
            Self::Query => f.write_str("query"),
        }
    }
}

/// Coarse classification of a failure, used for logging and status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Arity,
    Load,
    Parse,
    Evaluation,
    Encoding,
}

impl ErrorKind {
    /// Classify `err` raised by `op`.
    ///
    /// A syntax error is a load error during define and a parse error during
    /// query. Anything define rejects after parsing is also a load error.
    pub fn classify(op: Operation, err: &TenetError) -> Self {
        match (op, err) {
            (_, TenetError::InvalidArity { .. }) => Self::Arity,
            (_, TenetError::Encoding(_)) => Self::Encoding,
            (Operation::Define, _) => Self::Load,
            (Operation::Query, TenetError::Syntax { .. } | TenetError::InputTooLarge { .. }) => {
                Self::Parse
            }
            (Operation::Query, _) => Self::Evaluation,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Arity => "arity",
            Self::Load => "load",
            Self::Parse => "parse",
            Self::Evaluation => "evaluation",
            Self::Encoding => "encoding",
        };
        f.write_str(s)
    }
}

/// Render an error the way a host sees it.
pub fn flatten_error(err: &TenetError) -> String {
    match err {
        TenetError::InvalidArity { .. } => ARITY_ERROR.to_string(),
        other => format!("{}{}", ERROR_PREFIX, other),
    }
}

fn single_arg<S: AsRef<str>>(args: &[S]) -> Result<&str, TenetError> {
    match args {
        [only] => Ok(only.as_ref()),
        _ => Err(TenetError::InvalidArity { got: args.len() }),
    }
}

// =============================================================================
// BRIDGE
// =============================================================================

/// A Session plus the output mode its deployment chose.
#[derive(Debug)]
pub struct Bridge<E: Engine = Interpreter> {
    session: Session<E>,
    mode: OutputMode,
}

impl Default for Bridge<Interpreter> {
    fn default() -> Self {
        Self::new(OutputMode::default())
    }
}

impl Bridge<Interpreter> {
    /// Create a bridge over a fresh session.
    #[must_use]
    pub fn new(mode: OutputMode) -> Self {
        Self::with_session(Session::new(), mode)
    }
}

impl<E: Engine> Bridge<E> {
    pub fn with_session(session: Session<E>, mode: OutputMode) -> Self {
        Self { session, mode }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn session(&self) -> &Session<E> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<E> {
        &mut self.session
    }

    /// Load program text carried by a host call.
    pub fn try_define<S: AsRef<str>>(&mut self, args: &[S]) -> Result<(), TenetError> {
        let text = single_arg(args)?;
        self.session.define(text)
    }

    /// Evaluate a query carried by a host call and encode its solutions.
    pub fn try_query<S: AsRef<str>>(&self, args: &[S]) -> Result<String, TenetError> {
        let text = single_arg(args)?;
        self.session.query(text, self.mode)
    }

    /// `None` on success, otherwise the flattened error.
    pub fn define<S: AsRef<str>>(&mut self, args: &[S]) -> Option<String> {
        self.try_define(args).err().map(|e| flatten_error(&e))
    }

    /// Encoded results, or the flattened error.
    pub fn query<S: AsRef<str>>(&self, args: &[S]) -> String {
        self.try_query(args).unwrap_or_else(|e| flatten_error(&e))
    }

    /// Take pending engine diagnostics.
    pub fn drain_output(&self) -> Vec<String> {
        self.session.drain_output()
    }
}

// =============================================================================
// TESTS
// =============================================================================
