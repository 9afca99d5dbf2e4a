//! # tenet-core
//!
//! A fact/rule logic engine behind a two-call string bridge.
//!
//! Hosts hold one [`Bridge`], which owns a [`Session`] (engine plus output
//! sink) and an [`OutputMode`]. They call `define` with program text and
//! `query` with a single atom; every result is a plain string.
//!
//! ## Layout
//!
//! - `types`, `parser`: the Datalog language (constants, atoms, clauses)
//! - `store`, `analysis`, `eval`, `engine`: the bundled interpreter
//! - `session`, `bindings`, `encoder`, `bridge`: the host-facing surface
//! - `oneshot`: self-contained programs answered by their last clause
//!
//! This crate has no async, no I/O and no logging dependency. Diagnostics
//! go to the [`OutputSink`]; hosts decide where they end up.

// =============================================================================
// MODULES
// =============================================================================

pub mod analysis;
pub mod bindings;
pub mod bridge;
pub mod encoder;
pub mod engine;
pub mod eval;
pub mod oneshot;
pub mod parser;
pub mod primitives;
pub mod session;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Atom, Clause, Constant, Literal, PredicateSym, TenetError, Term, Tuple, Variable, WILDCARD,
};

// =============================================================================
// RE-EXPORTS: Engine and Bridge
// =============================================================================

pub use bindings::BindingMap;
pub use bridge::{Bridge, ErrorKind, Operation, flatten_error};
pub use encoder::OutputMode;
pub use engine::{Engine, EngineStats, Interpreter, OutputSink};
pub use oneshot::{ProgramReport, run_program, run_program_json};
pub use session::{QueryOutcome, Session};
