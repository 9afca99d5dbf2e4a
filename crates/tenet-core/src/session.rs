//! # Session Module
//!
//! A Session owns one logic engine and the output sink that engine writes
//! diagnostics to. Hosts construct exactly one and keep it for the life of
//! the process; nothing here is global, so tests can run many side by side.
//!
//! Session state is never persisted. Dropping the Session drops every fact.

use crate::encoder::{OutputMode, encode};
use crate::engine::{Engine, EngineStats, Interpreter, OutputSink};
use crate::{Atom, PredicateSym, TenetError};

/// A parsed query together with the solutions it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOutcome {
    pub query: Atom,
    /// In the order the engine produced them.
    pub solutions: Vec<Atom>,
}

/// One engine plus its diagnostic sink.
#[derive(Debug)]
pub struct Session<E: Engine = Interpreter> {
    engine: E,
    sink: OutputSink,
}

impl Default for Session<Interpreter> {
    fn default() -> Self {
        Self::new()
    }
}

impl Session<Interpreter> {
    /// Create a session around a fresh interpreter.
    #[must_use]
    pub fn new() -> Self {
        let sink = OutputSink::new();
        Self {
            engine: Interpreter::new(sink.clone()),
            sink,
        }
    }
}

impl<E: Engine> Session<E> {
    /// Wrap an engine that already writes to `sink`.
    pub fn with_engine(engine: E, sink: OutputSink) -> Self {
        Self { engine, sink }
    }

    /// Get a reference to the engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    // =========================================================================
    // DEFINE
    // =========================================================================

    /// Forward program text verbatim to the engine's incremental load.
    pub fn define(&mut self, text: &str) -> Result<(), TenetError> {
        self.engine.define(text)
    }

    // =========================================================================
    // QUERY
    // =========================================================================

    /// Parse and evaluate a query without encoding the result.
    pub fn solve(&self, text: &str) -> Result<QueryOutcome, TenetError> {
        let query = self.engine.parse_query(text)?;
        let solutions = self.engine.query(&query)?;
        Ok(QueryOutcome { query, solutions })
    }

    /// Parse, evaluate and encode a query.
    pub fn query(&self, text: &str, mode: OutputMode) -> Result<String, TenetError> {
        let outcome = self.solve(text)?;
        encode(&outcome.query, &outcome.solutions, mode)
    }

    // =========================================================================
    // INTROSPECTION
    // =========================================================================

    pub fn stats(&self) -> EngineStats {
        self.engine.stats()
    }

    pub fn predicates(&self) -> Vec<PredicateSym> {
        self.engine.predicates()
    }

    /// Take pending diagnostic lines from the sink.
    pub fn drain_output(&self) -> Vec<String> {
        self.sink.drain()
    }
}

// =============================================================================
// TESTS
// =============================================================================
