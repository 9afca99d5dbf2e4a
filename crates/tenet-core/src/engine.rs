//! # Engine Module
//!
//! The logic engine behind a Session.
//!
//! The bridge only talks to an engine through the [`Engine`] trait:
//! incremental load, query parsing and query evaluation. [`Interpreter`] is
//! the bundled implementation; tests and embedders may supply their own.
//!
//! ## Load semantics
//!
//! `define` is atomic. The new text is parsed, merged into a copy of the
//! current program, analyzed and evaluated; only when all of that succeeds
//! does the interpreter switch to the new state. A rejected load leaves the
//! previous facts and rules untouched.

use crate::analysis::stratify;
use crate::eval::{Bindings, Limits, Model, evaluate, match_atom};
use crate::parser::{parse_program, parse_query};
use crate::primitives::{MAX_PROGRAM_LENGTH, MAX_QUERY_LENGTH};
use crate::store::FactStore;
use crate::{Atom, Clause, PredicateSym, TenetError};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

// =============================================================================
// OUTPUT SINK
// =============================================================================

/// Side channel for engine diagnostics. Never carries query results.
///
/// Cloning yields another handle to the same buffer, so a Session can keep
/// one handle while its engine writes through another.
#[derive(Debug, Clone, Default)]
pub struct OutputSink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl OutputSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_line(&self, line: impl Into<String>) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.into());
    }

    /// Take every pending line, leaving the sink empty.
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock().unwrap_or_else(PoisonError::into_inner))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// ENGINE CONTRACT
// =============================================================================

/// Counters describing an engine's current program.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Predicates with facts or rules.
    pub predicates: usize,
    /// Asserted facts.
    pub facts: usize,
    /// Rules.
    pub rules: usize,
    /// Facts derived by rules.
    pub derived: usize,
}

/// What a Session needs from a logic engine.
pub trait Engine {
    /// Incrementally load facts and rules.
    fn define(&mut self, program: &str) -> Result<(), TenetError>;

    /// Parse query text into an atom whose arguments are variables or constants.
    fn parse_query(&self, text: &str) -> Result<Atom, TenetError>;

    /// Evaluate a parsed query. Every returned atom has the query's arity.
    fn query(&self, query: &Atom) -> Result<Vec<Atom>, TenetError>;

    fn stats(&self) -> EngineStats {
        EngineStats::default()
    }

    /// Known predicates in a stable order.
    fn predicates(&self) -> Vec<PredicateSym> {
        Vec::new()
    }
}

// =============================================================================
// INTERPRETER
// =============================================================================

/// Bundled Datalog interpreter.
#[derive(Debug, Clone)]
pub struct Interpreter {
    /// Asserted facts.
    edb: FactStore,
    /// Rules in load order.
    rules: Vec<Clause>,
    /// Asserted plus derived facts.
    model: Model,
    sink: OutputSink,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(OutputSink::new())
    }
}

impl Interpreter {
    /// Create an empty interpreter writing diagnostics to `sink`.
    #[must_use]
    pub fn new(sink: OutputSink) -> Self {
        Self {
            edb: FactStore::new(),
            rules: Vec::new(),
            model: Model {
                facts: FactStore::new(),
                derived: 0,
                rounds: 0,
            },
            sink,
        }
    }

    fn check_length(what: &'static str, text: &str, max: usize) -> Result<(), TenetError> {
        if text.len() > max {
            return Err(TenetError::InputTooLarge {
                what,
                len: text.len(),
                max,
            });
        }
        Ok(())
    }

    /// Merge parsed clauses into copies of the current program.
    fn merge(&self, clauses: Vec<Clause>) -> Result<(FactStore, Vec<Clause>, usize), TenetError> {
        let mut edb = self.edb.clone();
        let mut rules = self.rules.clone();
        let mut new_facts = 0;
        for clause in clauses {
            if clause.is_fact() {
                let tuple = clause.head.to_tuple().ok_or_else(|| {
                    TenetError::Program(format!("fact {} is not ground", clause.head))
                })?;
                if edb.insert(&clause.head.sym(), tuple) {
                    new_facts += 1;
                }
            } else {
                rules.push(clause);
            }
        }
        Ok((edb, rules, new_facts))
    }

    /// Load already-parsed clauses. Same atomicity as [`Engine::define`].
    pub fn define_clauses(&mut self, clauses: Vec<Clause>) -> Result<(), TenetError> {
        let clause_count = clauses.len();
        let rules_before = self.rules.len();

        let (edb, rules, new_facts) = self.merge(clauses)?;
        let strata = stratify(&edb, &rules)?;
        let model = evaluate(&edb, &strata, Limits::default())?;

        self.sink.write_line(format!(
            "loaded {} clauses ({} new facts, {} new rules); {} strata, {} rounds, {} facts in model",
            clause_count,
            new_facts,
            rules.len() - rules_before,
            strata.len(),
            model.rounds,
            model.facts.fact_count()
        ));

        self.edb = edb;
        self.rules = rules;
        self.model = model;
        Ok(())
    }
}

impl Engine for Interpreter {
    fn define(&mut self, program: &str) -> Result<(), TenetError> {
        Self::check_length("program", program, MAX_PROGRAM_LENGTH)?;
        let clauses = parse_program(program)?;
        self.define_clauses(clauses)
    }

    fn parse_query(&self, text: &str) -> Result<Atom, TenetError> {
        Self::check_length("query", text, MAX_QUERY_LENGTH)?;
        parse_query(text)
    }

    fn query(&self, query: &Atom) -> Result<Vec<Atom>, TenetError> {
        let sym = query.sym();
        let Some(relation) = self.model.facts.relation(&sym) else {
            return match self
                .model
                .facts
                .predicates()
                .find(|known| known.name == query.predicate)
            {
                Some(known) => Err(TenetError::ArityMismatch {
                    name: known.name.clone(),
                    expected: known.arity,
                    got: sym.arity,
                }),
                None => Err(TenetError::UnknownPredicate(sym.to_string())),
            };
        };

        let empty = Bindings::new();
        Ok(relation
            .iter()
            .filter(|row| match_atom(query, row, &empty).is_some())
            .map(|row| Atom::ground(query.predicate.clone(), row.clone()))
            .collect())
    }

    fn stats(&self) -> EngineStats {
        EngineStats {
            predicates: self.model.facts.predicates().count(),
            facts: self.edb.fact_count(),
            rules: self.rules.len(),
            derived: self.model.derived,
        }
    }

    fn predicates(&self) -> Vec<PredicateSym> {
        self.model.facts.predicates().cloned().collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
