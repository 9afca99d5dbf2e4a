//! # Core Type Definitions
//!
//! This module contains the vocabulary shared by the parser, the engine and
//! the bridge:
//! - Constants, variables and terms (`Constant`, `Variable`, `Term`)
//! - Atoms, literals and clauses (`Atom`, `Literal`, `Clause`)
//! - Predicate symbols (`PredicateSym`)
//! - Error types (`TenetError`)
//!
//! ## Determinism Guarantees
//!
//! All value types implement `Ord` so they can live in `BTreeMap`/`BTreeSet`.
//! Rendering is canonical: `pred(a,b)` with no spaces, strings re-escaped.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A fully evaluated row of a relation.
pub type Tuple = Vec<Constant>;

// =============================================================================
// PREDICATE SYMBOL
// =============================================================================

/// A predicate identified by name and arity, rendered `name/arity`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PredicateSym {
    pub name: String,
    pub arity: usize,
}

impl PredicateSym {
    #[must_use]
    pub fn new(name: impl Into<String>, arity: usize) -> Self {
        Self {
            name: name.into(),
            arity,
        }
    }
}

impl fmt::Display for PredicateSym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

// =============================================================================
// CONSTANTS
// =============================================================================

/// A ground value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Constant {
    /// Signed integer, e.g. `42` or `-7`.
    Number(i64),
    /// String literal, stored unescaped.
    String(String),
    /// Name constant such as `/status/open`, stored with its leading slash.
    Name(String),
}

impl Constant {
    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    #[must_use]
    pub fn name(s: impl Into<String>) -> Self {
        Self::Name(s.into())
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Name(n) => f.write_str(n),
            Self::String(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        other => write!(f, "{}", other)?,
                    }
                }
                f.write_str("\"")
            }
        }
    }
}

// =============================================================================
// VARIABLES & TERMS
// =============================================================================

/// The anonymous variable as written in source.
pub const WILDCARD: &str = "_";

/// Prefix of the fresh names the parser gives to `_` inside clauses.
/// `#` cannot appear in source identifiers, so these never collide.
pub(crate) const FRESH_PREFIX: &str = "_#";

/// A named placeholder.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(pub String);

impl Variable {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }

    /// True for `_`, which never constrains a match.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.0 == WILDCARD
    }

    /// True for `_` and for the fresh variables it is renamed to in clauses.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.is_wildcard() || self.0.starts_with(FRESH_PREFIX)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An argument of an atom. Closed over the two kinds the engine knows.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Term {
    Variable(Variable),
    Constant(Constant),
}

impl Term {
    #[must_use]
    pub fn var(name: impl Into<String>) -> Self {
        Self::Variable(Variable::new(name))
    }

    #[must_use]
    pub fn number(n: i64) -> Self {
        Self::Constant(Constant::Number(n))
    }

    #[must_use]
    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Self::Constant(c) => Some(c),
            Self::Variable(_) => None,
        }
    }
}

impl From<Constant> for Term {
    fn from(c: Constant) -> Self {
        Self::Constant(c)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Variable(v) => v.fmt(f),
            Self::Constant(c) => c.fmt(f),
        }
    }
}

// =============================================================================
// ATOMS, LITERALS, CLAUSES
// =============================================================================

/// `predicate(arg, ...)`. Serves as parsed query, clause head and solution.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Atom {
    pub predicate: String,
    pub args: Vec<Term>,
}

impl Atom {
    #[must_use]
    pub fn new(predicate: impl Into<String>, args: Vec<Term>) -> Self {
        Self {
            predicate: predicate.into(),
            args,
        }
    }

    /// Build a ground atom from a stored tuple.
    #[must_use]
    pub fn ground(predicate: impl Into<String>, values: Tuple) -> Self {
        Self::new(predicate, values.into_iter().map(Term::Constant).collect())
    }

    #[must_use]
    pub fn sym(&self) -> PredicateSym {
        PredicateSym::new(self.predicate.clone(), self.args.len())
    }

    /// The argument values if every argument is a constant.
    #[must_use]
    pub fn to_tuple(&self) -> Option<Tuple> {
        self.args.iter().map(|t| t.as_constant().cloned()).collect()
    }

    /// Variables in argument order, duplicates included.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.args.iter().filter_map(|t| match t {
            Term::Variable(v) => Some(v),
            Term::Constant(_) => None,
        })
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.predicate)?;
        if self.args.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            arg.fmt(f)?;
        }
        f.write_str(")")
    }
}

/// One element of a rule body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Positive(Atom),
    Negated(Atom),
    Eq(Term, Term),
    Neq(Term, Term),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive(a) => a.fmt(f),
            Self::Negated(a) => write!(f, "!{}", a),
            Self::Eq(l, r) => write!(f, "{} = {}", l, r),
            Self::Neq(l, r) => write!(f, "{} != {}", l, r),
        }
    }
}

/// A fact (empty body) or a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub head: Atom,
    pub body: Vec<Literal>,
}

impl Clause {
    #[must_use]
    pub fn fact(head: Atom) -> Self {
        Self {
            head,
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_fact(&self) -> bool {
        self.body.is_empty()
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.head.fmt(f)?;
        if !self.body.is_empty() {
            f.write_str(" :- ")?;
            for (i, lit) in self.body.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                lit.fmt(f)?;
            }
        }
        f.write_str(".")
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors produced by the engine, the session and the bridge.
///
/// None of these cross a host boundary as values: the `Bridge` flattens them
/// into sentinel strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TenetError {
    /// A host call carried the wrong number of arguments.
    #[error("Invalid number of arguments")]
    InvalidArity { got: usize },

    /// Program or query text is not well formed.
    #[error("syntax error at {line}:{column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    /// Program text parsed but was rejected by analysis.
    #[error("{0}")]
    Program(String),

    /// A query referenced a predicate with no facts or rules.
    #[error("unknown predicate {0}")]
    UnknownPredicate(String),

    /// A query used a known predicate with the wrong arity.
    #[error("predicate {name} has arity {expected}, query uses {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    /// Bottom-up evaluation or solution matching failed.
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    /// A result set could not be serialized.
    #[error("encoding failed: {0}")]
    Encoding(String),

    /// Input exceeded a configured size limit.
    #[error("{what} is {len} bytes, limit is {max}")]
    InputTooLarge {
        what: &'static str,
        len: usize,
        max: usize,
    },

    /// An I/O error occurred in a host.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
