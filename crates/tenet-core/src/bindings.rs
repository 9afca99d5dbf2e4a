//! # Binding Extractor
//!
//! Turns (parsed query, solution) pairs into variable-to-value maps.
//!
//! A solution is positionally aligned with the query: position `i` of the
//! solution holds the value that satisfied argument `i` of the query. Only
//! variable positions produce entries; constant positions were fixed by the
//! caller and contribute nothing.

use crate::{Atom, TenetError, Term};
use std::collections::BTreeMap;

/// Variable name to the text form of its bound value.
///
/// Ordered by name so encodings are deterministic.
pub type BindingMap = BTreeMap<String, String>;

/// Build the binding map for one solution.
///
/// A solution whose length differs from the query's is rejected rather than
/// read past.
pub fn extract(query: &Atom, solution: &Atom) -> Result<BindingMap, TenetError> {
    if query.args.len() != solution.args.len() {
        return Err(TenetError::Evaluation(format!(
            "solution {} has {} values but query {} has {} arguments",
            solution,
            solution.args.len(),
            query,
            query.args.len()
        )));
    }

    let mut map = BindingMap::new();
    for (term, value) in query.args.iter().zip(&solution.args) {
        match term {
            Term::Variable(var) => {
                map.insert(var.name().to_string(), value.to_string());
            }
            Term::Constant(_) => {}
        }
    }
    Ok(map)
}

/// Build one binding map per solution, in solution order.
pub fn extract_all(query: &Atom, solutions: &[Atom]) -> Result<Vec<BindingMap>, TenetError> {
    solutions.iter().map(|s| extract(query, s)).collect()
}

// =============================================================================
// TESTS
// =============================================================================
