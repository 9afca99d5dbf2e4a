//! # Evaluation Module
//!
//! Bottom-up, semi-naive evaluation of stratified rules.
//!
//! Each stratum is run to a fixpoint before the next one starts, so negated
//! atoms always refer to relations that are already complete. Within a
//! stratum, the first round applies every rule to the full model; later
//! rounds only join against the facts derived in the previous round.

use crate::analysis::Strata;
use crate::primitives::{MAX_JOIN_BINDINGS, MAX_MODEL_FACTS};
use crate::store::FactStore;
use crate::{Atom, Clause, Constant, Literal, PredicateSym, TenetError, Term, Tuple};
use std::collections::{BTreeMap, BTreeSet};

/// Variable assignments accumulated while joining a rule body.
pub type Bindings = BTreeMap<String, Constant>;

/// Resource bounds for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Asserted plus derived facts.
    pub max_facts: usize,
    /// Partial assignments alive at any step of one rule's join.
    pub max_join_bindings: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_facts: MAX_MODEL_FACTS,
            max_join_bindings: MAX_JOIN_BINDINGS,
        }
    }
}

/// Result of evaluating a program.
#[derive(Debug, Clone)]
pub struct Model {
    /// Asserted and derived facts together.
    pub facts: FactStore,
    /// Facts produced by rules that were not asserted.
    pub derived: usize,
    /// Semi-naive rounds across all strata.
    pub rounds: usize,
}

// =============================================================================
// MATCHING
// =============================================================================

fn resolve(term: &Term, bindings: &Bindings) -> Option<Constant> {
    match term {
        Term::Constant(c) => Some(c.clone()),
        Term::Variable(v) => bindings.get(v.name()).cloned(),
    }
}

/// Unify `pattern` against a stored row under existing bindings.
///
/// Constants must be equal, bound variables must agree, unbound variables
/// are bound. `_` matches anything and binds nothing.
pub fn match_atom(pattern: &Atom, row: &[Constant], bindings: &Bindings) -> Option<Bindings> {
    if pattern.args.len() != row.len() {
        return None;
    }
    let mut out = bindings.clone();
    for (term, value) in pattern.args.iter().zip(row) {
        match term {
            Term::Constant(c) => {
                if c != value {
                    return None;
                }
            }
            Term::Variable(v) if v.is_wildcard() => {}
            Term::Variable(v) => match out.get(v.name()) {
                Some(bound) if bound != value => return None,
                Some(_) => {}
                None => {
                    out.insert(v.name().to_string(), value.clone());
                }
            },
        }
    }
    Some(out)
}

/// Does any row of `atom`'s relation match under `bindings`?
fn any_match(store: &FactStore, atom: &Atom, bindings: &Bindings) -> bool {
    store.relation(&atom.sym()).is_some_and(|rel| {
        rel.iter()
            .any(|row| match_atom(atom, row, bindings).is_some())
    })
}

// =============================================================================
// RULE APPLICATION
// =============================================================================

/// Where the positive atom at a given body position reads its rows from.
struct Source<'a> {
    full: &'a FactStore,
    delta: Option<(usize, &'a FactStore)>,
}

impl<'a> Source<'a> {
    fn for_position(&self, position: usize) -> &'a FactStore {
        match self.delta {
            Some((p, delta)) if p == position => delta,
            _ => self.full,
        }
    }
}

fn join_too_large(rule: &Clause, max: usize) -> TenetError {
    TenetError::Evaluation(format!(
        "rule for {} needs more than {} intermediate bindings",
        rule.head.sym(),
        max
    ))
}

fn apply_rule(
    rule: &Clause,
    source: &Source<'_>,
    max_bindings: usize,
) -> Result<Vec<Tuple>, TenetError> {
    let mut frontier = vec![Bindings::new()];

    for (position, lit) in rule.body.iter().enumerate() {
        if frontier.is_empty() {
            return Ok(Vec::new());
        }
        let mut next = Vec::new();
        match lit {
            Literal::Positive(atom) => {
                let Some(rel) = source.for_position(position).relation(&atom.sym()) else {
                    return Ok(Vec::new());
                };
                for bindings in &frontier {
                    next.extend(rel.iter().filter_map(|row| match_atom(atom, row, bindings)));
                    if next.len() > max_bindings {
                        return Err(join_too_large(rule, max_bindings));
                    }
                }
            }
            Literal::Negated(atom) => {
                next = frontier
                    .into_iter()
                    .filter(|b| !any_match(source.full, atom, b))
                    .collect();
            }
            Literal::Eq(left, right) => {
                for mut bindings in frontier {
                    match (resolve(left, &bindings), resolve(right, &bindings)) {
                        (Some(l), Some(r)) => {
                            if l == r {
                                next.push(bindings);
                            }
                        }
                        (Some(value), None) => {
                            if let Term::Variable(v) = right {
                                bindings.insert(v.name().to_string(), value);
                                next.push(bindings);
                            }
                        }
                        (None, Some(value)) => {
                            if let Term::Variable(v) = left {
                                bindings.insert(v.name().to_string(), value);
                                next.push(bindings);
                            }
                        }
                        (None, None) => {
                            return Err(TenetError::Evaluation(format!(
                                "equality {} reached with both sides unbound",
                                lit
                            )));
                        }
                    }
                }
            }
            Literal::Neq(left, right) => {
                for bindings in frontier {
                    match (resolve(left, &bindings), resolve(right, &bindings)) {
                        (Some(l), Some(r)) => {
                            if l != r {
                                next.push(bindings);
                            }
                        }
                        _ => {
                            return Err(TenetError::Evaluation(format!(
                                "inequality {} reached with an unbound side",
                                lit
                            )));
                        }
                    }
                }
            }
        }
        frontier = next;
    }

    frontier
        .iter()
        .map(|bindings| {
            rule.head
                .args
                .iter()
                .map(|t| resolve(t, bindings))
                .collect::<Option<Tuple>>()
                .ok_or_else(|| {
                    TenetError::Evaluation(format!("head of {} left a variable unbound", rule))
                })
        })
        .collect()
}

// =============================================================================
// FIXPOINT
// =============================================================================

fn insert_checked(
    model: &mut FactStore,
    sym: &PredicateSym,
    tuple: Tuple,
    limit: usize,
) -> Result<bool, TenetError> {
    if model.contains(sym, &tuple) {
        return Ok(false);
    }
    if model.fact_count() >= limit {
        return Err(TenetError::Evaluation(format!(
            "model exceeds {} facts while deriving {}",
            limit, sym
        )));
    }
    Ok(model.insert(sym, tuple))
}

/// Evaluate all strata over the asserted facts.
pub fn evaluate(edb: &FactStore, strata: &Strata, limits: Limits) -> Result<Model, TenetError> {
    let mut model = edb.clone();
    let mut rounds = 0;

    for stratum in strata {
        for rule in stratum {
            model.declare(&rule.head.sym());
        }
        let recursive: BTreeSet<PredicateSym> = stratum.iter().map(|r| r.head.sym()).collect();

        // round zero: every rule against the full model
        let mut delta = FactStore::new();
        let mut produced = Vec::new();
        for rule in stratum {
            let source = Source {
                full: &model,
                delta: None,
            };
            for tuple in apply_rule(rule, &source, limits.max_join_bindings)? {
                produced.push((rule.head.sym(), tuple));
            }
        }
        for (sym, tuple) in produced {
            if insert_checked(&mut model, &sym, tuple.clone(), limits.max_facts)? {
                delta.insert(&sym, tuple);
            }
        }
        rounds += 1;

        while delta.fact_count() > 0 {
            let mut produced = Vec::new();
            for rule in stratum {
                for (position, lit) in rule.body.iter().enumerate() {
                    let Literal::Positive(atom) = lit else {
                        continue;
                    };
                    if !recursive.contains(&atom.sym()) || delta.relation(&atom.sym()).is_none()
                    {
                        continue;
                    }
                    let source = Source {
                        full: &model,
                        delta: Some((position, &delta)),
                    };
                    for tuple in apply_rule(rule, &source, limits.max_join_bindings)? {
                        produced.push((rule.head.sym(), tuple));
                    }
                }
            }

            let mut next = FactStore::new();
            for (sym, tuple) in produced {
                if insert_checked(&mut model, &sym, tuple.clone(), limits.max_facts)? {
                    next.insert(&sym, tuple);
                }
            }
            delta = next;
            rounds += 1;
        }
    }

    let derived = model.fact_count().saturating_sub(edb.fact_count());
    Ok(Model {
        facts: model,
        derived,
        rounds,
    })
}

// =============================================================================
// TESTS
// =============================================================================
