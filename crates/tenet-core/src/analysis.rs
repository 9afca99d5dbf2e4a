//! # Program Analysis
//!
//! Static checks run on the whole program before every evaluation:
//!
//! 1. **Arity consistency**: a predicate name is used with one arity only.
//! 2. **Known predicates**: every body atom refers to a predicate that has
//!    facts or rules.
//! 3. **Range restriction**: head variables, variables of negated atoms and
//!    both sides of `!=` are bound by positive atoms or by `=` chains.
//! 4. **Stratification**: no predicate depends negatively on itself.
//!
//! The result is a list of strata, each a list of rules whose bodies are
//! reordered into an evaluable sequence.

use crate::store::FactStore;
use crate::{Clause, Literal, PredicateSym, TenetError, Term};
use std::collections::{BTreeMap, BTreeSet};

/// Rules grouped by stratum, lowest first. Bodies are in evaluation order.
pub type Strata = Vec<Vec<Clause>>;

fn reject(message: impl Into<String>) -> TenetError {
    TenetError::Program(message.into())
}

/// Run every check and split the rules into strata.
pub fn stratify(edb: &FactStore, rules: &[Clause]) -> Result<Strata, TenetError> {
    check_arities(edb, rules)?;
    check_known(edb, rules)?;

    let mut planned = Vec::with_capacity(rules.len());
    for rule in rules {
        planned.push(plan_rule(rule)?);
    }

    let levels = assign_strata(rules)?;
    let height = levels.values().copied().max().map_or(0, |m| m + 1);
    let mut strata: Strata = vec![Vec::new(); height];
    for rule in planned {
        let level = levels.get(&rule.head.sym()).copied().unwrap_or(0);
        strata[level].push(rule);
    }
    Ok(strata)
}

// =============================================================================
// ARITY & KNOWN PREDICATES
// =============================================================================

fn body_atoms(rule: &Clause) -> impl Iterator<Item = (&crate::Atom, bool)> {
    rule.body.iter().filter_map(|lit| match lit {
        Literal::Positive(a) => Some((a, false)),
        Literal::Negated(a) => Some((a, true)),
        Literal::Eq(..) | Literal::Neq(..) => None,
    })
}

fn check_arities(edb: &FactStore, rules: &[Clause]) -> Result<(), TenetError> {
    let mut uses: Vec<(&str, usize)> = edb
        .predicates()
        .map(|sym| (sym.name.as_str(), sym.arity))
        .collect();
    for rule in rules {
        uses.push((rule.head.predicate.as_str(), rule.head.args.len()));
        for (atom, _) in body_atoms(rule) {
            uses.push((atom.predicate.as_str(), atom.args.len()));
        }
    }

    let mut arities: BTreeMap<&str, usize> = BTreeMap::new();
    for (name, arity) in uses {
        match arities.get(name) {
            Some(&known) if known != arity => {
                return Err(reject(format!(
                    "predicate {} used with arity {} and {}",
                    name, known, arity
                )));
            }
            Some(_) => {}
            None => {
                arities.insert(name, arity);
            }
        }
    }
    Ok(())
}

fn check_known(edb: &FactStore, rules: &[Clause]) -> Result<(), TenetError> {
    let mut known: BTreeSet<PredicateSym> = edb.predicates().cloned().collect();
    known.extend(rules.iter().map(|r| r.head.sym()));
    for rule in rules {
        for (atom, _) in body_atoms(rule) {
            if !known.contains(&atom.sym()) {
                return Err(reject(format!(
                    "rule for {} uses undefined predicate {}",
                    rule.head.sym(),
                    atom.sym()
                )));
            }
        }
    }
    Ok(())
}

// =============================================================================
// RANGE RESTRICTION
// =============================================================================

fn term_bound(term: &Term, bound: &BTreeSet<String>) -> bool {
    match term {
        Term::Constant(_) => true,
        Term::Variable(v) => bound.contains(v.name()),
    }
}

fn bind_term(term: &Term, bound: &mut BTreeSet<String>) {
    if let Term::Variable(v) = term {
        bound.insert(v.name().to_string());
    }
}

/// Is every variable a filter reads already bound?
fn filter_ready(lit: &Literal, bound: &BTreeSet<String>) -> bool {
    match lit {
        Literal::Neq(left, right) => term_bound(left, bound) && term_bound(right, bound),
        // anonymous variables are existential inside the negation
        Literal::Negated(atom) => atom
            .variables()
            .all(|v| v.is_anonymous() || bound.contains(v.name())),
        Literal::Positive(_) | Literal::Eq(..) => true,
    }
}

/// Move every equality with a bound side, and every filter whose variables
/// are bound, from the pending lists into `ordered`.
fn flush_ready<'r>(
    ordered: &mut Vec<Literal>,
    bound: &mut BTreeSet<String>,
    pending_eq: &mut Vec<&'r Literal>,
    pending_filters: &mut Vec<&'r Literal>,
) {
    loop {
        let ready = pending_eq.iter().position(|lit| match lit {
            Literal::Eq(left, right) => term_bound(left, bound) || term_bound(right, bound),
            _ => true,
        });
        let Some(index) = ready else {
            break;
        };
        let lit = pending_eq.remove(index);
        if let Literal::Eq(left, right) = lit {
            bind_term(left, bound);
            bind_term(right, bound);
        }
        ordered.push(lit.clone());
    }

    pending_filters.retain(|lit| {
        if filter_ready(lit, bound) {
            ordered.push((*lit).clone());
            false
        } else {
            true
        }
    });
}

/// Check that a rule is safe and reorder its body.
///
/// Positive atoms keep their relative order. Each equality runs as soon as
/// one side is bound, and each filter (`!=`, negation) as soon as all its
/// variables are, so they prune the join instead of trailing it.
fn plan_rule(rule: &Clause) -> Result<Clause, TenetError> {
    let mut bound = BTreeSet::new();
    let mut ordered = Vec::with_capacity(rule.body.len());
    let mut positives = Vec::new();
    let mut pending_eq = Vec::new();
    let mut pending_filters = Vec::new();

    for lit in &rule.body {
        match lit {
            Literal::Positive(_) => positives.push(lit),
            Literal::Eq(..) => pending_eq.push(lit),
            Literal::Neq(..) | Literal::Negated(_) => pending_filters.push(lit),
        }
    }

    flush_ready(&mut ordered, &mut bound, &mut pending_eq, &mut pending_filters);
    for lit in positives {
        if let Literal::Positive(atom) = lit {
            for v in atom.variables() {
                bound.insert(v.name().to_string());
            }
        }
        ordered.push(lit.clone());
        flush_ready(&mut ordered, &mut bound, &mut pending_eq, &mut pending_filters);
    }

    if let Some(lit) = pending_eq.first() {
        return Err(reject(format!(
            "unsafe rule for {}: equality {} has no bound side",
            rule.head.sym(),
            lit
        )));
    }

    if let Some(lit) = pending_filters.first() {
        let unbound = match lit {
            Literal::Neq(left, right) => [left, right]
                .into_iter()
                .find(|t| !term_bound(t, &bound))
                .map(ToString::to_string),
            Literal::Negated(atom) => atom
                .variables()
                .find(|v| !v.is_anonymous() && !bound.contains(v.name()))
                .map(ToString::to_string),
            Literal::Positive(_) | Literal::Eq(..) => None,
        };
        return Err(reject(format!(
            "unsafe rule for {}: variable {} in {} is not bound",
            rule.head.sym(),
            unbound.unwrap_or_default(),
            lit
        )));
    }

    if let Some(v) = rule.head.variables().find(|v| !bound.contains(v.name())) {
        return Err(reject(format!(
            "unsafe rule for {}: head variable {} does not appear in the body",
            rule.head.sym(),
            v
        )));
    }

    Ok(Clause {
        head: rule.head.clone(),
        body: ordered,
    })
}

// =============================================================================
// STRATIFICATION
// =============================================================================

/// Assign each rule-defined predicate the lowest stratum consistent with its
/// dependencies: at least its positive dependencies, above its negative ones.
fn assign_strata(rules: &[Clause]) -> Result<BTreeMap<PredicateSym, usize>, TenetError> {
    let mut level: BTreeMap<PredicateSym, usize> =
        rules.iter().map(|r| (r.head.sym(), 0)).collect();
    let ceiling = level.len();

    let mut edges = Vec::new();
    for rule in rules {
        for (atom, negated) in body_atoms(rule) {
            if level.contains_key(&atom.sym()) {
                edges.push((rule.head.sym(), atom.sym(), negated));
            }
        }
    }

    loop {
        let mut changed = false;
        for (head, dep, negated) in &edges {
            let need = level.get(dep).copied().unwrap_or(0) + usize::from(*negated);
            if level.get(head).copied().unwrap_or(0) < need {
                // a valid stratification never needs more levels than predicates
                if need >= ceiling {
                    return Err(reject(format!(
                        "negation cycle: {} depends negatively on {} recursively",
                        head, dep
                    )));
                }
                level.insert(head.clone(), need);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    Ok(level)
}

// =============================================================================
// TESTS
// =============================================================================
