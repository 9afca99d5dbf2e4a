//! # Property-Based Tests
//!
//! Invariants of the bridge and the binding extractor under generated input.

use proptest::collection::vec;
use proptest::prelude::*;
use tenet_core::bindings::extract;
use tenet_core::primitives::{ARITY_ERROR, EMPTY_BINDINGS_MARKER, ERROR_PREFIX};
use tenet_core::{Atom, Bridge, Constant, OutputMode, Term};

/// Render `pairs` as `f(a,b).` facts.
fn program(pairs: &[(i64, i64)]) -> String {
    pairs
        .iter()
        .map(|(a, b)| format!("f({},{}).", a, b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn distinct(pairs: &[(i64, i64)]) -> Vec<(i64, i64)> {
    let mut seen = std::collections::BTreeSet::new();
    pairs.iter().copied().filter(|p| seen.insert(*p)).collect()
}

/// A query argument: a variable name or a number.
fn arg_strategy() -> impl Strategy<Value = Term> {
    prop_oneof![
        prop::sample::select(vec!["X", "Y", "Z", "W"]).prop_map(Term::var),
        (-50i64..50).prop_map(Term::number),
    ]
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Wrong argument counts never touch the session.
    #[test]
    fn wrong_arity_is_sentinel_and_inert(
        pairs in vec((0i64..20, 0i64..20), 1..10),
        extra in 2usize..5,
    ) {
        let text = program(&pairs);
        let mut bridge = Bridge::new(OutputMode::Flat);
        let before = bridge.session().stats();

        let args: Vec<&str> = std::iter::repeat_n(text.as_str(), extra).collect();
        let defined = bridge.define(&args);
        prop_assert_eq!(defined.as_deref(), Some(ARITY_ERROR));
        let answered = bridge.query(&args);
        prop_assert_eq!(answered.as_str(), ARITY_ERROR);
        prop_assert_eq!(bridge.session().stats(), before);

        let none: [&str; 0] = [];
        let defined = bridge.define(&none);
        prop_assert_eq!(defined.as_deref(), Some(ARITY_ERROR));
        prop_assert_eq!(bridge.session().stats(), before);
    }

    /// Every stored fact is found again, once, in load order.
    #[test]
    fn flat_round_trip(pairs in vec((-100i64..100, -100i64..100), 1..20)) {
        let mut bridge = Bridge::new(OutputMode::Flat);
        prop_assert_eq!(bridge.define(&[program(&pairs)]), None);

        let expected = distinct(&pairs)
            .iter()
            .map(|(a, b)| format!("f({},{})", a, b))
            .collect::<Vec<_>>()
            .join("\n");
        prop_assert_eq!(bridge.query(&["f(X,Y)"]), expected);
    }

    /// Structured output has one object per solution when a variable is present.
    #[test]
    fn structured_object_count(pairs in vec((0i64..10, 0i64..10), 1..20)) {
        let mut bridge = Bridge::new(OutputMode::Structured);
        prop_assert_eq!(bridge.define(&[program(&pairs)]), None);

        let out = bridge.query(&["f(X,Y)"]);
        let parsed: Vec<serde_json::Map<String, serde_json::Value>> =
            serde_json::from_str(&out).expect("json");
        prop_assert_eq!(parsed.len(), distinct(&pairs).len());
        for object in parsed {
            prop_assert_eq!(object.len(), 2);
        }
    }

    /// Ground queries answer with the marker or with nothing.
    #[test]
    fn ground_query_is_marker_or_empty(
        pairs in vec((0i64..5, 0i64..5), 1..10),
        a in 0i64..5,
        b in 0i64..5,
    ) {
        let mut bridge = Bridge::new(OutputMode::Structured);
        prop_assert_eq!(bridge.define(&[program(&pairs)]), None);

        let out = bridge.query(&[format!("f({},{})", a, b)]);
        if pairs.contains(&(a, b)) {
            prop_assert_eq!(out.as_str(), EMPTY_BINDINGS_MARKER);
        } else {
            prop_assert_eq!(out.as_str(), "[]");
        }
    }

    /// No solution is `[]` in structured mode and nothing at all in flat mode.
    #[test]
    fn zero_solutions_encode_empty(
        pairs in vec((0i64..10, 0i64..10), 1..10),
        missing in 10i64..100,
    ) {
        let text = program(&pairs);
        let query = format!("f({}, Y)", missing);

        let mut structured = Bridge::new(OutputMode::Structured);
        prop_assert_eq!(structured.define(&[text.as_str()]), None);
        prop_assert_eq!(structured.query(&[query.as_str()]), "[]");

        let mut flat = Bridge::new(OutputMode::Flat);
        prop_assert_eq!(flat.define(&[text.as_str()]), None);
        prop_assert_eq!(flat.query(&[query.as_str()]), "");
    }

    /// Failed defines and unknown relations leave the session answering as before.
    #[test]
    fn failures_keep_the_session_usable(
        pairs in vec((0i64..20, 0i64..20), 1..10),
        broken in prop::sample::select(vec!["p(X) :- q(X)", "f(1,", "f(1,2) g(", "p(X) :- !."]),
    ) {
        let mut bridge = Bridge::new(OutputMode::Flat);
        prop_assert_eq!(bridge.define(&[program(&pairs)]), None);
        let before = bridge.query(&["f(X,Y)"]);

        let defined = bridge.define(&[broken]);
        prop_assert!(defined.as_deref().is_some_and(|e| e.starts_with(ERROR_PREFIX)));
        prop_assert_eq!(bridge.query(&["f(X,Y)"]), before.clone());

        let unknown = bridge.query(&["undefined_relation(X)"]);
        prop_assert!(unknown.starts_with(ERROR_PREFIX));
        prop_assert_eq!(bridge.query(&["f(X,Y)"]), before);
    }

    /// Binding maps only ever hold variable names and never outgrow the query.
    #[test]
    fn binding_map_keys_are_query_variables(
        args in vec(arg_strategy(), 0..6),
        seed in -1000i64..1000,
    ) {
        let query = Atom::new("p", args.clone());
        let values = (0..args.len() as i64).map(|i| Constant::Number(seed + i)).collect();
        let solution = Atom::ground("p", values);

        let map = extract(&query, &solution).expect("aligned");
        prop_assert!(map.len() <= args.len());

        let variables: Vec<&str> = args
            .iter()
            .filter_map(|t| match t {
                Term::Variable(v) => Some(v.name()),
                Term::Constant(_) => None,
            })
            .collect();
        for key in map.keys() {
            prop_assert!(variables.contains(&key.as_str()));
        }
        for name in &variables {
            prop_assert!(map.contains_key(*name));
        }
    }
}
