//! # One-Shot Programs
//!
//! Evaluate a self-contained program in a throwaway interpreter. The last
//! clause of the text is the question:
//!
//! ```text
//! uses("order-service", "log4j", "2.14").
//! vulnerable("log4j", "2.14").
//! exposed(S) :- uses(S, L, V), vulnerable(L, V).
//! exposed(S).
//! ```
//!
//! Answers are the matching facts in flat form. [`run_program_json`] wraps
//! the outcome in a `{"status": ...}` envelope for hosts that want one string.

use crate::engine::{Engine, Interpreter};
use crate::parser::parse_program;
use crate::primitives::MAX_PROGRAM_LENGTH;
use crate::TenetError;
use serde::{Deserialize, Serialize};

/// Outcome of a one-shot run, as serialized for hosts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ProgramReport {
    Success { data: Vec<String> },
    Error { message: String },
}

/// Evaluate `text` and answer its final clause.
pub fn run_program(text: &str) -> Result<Vec<String>, TenetError> {
    if text.trim().is_empty() {
        return Err(TenetError::Program("input is empty".to_string()));
    }
    if text.len() > MAX_PROGRAM_LENGTH {
        return Err(TenetError::InputTooLarge {
            what: "program",
            len: text.len(),
            max: MAX_PROGRAM_LENGTH,
        });
    }

    let mut clauses = parse_program(text)?;
    let Some(last) = clauses.pop() else {
        return Err(TenetError::Program("no clauses found in input".to_string()));
    };
    if !last.is_fact() {
        return Err(TenetError::Program(
            "the last clause must be a query atom, not a rule".to_string(),
        ));
    }

    let mut interpreter = Interpreter::default();
    interpreter.define_clauses(clauses)?;
    // the question's predicate counts as declared, so asking about
    // something the program never mentions has no answers
    let answers = match interpreter.query(&last.head) {
        Err(TenetError::UnknownPredicate(_)) => Vec::new(),
        other => other?,
    };
    Ok(answers.iter().map(ToString::to_string).collect())
}

/// [`run_program`] as a JSON envelope. Never fails.
pub fn run_program_json(text: &str) -> String {
    let report = match run_program(text) {
        Ok(data) => ProgramReport::Success { data },
        Err(e) => ProgramReport::Error {
            message: e.to_string(),
        },
    };
    serde_json::to_string(&report).unwrap_or_else(|e| {
        format!(
            r#"{{"status":"error","message":"cannot encode report: {}"}}"#,
            e.to_string().replace('"', "'")
        )
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_clause_is_the_question() {
        let answers = run_program(
            r#"
            uses("order-service", "log4j", "2.14").
            uses("billing", "serde", "1.0").
            vulnerable("log4j", "2.14").
            exposed(S) :- uses(S, L, V), vulnerable(L, V).
            exposed(S).
            "#,
        )
        .expect("run");
        assert_eq!(answers, vec![r#"exposed("order-service")"#]);
    }

    #[test]
    fn rule_as_last_clause_is_rejected() {
        let err = run_program("a(1). b(X) :- a(X).").expect_err("must fail");
        assert!(err.to_string().contains("query atom"), "{}", err);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(run_program("   \n").is_err());
        assert!(run_program("# only a comment\n").is_err());
    }

    #[test]
    fn runs_do_not_share_state() {
        assert_eq!(run_program("a(1). a(X).").expect("run"), vec!["a(1)"]);
        assert!(run_program("a(X).").expect("run").is_empty());
    }

    #[test]
    fn undeclared_question_has_no_answers() {
        assert!(run_program("a(1). b(X).").expect("run").is_empty());
        assert_eq!(
            run_program_json("a(1). b(X)."),
            r#"{"status":"success","data":[]}"#
        );
        assert!(matches!(
            run_program("a(1). a(X, Y)."),
            Err(TenetError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn json_envelope() {
        assert_eq!(
            run_program_json("a(1). a(2). a(X)."),
            r#"{"status":"success","data":["a(1)","a(2)"]}"#
        );
        let err: ProgramReport = serde_json::from_str(&run_program_json("a(")).expect("json");
        assert!(matches!(err, ProgramReport::Error { .. }));
    }
}
