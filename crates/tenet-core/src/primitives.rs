//! # Bridge Primitives
//!
//! Hardcoded constants for the Tenet bridge and engine.
//!
//! The sentinel strings are part of the host contract: hosts compare against
//! them verbatim, so they must never change between releases.

/// Returned when a host call carries anything other than exactly one argument.
pub const ARITY_ERROR: &str = "Invalid number of arguments";

/// Prefix of every non-arity failure string returned to a host.
pub const ERROR_PREFIX: &str = "Error: ";

/// Structured-mode output when solutions exist but none binds a variable.
///
/// Stands for "the query succeeded, there is nothing to report", which is
/// distinct from `[]` (no solutions at all).
pub const EMPTY_BINDINGS_MARKER: &str = "[{}]";

/// Separator between solutions in flat mode.
pub const FLAT_SEPARATOR: &str = "\n";

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for a single `define` payload (4 MiB).
///
/// Larger programs should be split across several define calls.
pub const MAX_PROGRAM_LENGTH: usize = 4 * 1024 * 1024;

/// Maximum length for a query string (64 KiB).
pub const MAX_QUERY_LENGTH: usize = 65536;

/// Maximum number of arguments of a single atom.
pub const MAX_ARITY: usize = 64;

/// Maximum number of facts a session may hold after evaluation,
/// asserted and derived together.
///
/// Datalog evaluation always terminates, but a small program can still
/// derive a very large model. Loads that would exceed this are rejected.
pub const MAX_MODEL_FACTS: usize = 2_000_000;

/// Maximum number of partial variable assignments a single rule application
/// may hold while joining its body.
///
/// Bounds the intermediate work of a join independently of how many facts
/// it finally derives.
pub const MAX_JOIN_BINDINGS: usize = 1_000_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_stable() {
        assert_eq!(ARITY_ERROR, "Invalid number of arguments");
        assert_eq!(ERROR_PREFIX, "Error: ");
        assert_eq!(EMPTY_BINDINGS_MARKER, "[{}]");
    }
}
