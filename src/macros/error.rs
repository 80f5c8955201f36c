//! Expansion errors

use thiserror::Error;

use super::placeholder::PlaceholderError;
use super::validation::GrammarError;
use crate::identifier::Identifier;

/// Errors during template expansion
///
/// Action indices are zero-based positions in the procedure's action list.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MacroError {
    /// Every required name absent from the arguments, in first-occurrence order
    #[error("Missing macro arguments for {procedure}: {}", .names.join(", "))]
    MissingArguments {
        procedure: Identifier,
        names: Vec<String>,
    },

    #[error("Malformed placeholder in {procedure}, action {action_index}: {reason}")]
    MalformedPlaceholder {
        procedure: Identifier,
        action_index: usize,
        reason: PlaceholderError,
    },

    #[error("Invalid expansion of {procedure}, action {action_index}: {error}")]
    InvalidExpansion {
        procedure: Identifier,
        action_index: usize,
        #[source]
        error: GrammarError,
    },
}

impl MacroError {
    /// Procedure the failed expansion belongs to
    pub fn procedure(&self) -> &Identifier {
        match self {
            MacroError::MissingArguments { procedure, .. }
            | MacroError::MalformedPlaceholder { procedure, .. }
            | MacroError::InvalidExpansion { procedure, .. } => procedure,
        }
    }
}
