//! Runtime errors

use thiserror::Error;

use crate::types::FieldName;

/// Runtime result type
pub type Result<T> = std::result::Result<T, Error>;

/// Runtime errors
///
/// Syntax, UnknownField, DuplicateName, InvalidState and
/// InsufficientEnergy abort before any mutation. ConservationViolation
/// and EntropyViolation are post-condition failures: the registry has
/// already been restored to its pre-operation state when they surface.
#[derive(Debug, Error)]
pub enum Error {
    #[error("syntax error in '{command}': {source}")]
    Syntax {
        command: String,
        #[source]
        source: cyclic_dsl::ParseError,
    },

    #[error("unknown field: {0}")]
    UnknownField(FieldName),

    #[error("duplicate field name: {0}")]
    DuplicateName(FieldName),

    #[error("invalid state for {field}: {reason}")]
    InvalidState { field: FieldName, reason: String },

    #[error("insufficient energy in {field}: transition costs {required} J, {available} J available")]
    InsufficientEnergy {
        field: FieldName,
        required: f64,
        available: f64,
    },

    #[error("energy not conserved: {before} J -> {after} J (difference {difference})")]
    ConservationViolation {
        before: f64,
        after: f64,
        difference: f64,
    },

    #[error("entropy decreased for {field}: {before} -> {after}")]
    EntropyViolation {
        field: FieldName,
        before: f64,
        after: f64,
    },

    #[error("script error at line {line}: {source}")]
    Script {
        line: usize,
        #[source]
        source: Box<Error>,
    },
}
