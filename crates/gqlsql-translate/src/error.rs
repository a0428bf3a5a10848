//! Error kinds raised by translation (spec §7). `OperatorError` and `ValueCoercionError`
//! are permissive-by-default: outside of [`crate::config::TranslationConfig::lenient`] they
//! are wrapped into a fatal [`TranslationError`]; under `lenient: true` the predicate that
//! triggered them is dropped and a `warn!` is logged instead, matching the Go original's
//! "filter becomes more permissive" behaviour (spec §7, §9 Open Question).

use thiserror::Error;

/// An operator name outside the closed vocabulary (spec §4.3) for the field's scalar
/// category, or an operator applied to a type category that does not support it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("operator `{operator}` is not valid for field `{field}`")]
pub struct OperatorError {
    pub field: String,
    pub operator: String,
}

/// A bound value could not be coerced to the shape an operator expects (e.g. a non-CIDR
/// string handed to `in_subnet`, or a heterogeneous list handed to `in`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("cannot coerce value for operator `{operator}` on field `{field}`: {reason}")]
pub struct ValueCoercionError {
    pub field: String,
    pub operator: String,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("field `{0}` has no definition in the augmented schema")]
    MissingFieldDefinition(String),

    #[error("field `{0}` has a selection set but its type is not composite")]
    NonCompositeSelection(String),

    #[error("field `{0}` requires a selection set but none was given")]
    CompositeSelectionRequired(String),

    #[error("field `{0}` combines directives in an unsupported way")]
    UnknownDirectiveCombination(String),

    #[error("`{0}_aggregate_aggregate` nesting is not supported")]
    AggregateOfAggregate(String),

    #[error("`{0}` has no fragment definition in this document")]
    UnknownFragment(String),

    #[error(transparent)]
    Operator(#[from] OperatorError),

    #[error(transparent)]
    ValueCoercion(#[from] ValueCoercionError),

    #[error("translation was cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_error_converts_into_translation_error() {
        let err: TranslationError = OperatorError { field: "hostname".into(), operator: "frobnicate".into() }.into();
        assert!(matches!(err, TranslationError::Operator(_)));
    }
}
