use thiserror::Error;

/// Errors raised while lexing/parsing GraphQL SDL or executable documents into
/// this crate's owned [`crate::schema::Schema`] / [`crate::executable::ExecutableDocument`]
/// models, or while resolving a named type reference against an already-parsed schema.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("{0} in {1}")]
    Syntax(String, String),

    #[error("expected {0} node was missing from the parse tree")]
    MissingNode(&'static str),

    #[error("type `{0}` is not defined in the schema")]
    UnresolvedType(String),

    #[error("`{0}` has no fragment definition in this document")]
    UnknownFragment(String),

    #[error("invalid integer literal: {0}")]
    InvalidInt(#[from] std::num::ParseIntError),

    #[error("invalid float literal: {0}")]
    InvalidFloat(#[from] std::num::ParseFloatError),
}
