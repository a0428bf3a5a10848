use thiserror::Error;

/// Errors raised while running the schema augmenter. All are fatal: the driver
/// (`crate::driver::generate`) aborts and writes no output on the first one encountered,
/// matching the Go original's `log.Fatalf` behaviour in `augmentors.Generate`.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing `{argument}` argument for @generateInputs on type `{type_name}`")]
    MissingGenerateInputsArgument { type_name: String, argument: &'static str },

    #[error("type `{0}` is not defined in the schema")]
    UnresolvedType(String),

    #[error(transparent)]
    Parse(#[from] gqlsql_core::ParseError),

    #[error("failed to read schema source `{path}`: {source}")]
    Io { path: String, source: std::io::Error },
}
