//! Directive vocabulary, schema model, and GraphQL parsing front-end shared by
//! [`gqlsql-augment`](https://docs.rs/gqlsql-augment) (the schema augmenter) and
//! [`gqlsql-translate`](https://docs.rs/gqlsql-translate) (the query translator).
//!
//! Neither downstream crate parses GraphQL text itself: this crate owns the CST-to-model
//! lowering (see [`parse`]) so that the augmented-schema shape produced by one half of the
//! pipeline is exactly the shape the other half consumes.

#![forbid(unsafe_code)]
#![deny(missing_debug_implementations, nonstandard_style)]

pub mod directives;
pub mod epoch;
pub mod error;
pub mod executable;
pub mod introspect;
pub mod naming;
pub mod operators;
pub mod parse;
pub mod schema;

pub use error::ParseError;
pub use executable::ExecutableDocument;
pub use schema::Schema;
