//! Query translator: turns one GraphQL executable operation, validated against an augmented
//! schema, into a single SQL SELECT statement plus its positional bind values (spec §4.7-§4.11
//! of the design document this crate implements). Grounded on
//! `bandicoot/internal/sqlgen/translator.go` and its `sql`/`jsonpath` subpackages.

#![forbid(unsafe_code)]
#![deny(missing_debug_implementations, nonstandard_style)]

pub mod aggregate;
pub mod bind;
pub mod cancel;
pub mod config;
pub mod error;
mod jsonpath;
pub mod sql;
pub mod translator;
pub mod where_clause;

pub use cancel::CancellationToken;
pub use config::{HookContext, TranslationConfig, TranslationContext};
pub use error::TranslationError;
pub use translator::translate;
