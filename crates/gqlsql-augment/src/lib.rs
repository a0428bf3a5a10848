//! Schema augmenter: deterministically synthesises filter, ordering, pagination, and
//! aggregation input types from a directive-annotated GraphQL schema (spec §4.2-§4.6 of
//! the design document this crate implements). Grounded on
//! `bandicoot/internal/sqlgen/augmentors`.

#![forbid(unsafe_code)]
#![deny(missing_debug_implementations, nonstandard_style)]

pub mod aggregation;
pub mod driver;
pub mod error;
pub mod filters;
pub mod ordering;
pub mod pagination;
mod printer;
mod type_config;

pub use aggregation::Aggregation;
pub use driver::generate;
pub use error::SchemaError;
pub use filters::Filters;
pub use ordering::Ordering;
pub use pagination::Pagination;

use gqlsql_core::schema::{FieldDefinition, Schema};

/// One augmentation pass. An augmenter first gets a chance to add whole new types to the
/// schema (`on_schema`), then — once every augmenter's schema pass has run — gets a chance
/// to add arguments/directives to each non-internal field (`on_field`). This mirrors the
/// Go original's `Augmenter` interface (`augmentors/augmentor.go`) exactly, down to running
/// all `Schema` passes before any `Field` pass so that types referenced recursively (e.g.
/// a bool-exp referencing itself) already exist by the time fields are populated.
pub trait Augmenter {
    fn on_schema(&self, schema: &mut Schema) -> Result<(), SchemaError>;

    fn on_field(&self, schema: &Schema, parent_name: &str, field: &mut FieldDefinition) -> Result<(), SchemaError>;
}
