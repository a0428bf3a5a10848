//! Reads the `@generateInputs(where:, orderBy:)` directive off a type, shared by the
//! Filters and Ordering augmenters' schema passes. Grounded on `newTypeConfig` in
//! `bandicoot/internal/sqlgen/augmentors/augmentor.go`.

use gqlsql_core::directives::generate_inputs_directive;
use gqlsql_core::schema::{DirectiveListExt, ExtendedType};

use crate::error::SchemaError;

pub struct TypeConfig {
    pub where_type: String,
    pub order_by_type: String,
}

/// Returns `None` when the type carries no `@generateInputs` directive at all (nothing to
/// do); returns `Err` when the directive is present but missing a required argument.
pub fn type_config(ty: &ExtendedType) -> Result<Option<TypeConfig>, SchemaError> {
    let Some(directive) = ty.directives().for_name(gqlsql_core::directives::GENERATE_INPUTS) else {
        return Ok(None);
    };
    let config = generate_inputs_directive(directive).ok_or_else(|| SchemaError::MissingGenerateInputsArgument {
        type_name: ty.name().to_string(),
        argument: "where",
    })?;
    if config.where_type.is_empty() {
        return Err(SchemaError::MissingGenerateInputsArgument { type_name: ty.name().to_string(), argument: "where" });
    }
    if config.order_by_type.is_empty() {
        return Err(SchemaError::MissingGenerateInputsArgument { type_name: ty.name().to_string(), argument: "orderBy" });
    }
    Ok(Some(TypeConfig { where_type: config.where_type, order_by_type: config.order_by_type }))
}
