//! Schema introspection helpers: unwrapping list/non-null wrappers to a named type,
//! classifying composite vs leaf, and the handful of scalar-category predicates the
//! augmenters and the translator both need. Grounded on
//! `bandicoot/internal/sqlgen/augmentors/augmentor.go`'s `getNamedType` and the type
//! name constants it declares alongside it.

use crate::schema::{ExtendedType, FieldDefinition, Schema, Type};

pub const TYPE_ID: &str = "ID";
pub const TYPE_STRING: &str = "String";
pub const TYPE_INT: &str = "Int";
pub const TYPE_FLOAT: &str = "Float";
pub const TYPE_BOOLEAN: &str = "Boolean";
pub const TYPE_DATE_TIME: &str = "Time";
pub const TYPE_EPOCH: &str = "Epoch";
pub const TYPE_UUID: &str = "UUID";
pub const TYPE_NULL_DATE_TIME: &str = "NullDateTime";
pub const TYPE_IP: &str = "IP";
pub const TYPE_MAC_ADDR: &str = "Mac";

/// Returns the named type of a field, unwrapping a single list wrapper if present.
/// Matches `getNamedType` in the Go original exactly, including its behaviour of
/// returning the outer name first and only falling through to the element for list
/// fields (GraphQL type expressions here are never doubly-list-wrapped in practice).
pub fn named_type(field: &FieldDefinition) -> &str {
    field.ty.inner_name()
}

pub fn is_internal_name(name: &str) -> bool {
    name.starts_with("__")
}

pub fn is_composite(schema: &Schema, type_name: &str) -> bool {
    schema.is_composite(type_name)
}

pub fn lookup<'a>(schema: &'a Schema, type_name: &str) -> Option<&'a ExtendedType> {
    schema.get(type_name)
}

/// True for the scalar categories the ordering augmenter considers orderable (spec §4.4):
/// ID, Int, DateTime, NullDateTime, String, Epoch.
pub fn is_orderable_scalar(type_name: &str) -> bool {
    matches!(
        type_name,
        TYPE_ID | TYPE_INT | TYPE_DATE_TIME | TYPE_NULL_DATE_TIME | TYPE_STRING | TYPE_EPOCH
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFunction {
    Sum,
    Avg,
    Min,
    Max,
    GroupBy,
}

impl AggregateFunction {
    /// Scalar categories eligible for this aggregate function, mirroring
    /// `aggFunctionTypes` in `augmentors/aggregation.go`: sum/avg restrict to numeric +
    /// epoch; min/max/groupBy additionally allow string, mac, ip and uuid.
    pub fn allowed_types(self) -> &'static [&'static str] {
        const NUMERIC: &[&str] = &[TYPE_INT, TYPE_FLOAT, TYPE_EPOCH];
        const BROAD: &[&str] = &[TYPE_EPOCH, TYPE_INT, TYPE_STRING, TYPE_MAC_ADDR, TYPE_IP, TYPE_UUID, TYPE_FLOAT];
        match self {
            AggregateFunction::Sum | AggregateFunction::Avg => NUMERIC,
            AggregateFunction::Min | AggregateFunction::Max | AggregateFunction::GroupBy => BROAD,
        }
    }
}

/// Unwraps a single level of list wrapping off a [`Type`], mirroring the bare `Elem`
/// field access used throughout the Go augmenters (`f.Type.Elem`).
pub fn list_element(ty: &Type) -> Option<&Type> {
    match ty {
        Type::List(inner) | Type::NonNullList(inner) => Some(inner),
        _ => None,
    }
}
