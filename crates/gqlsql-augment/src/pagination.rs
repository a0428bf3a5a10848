//! Pagination augmenter (spec §4.2): adds `limit`/`offset` arguments to every list field
//! over a composite type. Grounded on `bandicoot/internal/sqlgen/augmentors/pagination.go`.

use gqlsql_core::introspect;
use gqlsql_core::schema::{FieldDefinition, Schema, Type, Value};

use crate::error::SchemaError;
use crate::Augmenter;

pub const LIMIT_CLAUSE: &str = "limit";
pub const OFFSET_CLAUSE: &str = "offset";

#[derive(Debug, Default)]
pub struct Pagination;

impl Augmenter for Pagination {
    fn on_schema(&self, _schema: &mut Schema) -> Result<(), SchemaError> {
        Ok(())
    }

    /// Idempotent: a field that already carries a `limit` argument (e.g. because this pass
    /// ran twice) is left untouched rather than given a duplicate argument.
    fn on_field(&self, schema: &Schema, _parent_name: &str, field: &mut FieldDefinition) -> Result<(), SchemaError> {
        let Some(element) = introspect::list_element(&field.ty) else { return Ok(()) };
        if !introspect::is_composite(schema, element.inner_name()) {
            return Ok(());
        }
        if field.argument(LIMIT_CLAUSE).is_some() {
            return Ok(());
        }
        field.arguments.push(
            gqlsql_core::schema::InputValueDefinition::new(LIMIT_CLAUSE, Type::named("Int"))
                .with_description("limit the number of rows returned.")
                .with_default(Value::Int(100)),
        );
        field.arguments.push(
            gqlsql_core::schema::InputValueDefinition::new(OFFSET_CLAUSE, Type::named("Int"))
                .with_description("skip the first n rows.")
                .with_default(Value::Int(0)),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlsql_core::schema::ObjectType;

    fn schema_with_composite_list_field() -> (Schema, FieldDefinition) {
        let mut schema = Schema::new();
        schema.insert(gqlsql_core::schema::ExtendedType::Object(ObjectType::new("AdapterDevice")));
        let field = FieldDefinition::new("adapterDevices", Type::list_of(Type::named("AdapterDevice")));
        (schema, field)
    }

    #[test]
    fn adds_limit_and_offset_to_composite_list_field() {
        let (schema, mut field) = schema_with_composite_list_field();
        Pagination.on_field(&schema, "Query", &mut field).unwrap();
        assert_eq!(field.argument(LIMIT_CLAUSE).unwrap().default_value.as_ref().unwrap().as_i64(), Some(100));
        assert_eq!(field.argument(OFFSET_CLAUSE).unwrap().default_value.as_ref().unwrap().as_i64(), Some(0));
    }

    #[test]
    fn skips_scalar_list_fields() {
        let schema = Schema::new();
        let mut field = FieldDefinition::new("names", Type::list_of(Type::named("String")));
        Pagination.on_field(&schema, "Query", &mut field).unwrap();
        assert!(field.argument(LIMIT_CLAUSE).is_none());
    }

    #[test]
    fn running_twice_does_not_duplicate_arguments() {
        let (schema, mut field) = schema_with_composite_list_field();
        Pagination.on_field(&schema, "Query", &mut field).unwrap();
        Pagination.on_field(&schema, "Query", &mut field).unwrap();
        assert_eq!(field.arguments.iter().filter(|a| a.name == LIMIT_CLAUSE).count(), 1);
    }
}
