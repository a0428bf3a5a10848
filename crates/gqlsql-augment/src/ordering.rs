//! Ordering augmenter (spec §4.4): synthesises `<snake>_order_by` enums and attaches
//! `orderBy:` arguments to root-level composite list fields. Grounded on
//! `bandicoot/internal/sqlgen/augmentors/ordering.go`.

use heck::ToSnakeCase;

use gqlsql_core::introspect::{self, is_orderable_scalar};
use gqlsql_core::schema::{EnumType, EnumValueDefinition, ExtendedType, FieldDefinition, Schema, Type};

use crate::error::SchemaError;
use crate::type_config::type_config;
use crate::Augmenter;

pub const ORDER_BY_CLAUSE: &str = "orderBy";

#[derive(Debug, Default)]
pub struct Ordering;

impl Augmenter for Ordering {
    fn on_schema(&self, schema: &mut Schema) -> Result<(), SchemaError> {
        let mut order_by_names = Vec::new();
        for ty in schema.types.values() {
            if let Some(config) = type_config(ty)? {
                order_by_names.push((ty.name().to_string(), config.order_by_type));
            }
        }
        for (type_name, order_by_name) in &order_by_names {
            let mut enum_type = EnumType::new(order_by_name.clone());
            enum_type.description = Some(format!("Order for {type_name}"));
            schema.insert(ExtendedType::Enum(enum_type));
        }
        for (type_name, order_by_name) in &order_by_names {
            let Some(ExtendedType::Object(object)) = schema.get(type_name) else { continue };
            let mut values = Vec::new();
            for field in object.fields.values() {
                if is_orderable_scalar(field.ty.inner_name()) && !field.ty.is_list() {
                    values.push(order_by_value(&field.name, "ASC"));
                    values.push(order_by_value(&field.name, "DESC"));
                }
            }
            if values.is_empty() {
                schema.types.shift_remove(order_by_name);
                continue;
            }
            if let Some(ExtendedType::Enum(enum_type)) = schema.get_mut(order_by_name) {
                for value in values {
                    enum_type.values.insert(value.name.clone(), value);
                }
            }
        }
        Ok(())
    }

    /// Ordering is only offered on the root `Query` type, on fields whose element is a
    /// composite, non-aggregate type — matching the Go original's `p.Name != "Query"` guard.
    fn on_field(&self, schema: &Schema, parent_name: &str, field: &mut FieldDefinition) -> Result<(), SchemaError> {
        if parent_name != "Query" {
            return Ok(());
        }
        let Some(element) = gqlsql_core::introspect::list_element(&field.ty) else { return Ok(()) };
        let named = element.inner_name();
        if !introspect::is_composite(schema, named) || named.ends_with("Aggregate") {
            return Ok(());
        }
        let order_by_input = format!("{}_order_by", named.to_snake_case());
        if schema.get(&order_by_input).is_none() {
            tracing::debug!(field = field.name, order_by_input, "not adding order by argument: input type absent");
            return Ok(());
        }
        if field.argument(ORDER_BY_CLAUSE).is_some() {
            return Ok(());
        }
        field.arguments.push(gqlsql_core::schema::InputValueDefinition::new(
            ORDER_BY_CLAUSE,
            Type::list_of(Type::named(order_by_input).non_null()),
        ).with_description("sort the rows by one or more columns"));
        Ok(())
    }
}

fn order_by_value(field_name: &str, direction: &str) -> EnumValueDefinition {
    let verb = if direction == "ASC" { "ascending" } else { "descending" };
    EnumValueDefinition::new(format!("{field_name}_{direction}"))
        .with_description(format!("Order by {field_name} in a{} {verb} order", if verb == "ascending" { "n" } else { "" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlsql_core::directives::GENERATE_INPUTS;
    use gqlsql_core::schema::{Argument, Directive, ObjectType, Value};

    fn annotated_schema() -> Schema {
        let mut schema = Schema::new();
        let mut device = ObjectType::new("AdapterDevice");
        device.directives.push(Directive {
            name: GENERATE_INPUTS.into(),
            arguments: vec![
                Argument { name: "where".into(), value: Value::String("adapter_device_bool_exp".into()) },
                Argument { name: "orderBy".into(), value: Value::String("adapter_device_order_by".into()) },
            ],
        });
        device.fields.insert("hostname".into(), FieldDefinition::new("hostname", Type::named("String")));
        device.fields.insert("macAddr".into(), FieldDefinition::new("macAddr", Type::named("Mac")));
        schema.insert(ExtendedType::Object(device));
        schema
    }

    #[test]
    fn synthesises_order_by_enum_with_orderable_scalars_only() {
        let mut schema = annotated_schema();
        Ordering.on_schema(&mut schema).unwrap();
        let Some(ExtendedType::Enum(order_by)) = schema.get("adapter_device_order_by") else { panic!("expected enum") };
        assert!(order_by.values.contains_key("hostname_ASC"));
        assert!(order_by.values.contains_key("hostname_DESC"));
        assert!(!order_by.values.contains_key("macAddr_ASC"));
    }

    #[test]
    fn deletes_enum_when_no_orderable_fields_exist() {
        let mut schema = Schema::new();
        let mut object = ObjectType::new("Opaque");
        object.directives.push(Directive {
            name: GENERATE_INPUTS.into(),
            arguments: vec![
                Argument { name: "where".into(), value: Value::String("opaque_bool_exp".into()) },
                Argument { name: "orderBy".into(), value: Value::String("opaque_order_by".into()) },
            ],
        });
        object.fields.insert("macAddr".into(), FieldDefinition::new("macAddr", Type::named("Mac")));
        schema.insert(ExtendedType::Object(object));
        Ordering.on_schema(&mut schema).unwrap();
        assert!(schema.get("opaque_order_by").is_none());
    }

    #[test]
    fn attaches_order_by_only_on_query_root() {
        let mut schema = annotated_schema();
        Ordering.on_schema(&mut schema).unwrap();
        let mut root_field = FieldDefinition::new("adapterDevices", Type::list_of(Type::named("AdapterDevice")));
        Ordering.on_field(&schema, "Query", &mut root_field).unwrap();
        assert!(root_field.argument(ORDER_BY_CLAUSE).is_some());

        let mut nested_field = FieldDefinition::new("adapterDevices", Type::list_of(Type::named("AdapterDevice")));
        Ordering.on_field(&schema, "AdapterDevice", &mut nested_field).unwrap();
        assert!(nested_field.argument(ORDER_BY_CLAUSE).is_none());
    }
}
