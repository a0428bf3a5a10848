//! Aggregation augmenter (spec §4.5): synthesises `<Field>Aggregate` object types, their
//! `<field>_aggregate_<agg>_columns` enums, and the `<field>_aggregate` sibling field.
//! Grounded on `bandicoot/internal/sqlgen/augmentors/aggregation.go`.

use gqlsql_core::directives::JSON_PATH;
use gqlsql_core::introspect::{self, TYPE_EPOCH, TYPE_FLOAT, TYPE_INT, TYPE_IP, TYPE_MAC_ADDR, TYPE_STRING, TYPE_UUID};
use gqlsql_core::naming::string_in_slice;
use gqlsql_core::schema::{
    DirectiveListExt, EnumType, EnumValueDefinition, ExtendedType, FieldDefinition, InputValueDefinition, ObjectType,
    Schema, Type,
};

use crate::error::SchemaError;
use crate::Augmenter;

pub const SUM: &str = "sum";
pub const AVG: &str = "avg";
pub const MIN: &str = "min";
pub const MAX: &str = "max";
pub const GROUP_BY: &str = "groupBy";
pub const DISTINCT_ON: &str = "distinctOn";
pub const ORDER_BY_CLAUSE: &str = "orderBy";

const BROAD_AGGREGATE_TYPES: &[&str] = &[TYPE_EPOCH, TYPE_INT, TYPE_STRING, TYPE_MAC_ADDR, TYPE_IP, TYPE_UUID, TYPE_FLOAT];
const NUMERIC_AGGREGATE_TYPES: &[&str] = &[TYPE_INT, TYPE_FLOAT, TYPE_EPOCH];

fn allowed_types(aggregate_name: &str) -> Option<&'static [&'static str]> {
    match aggregate_name {
        SUM | AVG => Some(NUMERIC_AGGREGATE_TYPES),
        MIN | MAX | GROUP_BY => Some(BROAD_AGGREGATE_TYPES),
        _ => None,
    }
}

#[derive(Debug, Default)]
pub struct Aggregation;

impl Augmenter for Aggregation {
    fn on_schema(&self, schema: &mut Schema) -> Result<(), SchemaError> {
        let template: Vec<(String, Type)> = match schema.get("Aggregate") {
            Some(ExtendedType::Interface(iface)) => iface.fields.values().map(|f| (f.name.clone(), f.ty.clone())).collect(),
            _ => Vec::new(),
        };

        let type_names: Vec<String> = schema.types.keys().filter(|n| !n.starts_with("__")).cloned().collect();
        for type_name in type_names {
            let candidate_fields: Vec<FieldDefinition> = match schema.get(&type_name).and_then(ExtendedType::fields) {
                Some(fields) => fields.values().cloned().collect(),
                None => continue,
            };
            for field in &candidate_fields {
                let Some(element) = introspect::list_element(&field.ty) else { continue };
                if field.directives.for_name(JSON_PATH).is_some() {
                    continue;
                }
                let element_named = element.inner_name();
                if !introspect::is_composite(schema, element_named) {
                    continue;
                }
                let Some(sibling_args) = build_sibling_arguments(schema, element_named, &field.name) else { continue };
                let agg_name = build_aggregate_type(schema, &template, field, element_named);

                let mut sibling = FieldDefinition::new(format!("{}_aggregate", field.name), Type::list_of(Type::named(agg_name).non_null()));
                sibling.description = Some(format!("Returns aggregate of {}", field.name));
                sibling.directives = field.directives.clone();
                sibling.arguments = sibling_args;
                if let Some(fields) = schema.get_mut(&type_name).and_then(ExtendedType::fields_mut) {
                    fields.insert(sibling.name.clone(), sibling);
                }
            }
        }
        Ok(())
    }

    /// All of this augmenter's work happens in the schema pass; the field pass is a no-op,
    /// matching `Aggregation.Field` in the Go original.
    fn on_field(&self, _schema: &Schema, _parent_name: &str, _field: &mut FieldDefinition) -> Result<(), SchemaError> {
        Ok(())
    }
}

/// Builds the `<Field>Aggregate` object type and its per-function column enums, returning
/// its name. Matches `buildAggregate`.
fn build_aggregate_type(schema: &mut Schema, template: &[(String, Type)], field: &FieldDefinition, element_named: &str) -> String {
    let agg_name = format!("{}Aggregate", field.name);
    let mut agg_object = ObjectType::new(agg_name.clone());

    let source_fields: Vec<FieldDefinition> = schema
        .get(element_named)
        .and_then(ExtendedType::fields)
        .map(|fields| fields.values().cloned().collect())
        .unwrap_or_default();

    for (template_name, template_type) in template {
        let mut templated = FieldDefinition::new(template_name.clone(), template_type.clone());
        if let Some(allowed) = allowed_types(template_name) {
            let columns = aggregate_columns(&source_fields, allowed);
            if !columns.is_empty() {
                let columns_enum_name = format!("{}_aggregate_{template_name}_columns", field.name);
                let mut columns_enum = EnumType::new(columns_enum_name.clone());
                for column in columns {
                    columns_enum.values.insert(column.name.clone(), column);
                }
                schema.insert(ExtendedType::Enum(columns_enum));
                templated.arguments.push(
                    InputValueDefinition::new("column", Type::list_of(Type::named(columns_enum_name).non_null()).non_null())
                        .with_description("Aggregate functions compute a single result value from a set of input values"),
                );
            }
        }
        agg_object.fields.insert(templated.name.clone(), templated);
    }

    // A lowered copy of the original field lets the Aggregate object also project raw rows.
    let mut raw = field.clone();
    raw.ty = Type::list_of(Type::named(element_named));
    agg_object.fields.insert(raw.name.clone(), raw);

    schema.insert(ExtendedType::Object(agg_object));
    agg_name
}

/// `groupBy`/`distinctOn`/`orderBy` arguments for the `<field>_aggregate` sibling field.
/// Returns `None` when no groupable columns exist, matching `buildArguments` returning nil.
fn build_sibling_arguments(schema: &mut Schema, element_named: &str, field_name: &str) -> Option<Vec<InputValueDefinition>> {
    let source_fields: Vec<FieldDefinition> =
        schema.get(element_named).and_then(ExtendedType::fields).map(|fields| fields.values().cloned().collect())?;
    let allowed = allowed_types(GROUP_BY)?;
    let columns = aggregate_columns(&source_fields, allowed);
    if columns.is_empty() {
        return None;
    }
    let columns_enum_name = format!("{field_name}_aggregate_columns");
    let mut columns_enum = EnumType::new(columns_enum_name.clone());
    for column in columns {
        columns_enum.values.insert(column.name.clone(), column);
    }
    schema.insert(ExtendedType::Enum(columns_enum));

    Some(vec![
        InputValueDefinition::new(GROUP_BY, Type::list_of(Type::named(columns_enum_name.clone()).non_null()))
            .with_description("group by columns"),
        InputValueDefinition::new(DISTINCT_ON, Type::list_of(Type::named(columns_enum_name).non_null()))
            .with_description("distinct on columns"),
        InputValueDefinition::new(ORDER_BY_CLAUSE, Type::list_of(Type::named("AggregateOrdering").non_null()))
            .with_description("order by aggregation columns"),
    ])
}

/// Builds the enum values naming every column of `fields` whose named type is in
/// `allowed`. Matches `aggregateColumns`.
fn aggregate_columns(fields: &[FieldDefinition], allowed: &[&str]) -> Vec<EnumValueDefinition> {
    fields
        .iter()
        .filter(|f| string_in_slice(f.ty.inner_name(), &allowed.iter().map(|s| s.to_string()).collect::<Vec<_>>()))
        .map(|f| EnumValueDefinition::new(f.name.clone()).with_description(format!("aggregate by {}", f.name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlsql_core::schema::InterfaceType;

    fn schema_with_aggregate_interface() -> Schema {
        let mut schema = Schema::new();
        let mut aggregate_iface = InterfaceType::new("Aggregate");
        for name in [SUM, AVG, MIN, MAX, "count", GROUP_BY] {
            aggregate_iface.fields.insert(name.to_string(), FieldDefinition::new(name, Type::named("Int")));
        }
        schema.insert(ExtendedType::Interface(aggregate_iface));

        let mut device = ObjectType::new("AdapterDevice");
        device.fields.insert("name".into(), FieldDefinition::new("name", Type::named("String")));
        device.fields.insert("fetchCycle".into(), FieldDefinition::new("fetchCycle", Type::named("Int")));
        schema.insert(ExtendedType::Object(device));

        let mut query = ObjectType::new("Query");
        query.fields.insert(
            "adapterDevices".into(),
            FieldDefinition::new("adapterDevices", Type::list_of(Type::named("AdapterDevice"))),
        );
        schema.insert(ExtendedType::Object(query));
        schema
    }

    #[test]
    fn synthesises_aggregate_sibling_and_columns_enum() {
        let mut schema = schema_with_aggregate_interface();
        Aggregation.on_schema(&mut schema).unwrap();

        let Some(ExtendedType::Object(query)) = schema.get("Query") else { panic!("missing Query") };
        assert!(query.fields.contains_key("adapterDevices_aggregate"));

        let Some(ExtendedType::Object(agg)) = schema.get("adapterDevicesAggregate") else { panic!("missing aggregate object") };
        assert!(agg.fields.contains_key(SUM));
        assert!(agg.fields.contains_key("adapterDevices"));

        assert!(schema.get("adapterDevices_aggregate_columns").is_some());
        assert!(schema.get("adapterDevices_aggregate_sum_columns").is_some());
    }

    #[test]
    fn jsonpath_fields_are_never_aggregated() {
        let mut schema = schema_with_aggregate_interface();
        if let Some(ExtendedType::Object(query)) = schema.get_mut("Query") {
            if let Some(field) = query.fields.get_mut("adapterDevices") {
                field.directives.push(gqlsql_core::schema::Directive { name: JSON_PATH.into(), arguments: vec![] });
            }
        }
        Aggregation.on_schema(&mut schema).unwrap();
        let Some(ExtendedType::Object(query)) = schema.get("Query") else { panic!("missing Query") };
        assert!(!query.fields.contains_key("adapterDevices_aggregate"));
    }
}
