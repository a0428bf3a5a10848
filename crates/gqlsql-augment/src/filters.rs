//! Filters augmenter (spec §4.3): synthesises `<snake>_bool_exp` input types per annotated
//! type, a comparator input type per scalar category, and attaches `where:` arguments.
//! Grounded on `bandicoot/internal/sqlgen/augmentors/filtering.go`.

use heck::ToSnakeCase;
use indexmap::IndexSet;

use gqlsql_core::introspect::{self, TYPE_BOOLEAN, TYPE_DATE_TIME, TYPE_EPOCH, TYPE_FLOAT, TYPE_ID, TYPE_INT, TYPE_IP, TYPE_MAC_ADDR, TYPE_STRING, TYPE_UUID};
use gqlsql_core::operators::{AND, NOT, OR};
use gqlsql_core::schema::{ExtendedType, FieldDefinition, InputObjectType, InputValueDefinition, Schema, Type};

use crate::error::SchemaError;
use crate::type_config::type_config;
use crate::Augmenter;

pub const WHERE_CLAUSE: &str = "where";

#[derive(Debug, Default)]
pub struct Filters;

impl Augmenter for Filters {
    fn on_schema(&self, schema: &mut Schema) -> Result<(), SchemaError> {
        // Declaration pass: register every bool-exp type up front so a field pointing
        // recursively at a not-yet-populated bool-exp still resolves.
        let mut bool_exps = Vec::new();
        for ty in schema.types.values() {
            if let Some(config) = type_config(ty)? {
                bool_exps.push((ty.name().to_string(), config.where_type));
            }
        }
        for (type_name, where_type) in &bool_exps {
            let mut input = InputObjectType::new(where_type.clone());
            input.description = Some(format!("Boolean filter expression for {type_name}"));
            schema.insert(ExtendedType::InputObject(input));
        }

        // Population pass.
        for (type_name, where_type) in &bool_exps {
            let member_field_sets = composite_member_fields(schema, type_name);
            let mut new_fields = Vec::new();
            for fields in &member_field_sets {
                for field in fields {
                    if let Some(entry) = comparator_field_for(schema, &bool_exps, field) {
                        new_fields.push(entry);
                    }
                }
            }
            let Some(ExtendedType::InputObject(bool_exp)) = schema.get_mut(where_type) else { continue };
            for (name, field) in new_fields {
                bool_exp.fields.insert(name, field);
            }
            for op in [AND, OR] {
                bool_exp.fields.insert(
                    op.to_string(),
                    InputValueDefinition::new(op, Type::list_of(Type::named(where_type.clone()).non_null())),
                );
            }
            bool_exp.fields.insert(NOT.to_string(), InputValueDefinition::new(NOT, Type::named(where_type.clone())));
        }
        Ok(())
    }

    fn on_field(&self, schema: &Schema, parent_name: &str, field: &mut FieldDefinition) -> Result<(), SchemaError> {
        let own_named = field.ty.inner_name();
        let named_type = if let Some(stripped) = field.name.strip_suffix("_aggregate") {
            if !own_named.ends_with("Aggregate") {
                own_named.to_string()
            } else {
                let Some(parent) = schema.get(parent_name) else { return Ok(()) };
                let Some(brother) = parent.fields().and_then(|f| f.get(stripped)) else { return Ok(()) };
                brother.ty.inner_name().to_string()
            }
        } else {
            if !introspect::is_composite(schema, own_named) {
                return Ok(());
            }
            own_named.to_string()
        };

        let filter_input = format!("{}_bool_exp", named_type.to_snake_case());
        if schema.get(&filter_input).is_none() {
            tracing::debug!(field = field.name, filter_input, "not adding filter by argument: input type absent");
            return Ok(());
        }
        if field.argument(WHERE_CLAUSE).is_some() {
            return Ok(());
        }
        field.arguments.push(
            InputValueDefinition::new(WHERE_CLAUSE, Type::named(filter_input)).with_description("filter the rows returned"),
        );
        Ok(())
    }
}

/// Returns, for a union, the field lists of each member; for anything else, its own field
/// list as the sole entry. Mirrors the Go population pass's `t.Kind == ast.Union` branch.
fn composite_member_fields<'a>(schema: &'a Schema, type_name: &str) -> Vec<Vec<&'a FieldDefinition>> {
    match schema.get(type_name) {
        Some(ExtendedType::Union(union)) => union
            .members
            .iter()
            .filter_map(|member| schema.get(member).and_then(ExtendedType::fields))
            .map(|fields| fields.values().collect())
            .collect(),
        Some(other) => other.fields().map(|fields| vec![fields.values().collect()]).into_iter().collect(),
        None => Vec::new(),
    }
}

/// Computes the `(field_name, bool-exp field)` entry for one source field, synthesising a
/// comparator type on demand. Returns `None` when the field's type has no resolvable
/// comparator (matching the Go original's "Failed to find type" skip, not a fatal error).
fn comparator_field_for(
    schema: &Schema,
    bool_exps: &[(String, String)],
    field: &FieldDefinition,
) -> Option<(String, InputValueDefinition)> {
    let named = field.ty.inner_name();
    if let Some((_, where_type)) = bool_exps.iter().find(|(type_name, _)| type_name == named) {
        return Some((
            field.name.clone(),
            InputValueDefinition::new(field.name.clone(), Type::named(where_type.clone()))
                .with_description(format!("filter by {}", field.name)),
        ));
    }
    if let Some(ExtendedType::Enum(_)) = schema.get(named) {
        let comparator_name = format!("{named}Comparator");
        return Some((
            field.name.clone(),
            InputValueDefinition::new(field.name.clone(), Type::named(comparator_name))
                .with_description(format!("filter by {}", field.name)),
        ));
    }
    let comparator_name = if field.ty.is_list() { format!("{named}ArrayComparator") } else { format!("{named}Comparator") };
    if schema.get(&comparator_name).is_none() {
        tracing::debug!(field = field.name, comparator_name, "failed to find comparator type");
        return None;
    }
    Some((
        field.name.clone(),
        InputValueDefinition::new(field.name.clone(), Type::named(comparator_name))
            .with_description(format!("filter by {}", field.name)),
    ))
}

/// Every scalar/array comparator type the schema might need, synthesised once up front
/// (rather than lazily, since the Go original relies on the `*Comparator` / `*ArrayComparator`
/// types already existing in hand-authored SDL — this crate generates the full closed set
/// from the operator table in spec §4.3 so hand-authoring them is unnecessary).
pub fn synthesize_comparators(schema: &mut Schema) {
    let mut enum_names = IndexSet::new();
    for ty in schema.types.values() {
        if let ExtendedType::Enum(_) = ty {
            enum_names.insert(ty.name().to_string());
        }
    }
    for scalar in [TYPE_ID, TYPE_INT, TYPE_FLOAT, TYPE_UUID, TYPE_EPOCH, TYPE_DATE_TIME, TYPE_STRING, TYPE_BOOLEAN, TYPE_MAC_ADDR] {
        if let Some(comparator) = scalar_comparator(scalar) {
            schema.insert(ExtendedType::InputObject(comparator));
        }
    }
    for scalar in [TYPE_STRING, TYPE_INT, TYPE_BOOLEAN, TYPE_IP] {
        if let Some(comparator) = array_comparator(scalar) {
            schema.insert(ExtendedType::InputObject(comparator));
        }
    }
    for name in &enum_names {
        schema.insert(ExtendedType::InputObject(enum_comparator(name)));
    }
}

#[derive(Clone, Copy)]
enum Operand {
    Same,
    ListOfSame,
    Int,
    Bool,
    String,
    Cidr,
    IpFamily,
}

fn operand_type(named: &str, operand: Operand) -> Type {
    match operand {
        Operand::Same => Type::named(named),
        Operand::ListOfSame => Type::list_of(Type::named(named)),
        Operand::Int => Type::named("Int"),
        Operand::Bool => Type::named("Boolean"),
        Operand::String => Type::named("String"),
        Operand::Cidr => Type::named("CIDR"),
        Operand::IpFamily => Type::named("IPFamily"),
    }
}

fn build_comparator(name: String, description: String, ops: &[(&str, Operand)], named: &str) -> InputObjectType {
    let mut input = InputObjectType::new(name);
    input.description = Some(description);
    for (op, operand) in ops {
        input
            .fields
            .insert((*op).to_string(), InputValueDefinition::new(*op, operand_type(named, *operand)).with_description(format!("{op} comparison operator")));
    }
    input
}

/// Per-scalar-category operator set, matching the table in spec §4.3 exactly.
fn scalar_comparator(named: &str) -> Option<InputObjectType> {
    use Operand::*;
    let ops: &[(&str, Operand)] = match named {
        TYPE_ID | TYPE_INT | TYPE_FLOAT | TYPE_UUID => {
            &[("exists", Bool), ("eq", Same), ("neq", Same), ("in", ListOfSame), ("not_in", ListOfSame), ("gt", Same), ("gte", Same), ("lt", Same), ("lte", Same)]
        }
        TYPE_EPOCH | TYPE_DATE_TIME => &[
            ("exists", Bool), ("eq", Same), ("neq", Same), ("in", ListOfSame), ("not_in", ListOfSame),
            ("gt", Same), ("gte", Same), ("lt", Same), ("lte", Same), ("days", Int),
        ],
        TYPE_STRING => &[
            ("exists", Bool), ("not", Bool), ("eq", Same), ("neq", Same), ("in", ListOfSame), ("not_in", ListOfSame),
            ("like", Same), ("not_like", Same), ("ilike", Same), ("not_ilike", Same), ("suffix", Same), ("prefix", Same),
        ],
        TYPE_BOOLEAN => &[("exists", Bool), ("eq", Same), ("neq", Same)],
        TYPE_MAC_ADDR => &[("exists", Bool), ("eq", Same), ("neq", Same), ("in", ListOfSame), ("not_in", ListOfSame)],
        _ => return None,
    };
    Some(build_comparator(format!("{named}Comparator"), format!("Comparison operators for {named}"), ops, named))
}

/// Array-column operator set, matching the `Array<...>` rows of the spec §4.3 table.
fn array_comparator(element: &str) -> Option<InputObjectType> {
    use Operand::*;
    let mut ops: Vec<(&str, Operand)> = vec![("contains", ListOfSame), ("contained_by", ListOfSame), ("overlap", ListOfSame), ("size", Int)];
    match element {
        TYPE_STRING => ops.push(("contains_regex", String)),
        TYPE_IP => {
            ops.push(("in_subnet", Cidr));
            ops.push(("ip_family", IpFamily));
        }
        TYPE_INT | TYPE_BOOLEAN => {}
        _ => return None,
    }
    Some(build_comparator(format!("{element}ArrayComparator"), format!("Comparison operators for an array of {element}"), &ops, element))
}

/// `<Enum>Comparator`: `eq, neq, in, not_in`, matching `addEnumComparator`.
fn enum_comparator(named: &str) -> InputObjectType {
    use Operand::*;
    build_comparator(
        format!("{named}Comparator"),
        format!("Enum filter expression for {named}"),
        &[("eq", Same), ("neq", Same), ("in", ListOfSame), ("not_in", ListOfSame)],
        named,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlsql_core::directives::GENERATE_INPUTS;
    use gqlsql_core::schema::{Argument, Directive, ObjectType, Value};

    fn annotated_schema() -> Schema {
        let mut schema = Schema::new();
        synthesize_comparators(&mut schema);
        let mut device = ObjectType::new("AdapterDevice");
        device.directives.push(Directive {
            name: GENERATE_INPUTS.into(),
            arguments: vec![
                Argument { name: "where".into(), value: Value::String("adapter_device_bool_exp".into()) },
                Argument { name: "orderBy".into(), value: Value::String("adapter_device_order_by".into()) },
            ],
        });
        device.fields.insert("hostname".into(), FieldDefinition::new("hostname", Type::named("String")));
        device.fields.insert("ipAddrs".into(), FieldDefinition::new("ipAddrs", Type::list_of(Type::named("IP"))));
        schema.insert(ExtendedType::Object(device));
        schema
    }

    #[test]
    fn bool_exp_gets_and_or_not_plus_scalar_comparators() {
        let mut schema = annotated_schema();
        Filters.on_schema(&mut schema).unwrap();
        let Some(ExtendedType::InputObject(bool_exp)) = schema.get("adapter_device_bool_exp") else { panic!("missing bool_exp") };
        assert!(bool_exp.fields.contains_key("hostname"));
        assert!(bool_exp.fields.contains_key("ipAddrs"));
        assert!(bool_exp.fields.contains_key(AND));
        assert!(bool_exp.fields.contains_key(OR));
        assert!(bool_exp.fields.contains_key(NOT));
    }

    #[test]
    fn string_comparator_has_like_family_but_not_gt() {
        let mut schema = Schema::new();
        synthesize_comparators(&mut schema);
        let Some(ExtendedType::InputObject(cmp)) = schema.get("StringComparator") else { panic!("missing comparator") };
        assert!(cmp.fields.contains_key("like"));
        assert!(cmp.fields.contains_key("ilike"));
        assert!(!cmp.fields.contains_key("gt"));
    }

    #[test]
    fn ip_array_comparator_has_subnet_and_family() {
        let mut schema = Schema::new();
        synthesize_comparators(&mut schema);
        let Some(ExtendedType::InputObject(cmp)) = schema.get("IPArrayComparator") else { panic!("missing comparator") };
        assert!(cmp.fields.contains_key("in_subnet"));
        assert!(cmp.fields.contains_key("ip_family"));
    }

    #[test]
    fn where_argument_attached_to_composite_list_field() {
        let mut schema = annotated_schema();
        Filters.on_schema(&mut schema).unwrap();
        let mut field = FieldDefinition::new("adapterDevices", Type::list_of(Type::named("AdapterDevice")));
        Filters.on_field(&schema, "Query", &mut field).unwrap();
        assert_eq!(field.argument(WHERE_CLAUSE).unwrap().ty, Type::named("adapter_device_bool_exp"));
    }
}
