//! Canonical-SDL printer for the augmented schema (spec §4.6, §6): turns a [`Schema`] back
//! into GraphQL text prefixed with a `# Code generated ... DO NOT EDIT` header. Grounded on
//! `apollo-encoder`'s per-definition `Display` impls (`object_def.rs`, `schema.rs`) — this
//! module writes the same shape of output (one blank-line-free block per definition,
//! two-space field indentation, `"""`-fenced multi-line descriptions) directly over this
//! crate's own [`Schema`] model rather than apollo-encoder's builder types, since the model
//! here is already the thing being printed rather than something assembled just for output.

use std::fmt::Write as _;

use gqlsql_core::epoch::Epoch;
use gqlsql_core::introspect::is_internal_name;
use gqlsql_core::schema::{
    Directive, EnumType, ExtendedType, FieldDefinition, InputObjectType, InputValueDefinition, InterfaceType,
    ObjectType, ScalarType, Schema, UnionType, Value,
};

/// Renders the full augmented schema, matching the Augmenter Driver's "write the result
/// back as canonical GraphQL text with a generation header" step (spec §4.6).
pub fn format_schema(schema: &Schema, generated_at: Epoch) -> String {
    let mut out = String::new();
    writeln!(out, "# Code generated by gqlsql-augment. DO NOT EDIT.").unwrap();
    writeln!(out, "# generated_at_epoch_millis: {generated_at}").unwrap();
    out.push('\n');

    for directive_def in schema.directive_definitions.values() {
        if is_internal_name(&directive_def.name) {
            continue;
        }
        write!(out, "directive @{}", directive_def.name).unwrap();
        if !directive_def.arguments.is_empty() {
            write!(out, "({})", format_input_value_list(&directive_def.arguments)).unwrap();
        }
        out.push('\n');
    }

    for ty in schema.types.values() {
        if is_internal_name(ty.name()) {
            continue;
        }
        format_type(&mut out, ty);
    }
    out
}

fn format_description(out: &mut String, description: &Option<String>, indent: &str) {
    let Some(description) = description else { return };
    if description.contains('\n') {
        writeln!(out, "{indent}\"\"\"\n{indent}{description}\n{indent}\"\"\"").unwrap();
    } else {
        writeln!(out, "{indent}\"{description}\"").unwrap();
    }
}

fn format_directives(out: &mut String, directives: &[Directive]) {
    for directive in directives {
        write!(out, " @{}", directive.name).unwrap();
        if !directive.arguments.is_empty() {
            let args: Vec<String> = directive.arguments.iter().map(|a| format!("{}: {}", a.name, a.value)).collect();
            write!(out, "({})", args.join(", ")).unwrap();
        }
    }
}

fn format_input_value(value: &InputValueDefinition) -> String {
    let mut rendered = format!("{}: {}", value.name, value.ty);
    if let Some(default) = &value.default_value {
        write!(rendered, " = {default}").unwrap();
    }
    for directive in &value.directives {
        let mut buf = String::new();
        format_directives(&mut buf, std::slice::from_ref(directive));
        rendered.push_str(&buf);
    }
    rendered
}

fn format_input_value_list(values: &[InputValueDefinition]) -> String {
    values.iter().map(format_input_value).collect::<Vec<_>>().join(", ")
}

fn format_field(out: &mut String, field: &FieldDefinition) {
    format_description(out, &field.description, "  ");
    write!(out, "  {}", field.name).unwrap();
    if !field.arguments.is_empty() {
        write!(out, "({})", format_input_value_list(&field.arguments)).unwrap();
    }
    write!(out, ": {}", field.ty).unwrap();
    format_directives(out, &field.directives);
    out.push('\n');
}

fn format_object_like(out: &mut String, name: &str, keyword: &str, implements: &[String], directives: &[Directive], fields: &indexmap::IndexMap<String, FieldDefinition>) {
    write!(out, "{keyword} {name}").unwrap();
    for (i, interface) in implements.iter().enumerate() {
        if i == 0 {
            write!(out, " implements {interface}").unwrap();
        } else {
            write!(out, " & {interface}").unwrap();
        }
    }
    format_directives(out, directives);
    writeln!(out, " {{").unwrap();
    for field in fields.values() {
        format_field(out, field);
    }
    writeln!(out, "}}").unwrap();
}

fn format_object(out: &mut String, ty: &ObjectType) {
    format_description(out, &ty.description, "");
    format_object_like(out, &ty.name, "type", &ty.implements_interfaces, &ty.directives, &ty.fields);
}

fn format_interface(out: &mut String, ty: &InterfaceType) {
    format_description(out, &ty.description, "");
    format_object_like(out, &ty.name, "interface", &ty.implements_interfaces, &ty.directives, &ty.fields);
}

fn format_union(out: &mut String, ty: &UnionType) {
    format_description(out, &ty.description, "");
    write!(out, "union {}", ty.name).unwrap();
    format_directives(out, &ty.directives);
    writeln!(out, " = {}", ty.members.join(" | ")).unwrap();
}

fn format_enum(out: &mut String, ty: &EnumType) {
    format_description(out, &ty.description, "");
    write!(out, "enum {}", ty.name).unwrap();
    format_directives(out, &ty.directives);
    writeln!(out, " {{").unwrap();
    for value in ty.values.values() {
        format_description(out, &value.description, "  ");
        write!(out, "  {}", value.name).unwrap();
        format_directives(out, &value.directives);
        out.push('\n');
    }
    writeln!(out, "}}").unwrap();
}

fn format_input_object(out: &mut String, ty: &InputObjectType) {
    format_description(out, &ty.description, "");
    write!(out, "input {}", ty.name).unwrap();
    format_directives(out, &ty.directives);
    writeln!(out, " {{").unwrap();
    for field in ty.fields.values() {
        format_description(out, &field.description, "  ");
        writeln!(out, "  {}", format_input_value(field)).unwrap();
    }
    writeln!(out, "}}").unwrap();
}

fn format_scalar(out: &mut String, ty: &ScalarType) {
    format_description(out, &ty.description, "");
    write!(out, "scalar {}", ty.name).unwrap();
    format_directives(out, &ty.directives);
    out.push('\n');
}

fn format_type(out: &mut String, ty: &ExtendedType) {
    match ty {
        ExtendedType::Object(t) => format_object(out, t),
        ExtendedType::Interface(t) => format_interface(out, t),
        ExtendedType::Union(t) => format_union(out, t),
        ExtendedType::Enum(t) => format_enum(out, t),
        ExtendedType::InputObject(t) => format_input_object(out, t),
        ExtendedType::Scalar(t) => format_scalar(out, t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gqlsql_core::schema::Type;
    use pretty_assertions::assert_eq;

    #[test]
    fn formats_object_with_field_arguments_and_directive() {
        let mut schema = Schema::new();
        let mut object = ObjectType::new("AdapterDevice");
        let mut field = FieldDefinition::new("name", Type::named("String").non_null());
        field.description = Some("The device's hostname".to_string());
        object.fields.insert(field.name.clone(), field);
        schema.insert(ExtendedType::Object(object));

        let text = format_schema(&schema, Epoch::from_millis(0).unwrap());
        assert!(text.starts_with("# Code generated by gqlsql-augment. DO NOT EDIT.\n"));
        assert!(text.contains("type AdapterDevice {\n"));
        assert!(text.contains("  \"The device's hostname\"\n  name: String!\n"));
    }

    #[test]
    fn formats_enum_and_input_object() {
        let mut schema = Schema::new();
        let mut order_by = EnumType::new("adapter_device_order_by");
        order_by.values.insert("hostname_ASC".into(), gqlsql_core::schema::EnumValueDefinition::new("hostname_ASC"));
        schema.insert(ExtendedType::Enum(order_by));

        let mut bool_exp = InputObjectType::new("adapter_device_bool_exp");
        bool_exp.fields.insert("hostname".into(), InputValueDefinition::new("hostname", Type::named("StringComparator")));
        schema.insert(ExtendedType::InputObject(bool_exp));

        let text = format_schema(&schema, Epoch::from_millis(0).unwrap());
        assert!(text.contains("enum adapter_device_order_by {\n  hostname_ASC\n}\n"));
        assert!(text.contains("input adapter_device_bool_exp {\n  hostname: StringComparator\n}\n"));
    }
}
