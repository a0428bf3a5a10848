//! Lowers an `apollo-parser` concrete syntax tree into this crate's owned
//! [`crate::schema::Schema`] / [`crate::executable::ExecutableDocument`] models.
//!
//! The conversion functions below follow the same shape as `apollo-encoder`'s
//! `from_parser.rs` (a long sequence of `TryFrom<apollo_parser::ast::X>` conversions that
//! walk the CST node-by-node, treating a missing required child as a parse error rather
//! than a panic) adapted to lower into a different target model than apollo-encoder's own.

use apollo_parser::{ast, Parser};
use indexmap::IndexMap;

use crate::error::ParseError;
use crate::executable::{
    ExecutableDocument, Field as ExecField, FragmentDefinition, OperationDefinition, OperationType, Selection,
};
use crate::schema::{
    Argument, Directive, DirectiveDefinition, EnumType, EnumValueDefinition, ExtendedType, FieldDefinition,
    InputObjectType, InputValueDefinition, InterfaceType, ObjectType, Schema, ScalarType, Type, UnionType, Value,
};

fn missing(what: &'static str) -> ParseError {
    ParseError::MissingNode(what)
}

fn lower_name(node: Option<ast::Name>, what: &'static str) -> Result<String, ParseError> {
    Ok(node.ok_or_else(|| missing(what))?.text().to_string())
}

/// Lowers a CST type expression into our [`Type`] model, matching the recursive
/// `NamedType`/`ListType`/`NonNullType` descent in `from_parser.rs`.
fn lower_type(node: ast::Type) -> Result<Type, ParseError> {
    match node {
        ast::Type::NamedType(named) => Ok(Type::Named(lower_name(named.name(), "NamedType.name")?)),
        ast::Type::ListType(list) => {
            let inner = lower_type(list.ty().ok_or_else(|| missing("ListType.ty"))?)?;
            Ok(Type::List(Box::new(inner)))
        }
        ast::Type::NonNullType(non_null) => {
            if let Some(named) = non_null.named_type() {
                Ok(Type::NonNullNamed(lower_name(named.name(), "NonNullType.named_type.name")?))
            } else if let Some(list) = non_null.list_type() {
                let inner = lower_type(list.ty().ok_or_else(|| missing("ListType.ty"))?)?;
                Ok(Type::NonNullList(Box::new(inner)))
            } else {
                Err(missing("NonNullType.named_type|list_type"))
            }
        }
    }
}

fn lower_value(node: ast::Value) -> Result<Value, ParseError> {
    match node {
        ast::Value::Variable(v) => Ok(Value::Variable(v.text().to_string())),
        ast::Value::StringValue(s) => Ok(Value::String(s.into())),
        ast::Value::FloatValue(f) => Ok(Value::Float(f.into())),
        ast::Value::IntValue(i) => Ok(Value::Int(i.into())),
        ast::Value::BooleanValue(b) => Ok(Value::Boolean(b.into())),
        ast::Value::NullValue(_) => Ok(Value::Null),
        ast::Value::EnumValue(e) => Ok(Value::Enum(e.name().ok_or_else(|| missing("EnumValue.name"))?.text().to_string())),
        ast::Value::ListValue(list) => {
            let mut items = Vec::new();
            for item in list.values() {
                items.push(lower_value(item)?);
            }
            Ok(Value::List(items))
        }
        ast::Value::ObjectValue(obj) => {
            let mut fields = Vec::new();
            for field in obj.object_fields() {
                let name = lower_name(field.name(), "ObjectField.name")?;
                let value = lower_value(field.value().ok_or_else(|| missing("ObjectField.value"))?)?;
                fields.push((name, value));
            }
            Ok(Value::Object(fields))
        }
    }
}

fn lower_default_value(node: ast::DefaultValue) -> Result<Value, ParseError> {
    lower_value(node.value().ok_or_else(|| missing("DefaultValue.value"))?)
}

fn lower_argument(node: ast::Argument) -> Result<Argument, ParseError> {
    Ok(Argument {
        name: lower_name(node.name(), "Argument.name")?,
        value: lower_value(node.value().ok_or_else(|| missing("Argument.value"))?)?,
    })
}

fn lower_directive(node: ast::Directive) -> Result<Directive, ParseError> {
    let mut arguments = Vec::new();
    if let Some(args) = node.arguments() {
        for arg in args.arguments() {
            arguments.push(lower_argument(arg)?);
        }
    }
    Ok(Directive {
        name: lower_name(node.name(), "Directive.name")?,
        arguments,
    })
}

fn lower_directives(node: Option<ast::Directives>) -> Result<Vec<Directive>, ParseError> {
    let mut directives = Vec::new();
    if let Some(node) = node {
        for directive in node.directives() {
            directives.push(lower_directive(directive)?);
        }
    }
    Ok(directives)
}

fn lower_description(node: Option<ast::Description>) -> Option<String> {
    node.and_then(|d| d.string_value()).map(|s| s.into())
}

fn lower_input_value_definition(node: ast::InputValueDefinition) -> Result<InputValueDefinition, ParseError> {
    let ty = lower_type(node.ty().ok_or_else(|| missing("InputValueDefinition.ty"))?)?;
    let mut value = InputValueDefinition::new(lower_name(node.name(), "InputValueDefinition.name")?, ty);
    value.description = lower_description(node.description());
    if let Some(default) = node.default_value() {
        value.default_value = Some(lower_default_value(default)?);
    }
    value.directives = lower_directives(node.directives())?;
    Ok(value)
}

fn lower_arguments_definition(node: Option<ast::ArgumentsDefinition>) -> Result<Vec<InputValueDefinition>, ParseError> {
    let mut arguments = Vec::new();
    if let Some(node) = node {
        for input_value in node.input_value_definitions() {
            arguments.push(lower_input_value_definition(input_value)?);
        }
    }
    Ok(arguments)
}

fn lower_field_definition(node: ast::FieldDefinition) -> Result<FieldDefinition, ParseError> {
    let ty = lower_type(node.ty().ok_or_else(|| missing("FieldDefinition.ty"))?)?;
    let mut field = FieldDefinition::new(lower_name(node.name(), "FieldDefinition.name")?, ty);
    field.description = lower_description(node.description());
    field.arguments = lower_arguments_definition(node.arguments_definition())?;
    field.directives = lower_directives(node.directives())?;
    Ok(field)
}

fn lower_fields_definition(node: Option<ast::FieldsDefinition>) -> Result<IndexMap<String, FieldDefinition>, ParseError> {
    let mut fields = IndexMap::new();
    if let Some(node) = node {
        for field in node.field_definitions() {
            let field = lower_field_definition(field)?;
            fields.insert(field.name.clone(), field);
        }
    }
    Ok(fields)
}

fn lower_implements_interfaces(node: Option<ast::ImplementsInterfaces>) -> Result<Vec<String>, ParseError> {
    let mut interfaces = Vec::new();
    if let Some(node) = node {
        for named in node.named_types() {
            interfaces.push(lower_name(named.name(), "NamedType.name")?);
        }
    }
    Ok(interfaces)
}

fn lower_object_type_definition(node: ast::ObjectTypeDefinition) -> Result<ObjectType, ParseError> {
    let mut object = ObjectType::new(lower_name(node.name(), "ObjectTypeDefinition.name")?);
    object.description = lower_description(node.description());
    object.directives = lower_directives(node.directives())?;
    object.implements_interfaces = lower_implements_interfaces(node.implements_interfaces())?;
    object.fields = lower_fields_definition(node.fields_definition())?;
    Ok(object)
}

fn lower_interface_type_definition(node: ast::InterfaceTypeDefinition) -> Result<InterfaceType, ParseError> {
    let mut interface = InterfaceType::new(lower_name(node.name(), "InterfaceTypeDefinition.name")?);
    interface.description = lower_description(node.description());
    interface.directives = lower_directives(node.directives())?;
    interface.implements_interfaces = lower_implements_interfaces(node.implements_interfaces())?;
    interface.fields = lower_fields_definition(node.fields_definition())?;
    Ok(interface)
}

fn lower_union_type_definition(node: ast::UnionTypeDefinition) -> Result<UnionType, ParseError> {
    let mut union = UnionType::new(lower_name(node.name(), "UnionTypeDefinition.name")?);
    union.description = lower_description(node.description());
    union.directives = lower_directives(node.directives())?;
    if let Some(members) = node.union_member_types() {
        for named in members.named_types() {
            union.members.push(lower_name(named.name(), "NamedType.name")?);
        }
    }
    Ok(union)
}

fn lower_enum_value_definition(node: ast::EnumValueDefinition) -> Result<EnumValueDefinition, ParseError> {
    let name = node
        .enum_value()
        .ok_or_else(|| missing("EnumValueDefinition.enum_value"))?
        .name()
        .ok_or_else(|| missing("EnumValue.name"))?
        .text()
        .to_string();
    let mut value = EnumValueDefinition::new(name);
    value.description = lower_description(node.description());
    value.directives = lower_directives(node.directives())?;
    Ok(value)
}

fn lower_enum_type_definition(node: ast::EnumTypeDefinition) -> Result<EnumType, ParseError> {
    let mut e = EnumType::new(lower_name(node.name(), "EnumTypeDefinition.name")?);
    e.description = lower_description(node.description());
    e.directives = lower_directives(node.directives())?;
    if let Some(values) = node.enum_values_definition() {
        for value in values.enum_value_definitions() {
            let value = lower_enum_value_definition(value)?;
            e.values.insert(value.name.clone(), value);
        }
    }
    Ok(e)
}

fn lower_input_object_type_definition(node: ast::InputObjectTypeDefinition) -> Result<InputObjectType, ParseError> {
    let mut input = InputObjectType::new(lower_name(node.name(), "InputObjectTypeDefinition.name")?);
    input.description = lower_description(node.description());
    input.directives = lower_directives(node.directives())?;
    if let Some(fields) = node.input_fields_definition() {
        for field in fields.input_value_definitions() {
            let field = lower_input_value_definition(field)?;
            input.fields.insert(field.name.clone(), field);
        }
    }
    Ok(input)
}

fn lower_scalar_type_definition(node: ast::ScalarTypeDefinition) -> Result<ScalarType, ParseError> {
    let mut scalar = ScalarType::new(lower_name(node.name(), "ScalarTypeDefinition.name")?);
    scalar.description = lower_description(node.description());
    scalar.directives = lower_directives(node.directives())?;
    Ok(scalar)
}

fn lower_directive_definition(node: ast::DirectiveDefinition) -> Result<DirectiveDefinition, ParseError> {
    Ok(DirectiveDefinition {
        name: lower_name(node.name(), "DirectiveDefinition.name")?,
        arguments: lower_arguments_definition(node.arguments_definition())?,
    })
}

fn lower_schema_definition(node: ast::SchemaDefinition, schema: &mut Schema) -> Result<(), ParseError> {
    for root in node.root_operation_type_definitions() {
        let op = root.operation_type().ok_or_else(|| missing("RootOperationTypeDefinition.operation_type"))?;
        let name = lower_name(root.named_type().and_then(|n| n.name()), "RootOperationTypeDefinition.named_type")?;
        if op.query_token().is_some() {
            schema.query_type = Some(name);
        } else if op.mutation_token().is_some() {
            schema.mutation_type = Some(name);
        } else if op.subscription_token().is_some() {
            schema.subscription_type = Some(name);
        }
    }
    Ok(())
}

/// Parses one or more concatenated `.graphql` SDL source texts into a single [`Schema`],
/// matching the Augmenter Driver's "parse into a single schema" step (spec §4.6). Later
/// definitions of the same type name overwrite earlier ones, the way `gqlparser.LoadSchema`
/// merges multiple sources keyed by type name.
pub fn parse_schema(sources: &[&str]) -> Result<Schema, ParseError> {
    let mut schema = Schema::new();
    if schema.query_type.is_none() {
        schema.query_type = Some("Query".to_string());
    }
    for source in sources {
        let tree = Parser::new(source).parse();
        if let Some(error) = tree.errors().next() {
            return Err(ParseError::Syntax(error.message().to_string(), source.chars().take(80).collect()));
        }
        for definition in tree.document().definitions() {
            match definition {
                ast::Definition::SchemaDefinition(def) => lower_schema_definition(def, &mut schema)?,
                ast::Definition::ScalarTypeDefinition(def) => schema.insert(ExtendedType::Scalar(lower_scalar_type_definition(def)?)),
                ast::Definition::ObjectTypeDefinition(def) => schema.insert(ExtendedType::Object(lower_object_type_definition(def)?)),
                ast::Definition::InterfaceTypeDefinition(def) => {
                    schema.insert(ExtendedType::Interface(lower_interface_type_definition(def)?))
                }
                ast::Definition::UnionTypeDefinition(def) => schema.insert(ExtendedType::Union(lower_union_type_definition(def)?)),
                ast::Definition::EnumTypeDefinition(def) => schema.insert(ExtendedType::Enum(lower_enum_type_definition(def)?)),
                ast::Definition::InputObjectTypeDefinition(def) => {
                    schema.insert(ExtendedType::InputObject(lower_input_object_type_definition(def)?))
                }
                ast::Definition::DirectiveDefinition(def) => {
                    let def = lower_directive_definition(def)?;
                    schema.directive_definitions.insert(def.name.clone(), def);
                }
                // Executable-only definitions and schema/type extensions are outside this
                // crate's scope: schema files augmented by this pipeline are whole-type
                // definitions, not incremental `extend` blocks.
                _ => {}
            }
        }
    }
    Ok(schema)
}

// --- Executable document lowering -----------------------------------------------------

fn lower_selection_set(node: ast::SelectionSet) -> Result<Vec<Selection>, ParseError> {
    let mut selections = Vec::new();
    for selection in node.selections() {
        selections.push(lower_selection(selection)?);
    }
    Ok(selections)
}

fn lower_selection(node: ast::Selection) -> Result<Selection, ParseError> {
    match node {
        ast::Selection::Field(field) => Ok(Selection::Field(lower_field(field)?)),
        ast::Selection::FragmentSpread(spread) => Ok(Selection::FragmentSpread {
            name: spread
                .fragment_name()
                .and_then(|n| n.name())
                .ok_or_else(|| missing("FragmentSpread.fragment_name"))?
                .text()
                .to_string(),
        }),
        ast::Selection::InlineFragment(fragment) => {
            let type_condition = match fragment.type_condition() {
                Some(tc) => Some(lower_name(tc.named_type().and_then(|n| n.name()), "TypeCondition.named_type")?),
                None => None,
            };
            let selection_set = match fragment.selection_set() {
                Some(set) => lower_selection_set(set)?,
                None => Vec::new(),
            };
            Ok(Selection::InlineFragment { type_condition, selection_set })
        }
    }
}

fn lower_field(node: ast::Field) -> Result<ExecField, ParseError> {
    let mut arguments = Vec::new();
    if let Some(args) = node.arguments() {
        for arg in args.arguments() {
            let arg = lower_argument(arg)?;
            arguments.push(crate::executable::Argument { name: arg.name, value: arg.value });
        }
    }
    let selection_set = match node.selection_set() {
        Some(set) => lower_selection_set(set)?,
        None => Vec::new(),
    };
    Ok(ExecField {
        name: lower_name(node.name(), "Field.name")?,
        alias: match node.alias() {
            Some(alias) => Some(lower_name(alias.name(), "Alias.name")?),
            None => None,
        },
        arguments,
        directives: lower_directives(node.directives())?,
        selection_set,
        // Filled in separately once the field is resolved against a schema; see
        // `resolve_field_types` below.
        definition_type: Type::Named(String::new()),
    })
}

/// Parses an executable GraphQL document (a query/mutation/subscription plus any
/// fragment definitions) into an [`ExecutableDocument`]. Type information on each
/// [`ExecField`] is left unresolved (`definition_type` is a placeholder) until
/// [`resolve_field_types`] is run against the augmented schema, mirroring the way the
/// Go original relies on the hosting GraphQL executor to populate `ast.Field.Definition`
/// before handing the field to the translator.
pub fn parse_executable(source: &str) -> Result<ExecutableDocument, ParseError> {
    let tree = Parser::new(source).parse();
    if let Some(error) = tree.errors().next() {
        return Err(ParseError::Syntax(error.message().to_string(), source.chars().take(80).collect()));
    }
    let mut document = ExecutableDocument::default();
    for definition in tree.document().definitions() {
        match definition {
            ast::Definition::OperationDefinition(def) => {
                let operation_type = match def.operation_type() {
                    Some(op) if op.mutation_token().is_some() => OperationType::Mutation,
                    Some(op) if op.subscription_token().is_some() => OperationType::Subscription,
                    _ => OperationType::Query,
                };
                let selection_set = match def.selection_set() {
                    Some(set) => lower_selection_set(set)?,
                    None => Vec::new(),
                };
                document.operations.push(OperationDefinition {
                    name: def.name().map(|n| n.text().to_string()),
                    operation_type,
                    selection_set,
                });
            }
            ast::Definition::FragmentDefinition(def) => {
                let name = def
                    .fragment_name()
                    .and_then(|n| n.name())
                    .ok_or_else(|| missing("FragmentDefinition.fragment_name"))?
                    .text()
                    .to_string();
                let type_condition = lower_name(
                    def.type_condition().and_then(|tc| tc.named_type()).and_then(|n| n.name()),
                    "FragmentDefinition.type_condition",
                )?;
                let selection_set = match def.selection_set() {
                    Some(set) => lower_selection_set(set)?,
                    None => Vec::new(),
                };
                document.fragments.insert(name.clone(), FragmentDefinition { name, type_condition, selection_set });
            }
            _ => {}
        }
    }
    Ok(document)
}

/// Walks every field in every operation and fragment, setting `definition_type` from the
/// augmented schema's field definitions. Root fields resolve against the schema's query
/// type; nested fields resolve against their parent's resolved type, descending through
/// fragment spreads and inline fragments the same way `translator.collectFields` does.
pub fn resolve_field_types(document: &mut ExecutableDocument, schema: &Schema) -> Result<(), ParseError> {
    let query_type = schema.query_type.clone().unwrap_or_else(|| "Query".to_string());
    let fragments = document.fragments.clone();
    for operation in &mut document.operations {
        resolve_selection_set(&mut operation.selection_set, &query_type, schema, &fragments)?;
    }
    Ok(())
}

fn resolve_selection_set(
    selections: &mut [Selection],
    parent_type: &str,
    schema: &Schema,
    fragments: &IndexMap<String, FragmentDefinition>,
) -> Result<(), ParseError> {
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                let parent = schema.get(parent_type).ok_or_else(|| ParseError::UnresolvedType(parent_type.to_string()))?;
                let definition = parent
                    .fields()
                    .and_then(|fields| fields.get(&field.name))
                    .ok_or_else(|| ParseError::UnresolvedType(format!("{parent_type}.{}", field.name)))?;
                field.definition_type = definition.ty.clone();
                let named = field.definition_type.inner_name().to_string();
                if schema.is_composite(&named) {
                    resolve_selection_set(&mut field.selection_set, &named, schema, fragments)?;
                }
            }
            Selection::InlineFragment { type_condition, selection_set } => {
                let next_type = type_condition.clone().unwrap_or_else(|| parent_type.to_string());
                resolve_selection_set(selection_set, &next_type, schema, fragments)?;
            }
            Selection::FragmentSpread { name } => {
                if let Some(fragment) = fragments.get(name) {
                    let mut cloned = fragment.selection_set.clone();
                    resolve_selection_set(&mut cloned, &fragment.type_condition, schema, fragments)?;
                    *selection = Selection::InlineFragment {
                        type_condition: Some(fragment.type_condition.clone()),
                        selection_set: cloned,
                    };
                } else {
                    return Err(ParseError::UnknownFragment(name.clone()));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_object_type_with_relation_directive() {
        let sdl = r#"
            type Query {
                adapterDevices: [AdapterDevice!]!
            }
            type AdapterDevice {
                id: ID!
                name: String!
                interfaces: [NetworkInterface!]! @relation(name: "network_interfaces", fkNames: ["id"], relationFkNames: ["deviceId"], relType: ONE_TO_MANY)
            }
            type NetworkInterface {
                macAddr: String!
            }
        "#;
        let schema = parse_schema(&[sdl]).expect("schema parses");
        let device = schema.get("AdapterDevice").expect("AdapterDevice defined");
        let fields = device.fields().expect("object has fields");
        let interfaces = fields.get("interfaces").expect("interfaces field");
        assert!(interfaces.directives.iter().any(|d| d.name == "relation"));
        assert_eq!(interfaces.ty.inner_name(), "NetworkInterface");
    }

    #[test]
    fn parses_executable_query_and_resolves_field_types() {
        let sdl = r#"
            type Query { adapterDevices: [AdapterDevice!]! }
            type AdapterDevice { name: String! hostname: String! }
        "#;
        let schema = parse_schema(&[sdl]).unwrap();
        let query = "{ adapterDevices { name hostname } }";
        let mut document = parse_executable(query).unwrap();
        resolve_field_types(&mut document, &schema).unwrap();
        let Selection::Field(root) = &document.operations[0].selection_set[0] else { panic!("expected field") };
        assert_eq!(root.name, "adapterDevices");
        assert_eq!(root.definition_type.inner_name(), "AdapterDevice");
    }

    #[test]
    fn unresolved_field_is_a_parse_error() {
        let sdl = "type Query { adapterDevices: [AdapterDevice!]! } type AdapterDevice { name: String! }";
        let schema = parse_schema(&[sdl]).unwrap();
        let mut document = parse_executable("{ adapterDevices { missing } }").unwrap();
        assert!(resolve_field_types(&mut document, &schema).is_err());
    }
}
