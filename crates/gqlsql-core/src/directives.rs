//! The directive vocabulary: names, argument shapes, and typed readers for the four
//! directives the schema augmenter and translator understand. Grounded on
//! `bandicoot/internal/sqlgen/translator.go`'s directive name constants and
//! `bandicoot/internal/sqlgen/sql/directives.go`'s `getField*Directive` readers.

use crate::schema::{Directive, DirectiveListExt, FieldDefinition};

pub const GENERATE_INPUTS: &str = "generateInputs";
pub const JSON_PATH: &str = "jsonpath";
pub const RELATION: &str = "relation";
pub const VIEW_FUNCTION: &str = "viewFunction";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    OneToOne,
    OneToMany,
    ManyToMany,
}

impl RelationKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "ONE_TO_ONE" => Some(RelationKind::OneToOne),
            "ONE_TO_MANY" => Some(RelationKind::OneToMany),
            "MANY_TO_MANY" => Some(RelationKind::ManyToMany),
            _ => None,
        }
    }
}

/// The `@relation` directive's arguments, read positionally the way the Go original
/// reads `relDirective.Arguments[i]` rather than by name (the directive's argument
/// order is part of its stable shape).
#[derive(Debug, Clone, Default)]
pub struct RelationDirective {
    pub named_type: String,
    pub name: String,
    pub fk_names: Vec<String>,
    pub relation_fk_names: Vec<String>,
    pub rel_type: String,
    pub many_to_many_table: Option<String>,
    pub join_on: Vec<String>,
}

impl RelationDirective {
    pub fn kind(&self) -> Option<RelationKind> {
        RelationKind::parse(&self.rel_type)
    }

    /// Builds the `parent.fk = child.relation_fk AND ...` correlation predicate text,
    /// matching `relation.buildRelationClause` in the Go original.
    pub fn relation_clause(&self, parent_alias: &str, relation_alias: &str) -> String {
        use heck::ToSnakeCase;
        self.fk_names
            .iter()
            .zip(self.relation_fk_names.iter())
            .map(|(fk, rel_fk)| {
                format!(
                    "{parent_alias}.{} = {relation_alias}.{}",
                    fk.to_snake_case(),
                    rel_fk.to_snake_case()
                )
            })
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewFunctionDirective {
    pub name: String,
    pub arguments: Vec<String>,
}

impl ViewFunctionDirective {
    /// Builds `fn(parent.arg1, parent.arg2, ...)`, matching `viewFunction.buildFunctionClause`.
    pub fn function_clause(&self, parent_alias: &str) -> String {
        let args: Vec<String> = self.arguments.iter().map(|a| format!("{parent_alias}.{a}")).collect();
        format!("{}({})", self.name, args.join(","))
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsonPathDirective {
    pub name: String,
    pub depends: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GenerateInputsDirective {
    pub where_type: String,
    pub order_by_type: String,
}

fn directive_str_arg(directive: &Directive, name: &str) -> Option<String> {
    directive.argument(name).and_then(|v| v.as_str()).map(str::to_string)
}

fn directive_list_arg(directive: &Directive, name: &str) -> Vec<String> {
    directive.argument(name).map(|v| v.as_string_list()).unwrap_or_default()
}

/// Reads the `@relation` directive off a field definition, if present. The `name`
/// carried in the directive is the target table name, and `selectionDefinition.Type.Name()`
/// (the field's own declared type) supplies `named_type`, matching the Go reader.
pub fn relation_directive(field: &FieldDefinition) -> Option<RelationDirective> {
    let directive = field.directives.for_name(RELATION)?;
    Some(RelationDirective {
        named_type: field.ty.inner_name().to_string(),
        name: directive_str_arg(directive, "name").unwrap_or_default(),
        fk_names: directive_list_arg(directive, "fkNames"),
        relation_fk_names: directive_list_arg(directive, "relationFkNames"),
        rel_type: directive_str_arg(directive, "relType").unwrap_or_default(),
        many_to_many_table: directive_str_arg(directive, "manyToManyTable"),
        join_on: directive_list_arg(directive, "joinOn"),
    })
}

pub fn view_function_directive(field: &FieldDefinition) -> Option<ViewFunctionDirective> {
    let directive = field.directives.for_name(VIEW_FUNCTION)?;
    Some(ViewFunctionDirective {
        name: directive_str_arg(directive, "name").unwrap_or_default(),
        arguments: directive_list_arg(directive, "arguments"),
    })
}

pub fn json_path_directive(field: &FieldDefinition) -> Option<JsonPathDirective> {
    let directive = field.directives.for_name(JSON_PATH)?;
    Some(JsonPathDirective {
        name: directive_str_arg(directive, "name").unwrap_or_default(),
        depends: directive_list_arg(directive, "depends"),
    })
}

pub fn generate_inputs_directive(directive: &Directive) -> Option<GenerateInputsDirective> {
    if directive.name != GENERATE_INPUTS {
        return None;
    }
    Some(GenerateInputsDirective {
        where_type: directive_str_arg(directive, "where")?,
        order_by_type: directive_str_arg(directive, "orderBy")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Argument, Type, Value};

    fn relation_field() -> FieldDefinition {
        let mut field = FieldDefinition::new("interfaces", Type::list_of(Type::named("NetworkInterface")));
        field.directives.push(Directive {
            name: RELATION.into(),
            arguments: vec![
                Argument { name: "name".into(), value: Value::String("network_interfaces".into()) },
                Argument {
                    name: "fkNames".into(),
                    value: Value::List(vec![Value::String("id".into()), Value::String("fetchCycle".into())]),
                },
                Argument {
                    name: "relationFkNames".into(),
                    value: Value::List(vec![Value::String("deviceId".into()), Value::String("fetchCycle".into())]),
                },
                Argument { name: "relType".into(), value: Value::Enum("ONE_TO_MANY".into()) },
            ],
        });
        field
    }

    #[test]
    fn reads_relation_directive_and_builds_clause() {
        let field = relation_field();
        let rel = relation_directive(&field).expect("relation directive present");
        assert_eq!(rel.kind(), Some(RelationKind::OneToMany));
        assert_eq!(
            rel.relation_clause("sq1", "sq2"),
            "sq1.id = sq2.device_id AND sq1.fetch_cycle = sq2.fetch_cycle"
        );
    }

    #[test]
    fn missing_directive_returns_none() {
        let field = FieldDefinition::new("name", Type::named("String"));
        assert!(relation_directive(&field).is_none());
    }
}
