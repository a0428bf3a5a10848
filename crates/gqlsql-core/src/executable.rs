//! The parsed-operation model consumed by the translator: fields, selection sets,
//! fragments, and argument resolution against a variable map. Mirrors the shape of
//! `ast.Field` / `ast.SelectionSet` / `ast.FragmentDefinitionList` from the Go
//! implementation, and `ast.Field.ArgumentMap(variables)` specifically.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::schema::{Directive, Type, Value};

#[derive(Debug, Clone)]
pub struct Argument {
    pub name: String,
    pub value: Value,
}

/// One selected field, with its own argument list, directives, and (if the field's
/// result type is composite) a nested selection set.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub alias: Option<String>,
    pub arguments: Vec<Argument>,
    pub directives: Vec<Directive>,
    pub selection_set: Vec<Selection>,
    /// The field's definition type as resolved from the schema at parse time, mirroring
    /// `ast.Field.Definition` (populated by the GraphQL executor in the Go original; here
    /// it is filled in by [`crate::parse::parse_executable`] against a known schema).
    pub definition_type: Type,
}

impl Field {
    /// The name used to key the result / SQL column, honouring a response alias the same
    /// way `ast.Field.Alias` takes priority over `ast.Field.Name` in the Go original.
    pub fn response_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.iter().find(|a| a.name == name).map(|a| &a.value)
    }

    /// Resolves this field's statically-typed argument list against a runtime variable
    /// map into a plain JSON-ish argument map, equivalent to `ast.Field.ArgumentMap`.
    pub fn argument_map(&self, variables: &HashMap<String, serde_json::Value>) -> IndexMap<String, serde_json::Value> {
        let mut map = IndexMap::new();
        for arg in &self.arguments {
            map.insert(arg.name.clone(), resolve_value(&arg.value, variables));
        }
        map
    }
}

/// Resolves a schema-level literal [`Value`] against a variable map into a `serde_json::Value`,
/// substituting `$var` references. GraphQL scalar values (Int/Float/String/Boolean/Enum/List/
/// Object/Null) map directly onto JSON; IP/CIDR/MAC/Epoch/UUID scalars are carried as strings
/// or numbers here and coerced to their concrete Rust types later, during bind-value encoding
/// in `gqlsql-translate` (the same point the Go original performs `cast.To*` conversions).
pub fn resolve_value(value: &Value, variables: &HashMap<String, serde_json::Value>) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Variable(name) => variables.get(name).cloned().unwrap_or(serde_json::Value::Null),
        Value::Int(n) => serde_json::Value::from(*n),
        Value::Float(n) => serde_json::Value::from(*n),
        Value::String(s) | Value::Enum(s) => serde_json::Value::from(s.clone()),
        Value::Boolean(b) => serde_json::Value::from(*b),
        Value::List(items) => serde_json::Value::Array(items.iter().map(|v| resolve_value(v, variables)).collect()),
        Value::Object(fields) => {
            let mut map = serde_json::Map::new();
            for (name, value) in fields {
                map.insert(name.clone(), resolve_value(value, variables));
            }
            serde_json::Value::Object(map)
        }
    }
}

#[derive(Debug, Clone)]
pub enum Selection {
    Field(Field),
    FragmentSpread { name: String },
    InlineFragment { type_condition: Option<String>, selection_set: Vec<Selection> },
}

#[derive(Debug, Clone)]
pub struct FragmentDefinition {
    pub name: String,
    pub type_condition: String,
    pub selection_set: Vec<Selection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Query,
    Mutation,
    Subscription,
}

#[derive(Debug, Clone)]
pub struct OperationDefinition {
    pub name: Option<String>,
    pub operation_type: OperationType,
    pub selection_set: Vec<Selection>,
}

/// A fully parsed executable GraphQL document: one or more operations plus the
/// fragment definitions they (transitively) spread. Mirrors the slice of the Go
/// original's inputs that are normally handed to the translator by the hosting
/// GraphQL executor: `field *ast.Field`, `variables map[string]interface{}`, and
/// `fragments ast.FragmentDefinitionList`.
#[derive(Debug, Clone, Default)]
pub struct ExecutableDocument {
    pub operations: Vec<OperationDefinition>,
    pub fragments: IndexMap<String, FragmentDefinition>,
}

impl ExecutableDocument {
    pub fn fragment(&self, name: &str) -> Option<&FragmentDefinition> {
        self.fragments.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_name_prefers_alias() {
        let field = Field {
            name: "adapterDevices".into(),
            alias: Some("devices".into()),
            arguments: vec![],
            directives: vec![],
            selection_set: vec![],
            definition_type: Type::named("AdapterDevice"),
        };
        assert_eq!(field.response_name(), "devices");
    }

    #[test]
    fn argument_map_substitutes_variables() {
        let mut variables = HashMap::new();
        variables.insert("limit".to_string(), serde_json::json!(5));
        let field = Field {
            name: "adapterDevices".into(),
            alias: None,
            arguments: vec![Argument {
                name: "limit".into(),
                value: Value::Variable("limit".into()),
            }],
            directives: vec![],
            selection_set: vec![],
            definition_type: Type::named("AdapterDevice"),
        };
        let resolved = field.argument_map(&variables);
        assert_eq!(resolved.get("limit"), Some(&serde_json::json!(5)));
    }
}
