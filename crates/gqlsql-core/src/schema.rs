//! The schema data model shared by the augmenter and the translator.
//!
//! This mirrors the shape of `apollo-compiler`'s `schema` module (an `IndexMap` of
//! [`ExtendedType`] keyed by name, each carrying an ordered field map) without any of its
//! interning/`Arc` machinery: augmentation mutates this model directly by inserting and
//! editing entries, the way the original Go implementation mutates `*ast.Schema` in place.

use indexmap::IndexMap;

/// A GraphQL type reference: a named type, optionally list-wrapped, optionally non-null
/// at each level. Matches the shape of `apollo-compiler::ast::Type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Named(String),
    NonNullNamed(String),
    List(Box<Type>),
    NonNullList(Box<Type>),
}

impl Type {
    pub fn named(name: impl Into<String>) -> Self {
        Type::Named(name.into())
    }

    pub fn non_null(self) -> Self {
        match self {
            Type::Named(n) => Type::NonNullNamed(n),
            Type::List(inner) => Type::NonNullList(inner),
            already => already,
        }
    }

    pub fn list_of(inner: Type) -> Self {
        Type::List(Box::new(inner))
    }

    /// The innermost named type, unwrapping any list/non-null wrappers.
    pub fn inner_name(&self) -> &str {
        match self {
            Type::Named(n) | Type::NonNullNamed(n) => n,
            Type::List(inner) | Type::NonNullList(inner) => inner.inner_name(),
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Type::List(_) | Type::NonNullList(_))
    }

    pub fn is_non_null(&self) -> bool {
        matches!(self, Type::NonNullNamed(_) | Type::NonNullList(_))
    }
}

impl std::fmt::Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Named(n) => write!(f, "{n}"),
            Type::NonNullNamed(n) => write!(f, "{n}!"),
            Type::List(inner) => write!(f, "[{inner}]"),
            Type::NonNullList(inner) => write!(f, "[{inner}]!"),
        }
    }
}

/// A literal GraphQL value as it appears in a default value or a directive argument.
/// Mirrors `apollo-parser::ast::Value` / `apollo-compiler::ast::Value`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Variable(String),
    Int(i64),
    Float(f64),
    String(String),
    Boolean(bool),
    Enum(String),
    List(Vec<Value>),
    Object(Vec<(String, Value)>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Vec<String> {
        match self {
            Value::List(items) => items.iter().filter_map(|v| v.as_str()).map(str::to_string).collect(),
            _ => Vec::new(),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Variable(name) => write!(f, "${name}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Enum(e) => write!(f, "{e}"),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Object(fields) => {
                write!(f, "{{")?;
                for (i, (name, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{name}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Directive {
    pub name: String,
    pub arguments: Vec<Argument>,
}

impl Directive {
    pub fn argument(&self, name: &str) -> Option<&Value> {
        self.arguments.iter().find(|a| a.name == name).map(|a| &a.value)
    }
}

/// A list of directives with the same `ForName`-style lookup the Go `ast.DirectiveList`
/// exposes, used throughout the augmenter and translator.
pub trait DirectiveListExt {
    fn for_name(&self, name: &str) -> Option<&Directive>;
}

impl DirectiveListExt for [Directive] {
    fn for_name(&self, name: &str) -> Option<&Directive> {
        self.iter().find(|d| d.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct InputValueDefinition {
    pub name: String,
    pub description: Option<String>,
    pub ty: Type,
    pub default_value: Option<Value>,
    pub directives: Vec<Directive>,
}

impl InputValueDefinition {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        InputValueDefinition {
            name: name.into(),
            description: None,
            ty,
            default_value: None,
            directives: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }
}

#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: String,
    pub description: Option<String>,
    pub arguments: Vec<InputValueDefinition>,
    pub ty: Type,
    pub directives: Vec<Directive>,
}

impl FieldDefinition {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        FieldDefinition {
            name: name.into(),
            description: None,
            arguments: Vec::new(),
            ty,
            directives: Vec::new(),
        }
    }

    pub fn argument(&self, name: &str) -> Option<&InputValueDefinition> {
        self.arguments.iter().find(|a| a.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct EnumValueDefinition {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<Directive>,
}

impl EnumValueDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        EnumValueDefinition {
            name: name.into(),
            description: None,
            directives: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

macro_rules! composite_type {
    ($name:ident) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            pub name: String,
            pub description: Option<String>,
            pub directives: Vec<Directive>,
            pub implements_interfaces: Vec<String>,
            pub fields: IndexMap<String, FieldDefinition>,
        }

        impl $name {
            pub fn new(name: impl Into<String>) -> Self {
                $name {
                    name: name.into(),
                    description: None,
                    directives: Vec::new(),
                    implements_interfaces: Vec::new(),
                    fields: IndexMap::new(),
                }
            }
        }
    };
}

composite_type!(ObjectType);
composite_type!(InterfaceType);

#[derive(Debug, Clone)]
pub struct UnionType {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<Directive>,
    pub members: Vec<String>,
}

impl UnionType {
    pub fn new(name: impl Into<String>) -> Self {
        UnionType {
            name: name.into(),
            description: None,
            directives: Vec::new(),
            members: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnumType {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<Directive>,
    pub values: IndexMap<String, EnumValueDefinition>,
}

impl EnumType {
    pub fn new(name: impl Into<String>) -> Self {
        EnumType {
            name: name.into(),
            description: None,
            directives: Vec::new(),
            values: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InputObjectType {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<Directive>,
    pub fields: IndexMap<String, InputValueDefinition>,
}

impl InputObjectType {
    pub fn new(name: impl Into<String>) -> Self {
        InputObjectType {
            name: name.into(),
            description: None,
            directives: Vec::new(),
            fields: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScalarType {
    pub name: String,
    pub description: Option<String>,
    pub directives: Vec<Directive>,
}

impl ScalarType {
    pub fn new(name: impl Into<String>) -> Self {
        ScalarType {
            name: name.into(),
            description: None,
            directives: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ExtendedType {
    Scalar(ScalarType),
    Object(ObjectType),
    Interface(InterfaceType),
    Union(UnionType),
    Enum(EnumType),
    InputObject(InputObjectType),
}

impl ExtendedType {
    pub fn name(&self) -> &str {
        match self {
            ExtendedType::Scalar(t) => &t.name,
            ExtendedType::Object(t) => &t.name,
            ExtendedType::Interface(t) => &t.name,
            ExtendedType::Union(t) => &t.name,
            ExtendedType::Enum(t) => &t.name,
            ExtendedType::InputObject(t) => &t.name,
        }
    }

    pub fn directives(&self) -> &[Directive] {
        match self {
            ExtendedType::Scalar(t) => &t.directives,
            ExtendedType::Object(t) => &t.directives,
            ExtendedType::Interface(t) => &t.directives,
            ExtendedType::Union(t) => &t.directives,
            ExtendedType::Enum(t) => &t.directives,
            ExtendedType::InputObject(t) => &t.directives,
        }
    }

    /// Composite types are the ones a selection set can be made against: objects,
    /// interfaces and unions. Matches `ast.Definition.IsCompositeType()`.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            ExtendedType::Object(_) | ExtendedType::Interface(_) | ExtendedType::Union(_)
        )
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, ExtendedType::Scalar(_) | ExtendedType::Enum(_))
    }

    /// Fields of an object/interface type; unions and leaf types have none of their own.
    pub fn fields(&self) -> Option<&IndexMap<String, FieldDefinition>> {
        match self {
            ExtendedType::Object(t) => Some(&t.fields),
            ExtendedType::Interface(t) => Some(&t.fields),
            _ => None,
        }
    }

    pub fn fields_mut(&mut self) -> Option<&mut IndexMap<String, FieldDefinition>> {
        match self {
            ExtendedType::Object(t) => Some(&mut t.fields),
            ExtendedType::Interface(t) => Some(&mut t.fields),
            _ => None,
        }
    }
}

/// A named directive declaration (`directive @foo(...) on FIELD_DEFINITION`). This crate
/// only needs the name and argument shape to validate directive usages while lowering; it
/// does not enforce `on` locations.
#[derive(Debug, Clone)]
pub struct DirectiveDefinition {
    pub name: String,
    pub arguments: Vec<InputValueDefinition>,
}

/// A fully parsed (but not yet augmented, or already augmented) GraphQL schema.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    pub types: IndexMap<String, ExtendedType>,
    pub directive_definitions: IndexMap<String, DirectiveDefinition>,
    pub query_type: Option<String>,
    pub mutation_type: Option<String>,
    pub subscription_type: Option<String>,
}

impl Schema {
    pub fn new() -> Self {
        Schema::default()
    }

    pub fn get(&self, name: &str) -> Option<&ExtendedType> {
        self.types.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ExtendedType> {
        self.types.get_mut(name)
    }

    pub fn insert(&mut self, ty: ExtendedType) {
        self.types.insert(ty.name().to_string(), ty);
    }

    /// Mirrors `ast.Definition.IsCompositeType()` applied to a looked-up name; returns
    /// `false` for an unresolved reference rather than panicking, matching the Go code's
    /// nil-map-read semantics (`s.Types[name]` on a missing key returns the zero value).
    pub fn is_composite(&self, name: &str) -> bool {
        self.get(name).map(ExtendedType::is_composite).unwrap_or(false)
    }

    pub fn query_type(&self) -> Option<&ExtendedType> {
        self.query_type.as_deref().and_then(|n| self.get(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_inner_name_unwraps_list_and_non_null() {
        let ty = Type::NonNullList(Box::new(Type::NonNullNamed("AdapterDevice".into())));
        assert_eq!(ty.inner_name(), "AdapterDevice");
        assert!(ty.is_list());
        assert!(ty.is_non_null());
    }

    #[test]
    fn directive_list_lookup_by_name() {
        let directives = vec![Directive {
            name: "relation".into(),
            arguments: vec![Argument {
                name: "name".into(),
                value: Value::String("network_interfaces".into()),
            }],
        }];
        let found = directives.for_name("relation").unwrap();
        assert_eq!(found.argument("name").unwrap().as_str(), Some("network_interfaces"));
        assert!(directives.for_name("jsonpath").is_none());
    }

    #[test]
    fn schema_is_composite_false_for_unresolved_reference() {
        let schema = Schema::new();
        assert!(!schema.is_composite("Missing"));
    }
}
