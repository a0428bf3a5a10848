//! JSON-Path Compiler (spec §4.10): compiles a filter sub-tree against a single JSON column
//! into one `<col> @? format('$ ? (<inner>)', <typed-cast args>)::jsonpath` predicate.
//! Grounded on `createJsonPathCondition`/`buildJsonFilter`/`buildComplexFilter` in
//! `bandicoot/internal/sqlgen/sql/jsonpath.go`. Shares [`gqlsql_core::operators::parse_operator`]
//! with the WHERE builder in [`crate::translator`] to classify `AND`/`OR`/`NOT` identically; below
//! that level a map's keys are either one of this module's closed set of leaf operators or a
//! field name to descend into, mirroring how [`crate::translator::build_where`] distinguishes a
//! Comparator-shaped value from a further nested `bool_exp`.

use heck::ToSnakeCase;

use gqlsql_core::operators::{parse_operator, AND, NOT, OR};

use crate::bind::{any_slice, ArrayBind, BindValue};
use crate::sql::Expr;

/// The closed set of leaf operators the JSON-path compiler understands (spec §4.10's inner
/// expression table). Any other key at a given nesting level names a field to descend into
/// rather than a comparison to emit.
const LEAF_OPERATORS: &[&str] = &["exists", "eq", "neq", "gte", "gt", "lt", "lte", "like", "ilike", "in", "not_in"];

/// Compiles a `bool_exp` filter sub-tree targeting `column` (already `<alias>.<col>` text)
/// into the single `Expr` the WHERE builder ANDs into its predicate list.
pub fn compile_json_path_condition(column: &str, filter: &serde_json::Map<String, serde_json::Value>) -> Expr {
    let mut inner = String::new();
    let casted = build_json_filter(&mut inner, filter, "");
    let literal = format!("$ ? ({inner})");
    let format_call = Expr::FormatCall { literal, casted_params: casted };
    Expr::Binary {
        left: Box::new(Expr::Raw(column.to_string())),
        op: "@?",
        right: Box::new(Expr::Cast { expr: Box::new(format_call), sql_type: "jsonpath".to_string() }),
    }
}

/// Recursively walks one filter map, appending JSON-path syntax to `literal` and returning
/// the ordered list of values the `format(...)` call must bind, each tagged with its cast
/// suffix. `parent` is the dotted JSON-path prefix accumulated through nested field names.
fn build_json_filter(literal: &mut String, filter: &serde_json::Map<String, serde_json::Value>, parent: &str) -> Vec<(BindValue, &'static str)> {
    let mut casted = Vec::new();
    let mut first = true;
    for (key, value) in filter {
        let (_, op) = parse_operator(key);
        if first {
            first = false;
        } else {
            literal.push_str(" && ");
        }
        if op == AND && key == AND {
            if let Some(list) = value.as_array() {
                casted.extend(build_complex_filter(literal, list, " && ", parent));
            }
        } else if op == OR && key == OR {
            if let Some(list) = value.as_array() {
                casted.extend(build_complex_filter(literal, list, " || ", parent));
            }
        } else if op == NOT && key == NOT {
            if let Some(nested) = value.as_object() {
                literal.push('!');
                literal.push('(');
                casted.extend(build_json_filter(literal, nested, parent));
                literal.push(')');
            }
        } else if LEAF_OPERATORS.contains(&key.as_str()) {
            casted.extend(emit_leaf(literal, key, value, parent));
        } else {
            // Not a logical combinator or a recognised leaf operator: `key` names a field to
            // descend into, mirroring the WHERE builder's `bool_exp` branch (spec §4.9). Field
            // names always need snake-casing here since `parse_operator` only snake-cases a key
            // that had an underscore to split on, and a bare field name like `adCn` never does.
            let segment = key.to_snake_case();
            let next_parent = if parent.is_empty() { segment } else { format!("{parent}.{segment}") };
            if let Some(nested) = value.as_object() {
                casted.extend(build_json_filter(literal, nested, &next_parent));
            } else {
                tracing::warn!(key, "json-path filter value is not an object at a field position");
            }
        }
    }
    casted
}

/// Emits one leaf operator (`exists`, `eq`, `like`, ...) against the accumulated path
/// `parent`, matching spec §4.10's inner-expression table exactly.
fn emit_leaf(literal: &mut String, operator: &str, value: &serde_json::Value, parent: &str) -> Vec<(BindValue, &'static str)> {
    let mut casted = Vec::new();
    let quoted = matches!(value, serde_json::Value::String(_));
    let formatter = if quoted { "\"%I\"" } else { "%I" };
    match operator {
        "exists" => literal.push_str(&format!("exists(@.{parent})")),
        "eq" => {
            literal.push_str(&format!("@.{parent} == {formatter}"));
            casted.push(cast_value(value));
        }
        "neq" => {
            literal.push_str(&format!("@.{parent} != {formatter}"));
            casted.push(cast_value(value));
        }
        "gte" => {
            literal.push_str(&format!("@.{parent} >= {formatter}"));
            casted.push(cast_value(value));
        }
        "gt" => {
            literal.push_str(&format!("@.{parent} > {formatter}"));
            casted.push(cast_value(value));
        }
        "lt" => {
            literal.push_str(&format!("@.{parent} < {formatter}"));
            casted.push(cast_value(value));
        }
        "lte" => {
            literal.push_str(&format!("@.{parent} <= {formatter}"));
            casted.push(cast_value(value));
        }
        "like" => {
            literal.push_str(&format!("@.{parent} like_regex \"%s\""));
            casted.push(cast_value(value));
        }
        "ilike" => {
            literal.push_str(&format!("@.{parent} like_regex \"%s\" flag \"i\""));
            casted.push(cast_value(value));
        }
        "in" => {
            literal.push_str(&format!("@.{parent} == {formatter}[*]"));
            casted.push(cast_value(value));
        }
        "not_in" => {
            literal.push_str(&format!("@.{parent} != {formatter}[*]"));
            casted.push(cast_value(value));
        }
        other => tracing::warn!(operator = other, "json-path operator not supported"),
    }
    casted
}

/// Joins a list of nested filter maps with `op` (` && `/` || `), wrapped in one parenthesis.
/// Entries that aren't objects are skipped, mirroring `buildComplexFilter`'s silent drop.
fn build_complex_filter(literal: &mut String, values: &[serde_json::Value], op: &str, parent: &str) -> Vec<(BindValue, &'static str)> {
    let mut casted = Vec::new();
    if values.is_empty() {
        return casted;
    }
    literal.push('(');
    let mut first = true;
    for value in values {
        let Some(nested) = value.as_object() else { continue };
        if first {
            first = false;
        } else {
            literal.push_str(op);
        }
        casted.extend(build_json_filter(literal, nested, parent));
    }
    literal.push(')');
    casted
}

const SMALLINT_MAX: i64 = i16::MAX as i64;
const SMALLINT_MIN: i64 = i16::MIN as i64;
const INTEGER_MAX: i64 = i32::MAX as i64;
const INTEGER_MIN: i64 = i32::MIN as i64;

/// Picks the `format(...)` cast suffix and the value to bind for one leaf, mirroring
/// `fieldSQLType` applied to the runtime category of a JSON-decoded value (spec §4.10's
/// "Type selection table").
fn cast_value(value: &serde_json::Value) -> (BindValue, &'static str) {
    match value {
        serde_json::Value::Bool(b) => (BindValue::Bool(*b), "boolean"),
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => {
            let as_i64 = n.as_i64().unwrap_or_default();
            if (SMALLINT_MIN..=SMALLINT_MAX).contains(&as_i64) {
                (BindValue::Int(as_i64), "smallint")
            } else if (INTEGER_MIN..=INTEGER_MAX).contains(&as_i64) {
                (BindValue::Int(as_i64), "integer")
            } else {
                (BindValue::Int(as_i64), "bigint")
            }
        }
        serde_json::Value::Number(n) => (BindValue::Float(n.as_f64().unwrap_or_default()), "double precision"),
        serde_json::Value::String(s) => (BindValue::Text(s.clone()), "text"),
        serde_json::Value::Array(items) => {
            let array = any_slice("jsonpath", "in", items).unwrap_or(ArrayBind { sql_type: "text[]", values: items.clone() });
            let sql_type = array.sql_type;
            (BindValue::Array(array), sql_type)
        }
        serde_json::Value::Object(_) => (BindValue::Text(value.to_string()), "jsonb"),
        serde_json::Value::Null => (BindValue::Null, "text"),
    }
}
