//! Translator Core (spec §4.7) and WHERE/ORDER/LIMIT/OFFSET construction (spec §4.9).
//! Grounded on `bandicoot/internal/sqlgen/translator.go`'s `Translate`/`buildSQLFields`/
//! `buildWhereClause`. The recursive descent is one function per field kind — Column, Json,
//! Relation, ViewFunction, Aggregate — matching the directive-driven dispatch table in spec
//! §4.7 exactly; shared state (the alias counter, the bind accumulator) is threaded through
//! via [`TranslationContext`] and the [`Select`] being built rather than a visitor object
//! (spec §9 "AST visitor pattern").

use heck::ToSnakeCase;

use gqlsql_core::directives::{json_path_directive, relation_directive, view_function_directive, RelationKind};
use gqlsql_core::executable::{resolve_value, Field as ExecField, Selection};
use gqlsql_core::operators::{order_clause, parse_operator, AND, BOOL_EXP, NOT, OR};
use gqlsql_core::schema::{ExtendedType, FieldDefinition, Schema};

use crate::bind::{any_slice, parse_cidr, parse_ip_family, BindValue};
use crate::config::{ArgumentMap, TranslationContext};
use crate::error::{OperatorError, TranslationError, ValueCoercionError};
use crate::sql::{functions, lateral_join, render, Expr, Join, JoinKind, JoinSource, LogicalOp, Select, TemplatePart};

pub const WHERE_CLAUSE: &str = "where";
pub const ORDER_BY_CLAUSE: &str = "orderBy";
pub const LIMIT_CLAUSE: &str = "limit";
pub const OFFSET_CLAUSE: &str = "offset";

/// Public entry point (spec §4.7): translates one root selection field against the
/// augmented schema into a single SQL statement and its positional bind values.
#[tracing::instrument(skip_all, fields(field = %root_field.name))]
pub fn translate(ctx: &TranslationContext, root_field: &ExecField) -> Result<(String, Vec<BindValue>), TranslationError> {
    ctx.check_cancelled()?;
    if root_field.name.ends_with("_aggregate") {
        return crate::aggregate::translate_root(ctx, root_field);
    }

    let query_type = ctx.schema().query_type.clone().unwrap_or_else(|| "Query".to_string());
    let definition = field_definition(ctx.schema(), &query_type, &root_field.name)?;
    let current_type = definition.ty.inner_name().to_string();

    let alias = ctx.next_alias();
    let mut args = root_field.argument_map(ctx.variables);
    if let Some(hook) = &ctx.config.before_translation {
        hook(&ctx.hook_context(), &current_type, &mut args);
    }

    let mut select = Select::new(format!("{} AS {alias}", root_field.name.to_snake_case()));
    let pairs = build_object_fields(ctx, &mut select, &alias, &current_type, &root_field.selection_set)?;
    for (key, expr) in pairs {
        select.project(Expr::Aliased { expr: Box::new(expr), as_name: key });
    }

    if let Some(hook) = &ctx.config.before_clauses {
        hook(&ctx.hook_context(), &alias, &current_type, &mut args);
    }
    apply_where(ctx, &mut select, &alias, &current_type, &args)?;
    apply_order_limit_offset(&mut select, &args);

    let mut params = Vec::new();
    let sql = render(&select, &mut params);
    tracing::debug!(sql, params = params.len(), "translated query");
    Ok((sql, params))
}

/// Looks up a field's definition against a composite parent type. Unions have no fields of
/// their own; a selection against a union must have already been narrowed to a member via
/// an inline fragment or fragment spread by the time this is called.
pub(crate) fn field_definition<'a>(schema: &'a Schema, parent_type: &str, field_name: &str) -> Result<&'a FieldDefinition, TranslationError> {
    schema
        .get(parent_type)
        .and_then(ExtendedType::fields)
        .and_then(|fields| fields.get(field_name))
        .ok_or_else(|| TranslationError::MissingFieldDefinition(format!("{parent_type}.{field_name}")))
}

/// Finds a field of `parent_type` whose snake-cased name matches `snake_name`. Used when
/// compiling a WHERE key: [`gqlsql_core::operators::parse_operator`] has already snake-cased
/// the field prefix, so recovering the original (possibly camelCase) [`FieldDefinition`]
/// means comparing against every field's own snake-cased name rather than an exact key
/// lookup.
fn find_field_by_snake<'a>(schema: &'a Schema, parent_type: &str, snake_name: &str) -> Option<&'a FieldDefinition> {
    schema.get(parent_type).and_then(ExtendedType::fields).and_then(|fields| fields.values().find(|f| f.name.to_snake_case() == snake_name))
}

#[derive(Debug)]
enum FieldKind {
    Column,
    Aggregate,
    Json(gqlsql_core::directives::JsonPathDirective),
    Relation(gqlsql_core::directives::RelationDirective),
    ViewFunction(gqlsql_core::directives::ViewFunctionDirective),
}

/// Classifies one field by directive inspection, matching spec §4.7's table exactly. The
/// `_aggregate` name suffix is checked first because the Aggregation augmenter copies the
/// underlying field's directives onto its sibling (so an aggregate over a relation still
/// carries `@relation`) — that copy must not cause an aggregate sibling to be misclassified
/// as a plain relation.
fn classify(def: &FieldDefinition) -> FieldKind {
    if def.name.ends_with("_aggregate") {
        return FieldKind::Aggregate;
    }
    if let Some(relation) = relation_directive(def) {
        return FieldKind::Relation(relation);
    }
    if let Some(json) = json_path_directive(def) {
        return FieldKind::Json(json);
    }
    if let Some(view_function) = view_function_directive(def) {
        return FieldKind::ViewFunction(view_function);
    }
    FieldKind::Column
}

/// Walks one selection set, returning `(json_key, expr)` pairs for every requested field.
/// The caller decides how to use them: [`translate`] projects each pair directly as a
/// top-level `(<expr>) AS <key>` column of its SELECT; a Relation/ViewFunction/Aggregate
/// field wraps its own children's pairs in a single `jsonb_build_object(...)` to become the
/// sole projection of its own inner SELECT (spec §4.7). `select` is the SELECT *this*
/// selection set's fields belong to (the outer query for a root call, or a relation's own
/// freshly-aliased inner query for a nested one) — joins any child Relation/ViewFunction/
/// Aggregate field needs are pushed onto it.
pub(crate) fn build_object_fields(
    ctx: &TranslationContext,
    select: &mut Select,
    alias: &str,
    parent_type: &str,
    selections: &[Selection],
) -> Result<Vec<(String, Expr)>, TranslationError> {
    ctx.check_cancelled()?;
    let mut pairs = Vec::new();
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                if field.name.starts_with("__") {
                    continue;
                }
                let def = field_definition(ctx.schema(), parent_type, &field.name)?;
                match classify(def) {
                    FieldKind::Column => {
                        let key = field.response_name().to_snake_case();
                        let column = def.name.to_snake_case();
                        pairs.push((key, Expr::Column { alias: alias.to_string(), column }));
                    }
                    FieldKind::Json(json) => {
                        pairs.extend(build_json_field(ctx, alias, def, &json, field)?);
                    }
                    FieldKind::Relation(relation) => {
                        let key = field.response_name().to_snake_case();
                        let join_alias = build_relation_join(ctx, select, alias, &relation, field, &key)?;
                        pairs.push((key.clone(), Expr::Column { alias: join_alias, column: key }));
                    }
                    FieldKind::ViewFunction(view_function) => {
                        let key = field.response_name().to_snake_case();
                        let named_type = def.ty.inner_name().to_string();
                        let join_alias = build_view_function_join(ctx, select, alias, &view_function, field, &named_type, &key)?;
                        pairs.push((key.clone(), Expr::Column { alias: join_alias, column: key }));
                    }
                    FieldKind::Aggregate => {
                        let (key, expr) = crate::aggregate::build_nested(ctx, select, alias, def, field)?;
                        pairs.push((key, expr));
                    }
                }
            }
            Selection::InlineFragment { type_condition, selection_set } => {
                let next_type = type_condition.clone().unwrap_or_else(|| parent_type.to_string());
                pairs.extend(build_object_fields(ctx, select, alias, &next_type, selection_set)?);
            }
            Selection::FragmentSpread { name } => {
                let fragment = ctx.fragment(name)?;
                let selection_set = fragment.selection_set.clone();
                let next_type = fragment.type_condition.clone();
                pairs.extend(build_object_fields(ctx, select, alias, &next_type, &selection_set)?);
            }
        }
    }
    Ok(pairs)
}

/// `jsonb_build_object('k1', expr1, 'k2', expr2, ...)`, spaceless-joined per
/// [`Expr::Func`]'s convention, matching spec §4.7's Relation/Json/Aggregate projections.
pub(crate) fn jsonb_build_object_expr(pairs: Vec<(String, Expr)>) -> Expr {
    let mut args = Vec::with_capacity(pairs.len() * 2);
    for (key, expr) in pairs {
        args.push(Expr::Literal(format!("'{key}'")));
        args.push(expr);
    }
    Expr::Func { name: "jsonb_build_object".to_string(), args }
}

/// Wraps a single-row `jsonb_build_object(...)` per the relation's cardinality: unchanged
/// for `ONE_TO_ONE`, `COALESCE(jsonb_agg(...), '[]')` for `ONE_TO_MANY`/`MANY_TO_MANY`.
fn wrap_by_cardinality(row: Expr, many: bool) -> Expr {
    if !many {
        return row;
    }
    Expr::Call {
        name: "COALESCE".to_string(),
        args: vec![Expr::Call { name: "jsonb_agg".to_string(), args: vec![row] }, Expr::Literal("'[]'".to_string())],
    }
}

/// Builds the Relation category's inner SELECT (spec §4.7): a fresh alias, the parent-child
/// FK correlation, the field's own `where`/`orderBy`/`limit`/`offset`, and — for
/// `MANY_TO_MANY` — a `LEFT JOIN` against the pivot table. Returns the fresh alias so the
/// caller can project `<alias>.<snake(field.name)>`.
fn build_relation_join(
    ctx: &TranslationContext,
    select: &mut Select,
    parent_alias: &str,
    relation: &gqlsql_core::directives::RelationDirective,
    field: &ExecField,
    projection_name: &str,
) -> Result<String, TranslationError> {
    let relation_alias = ctx.next_alias();
    let mut args = field.argument_map(ctx.variables);
    if let Some(hook) = &ctx.config.before_clauses {
        hook(&ctx.hook_context(), &relation_alias, &relation.named_type, &mut args);
    }

    let mut inner = Select::new(format!("{} AS {relation_alias}", relation.name));
    let pairs = build_object_fields(ctx, &mut inner, &relation_alias, &relation.named_type, &field.selection_set)?;
    let row = jsonb_build_object_expr(pairs);
    let many = !matches!(relation.kind(), Some(RelationKind::OneToOne));
    inner.project(Expr::Aliased { expr: Box::new(wrap_by_cardinality(row, many)), as_name: projection_name.to_string() });

    inner.filter(Expr::Raw(relation.relation_clause(parent_alias, &relation_alias)));

    if relation.kind() == Some(RelationKind::ManyToMany) {
        if let Some(pivot_table) = &relation.many_to_many_table {
            let pivot_alias = ctx.next_alias();
            let on = pivot_join_condition(&relation_alias, &pivot_alias, &relation.join_on);
            inner.join(Join { kind: JoinKind::Left, source: JoinSource::Raw(format!("{pivot_table} AS {pivot_alias}")), alias: pivot_alias, on });
        }
    }

    apply_where(ctx, &mut inner, &relation_alias, &relation.named_type, &args)?;
    apply_order_limit_offset(&mut inner, &args);

    select.join(lateral_join(JoinKind::LeftLateral, relation_alias.clone(), inner));
    Ok(relation_alias)
}

/// `<relAlias>.<col> = <pivotAlias>.<col> AND ...`, one equality per entry of `joinOn` —
/// the column both the relation table and the many-to-many pivot table share.
fn pivot_join_condition(relation_alias: &str, pivot_alias: &str, join_on: &[String]) -> Expr {
    let predicates: Vec<Expr> = join_on
        .iter()
        .map(|col| {
            let snake = col.to_snake_case();
            Expr::Binary {
                left: Box::new(Expr::Column { alias: relation_alias.to_string(), column: snake.clone() }),
                op: "=",
                right: Box::new(Expr::Column { alias: pivot_alias.to_string(), column: snake }),
            }
        })
        .collect();
    if predicates.len() == 1 {
        predicates.into_iter().next().unwrap()
    } else {
        Expr::Logical { op: LogicalOp::And, predicates }
    }
}

/// Builds the ViewFunction category's inner SELECT (spec §4.7): same shape as Relation but
/// `FROM <fn>(<parent_alias>.<arg1>, ...)` and always `jsonb_agg`-wrapped.
#[allow(clippy::too_many_arguments)]
fn build_view_function_join(
    ctx: &TranslationContext,
    select: &mut Select,
    parent_alias: &str,
    view_function: &gqlsql_core::directives::ViewFunctionDirective,
    field: &ExecField,
    named_type: &str,
    projection_name: &str,
) -> Result<String, TranslationError> {
    let alias = ctx.next_alias();
    let mut args = field.argument_map(ctx.variables);
    if let Some(hook) = &ctx.config.before_clauses {
        hook(&ctx.hook_context(), &alias, named_type, &mut args);
    }

    let mut inner = Select::new(format!("{}({}) AS {alias}", view_function.name, view_function_args(view_function, parent_alias)));
    let pairs = build_object_fields(ctx, &mut inner, &alias, named_type, &field.selection_set)?;
    let row = jsonb_build_object_expr(pairs);
    inner.project(Expr::Aliased { expr: Box::new(wrap_by_cardinality(row, true)), as_name: projection_name.to_string() });

    apply_where(ctx, &mut inner, &alias, named_type, &args)?;
    apply_order_limit_offset(&mut inner, &args);

    select.join(lateral_join(JoinKind::LeftLateral, alias.clone(), inner));
    Ok(alias)
}

fn view_function_args(view_function: &gqlsql_core::directives::ViewFunctionDirective, parent_alias: &str) -> String {
    view_function.arguments.iter().map(|a| format!("{parent_alias}.{}", a.to_snake_case())).collect::<Vec<_>>().join(",")
}

/// Builds the Json category's projection (spec §4.7): a `jsonb_build_object(...)` whose
/// values navigate the JSON column with `->`, recursing for further-nested sub-selections.
/// When the field's declared type is a union, every column named in the `@jsonpath`
/// directive's `depends` list is additionally projected as an ordinary column alongside the
/// JSON builder (spec §9 "union inside relation projection": consumers infer the variant
/// from these columns).
fn build_json_field(
    ctx: &TranslationContext,
    alias: &str,
    def: &FieldDefinition,
    json: &gqlsql_core::directives::JsonPathDirective,
    field: &ExecField,
) -> Result<Vec<(String, Expr)>, TranslationError> {
    let base = Expr::Raw(format!("{alias}.{}", json.name));
    let named = def.ty.inner_name();
    let pairs = build_json_pairs(ctx, &base, named, &field.selection_set)?;
    let mut result = vec![(field.response_name().to_snake_case(), jsonb_build_object_expr(pairs))];
    if matches!(ctx.schema().get(named), Some(ExtendedType::Union(_))) {
        for depend in &json.depends {
            let key = depend.to_snake_case();
            result.push((key.clone(), Expr::Column { alias: alias.to_string(), column: key }));
        }
    }
    Ok(result)
}

fn build_json_pairs(ctx: &TranslationContext, base: &Expr, parent_type: &str, selections: &[Selection]) -> Result<Vec<(String, Expr)>, TranslationError> {
    let mut pairs = Vec::new();
    for selection in selections {
        match selection {
            Selection::Field(f) => {
                if f.name.starts_with("__") {
                    continue;
                }
                let key = f.response_name().to_snake_case();
                let path = Expr::Binary { left: Box::new(base.clone()), op: "->", right: Box::new(Expr::Literal(format!("'{key}'"))) };
                if f.selection_set.is_empty() {
                    pairs.push((key, path));
                } else {
                    let sub_def = field_definition(ctx.schema(), parent_type, &f.name)?;
                    let sub_type = sub_def.ty.inner_name().to_string();
                    let nested_pairs = build_json_pairs(ctx, &path, &sub_type, &f.selection_set)?;
                    pairs.push((key, jsonb_build_object_expr(nested_pairs)));
                }
            }
            Selection::InlineFragment { type_condition, selection_set } => {
                let next_type = type_condition.clone().unwrap_or_else(|| parent_type.to_string());
                pairs.extend(build_json_pairs(ctx, base, &next_type, selection_set)?);
            }
            Selection::FragmentSpread { name } => {
                let fragment = ctx.fragment(name)?;
                let selection_set = fragment.selection_set.clone();
                let next_type = fragment.type_condition.clone();
                pairs.extend(build_json_pairs(ctx, base, &next_type, &selection_set)?);
            }
        }
    }
    Ok(pairs)
}

// --- WHERE / ORDER / LIMIT / OFFSET (spec §4.9) ----------------------------------------

/// Applies `args["where"]`, if present, to `select`'s WHERE clause.
pub(crate) fn apply_where(ctx: &TranslationContext, select: &mut Select, alias: &str, type_name: &str, args: &ArgumentMap) -> Result<(), TranslationError> {
    let Some(where_value) = args.get(WHERE_CLAUSE) else { return Ok(()) };
    let Some(map) = where_value.as_object() else { return Ok(()) };
    let expr = compile_where_map(ctx, alias, type_name, map)?;
    select.filter(expr);
    Ok(())
}

/// Applies `args["orderBy"]`/`args["limit"]`/`args["offset"]`, defaulting limit to 100 and
/// offset to 0 when absent (spec §4.2, §4.9).
pub(crate) fn apply_order_limit_offset(select: &mut Select, args: &ArgumentMap) {
    if let Some(order_by) = args.get(ORDER_BY_CLAUSE).and_then(|v| v.as_array()) {
        for entry in order_by {
            if let Some(value) = entry.as_str() {
                select.order_by.push(order_clause(value));
            }
        }
    }
    select.limit = Some(args.get(LIMIT_CLAUSE).and_then(|v| v.as_i64()).unwrap_or(100));
    select.offset = Some(args.get(OFFSET_CLAUSE).and_then(|v| v.as_i64()).unwrap_or(0));
}

/// Compiles one filter map into a single conjunction [`Expr`] — the unit both a top-level
/// `where:` argument and a recursive `AND`/`OR`/`NOT` entry share.
fn compile_where_map(ctx: &TranslationContext, alias: &str, type_name: &str, map: &serde_json::Map<String, serde_json::Value>) -> Result<Expr, TranslationError> {
    let mut predicates = Vec::new();
    for (key, value) in map {
        if let Some(expr) = compile_where_entry(ctx, alias, type_name, key, value)? {
            predicates.push(expr);
        }
    }
    Ok(conjunction(predicates))
}

fn conjunction(mut predicates: Vec<Expr>) -> Expr {
    match predicates.len() {
        0 => Expr::Literal("True".to_string()),
        1 => predicates.remove(0),
        _ => Expr::Logical { op: LogicalOp::And, predicates },
    }
}

fn compile_where_entry(ctx: &TranslationContext, alias: &str, type_name: &str, key: &str, value: &serde_json::Value) -> Result<Option<Expr>, TranslationError> {
    let (field_snake, op) = parse_operator(key);
    match op.as_str() {
        AND | OR => {
            let items: Vec<&serde_json::Map<String, serde_json::Value>> = value.as_array().map(|a| a.iter().filter_map(|v| v.as_object()).collect()).unwrap_or_default();
            let mut predicates = Vec::with_capacity(items.len());
            for item in items {
                predicates.push(compile_where_map(ctx, alias, type_name, item)?);
            }
            let logical_op = if op == AND { LogicalOp::And } else { LogicalOp::Or };
            Ok(Some(Expr::Logical { op: logical_op, predicates }))
        }
        NOT => {
            let Some(nested) = value.as_object() else { return Ok(None) };
            let inner = compile_where_map(ctx, alias, type_name, nested)?;
            Ok(Some(Expr::Not(Box::new(inner))))
        }
        BOOL_EXP => {
            // `parse_operator` only snake-cases the prefix when it split on an `_`; a bare
            // field name (no underscore at all) comes back unchanged, so it still needs
            // snake-casing here before it can be compared against `FieldDefinition::name`.
            compile_bool_exp(ctx, alias, type_name, &field_snake.to_snake_case(), value)
        }
        scalar_op => {
            let column = format!("{alias}.{field_snake}");
            match compile_scalar_operator(&field_snake, scalar_op, &column, value) {
                Ok(expr) => Ok(Some(expr)),
                Err(err) if ctx.config.lenient => {
                    tracing::warn!(field = field_snake, operator = scalar_op, error = %err, "dropping predicate (lenient mode)");
                    Ok(None)
                }
                Err(err) => Err(err),
            }
        }
    }
}

/// Dispatches a `bool_exp`-tagged key by the target field's own directive (spec §4.9's
/// last table row): a `@jsonpath` field compiles through the JSON-path compiler; a
/// `@relation` field becomes an `EXISTS` subquery correlated the same way a selected
/// relation's inner SELECT is.
fn compile_bool_exp(ctx: &TranslationContext, alias: &str, type_name: &str, field_snake: &str, value: &serde_json::Value) -> Result<Option<Expr>, TranslationError> {
    let Some(def) = find_field_by_snake(ctx.schema(), type_name, field_snake) else {
        return permissive_or_error(ctx, field_snake, BOOL_EXP, "no field matches this name".to_string());
    };
    let Some(map) = value.as_object() else { return Ok(None) };

    if let Some(json) = json_path_directive(def) {
        let column = format!("{alias}.{}", json.name);
        return Ok(Some(crate::jsonpath::compile_json_path_condition(&column, map)));
    }
    if let Some(relation) = relation_directive(def) {
        let relation_alias = ctx.next_alias();
        let mut inner = Select::new(format!("{} AS {relation_alias}", relation.name));
        inner.project(Expr::Literal("1".to_string()));
        inner.filter(Expr::Raw(relation.relation_clause(alias, &relation_alias)));
        let nested = compile_where_map(ctx, &relation_alias, &relation.named_type, map)?;
        inner.filter(nested);
        inner.limit = Some(1);
        return Ok(Some(Expr::Exists(Box::new(inner))));
    }
    permissive_or_error(ctx, field_snake, BOOL_EXP, "field has neither @jsonpath nor @relation".to_string())
}

fn permissive_or_error(ctx: &TranslationContext, field: &str, operator: &str, reason: String) -> Result<Option<Expr>, TranslationError> {
    if ctx.config.lenient {
        tracing::warn!(field, operator, reason, "dropping predicate (lenient mode)");
        Ok(None)
    } else {
        Err(OperatorError { field: field.to_string(), operator: operator.to_string() }.into())
    }
}

/// Emits one scalar comparator predicate, matching spec §4.9's dispatch table. `field` is
/// used only for error messages; `column` is already `<alias>.<col>` text.
fn compile_scalar_operator(field: &str, op: &str, column: &str, value: &serde_json::Value) -> Result<Expr, TranslationError> {
    let col = || Expr::Raw(column.to_string());
    Ok(match op {
        "exists" => {
            // §4.3 also lists a bare `not` on String fields with the same Boolean-existence
            // shape as `exists` but inverted, since the closed operator vocabulary has no
            // separate dispatch rule for it (spec §4.9's table does not list `not`
            // explicitly; see DESIGN.md for this resolution).
            let want_not_null = value.as_bool().unwrap_or(true);
            Expr::IsNull { expr: Box::new(col()), negate: want_not_null }
        }
        "not" => {
            let want_null = value.as_bool().unwrap_or(true);
            Expr::IsNull { expr: Box::new(col()), negate: !want_null }
        }
        "eq" => binary_param(col(), "=", value),
        "neq" => binary_param(col(), "!=", value),
        "gt" => binary_param(col(), ">", value),
        "gte" => binary_param(col(), ">=", value),
        "lt" => binary_param(col(), "<", value),
        "lte" => binary_param(col(), "<=", value),
        "like" => binary_param(col(), "LIKE", value),
        "not_like" => binary_param(col(), "NOT LIKE", value),
        "ilike" => binary_param(col(), "ILIKE", value),
        "not_ilike" => binary_param(col(), "NOT ILIKE", value),
        "prefix" => like_pattern(col(), value, "{}%"),
        "suffix" => like_pattern(col(), value, "%{}"),
        "in" => any_in(field, op, col(), value, false)?,
        "not_in" => any_in(field, op, col(), value, true)?,
        "contains" => array_op(field, op, col(), "@>", value)?,
        "contained_by" => array_op(field, op, col(), "<@", value)?,
        "overlap" => array_op(field, op, col(), "&&", value)?,
        "size" => Expr::Binary {
            left: Box::new(Expr::Call { name: "array_length".to_string(), args: vec![col(), Expr::Literal("1".to_string())] }),
            op: "=",
            right: Box::new(Expr::Param(BindValue::from(value))),
        },
        "contains_regex" => Expr::Binary {
            left: Box::new(Expr::Call { name: functions::ARRAY_TO_TEXT.to_string(), args: vec![col()] }),
            op: "LIKE",
            right: Box::new(Expr::Param(BindValue::from(value))),
        },
        "in_subnet" => in_subnet_expr(field, col(), value)?,
        "ip_family" => ip_family_expr(field, col(), value)?,
        "days" => days_expr(col(), value),
        other => return Err(OperatorError { field: field.to_string(), operator: other.to_string() }.into()),
    })
}

fn binary_param(column: Expr, op: &'static str, value: &serde_json::Value) -> Expr {
    Expr::Binary { left: Box::new(column), op, right: Box::new(Expr::Param(BindValue::from(value))) }
}

fn like_pattern(column: Expr, value: &serde_json::Value, template: &str) -> Expr {
    let raw = value.as_str().unwrap_or_default();
    let pattern = template.replace("{}", raw);
    Expr::Binary { left: Box::new(column), op: "LIKE", right: Box::new(Expr::Param(BindValue::Text(pattern))) }
}

fn any_in(field: &str, op: &str, column: Expr, value: &serde_json::Value, negate: bool) -> Result<Expr, TranslationError> {
    let items = value.as_array().cloned().unwrap_or_default();
    let array = any_slice(field, op, &items)?;
    let wrapper = if negate { "ALL" } else { "ANY" };
    Ok(Expr::Binary {
        left: Box::new(column),
        op: if negate { "!=" } else { "=" },
        right: Box::new(Expr::Call { name: wrapper.to_string(), args: vec![Expr::Param(BindValue::Array(array))] }),
    })
}

fn array_op(field: &str, op: &str, column: Expr, sql_op: &'static str, value: &serde_json::Value) -> Result<Expr, TranslationError> {
    let items = value.as_array().cloned().unwrap_or_default();
    let array = any_slice(field, op, &items)?;
    Ok(Expr::Binary { left: Box::new(column), op: sql_op, right: Box::new(Expr::Param(BindValue::Array(array))) })
}

fn in_subnet_expr(field: &str, column: Expr, value: &serde_json::Value) -> Result<Expr, TranslationError> {
    let raw = value.as_str().ok_or_else(|| ValueCoercionError { field: field.to_string(), operator: "in_subnet".to_string(), reason: "expected a string CIDR literal".to_string() })?;
    let network = parse_cidr(field, raw)?;
    Ok(Expr::Binary {
        left: Box::new(Expr::Param(BindValue::Cidr(network))),
        op: ">>",
        right: Box::new(Expr::Call { name: "any".to_string(), args: vec![column] }),
    })
}

fn ip_family_expr(field: &str, column: Expr, value: &serde_json::Value) -> Result<Expr, TranslationError> {
    let raw = value.as_str().ok_or_else(|| ValueCoercionError { field: field.to_string(), operator: "ip_family".to_string(), reason: "expected an IPFamily enum literal".to_string() })?;
    let family = parse_ip_family(field, raw)?;
    Ok(Expr::Binary {
        left: Box::new(Expr::Param(BindValue::IpFamily(family))),
        op: "=",
        right: Box::new(Expr::Call { name: "any".to_string(), args: vec![Expr::Call { name: functions::FAMILY.to_string(), args: vec![column] }] }),
    })
}

/// `<col> >= round(extract('epoch' from Now() - $n * interval '1 days') * 1000)::bigint`
/// (spec §4.9). The placeholder is spliced into the middle of otherwise-fixed SQL text, the
/// one case [`Expr::Template`] exists for.
fn days_expr(column: Expr, value: &serde_json::Value) -> Expr {
    let template = Expr::Template(vec![
        TemplatePart::Text("round(extract('epoch' from Now() - ".to_string()),
        TemplatePart::Param(BindValue::from(value)),
        TemplatePart::Text(" * interval '1 days') * 1000)".to_string()),
    ]);
    Expr::Binary { left: Box::new(column), op: ">=", right: Box::new(Expr::Cast { expr: Box::new(template), sql_type: "bigint".to_string() }) }
}

/// Resolves an executable field's own `column:[...]` argument (an enum-literal list) to a
/// plain string list, substituting variables. Shared by the Aggregate Translator for
/// `sum`/`avg`/`min`/`max` sub-field column selections.
pub(crate) fn resolved_string_list_argument(ctx: &TranslationContext, field: &ExecField, name: &str) -> Vec<String> {
    field
        .argument(name)
        .map(|v| resolve_value(v, ctx.variables))
        .map(|json| json.as_array().map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect()).unwrap_or_default())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslationConfig;
    use gqlsql_core::executable::ExecutableDocument;
    use gqlsql_core::parse::{parse_executable, parse_schema, resolve_field_types};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn test_schema() -> gqlsql_core::schema::Schema {
        parse_schema(&[r#"
            type Query {
                adapterDevices(where: adapter_device_bool_exp, orderBy: [adapter_device_order_by!], limit: Int = 100, offset: Int = 0): [AdapterDevice!]!
            }
            type AdapterDevice {
                id: ID!
                name: String!
                hostname: String!
                adapterNames: [String!]!
                interfaces(where: network_interface_bool_exp, limit: Int = 100, offset: Int = 0): [NetworkInterface!]! @relation(name: "network_interfaces", fkNames: ["id", "fetchCycle"], relationFkNames: ["deviceId", "fetchCycle"], relType: ONE_TO_MANY)
            }
            type NetworkInterface {
                macAddr: String!
                ipAddrs: [IP!]!
            }
            input adapter_device_bool_exp {
                hostname: StringComparator
                adapterNames: StringArrayComparator
                interfaces: network_interface_bool_exp
                OR: [adapter_device_bool_exp!]
                AND: [adapter_device_bool_exp!]
                NOT: adapter_device_bool_exp
            }
            input network_interface_bool_exp {
                ipAddrs: IPArrayComparator
                OR: [network_interface_bool_exp!]
                AND: [network_interface_bool_exp!]
                NOT: network_interface_bool_exp
            }
            input StringComparator { eq: String ilike: String }
            input StringArrayComparator { contains_regex: String }
            input IPArrayComparator { in_subnet: CIDR ip_family: IPFamily }
        "#])
        .expect("schema parses")
    }

    fn translate_query(schema: &gqlsql_core::schema::Schema, query: &str) -> (String, Vec<BindValue>) {
        let mut document = parse_executable(query).expect("query parses");
        resolve_field_types(&mut document, schema).expect("query resolves");
        let config = TranslationConfig::new(Arc::new(schema.clone())).with_sequential_aliases();
        let variables = HashMap::new();
        let ctx = TranslationContext::new(&config, &document, &variables);
        let gqlsql_core::executable::Selection::Field(root) = &document.operations[0].selection_set[0] else { panic!("expected field") };
        translate(&ctx, root).expect("translation succeeds")
    }

    #[test]
    fn s1_trivial_list() {
        let schema = test_schema();
        let (sql, params) = translate_query(&schema, "{ adapterDevices { name hostname } }");
        assert_eq!(sql, "SELECT (sq1.name) AS name, (sq1.hostname) AS hostname FROM adapter_devices AS sq1 LIMIT 100 OFFSET 0");
        assert!(params.is_empty());
    }

    #[test]
    fn s2_limit_offset() {
        let schema = test_schema();
        let (sql, _) = translate_query(&schema, "{ adapterDevices(limit: 5, offset: 3) { id } }");
        assert!(sql.ends_with("LIMIT 5 OFFSET 3"));
    }

    #[test]
    fn s3_one_to_many_relation() {
        let schema = test_schema();
        let (sql, params) = translate_query(&schema, "{ adapterDevices { name interfaces { macAddr } } }");
        assert_eq!(
            sql,
            "SELECT (sq1.name) AS name, (sq2.interfaces) AS interfaces FROM adapter_devices AS sq1 LEFT JOIN LATERAL ( SELECT (COALESCE(jsonb_agg(jsonb_build_object('mac_addr',sq2.mac_addr)), '[]')) AS interfaces FROM network_interfaces AS sq2 WHERE sq1.id = sq2.device_id AND sq1.fetch_cycle = sq2.fetch_cycle LIMIT 100 OFFSET 0 ) sq2 ON True LIMIT 100 OFFSET 0"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn s6_json_path_or() {
        // Standalone JSON-path compiler coverage lives in jsonpath.rs; this exercises the
        // same shape reached through a `bool_exp` WHERE key on a `@jsonpath` field.
        let schema = parse_schema(&[r#"
            type Query { adapterDevices(where: adapter_device_bool_exp): [AdapterDevice!]! }
            type AdapterDevice {
                adapterData: AdapterData @jsonpath(name: "data")
            }
            type AdapterData { adCn: String }
            input adapter_device_bool_exp { adapterData: adapter_data_bool_exp }
            input adapter_data_bool_exp { adCn: StringComparator OR: [adapter_data_bool_exp!] }
            input StringComparator { like: String eq: String }
        "#])
        .unwrap();
        let mut document = parse_executable(r#"{ adapterDevices(where: { adapterData: { OR: [{ adCn: { like: "lol" } }, { adCn: { eq: "dd" } }] } }) { adapterData { adCn } } }"#).unwrap();
        resolve_field_types(&mut document, &schema).unwrap();
        let config = TranslationConfig::new(Arc::new(schema.clone())).with_sequential_aliases();
        let variables = HashMap::new();
        let ctx = TranslationContext::new(&config, &document, &variables);
        let gqlsql_core::executable::Selection::Field(root) = &document.operations[0].selection_set[0] else { panic!("expected field") };
        let (sql, params) = translate(&ctx, root).expect("translation succeeds");
        assert!(sql.contains("data @? format('$ ? ((@.ad_cn like_regex \"%s\" || @.ad_cn == \"%I\"))',$1::text,$2::text)::jsonpath"));
        assert_eq!(params, vec![BindValue::Text("lol".into()), BindValue::Text("dd".into())]);
    }

    #[test]
    fn string_array_contains_regex_and_relation_filter_combine_with_or() {
        let schema = test_schema();
        let query = r#"{
            adapterDevices(where: {
                OR: [
                    { adapterNames_contains_regex: "win" }
                    { interfaces: { ipAddrs_ip_family: V4, ipAddrs_in_subnet: "10.0.2.0/24" } }
                ]
            }) { id }
        }"#;
        let (sql, params) = translate_query(&schema, query);
        assert!(sql.contains("arrayToText(sq1.adapter_names) LIKE $1"));
        assert!(sql.contains("EXISTS"));
        assert!(sql.contains("sq1.id = sq2.device_id AND sq1.fetch_cycle = sq2.fetch_cycle"));
        assert!(sql.contains("= any(family(sq2.ip_addrs))"));
        assert!(sql.contains(">> any(sq2.ip_addrs)"));
        assert_eq!(params.len(), 3);
    }

    #[test]
    fn unresolved_field_is_missing_field_definition_error() {
        let schema = test_schema();
        let mut document = ExecutableDocument::default();
        let field = ExecField {
            name: "doesNotExist".into(),
            alias: None,
            arguments: vec![],
            directives: vec![],
            selection_set: vec![],
            definition_type: gqlsql_core::schema::Type::named("X"),
        };
        document.operations.push(gqlsql_core::executable::OperationDefinition {
            name: None,
            operation_type: gqlsql_core::executable::OperationType::Query,
            selection_set: vec![Selection::Field(field)],
        });
        let config = TranslationConfig::new(Arc::new(schema)).with_sequential_aliases();
        let variables = HashMap::new();
        let ctx = TranslationContext::new(&config, &document, &variables);
        let Selection::Field(root) = &document.operations[0].selection_set[0] else { panic!() };
        assert!(matches!(translate(&ctx, root), Err(TranslationError::MissingFieldDefinition(_))));
    }
}
