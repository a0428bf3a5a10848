//! Aggregate Translator (spec §4.8): translates one `<name>_aggregate` sibling field into a
//! two-level SELECT — an inner query computing `DISTINCT ON`/`GROUP BY`/aggregate-function
//! projections over the underlying relation, and an outer query that re-projects those
//! columns and applies `ORDER`/`LIMIT`/`OFFSET`. Grounded on
//! `bandicoot/internal/sqlgen/translator.go`'s `translateAggregate`/`buildAggregateSelect`,
//! reusing [`crate::translator`]'s selection-set walker for the aggregate sibling's own
//! nested raw-row projection the same way a relation field does.

use heck::ToSnakeCase;

use gqlsql_core::directives::relation_directive;
use gqlsql_core::executable::Field as ExecField;
use gqlsql_core::schema::{ExtendedType, FieldDefinition};

use crate::bind::BindValue;
use crate::config::TranslationContext;
use crate::error::TranslationError;
use crate::sql::{lateral_join, render, Expr, Join, JoinKind, JoinSource, Select};
use crate::translator::{apply_order_limit_offset, apply_where, build_object_fields, field_definition, jsonb_build_object_expr, resolved_string_list_argument};

const SUM: &str = "sum";
const AVG: &str = "avg";
const MIN: &str = "min";
const MAX: &str = "max";
const COUNT: &str = "count";
const GROUP_BY: &str = "groupBy";
const DISTINCT_ON: &str = "distinctOn";
const AGGREGATE_FUNCTIONS: &[&str] = &[SUM, AVG, MIN, MAX];

/// Root-level entry point: a top-level `<name>_aggregate` query field translates to just the
/// outer SELECT (no further wrapping).
#[tracing::instrument(skip_all, fields(field = %root_field.name))]
pub fn translate_root(ctx: &TranslationContext, root_field: &ExecField) -> Result<(String, Vec<BindValue>), TranslationError> {
    ctx.check_cancelled()?;
    let query_type = ctx.schema().query_type.clone().unwrap_or_else(|| "Query".to_string());
    let def = field_definition(ctx.schema(), &query_type, &root_field.name)?;
    let outer = build_aggregate_select(ctx, def, root_field, None)?;
    let mut params = Vec::new();
    let sql = render(&outer, &mut params);
    tracing::debug!(sql, params = params.len(), "translated aggregate query");
    Ok((sql, params))
}

/// Nested-use entry point, called from [`crate::translator::build_object_fields`] when a
/// selected field classifies as `Aggregate`. Wraps the full two-level aggregate SELECT in a
/// `CROSS JOIN LATERAL` on `select` and returns the `(json_key, expr)` pair the caller
/// projects, matching every other nested-field category's calling convention.
pub(crate) fn build_nested(ctx: &TranslationContext, select: &mut Select, parent_alias: &str, def: &FieldDefinition, field: &ExecField) -> Result<(String, Expr), TranslationError> {
    let outer = build_aggregate_select(ctx, def, field, Some(parent_alias))?;
    let cross_alias = ctx.next_alias();
    select.join(Join { kind: JoinKind::CrossLateral, source: JoinSource::Subquery(Box::new(outer)), alias: cross_alias.clone(), on: Expr::Literal("True".to_string()) });
    let key = field.response_name().to_snake_case();
    let expr = Expr::Call {
        name: "jsonb_agg".to_string(),
        args: vec![Expr::Call { name: "row_to_json".to_string(), args: vec![Expr::Raw(cross_alias)] }],
    };
    Ok((key, expr))
}

/// Recovers the element type name of the underlying relation an aggregate sibling field
/// aggregates over. The Aggregation augmenter (spec §4.1) copies the original field's own
/// name onto a lowered raw-row sibling field of the Aggregate object type, so its element
/// type is found there rather than from the `_aggregate` field's own (synthetic) type.
fn element_type_name<'a>(ctx: &'a TranslationContext, aggregate_type: &str, original_name: &str) -> Result<&'a str, TranslationError> {
    let fields = ctx
        .schema()
        .get(aggregate_type)
        .and_then(ExtendedType::fields)
        .ok_or_else(|| TranslationError::MissingFieldDefinition(aggregate_type.to_string()))?;
    let raw = fields.get(original_name).ok_or_else(|| TranslationError::MissingFieldDefinition(format!("{aggregate_type}.{original_name}")))?;
    Ok(raw.ty.inner_name())
}

fn build_aggregate_select(ctx: &TranslationContext, def: &FieldDefinition, field: &ExecField, parent_alias: Option<&str>) -> Result<Select, TranslationError> {
    let original_name = field.name.strip_suffix("_aggregate").unwrap_or(&field.name);
    let aggregate_type = def.ty.inner_name();
    let element_type = element_type_name(ctx, aggregate_type, original_name)?.to_string();
    let relation = relation_directive(def);

    let inner_alias = ctx.next_alias();
    let mut args = field.argument_map(ctx.variables);
    if let Some(hook) = &ctx.config.before_clauses {
        hook(&ctx.hook_context(), &inner_alias, &element_type, &mut args);
    }

    let from = match &relation {
        Some(rel) => format!("{} AS {inner_alias}", rel.name),
        None => format!("{} AS {inner_alias}", original_name.to_snake_case()),
    };
    let mut inner = Select::new(from);

    if let (Some(rel), Some(parent)) = (&relation, parent_alias) {
        inner.filter(Expr::Raw(rel.relation_clause(parent, &inner_alias)));
    }

    let distinct_cols: Vec<String> = resolved_string_list_argument(ctx, field, DISTINCT_ON).iter().map(|c| c.to_snake_case()).collect();
    if !distinct_cols.is_empty() {
        inner.distinct_on = distinct_cols.iter().map(|c| format!("{inner_alias}.{c}")).collect();
        for col in &distinct_cols {
            inner.project(Expr::Aliased { expr: Box::new(Expr::Column { alias: inner_alias.clone(), column: col.clone() }), as_name: col.clone() });
        }
        inner.project(Expr::Aliased { expr: Box::new(text_array_literal(&distinct_cols)), as_name: "distinct".to_string() });
    }

    let group_cols: Vec<String> = args.get(GROUP_BY).and_then(|v| v.as_array()).map(|a| a.iter().filter_map(|v| v.as_str()).map(str::to_string).collect()).unwrap_or_default();
    let group_cols: Vec<String> = group_cols.iter().map(|c| c.to_snake_case()).collect();
    if !group_cols.is_empty() {
        inner.group_by = group_cols.iter().map(|c| format!("{inner_alias}.{c}")).collect();
        for col in &group_cols {
            inner.project(Expr::Aliased { expr: Box::new(Expr::Column { alias: inner_alias.clone(), column: col.clone() }), as_name: col.clone() });
        }
        inner.project(Expr::Aliased { expr: Box::new(text_array_literal(&group_cols)), as_name: "group".to_string() });
    }

    let mut raw_row_selection = None;
    for selection in &field.selection_set {
        let gqlsql_core::executable::Selection::Field(sub) = selection else { continue };
        match sub.name.as_str() {
            COUNT => inner.project(Expr::Aliased { expr: Box::new(Expr::Call { name: "Count".to_string(), args: vec![Expr::Literal("*".to_string())] }), as_name: COUNT.to_string() }),
            name if AGGREGATE_FUNCTIONS.contains(&name) => {
                let columns = resolved_string_list_argument(ctx, sub, "column");
                inner.project(aggregate_function_projection(&inner_alias, name, &columns));
            }
            GROUP_BY | DISTINCT_ON => {} // already projected above from the sibling's own arguments
            name if name == original_name => raw_row_selection = Some(sub),
            _ => {}
        }
    }

    apply_where(ctx, &mut inner, &inner_alias, &element_type, &args)?;

    let outer_alias = ctx.next_alias();
    let mut outer = Select::from_subquery(inner.clone(), outer_alias.clone());
    for projection in &inner.projections {
        if let Expr::Aliased { as_name, .. } = projection {
            outer.project(Expr::Aliased { expr: Box::new(Expr::Column { alias: outer_alias.clone(), column: as_name.clone() }), as_name: as_name.clone() });
        }
    }

    if let Some(raw_field) = raw_row_selection {
        let (key, expr) = build_nested_raw_rows(ctx, &mut outer, &element_type, &relation, parent_alias, raw_field)?;
        outer.project(Expr::Aliased { expr: Box::new(expr), as_name: key });
    }

    apply_order_limit_offset(&mut outer, &args);
    Ok(outer)
}

/// Projects an aggregate sibling's own lowered raw-row field (e.g. selecting `adapterDevices
/// { name }` inside `adapterDevices_aggregate`) as a further `LEFT JOIN LATERAL` returning the
/// matching raw rows as a JSON array, reusing the same FROM/correlation the aggregate's own
/// inner query uses rather than the grouped/distinct rows (spec §4.8's raw-row note; see
/// DESIGN.md for why this does not attempt to correlate to a specific group).
fn build_nested_raw_rows(
    ctx: &TranslationContext,
    outer: &mut Select,
    element_type: &str,
    relation: &Option<gqlsql_core::directives::RelationDirective>,
    parent_alias: Option<&str>,
    raw_field: &ExecField,
) -> Result<(String, Expr), TranslationError> {
    let alias = ctx.next_alias();
    let from = match relation {
        Some(rel) => format!("{} AS {alias}", rel.name),
        None => format!("{} AS {alias}", raw_field.name.to_snake_case()),
    };
    let mut inner = Select::new(from);
    let pairs = build_object_fields(ctx, &mut inner, &alias, element_type, &raw_field.selection_set)?;
    let row = jsonb_build_object_expr(pairs);
    let key = raw_field.response_name().to_snake_case();
    inner.project(Expr::Aliased {
        expr: Box::new(Expr::Call { name: "COALESCE".to_string(), args: vec![Expr::Call { name: "jsonb_agg".to_string(), args: vec![row] }, Expr::Literal("'[]'".to_string())] }),
        as_name: key.clone(),
    });
    if let (Some(rel), Some(parent)) = (relation, parent_alias) {
        inner.filter(Expr::Raw(rel.relation_clause(parent, &alias)));
    }
    outer.join(lateral_join(JoinKind::LeftLateral, alias.clone(), inner));
    Ok((key.clone(), Expr::Column { alias, column: key }))
}

fn aggregate_function_projection(alias: &str, func: &str, columns: &[String]) -> Expr {
    let mut pairs = Vec::with_capacity(columns.len() * 2);
    for column in columns {
        let snake = column.to_snake_case();
        pairs.push(Expr::Literal(format!("'{snake}'")));
        pairs.push(Expr::Call { name: func.to_string(), args: vec![Expr::Column { alias: alias.to_string(), column: snake }] });
    }
    Expr::Aliased { expr: Box::new(Expr::Func { name: "jsonb_build_object".to_string(), args: pairs }), as_name: func.to_string() }
}

fn text_array_literal(columns: &[String]) -> Expr {
    let items: Vec<String> = columns.iter().map(|c| format!("'{c}'")).collect();
    Expr::Literal(format!("ARRAY[{}]::text[]", items.join(",")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TranslationConfig;
    use gqlsql_core::executable::Selection;
    use gqlsql_core::parse::{parse_executable, parse_schema, resolve_field_types};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn schema_with_aggregate() -> gqlsql_core::schema::Schema {
        parse_schema(&[r#"
            type Query {
                adapterDevices_aggregate(where: adapter_device_bool_exp, groupBy: [adapter_device_group_by!], distinctOn: [adapter_device_distinct_on!], orderBy: [adapter_device_aggregate_order_by!], limit: Int = 100, offset: Int = 0): [AdapterDeviceAggregate!]!
            }
            type AdapterDevice {
                id: ID!
                osId: String!
                cycleCount: Int!
            }
            type AdapterDeviceAggregate {
                sum(column: [adapter_device_numeric_column!]!): AdapterDeviceSum
                count: Int
                groupBy: String
                adapterDevices: [AdapterDevice!]
            }
            type AdapterDeviceSum { cycleCount: Int }
            input adapter_device_bool_exp { osId: StringComparator }
            input StringComparator { eq: String }
            enum adapter_device_group_by { osId }
            enum adapter_device_distinct_on { osId }
            enum adapter_device_aggregate_order_by { count_ASC }
            enum adapter_device_numeric_column { cycleCount }
        "#])
        .expect("schema parses")
    }

    #[test]
    fn root_aggregate_projects_sum_count_and_group_by() {
        let schema = schema_with_aggregate();
        let query = r#"{ adapterDevices_aggregate(groupBy: [osId]) { sum(column: [cycleCount]) count groupBy } }"#;
        let mut document = parse_executable(query).expect("query parses");
        resolve_field_types(&mut document, &schema).expect("query resolves");
        let config = TranslationConfig::new(Arc::new(schema.clone())).with_sequential_aliases();
        let variables = HashMap::new();
        let ctx = TranslationContext::new(&config, &document, &variables);
        let Selection::Field(root) = &document.operations[0].selection_set[0] else { panic!() };
        let (sql, params) = translate_root(&ctx, root).expect("aggregate translation succeeds");
        assert!(sql.contains("GROUP BY sq1.os_id"));
        assert!(sql.contains("jsonb_build_object('cycle_count',sum(sq1.cycle_count)) AS sum"));
        assert!(sql.contains("Count(*) AS count"));
        assert!(sql.starts_with("SELECT"));
        assert!(params.is_empty());
    }
}
