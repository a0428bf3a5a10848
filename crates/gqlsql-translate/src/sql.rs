//! SQL Expression Model (spec §4.11 / component table "SQL Expression Model"): a tagged
//! variant tree for SELECT/FROM/WHERE/JOIN/ORDER/LIMIT/OFFSET, serialised in one recursive
//! pass that assigns `$1..$N` placeholders in left-to-right order of appearance (spec §3,
//! Data Model "SQL Expression Node" invariant) rather than in construction order. Grounded
//! on the query-builder shape of `bandicoot/internal/sqlgen/sql` (a small internal package
//! of string-building helpers around a `squirrel`-like placeholder scheme), adapted here
//! into an owned, typed tree the way `apollo-encoder`'s `Field`/`ObjectDef` types model SDL
//! output as owned structs rather than ad-hoc string concatenation.

use crate::bind::BindValue;

/// One node of the SQL expression tree. Most variants render directly to text; [`Expr::Param`]
/// is the only variant that consumes a placeholder slot during [`render`].
#[derive(Debug, Clone)]
pub enum Expr {
    /// `<alias>.<column>`
    Column { alias: String, column: String },
    /// A value already known to be safe to inline as SQL text (an enum tag, a keyword like
    /// `True`, a literal array `'[]'`) — never used for untrusted input.
    Literal(String),
    /// A bound value; renders as `$N` and appends to the parameter list during serialisation.
    Param(BindValue),
    /// `(<expr>) AS <as_name>` — the shape every top-level projection takes in this schema
    /// (spec §4.7's `Column` category: `SELECT (<alias>.<snake(name)>) AS <snake(name)>`).
    Aliased { expr: Box<Expr>, as_name: String },
    /// `<name>(<args-joined-by-comma>)` with no space after the commas, matching the Go
    /// original's `strings.Join(pairs, ",")` inside `jsonb_build_object(...)`.
    Func { name: String, args: Vec<Expr> },
    /// `<name>(<args-joined-by-", ">)` — ordinary SQL call syntax, for everything other than
    /// `jsonb_build_object`'s deliberately spaceless join: `COALESCE(jsonb_agg(...), '[]')`,
    /// `array_length(col, 1)`, `extract(...)`.
    Call { name: String, args: Vec<Expr> },
    /// `<left> <op> <right>`
    Binary { left: Box<Expr>, op: &'static str, right: Box<Expr> },
    /// `<expr> IS [NOT] NULL`
    IsNull { expr: Box<Expr>, negate: bool },
    /// `(<preds> AND ...)` / `(<preds> OR ...)`
    Logical { op: LogicalOp, predicates: Vec<Expr> },
    /// `NOT (<expr>)`
    Not(Box<Expr>),
    /// `EXISTS ( <select> )`
    Exists(Box<Select>),
    /// An already-fully-formed SQL fragment, the escape hatch for text this model has no
    /// dedicated node for.
    Raw(String),
    /// `<expr>::<sql_type>`
    Cast { expr: Box<Expr>, sql_type: String },
    /// `format('<literal>', $N::<type>, $N::<type>, ...)` — the JSON-path compiler's one
    /// specialised call shape, where each bound value carries its own cast suffix rather
    /// than sharing one cast for the whole call (per-argument type tags needed to satisfy
    /// `jsonpath`'s strict literal typing).
    FormatCall { literal: String, casted_params: Vec<(BindValue, &'static str)> },
    /// Interleaved literal text and bound values, rendered in sequence. Used for the one
    /// WHERE operator (`days`) whose SQL shape splices a single placeholder into the middle
    /// of a fixed expression rather than taking a plain `<col> <op> <value>` form.
    Template(Vec<TemplatePart>),
}

/// One piece of an [`Expr::Template`]: either literal text or a value to bind.
#[derive(Debug, Clone)]
pub enum TemplatePart {
    Text(String),
    Param(BindValue),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    fn keyword(self) -> &'static str {
        match self {
            LogicalOp::And => " AND ",
            LogicalOp::Or => " OR ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Left,
    LeftLateral,
    CrossLateral,
}

/// The FROM-side of a [`Join`]: either already-rendered text (`<table> AS <alias>` for a
/// plain `LEFT JOIN`) or a nested [`Select`] rendered lazily, at the point the enclosing
/// query is serialised, so its own `Expr::Param` nodes receive placeholders in the correct
/// left-to-right position relative to the rest of the outer query.
#[derive(Debug, Clone)]
pub enum JoinSource {
    Raw(String),
    Subquery(Box<Select>),
}

/// One JOIN clause. Matches spec §4.7's `LEFT JOIN LATERAL ( ... ) <alias> ON True` shape
/// for relation/view-function/aggregate subqueries, and a plain `LEFT JOIN <table> ON ...`
/// for the many-to-many pivot join inside a relation's own inner SELECT.
#[derive(Debug, Clone)]
pub struct Join {
    pub kind: JoinKind,
    pub source: JoinSource,
    pub alias: String,
    pub on: Expr,
}

/// A single SELECT statement: the unit both the Translator Core and the Aggregate
/// Translator assemble, nest, and wrap in LATERAL joins. Matches spec's Data Model
/// description of the SELECT expression node exactly (FROM, JOIN list, WHERE conjunction,
/// ORDER list, LIMIT, OFFSET) plus `distinct_on`/`group_by` for the Aggregate Translator.
#[derive(Debug, Clone, Default)]
pub struct Select {
    pub projections: Vec<Expr>,
    /// Already-rendered `<table> AS <alias>` or `<fn>(<args>) AS <alias>` text. Ignored when
    /// `from_subquery` is set.
    pub from: String,
    /// Set by [`Select::from_subquery`] for the Aggregate Translator's outer query, whose
    /// FROM is a derived table rather than a named relation. Kept separate from `from` rather
    /// than folding both into one enum so the overwhelmingly common plain-table path (every
    /// other call site) stays a one-line `Select::new("table AS alias")`.
    pub from_subquery: Option<(Box<Select>, String)>,
    pub joins: Vec<Join>,
    /// Conjunction: every entry here is ANDed together to form the WHERE clause.
    pub where_predicates: Vec<Expr>,
    pub distinct_on: Vec<String>,
    pub group_by: Vec<String>,
    pub order_by: Vec<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Select {
    pub fn new(from: impl Into<String>) -> Self {
        Select { from: from.into(), ..Default::default() }
    }

    /// A SELECT whose FROM clause is itself a rendered subquery: `FROM ( <inner> ) AS
    /// <alias>` (spec §4.8's aggregate outer query). `inner` is rendered lazily at the point
    /// the enclosing query is serialised, the same deferral [`JoinSource::Subquery`] uses, so
    /// its `Expr::Param` nodes still receive placeholders in left-to-right textual order.
    pub fn from_subquery(inner: Select, alias: impl Into<String>) -> Self {
        Select { from_subquery: Some((Box::new(inner), alias.into())), ..Default::default() }
    }

    pub fn project(&mut self, expr: Expr) -> &mut Self {
        self.projections.push(expr);
        self
    }

    pub fn filter(&mut self, predicate: Expr) -> &mut Self {
        self.where_predicates.push(predicate);
        self
    }

    pub fn join(&mut self, join: Join) -> &mut Self {
        self.joins.push(join);
        self
    }
}

/// Renders a full SELECT, assigning placeholders to every [`Expr::Param`] encountered in
/// left-to-right textual order and appending its value to `params`. This is the single
/// entry point the Translator Core, Aggregate Translator, and JSON-Path Compiler all share
/// so numbering stays dense and consistent across however deeply nested the tree is.
pub fn render(select: &Select, params: &mut Vec<BindValue>) -> String {
    let mut out = String::from("SELECT ");
    if !select.distinct_on.is_empty() {
        out.push_str(&format!("DISTINCT ON ({}) ", select.distinct_on.join(", ")));
    }
    let projections: Vec<String> = select.projections.iter().map(|p| render_expr(p, params)).collect();
    out.push_str(&projections.join(", "));
    out.push_str(" FROM ");
    match &select.from_subquery {
        Some((inner, alias)) => out.push_str(&format!("( {} ) AS {alias}", render(inner, params))),
        None => out.push_str(&select.from),
    }
    for join in &select.joins {
        out.push(' ');
        out.push_str(&render_join(join, params));
    }
    if !select.where_predicates.is_empty() {
        let rendered: Vec<String> = select.where_predicates.iter().map(|p| render_expr(p, params)).collect();
        out.push_str(" WHERE ");
        out.push_str(&rendered.join(" AND "));
    }
    if !select.group_by.is_empty() {
        out.push_str(&format!(" GROUP BY {}", select.group_by.join(", ")));
    }
    if !select.order_by.is_empty() {
        out.push_str(&format!(" ORDER BY {}", select.order_by.join(", ")));
    }
    if let Some(limit) = select.limit {
        out.push_str(&format!(" LIMIT {limit}"));
    }
    if let Some(offset) = select.offset {
        out.push_str(&format!(" OFFSET {offset}"));
    }
    out
}

fn render_join(join: &Join, params: &mut Vec<BindValue>) -> String {
    let source = match &join.source {
        JoinSource::Raw(text) => text.clone(),
        JoinSource::Subquery(select) => render(select, params),
    };
    let on = render_expr(&join.on, params);
    match join.kind {
        JoinKind::Left => format!("LEFT JOIN {source} ON {on}"),
        JoinKind::LeftLateral => format!("LEFT JOIN LATERAL ( {source} ) {alias} ON {on}", alias = join.alias),
        JoinKind::CrossLateral => format!("CROSS JOIN LATERAL ( {source} ) {alias}", alias = join.alias),
    }
}

pub fn render_expr(expr: &Expr, params: &mut Vec<BindValue>) -> String {
    match expr {
        Expr::Column { alias, column } => format!("{alias}.{column}"),
        Expr::Literal(text) => text.clone(),
        Expr::Param(value) => {
            params.push(value.clone());
            format!("${}", params.len())
        }
        Expr::Aliased { expr, as_name } => format!("({}) AS {as_name}", render_expr(expr, params)),
        Expr::Func { name, args } => {
            let rendered: Vec<String> = args.iter().map(|a| render_expr(a, params)).collect();
            format!("{name}({})", rendered.join(","))
        }
        Expr::Call { name, args } => {
            let rendered: Vec<String> = args.iter().map(|a| render_expr(a, params)).collect();
            format!("{name}({})", rendered.join(", "))
        }
        Expr::Binary { left, op, right } => format!("{} {op} {}", render_expr(left, params), render_expr(right, params)),
        Expr::IsNull { expr, negate } => {
            format!("{} IS {}NULL", render_expr(expr, params), if *negate { "NOT " } else { "" })
        }
        Expr::Logical { op, predicates } => {
            let rendered: Vec<String> = predicates.iter().map(|p| render_expr(p, params)).collect();
            format!("({})", rendered.join(op.keyword()))
        }
        Expr::Not(inner) => format!("NOT ({})", render_expr(inner, params)),
        Expr::Exists(select) => format!("EXISTS ( {} )", render(select, params)),
        Expr::Raw(text) => text.clone(),
        Expr::Cast { expr, sql_type } => format!("{}::{sql_type}", render_expr(expr, params)),
        Expr::FormatCall { literal, casted_params } => {
            let mut out = format!("format('{literal}'");
            for (value, sql_type) in casted_params {
                params.push(value.clone());
                out.push_str(&format!(",${}::{sql_type}", params.len()));
            }
            out.push(')');
            out
        }
        Expr::Template(parts) => {
            let mut out = String::new();
            for part in parts {
                match part {
                    TemplatePart::Text(text) => out.push_str(text),
                    TemplatePart::Param(value) => {
                        params.push(value.clone());
                        out.push_str(&format!("${}", params.len()));
                    }
                }
            }
            out
        }
    }
}

/// Builds a `LEFT JOIN LATERAL ( <subquery> ) <alias> ON True` / `CROSS JOIN LATERAL (
/// <subquery> ) <alias>` join, the shape every relation, view-function, and nested
/// aggregate projection wraps its inner SELECT in (spec §4.7, §4.8).
pub fn lateral_join(kind: JoinKind, alias: impl Into<String>, subquery: Select) -> Join {
    let alias = alias.into();
    Join { kind, alias, source: JoinSource::Subquery(Box::new(subquery)), on: Expr::Literal("True".to_string()) }
}

/// Names of the view functions the WHERE builder and the JSON-path compiler both emit raw
/// calls to. Kept as constants rather than inline string literals (spec §4 supplement #3)
/// so the two call sites can't drift apart on spelling; the target database must still
/// provide both (`arrayToText(anyarray) -> text`, `family(inet[]) -> int[]`).
pub mod functions {
    pub const ARRAY_TO_TEXT: &str = "arrayToText";
    pub const FAMILY: &str = "family";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_column_projection_list() {
        let mut select = Select::new("adapter_devices AS sq1");
        select.project(Expr::Aliased {
            expr: Box::new(Expr::Column { alias: "sq1".into(), column: "name".into() }),
            as_name: "name".into(),
        });
        select.project(Expr::Aliased {
            expr: Box::new(Expr::Column { alias: "sq1".into(), column: "hostname".into() }),
            as_name: "hostname".into(),
        });
        select.limit = Some(100);
        select.offset = Some(0);
        let mut params = Vec::new();
        let sql = render(&select, &mut params);
        assert_eq!(sql, "SELECT (sq1.name) AS name, (sq1.hostname) AS hostname FROM adapter_devices AS sq1 LIMIT 100 OFFSET 0");
        assert!(params.is_empty());
    }

    #[test]
    fn param_placeholders_are_dense_and_left_to_right() {
        let mut select = Select::new("adapter_devices AS sq1");
        select.filter(Expr::Binary {
            left: Box::new(Expr::Column { alias: "sq1".into(), column: "hostname".into() }),
            op: "=",
            right: Box::new(Expr::Param(BindValue::Text("a".into()))),
        });
        select.filter(Expr::Binary {
            left: Box::new(Expr::Column { alias: "sq1".into(), column: "id".into() }),
            op: "=",
            right: Box::new(Expr::Param(BindValue::Int(7))),
        });
        let mut params = Vec::new();
        let sql = render(&select, &mut params);
        assert!(sql.contains("$1"));
        assert!(sql.contains("$2"));
        assert_eq!(params.len(), 2);
        assert_eq!(params[0], BindValue::Text("a".into()));
        assert_eq!(params[1], BindValue::Int(7));
    }

    #[test]
    fn logical_or_wraps_in_one_parenthesis() {
        let expr = Expr::Logical {
            op: LogicalOp::Or,
            predicates: vec![
                Expr::Raw("a = 1".into()),
                Expr::Raw("b = 2".into()),
            ],
        };
        let mut params = Vec::new();
        assert_eq!(render_expr(&expr, &mut params), "(a = 1 OR b = 2)");
    }
}
