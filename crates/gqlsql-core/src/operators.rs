//! Operator-name parsing (spec §4.1). This is the single routine the WHERE builder and
//! the JSON-path compiler both call so they "agree bit-for-bit" on operator semantics by
//! construction rather than by convention — grounded on `GetComparisonOperation` and
//! `GetOrderOperation` in `bandicoot/internal/sqlgen/translator.go`.

use heck::ToSnakeCase;

pub const AND: &str = "AND";
pub const OR: &str = "OR";
pub const NOT: &str = "NOT";
pub const BOOL_EXP: &str = "bool_exp";

/// Splits a filter key into `(field_name, operator)`.
///
/// `AND`/`OR`/`NOT` are special-cased to `("", "AND"|"OR"|"NOT")`. Otherwise the key is
/// split on the *first* `_`: the prefix is snake-cased as the field name, and everything
/// after (which may itself contain underscores, e.g. `name_not_in` -> `not_in`) is the
/// operator. A key with no `_` at all has no recognised operator suffix and is treated as
/// a bare field name whose operator is `bool_exp` (a nested object filter).
pub fn parse_operator(key: &str) -> (String, String) {
    if key == AND || key == OR || key == NOT {
        return (String::new(), key.to_string());
    }
    match key.split_once('_') {
        Some((prefix, suffix)) => (prefix.to_snake_case(), suffix.to_string()),
        None => (key.to_string(), BOOL_EXP.to_string()),
    }
}

/// Splits an order-by enum value of the shape `<field>_ASC` / `<field>_DESC` on the
/// *last* `_`, snake-casing the field part and leaving the direction verbatim.
pub fn parse_order_operator(value: &str) -> (String, String) {
    match value.rsplit_once('_') {
        Some((field, direction)) => (field.to_snake_case(), direction.to_string()),
        None => (value.to_snake_case(), String::new()),
    }
}

/// Renders a single `<col> <direction>` ORDER BY term, matching `GetOrderOperation`'s
/// `"%s %s"` formatting.
pub fn order_clause(value: &str) -> String {
    let (field, direction) = parse_order_operator(value);
    format!("{field} {direction}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logical_operators_have_no_field_name() {
        assert_eq!(parse_operator("AND"), (String::new(), "AND".to_string()));
        assert_eq!(parse_operator("OR"), (String::new(), "OR".to_string()));
        assert_eq!(parse_operator("NOT"), (String::new(), "NOT".to_string()));
    }

    #[test]
    fn multi_word_suffix_stays_joined() {
        assert_eq!(parse_operator("name_not_in"), ("name".to_string(), "not_in".to_string()));
    }

    #[test]
    fn bare_field_name_is_bool_exp() {
        assert_eq!(parse_operator("adapterDevices"), ("adapterDevices".to_string(), "bool_exp".to_string()));
    }

    #[test]
    fn prefix_is_snake_cased() {
        assert_eq!(parse_operator("adapterNames_contains_regex"), ("adapter_names".to_string(), "contains_regex".to_string()));
    }

    #[test]
    fn order_operator_splits_on_last_underscore() {
        assert_eq!(parse_order_operator("fetch_cycle_ASC"), ("fetch_cycle".to_string(), "ASC".to_string()));
        assert_eq!(order_clause("hostname_DESC"), "hostname DESC");
    }

    #[test]
    fn operator_parse_round_trip_property() {
        for (field, op) in [("name", "eq"), ("adapter_names", "contains_regex"), ("ip_addrs", "in_subnet")] {
            let key = format!("{field}_{op}");
            assert_eq!(parse_operator(&key), (field.to_string(), op.to_string()));
        }
        for logical in [AND, OR, NOT] {
            assert_eq!(parse_operator(logical), (String::new(), logical.to_string()));
        }
    }
}
