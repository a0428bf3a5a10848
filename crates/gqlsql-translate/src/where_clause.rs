//! `where_clause_has_key` (spec §4 supplement #1): a recursive search over a resolved
//! `where:` argument map checking whether a given field name appears anywhere in it,
//! including nested under `AND`/`OR`/`NOT`. Grounded on `WhereClauseHasKey` in
//! `bandicoot/internal/sqlgen/translator.go`, which a `before_clauses` hook uses to decide
//! whether a caller already constrained a partition column before forcibly injecting one.

use gqlsql_core::operators::{AND, NOT, OR};

/// True if `key` appears as a field name anywhere in `where_map`, recursing into the `AND`/
/// `OR` list values and the `NOT` nested map.
pub fn where_clause_has_key(where_map: &serde_json::Map<String, serde_json::Value>, key: &str) -> bool {
    for (k, v) in where_map {
        match k.as_str() {
            AND | OR => {
                if let Some(list) = v.as_array() {
                    if list.iter().filter_map(|item| item.as_object()).any(|m| where_clause_has_key(m, key)) {
                        return true;
                    }
                }
            }
            NOT => {
                if let Some(nested) = v.as_object() {
                    if where_clause_has_key(nested, key) {
                        return true;
                    }
                }
            }
            other if other == key => return true,
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn finds_key_at_top_level() {
        let where_map = json!({"fetchCycle": {"eq": 1}});
        let map = where_map.as_object().unwrap();
        assert!(where_clause_has_key(map, "fetchCycle"));
        assert!(!where_clause_has_key(map, "hostname"));
    }

    #[test]
    fn finds_key_nested_under_and_or_not() {
        let where_map = json!({
            "OR": [
                {"hostname": {"eq": "a"}},
                {"NOT": {"fetchCycle": {"eq": 2}}}
            ]
        });
        let map = where_map.as_object().unwrap();
        assert!(where_clause_has_key(map, "fetchCycle"));
        assert!(!where_clause_has_key(map, "osId"));
    }
}
