//! Naming-convention helpers. Ported from `bandicoot/internal/array.go`'s
//! `StringInSlice`/`SnakeCaseAll`, built on `heck::ToSnakeCase` rather than a hand-rolled
//! case converter.

use heck::ToSnakeCase;

pub fn snake_case_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.to_snake_case()).collect()
}

pub fn string_in_slice(needle: &str, haystack: &[String]) -> bool {
    haystack.iter().any(|s| s == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_cases_every_element() {
        let input = vec!["fetchCycle".to_string(), "ipAddrs".to_string()];
        assert_eq!(snake_case_all(&input), vec!["fetch_cycle".to_string(), "ip_addrs".to_string()]);
    }

    #[test]
    fn string_in_slice_checks_membership() {
        let haystack = vec!["Int".to_string(), "Float".to_string()];
        assert!(string_in_slice("Int", &haystack));
        assert!(!string_in_slice("String", &haystack));
    }
}
