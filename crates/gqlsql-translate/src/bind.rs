//! Bind-value encoding (spec §6): the positional parameters a translation returns
//! alongside its SQL text. Homogeneous GraphQL list arguments (`in`, `contains`, ...) are
//! boxed as an "any-slice" marker that only decides its concrete Postgres array type —
//! `bigint[]`, `smallint[]`, `text[]` — once the runtime type of its first element is
//! known, the cleanest cross-language realisation of the Go original's `cast.To*` family
//! (spec §9 "Array bind encoding").

use ipnetwork::IpNetwork;

use crate::error::ValueCoercionError;

/// One positional bind value. `query` uses `$1..$N` placeholders (spec §6); `params` is
/// the corresponding vector of these, in the same left-to-right order.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Array(ArrayBind),
    Cidr(IpNetwork),
    /// The IP-family discriminator character bound by the `ip_family` operator: `'4'` or
    /// `'6'`, stripped from the `IPFamily` enum literal (`V4`/`V6`).
    IpFamily(char),
}

/// A homogeneous array bind, carrying the Postgres array type it must be encoded as.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayBind {
    pub sql_type: &'static str,
    pub values: Vec<serde_json::Value>,
}

/// The largest magnitude that still fits a Postgres `smallint` (`i16`), used to choose
/// between `smallint[]` and `bigint[]` for a homogeneous integer array.
const SMALLINT_MAX: i64 = i16::MAX as i64;
const SMALLINT_MIN: i64 = i16::MIN as i64;

/// Builds the "any-slice" wrapper for an `in`/`not_in`/`contains`/`contained_by`/`overlap`
/// value list, inspecting the first element's runtime type to pick the array's Postgres
/// type. An empty list or a non-homogeneous list is not fatal by construction — the Go
/// original does not special-case either, so we default an empty list to `text[]` and let
/// a genuinely mixed list fail on its first mismatched element.
pub fn any_slice(field: &str, operator: &str, values: &[serde_json::Value]) -> Result<ArrayBind, ValueCoercionError> {
    let Some(first) = values.first() else {
        return Ok(ArrayBind { sql_type: "text[]", values: Vec::new() });
    };
    let sql_type = match first {
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => {
            let in_range = values.iter().all(|v| matches!(v.as_i64(), Some(n) if (SMALLINT_MIN..=SMALLINT_MAX).contains(&n)));
            if in_range {
                "smallint[]"
            } else {
                "bigint[]"
            }
        }
        serde_json::Value::String(_) => "text[]",
        other => {
            return Err(ValueCoercionError {
                field: field.to_string(),
                operator: operator.to_string(),
                reason: format!("unsupported array element type: {other}"),
            })
        }
    };
    Ok(ArrayBind { sql_type, values: values.to_vec() })
}

/// Parses a CIDR literal for the `in_subnet` operator, matching the Go original's
/// `net.ParseCIDR` call.
pub fn parse_cidr(field: &str, value: &str) -> Result<IpNetwork, ValueCoercionError> {
    value.parse().map_err(|err| ValueCoercionError {
        field: field.to_string(),
        operator: "in_subnet".to_string(),
        reason: format!("not a valid CIDR network: {err}"),
    })
}

/// Strips the family discriminator off an `IPFamily` enum literal (`V4` -> `'4'`, `V6` ->
/// `'6'`) for the `ip_family` operator.
pub fn parse_ip_family(field: &str, value: &str) -> Result<char, ValueCoercionError> {
    value.strip_prefix('V').and_then(|s| s.chars().next()).filter(|c| *c == '4' || *c == '6').ok_or_else(|| {
        ValueCoercionError { field: field.to_string(), operator: "ip_family".to_string(), reason: format!("not an IPFamily literal: {value}") }
    })
}

impl From<&serde_json::Value> for BindValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => BindValue::Null,
            serde_json::Value::Bool(b) => BindValue::Bool(*b),
            serde_json::Value::Number(n) if n.is_i64() => BindValue::Int(n.as_i64().unwrap()),
            serde_json::Value::Number(n) => BindValue::Float(n.as_f64().unwrap_or_default()),
            serde_json::Value::String(s) => BindValue::Text(s.clone()),
            other => BindValue::Text(other.to_string()),
        }
    }
}

/// Encodes a rendered bind-value vector into a live `sqlx` Postgres argument list, the
/// hand-off point to the external database collaborator (spec §1 Non-goals: executing the
/// statement is out of scope, but handing its bind values to `sqlx` in the right wire shape
/// is the natural seam this crate owns).
pub fn encode_sqlx(params: &[BindValue]) -> Result<sqlx::postgres::PgArguments, sqlx::error::BoxDynError> {
    use sqlx::Arguments;
    let mut args = sqlx::postgres::PgArguments::default();
    for param in params {
        match param {
            BindValue::Null => args.add(Option::<i64>::None)?,
            BindValue::Bool(b) => args.add(*b)?,
            BindValue::Int(n) => args.add(*n)?,
            BindValue::Float(n) => args.add(*n)?,
            BindValue::Text(s) => args.add(s.clone())?,
            BindValue::Cidr(net) => args.add(*net)?,
            BindValue::IpFamily(c) => args.add(c.to_string())?,
            BindValue::Array(array) => match array.sql_type {
                "smallint[]" => args.add(array.values.iter().filter_map(|v| v.as_i64()).map(|n| n as i16).collect::<Vec<_>>())?,
                "bigint[]" => args.add(array.values.iter().filter_map(|v| v.as_i64()).collect::<Vec<_>>())?,
                _ => args.add(array.values.iter().filter_map(|v| v.as_str().map(str::to_string)).collect::<Vec<_>>())?,
            },
        }
    }
    Ok(args)
}
