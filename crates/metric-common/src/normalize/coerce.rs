use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Number, Value};

static SIGNED_INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?[0-9]+").expect("valid regex"));

/// Convert a loosely-typed count into an integer.
///
/// Numbers are truncated toward zero; strings yield their first signed integer
/// substring (`"7 (approx)"` → 7). Anything else, including booleans, is 0.
pub fn coerce_number(value: &Value) -> i64 {
    match value {
        Value::Number(n) => truncate_number(n),
        Value::String(s) => coerce_str(s),
        _ => 0,
    }
}

/// First signed integer in `s`, or 0 when there is none.
pub fn coerce_str(s: &str) -> i64 {
    SIGNED_INT_RE
        .find(s)
        .map(|m| parse_saturating(m.as_str()))
        .unwrap_or(0)
}

/// Whether `s` contains at least one ASCII digit.
pub fn has_digit(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit())
}

/// Parse an optionally-negative run of ASCII digits, clamping out-of-range values.
pub(crate) fn parse_saturating(digits: &str) -> i64 {
    match digits.parse::<i64>() {
        Ok(v) => v,
        Err(_) if digits.starts_with('-') => i64::MIN,
        Err(_) => i64::MAX,
    }
}

fn truncate_number(n: &Number) -> i64 {
    if let Some(i) = n.as_i64() {
        return i;
    }
    if n.as_u64().is_some() {
        return i64::MAX;
    }
    // `as` saturates at the i64 bounds.
    n.as_f64().map(|f| f.trunc() as i64).unwrap_or(0)
}
