//! Scalar value helpers shared by resolution, cataloging, and evaluation.

use serde_json::Value;

/// Values treated as `true` by boolean-like coercion.
const TRUE_LIKE: [&str; 3] = ["yes", "true", "1"];

/// Values treated as `false` by boolean-like coercion.
const FALSE_LIKE: [&str; 4] = ["no", "false", "0", ""];

/// Returns true if the value is a scalar.
///
/// Null, arrays, and objects are not scalars; only scalars participate in
/// field resolution and value comparisons.
#[must_use]
pub const fn is_scalar(value: &Value) -> bool {
    matches!(
        value,
        Value::String(_) | Value::Number(_) | Value::Bool(_)
    )
}

/// Renders a scalar JSON value as a string.
///
/// Returns `None` for null, arrays, and objects. Booleans render as
/// `true` / `false`, numbers in their JSON notation.
#[must_use]
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Coerces a string into a boolean-like value.
///
/// Upstream automations report booleans as strings (`"yes"`, `"no"`,
/// `"1"`, ...). Comparison against boolean literals in the query DSL goes
/// through this coercion, so `isfire == true` matches `"yes"` rows.
///
/// Returns `None` when the string is neither true-like nor false-like.
#[must_use]
pub fn bool_like(s: &str) -> Option<bool> {
    let v = s.trim().to_lowercase();
    if TRUE_LIKE.contains(&v.as_str()) {
        return Some(true);
    }
    if FALSE_LIKE.contains(&v.as_str()) {
        return Some(false);
    }
    None
}
