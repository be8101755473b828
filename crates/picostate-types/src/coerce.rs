//! Reading plain values the loose way the built-in types expect.

use picostate::{Arg, PicostateError, Result};
use serde_json::Value;

/// String form of a value. `null` reads as the empty string.
pub fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric form of a value. `null` reads as zero; anything unparseable is NaN.
pub fn number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Whether a value counts as true.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// A plain number, kept integral when it is one.
pub fn from_f64(n: f64) -> Value {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

/// The plain value of the argument at `index`.
pub fn operand<'a>(transition: &str, args: &'a [Arg], index: usize) -> Result<&'a Value> {
    args.get(index)
        .and_then(Arg::value)
        .ok_or_else(|| PicostateError::InvalidArgument {
            transition: transition.to_owned(),
            reason: format!("expected a value at position {index}"),
        })
}
