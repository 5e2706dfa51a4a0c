//! Lenient conversions applied to untrusted tracker fields.
//!
//! Tracker data is hand-edited JSON, so amounts show up as numbers, numeric
//! strings, booleans or garbage. Everything used in arithmetic goes through
//! [`to_number`], which never fails: anything that does not yield a finite
//! number counts as zero.

use serde_json::Value;

/// Converts a JSON value to a finite number, or zero.
pub fn to_number(value: Option<&Value>) -> f64 {
    let n = match value {
        None | Some(Value::Null) => 0.0,
        Some(Value::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Some(other) => textual_number(other),
    };

    if n.is_finite() {
        n
    } else {
        0.0
    }
}

/// Numeric value of a number, a string, or a list that renders as one.
///
/// A single-element list reads as its element's text and an empty list as
/// the empty string. Booleans and objects inside a list are not numeric.
fn textual_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_numeric(s),
        Value::Null => 0.0,
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [item] => textual_number(item),
            _ => f64::NAN,
        },
        Value::Bool(_) | Value::Object(_) => f64::NAN,
    }
}

/// Parses decimal, `0x`, `0o` and `0b` literals. Blank text is zero.
fn parse_numeric(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    let prefixed = trimmed.get(..2).map(str::to_ascii_lowercase);
    let radix = match prefixed.as_deref() {
        Some("0x") => 16,
        Some("0o") => 8,
        Some("0b") => 2,
        _ => return trimmed.parse::<f64>().unwrap_or(f64::NAN),
    };

    let digits = &trimmed[2..];
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0_f64, |acc, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

/// Loose truthiness: `false`, `0`, `""` and `null` are false, anything else
/// is true.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}
