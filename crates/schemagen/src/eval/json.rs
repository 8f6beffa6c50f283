//! JSON value comparisons with numeric equality.

use serde_json::{Number, Value};
use std::cmp::Ordering;

/// Compare two numbers by value; `1` and `1.0` are equal.
pub fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return Some(a.cmp(&b));
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return Some(a.cmp(&b));
    }
    // One side is negative, the other beyond i64.
    match (a.as_i64(), b.as_u64()) {
        (Some(_), Some(_)) => return Some(Ordering::Less),
        _ => {}
    }
    match (a.as_u64(), b.as_i64()) {
        (Some(_), Some(_)) => return Some(Ordering::Greater),
        _ => {}
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

/// Structural equality where numbers compare by value.
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b) == Some(Ordering::Equal),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(a, b)| json_equal(a, b))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|(key, value)| b.get(key).is_some_and(|other| json_equal(value, other)))
        }
        _ => a == b,
    }
}

/// Whether `value` is a multiple of `divisor`. A zero divisor only accepts
/// zero.
pub fn is_multiple_of(value: &Number, divisor: &Number) -> bool {
    if let (Some(value), Some(divisor)) = (value.as_i64(), divisor.as_i64()) {
        if divisor == 0 {
            return value == 0;
        }
        return value.checked_rem(divisor).unwrap_or(0) == 0;
    }
    let (Some(value), Some(divisor)) = (value.as_f64(), divisor.as_f64()) else {
        return false;
    };
    if divisor == 0.0 {
        return value == 0.0;
    }
    let quotient = value / divisor;
    (quotient - quotient.round()).abs() < 1e-9
}
