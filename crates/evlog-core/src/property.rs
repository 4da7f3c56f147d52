//! Caller-supplied event properties
//!
//! Callers attach arbitrary values to an event; the store only keeps
//! strings. [`PropertyValue`] is the closed set of value shapes the write
//! path understands, and [`PropertyValue::coerce`] turns each one into its
//! stored form with a fixed precedence:
//!
//! | value          | stored as                  |
//! |----------------|----------------------------|
//! | string         | unchanged                  |
//! | integer        | decimal digits, full range of `i64` and `u64` |
//! | floating point | shortest decimal, e.g. `3.5`, `1.0` |
//! | boolean        | `true` / `false`           |
//! | anything else  | `nil`                      |

use std::collections::BTreeMap;

use crate::record::SENTINEL;

/// Stored property map; ordered so rendering is deterministic
pub type Properties = BTreeMap<String, String>;

/// A property value as supplied by the caller
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    String(String),
    Int(i64),
    /// Unsigned integer beyond the range of `i64`
    UInt(u64),
    Float(f64),
    Bool(bool),
    /// Any value without a string form (objects, lists, null)
    Other,
}

impl PropertyValue {
    /// Convert to the stored string form. Never fails.
    pub fn coerce(&self) -> String {
        match self {
            PropertyValue::String(s) => s.clone(),
            PropertyValue::Int(i) => i.to_string(),
            PropertyValue::UInt(u) => u.to_string(),
            PropertyValue::Float(f) => format_float(*f),
            PropertyValue::Bool(b) => b.to_string(),
            PropertyValue::Other => SENTINEL.to_string(),
        }
    }
}

// Integral floats keep a trailing ".0" so they stay distinguishable from integers.
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Coerce a caller property map into the stored form
pub fn coerce_properties<I, K, V>(properties: I) -> Properties
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<PropertyValue>,
{
    properties
        .into_iter()
        .map(|(key, value)| (key.into(), value.into().coerce()))
        .collect()
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::String(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::String(value.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Int(value.into())
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::Int(value.into())
    }
}

impl From<u64> for PropertyValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(PropertyValue::UInt(value), PropertyValue::Int)
    }
}

impl From<usize> for PropertyValue {
    fn from(value: usize) -> Self {
        (value as u64).into()
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        PropertyValue::Float(value.into())
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PropertyValue::Other, Into::into)
    }
}

impl From<serde_json::Value> for PropertyValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::String(s) => PropertyValue::String(s),
            Value::Bool(b) => PropertyValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    PropertyValue::Int(i)
                } else if let Some(u) = n.as_u64() {
                    PropertyValue::UInt(u)
                } else {
                    n.as_f64().map_or(PropertyValue::Other, PropertyValue::Float)
                }
            }
            Value::Null | Value::Array(_) | Value::Object(_) => PropertyValue::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coercion_precedence() {
        let props = coerce_properties([
            ("a", PropertyValue::from(1)),
            ("b", PropertyValue::from(true)),
            ("c", PropertyValue::from("x")),
            ("d", PropertyValue::from(3.5)),
            ("e", PropertyValue::from(json!({"nested": 1}))),
        ]);

        assert_eq!(props["a"], "1");
        assert_eq!(props["b"], "true");
        assert_eq!(props["c"], "x");
        assert_eq!(props["d"], "3.5");
        assert_eq!(props["e"], "nil");
    }

    #[test]
    fn test_float_formatting() {
        assert_eq!(PropertyValue::Float(1.0).coerce(), "1.0");
        assert_eq!(PropertyValue::Float(-0.25).coerce(), "-0.25");
        assert_eq!(PropertyValue::Float(f64::NAN).coerce(), "NaN");
    }

    #[test]
    fn test_json_values() {
        assert_eq!(PropertyValue::from(json!(42)), PropertyValue::Int(42));
        assert_eq!(PropertyValue::from(json!(2.5)), PropertyValue::Float(2.5));
        assert_eq!(PropertyValue::from(json!(false)), PropertyValue::Bool(false));
        assert_eq!(PropertyValue::from(json!(null)), PropertyValue::Other);
        assert_eq!(PropertyValue::from(json!([1, 2])), PropertyValue::Other);
    }

    #[test]
    fn test_large_unsigned_keeps_every_digit() {
        let max = PropertyValue::from(json!(18446744073709551615u64));
        assert_eq!(max, PropertyValue::UInt(u64::MAX));
        assert_eq!(max.coerce(), "18446744073709551615");
        assert_eq!(PropertyValue::from(json!(-7)).coerce(), "-7");
    }

    #[test]
    fn test_unsigned_and_f32_inputs() {
        assert_eq!(PropertyValue::from(u64::MAX).coerce(), "18446744073709551615");
        assert_eq!(PropertyValue::from(12u64), PropertyValue::Int(12));
        assert_eq!(PropertyValue::from(3usize).coerce(), "3");
        assert_eq!(PropertyValue::from(0.5f32).coerce(), "0.5");
    }

    #[test]
    fn test_missing_option_is_sentinel() {
        let none: Option<i64> = None;
        assert_eq!(PropertyValue::from(none).coerce(), "nil");
        assert_eq!(PropertyValue::from(Some(7)).coerce(), "7");
    }
}
