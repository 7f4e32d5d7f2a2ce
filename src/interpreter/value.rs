//! Runtime values and their coercions.

use crate::ast::format_number;
use serde_json::{Map, Number};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    /// Insertion-ordered properties.
    Object(Vec<(String, Value)>),
}

impl Value {
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Null => 0.0,
            Value::Boolean(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            Value::Array(items) if items.is_empty() => 0.0,
            Value::Array(items) if items.len() == 1 => {
                Value::String(items[0].to_display_string()).to_number()
            }
            Value::Undefined | Value::Array(_) | Value::Object(_) => f64::NAN,
        }
    }

    /// String conversion used by `+` concatenation.
    #[must_use]
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Undefined | Value::Null => String::new(),
                    other => other.to_display_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
        }
    }

    /// Whether `+` on this value concatenates rather than adds.
    fn is_stringish(&self) -> bool {
        matches!(self, Value::String(_) | Value::Array(_) | Value::Object(_))
    }

    #[must_use]
    pub fn add(&self, other: &Value) -> Value {
        if self.is_stringish() || other.is_stringish() {
            Value::String(self.to_display_string() + &other.to_display_string())
        } else {
            Value::Number(self.to_number() + other.to_number())
        }
    }

    #[must_use]
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            _ => self == other,
        }
    }

    /// Relational comparison; `None` when either side is NaN.
    #[must_use]
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => self.to_number().partial_cmp(&other.to_number()),
        }
    }

    /// JSON form: undefined becomes null at the top level and in arrays and
    /// is dropped from objects; integral numbers stay integers.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Undefined | Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => json_number(*n),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(props) => {
                let mut map = Map::new();
                for (key, value) in props {
                    if !value.is_undefined() {
                        map.insert(key.clone(), value.to_json());
                    }
                }
                serde_json::Value::Object(map)
            }
        }
    }

    /// Debug rendering used when echoing results.
    #[must_use]
    pub fn inspect(&self) -> String {
        match self {
            Value::String(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Value::Array(items) if items.is_empty() => "[]".to_string(),
            Value::Array(items) => {
                let items: Vec<String> = items.iter().map(Value::inspect).collect();
                format!("[ {} ]", items.join(", "))
            }
            Value::Object(props) if props.is_empty() => "{}".to_string(),
            Value::Object(props) => {
                let props: Vec<String> = props
                    .iter()
                    .map(|(key, value)| format!("{}: {}", inspect_key(key), value.inspect()))
                    .collect();
                format!("{{ {} }}", props.join(", "))
            }
            other => other.to_display_string(),
        }
    }
}

fn json_number(n: f64) -> serde_json::Value {
    if n.is_finite() && n == n.trunc() && n.abs() < 9_007_199_254_740_992.0 {
        #[allow(clippy::cast_possible_truncation)]
        let whole = n as i64;
        serde_json::Value::Number(Number::from(whole))
    } else {
        Number::from_f64(n).map_or(serde_json::Value::Null, serde_json::Value::Number)
    }
}

fn inspect_key(key: &str) -> String {
    let mut chars = key.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if plain { key.to_string() } else { format!("'{key}'") }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_addition_coerces_to_string() {
        let sum = Value::String("n=".into()).add(&Value::Number(2.0));
        assert_eq!(sum, Value::String("n=2".into()));
        assert_eq!(Value::Boolean(true).add(&Value::Number(1.0)), Value::Number(2.0));
        assert!(Value::Null.add(&Value::Undefined).to_number().is_nan());
    }

    #[test]
    fn test_inspect() {
        let value = Value::Object(vec![
            ("a".into(), Value::Number(1.0)),
            ("b c".into(), Value::Array(vec![Value::String("x".into()), Value::Null])),
        ]);
        assert_eq!(value.inspect(), "{ a: 1, 'b c': [ 'x', null ] }");
        assert_eq!(Value::Array(vec![]).inspect(), "[]");
        assert_eq!(Value::Undefined.inspect(), "undefined");
    }

    #[test]
    fn test_json_conversion() {
        let value = Value::Object(vec![
            ("n".into(), Value::Number(3.0)),
            ("half".into(), Value::Number(0.5)),
            ("gone".into(), Value::Undefined),
            ("list".into(), Value::Array(vec![Value::Undefined])),
        ]);
        assert_eq!(
            serde_json::to_string(&value.to_json()).unwrap(),
            r#"{"n":3,"half":0.5,"list":[null]}"#
        );
        assert_eq!(Value::Number(f64::NAN).to_json(), serde_json::Value::Null);
    }

    #[test]
    fn test_compare() {
        assert_eq!(
            Value::String("a".into()).compare(&Value::String("b".into())),
            Some(Ordering::Less)
        );
        assert_eq!(Value::Number(2.0).compare(&Value::String("10".into())), Some(Ordering::Less));
        assert_eq!(Value::Undefined.compare(&Value::Number(1.0)), None);
    }

    #[test]
    fn test_number_conversion() {
        assert_eq!(Value::String(" 42 ".into()).to_number(), 42.0);
        assert_eq!(Value::String(String::new()).to_number(), 0.0);
        assert!(Value::String("4x".into()).to_number().is_nan());
        assert_eq!(Value::Array(vec![Value::Number(7.0)]).to_number(), 7.0);
    }
}
