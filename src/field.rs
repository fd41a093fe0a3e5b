//! Key-value pairs attached to log entries.
//!
//! Pairs keep insertion order and keys are never deduplicated; how a repeated
//! key is rendered is up to the backend.

use std::fmt;

use serde::Serialize;

/// A loosely typed field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Str(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
}

impl Value {
    /// Capture any `Display` value as a string.
    pub fn display(value: impl fmt::Display) -> Self {
        Value::Str(value.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::I64(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Str(v.clone())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::F64(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::F64(v)
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty, $($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v as $target)
                }
            }
        )*
    };
}

impl_from_int!(I64, i64, i8, i16, i32, i64, isize);
impl_from_int!(U64, u64, u8, u16, u32, u64, usize);

/// One key-value pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub key: String,
    pub value: Value,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Str(s) if s.is_empty() || s.contains(char::is_whitespace) => {
                write!(f, "{}={:?}", self.key, s)
            }
            v => write!(f, "{}={}", self.key, v),
        }
    }
}

/// Build a `Vec<Field>` from `key => value` pairs, in order.
///
/// ```
/// let fields = opslog::fields!["participant" => "alice", "remote" => true];
/// assert_eq!(fields.len(), 2);
/// assert_eq!(fields[0].key, "participant");
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        ::std::vec::Vec::<$crate::Field>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        ::std::vec![$($crate::Field::new($key, $value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(3i32), Value::I64(3));
        assert_eq!(Value::from(3usize), Value::U64(3));
        assert_eq!(Value::from("x"), Value::Str("x".into()));
        assert_eq!(Value::from(false), Value::Bool(false));
        assert_eq!(Value::display(std::net::Ipv4Addr::LOCALHOST), Value::Str("127.0.0.1".into()));
    }

    #[test]
    fn test_field_display_quotes_spaces() {
        assert_eq!(Field::new("k1", "v1").to_string(), "k1=v1");
        assert_eq!(Field::new("msg", "two words").to_string(), "msg=\"two words\"");
        assert_eq!(Field::new("empty", "").to_string(), "empty=\"\"");
        assert_eq!(Field::new("n", 7u8).to_string(), "n=7");
    }

    #[test]
    fn test_fields_macro_keeps_order_and_duplicates() {
        let fields = fields!["a" => 1, "b" => "two", "a" => 3];
        let keys: Vec<_> = fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, ["a", "b", "a"]);
        assert!(fields!().is_empty());
    }

    #[test]
    fn test_value_serializes_untagged() {
        let json = serde_json::to_string(&fields!["k" => "v", "n" => 2]).unwrap();
        assert_eq!(json, r#"[{"key":"k","value":"v"},{"key":"n","value":2}]"#);
    }
}
