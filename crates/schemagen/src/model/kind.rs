//! JSON value kinds as named by the `type` keyword.

use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// A primitive JSON Schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonKind {
    Null,
    Boolean,
    Integer,
    Number,
    String,
    Array,
    Object,
}

impl JsonKind {
    pub const ALL: [JsonKind; 7] = [
        JsonKind::Null,
        JsonKind::Boolean,
        JsonKind::Integer,
        JsonKind::Number,
        JsonKind::String,
        JsonKind::Array,
        JsonKind::Object,
    ];

    /// Parse a `type` keyword value.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "null" => JsonKind::Null,
            "boolean" => JsonKind::Boolean,
            "integer" => JsonKind::Integer,
            "number" => JsonKind::Number,
            "string" => JsonKind::String,
            "array" => JsonKind::Array,
            "object" => JsonKind::Object,
            _ => return None,
        })
    }

    pub fn keyword(self) -> &'static str {
        match self {
            JsonKind::Null => "null",
            JsonKind::Boolean => "boolean",
            JsonKind::Integer => "integer",
            JsonKind::Number => "number",
            JsonKind::String => "string",
            JsonKind::Array => "array",
            JsonKind::Object => "object",
        }
    }

    /// The most specific kind of a value. Numbers without a fractional
    /// representation are integers.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => JsonKind::Null,
            Value::Bool(_) => JsonKind::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => JsonKind::Integer,
            Value::Number(_) => JsonKind::Number,
            Value::String(_) => JsonKind::String,
            Value::Array(_) => JsonKind::Array,
            Value::Object(_) => JsonKind::Object,
        }
    }

    /// Whether a value satisfies this type. `number` also accepts integers.
    pub fn accepts(self, value: &Value) -> bool {
        self.includes(Self::of(value))
    }

    /// Whether every value of kind `other` is also of this kind.
    pub fn includes(self, other: JsonKind) -> bool {
        other == self || (self == JsonKind::Number && other == JsonKind::Integer)
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_accepts_integers() {
        assert!(JsonKind::Number.accepts(&json!(3)));
        assert!(JsonKind::Number.accepts(&json!(3.5)));
        assert!(!JsonKind::Integer.accepts(&json!(3.5)));
        assert_eq!(JsonKind::of(&json!(-7)), JsonKind::Integer);
    }

    #[test]
    fn keyword_round_trip() {
        for kind in JsonKind::ALL {
            assert_eq!(JsonKind::from_keyword(kind.keyword()), Some(kind));
        }
        assert_eq!(JsonKind::from_keyword("date"), None);
    }
}
