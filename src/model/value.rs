//! Typed field values
//!
//! Every record field is one of four semantic types:
//! - string
//! - int: 64-bit signed integer
//! - float: 64-bit floating point
//! - list: list of strings
//!
//! Values cross two boundaries: the persisted JSON document and the
//! console's update grammar. Both convert through `FieldValue`.

use std::fmt;

use serde_json::Value;

use super::errors::{ModelError, ModelResult};

/// Declared type of a field in a kind's schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// UTF-8 string
    Str,
    /// 64-bit signed integer
    Int,
    /// 64-bit floating point
    Float,
    /// List of strings
    List,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Str => "string",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::List => "list",
        }
    }

    /// Returns the default value for a field of this type
    pub fn default_value(&self) -> FieldValue {
        match self {
            FieldType::Str => FieldValue::Str(String::new()),
            FieldType::Int => FieldValue::Int(0),
            FieldType::Float => FieldValue::Float(0.0),
            FieldType::List => FieldValue::List(Vec::new()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// A single field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(f64),
    List(Vec<String>),
}

impl FieldValue {
    /// Returns the type of this value
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Str(_) => FieldType::Str,
            FieldValue::Int(_) => FieldType::Int,
            FieldValue::Float(_) => FieldType::Float,
            FieldValue::List(_) => FieldType::List,
        }
    }

    /// Conforms this value to a declared field type.
    ///
    /// - ints widen into float fields
    /// - any scalar is stored as text in a string field
    /// - every other combination is rejected
    pub fn conform(self, field: &str, target: FieldType) -> ModelResult<FieldValue> {
        match (self, target) {
            (v @ FieldValue::Str(_), FieldType::Str) => Ok(v),
            (v @ FieldValue::Int(_), FieldType::Int) => Ok(v),
            (v @ FieldValue::Float(_), FieldType::Float) => Ok(v),
            (v @ FieldValue::List(_), FieldType::List) => Ok(v),
            (FieldValue::Int(i), FieldType::Float) => Ok(FieldValue::Float(i as f64)),
            (FieldValue::Int(i), FieldType::Str) => Ok(FieldValue::Str(i.to_string())),
            (FieldValue::Float(x), FieldType::Str) => Ok(FieldValue::Str(x.to_string())),
            (value, target) => Err(ModelError::InvalidFieldValue {
                field: field.to_string(),
                expected: target,
                actual: value.field_type(),
            }),
        }
    }

    /// Converts to a JSON value for persistence
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Str(s) => Value::String(s.clone()),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::Float(x) => Value::from(*x),
            FieldValue::List(items) => {
                Value::Array(items.iter().cloned().map(Value::String).collect())
            }
        }
    }

    /// Converts from a persisted JSON value.
    ///
    /// Booleans, nulls, objects, and non-string list items have no
    /// field representation and are rejected.
    pub fn from_json(field: &str, value: &Value) -> ModelResult<FieldValue> {
        match value {
            Value::String(s) => Ok(FieldValue::Str(s.clone())),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(FieldValue::Int(i))
                } else if let Some(x) = n.as_f64() {
                    Ok(FieldValue::Float(x))
                } else {
                    Err(ModelError::unrepresentable(field, value))
                }
            }
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.clone()),
                    _ => Err(ModelError::unrepresentable(field, value)),
                })
                .collect::<ModelResult<Vec<_>>>()
                .map(FieldValue::List),
            _ => Err(ModelError::unrepresentable(field, value)),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}

impl From<f64> for FieldValue {
    fn from(x: f64) -> Self {
        FieldValue::Float(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_per_type() {
        assert_eq!(FieldType::Str.default_value(), FieldValue::Str(String::new()));
        assert_eq!(FieldType::Int.default_value(), FieldValue::Int(0));
        assert_eq!(FieldType::Float.default_value(), FieldValue::Float(0.0));
        assert_eq!(FieldType::List.default_value(), FieldValue::List(vec![]));
    }

    #[test]
    fn test_int_widens_into_float() {
        let v = FieldValue::Int(3).conform("latitude", FieldType::Float).unwrap();
        assert_eq!(v, FieldValue::Float(3.0));
    }

    #[test]
    fn test_scalar_into_string_field() {
        let v = FieldValue::Int(42).conform("name", FieldType::Str).unwrap();
        assert_eq!(v, FieldValue::Str("42".into()));
    }

    #[test]
    fn test_string_into_int_field_rejected() {
        let err = FieldValue::from("abc")
            .conform("number_rooms", FieldType::Int)
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidFieldValue { .. }));
        assert_eq!(err.field(), "number_rooms");
    }

    #[test]
    fn test_float_into_int_field_rejected() {
        assert!(FieldValue::Float(2.5)
            .conform("max_guest", FieldType::Int)
            .is_err());
    }

    #[test]
    fn test_json_numbers_keep_int_float_distinction() {
        assert_eq!(FieldValue::from_json("n", &json!(3)).unwrap(), FieldValue::Int(3));
        assert_eq!(
            FieldValue::from_json("n", &json!(3.0)).unwrap(),
            FieldValue::Float(3.0)
        );
    }

    #[test]
    fn test_json_list_of_strings() {
        let v = FieldValue::from_json("amenity_ids", &json!(["wifi", "parking"])).unwrap();
        assert_eq!(v, FieldValue::List(vec!["wifi".into(), "parking".into()]));
        assert_eq!(v.to_json(), json!(["wifi", "parking"]));
    }

    #[test]
    fn test_json_unrepresentable_values() {
        assert!(FieldValue::from_json("flag", &json!(true)).is_err());
        assert!(FieldValue::from_json("nothing", &Value::Null).is_err());
        assert!(FieldValue::from_json("nested", &json!({"a": 1})).is_err());
        assert!(FieldValue::from_json("mixed", &json!(["a", 1])).is_err());
    }
}
