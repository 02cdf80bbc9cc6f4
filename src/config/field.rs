//! Field schema, typed values and resolution provenance.

use crate::error::{AppError, AppResult};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Source that supplied a field's resolved value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Specifier {
    /// Default value, or an optional field that nothing specified.
    #[serde(rename = "none")]
    None,
    #[serde(rename = "environment-var")]
    EnvironmentVar,
    #[serde(rename = "command-line")]
    CommandLine,
    #[serde(rename = "config-file")]
    File,
}

impl Specifier {
    pub fn as_str(self) -> &'static str {
        match self {
            Specifier::None => "none",
            Specifier::EnvironmentVar => "environment-var",
            Specifier::CommandLine => "command-line",
            Specifier::File => "config-file",
        }
    }
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Datatype of a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueType {
    Integer,
    UnsignedInteger,
    Float,
    Boolean,
    String,
}

impl ValueType {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueType::Integer => "integer",
            ValueType::UnsignedInteger => "unsigned-integer",
            ValueType::Float => "float",
            ValueType::Boolean => "boolean",
            ValueType::String => "string",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed scalar configuration value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i32),
    UnsignedInteger(u32),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Integer(_) => ValueType::Integer,
            Value::UnsignedInteger(_) => ValueType::UnsignedInteger,
            Value::Float(_) => ValueType::Float,
            Value::Boolean(_) => ValueType::Boolean,
            Value::String(_) => ValueType::String,
        }
    }

    /// Coerce a raw string into a value of `value_type`.
    ///
    /// Strings are trimmed; booleans accept `1 t T TRUE true True` and
    /// `0 f F FALSE false False`.
    pub fn parse(value_type: ValueType, raw: &str) -> Result<Self, String> {
        match value_type {
            ValueType::Integer => raw
                .parse::<i32>()
                .map(Value::Integer)
                .map_err(|e| e.to_string()),
            ValueType::UnsignedInteger => raw
                .parse::<u32>()
                .map(Value::UnsignedInteger)
                .map_err(|e| e.to_string()),
            ValueType::Float => raw
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| e.to_string()),
            ValueType::Boolean => parse_bool(raw).map(Value::Boolean),
            ValueType::String => Ok(Value::String(raw.trim().to_string())),
        }
    }
}

impl fmt::Display for Value {
    /// Canonical string form; parsing it back with [`Value::parse`] yields the same value.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(n) => write!(f, "{}", n),
            Value::UnsignedInteger(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::String(s) => f.write_str(s),
        }
    }
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("invalid boolean literal '{}'", raw)),
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for u32 {}
    impl Sealed for f64 {}
    impl Sealed for bool {}
    impl Sealed for String {}
}

/// Rust types a field can be declared with.
pub trait FieldType: sealed::Sealed + Sized {
    const VALUE_TYPE: ValueType;

    fn into_value(self) -> Value;

    fn from_value(value: &Value) -> Option<Self>;
}

impl FieldType for i32 {
    const VALUE_TYPE: ValueType = ValueType::Integer;

    fn into_value(self) -> Value {
        Value::Integer(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl FieldType for u32 {
    const VALUE_TYPE: ValueType = ValueType::UnsignedInteger;

    fn into_value(self) -> Value {
        Value::UnsignedInteger(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::UnsignedInteger(n) => Some(*n),
            _ => None,
        }
    }
}

impl FieldType for f64 {
    const VALUE_TYPE: ValueType = ValueType::Float;

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }
}

impl FieldType for bool {
    const VALUE_TYPE: ValueType = ValueType::Boolean;

    fn into_value(self) -> Value {
        Value::Boolean(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl FieldType for String {
    const VALUE_TYPE: ValueType = ValueType::String;

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Schema for one configurable value.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    /// Command line flag without the leading dash.
    pub arg_name: Option<String>,
    pub env_var: Option<String>,
    pub config_section: Option<String>,
    pub config_key: Option<String>,
    /// Ignored when `required` is set.
    pub default_value: Option<Value>,
    pub required: bool,
    pub value_type: ValueType,
    pub short_description: String,
    pub long_description: String,
}

/// Resolved value of a field together with the source that supplied it.
#[derive(Debug, Clone)]
pub struct ResolvedValue {
    /// `None` for an optional field with no value and no default.
    pub value: Option<Value>,
    pub specifier: Specifier,
    pub field: Arc<Field>,
}

impl ResolvedValue {
    /// Coerce `raw` into the field's declared type.
    pub fn coerce(field: &Arc<Field>, raw: &str, specifier: Specifier) -> AppResult<Self> {
        let value = Value::parse(field.value_type, raw).map_err(|reason| {
            AppError::internal("error formatting configuration field")
                .with_cause(reason)
                .with_str("fieldName", field.name.as_str())
                .with_str("rawValue", raw)
                .with_str("specifier", specifier.as_str())
        })?;
        Ok(Self {
            value: Some(value),
            specifier,
            field: Arc::clone(field),
        })
    }

    /// An optional field that nothing specified.
    pub fn unset(field: &Arc<Field>) -> Self {
        Self {
            value: None,
            specifier: Specifier::None,
            field: Arc::clone(field),
        }
    }
}
