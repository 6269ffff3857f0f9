use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Native representation a field requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Decimal,
    Integer,
    Float,
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Decimal => "decimal",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
        };
        f.write_str(name)
    }
}

/// A typed field value as accepted by [`crate::TaxState::set`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Decimal(Decimal),
    Integer(i32),
    Float(f64),
}

impl Value {
    pub fn field_type(&self) -> FieldType {
        match self {
            Value::Decimal(_) => FieldType::Decimal,
            Value::Integer(_) => FieldType::Integer,
            Value::Float(_) => FieldType::Float,
        }
    }
}

/// How a client should interpret an output field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputClass {
    /// Regular wage-tax result.
    Standard,
    /// Reporting value for double-taxation agreements.
    Dba,
}
