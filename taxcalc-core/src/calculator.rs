//! Capability traits every period calculator implements.

use rust_decimal::Decimal;

use crate::error::CalcError;
use crate::period::PeriodKey;
use crate::value::{FieldType, OutputClass, Value};

/// Declaration of one output field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputField {
    pub name: &'static str,
    pub field_type: FieldType,
    pub class: OutputClass,
}

/// A calculation program for one period.
pub trait Calculator: Send + Sync {
    fn key(&self) -> &PeriodKey;

    /// Recognized inputs with their native types.
    fn inputs(&self) -> &'static [(&'static str, FieldType)];

    /// Recognized outputs with their native types and classification.
    fn outputs(&self) -> &'static [OutputField];

    /// Fresh state with every input at zero.
    fn new_state(&self) -> Box<dyn TaxState>;

    fn classify(&self, name: &str) -> Result<OutputClass, CalcError> {
        self.outputs()
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.class)
            .ok_or_else(|| CalcError::UnknownField(name.to_string()))
    }
}

/// Writable input state of one calculation.
pub trait TaxState: Send {
    /// Fails with [`CalcError::Format`] when `value` does not have the
    /// field's declared type.
    fn set(&mut self, name: &str, value: Value) -> Result<(), CalcError>;

    /// Runs the program against the current inputs. Repeated calls on the
    /// same state return identical results.
    fn calculate(&self) -> Result<Box<dyn TaxResult>, CalcError>;
}

/// Readable outputs of one calculation.
pub trait TaxResult: Send {
    fn get_decimal(&self, name: &str) -> Result<Decimal, CalcError>;
    fn get_integer(&self, name: &str) -> Result<i32, CalcError>;
    fn get_float(&self, name: &str) -> Result<f64, CalcError>;
}
