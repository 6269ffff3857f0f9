use thiserror::Error;

use crate::period::PeriodKey;
use crate::value::FieldType;

/// Failures raised by the calculation engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("month {0} is outside 0..=12")]
    InvalidMonth(u32),
    #[error("no calculator registered for period '{0}'")]
    UnsupportedPeriod(PeriodKey),
    #[error("unknown field '{0}'")]
    UnknownField(String),
    #[error("value for '{0}' is out of range")]
    OutOfRange(String),
    #[error("field '{name}' expects {expected} but got {actual}")]
    Format {
        name: String,
        expected: FieldType,
        actual: FieldType,
    },
}
