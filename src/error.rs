//! Failure taxonomy of the translation pipeline.
//!
//! Per-field problems never show up here; they become `nok` input records.
//! Everything below aborts the request and reaches the caller as a single
//! [`RequestProcessingError`].

use taxcalc_core::{CalcError, FieldType, PeriodKey};
use thiserror::Error;

/// The period cannot be mapped to a schema.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaResolutionError {
    #[error("invalid period {year}/{month}")]
    InvalidPeriod {
        year: i32,
        month: u32,
        #[source]
        source: CalcError,
    },
    #[error("no schema for period '{key}'")]
    Unresolved {
        key: PeriodKey,
        #[source]
        source: CalcError,
    },
}

/// A value that passed the generic number check but does not fit the
/// field's native type.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("'{value}' is not a valid {expected} for input '{name}'")]
pub struct ConversionError {
    pub name: String,
    pub value: String,
    pub expected: FieldType,
}

/// Schema and engine disagree about an output field. Indicates a defect,
/// not bad input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("output '{name}' is declared as {declared} but the engine rejects that read")]
    Misaligned {
        name: String,
        declared: FieldType,
        #[source]
        source: CalcError,
    },
    #[error("output '{name}' holds {value}, which has no decimal form")]
    Unrepresentable { name: String, value: f64 },
}

#[derive(Error, Debug)]
pub enum FailureCause {
    #[error(transparent)]
    Schema(#[from] SchemaResolutionError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error("calculation engine failed: {0}")]
    Engine(#[from] CalcError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("request worker failed: {0}")]
    Dispatch(String),
}

/// The one failure kind callers of the pipeline observe.
#[derive(Error, Debug)]
#[error("request processing failed: {cause}")]
pub struct RequestProcessingError {
    #[source]
    pub cause: FailureCause,
}

impl From<FailureCause> for RequestProcessingError {
    fn from(cause: FailureCause) -> Self {
        Self { cause }
    }
}
