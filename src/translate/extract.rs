//! Output Extractor
//!
//! Reads every output the schema declares, using the accessor that matches
//! its declared type, and normalizes the value to a decimal.

use rust_decimal::Decimal;
use serde::Serialize;
use taxcalc_core::{CalcError, FieldType, OutputClass, PeriodKey};

use crate::engine::{CalculationEngine, TaxResult};
use crate::error::{ExtractionError, FailureCause};
use crate::schema::TypeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub class: OutputClass,
    #[serde(serialize_with = "rust_decimal::serde::arbitrary_precision::serialize")]
    pub value: Decimal,
}

/// One record per declared output, in schema order.
pub fn extract_outputs(
    engine: &dyn CalculationEngine,
    key: &PeriodKey,
    output_types: &TypeMap,
    result: &dyn TaxResult,
) -> Result<Vec<OutputRecord>, FailureCause> {
    output_types
        .iter()
        .map(|(name, field_type)| -> Result<OutputRecord, FailureCause> {
            let value = read_decimal(result, name, *field_type)?;
            let class = engine.classify(key, name)?;
            Ok(OutputRecord {
                name: name.clone(),
                class,
                value,
            })
        })
        .collect()
}

fn read_decimal(result: &dyn TaxResult, name: &str, declared: FieldType) -> Result<Decimal, ExtractionError> {
    let misaligned = |source: CalcError| ExtractionError::Misaligned {
        name: name.to_string(),
        declared,
        source,
    };

    match declared {
        FieldType::Decimal => result.get_decimal(name).map_err(misaligned),
        FieldType::Integer => result.get_integer(name).map(Decimal::from).map_err(misaligned),
        FieldType::Float => {
            let value = result.get_float(name).map_err(misaligned)?;
            Decimal::from_f64_retain(value).ok_or_else(|| ExtractionError::Unrepresentable {
                name: name.to_string(),
                value,
            })
        }
    }
}
