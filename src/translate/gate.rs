//! Calculation Gate
//!
//! All-or-nothing: the engine runs only when every input record is `ok`.
//! Admitted values are then converted a second time, now to the native
//! type their field declares. That conversion is strict and a failure
//! aborts the request instead of becoming a `nok` record.

use taxcalc_core::{CalcError, FieldType, Value};
use tracing::debug;

use super::coerce::{parse_generic_decimal, InputRecord};
use crate::engine::TaxState;
use crate::error::{ConversionError, FailureCause};
use crate::schema::TypeMap;

/// True when the engine may run. Holds for an empty record list.
pub fn all_valid(records: &[InputRecord]) -> bool {
    let rejected = records.iter().filter(|record| !record.is_ok()).count();
    if rejected > 0 {
        debug!("Gate closed, {} of {} inputs rejected", rejected, records.len());
    }
    rejected == 0
}

/// Native value for one raw parameter. `None` means the field keeps its
/// zero baseline.
pub fn to_native(name: &str, raw: &str, field_type: FieldType) -> Result<Option<Value>, ConversionError> {
    if raw.is_empty() {
        return Ok(None);
    }

    let value = match field_type {
        FieldType::Decimal => parse_generic_decimal(raw).map(Value::Decimal),
        FieldType::Integer => raw.parse::<i32>().ok().map(Value::Integer),
        FieldType::Float => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Value::Float),
    };

    value.map(Some).ok_or_else(|| ConversionError {
        name: name.to_string(),
        value: raw.to_string(),
        expected: field_type,
    })
}

/// Writes every parameter into `state` with its native type.
pub fn apply_inputs(
    state: &mut dyn TaxState,
    input_types: &TypeMap,
    params: &[(String, String)],
) -> Result<(), FailureCause> {
    for (name, raw) in params {
        let field_type = *input_types
            .get(name)
            .ok_or_else(|| CalcError::UnknownField(name.clone()))?;
        if let Some(value) = to_native(name, raw, field_type)? {
            state.set(name, value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TaxResult;
    use crate::translate::coerce::coerce_inputs;
    use rust_decimal::Decimal;

    #[derive(Default)]
    struct RecordingState {
        set: Vec<(String, Value)>,
    }

    impl TaxState for RecordingState {
        fn set(&mut self, name: &str, value: Value) -> Result<(), CalcError> {
            if name == "STKL" && value.field_type() != FieldType::Integer {
                return Err(CalcError::Format {
                    name: name.to_string(),
                    expected: FieldType::Integer,
                    actual: value.field_type(),
                });
            }
            self.set.push((name.to_string(), value));
            Ok(())
        }

        fn calculate(&self) -> Result<Box<dyn TaxResult>, CalcError> {
            Err(CalcError::OutOfRange("unused".to_string()))
        }
    }

    fn schema() -> TypeMap {
        TypeMap::from([
            ("STKL".to_string(), FieldType::Integer),
            ("RE4".to_string(), FieldType::Decimal),
            ("f".to_string(), FieldType::Float),
        ])
    }

    fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_gate_opens_only_when_every_input_is_ok() {
        assert!(all_valid(&[]));
        let ok = coerce_inputs(&schema(), &params(&[("STKL", "1"), ("RE4", "5")]));
        assert!(all_valid(&ok));
        let mixed = coerce_inputs(&schema(), &params(&[("STKL", "1"), ("nope", "5")]));
        assert!(!all_valid(&mixed));
    }

    #[test]
    fn test_native_conversion_by_type() {
        assert_eq!(to_native("STKL", "3", FieldType::Integer).unwrap(), Some(Value::Integer(3)));
        assert_eq!(to_native("f", "0.75", FieldType::Float).unwrap(), Some(Value::Float(0.75)));
        assert_eq!(
            to_native("RE4", "1e2", FieldType::Decimal).unwrap(),
            Some(Value::Decimal(Decimal::from(100)))
        );
        assert_eq!(to_native("RE4", "", FieldType::Decimal).unwrap(), None);
    }

    #[test]
    fn test_valid_decimal_can_still_fail_native_conversion() {
        for raw in ["1.5", "1e3", "99999999999"] {
            let err = to_native("STKL", raw, FieldType::Integer).unwrap_err();
            assert_eq!(err.expected, FieldType::Integer);
            assert_eq!(err.value, raw);
        }
    }

    #[test]
    fn test_apply_sets_native_values_in_order() {
        let mut state = RecordingState::default();
        let input = params(&[("RE4", "12345678"), ("STKL", "1"), ("f", "")]);
        apply_inputs(&mut state, &schema(), &input).unwrap();
        assert_eq!(
            state.set,
            vec![
                ("RE4".to_string(), Value::Decimal(Decimal::from(12_345_678))),
                ("STKL".to_string(), Value::Integer(1)),
            ]
        );
    }

    #[test]
    fn test_apply_surfaces_hard_failures() {
        let mut state = RecordingState::default();
        let err = apply_inputs(&mut state, &schema(), &params(&[("STKL", "1.5")])).unwrap_err();
        assert!(matches!(err, FailureCause::Conversion(_)));

        let err = apply_inputs(&mut state, &schema(), &params(&[("XYZ", "1")])).unwrap_err();
        assert!(matches!(err, FailureCause::Engine(CalcError::UnknownField(_))));
    }

    #[test]
    fn test_apply_surfaces_engine_format_rejection() {
        let mut state = RecordingState::default();
        let schema = TypeMap::from([("STKL".to_string(), FieldType::Decimal)]);
        let err = apply_inputs(&mut state, &schema, &params(&[("STKL", "1")])).unwrap_err();
        assert!(matches!(err, FailureCause::Engine(CalcError::Format { .. })));
    }
}
