//! Pipeline properties against a mock engine covering every field type.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use tax_gateway::error::FailureCause;
use tax_gateway::schema::TypeMap;
use tax_gateway::translate::InputStatus;
use tax_gateway::{CalculationEngine, Schema, SchemaCache, SchemaProvider, Translator};
use taxcalc_core::{CalcError, FieldType, OutputClass, PeriodKey, TaxResult, TaxState, Value};

/// Schemas for "Lohnsteuer2030" only. Each resolution is slow and counted.
struct SlowProvider {
    calls: AtomicUsize,
}

impl SchemaProvider for SlowProvider {
    fn resolve(&self, key: &PeriodKey) -> Result<Schema, CalcError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(25));
        if key.as_str() != "Lohnsteuer2030" {
            return Err(CalcError::UnsupportedPeriod(key.clone()));
        }
        let inputs = TypeMap::from([
            ("AMOUNT".to_string(), FieldType::Decimal),
            ("COUNT".to_string(), FieldType::Integer),
            ("RATE".to_string(), FieldType::Float),
        ]);
        let outputs = TypeMap::from([
            ("TOTAL".to_string(), FieldType::Decimal),
            ("ITEMS".to_string(), FieldType::Integer),
            ("SHARE".to_string(), FieldType::Float),
        ]);
        Ok(Schema::new(inputs, outputs))
    }
}

/// TOTAL = AMOUNT * COUNT, ITEMS = COUNT, SHARE = RATE / 2.
struct ArithmeticEngine;

#[derive(Default)]
struct ArithmeticState {
    amount: Decimal,
    count: i32,
    rate: f64,
}

struct ArithmeticResult(HashMap<&'static str, Value>);

impl CalculationEngine for ArithmeticEngine {
    fn create_state(&self, _key: &PeriodKey) -> Result<Box<dyn TaxState>, CalcError> {
        Ok(Box::new(ArithmeticState::default()))
    }

    fn classify(&self, _key: &PeriodKey, name: &str) -> Result<OutputClass, CalcError> {
        Ok(if name == "SHARE" { OutputClass::Dba } else { OutputClass::Standard })
    }
}

impl TaxState for ArithmeticState {
    fn set(&mut self, name: &str, value: Value) -> Result<(), CalcError> {
        match (name, value) {
            ("AMOUNT", Value::Decimal(v)) => self.amount = v,
            ("COUNT", Value::Integer(v)) => self.count = v,
            ("RATE", Value::Float(v)) => self.rate = v,
            (name, value) => {
                return Err(CalcError::Format {
                    name: name.to_string(),
                    expected: FieldType::Decimal,
                    actual: value.field_type(),
                })
            }
        }
        Ok(())
    }

    fn calculate(&self) -> Result<Box<dyn TaxResult>, CalcError> {
        Ok(Box::new(ArithmeticResult(HashMap::from([
            ("TOTAL", Value::Decimal(self.amount * Decimal::from(self.count))),
            ("ITEMS", Value::Integer(self.count)),
            ("SHARE", Value::Float(self.rate / 2.0)),
        ]))))
    }
}

impl ArithmeticResult {
    fn value(&self, name: &str) -> Result<Value, CalcError> {
        self.0
            .get(name)
            .copied()
            .ok_or_else(|| CalcError::UnknownField(name.to_string()))
    }
}

impl TaxResult for ArithmeticResult {
    fn get_decimal(&self, name: &str) -> Result<Decimal, CalcError> {
        match self.value(name)? {
            Value::Decimal(v) => Ok(v),
            other => Err(CalcError::Format {
                name: name.to_string(),
                expected: other.field_type(),
                actual: FieldType::Decimal,
            }),
        }
    }

    fn get_integer(&self, name: &str) -> Result<i32, CalcError> {
        match self.value(name)? {
            Value::Integer(v) => Ok(v),
            other => Err(CalcError::Format {
                name: name.to_string(),
                expected: other.field_type(),
                actual: FieldType::Integer,
            }),
        }
    }

    fn get_float(&self, name: &str) -> Result<f64, CalcError> {
        match self.value(name)? {
            Value::Float(v) => Ok(v),
            other => Err(CalcError::Format {
                name: name.to_string(),
                expected: other.field_type(),
                actual: FieldType::Float,
            }),
        }
    }
}

fn setup() -> (Translator, Arc<SlowProvider>) {
    let provider = Arc::new(SlowProvider { calls: AtomicUsize::new(0) });
    let schemas = Arc::new(SchemaCache::new(provider.clone()));
    (Translator::new(schemas, Arc::new(ArithmeticEngine)), provider)
}

fn params(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(n, v)| (n.to_string(), v.to_string()))
        .collect()
}

#[test]
fn test_outputs_are_normalized_to_decimal() {
    let (translator, _) = setup();
    let doc = translator
        .translate(2030, 0, &params(&[("AMOUNT", "2.50"), ("COUNT", "4"), ("RATE", "0.5")]))
        .unwrap();

    let outputs: Vec<(&str, OutputClass, Decimal)> = doc
        .outputs
        .iter()
        .map(|o| (o.name.as_str(), o.class, o.value))
        .collect();
    assert_eq!(
        outputs,
        vec![
            ("ITEMS", OutputClass::Standard, Decimal::from(4)),
            ("SHARE", OutputClass::Dba, Decimal::new(25, 2)),
            ("TOTAL", OutputClass::Standard, Decimal::from(10)),
        ]
    );
}

#[test]
fn test_inputs_keep_request_order_and_length() {
    let (translator, _) = setup();
    let input = params(&[("RATE", "1"), ("AMOUNT", "x"), ("UNKNOWN", "1"), ("COUNT", "2")]);
    let doc = translator.translate(2030, 0, &input).unwrap();

    assert_eq!(doc.inputs.len(), input.len());
    for (record, (name, _)) in doc.inputs.iter().zip(&input) {
        assert_eq!(&record.name, name);
    }
    let statuses: Vec<InputStatus> = doc.inputs.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        [InputStatus::Ok, InputStatus::Nok, InputStatus::Nok, InputStatus::Ok]
    );
    assert!(doc.outputs.is_empty());
}

#[test]
fn test_empty_parameters_still_calculate() {
    let (translator, _) = setup();
    let doc = translator.translate(2030, 0, &[]).unwrap();
    assert!(doc.inputs.is_empty());
    assert_eq!(doc.outputs.len(), 3);
    assert!(doc.outputs.iter().all(|o| o.value.is_zero()));
}

#[test]
fn test_empty_value_is_nok_before_reaching_the_engine() {
    let (translator, _) = setup();
    let doc = translator.translate(2030, 0, &params(&[("COUNT", "")])).unwrap();
    assert_eq!(doc.inputs[0].status, InputStatus::Nok);
    assert!(doc.outputs.is_empty());
}

#[test]
fn test_identical_requests_give_identical_documents() {
    let (translator, _) = setup();
    let input = params(&[("AMOUNT", "1e2"), ("COUNT", "3"), ("RATE", "0.1")]);
    let first = translator.translate(2030, 0, &input).unwrap();
    let second = translator.translate(2030, 0, &input).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.inputs[0].value, Some(Decimal::from(100)));
}

#[test]
fn test_valid_decimal_failing_native_conversion_is_hard_error() {
    let (translator, _) = setup();
    for raw in ["1.5", "2e1"] {
        let err = translator
            .translate(2030, 0, &params(&[("COUNT", raw)]))
            .unwrap_err();
        assert!(matches!(err.cause, FailureCause::Conversion(_)), "{raw}");
    }
}

#[test]
fn test_unresolvable_period_is_hard_error() {
    let (translator, _) = setup();
    let err = translator.translate(2031, 0, &[]).unwrap_err();
    assert!(matches!(err.cause, FailureCause::Schema(_)));
    assert!(translator.schemas().is_empty());
}

#[test]
fn test_schema_is_resolved_once_per_period() {
    let (translator, provider) = setup();
    translator.translate(2030, 0, &[]).unwrap();
    translator.translate(2030, 5, &params(&[("COUNT", "1")])).unwrap();
    translator.translate(2030, 12, &params(&[("NOPE", "1")])).unwrap();
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert_eq!(translator.schemas().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_requests_agree() {
    let (translator, provider) = setup();
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let translator = translator.clone();
            tokio::spawn(async move {
                translator
                    .dispatch(2030, 0, params(&[("AMOUNT", "3"), ("COUNT", i.to_string().as_str())]))
                    .await
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let doc = handle.await.unwrap().unwrap();
        let total = doc.outputs.iter().find(|o| o.name == "TOTAL").unwrap();
        assert_eq!(total.value, Decimal::from(3 * i as i64));
    }

    let calls = provider.calls.load(Ordering::SeqCst);
    assert!(calls >= 1);
    translator.translate(2030, 0, &[]).unwrap();
    assert_eq!(provider.calls.load(Ordering::SeqCst), calls);
}
