//! Per-period input and output schemas.

mod cache;

pub use cache::SchemaCache;

use std::collections::BTreeMap;
use std::sync::Arc;

use taxcalc_core::{CalcError, CalculatorRegistry, FieldType, PeriodKey};

/// Native representation a field requires.
pub type SemanticType = FieldType;

/// Field name to semantic type.
pub type TypeMap = BTreeMap<String, SemanticType>;

/// Recognized inputs and outputs of one period. Immutable once built; clones
/// share the underlying maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub inputs: Arc<TypeMap>,
    pub outputs: Arc<TypeMap>,
}

impl Schema {
    pub fn new(inputs: TypeMap, outputs: TypeMap) -> Self {
        Self {
            inputs: Arc::new(inputs),
            outputs: Arc::new(outputs),
        }
    }
}

/// Source of schemas. Results must be pure per key; resolution may be slow.
pub trait SchemaProvider: Send + Sync {
    fn resolve(&self, key: &PeriodKey) -> Result<Schema, CalcError>;
}

impl SchemaProvider for CalculatorRegistry {
    fn resolve(&self, key: &PeriodKey) -> Result<Schema, CalcError> {
        let inputs = self
            .input_types(key)?
            .into_iter()
            .map(|(name, field_type)| (name.to_string(), field_type))
            .collect();
        let outputs = self
            .output_types(key)?
            .into_iter()
            .map(|field| (field.name.to_string(), field.field_type))
            .collect();
        Ok(Schema::new(inputs, outputs))
    }
}
