//! Period-keyed lookup of calculators.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::calculator::{Calculator, OutputField, TaxState};
use crate::error::CalcError;
use crate::lst2021::Lohnsteuer2021;
use crate::period::PeriodKey;
use crate::value::{FieldType, OutputClass};

#[derive(Default, Clone)]
pub struct CalculatorRegistry {
    calculators: HashMap<PeriodKey, Arc<dyn Calculator>>,
}

impl CalculatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every bundled calculator. Only the 2021 program ships.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(Lohnsteuer2021::new()));
        registry
    }

    pub fn register(&mut self, calculator: Arc<dyn Calculator>) {
        debug!("Registering calculator for {}", calculator.key());
        self.calculators.insert(calculator.key().clone(), calculator);
    }

    pub fn get(&self, key: &PeriodKey) -> Result<&Arc<dyn Calculator>, CalcError> {
        self.calculators
            .get(key)
            .ok_or_else(|| CalcError::UnsupportedPeriod(key.clone()))
    }

    pub fn input_types(&self, key: &PeriodKey) -> Result<Vec<(&'static str, FieldType)>, CalcError> {
        Ok(self.get(key)?.inputs().to_vec())
    }

    pub fn output_types(&self, key: &PeriodKey) -> Result<Vec<OutputField>, CalcError> {
        Ok(self.get(key)?.outputs().to_vec())
    }

    pub fn create(&self, key: &PeriodKey) -> Result<Box<dyn TaxState>, CalcError> {
        Ok(self.get(key)?.new_state())
    }

    pub fn classify(&self, key: &PeriodKey, name: &str) -> Result<OutputClass, CalcError> {
        self.get(key)?.classify(name)
    }

    pub fn supported_periods(&self) -> Vec<PeriodKey> {
        let mut keys: Vec<PeriodKey> = self.calculators.keys().cloned().collect();
        keys.sort();
        keys
    }
}
