//! Calculation engine facade.
//!
//! The pipeline only needs to create a zeroed state for a period and to
//! classify outputs; everything else goes through the state and result
//! traits of the engine crate.

use taxcalc_core::{CalcError, CalculatorRegistry, OutputClass, PeriodKey};

pub use taxcalc_core::{TaxResult, TaxState, Value};

pub trait CalculationEngine: Send + Sync {
    /// Fresh state for `key` with every input at its zero baseline.
    fn create_state(&self, key: &PeriodKey) -> Result<Box<dyn TaxState>, CalcError>;

    /// How clients should interpret the output `name`.
    fn classify(&self, key: &PeriodKey, name: &str) -> Result<OutputClass, CalcError>;
}

impl CalculationEngine for CalculatorRegistry {
    fn create_state(&self, key: &PeriodKey) -> Result<Box<dyn TaxState>, CalcError> {
        self.create(key)
    }

    fn classify(&self, key: &PeriodKey, name: &str) -> Result<OutputClass, CalcError> {
        CalculatorRegistry::classify(self, key, name)
    }
}
