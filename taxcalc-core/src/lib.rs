//! Wage-tax calculation engine.
//!
//! Exposes the typed capability surface the gateway talks to:
//! - period keys selecting which program applies
//! - per-period input/output schemas
//! - writable calculation state and readable results
//! - output classification
//!
//! Calculators are registered in a [`CalculatorRegistry`]; the bundled
//! program is the 2021 wage-tax flow in [`lst2021`].

pub mod calculator;
pub mod error;
pub mod lst2021;
pub mod period;
pub mod registry;
pub mod value;

pub use calculator::{Calculator, OutputField, TaxResult, TaxState};
pub use error::CalcError;
pub use period::PeriodKey;
pub use registry::CalculatorRegistry;
pub use value::{FieldType, OutputClass, Value};

pub use rust_decimal::Decimal;
