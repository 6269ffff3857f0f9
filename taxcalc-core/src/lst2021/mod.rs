//! Wage-tax program for the 2021 calendar year.
//!
//! Monetary inputs and outputs are in cents, as in the official program
//! interface. The flow itself lives in [`program`].

mod program;
mod tables;

use rust_decimal::prelude::*;

use crate::calculator::{Calculator, OutputField, TaxResult, TaxState};
use crate::error::CalcError;
use crate::period::PeriodKey;
use crate::value::{FieldType, OutputClass, Value};

const INPUTS: &[(&str, FieldType)] = &[
    ("af", FieldType::Integer),
    ("AJAHR", FieldType::Integer),
    ("ALTER1", FieldType::Integer),
    ("ENTSCH", FieldType::Decimal),
    ("f", FieldType::Float),
    ("JFREIB", FieldType::Decimal),
    ("JHINZU", FieldType::Decimal),
    ("JRE4", FieldType::Decimal),
    ("JRE4ENT", FieldType::Decimal),
    ("JVBEZ", FieldType::Decimal),
    ("KRV", FieldType::Integer),
    ("KVZ", FieldType::Decimal),
    ("LZZ", FieldType::Integer),
    ("LZZFREIB", FieldType::Decimal),
    ("LZZHINZU", FieldType::Decimal),
    ("PKPV", FieldType::Decimal),
    ("PKV", FieldType::Integer),
    ("PVS", FieldType::Integer),
    ("PVZ", FieldType::Integer),
    ("R", FieldType::Integer),
    ("RE4", FieldType::Decimal),
    ("SONSTB", FieldType::Decimal),
    ("SONSTENT", FieldType::Decimal),
    ("STERBE", FieldType::Decimal),
    ("STKL", FieldType::Integer),
    ("VBEZ", FieldType::Decimal),
    ("VBEZM", FieldType::Decimal),
    ("VBEZS", FieldType::Decimal),
    ("VBS", FieldType::Decimal),
    ("VJAHR", FieldType::Integer),
    ("VKAPA", FieldType::Decimal),
    ("VMT", FieldType::Decimal),
    ("ZKF", FieldType::Decimal),
    ("ZMVB", FieldType::Integer),
];

const fn standard(name: &'static str) -> OutputField {
    OutputField { name, field_type: FieldType::Decimal, class: OutputClass::Standard }
}

const fn dba(name: &'static str) -> OutputField {
    OutputField { name, field_type: FieldType::Decimal, class: OutputClass::Dba }
}

const OUTPUTS: &[OutputField] = &[
    standard("BK"),
    standard("BKS"),
    standard("BKV"),
    standard("LSTLZZ"),
    standard("SOLZLZZ"),
    standard("SOLZS"),
    standard("SOLZV"),
    standard("STS"),
    standard("STV"),
    standard("VKVLZZ"),
    standard("VKVSONST"),
    dba("VFRB"),
    dba("VFRBS1"),
    dba("VFRBS2"),
    dba("WVFRB"),
    dba("WVFRBO"),
    dba("WVFRBM"),
];

/// Largest accepted monetary input magnitude, in cents.
const MAX_AMOUNT_CENTS: i64 = 1_000_000_000_000_000;

/// Largest accepted magnitude of the tax factor `f`.
const MAX_FACTOR: f64 = 1_000_000.0;

pub struct Lohnsteuer2021 {
    key: PeriodKey,
}

impl Lohnsteuer2021 {
    pub fn new() -> Self {
        Self { key: PeriodKey::new("Lohnsteuer2021") }
    }
}

impl Default for Lohnsteuer2021 {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator for Lohnsteuer2021 {
    fn key(&self) -> &PeriodKey {
        &self.key
    }

    fn inputs(&self) -> &'static [(&'static str, FieldType)] {
        INPUTS
    }

    fn outputs(&self) -> &'static [OutputField] {
        OUTPUTS
    }

    fn new_state(&self) -> Box<dyn TaxState> {
        Box::new(State2021::default())
    }
}

/// Program inputs, all zero by default.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Inputs {
    pub af: i32,
    pub ajahr: i32,
    pub alter1: i32,
    pub entsch: Decimal,
    pub f: f64,
    pub jfreib: Decimal,
    pub jhinzu: Decimal,
    pub jre4: Decimal,
    pub jre4ent: Decimal,
    pub jvbez: Decimal,
    pub krv: i32,
    pub kvz: Decimal,
    pub lzz: i32,
    pub lzzfreib: Decimal,
    pub lzzhinzu: Decimal,
    pub pkpv: Decimal,
    pub pkv: i32,
    pub pvs: i32,
    pub pvz: i32,
    pub r: i32,
    pub re4: Decimal,
    pub sonstb: Decimal,
    pub sonstent: Decimal,
    pub sterbe: Decimal,
    pub stkl: i32,
    pub vbez: Decimal,
    pub vbezm: Decimal,
    pub vbezs: Decimal,
    pub vbs: Decimal,
    pub vjahr: i32,
    pub vkapa: Decimal,
    pub vmt: Decimal,
    pub zkf: Decimal,
    pub zmvb: i32,
}

enum Slot<'a> {
    Decimal(&'a mut Decimal),
    Integer(&'a mut i32),
    Float(&'a mut f64),
}

impl Slot<'_> {
    fn field_type(&self) -> FieldType {
        match self {
            Slot::Decimal(_) => FieldType::Decimal,
            Slot::Integer(_) => FieldType::Integer,
            Slot::Float(_) => FieldType::Float,
        }
    }
}

impl Inputs {
    fn slot(&mut self, name: &str) -> Option<Slot<'_>> {
        let slot = match name {
            "af" => Slot::Integer(&mut self.af),
            "AJAHR" => Slot::Integer(&mut self.ajahr),
            "ALTER1" => Slot::Integer(&mut self.alter1),
            "ENTSCH" => Slot::Decimal(&mut self.entsch),
            "f" => Slot::Float(&mut self.f),
            "JFREIB" => Slot::Decimal(&mut self.jfreib),
            "JHINZU" => Slot::Decimal(&mut self.jhinzu),
            "JRE4" => Slot::Decimal(&mut self.jre4),
            "JRE4ENT" => Slot::Decimal(&mut self.jre4ent),
            "JVBEZ" => Slot::Decimal(&mut self.jvbez),
            "KRV" => Slot::Integer(&mut self.krv),
            "KVZ" => Slot::Decimal(&mut self.kvz),
            "LZZ" => Slot::Integer(&mut self.lzz),
            "LZZFREIB" => Slot::Decimal(&mut self.lzzfreib),
            "LZZHINZU" => Slot::Decimal(&mut self.lzzhinzu),
            "PKPV" => Slot::Decimal(&mut self.pkpv),
            "PKV" => Slot::Integer(&mut self.pkv),
            "PVS" => Slot::Integer(&mut self.pvs),
            "PVZ" => Slot::Integer(&mut self.pvz),
            "R" => Slot::Integer(&mut self.r),
            "RE4" => Slot::Decimal(&mut self.re4),
            "SONSTB" => Slot::Decimal(&mut self.sonstb),
            "SONSTENT" => Slot::Decimal(&mut self.sonstent),
            "STERBE" => Slot::Decimal(&mut self.sterbe),
            "STKL" => Slot::Integer(&mut self.stkl),
            "VBEZ" => Slot::Decimal(&mut self.vbez),
            "VBEZM" => Slot::Decimal(&mut self.vbezm),
            "VBEZS" => Slot::Decimal(&mut self.vbezs),
            "VBS" => Slot::Decimal(&mut self.vbs),
            "VJAHR" => Slot::Integer(&mut self.vjahr),
            "VKAPA" => Slot::Decimal(&mut self.vkapa),
            "VMT" => Slot::Decimal(&mut self.vmt),
            "ZKF" => Slot::Decimal(&mut self.zkf),
            "ZMVB" => Slot::Integer(&mut self.zmvb),
            _ => return None,
        };
        Some(slot)
    }
}

fn check_range(name: &str, value: &Value) -> Result<(), CalcError> {
    let in_range = match value {
        Value::Decimal(v) => v.abs() <= Decimal::from(MAX_AMOUNT_CENTS),
        Value::Integer(_) => true,
        Value::Float(v) => v.is_finite() && v.abs() <= MAX_FACTOR,
    };
    if in_range {
        Ok(())
    } else {
        Err(CalcError::OutOfRange(name.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
struct State2021 {
    inputs: Inputs,
}

impl TaxState for State2021 {
    fn set(&mut self, name: &str, value: Value) -> Result<(), CalcError> {
        check_range(name, &value)?;
        let slot = self
            .inputs
            .slot(name)
            .ok_or_else(|| CalcError::UnknownField(name.to_string()))?;
        match (slot, value) {
            (Slot::Decimal(target), Value::Decimal(v)) => *target = v,
            (Slot::Integer(target), Value::Integer(v)) => *target = v,
            (Slot::Float(target), Value::Float(v)) => *target = v,
            (slot, value) => {
                return Err(CalcError::Format {
                    name: name.to_string(),
                    expected: slot.field_type(),
                    actual: value.field_type(),
                })
            }
        }
        Ok(())
    }

    fn calculate(&self) -> Result<Box<dyn TaxResult>, CalcError> {
        let outputs = program::run(self.inputs.clone())?;
        Ok(Box::new(outputs))
    }
}

/// Program outputs, in cents.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Outputs {
    pub bk: Decimal,
    pub bks: Decimal,
    pub bkv: Decimal,
    pub lstlzz: Decimal,
    pub solzlzz: Decimal,
    pub solzs: Decimal,
    pub solzv: Decimal,
    pub sts: Decimal,
    pub stv: Decimal,
    pub vkvlzz: Decimal,
    pub vkvsonst: Decimal,
    pub vfrb: Decimal,
    pub vfrbs1: Decimal,
    pub vfrbs2: Decimal,
    pub wvfrb: Decimal,
    pub wvfrbo: Decimal,
    pub wvfrbm: Decimal,
}

impl Outputs {
    fn field(&self, name: &str) -> Option<Decimal> {
        let value = match name {
            "BK" => self.bk,
            "BKS" => self.bks,
            "BKV" => self.bkv,
            "LSTLZZ" => self.lstlzz,
            "SOLZLZZ" => self.solzlzz,
            "SOLZS" => self.solzs,
            "SOLZV" => self.solzv,
            "STS" => self.sts,
            "STV" => self.stv,
            "VKVLZZ" => self.vkvlzz,
            "VKVSONST" => self.vkvsonst,
            "VFRB" => self.vfrb,
            "VFRBS1" => self.vfrbs1,
            "VFRBS2" => self.vfrbs2,
            "WVFRB" => self.wvfrb,
            "WVFRBO" => self.wvfrbo,
            "WVFRBM" => self.wvfrbm,
            _ => return None,
        };
        Some(value)
    }

    fn wrong_accessor(&self, name: &str, requested: FieldType) -> CalcError {
        match self.field(name) {
            Some(_) => CalcError::Format {
                name: name.to_string(),
                expected: FieldType::Decimal,
                actual: requested,
            },
            None => CalcError::UnknownField(name.to_string()),
        }
    }
}

impl TaxResult for Outputs {
    fn get_decimal(&self, name: &str) -> Result<Decimal, CalcError> {
        self.field(name)
            .ok_or_else(|| CalcError::UnknownField(name.to_string()))
    }

    fn get_integer(&self, name: &str) -> Result<i32, CalcError> {
        Err(self.wrong_accessor(name, FieldType::Integer))
    }

    fn get_float(&self, name: &str) -> Result<f64, CalcError> {
        Err(self.wrong_accessor(name, FieldType::Float))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cents(v: i64) -> Value {
        Value::Decimal(Decimal::from(v))
    }

    fn annual(stkl: i32, re4: i64) -> Box<dyn TaxResult> {
        let calculator = Lohnsteuer2021::new();
        let mut state = calculator.new_state();
        state.set("LZZ", Value::Integer(1)).unwrap();
        state.set("STKL", Value::Integer(stkl)).unwrap();
        state.set("RE4", cents(re4)).unwrap();
        state.calculate().unwrap()
    }

    #[test]
    fn test_every_declared_input_is_settable_with_its_type() {
        let mut inputs = Inputs::default();
        for (name, field_type) in INPUTS {
            let slot = inputs.slot(name).expect("declared input has a slot");
            assert_eq!(slot.field_type(), *field_type, "type of {name}");
        }
        assert_eq!(INPUTS.len(), 34);
    }

    #[test]
    fn test_every_declared_output_is_readable() {
        let outputs = Outputs::default();
        for field in OUTPUTS {
            assert!(outputs.get_decimal(field.name).is_ok(), "{}", field.name);
        }
    }

    #[test]
    fn test_reference_case_annual_stkl1() {
        let result = annual(1, 12_345_678);
        assert_eq!(result.get_decimal("LSTLZZ").unwrap(), Decimal::from(3_740_500));
        // 5.5 % of 37405 EUR, not capped by the phase-in zone
        assert_eq!(result.get_decimal("SOLZLZZ").unwrap(), Decimal::from(205_727));
        assert_eq!(result.get_decimal("BK").unwrap(), Decimal::ZERO);
        assert_eq!(result.get_decimal("STS").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_income_below_basic_allowance_is_untaxed() {
        let result = annual(1, 1_000_000);
        assert_eq!(result.get_decimal("LSTLZZ").unwrap(), Decimal::ZERO);
        assert_eq!(result.get_decimal("SOLZLZZ").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_church_tax_base_follows_wage_tax() {
        let calculator = Lohnsteuer2021::new();
        let mut state = calculator.new_state();
        state.set("LZZ", Value::Integer(1)).unwrap();
        state.set("STKL", Value::Integer(1)).unwrap();
        state.set("RE4", cents(12_345_678)).unwrap();
        state.set("R", Value::Integer(1)).unwrap();
        let result = state.calculate().unwrap();
        assert_eq!(result.get_decimal("BK").unwrap(), Decimal::from(3_740_500));
    }

    #[test]
    fn test_monthly_period_scales_annual_tax() {
        let calculator = Lohnsteuer2021::new();
        let mut state = calculator.new_state();
        state.set("LZZ", Value::Integer(2)).unwrap();
        state.set("STKL", Value::Integer(1)).unwrap();
        state.set("RE4", cents(1_000_000)).unwrap();
        let monthly = state.calculate().unwrap().get_decimal("LSTLZZ").unwrap();

        let yearly = annual(1, 12_000_000).get_decimal("LSTLZZ").unwrap();
        assert_eq!(monthly, (yearly / Decimal::from(12)).trunc());
    }

    #[test]
    fn test_married_split_pays_less_than_single() {
        let single = annual(1, 8_000_000).get_decimal("LSTLZZ").unwrap();
        let split = annual(3, 8_000_000).get_decimal("LSTLZZ").unwrap();
        let class_five = annual(5, 8_000_000).get_decimal("LSTLZZ").unwrap();
        assert!(split < single);
        assert!(class_five > single);
    }

    #[test]
    fn test_calculation_is_deterministic() {
        let calculator = Lohnsteuer2021::new();
        let mut state = calculator.new_state();
        state.set("STKL", Value::Integer(4)).unwrap();
        state.set("RE4", cents(456_789)).unwrap();
        state.set("LZZ", Value::Integer(2)).unwrap();
        let first = state.calculate().unwrap().get_decimal("LSTLZZ").unwrap();
        let second = state.calculate().unwrap().get_decimal("LSTLZZ").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_set_rejects_wrong_type() {
        let mut state = Lohnsteuer2021::new().new_state();
        let err = state.set("STKL", cents(1)).unwrap_err();
        assert_eq!(
            err,
            CalcError::Format {
                name: "STKL".to_string(),
                expected: FieldType::Integer,
                actual: FieldType::Decimal,
            }
        );
        assert_eq!(
            state.set("NOPE", Value::Integer(1)).unwrap_err(),
            CalcError::UnknownField("NOPE".to_string())
        );
    }

    #[test]
    fn test_set_rejects_out_of_range_amounts() {
        let mut state = Lohnsteuer2021::new().new_state();
        let huge = Value::Decimal(Decimal::from(MAX_AMOUNT_CENTS) + Decimal::ONE);
        assert_eq!(
            state.set("RE4", huge).unwrap_err(),
            CalcError::OutOfRange("RE4".to_string())
        );
        assert!(state.set("f", Value::Float(f64::NAN)).is_err());
    }

    #[test]
    fn test_wrong_accessor_on_result() {
        let result = annual(1, 100);
        assert!(matches!(
            result.get_integer("LSTLZZ"),
            Err(CalcError::Format { expected: FieldType::Decimal, actual: FieldType::Integer, .. })
        ));
        assert_eq!(
            result.get_float("RE4").unwrap_err(),
            CalcError::UnknownField("RE4".to_string())
        );
    }
}
