//! Response Assembler

use serde::Serialize;

use super::coerce::InputRecord;
use super::extract::OutputRecord;

/// Identifies the producing service in every response.
pub const INFORMATION: &str = concat!("Created by ", env!("CARGO_PKG_NAME"));

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseDocument {
    pub year: String,
    pub information: String,
    pub inputs: Vec<InputRecord>,
    pub outputs: Vec<OutputRecord>,
}

/// `outputs` is `None` when the gate stayed closed and serializes as `[]`.
pub fn assemble(year: i32, inputs: Vec<InputRecord>, outputs: Option<Vec<OutputRecord>>) -> ResponseDocument {
    ResponseDocument {
        year: year.to_string(),
        information: INFORMATION.to_string(),
        inputs,
        outputs: outputs.unwrap_or_default(),
    }
}
