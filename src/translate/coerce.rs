//! Input Coercer
//!
//! First pass over the request parameters: every parameter is echoed back
//! as an [`InputRecord`] and checked only against the schema's names and a
//! generic decimal parse. The field's native type is not consulted here.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::schema::TypeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputStatus {
    Ok,
    Nok,
}

/// Echo of one request parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputRecord {
    pub name: String,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::arbitrary_precision_option::serialize"
    )]
    pub value: Option<Decimal>,
    pub status: InputStatus,
}

impl InputRecord {
    fn ok(name: &str, value: Decimal) -> Self {
        Self {
            name: name.to_string(),
            value: Some(value),
            status: InputStatus::Ok,
        }
    }

    fn nok(name: &str) -> Self {
        Self {
            name: name.to_string(),
            value: None,
            status: InputStatus::Nok,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == InputStatus::Ok
    }
}

/// One record per parameter, in parameter order.
pub fn coerce_inputs(input_types: &TypeMap, params: &[(String, String)]) -> Vec<InputRecord> {
    params
        .iter()
        .map(|(name, raw)| {
            if !input_types.contains_key(name) {
                return InputRecord::nok(name);
            }
            match parse_generic_decimal(raw) {
                Some(value) => InputRecord::ok(name, value),
                None => InputRecord::nok(name),
            }
        })
        .collect()
}

/// Parses a plain number literal: optional sign, digits with an optional
/// fraction, optional `e`/`E` exponent. Whitespace, digit separators and
/// named values (`NaN`, `inf`) are rejected, as are values outside the
/// range or precision of [`Decimal`].
pub fn parse_generic_decimal(raw: &str) -> Option<Decimal> {
    if !is_plain_literal(raw) {
        return None;
    }
    if raw.contains(['e', 'E']) {
        Decimal::from_scientific(raw).ok()
    } else {
        Decimal::from_str_exact(raw).ok()
    }
}

/// Only digits, `.`, exponent markers and signs that lead the number or
/// its exponent. Structure is left to the decimal parser.
fn is_plain_literal(raw: &str) -> bool {
    let bytes = raw.as_bytes();
    bytes.iter().enumerate().all(|(i, &b)| match b {
        b'0'..=b'9' | b'.' | b'e' | b'E' => true,
        b'+' | b'-' => i == 0 || matches!(bytes[i - 1], b'e' | b'E'),
        _ => false,
    })
}
