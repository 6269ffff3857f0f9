use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CalcError;

/// Identifies which program (and therefore which schema) applies to a
/// calculation period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeriodKey(String);

impl PeriodKey {
    /// Derives the key for `year`/`month`. Month 0 means the whole year.
    ///
    /// Years whose program changed mid-year get a month-qualified key; every
    /// other period maps to the plain year key. Whether a calculator exists
    /// for the key is decided by the registry, not here.
    pub fn for_period(year: i32, month: u32) -> Result<Self, CalcError> {
        if month > 12 {
            return Err(CalcError::InvalidMonth(month));
        }
        let key = match (year, month) {
            (2015, 12) => "Lohnsteuer2015Dezember".to_string(),
            (2023, 7..=12) => "Lohnsteuer2023AbJuli".to_string(),
            _ => format!("Lohnsteuer{year}"),
        };
        Ok(Self(key))
    }

    /// Wraps an already derived key, e.g. one a calculator declares for itself.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
