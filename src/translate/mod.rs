//! Request translation pipeline.
//!
//! Period and raw parameters go in, a [`ResponseDocument`] comes out:
//! schema lookup, input coercion, the calculation gate, the engine run and
//! output extraction. Per-field problems stay inside the document as `nok`
//! records; everything else surfaces as one [`RequestProcessingError`].

mod assemble;
mod coerce;
mod extract;
mod gate;

pub use assemble::{assemble, ResponseDocument, INFORMATION};
pub use coerce::{coerce_inputs, parse_generic_decimal, InputRecord, InputStatus};
pub use extract::{extract_outputs, OutputRecord};
pub use gate::{all_valid, apply_inputs, to_native};

use std::sync::Arc;

use taxcalc_core::PeriodKey;
use tracing::{debug, warn};

use crate::engine::CalculationEngine;
use crate::error::{FailureCause, RequestProcessingError, SchemaResolutionError};
use crate::schema::SchemaCache;

/// Stateless apart from the shared schema cache; clones are cheap.
#[derive(Clone)]
pub struct Translator {
    schemas: Arc<SchemaCache>,
    engine: Arc<dyn CalculationEngine>,
}

impl Translator {
    pub fn new(schemas: Arc<SchemaCache>, engine: Arc<dyn CalculationEngine>) -> Self {
        Self { schemas, engine }
    }

    pub fn schemas(&self) -> &SchemaCache {
        &self.schemas
    }

    /// Runs the whole pipeline synchronously on the calling thread.
    pub fn translate(
        &self,
        year: i32,
        month: u32,
        params: &[(String, String)],
    ) -> Result<ResponseDocument, RequestProcessingError> {
        self.run(year, month, params).map_err(|cause| {
            warn!("Request for {}/{} failed: {}", year, month, cause);
            RequestProcessingError::from(cause)
        })
    }

    /// Runs [`Translator::translate`] as one unit on the blocking pool and
    /// resolves once with its result.
    pub async fn dispatch(
        &self,
        year: i32,
        month: u32,
        params: Vec<(String, String)>,
    ) -> Result<ResponseDocument, RequestProcessingError> {
        let translator = self.clone();
        tokio::task::spawn_blocking(move || translator.translate(year, month, &params))
            .await
            .map_err(|e| {
                warn!("Request worker for {}/{} did not complete: {}", year, month, e);
                RequestProcessingError::from(FailureCause::Dispatch(e.to_string()))
            })?
    }

    fn run(&self, year: i32, month: u32, params: &[(String, String)]) -> Result<ResponseDocument, FailureCause> {
        let key = PeriodKey::for_period(year, month)
            .map_err(|source| SchemaResolutionError::InvalidPeriod { year, month, source })?;
        let schema = self.schemas.schema(&key)?;

        let inputs = coerce_inputs(&schema.inputs, params);
        if !all_valid(&inputs) {
            return Ok(assemble(year, inputs, None));
        }

        let mut state = self.engine.create_state(&key)?;
        apply_inputs(state.as_mut(), &schema.inputs, params)?;
        let result = state.calculate()?;
        let outputs = extract_outputs(self.engine.as_ref(), &key, &schema.outputs, result.as_ref())?;
        debug!("Calculated {} outputs for {}", outputs.len(), key);

        Ok(assemble(year, inputs, Some(outputs)))
    }
}
