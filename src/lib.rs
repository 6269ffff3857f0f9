//! Tax Gateway
//!
//! Translates free-form HTTP query parameters into typed calls against the
//! wage-tax engine and flattens the results into a response document:
//! - period-keyed schema cache
//! - input echo with per-field `ok`/`nok` status
//! - all-or-nothing calculation gate
//! - classified output extraction
//! - one uniform failure kind at the request boundary

pub mod config;
pub mod engine;
pub mod error;
pub mod schema;
pub mod server;
pub mod telemetry;
pub mod translate;

pub use config::GatewayConfig;
pub use engine::CalculationEngine;
pub use error::{FailureCause, RequestProcessingError};
pub use schema::{Schema, SchemaCache, SchemaProvider};
pub use translate::{ResponseDocument, Translator};
