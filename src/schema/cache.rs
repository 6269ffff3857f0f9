//! Schema Cache
//!
//! Memoizes schema resolution per period key for the life of the process.
//! Entries are never evicted or replaced.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use taxcalc_core::PeriodKey;
use tracing::debug;

use super::{Schema, SchemaProvider, TypeMap};
use crate::error::SchemaResolutionError;

pub struct SchemaCache {
    provider: Arc<dyn SchemaProvider>,
    schemas: RwLock<HashMap<PeriodKey, Schema>>,
}

impl SchemaCache {
    pub fn new(provider: Arc<dyn SchemaProvider>) -> Self {
        Self {
            provider,
            schemas: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the schema for `key`, resolving it on first access.
    ///
    /// Resolution runs outside the lock, so racing first requests for the
    /// same key may both resolve; the first stored schema wins and is what
    /// every caller sees afterwards.
    pub fn schema(&self, key: &PeriodKey) -> Result<Schema, SchemaResolutionError> {
        if let Some(schema) = self.lookup(key) {
            debug!("Schema cache hit for {}", key);
            return Ok(schema);
        }

        debug!("Schema cache miss for {}, resolving", key);
        let resolved = self
            .provider
            .resolve(key)
            .map_err(|source| SchemaResolutionError::Unresolved {
                key: key.clone(),
                source,
            })?;

        // insert-only map, a poisoned lock still holds consistent entries
        let mut schemas = self.schemas.write().unwrap_or_else(PoisonError::into_inner);
        Ok(schemas.entry(key.clone()).or_insert(resolved).clone())
    }

    pub fn input_types(&self, key: &PeriodKey) -> Result<Arc<TypeMap>, SchemaResolutionError> {
        Ok(self.schema(key)?.inputs)
    }

    pub fn output_types(&self, key: &PeriodKey) -> Result<Arc<TypeMap>, SchemaResolutionError> {
        Ok(self.schema(key)?.outputs)
    }

    pub fn len(&self) -> usize {
        self.schemas.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &PeriodKey) -> Option<Schema> {
        let schemas = self.schemas.read().unwrap_or_else(PoisonError::into_inner);
        schemas.get(key).cloned()
    }
}
