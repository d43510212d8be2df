//! In-memory [`ValueStore`] — for tests and runs without durable storage.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};

use simthings_domain::error::SimThingsError;
use simthings_domain::value::Value;

use crate::ports::ValueStore;

/// HashMap-backed value store. Values survive for the life of the process
/// only.
#[derive(Default)]
pub struct MemoryValueStore {
    values: Mutex<HashMap<String, Value>>,
}

impl MemoryValueStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronously insert a value, bypassing the async port. Handy for
    /// pre-seeding state in tests.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.lock().insert(key.into(), value);
    }

    /// Synchronously read a value back.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Value>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ValueStore for MemoryValueStore {
    fn load(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Value>, SimThingsError>> + Send {
        let value = self.get(key);
        async move { Ok(value) }
    }

    fn save(
        &self,
        key: &str,
        value: &Value,
    ) -> impl Future<Output = Result<(), SimThingsError>> + Send {
        self.insert(key, value.clone());
        async { Ok(()) }
    }
}
