//! Per-property state cell.

use std::sync::{Mutex, PoisonError};

use simthings_domain::property::PropertyDescriptor;
use simthings_domain::value::Value;

/// Holds one property's current value next to its immutable descriptor.
///
/// The cell owns type coercion and the in-memory commit; persistence,
/// change notification, and coupled updates are orchestrated by the owning
/// device. The invariant is that the stored value always satisfies the
/// descriptor's declared type.
pub struct PropertyCell {
    descriptor: PropertyDescriptor,
    value: Mutex<Value>,
    storage_key: Option<String>,
}

impl PropertyCell {
    pub(crate) fn new(
        descriptor: PropertyDescriptor,
        initial: Value,
        storage_key: Option<String>,
    ) -> Self {
        let initial = initial.coerce(descriptor.kind);
        Self {
            descriptor,
            value: Mutex::new(initial),
            storage_key,
        }
    }

    /// Current value. Always succeeds.
    #[must_use]
    pub fn read(&self) -> Value {
        self.lock().clone()
    }

    /// Descriptor metadata.
    #[must_use]
    pub fn descriptor(&self) -> &PropertyDescriptor {
        &self.descriptor
    }

    /// Persistence key, when the adapter persists this property.
    pub(crate) fn storage_key(&self) -> Option<&str> {
        self.storage_key.as_deref()
    }

    /// Coerce to the declared type and store. Returns the stored value and
    /// whether it differed from the previous one.
    pub(crate) fn set(&self, value: Value) -> (Value, bool) {
        let coerced = value.coerce(self.descriptor.kind);
        let mut guard = self.lock();
        let changed = *guard != coerced;
        *guard = coerced.clone();
        (coerced, changed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Value> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
