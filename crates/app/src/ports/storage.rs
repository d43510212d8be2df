//! Storage port — durable key/value persistence for property values.
//!
//! Keys follow the `{device_id}-{property_name}` convention (see
//! [`value_key`]), so a device reconstructed after a restart finds its
//! previous values under the same keys.

use std::future::Future;

use simthings_domain::error::SimThingsError;
use simthings_domain::id::DeviceId;
use simthings_domain::value::Value;

/// Durable key/value storage for persisted property values.
pub trait ValueStore {
    /// Load the value stored under `key`, if any.
    fn load(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Value>, SimThingsError>> + Send;

    /// Store `value` under `key`, replacing any previous value.
    fn save(
        &self,
        key: &str,
        value: &Value,
    ) -> impl Future<Output = Result<(), SimThingsError>> + Send;
}

impl<T: ValueStore + Send + Sync> ValueStore for std::sync::Arc<T> {
    fn load(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<Value>, SimThingsError>> + Send {
        (**self).load(key)
    }

    fn save(
        &self,
        key: &str,
        value: &Value,
    ) -> impl Future<Output = Result<(), SimThingsError>> + Send {
        (**self).save(key, value)
    }
}

/// Build the storage key for a device property.
#[must_use]
pub fn value_key(device: &DeviceId, property: &str) -> String {
    format!("{device}-{property}")
}
