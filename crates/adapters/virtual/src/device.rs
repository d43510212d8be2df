//! A live simulated device — property cells, the commit path, and the
//! background tasks tied to its lifetime.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use simthings_app::ports::gateway::{GatewayNotifier, Notification};
use simthings_app::ports::storage::{self, ValueStore};
use simthings_domain::device::DeviceTemplate;
use simthings_domain::error::{NotFoundError, ReadOnlyViolation, SimThingsError};
use simthings_domain::event::Event;
use simthings_domain::id::DeviceId;
use simthings_domain::value::Value;

use crate::context::SimContext;
use crate::drift;
use crate::property::PropertyCell;
use crate::rules;

/// A single simulated device and its runtime state.
///
/// The property set is fixed at construction: cells are created once from
/// the template and never added or removed afterwards.
pub struct SimulatedDevice<G, S> {
    template: DeviceTemplate,
    cells: HashMap<String, PropertyCell>,
    ctx: SimContext<G, S>,
    tasks: Mutex<Vec<tokio::task::JoinHandle<()>>>,
}

impl<G, S> SimulatedDevice<G, S>
where
    G: GatewayNotifier + Clone + Send + Sync + 'static,
    S: ValueStore + Clone + Send + Sync + 'static,
{
    /// Build a device from its template.
    ///
    /// Each property is seeded from the value store when persistence is
    /// enabled and a prior value exists, otherwise from the template
    /// default; a store failure falls back to the default and is only
    /// logged. Drift timers start here when the adapter enables them.
    pub(crate) async fn create(ctx: SimContext<G, S>, template: DeviceTemplate) -> Arc<Self> {
        let mut cells = HashMap::new();
        for property in &template.properties {
            let key = ctx
                .persistence_enabled
                .then(|| storage::value_key(&template.id, &property.descriptor.name));
            let seed = match &key {
                Some(key) => match ctx.store.load(key).await {
                    Ok(Some(stored)) => stored,
                    Ok(None) => property.default.clone(),
                    Err(err) => {
                        tracing::warn!(
                            key = %key,
                            error = %err,
                            "failed to load persisted value, using default"
                        );
                        property.default.clone()
                    }
                },
                None => property.default.clone(),
            };
            cells.insert(
                property.descriptor.name.clone(),
                PropertyCell::new(property.descriptor.clone(), seed, key),
            );
        }

        let device = Arc::new(Self {
            template,
            cells,
            ctx,
            tasks: Mutex::new(Vec::new()),
        });

        if device.ctx.drift_enabled {
            let drifting: Vec<String> = device
                .cells
                .iter()
                .filter(|(_, cell)| cell.descriptor().kind.is_some())
                .map(|(name, _)| name.clone())
                .collect();
            for name in drifting {
                let handle = drift::spawn(Arc::clone(&device), name);
                device.track(handle);
            }
        }

        device
    }

    #[must_use]
    pub fn id(&self) -> &DeviceId {
        &self.template.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.template.title
    }

    #[must_use]
    pub fn template(&self) -> &DeviceTemplate {
        &self.template
    }

    /// Look up a property cell by name.
    ///
    /// # Errors
    ///
    /// Returns [`SimThingsError::NotFound`] for names outside the fixed set.
    pub fn property(&self, name: &str) -> Result<&PropertyCell, SimThingsError> {
        self.cells.get(name).ok_or_else(|| {
            NotFoundError {
                entity: "Property",
                id: format!("{}/{name}", self.template.id),
            }
            .into()
        })
    }

    /// Read a property value.
    ///
    /// # Errors
    ///
    /// Returns [`SimThingsError::NotFound`] for unknown property names.
    pub fn read_property(&self, name: &str) -> Result<Value, SimThingsError> {
        Ok(self.property(name)?.read())
    }

    /// Current value of every property, keyed by name.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.cells
            .iter()
            .map(|(name, cell)| (name.clone(), cell.read()))
            .collect()
    }

    /// External write entry point.
    ///
    /// Coerces to the declared type, commits, notifies the gateway, kicks
    /// off fire-and-forget persistence, and runs the derived-property rules
    /// before returning. Values outside a declared range or enumeration are
    /// accepted — validating against the descriptor is the caller's job.
    ///
    /// # Errors
    ///
    /// [`SimThingsError::ReadOnly`] when the descriptor is read-only,
    /// [`SimThingsError::NotFound`] for unknown property names.
    pub async fn set_property(&self, name: &str, value: Value) -> Result<Value, SimThingsError> {
        let cell = self.property(name)?;
        if cell.descriptor().read_only {
            return Err(ReadOnlyViolation {
                device: self.template.id.clone(),
                property: name.to_string(),
            }
            .into());
        }
        let stored = self.commit(cell, value).await;
        rules::apply(self, name, &stored).await;
        Ok(stored)
    }

    /// Internal write used by derived rules and action state machines.
    ///
    /// Skips the read-only check and never re-enters the rules; a name
    /// outside the fixed property set is silently ignored.
    pub(crate) async fn write_internal(&self, name: &str, value: Value) {
        if let Some(cell) = self.cells.get(name) {
            self.commit(cell, value).await;
        }
    }

    /// One drift firing for `name`: generate a candidate within the
    /// declared constraints and apply it only when it differs from the
    /// current value, so observers see no redundant notifications.
    pub(crate) async fn drift_tick(&self, name: &str) {
        let Some(cell) = self.cells.get(name) else {
            return;
        };
        let Some(candidate) = drift::random_value(cell.descriptor()) else {
            return;
        };
        if candidate == cell.read() {
            return;
        }
        let stored = self.commit(cell, candidate).await;
        rules::apply(self, name, &stored).await;
    }

    /// Emit a declared event to the gateway.
    pub(crate) async fn emit_event(&self, name: &str, data: serde_json::Value) {
        let event = Event::new(self.template.id.clone(), name, data);
        self.ctx.notify(Notification::Event(event)).await;
    }

    /// Update memory, notify, then persist. The in-memory update strictly
    /// precedes the notification; persistence is fire-and-forget and may
    /// complete after it.
    async fn commit(&self, cell: &PropertyCell, value: Value) -> Value {
        let (stored, _changed) = cell.set(value);
        self.ctx
            .notify(Notification::PropertyChanged {
                device: self.template.id.clone(),
                property: cell.descriptor().name.clone(),
                value: stored.clone(),
            })
            .await;
        self.persist(cell, &stored);
        stored
    }

    /// Fire-and-forget persistence; failures are logged, never surfaced.
    fn persist(&self, cell: &PropertyCell, value: &Value) {
        let Some(key) = cell.storage_key() else {
            return;
        };
        let key = key.to_owned();
        let value = value.clone();
        let store = self.ctx.store.clone();
        tokio::spawn(async move {
            if let Err(err) = store.save(&key, &value).await {
                tracing::warn!(key = %key, error = %err, "failed to persist property value");
            }
        });
    }

    pub(crate) fn ctx(&self) -> &SimContext<G, S> {
        &self.ctx
    }

    /// Register a background task whose lifetime is bounded by this device.
    pub(crate) fn track(&self, handle: tokio::task::JoinHandle<()>) {
        let mut tasks = self.lock_tasks();
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    /// Cancel every background task (drift timers, pending lock
    /// resolutions). Cancellation is synchronous: nothing fires afterwards.
    pub fn teardown(&self) {
        for task in self.lock_tasks().drain(..) {
            task.abort();
        }
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, Vec<tokio::task::JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
