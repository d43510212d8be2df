//! # simthings-adapter-virtual
//!
//! Virtual device simulation engine — simulated smart-home things for
//! exercising an IoT gateway without real hardware.
//!
//! ## Provided devices
//!
//! | Device | Id | Behaviour |
//! |--------|----|-----------|
//! | Virtual Light | `virtual-light` | on/off, brightness, color with coupled `colorMode` |
//! | Virtual Switch | `virtual-switch` | on/off |
//! | Virtual Temperature Sensor | `virtual-temperature-sensor` | read-only reading, drifts when enabled |
//! | Virtual Motion Sensor | `virtual-motion-sensor` | read-only motion flag |
//! | Virtual Smoke Alarm | `virtual-smoke-alarm` | `trigger`/`silence` actions + events |
//! | Virtual Lock | `virtual-lock` | `lock`/`unlock` state machine with a 1-in-20 jam chance, PIN pairing |
//! | Virtual Thermostat | `virtual-thermostat` | mode with coupled `heatingCooling`, credential pairing |
//! | Virtual Camera | `virtual-camera` | `streamActive` toggles a supervised live stream |
//! | Virtual Widget | `virtual-widget` | `ping` action emitting a `pong` event |
//!
//! Custom devices can be added through the adapter configuration; their
//! descriptors are normalized best-effort and never rejected.
//!
//! ## Dependency rule
//!
//! Depends on `simthings-app` (port traits) and `simthings-domain` only.

mod actions;
mod config;
mod context;
mod custom;
mod device;
mod drift;
mod property;
mod rules;
mod stream;
mod templates;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use simthings_app::ports::gateway::{GatewayNotifier, Notification};
use simthings_app::ports::ValueStore;
use simthings_domain::action::ActionInvocation;
use simthings_domain::device::DeviceTemplate;
use simthings_domain::error::{NotFoundError, SimThingsError};
use simthings_domain::id::DeviceId;
use simthings_domain::value::Value;

pub use config::{TranscoderConfig, VirtualConfig};
pub use context::SimContext;
pub use custom::{CustomAction, CustomDeviceDescriptor, CustomProperty};
pub use device::SimulatedDevice;
pub use drift::DRIFT_INTERVAL;
pub use property::PropertyCell;
pub use stream::StreamSupervisor;
pub use templates::builtin_templates;

/// Fixed PIN accepted by PIN-protected devices.
const PIN_SECRET: &str = "1234";
/// Fixed credentials accepted by credential-protected devices.
const USERNAME_SECRET: &str = "user";
const PASSWORD_SECRET: &str = "password";

/// Registry of live devices, keyed by stable id in discovery order.
struct DeviceMap<G, S> {
    by_id: HashMap<DeviceId, Arc<SimulatedDevice<G, S>>>,
    order: Vec<DeviceId>,
}

impl<G, S> Default for DeviceMap<G, S> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<G, S> DeviceMap<G, S>
where
    G: GatewayNotifier + Clone + Send + Sync + 'static,
    S: ValueStore + Clone + Send + Sync + 'static,
{
    fn contains(&self, id: &DeviceId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Insert if absent; returns whether the device was inserted.
    fn insert(&mut self, device: Arc<SimulatedDevice<G, S>>) -> bool {
        let id = device.id().clone();
        if self.by_id.contains_key(&id) {
            return false;
        }
        self.order.push(id.clone());
        self.by_id.insert(id, device);
        true
    }

    fn get(&self, id: &DeviceId) -> Option<Arc<SimulatedDevice<G, S>>> {
        self.by_id.get(id).cloned()
    }

    fn ids(&self) -> Vec<DeviceId> {
        self.order.clone()
    }

    fn drain(&mut self) -> Vec<Arc<SimulatedDevice<G, S>>> {
        let order = std::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(|id| self.by_id.remove(&id))
            .collect()
    }
}

/// The virtual device adapter: registry, pairing checks, and the entry
/// points the host gateway drives.
pub struct VirtualAdapter<G, S> {
    ctx: SimContext<G, S>,
    config: VirtualConfig,
    devices: Mutex<DeviceMap<G, S>>,
}

impl<G, S> VirtualAdapter<G, S>
where
    G: GatewayNotifier + Clone + Send + Sync + 'static,
    S: ValueStore + Clone + Send + Sync + 'static,
{
    /// Create an adapter. Probes the external transcoder exactly once; the
    /// result is read-only for the adapter's lifetime.
    pub async fn new(gateway: G, store: S, config: VirtualConfig) -> Self {
        let stream = Arc::new(StreamSupervisor::probe(config.transcoder.clone()).await);
        Self::with_supervisor(gateway, store, config, stream)
    }

    fn with_supervisor(
        gateway: G,
        store: S,
        config: VirtualConfig,
        stream: Arc<StreamSupervisor>,
    ) -> Self {
        let ctx = SimContext::new(
            gateway,
            store,
            config.drift_enabled,
            config.persistence_enabled,
            stream,
        );
        Self {
            ctx,
            config,
            devices: Mutex::new(DeviceMap::default()),
        }
    }

    /// Instantiate every built-in template, then every configured custom
    /// descriptor. Idempotent: ids already present are skipped. Returns the
    /// ids actually added, in discovery order.
    pub async fn add_all(&self) -> Vec<DeviceId> {
        let mut added = Vec::new();
        for template in templates::builtin_templates() {
            if let Some(id) = self.add_device(template).await {
                added.push(id);
            }
        }
        for descriptor in self.config.custom_devices.clone() {
            // each descriptor is processed independently; normalization is
            // best-effort and never rejects one
            let template = custom::normalize(&descriptor);
            if let Some(id) = self.add_device(template).await {
                added.push(id);
            }
        }
        added
    }

    /// Begin a pairing scan: re-discover and instantiate missing devices.
    pub async fn start_pairing(&self) -> Vec<DeviceId> {
        self.add_all().await
    }

    async fn add_device(&self, template: DeviceTemplate) -> Option<DeviceId> {
        if let Err(err) = template.validate() {
            tracing::error!(device = %template.id, error = %err, "skipping invalid device template");
            return None;
        }
        if self.lock_devices().contains(&template.id) {
            return None;
        }
        let id = template.id.clone();
        let title = template.title.clone();
        let device = SimulatedDevice::create(self.ctx.clone(), template).await;
        if !self.lock_devices().insert(Arc::clone(&device)) {
            // lost the race against a concurrent discovery pass
            device.teardown();
            return None;
        }
        self.ctx
            .notify(Notification::DeviceAdded {
                device: id.clone(),
                title,
            })
            .await;
        Some(id)
    }

    /// Fetch a live device.
    ///
    /// # Errors
    ///
    /// Returns [`SimThingsError::NotFound`] for unknown ids.
    pub fn device(&self, id: &DeviceId) -> Result<Arc<SimulatedDevice<G, S>>, SimThingsError> {
        self.lock_devices().get(id).ok_or_else(|| {
            NotFoundError {
                entity: "Device",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Ids of all live devices, in discovery order.
    #[must_use]
    pub fn device_ids(&self) -> Vec<DeviceId> {
        self.lock_devices().ids()
    }

    /// Write a property on behalf of the host gateway.
    ///
    /// # Errors
    ///
    /// Propagates [`SimThingsError::NotFound`] and
    /// [`SimThingsError::ReadOnly`] from the device.
    pub async fn set_property(
        &self,
        id: &DeviceId,
        property: &str,
        value: Value,
    ) -> Result<Value, SimThingsError> {
        self.device(id)?.set_property(property, value).await
    }

    /// Read a property value.
    ///
    /// # Errors
    ///
    /// Returns [`SimThingsError::NotFound`] for unknown devices or
    /// properties.
    pub fn read_property(&self, id: &DeviceId, property: &str) -> Result<Value, SimThingsError> {
        self.device(id)?.read_property(property)
    }

    /// Invoke an action on behalf of the host gateway.
    ///
    /// # Errors
    ///
    /// Returns [`SimThingsError::NotFound`] for unknown devices or actions.
    pub async fn request_action(
        &self,
        id: &DeviceId,
        action: &str,
        input: serde_json::Value,
    ) -> Result<ActionInvocation, SimThingsError> {
        let device = self.device(id)?;
        actions::invoke(&device, action, input).await
    }

    /// Verify a pairing PIN.
    ///
    /// # Errors
    ///
    /// Returns [`SimThingsError::InvalidPin`] unless the device requires a
    /// PIN and the supplied value matches the fixed secret.
    pub fn verify_pin(&self, id: &DeviceId, pin: &str) -> Result<(), SimThingsError> {
        let device = self.device(id)?;
        if device.template().pairing.pin_required && pin == PIN_SECRET {
            Ok(())
        } else {
            Err(SimThingsError::InvalidPin)
        }
    }

    /// Verify pairing credentials.
    ///
    /// # Errors
    ///
    /// Returns [`SimThingsError::InvalidCredentials`] unless the device
    /// requires credentials and both fields match the fixed secrets.
    pub fn verify_credentials(
        &self,
        id: &DeviceId,
        username: &str,
        password: &str,
    ) -> Result<(), SimThingsError> {
        let device = self.device(id)?;
        if device.template().pairing.credentials_required
            && username == USERNAME_SECRET
            && password == PASSWORD_SECRET
        {
            Ok(())
        } else {
            Err(SimThingsError::InvalidCredentials)
        }
    }

    /// Tear down the adapter: cancel every drift timer and pending lock
    /// resolution, stop the stream supervisor for good, and release the
    /// registry.
    pub async fn teardown(&self) {
        let devices = self.lock_devices().drain();
        for device in &devices {
            device.teardown();
        }
        self.ctx.stream.shutdown().await;
    }

    fn lock_devices(&self) -> MutexGuard<'_, DeviceMap<G, S>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::future::Future;
    use std::time::Duration;

    use simthings_app::event_bus::InProcessEventBus;
    use simthings_app::memory::MemoryValueStore;
    use simthings_domain::action::ActionStatus;
    use simthings_domain::lock::LockState;

    type TestAdapter = VirtualAdapter<Arc<InProcessEventBus>, Arc<MemoryValueStore>>;

    fn disabled_supervisor() -> Arc<StreamSupervisor> {
        Arc::new(StreamSupervisor::with_version(
            None,
            TranscoderConfig::default(),
        ))
    }

    fn build_adapter(
        config: VirtualConfig,
    ) -> (TestAdapter, Arc<InProcessEventBus>, Arc<MemoryValueStore>) {
        let bus = Arc::new(InProcessEventBus::new(1024));
        let store = Arc::new(MemoryValueStore::new());
        let adapter = VirtualAdapter::with_supervisor(
            Arc::clone(&bus),
            Arc::clone(&store),
            config,
            disabled_supervisor(),
        );
        (adapter, bus, store)
    }

    async fn default_adapter() -> TestAdapter {
        let (adapter, _, _) = build_adapter(VirtualConfig::default());
        adapter.add_all().await;
        adapter
    }

    fn light() -> DeviceId {
        DeviceId::new("virtual-light")
    }

    fn lock() -> DeviceId {
        DeviceId::new("virtual-lock")
    }

    fn thermostat() -> DeviceId {
        DeviceId::new("virtual-thermostat")
    }

    /// Let spawned fire-and-forget tasks (persistence) run.
    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    // -----------------------------------------------------------------
    // Discovery & registry
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn should_discover_builtin_devices_on_add_all() {
        let (adapter, _, _) = build_adapter(VirtualConfig::default());
        let added = adapter.add_all().await;
        assert_eq!(added.len(), 9);
        assert_eq!(adapter.device_ids().len(), 9);
    }

    #[tokio::test]
    async fn should_skip_devices_already_present_on_rescan() {
        let adapter = default_adapter().await;
        let added = adapter.start_pairing().await;
        assert!(added.is_empty());
        assert_eq!(adapter.device_ids().len(), 9);
    }

    #[tokio::test]
    async fn should_notify_gateway_for_each_added_device() {
        let (adapter, bus, _) = build_adapter(VirtualConfig::default());
        let mut rx = bus.subscribe();
        adapter.add_all().await;

        let mut registered = 0;
        while let Ok(notification) = rx.try_recv() {
            if matches!(notification, Notification::DeviceAdded { .. }) {
                registered += 1;
            }
        }
        assert_eq!(registered, 9);
    }

    #[tokio::test]
    async fn should_keep_discovery_order_in_device_ids() {
        let adapter = default_adapter().await;
        assert_eq!(adapter.device_ids().first(), Some(&light()));
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_device() {
        let adapter = default_adapter().await;
        let result = adapter.read_property(&DeviceId::new("missing"), "on");
        assert!(matches!(result, Err(SimThingsError::NotFound(_))));
    }

    // -----------------------------------------------------------------
    // Property writes
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn should_roundtrip_property_writes() {
        let adapter = default_adapter().await;
        adapter
            .set_property(&light(), "brightness", Value::Int(80))
            .await
            .unwrap();
        assert_eq!(
            adapter.read_property(&light(), "brightness").unwrap(),
            Value::Int(80)
        );
    }

    #[tokio::test]
    async fn should_reject_writes_to_read_only_properties() {
        let adapter = default_adapter().await;
        let before = adapter.read_property(&light(), "colorMode").unwrap();
        let result = adapter
            .set_property(&light(), "colorMode", Value::String("color".to_string()))
            .await;
        assert!(matches!(result, Err(SimThingsError::ReadOnly(_))));
        assert_eq!(adapter.read_property(&light(), "colorMode").unwrap(), before);
    }

    #[tokio::test]
    async fn should_notify_gateway_after_committing_writes() {
        let (adapter, bus, _) = build_adapter(VirtualConfig::default());
        adapter.add_all().await;
        let mut rx = bus.subscribe();

        adapter
            .set_property(&light(), "on", Value::Bool(true))
            .await
            .unwrap();

        match rx.recv().await.unwrap() {
            Notification::PropertyChanged {
                device,
                property,
                value,
            } => {
                assert_eq!(device, light());
                assert_eq!(property, "on");
                assert_eq!(value, Value::Bool(true));
            }
            other => panic!("unexpected notification: {other:?}"),
        }
    }

    #[tokio::test]
    async fn should_accept_out_of_range_writes() {
        // Constraint validation is the gateway's responsibility.
        let adapter = default_adapter().await;
        adapter
            .set_property(&light(), "brightness", Value::Int(250))
            .await
            .unwrap();
        assert_eq!(
            adapter.read_property(&light(), "brightness").unwrap(),
            Value::Int(250)
        );
    }

    // -----------------------------------------------------------------
    // Derived rules
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn should_set_heating_cooling_from_mode() {
        let adapter = default_adapter().await;
        for (mode, expected) in [("heat", "heating"), ("cool", "cooling"), ("off", "off")] {
            adapter
                .set_property(&thermostat(), "mode", Value::String(mode.to_string()))
                .await
                .unwrap();
            assert_eq!(
                adapter
                    .read_property(&thermostat(), "heatingCooling")
                    .unwrap(),
                Value::String(expected.to_string()),
                "mode {mode}"
            );
        }
    }

    #[tokio::test]
    async fn should_leave_heating_cooling_for_unknown_modes() {
        let adapter = default_adapter().await;
        adapter
            .set_property(&thermostat(), "mode", Value::String("heat".to_string()))
            .await
            .unwrap();
        adapter
            .set_property(&thermostat(), "mode", Value::String("eco".to_string()))
            .await
            .unwrap();
        assert_eq!(
            adapter
                .read_property(&thermostat(), "heatingCooling")
                .unwrap(),
            Value::String("heating".to_string())
        );
    }

    #[tokio::test]
    async fn should_keep_mode_mapping_stable_across_repeated_writes() {
        let adapter = default_adapter().await;
        for _ in 0..2 {
            adapter
                .set_property(&thermostat(), "mode", Value::String("cool".to_string()))
                .await
                .unwrap();
            assert_eq!(
                adapter
                    .read_property(&thermostat(), "heatingCooling")
                    .unwrap(),
                Value::String("cooling".to_string())
            );
        }
    }

    #[tokio::test]
    async fn should_track_color_mode_from_color_writes() {
        let adapter = default_adapter().await;
        adapter
            .set_property(&light(), "color", Value::String("#ff0000".to_string()))
            .await
            .unwrap();
        assert_eq!(
            adapter.read_property(&light(), "colorMode").unwrap(),
            Value::String("color".to_string())
        );

        adapter
            .set_property(&light(), "colorTemperature", Value::Int(4000))
            .await
            .unwrap();
        assert_eq!(
            adapter.read_property(&light(), "colorMode").unwrap(),
            Value::String("temperature".to_string())
        );
    }

    #[tokio::test]
    async fn should_ignore_missing_companion_properties() {
        let config = VirtualConfig {
            custom_devices: vec![CustomDeviceDescriptor {
                id: Some("bare-bulb".to_string()),
                title: Some("Bare Bulb".to_string()),
                properties: std::collections::BTreeMap::from([(
                    "color".to_string(),
                    CustomProperty {
                        kind: Some(simthings_domain::value::PropertyKind::String),
                        default: Some(Value::String("#ffffff".to_string())),
                        ..CustomProperty::default()
                    },
                )]),
                ..CustomDeviceDescriptor::default()
            }],
            ..VirtualConfig::default()
        };
        let (adapter, _, _) = build_adapter(config);
        adapter.add_all().await;

        // no colorMode companion on this device; the write must still work
        let id = DeviceId::new("bare-bulb");
        adapter
            .set_property(&id, "color", Value::String("#00ff00".to_string()))
            .await
            .unwrap();
        assert_eq!(
            adapter.read_property(&id, "color").unwrap(),
            Value::String("#00ff00".to_string())
        );
    }

    // -----------------------------------------------------------------
    // Actions & lock state machine
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn should_finish_immediately_when_lock_already_at_target() {
        let (adapter, bus, _) = build_adapter(VirtualConfig::default());
        adapter.add_all().await;
        let mut rx = bus.subscribe();

        let invocation = adapter
            .request_action(&lock(), "lock", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(invocation.status, ActionStatus::Finished);
        assert_eq!(
            adapter.read_property(&lock(), "locked").unwrap(),
            LockState::Locked.to_value()
        );

        // no intermediate state was ever published
        while let Ok(notification) = rx.try_recv() {
            assert!(
                !matches!(
                    notification,
                    Notification::PropertyChanged { ref property, .. } if property.as_str() == "locked"
                ),
                "observed a state change for an idempotent lock request"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn should_pass_through_unknown_before_resolving() {
        let adapter = default_adapter().await;

        let invocation = adapter
            .request_action(&lock(), "unlock", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(invocation.status, ActionStatus::Started);
        assert_eq!(
            adapter.read_property(&lock(), "locked").unwrap(),
            LockState::Unknown.to_value()
        );

        tokio::time::sleep(Duration::from_millis(2100)).await;

        let resolved = adapter.read_property(&lock(), "locked").unwrap();
        let resolved = LockState::from_value(&resolved).unwrap();
        assert!(
            matches!(resolved, LockState::Unlocked | LockState::Jammed),
            "unexpected terminal state {resolved}"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_jam_about_five_percent_of_attempts() {
        let adapter = default_adapter().await;
        let device = adapter.device(&lock()).unwrap();

        const TRIALS: usize = 600;
        let mut jams = 0u32;
        for _ in 0..TRIALS {
            device
                .write_internal("locked", LockState::Locked.to_value())
                .await;
            adapter
                .request_action(&lock(), "unlock", serde_json::json!({}))
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(2100)).await;
            let state = adapter.read_property(&lock(), "locked").unwrap();
            match LockState::from_value(&state).unwrap() {
                LockState::Jammed => jams += 1,
                LockState::Unlocked => {}
                other => panic!("unexpected terminal state {other}"),
            }
        }

        let rate = f64::from(jams) / TRIALS as f64;
        assert!(
            (0.01..=0.12).contains(&rate),
            "jam rate {rate} outside tolerance band"
        );
    }

    #[tokio::test]
    async fn should_write_bool_and_emit_event_for_trigger_actions() {
        let (adapter, bus, _) = build_adapter(VirtualConfig::default());
        adapter.add_all().await;
        let alarm = DeviceId::new("virtual-smoke-alarm");
        let mut rx = bus.subscribe();

        let invocation = adapter
            .request_action(&alarm, "trigger", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(invocation.status, ActionStatus::Finished);
        assert_eq!(
            adapter.read_property(&alarm, "alarm").unwrap(),
            Value::Bool(true)
        );

        let mut saw_event = false;
        while let Ok(notification) = rx.try_recv() {
            if let Notification::Event(event) = notification {
                assert_eq!(event.name, "alarm");
                saw_event = true;
            }
        }
        assert!(saw_event);

        adapter
            .request_action(&alarm, "silence", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(
            adapter.read_property(&alarm, "alarm").unwrap(),
            Value::Bool(false)
        );
    }

    #[tokio::test]
    async fn should_emit_random_payload_for_generic_actions() {
        let (adapter, bus, _) = build_adapter(VirtualConfig::default());
        adapter.add_all().await;
        let widget = DeviceId::new("virtual-widget");
        let mut rx = bus.subscribe();

        let invocation = adapter
            .request_action(&widget, "ping", serde_json::json!({}))
            .await
            .unwrap();
        assert_eq!(invocation.status, ActionStatus::Finished);

        let mut statuses = Vec::new();
        let mut payload = None;
        while let Ok(notification) = rx.try_recv() {
            match notification {
                Notification::ActionStatus(inv) => statuses.push(inv.status),
                Notification::Event(event) => {
                    assert_eq!(event.name, "pong");
                    payload = Some(event.data);
                }
                Notification::PropertyChanged { .. } | Notification::DeviceAdded { .. } => {}
            }
        }
        assert_eq!(statuses, vec![ActionStatus::Started, ActionStatus::Finished]);
        assert!(payload.unwrap().is_i64());
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_action() {
        let adapter = default_adapter().await;
        let result = adapter
            .request_action(&light(), "explode", serde_json::json!({}))
            .await;
        assert!(matches!(result, Err(SimThingsError::NotFound(_))));
    }

    // -----------------------------------------------------------------
    // Drift
    // -----------------------------------------------------------------

    #[tokio::test(start_paused = true)]
    async fn should_keep_drifted_values_within_declared_bounds() {
        let config = VirtualConfig {
            drift_enabled: true,
            persistence_enabled: false,
            ..VirtualConfig::default()
        };
        let (adapter, _, _) = build_adapter(config);
        adapter.add_all().await;
        let sensor = DeviceId::new("virtual-temperature-sensor");

        for _ in 0..5 {
            tokio::time::sleep(DRIFT_INTERVAL + Duration::from_secs(1)).await;

            let temperature = adapter
                .read_property(&sensor, "temperature")
                .unwrap()
                .as_f64()
                .unwrap();
            assert!((-20.0..=60.0).contains(&temperature));

            match adapter.read_property(&light(), "brightness").unwrap() {
                Value::Int(level) => assert!((0..=100).contains(&level)),
                other => panic!("brightness lost its type: {other:?}"),
            }

            match adapter.read_property(&light(), "color").unwrap() {
                Value::String(color) => {
                    assert!(color.starts_with('#') && color.len() == 7);
                }
                other => panic!("color lost its type: {other:?}"),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_mutate_values_when_drift_disabled() {
        let adapter = default_adapter().await;
        let device = adapter.device(&light()).unwrap();
        let before = device.snapshot();

        tokio::time::sleep(Duration::from_secs(600)).await;

        assert_eq!(device.snapshot(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn should_stop_drifting_after_teardown() {
        let config = VirtualConfig {
            drift_enabled: true,
            persistence_enabled: false,
            ..VirtualConfig::default()
        };
        let (adapter, _, _) = build_adapter(config);
        adapter.add_all().await;
        let device = adapter.device(&light()).unwrap();

        adapter.teardown().await;
        let before = device.snapshot();

        tokio::time::sleep(Duration::from_secs(600)).await;

        assert_eq!(device.snapshot(), before);
        assert!(adapter.device_ids().is_empty());
    }

    // -----------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn should_seed_values_from_the_store() {
        let (adapter, _, store) = build_adapter(VirtualConfig::default());
        store.insert("virtual-light-brightness", Value::Int(77));
        adapter.add_all().await;

        assert_eq!(
            adapter.read_property(&light(), "brightness").unwrap(),
            Value::Int(77)
        );
    }

    #[tokio::test]
    async fn should_persist_writes_through_the_store() {
        let (adapter, _, store) = build_adapter(VirtualConfig::default());
        adapter.add_all().await;

        adapter
            .set_property(&light(), "brightness", Value::Int(33))
            .await
            .unwrap();
        settle().await;

        assert_eq!(
            store.get("virtual-light-brightness"),
            Some(Value::Int(33))
        );
    }

    #[tokio::test]
    async fn should_not_persist_when_disabled() {
        let config = VirtualConfig {
            persistence_enabled: false,
            ..VirtualConfig::default()
        };
        let (adapter, _, store) = build_adapter(config);
        adapter.add_all().await;

        adapter
            .set_property(&light(), "brightness", Value::Int(33))
            .await
            .unwrap();
        settle().await;

        assert_eq!(store.get("virtual-light-brightness"), None);
    }

    #[tokio::test]
    async fn should_survive_store_failures() {
        struct FailingStore;

        impl ValueStore for FailingStore {
            fn load(
                &self,
                _key: &str,
            ) -> impl Future<Output = Result<Option<Value>, SimThingsError>> + Send
            {
                async { Err(SimThingsError::Storage("injected failure".into())) }
            }

            fn save(
                &self,
                _key: &str,
                _value: &Value,
            ) -> impl Future<Output = Result<(), SimThingsError>> + Send {
                async { Err(SimThingsError::Storage("injected failure".into())) }
            }
        }

        let bus = Arc::new(InProcessEventBus::new(64));
        let adapter = VirtualAdapter::with_supervisor(
            bus,
            Arc::new(FailingStore),
            VirtualConfig::default(),
            disabled_supervisor(),
        );
        adapter.add_all().await;

        // load failures fall back to template defaults
        assert_eq!(
            adapter.read_property(&light(), "brightness").unwrap(),
            Value::Int(50)
        );

        // save failures never surface to the writer
        adapter
            .set_property(&light(), "brightness", Value::Int(10))
            .await
            .unwrap();
        settle().await;
        assert_eq!(
            adapter.read_property(&light(), "brightness").unwrap(),
            Value::Int(10)
        );
    }

    // -----------------------------------------------------------------
    // Custom devices
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn should_instantiate_custom_devices_with_coerced_defaults() {
        let config = VirtualConfig {
            custom_devices: vec![CustomDeviceDescriptor {
                id: Some("my-dial".to_string()),
                title: Some("My Dial".to_string()),
                properties: std::collections::BTreeMap::from([(
                    "level".to_string(),
                    CustomProperty {
                        kind: Some(simthings_domain::value::PropertyKind::Integer),
                        default: Some(Value::String("42".to_string())),
                        ..CustomProperty::default()
                    },
                )]),
                ..CustomDeviceDescriptor::default()
            }],
            ..VirtualConfig::default()
        };
        let (adapter, _, _) = build_adapter(config);
        let added = adapter.add_all().await;
        assert_eq!(added.len(), 10);

        let id = DeviceId::new("my-dial");
        assert_eq!(
            adapter.read_property(&id, "level").unwrap(),
            Value::Int(42)
        );
    }

    // -----------------------------------------------------------------
    // Pairing
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn should_accept_the_fixed_pin_on_pin_devices() {
        let adapter = default_adapter().await;
        assert!(adapter.verify_pin(&lock(), "1234").is_ok());
    }

    #[tokio::test]
    async fn should_reject_wrong_pins() {
        let adapter = default_adapter().await;
        assert!(matches!(
            adapter.verify_pin(&lock(), "0000"),
            Err(SimThingsError::InvalidPin)
        ));
    }

    #[tokio::test]
    async fn should_reject_pins_on_devices_without_pin_pairing() {
        let adapter = default_adapter().await;
        assert!(matches!(
            adapter.verify_pin(&light(), "1234"),
            Err(SimThingsError::InvalidPin)
        ));
    }

    #[tokio::test]
    async fn should_verify_credentials_on_credential_devices() {
        let adapter = default_adapter().await;
        assert!(adapter
            .verify_credentials(&thermostat(), "user", "password")
            .is_ok());
        assert!(matches!(
            adapter.verify_credentials(&thermostat(), "user", "hunter2"),
            Err(SimThingsError::InvalidCredentials)
        ));
        assert!(matches!(
            adapter.verify_credentials(&light(), "user", "password"),
            Err(SimThingsError::InvalidCredentials)
        ));
    }
}
