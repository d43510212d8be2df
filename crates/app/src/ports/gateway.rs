//! Gateway port — the narrow contract toward the host gateway runtime.
//!
//! The simulator never talks to the network itself; it pushes typed
//! notifications through this port and the host decides how to expose them.

use std::future::Future;

use simthings_domain::action::ActionInvocation;
use simthings_domain::error::SimThingsError;
use simthings_domain::event::Event;
use simthings_domain::id::DeviceId;
use simthings_domain::value::Value;

/// A message pushed from the simulator to the host gateway.
#[derive(Debug, Clone)]
pub enum Notification {
    /// A device finished construction and joined the registry.
    DeviceAdded { device: DeviceId, title: String },
    /// A property committed a new value.
    PropertyChanged {
        device: DeviceId,
        property: String,
        value: Value,
    },
    /// A device emitted one of its declared events.
    Event(Event),
    /// An action invocation changed lifecycle status.
    ActionStatus(ActionInvocation),
}

/// Pushes simulator notifications to the host gateway.
pub trait GatewayNotifier {
    /// Deliver a single notification.
    fn notify(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), SimThingsError>> + Send;
}

impl<T: GatewayNotifier + Send + Sync> GatewayNotifier for std::sync::Arc<T> {
    fn notify(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), SimThingsError>> + Send {
        (**self).notify(notification)
    }
}
