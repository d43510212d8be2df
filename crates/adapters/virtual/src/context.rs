//! Shared simulation context handed to every device.

use std::sync::Arc;

use simthings_app::ports::{GatewayNotifier, Notification};

use crate::stream::StreamSupervisor;

/// Bundles the gateway port, the value store, the adapter-wide flags, and
/// the stream supervisor.
///
/// Cheaply cloneable so drift timers and delayed action tasks can carry
/// their own handle. The generic parameters are confined to this struct and
/// the types holding it — everything else sees only the port traits.
pub struct SimContext<G, S> {
    pub gateway: G,
    pub store: S,
    pub drift_enabled: bool,
    pub persistence_enabled: bool,
    pub stream: Arc<StreamSupervisor>,
}

impl<G, S> SimContext<G, S> {
    pub fn new(
        gateway: G,
        store: S,
        drift_enabled: bool,
        persistence_enabled: bool,
        stream: Arc<StreamSupervisor>,
    ) -> Self {
        Self {
            gateway,
            store,
            drift_enabled,
            persistence_enabled,
            stream,
        }
    }
}

impl<G: Clone, S: Clone> Clone for SimContext<G, S> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            store: self.store.clone(),
            drift_enabled: self.drift_enabled,
            persistence_enabled: self.persistence_enabled,
            stream: Arc::clone(&self.stream),
        }
    }
}

impl<G: GatewayNotifier, S> SimContext<G, S> {
    /// Deliver a notification, absorbing delivery failures — the simulation
    /// never stalls because the gateway is unreachable.
    pub(crate) async fn notify(&self, notification: Notification) {
        if let Err(err) = self.gateway.notify(notification).await {
            tracing::debug!(error = %err, "gateway notification dropped");
        }
    }
}
