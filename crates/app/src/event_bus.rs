//! In-process notification bus backed by a tokio broadcast channel.
//!
//! Serves as the in-process stand-in for the host gateway: the simulator
//! publishes through the [`GatewayNotifier`] port and any number of
//! subscribers (the daemon's log forwarder, tests, a future transport)
//! observe the stream.

use std::future::Future;

use tokio::sync::broadcast;

use simthings_domain::error::SimThingsError;

use crate::ports::{GatewayNotifier, Notification};

/// In-process notification bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the notification is simply dropped).
pub struct InProcessEventBus {
    sender: broadcast::Sender<Notification>,
}

impl InProcessEventBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to notifications on this bus.
    ///
    /// Returns a receiver that will get all notifications published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }
}

impl GatewayNotifier for InProcessEventBus {
    fn notify(
        &self,
        notification: Notification,
    ) -> impl Future<Output = Result<(), SimThingsError>> + Send {
        // broadcast::send fails only when there are zero receivers,
        // which is fine — we simply ignore the error.
        let _ = self.sender.send(notification);
        async { Ok(()) }
    }
}
