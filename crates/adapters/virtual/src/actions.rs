//! Action execution — invocation lifecycle and the lock state machine.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use simthings_app::ports::gateway::{GatewayNotifier, Notification};
use simthings_app::ports::ValueStore;
use simthings_domain::action::{ActionEffect, ActionInvocation};
use simthings_domain::error::{NotFoundError, SimThingsError};
use simthings_domain::lock::LockState;
use simthings_domain::value::Value;

use crate::device::SimulatedDevice;

/// Delay before a lock/unlock attempt resolves.
pub(crate) const LOCK_RESOLVE_DELAY: Duration = Duration::from_millis(2000);
/// The resolution draw is uniform in `0..JAM_DRAW_BOUND`; drawing
/// [`JAM_SENTINEL`] jams the lock — a 1-in-20 chance per attempt.
pub(crate) const JAM_DRAW_BOUND: u32 = 20;
pub(crate) const JAM_SENTINEL: u32 = 0;

/// Property driven by the lock state machine.
const LOCKED: &str = "locked";

/// Run `action` against `device`.
///
/// The invocation is marked started and notified, the effect interpreted,
/// and — for synchronous effects — marked finished before returning. A
/// lock/unlock attempt that needs the resolution delay returns while still
/// `Started`; its terminal status arrives through a later notification.
///
/// # Errors
///
/// Returns [`SimThingsError::NotFound`] when the device declares no action
/// with that name.
pub(crate) async fn invoke<G, S>(
    device: &Arc<SimulatedDevice<G, S>>,
    action: &str,
    input: serde_json::Value,
) -> Result<ActionInvocation, SimThingsError>
where
    G: GatewayNotifier + Clone + Send + Sync + 'static,
    S: ValueStore + Clone + Send + Sync + 'static,
{
    let descriptor = device
        .template()
        .actions
        .iter()
        .find(|descriptor| descriptor.name == action)
        .ok_or_else(|| NotFoundError {
            entity: "Action",
            id: format!("{}/{action}", device.id()),
        })?
        .clone();

    let mut invocation = ActionInvocation::new(device.id().clone(), action, input);
    invocation.start();
    device
        .ctx()
        .notify(Notification::ActionStatus(invocation.clone()))
        .await;

    match descriptor.effect {
        ActionEffect::Lock { target } => {
            run_lock(device, target, &mut invocation).await;
        }
        ActionEffect::SetBool {
            property,
            value,
            event,
        } => {
            device.write_internal(&property, Value::Bool(value)).await;
            device.emit_event(&event, serde_json::json!(value)).await;
            finish(device, &mut invocation).await;
        }
        ActionEffect::EmitEvent { event } => {
            let payload: i64 = rand::thread_rng().gen_range(0..100);
            device.emit_event(&event, serde_json::json!(payload)).await;
            finish(device, &mut invocation).await;
        }
    }

    Ok(invocation)
}

async fn finish<G, S>(device: &SimulatedDevice<G, S>, invocation: &mut ActionInvocation)
where
    G: GatewayNotifier + Clone + Send + Sync + 'static,
    S: ValueStore + Clone + Send + Sync + 'static,
{
    invocation.finish();
    device
        .ctx()
        .notify(Notification::ActionStatus(invocation.clone()))
        .await;
}

/// The lock state machine.
///
/// Already at the target: finish immediately with no state change. Anything
/// else: go `unknown` right away, then resolve after
/// [`LOCK_RESOLVE_DELAY`] to the target (19 in 20) or `jammed` (1 in 20).
/// A jam is not retried — the next lock/unlock attempt re-enters `unknown`
/// under the same odds.
async fn run_lock<G, S>(
    device: &Arc<SimulatedDevice<G, S>>,
    target: LockState,
    invocation: &mut ActionInvocation,
) where
    G: GatewayNotifier + Clone + Send + Sync + 'static,
    S: ValueStore + Clone + Send + Sync + 'static,
{
    let current = device
        .read_property(LOCKED)
        .ok()
        .and_then(|value| LockState::from_value(&value))
        .unwrap_or_default();

    if current == target {
        finish(device, invocation).await;
        return;
    }

    device
        .write_internal(LOCKED, LockState::Unknown.to_value())
        .await;

    let task_device = Arc::clone(device);
    let mut pending = invocation.clone();
    let handle = tokio::spawn(async move {
        tokio::time::sleep(LOCK_RESOLVE_DELAY).await;
        let jammed = rand::thread_rng().gen_range(0..JAM_DRAW_BOUND) == JAM_SENTINEL;
        let resolved = if jammed { LockState::Jammed } else { target };
        task_device.write_internal(LOCKED, resolved.to_value()).await;
        pending.finish();
        task_device
            .ctx()
            .notify(Notification::ActionStatus(pending))
            .await;
    });
    device.track(handle);
}
