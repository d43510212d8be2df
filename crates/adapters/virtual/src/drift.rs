//! Randomized drift — periodic perturbation of property values within
//! their declared constraints, simulating sensor noise.

use std::sync::Arc;
use std::time::Duration;

use rand::distributions::Alphanumeric;
use rand::Rng;

use simthings_app::ports::{GatewayNotifier, ValueStore};
use simthings_domain::property::PropertyDescriptor;
use simthings_domain::value::{PropertyKind, Value};

use crate::device::SimulatedDevice;

/// Interval between drift firings for each property.
pub const DRIFT_INTERVAL: Duration = Duration::from_secs(30);

/// Length of the opaque tokens generated for untagged string properties.
const TOKEN_LEN: usize = 8;

/// Pick a random value satisfying the descriptor's declared constraints.
///
/// Returns `None` when the descriptor declares no type — such properties
/// never drift.
#[must_use]
pub fn random_value(descriptor: &PropertyDescriptor) -> Option<Value> {
    let kind = descriptor.kind?;
    let mut rng = rand::thread_rng();

    if let Some(options) = descriptor
        .enum_values
        .as_ref()
        .filter(|options| !options.is_empty())
    {
        return options.get(rng.gen_range(0..options.len())).cloned();
    }

    Some(match kind {
        PropertyKind::Boolean => Value::Bool(rng.gen_bool(0.5)),
        PropertyKind::Integer => match (descriptor.minimum, descriptor.maximum) {
            (Some(min), Some(max)) => {
                let lo = min.ceil() as i64;
                let hi = max.floor() as i64;
                if lo >= hi {
                    Value::Int(lo)
                } else {
                    Value::Int(rng.gen_range(lo..=hi))
                }
            }
            // no declared bounds to respect
            _ => Value::Int(rng.gen_range(0..=100)),
        },
        PropertyKind::Number => match (descriptor.minimum, descriptor.maximum) {
            (Some(min), Some(max)) if min <= max => Value::Float(rng.gen_range(min..=max)),
            _ => Value::Float(rng.gen_range(0.0..1.0)),
        },
        PropertyKind::String => {
            if descriptor.is_color() {
                Value::String(format!("#{:06x}", rng.gen_range(0..0x100_0000)))
            } else {
                let token: String = (0..TOKEN_LEN)
                    .map(|_| rng.sample(Alphanumeric) as char)
                    .collect();
                Value::String(token)
            }
        }
        PropertyKind::Null => Value::Null,
    })
}

/// Spawn the per-property drift timer.
///
/// The returned handle must be aborted on device teardown; abort is
/// synchronous, so no firing can land after the owner is gone.
pub(crate) fn spawn<G, S>(
    device: Arc<SimulatedDevice<G, S>>,
    property: String,
) -> tokio::task::JoinHandle<()>
where
    G: GatewayNotifier + Clone + Send + Sync + 'static,
    S: ValueStore + Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(DRIFT_INTERVAL);
        // the first tick completes immediately; skip it so values only
        // move after a full interval
        interval.tick().await;
        loop {
            interval.tick().await;
            device.drift_tick(&property).await;
        }
    })
}
