//! Derived-property rules — coupled updates applied synchronously after a
//! qualifying write.
//!
//! Each rule runs exactly once per write: companion updates go through the
//! device's internal write path, which never re-enters the rules. A device
//! without the companion property is left untouched.

use simthings_app::ports::{GatewayNotifier, ValueStore};
use simthings_domain::value::Value;

use crate::device::SimulatedDevice;

/// Writing this property toggles the simulated camera stream.
const STREAM_ACTIVE: &str = "streamActive";
/// Thermostat operating mode; drives [`HEATING_COOLING`].
const MODE: &str = "mode";
/// Color and color-temperature writes drive [`COLOR_MODE`].
const COLOR: &str = "color";
const COLOR_TEMPERATURE: &str = "colorTemperature";

const HEATING_COOLING: &str = "heatingCooling";
const COLOR_MODE: &str = "colorMode";

/// Apply the coupled updates for a committed write of `value` to `name`.
pub(crate) async fn apply<G, S>(device: &SimulatedDevice<G, S>, name: &str, value: &Value)
where
    G: GatewayNotifier + Clone + Send + Sync + 'static,
    S: ValueStore + Clone + Send + Sync + 'static,
{
    match name {
        STREAM_ACTIVE => {
            if value.is_truthy() {
                device.ctx().stream.start();
            } else {
                device.ctx().stream.stop().await;
            }
        }
        MODE => {
            let paired = match value {
                Value::String(mode) => match mode.as_str() {
                    "heat" => Some("heating"),
                    "cool" => Some("cooling"),
                    "off" => Some("off"),
                    // any other mode leaves the companion untouched
                    _ => None,
                },
                _ => None,
            };
            if let Some(state) = paired {
                device
                    .write_internal(HEATING_COOLING, Value::String(state.to_string()))
                    .await;
            }
        }
        COLOR => {
            device
                .write_internal(COLOR_MODE, Value::String("color".to_string()))
                .await;
        }
        COLOR_TEMPERATURE => {
            device
                .write_internal(COLOR_MODE, Value::String("temperature".to_string()))
                .await;
        }
        _ => {}
    }
}
