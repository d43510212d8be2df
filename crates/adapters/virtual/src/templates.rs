//! Built-in device template catalog.
//!
//! One template per simulated thing. Everything here is declarative data;
//! the behavior lives in the shared engine.

use simthings_domain::action::{ActionDescriptor, ActionEffect};
use simthings_domain::device::{DeviceTemplate, Pairing};
use simthings_domain::event::EventDescriptor;
use simthings_domain::id::DeviceId;
use simthings_domain::lock::LockState;
use simthings_domain::property::{Link, PropertyDescriptor, PropertyTemplate};
use simthings_domain::value::{PropertyKind, Value};

/// The built-in catalog.
#[must_use]
pub fn builtin_templates() -> Vec<DeviceTemplate> {
    vec![
        light(),
        switch(),
        temperature_sensor(),
        motion_sensor(),
        smoke_alarm(),
        lock(),
        thermostat(),
        camera(),
        widget(),
    ]
}

fn enum_values(options: &[&str]) -> Vec<Value> {
    options
        .iter()
        .map(|option| Value::String((*option).to_string()))
        .collect()
}

fn light() -> DeviceTemplate {
    DeviceTemplate::new(DeviceId::new("virtual-light"), "Virtual Light")
        .capability("Light")
        .capability("OnOffSwitch")
        .capability("ColorControl")
        .property(PropertyTemplate::new(
            PropertyDescriptor::new("on", PropertyKind::Boolean)
                .title("On/Off")
                .capability("OnOffProperty"),
            Value::Bool(false),
        ))
        .property(PropertyTemplate::new(
            PropertyDescriptor::new("brightness", PropertyKind::Integer)
                .title("Brightness")
                .unit("percent")
                .range(0.0, 100.0)
                .capability("LevelProperty"),
            Value::Int(50),
        ))
        .property(PropertyTemplate::new(
            PropertyDescriptor::new("color", PropertyKind::String)
                .title("Color")
                .capability("ColorProperty"),
            Value::String("#ffffff".to_string()),
        ))
        .property(PropertyTemplate::new(
            PropertyDescriptor::new("colorTemperature", PropertyKind::Integer)
                .title("Color Temperature")
                .unit("kelvin")
                .range(1700.0, 6500.0)
                .capability("ColorTemperatureProperty"),
            Value::Int(2700),
        ))
        .property(PropertyTemplate::new(
            PropertyDescriptor::new("colorMode", PropertyKind::String)
                .title("Color Mode")
                .enumeration(enum_values(&["color", "temperature"]))
                .read_only()
                .capability("ColorModeProperty"),
            Value::String("temperature".to_string()),
        ))
}

fn switch() -> DeviceTemplate {
    DeviceTemplate::new(DeviceId::new("virtual-switch"), "Virtual Switch")
        .capability("OnOffSwitch")
        .property(PropertyTemplate::new(
            PropertyDescriptor::new("on", PropertyKind::Boolean)
                .title("On/Off")
                .capability("OnOffProperty"),
            Value::Bool(false),
        ))
}

fn temperature_sensor() -> DeviceTemplate {
    DeviceTemplate::new(
        DeviceId::new("virtual-temperature-sensor"),
        "Virtual Temperature Sensor",
    )
    .capability("TemperatureSensor")
    .property(PropertyTemplate::new(
        PropertyDescriptor::new("temperature", PropertyKind::Number)
            .title("Temperature")
            .unit("degree celsius")
            .range(-20.0, 60.0)
            .read_only()
            .capability("TemperatureProperty"),
        Value::Float(21.5),
    ))
}

fn motion_sensor() -> DeviceTemplate {
    DeviceTemplate::new(DeviceId::new("virtual-motion-sensor"), "Virtual Motion Sensor")
        .capability("MotionSensor")
        .property(PropertyTemplate::new(
            PropertyDescriptor::new("motion", PropertyKind::Boolean)
                .title("Motion")
                .read_only()
                .capability("MotionProperty"),
            Value::Bool(false),
        ))
}

fn smoke_alarm() -> DeviceTemplate {
    DeviceTemplate::new(DeviceId::new("virtual-smoke-alarm"), "Virtual Smoke Alarm")
        .capability("SmokeSensor")
        .capability("Alarm")
        .property(PropertyTemplate::new(
            PropertyDescriptor::new("smoke", PropertyKind::Boolean)
                .title("Smoke")
                .read_only()
                .capability("SmokeProperty"),
            Value::Bool(false),
        ))
        .property(PropertyTemplate::new(
            PropertyDescriptor::new("alarm", PropertyKind::Boolean)
                .title("Alarm")
                .read_only()
                .capability("AlarmProperty"),
            Value::Bool(false),
        ))
        .action(
            ActionDescriptor::new(
                "trigger",
                ActionEffect::SetBool {
                    property: "alarm".to_string(),
                    value: true,
                    event: "alarm".to_string(),
                },
            )
            .title("Trigger")
            .description("Raise the alarm"),
        )
        .action(
            ActionDescriptor::new(
                "silence",
                ActionEffect::SetBool {
                    property: "alarm".to_string(),
                    value: false,
                    event: "silenced".to_string(),
                },
            )
            .title("Silence")
            .description("Silence the alarm"),
        )
        .event(EventDescriptor::new("alarm").description("The alarm was raised"))
        .event(EventDescriptor::new("silenced").description("The alarm was silenced"))
}

fn lock() -> DeviceTemplate {
    DeviceTemplate::new(DeviceId::new("virtual-lock"), "Virtual Lock")
        .capability("Lock")
        .property(PropertyTemplate::new(
            PropertyDescriptor::new("locked", PropertyKind::String)
                .title("State")
                .enumeration(enum_values(&["locked", "unlocked", "jammed", "unknown"]))
                .read_only()
                .capability("LockedProperty"),
            LockState::Locked.to_value(),
        ))
        .action(
            ActionDescriptor::new(
                "lock",
                ActionEffect::Lock {
                    target: LockState::Locked,
                },
            )
            .title("Lock")
            .description("Lock the locking mechanism"),
        )
        .action(
            ActionDescriptor::new(
                "unlock",
                ActionEffect::Lock {
                    target: LockState::Unlocked,
                },
            )
            .title("Unlock")
            .description("Unlock the locking mechanism"),
        )
        .pairing(Pairing::pin("^[0-9]{4}$"))
}

fn thermostat() -> DeviceTemplate {
    DeviceTemplate::new(DeviceId::new("virtual-thermostat"), "Virtual Thermostat")
        .capability("Thermostat")
        .property(PropertyTemplate::new(
            PropertyDescriptor::new("temperature", PropertyKind::Number)
                .title("Temperature")
                .unit("degree celsius")
                .range(-20.0, 60.0)
                .read_only()
                .capability("TemperatureProperty"),
            Value::Float(19.0),
        ))
        .property(PropertyTemplate::new(
            PropertyDescriptor::new("targetTemperature", PropertyKind::Number)
                .title("Target Temperature")
                .unit("degree celsius")
                .range(10.0, 38.0)
                .step(0.5)
                .capability("TargetTemperatureProperty"),
            Value::Float(21.0),
        ))
        .property(PropertyTemplate::new(
            PropertyDescriptor::new("mode", PropertyKind::String)
                .title("Mode")
                .enumeration(enum_values(&["off", "heat", "cool"]))
                .capability("ThermostatModeProperty"),
            Value::String("off".to_string()),
        ))
        .property(PropertyTemplate::new(
            PropertyDescriptor::new("heatingCooling", PropertyKind::String)
                .title("Heating/Cooling")
                .enumeration(enum_values(&["off", "heating", "cooling"]))
                .read_only()
                .capability("HeatingCoolingProperty"),
            Value::String("off".to_string()),
        ))
        .pairing(Pairing::credentials())
}

fn camera() -> DeviceTemplate {
    DeviceTemplate::new(DeviceId::new("virtual-camera"), "Virtual Camera")
        .capability("VideoCamera")
        .property(PropertyTemplate::new(
            PropertyDescriptor::new("streamActive", PropertyKind::Boolean)
                .title("Streaming")
                .capability("OnOffProperty"),
            Value::Bool(false),
        ))
        .property(PropertyTemplate::new(
            PropertyDescriptor::new("stream", PropertyKind::String)
                .title("Stream")
                .read_only()
                .capability("VideoProperty")
                .link(Link {
                    rel: "alternate".to_string(),
                    href: "/media/simthings/index.m3u8".to_string(),
                    media_type: Some("application/vnd.apple.mpegurl".to_string()),
                }),
            Value::String("/media/simthings/index.m3u8".to_string()),
        ))
        .property(PropertyTemplate::new(
            PropertyDescriptor::new("snapshot", PropertyKind::String)
                .title("Snapshot")
                .read_only()
                .capability("ImageProperty")
                .link(Link {
                    rel: "alternate".to_string(),
                    href: "/media/simthings/snapshot.jpg".to_string(),
                    media_type: Some("image/jpeg".to_string()),
                }),
            Value::String("/media/simthings/snapshot.jpg".to_string()),
        ))
}

fn widget() -> DeviceTemplate {
    DeviceTemplate::new(DeviceId::new("virtual-widget"), "Virtual Widget")
        .action(
            ActionDescriptor::new(
                "ping",
                ActionEffect::EmitEvent {
                    event: "pong".to_string(),
                },
            )
            .title("Ping")
            .description("Emit a pong event with a random payload"),
        )
        .event(
            EventDescriptor::new("pong")
                .description("Reply to a ping")
                .kind(PropertyKind::Integer),
        )
}
