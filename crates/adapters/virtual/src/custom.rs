//! Custom device ingestion — user-supplied descriptors normalized into
//! device templates.
//!
//! Normalization is best-effort by design: a malformed descriptor is
//! coerced into something instantiable, never rejected, and each descriptor
//! is processed independently of the rest of the batch.

use std::collections::BTreeMap;

use serde::Deserialize;

use simthings_domain::action::{ActionDescriptor, ActionEffect};
use simthings_domain::device::DeviceTemplate;
use simthings_domain::event::EventDescriptor;
use simthings_domain::id::DeviceId;
use simthings_domain::property::{PropertyDescriptor, PropertyTemplate};
use simthings_domain::value::{PropertyKind, Value};

/// Title used when a descriptor omits one.
const DEFAULT_TITLE: &str = "Custom Device";

/// A user-supplied device descriptor, as found in the adapter
/// configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomDeviceDescriptor {
    /// Stable id; a random `custom-<uuid>` one is assigned when absent.
    pub id: Option<String>,
    pub title: Option<String>,
    pub capabilities: Vec<String>,
    pub properties: BTreeMap<String, CustomProperty>,
    pub actions: Vec<CustomAction>,
    pub events: Vec<String>,
}

/// A user-supplied property declaration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CustomProperty {
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<PropertyKind>,
    pub unit: Option<String>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub step: Option<f64>,
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,
    pub read_only: bool,
    #[serde(rename = "@type")]
    pub capability: Option<String>,
    pub default: Option<Value>,
}

/// A user-supplied action declaration. Custom actions get the generic
/// emit-an-event effect, with the event named after the action.
#[derive(Debug, Clone, Deserialize)]
pub struct CustomAction {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// Normalize a user-supplied descriptor into a device template.
#[must_use]
pub(crate) fn normalize(descriptor: &CustomDeviceDescriptor) -> DeviceTemplate {
    let id = descriptor
        .id
        .clone()
        .map_or_else(DeviceId::random_custom, DeviceId::new);
    let title = descriptor
        .title
        .clone()
        .filter(|title| !title.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let mut template = DeviceTemplate::new(id, title);
    for tag in &descriptor.capabilities {
        template = template.capability(tag.clone());
    }
    for (name, property) in &descriptor.properties {
        template = template.property(normalize_property(name, property));
    }
    for action in &descriptor.actions {
        let mut action_descriptor = ActionDescriptor::new(
            action.name.clone(),
            ActionEffect::EmitEvent {
                event: action.name.clone(),
            },
        );
        if let Some(action_title) = &action.title {
            action_descriptor = action_descriptor.title(action_title.clone());
        }
        template = template
            .action(action_descriptor)
            .event(EventDescriptor::new(action.name.clone()));
    }
    for event in &descriptor.events {
        template = template.event(EventDescriptor::new(event.clone()));
    }
    template
}

/// Normalize one property declaration: strip constraint fields that make no
/// sense for the declared type, collapse degenerate ranges, and coerce the
/// supplied default into the declared type.
fn normalize_property(name: &str, property: &CustomProperty) -> PropertyTemplate {
    let numeric = matches!(
        property.kind,
        Some(PropertyKind::Integer | PropertyKind::Number)
    );

    let (minimum, maximum) = if !numeric {
        (None, None)
    } else {
        match (property.minimum, property.maximum) {
            // an empty range constrains nothing
            (Some(lo), Some(hi)) if lo == hi => (None, None),
            bounds => bounds,
        }
    };

    let descriptor = PropertyDescriptor {
        name: name.to_string(),
        title: property.title.clone(),
        kind: property.kind,
        unit: property.unit.clone().filter(|_| numeric),
        minimum,
        maximum,
        step: property.step.filter(|_| numeric),
        enum_values: property.enum_values.clone(),
        read_only: property.read_only,
        capability: property.capability.clone(),
        links: Vec::new(),
    };

    let default = coerce_default(property.kind, property.default.clone());
    PropertyTemplate::new(descriptor, default)
}

/// Coerce the supplied default into the declared type. Mismatches fall back
/// to the type's neutral value: `false` for booleans, `null` for numbers,
/// string interpolation for strings.
fn coerce_default(kind: Option<PropertyKind>, default: Option<Value>) -> Value {
    let Some(kind) = kind else {
        return default.unwrap_or(Value::Null);
    };
    let supplied = default.unwrap_or(Value::Null);
    match kind {
        PropertyKind::Boolean => Value::Bool(supplied.is_truthy()),
        PropertyKind::Integer => match &supplied {
            Value::Int(i) => Value::Int(*i),
            Value::Float(f) if f.is_finite() => Value::Int(*f as i64),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .or_else(|_| s.trim().parse::<f64>().map(|f| Value::Int(f as i64)))
                .unwrap_or(Value::Null),
            _ => Value::Null,
        },
        PropertyKind::Number => match &supplied {
            Value::Int(_) | Value::Float(_) => supplied,
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .unwrap_or(Value::Null),
            _ => Value::Null,
        },
        PropertyKind::String => match supplied {
            Value::String(_) => supplied,
            other => Value::String(other.to_string()),
        },
        PropertyKind::Null => Value::Null,
    }
}
