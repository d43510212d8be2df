//! Events — declared event metadata and emitted instances.

use serde::{Deserialize, Serialize};

use crate::id::{DeviceId, EventId};
use crate::time::{self, Timestamp};
use crate::value::PropertyKind;

/// Declared metadata of an event a device may emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Declared payload type, if any.
    #[serde(rename = "type", default)]
    pub kind: Option<PropertyKind>,
}

impl EventDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: PropertyKind) -> Self {
        self.kind = Some(kind);
        self
    }
}

/// An emitted event instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub device: DeviceId,
    pub name: String,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    #[must_use]
    pub fn new(device: DeviceId, name: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            device,
            name: name.into(),
            data,
            timestamp: time::now(),
        }
    }
}
