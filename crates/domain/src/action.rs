//! Actions — named operations invocable against a device.

use serde::{Deserialize, Serialize};

use crate::id::{ActionId, DeviceId};
use crate::lock::LockState;
use crate::time::{self, Timestamp};

/// What an action does when executed.
///
/// Effects are data: the executor interprets this record, so device types
/// never need per-type subclasses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ActionEffect {
    /// Drive the lock state machine toward a target state.
    Lock { target: LockState },
    /// Write a boolean property, then emit an event.
    SetBool {
        property: String,
        value: bool,
        event: String,
    },
    /// Emit an event carrying a randomly generated payload.
    EmitEvent { event: String },
}

/// Declared metadata of an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDescriptor {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// JSON-schema-like description of the accepted input payload.
    /// Declarative only; the executor does not validate against it.
    #[serde(default)]
    pub input: Option<serde_json::Value>,
    pub effect: ActionEffect,
}

impl ActionDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, effect: ActionEffect) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: None,
            input: None,
            effect,
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn input(mut self, schema: serde_json::Value) -> Self {
        self.input = Some(schema);
        self
    }
}

/// Lifecycle status of an action invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Created,
    Started,
    Finished,
}

/// One in-flight or completed execution of an action.
///
/// Ephemeral: created per invocation and discarded after completion; the
/// gateway observes lifecycle changes through status notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionInvocation {
    pub id: ActionId,
    pub device: DeviceId,
    pub action: String,
    pub input: serde_json::Value,
    pub status: ActionStatus,
    pub requested_at: Timestamp,
    pub finished_at: Option<Timestamp>,
}

impl ActionInvocation {
    #[must_use]
    pub fn new(device: DeviceId, action: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            id: ActionId::new(),
            device,
            action: action.into(),
            input,
            status: ActionStatus::Created,
            requested_at: time::now(),
            finished_at: None,
        }
    }

    /// Mark the invocation started.
    pub fn start(&mut self) {
        self.status = ActionStatus::Started;
    }

    /// Mark the invocation finished, stamping the completion time.
    pub fn finish(&mut self) {
        self.status = ActionStatus::Finished;
        self.finished_at = Some(time::now());
    }
}
