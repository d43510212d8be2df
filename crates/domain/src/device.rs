//! Device templates — identity, capabilities, properties, actions, events,
//! and pairing requirements of a simulated thing.

use serde::{Deserialize, Serialize};

use crate::action::ActionDescriptor;
use crate::error::ValidationError;
use crate::event::EventDescriptor;
use crate::id::DeviceId;
use crate::property::PropertyTemplate;

/// Pairing requirements advertised by a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    #[serde(default)]
    pub pin_required: bool,
    #[serde(default)]
    pub pin_pattern: Option<String>,
    #[serde(default)]
    pub credentials_required: bool,
}

impl Pairing {
    /// No pairing requirements.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Require a PIN matching the given pattern.
    #[must_use]
    pub fn pin(pattern: impl Into<String>) -> Self {
        Self {
            pin_required: true,
            pin_pattern: Some(pattern.into()),
            credentials_required: false,
        }
    }

    /// Require username/password credentials.
    #[must_use]
    pub fn credentials() -> Self {
        Self {
            pin_required: false,
            pin_pattern: None,
            credentials_required: true,
        }
    }
}

/// Complete description of a simulated device.
///
/// The property set is fixed here: a live device never gains or loses
/// properties after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceTemplate {
    pub id: DeviceId,
    pub title: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub properties: Vec<PropertyTemplate>,
    #[serde(default)]
    pub actions: Vec<ActionDescriptor>,
    #[serde(default)]
    pub events: Vec<EventDescriptor>,
    #[serde(default)]
    pub pairing: Pairing,
}

impl DeviceTemplate {
    #[must_use]
    pub fn new(id: DeviceId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            capabilities: Vec::new(),
            properties: Vec::new(),
            actions: Vec::new(),
            events: Vec::new(),
            pairing: Pairing::none(),
        }
    }

    #[must_use]
    pub fn capability(mut self, tag: impl Into<String>) -> Self {
        self.capabilities.push(tag.into());
        self
    }

    #[must_use]
    pub fn property(mut self, property: PropertyTemplate) -> Self {
        self.properties.push(property);
        self
    }

    #[must_use]
    pub fn action(mut self, action: ActionDescriptor) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn event(mut self, event: EventDescriptor) -> Self {
        self.events.push(event);
        self
    }

    #[must_use]
    pub fn pairing(mut self, pairing: Pairing) -> Self {
        self.pairing = pairing;
        self
    }

    /// Check structural invariants: non-empty title, unique property names.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming the violated invariant.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        let mut seen = std::collections::HashSet::new();
        for property in &self.properties {
            if !seen.insert(property.descriptor.name.as_str()) {
                return Err(ValidationError::DuplicateProperty(
                    property.descriptor.name.clone(),
                ));
            }
        }
        Ok(())
    }
}
