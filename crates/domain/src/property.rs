//! Property descriptors — the immutable, gateway-facing metadata of a
//! property.
//!
//! Devices are not subclassed per capability; a descriptor is a plain data
//! record (type tag, constraints, capability tag) interpreted by shared
//! simulation logic.

use serde::{Deserialize, Serialize};

use crate::value::{PropertyKind, Value};

/// Capability tag marking a string property as a color; drift generates
/// `#rrggbb` values for it instead of opaque tokens.
pub const COLOR_CAPABILITY: &str = "ColorProperty";

/// External media link attached to a property (e.g. a camera stream
/// manifest).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
    #[serde(rename = "mediaType", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
}

/// Immutable description of a single device property.
///
/// Field names follow the gateway's wire conventions (`readOnly`, `@type`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<PropertyKind>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
    #[serde(default)]
    pub step: Option<f64>,
    #[serde(rename = "enum", default)]
    pub enum_values: Option<Vec<Value>>,
    #[serde(rename = "readOnly", default)]
    pub read_only: bool,
    #[serde(rename = "@type", default)]
    pub capability: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl PropertyDescriptor {
    /// Minimal descriptor with a declared type; everything else is filled
    /// with the chained setters below.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            title: None,
            kind: Some(kind),
            unit: None,
            minimum: None,
            maximum: None,
            step: None,
            enum_values: None,
            read_only: false,
            capability: None,
            links: Vec::new(),
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn range(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    #[must_use]
    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    #[must_use]
    pub fn enumeration(mut self, values: Vec<Value>) -> Self {
        self.enum_values = Some(values);
        self
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    #[must_use]
    pub fn capability(mut self, tag: impl Into<String>) -> Self {
        self.capability = Some(tag.into());
        self
    }

    #[must_use]
    pub fn link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    /// Whether the declared type is numeric.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self.kind,
            Some(PropertyKind::Integer | PropertyKind::Number)
        )
    }

    /// Whether this property carries the color capability tag.
    #[must_use]
    pub fn is_color(&self) -> bool {
        self.capability.as_deref() == Some(COLOR_CAPABILITY)
    }
}

/// A descriptor plus its default seed value, as carried by device templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyTemplate {
    pub descriptor: PropertyDescriptor,
    pub default: Value,
}

impl PropertyTemplate {
    #[must_use]
    pub fn new(descriptor: PropertyDescriptor, default: Value) -> Self {
        Self {
            descriptor,
            default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_descriptor_with_chained_setters() {
        let descriptor = PropertyDescriptor::new("brightness", PropertyKind::Integer)
            .title("Brightness")
            .unit("percent")
            .range(0.0, 100.0)
            .capability("LevelProperty");

        assert_eq!(descriptor.name, "brightness");
        assert_eq!(descriptor.minimum, Some(0.0));
        assert_eq!(descriptor.maximum, Some(100.0));
        assert_eq!(descriptor.unit.as_deref(), Some("percent"));
        assert!(!descriptor.read_only);
        assert!(descriptor.is_numeric());
    }

    #[test]
    fn should_recognize_color_capability() {
        let descriptor =
            PropertyDescriptor::new("color", PropertyKind::String).capability(COLOR_CAPABILITY);
        assert!(descriptor.is_color());

        let plain = PropertyDescriptor::new("name", PropertyKind::String);
        assert!(!plain.is_color());
    }

    #[test]
    fn should_deserialize_gateway_wire_names() {
        let json = r##"{
            "name": "colorMode",
            "type": "string",
            "readOnly": true,
            "@type": "ColorModeProperty",
            "enum": ["color", "temperature"]
        }"##;
        let descriptor: PropertyDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.kind, Some(PropertyKind::String));
        assert!(descriptor.read_only);
        assert_eq!(descriptor.capability.as_deref(), Some("ColorModeProperty"));
        assert_eq!(
            descriptor.enum_values,
            Some(vec![
                Value::String("color".to_string()),
                Value::String("temperature".to_string()),
            ])
        );
    }

    #[test]
    fn should_not_be_numeric_without_numeric_kind() {
        let descriptor = PropertyDescriptor::new("on", PropertyKind::Boolean);
        assert!(!descriptor.is_numeric());
    }
}
