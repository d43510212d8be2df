//! Typed property values and the semantic type tags that constrain them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic type of a property, as declared by its descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Boolean,
    Integer,
    Number,
    String,
    Null,
}

/// A single typed property value.
///
/// Serializes untagged, so values round-trip as plain JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Truthiness cast: `null`, `false`, `0`, `0.0`, `NaN`, and the empty
    /// string are falsy, everything else is truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0 && !f.is_nan(),
            Self::String(s) => !s.is_empty(),
        }
    }

    /// Numeric view of the value, if it holds one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Coerce into the declared property type.
    ///
    /// Boolean properties apply a truthy cast; all other types (and untyped
    /// properties) pass the value through unchanged. Range and enum
    /// constraints are deliberately NOT enforced here: validating against
    /// the descriptor is the caller's responsibility.
    #[must_use]
    pub fn coerce(self, kind: Option<PropertyKind>) -> Self {
        match kind {
            Some(PropertyKind::Boolean) => Self::Bool(self.is_truthy()),
            _ => self,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => b.fmt(f),
            Self::Int(i) => i.fmt(f),
            Self::Float(v) => v.fmt(f),
            Self::String(s) => f.write_str(s),
        }
    }
}
