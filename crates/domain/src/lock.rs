//! Lock state vocabulary — the discrete states of the `locked` property.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// Discrete state of a lock.
///
/// `Unknown` is the transient state while a lock/unlock attempt is in
/// flight; `Jammed` is the probabilistic failure outcome and is left by any
/// subsequent attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockState {
    Locked,
    Unlocked,
    Jammed,
    #[default]
    Unknown,
}

impl LockState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
            Self::Jammed => "jammed",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a property value, if it holds a known lock state.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => match s.as_str() {
                "locked" => Some(Self::Locked),
                "unlocked" => Some(Self::Unlocked),
                "jammed" => Some(Self::Jammed),
                "unknown" => Some(Self::Unknown),
                _ => None,
            },
            _ => None,
        }
    }

    /// The property value representing this state.
    #[must_use]
    pub fn to_value(self) -> Value {
        Value::String(self.as_str().to_string())
    }
}

impl std::fmt::Display for LockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
