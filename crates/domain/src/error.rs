//! Common error types used across the workspace.
//!
//! Every layer speaks [`SimThingsError`] at its port boundary. Adapters
//! define their own typed errors and convert via `From` (see the storage
//! adapter's `StorageError`). No failure in the simulation core is fatal to
//! the process: everything is either returned to the immediate caller or
//! logged and absorbed.

use crate::id::DeviceId;

/// Top-level error type returned across port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum SimThingsError {
    /// A write was attempted on a read-only property.
    #[error(transparent)]
    ReadOnly(#[from] ReadOnlyViolation),

    /// A device, property, or action lookup failed.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// A device template violated a structural invariant.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The supplied PIN was wrong, or the device takes no PIN at all.
    #[error("invalid PIN")]
    InvalidPin,

    /// The supplied credentials were wrong, or the device takes none.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// An error bubbled up from a storage adapter.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Write attempted on a read-only property.
#[derive(Debug, thiserror::Error)]
#[error("property '{property}' of device '{device}' is read-only")]
pub struct ReadOnlyViolation {
    pub device: DeviceId,
    pub property: String,
}

/// Lookup failure, carrying the entity kind and the id that missed.
#[derive(Debug, thiserror::Error)]
#[error("{entity} '{id}' not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Structural invariant violations in device templates.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// A device template must carry a non-empty title.
    #[error("device title must not be empty")]
    EmptyTitle,

    /// Property names within a device must be unique.
    #[error("duplicate property name '{0}'")]
    DuplicateProperty(String),
}
