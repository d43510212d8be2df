//! Port definitions — traits that the host gateway and storage adapters
//! implement.
//!
//! Ports are the boundaries between the simulation core and the outside
//! world. They are defined here so both the simulation engine and the
//! adapter layer can depend on them without circular dependencies.

pub mod gateway;
pub mod storage;

pub use gateway::{GatewayNotifier, Notification};
pub use storage::ValueStore;
