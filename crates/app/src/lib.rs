//! # simthings-app
//!
//! Application layer — **port definitions** and in-process infrastructure.
//!
//! ## Responsibilities
//! - Define **port traits** the outside world plugs into:
//!   - [`GatewayNotifier`](ports::GatewayNotifier) — the narrow contract
//!     toward the host gateway runtime (device registration, property
//!     changes, events, action status)
//!   - [`ValueStore`](ports::ValueStore) — durable key/value persistence
//!     for property values
//! - Provide **in-process infrastructure** that needs no IO:
//!   - [`InProcessEventBus`](event_bus::InProcessEventBus) — broadcast
//!     fan-out of gateway notifications
//!   - [`MemoryValueStore`](memory::MemoryValueStore) — HashMap-backed
//!     value store for tests and ephemeral runs
//!
//! ## Dependency rule
//! Depends on `simthings-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the
//! reverse.

pub mod event_bus;
pub mod memory;
pub mod ports;
