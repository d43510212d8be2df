//! # simthings-domain
//!
//! Pure domain model for the simthings virtual device simulator.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **values** (typed property values and their semantic type tags)
//! - Define **property descriptors** (constraints, units, capability tags)
//! - Define **device templates** (identity, properties, actions, events,
//!   pairing requirements)
//! - Define **actions** (descriptors, data-driven effects, invocations)
//! - Define **events** (declared metadata and emitted instances)
//! - Define the **lock state** vocabulary used by the lock state machine
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod action;
pub mod device;
pub mod event;
pub mod lock;
pub mod property;
pub mod value;
