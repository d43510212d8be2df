//! # simthings-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter — implements the
//! [`ValueStore`](simthings_app::ports::ValueStore) port on top of sqlx with
//! embedded migrations.
//!
//! ## Dependency rule
//!
//! Depends on `simthings-app` (port traits) and `simthings-domain` only.

mod error;
mod pool;
mod value_repo;

pub use error::StorageError;
pub use pool::{Config, Database};
pub use value_repo::SqliteValueRepository;
