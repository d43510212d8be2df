//! # simthingsd — simthings daemon
//!
//! Composition root that wires the virtual device simulator to its
//! collaborators and runs until interrupted.
//!
//! ## Responsibilities
//! - Parse configuration (TOML file, env var overrides)
//! - Initialize tracing
//! - Initialize the `SQLite` pool and run migrations
//! - Construct the notification bus and the virtual adapter
//! - Run discovery, then forward notifications to the log until a real
//!   gateway attaches
//! - Handle graceful shutdown (SIGINT) and tear the adapter down
//!
//! The simulation logic is cooperative and timer-driven, so the daemon
//! runs on a current-thread runtime.
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no simulation logic belongs here.

mod config;

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use simthings_adapter_storage_sqlite_sqlx::{Config as DbConfig, SqliteValueRepository};
use simthings_adapter_virtual::VirtualAdapter;
use simthings_app::event_bus::InProcessEventBus;
use simthings_app::ports::Notification;

use config::Config;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Storage
    let db = DbConfig {
        database_url: config.database.url.clone(),
    }
    .build()
    .await?;
    let store = Arc::new(SqliteValueRepository::new(db.pool().clone()));

    // Notification bus (in-process stand-in for the host gateway)
    let bus = Arc::new(InProcessEventBus::new(256));

    // Simulation engine
    let adapter = VirtualAdapter::new(Arc::clone(&bus), store, config.simulator).await;
    let added = adapter.add_all().await;
    tracing::info!(devices = added.len(), "virtual devices registered");

    let log_task = tokio::spawn(forward_to_log(bus.subscribe()));

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");
    adapter.teardown().await;
    log_task.abort();

    Ok(())
}

/// Forward bus notifications to the log until the bus closes.
async fn forward_to_log(mut rx: broadcast::Receiver<Notification>) {
    loop {
        match rx.recv().await {
            Ok(notification) => log_notification(&notification),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "notification log lagging");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn log_notification(notification: &Notification) {
    match notification {
        Notification::DeviceAdded { device, title } => {
            tracing::info!(%device, %title, "device added");
        }
        Notification::PropertyChanged {
            device,
            property,
            value,
        } => {
            tracing::info!(%device, %property, %value, "property changed");
        }
        Notification::Event(event) => {
            tracing::info!(device = %event.device, name = %event.name, data = %event.data, "event");
        }
        Notification::ActionStatus(invocation) => {
            tracing::info!(
                device = %invocation.device,
                action = %invocation.action,
                status = ?invocation.status,
                "action status"
            );
        }
    }
}
