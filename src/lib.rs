//! HelioSentinel Core Library
//!
//! Telemetry ingestion and analytics core for photovoltaic installations:
//! short-horizon power prediction, module anomaly detection with maintenance
//! recommendations, and multi-objective configuration optimization. Each
//! analytic degrades gracefully from an optional learned model to a
//! deterministic fallback, so the system is fully functional with no model
//! artifacts present.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod ingestion;
pub mod migrator;
pub mod ml;
pub mod services;

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::events::{Event, EventSender};
use crate::ml::registry::CapabilityRegistry;
use crate::ml::ModelLoader;
use crate::services::AppServices;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<db::DbPool>,
    pub config: config::AppConfig,
    pub event_sender: Arc<EventSender>,
    pub registry: Arc<CapabilityRegistry>,
    pub services: AppServices,
}

impl AppState {
    /// Connects to the database, optionally runs migrations, and wires up
    /// the capability registry and services. Returns the state together with
    /// the event channel receiver for the caller's event consumer.
    pub async fn initialize(
        config: config::AppConfig,
        loader: Arc<dyn ModelLoader>,
    ) -> Result<(Self, mpsc::Receiver<Event>), anyhow::Error> {
        let pool = db::establish_connection_from_app_config(&config).await?;
        if config.auto_migrate {
            db::run_migrations(&pool).await?;
        }

        let db = Arc::new(pool);
        let (event_sender, event_rx) = events::event_channel(1024);
        let event_sender = Arc::new(event_sender);
        let registry = Arc::new(CapabilityRegistry::new(loader));
        let services = AppServices::build(db.clone(), registry.clone(), event_sender.clone());

        Ok((
            Self {
                db,
                config,
                event_sender,
                registry,
                services,
            },
            event_rx,
        ))
    }
}
