#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use heliosentinel::db::{establish_connection_with_config, run_migrations, DbConfig, DbPool};
use heliosentinel::events::{event_channel, Event};
use heliosentinel::ingestion::RawRecord;
use heliosentinel::ml::registry::CapabilityRegistry;
use heliosentinel::ml::{ModelLoader, NullModelLoader};
use heliosentinel::services::AppServices;
use serde_json::{json, Value};
use tokio::sync::mpsc;

pub struct TestContext {
    pub services: AppServices,
    pub registry: Arc<CapabilityRegistry>,
    pub events: mpsc::Receiver<Event>,
    pub db: Arc<DbPool>,
}

/// Fresh in-memory database with the full schema applied. A single
/// connection keeps every query on the same sqlite instance.
pub async fn setup_db() -> Arc<DbPool> {
    let config = DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        connect_timeout: Duration::from_secs(5),
    };
    let pool = establish_connection_with_config(&config)
        .await
        .expect("Failed to create in-memory database");
    run_migrations(&pool).await.expect("Failed to run migrations");
    Arc::new(pool)
}

pub async fn setup() -> TestContext {
    setup_with_loader(Arc::new(NullModelLoader)).await
}

pub async fn setup_with_loader(loader: Arc<dyn ModelLoader>) -> TestContext {
    let db = setup_db().await;
    let (event_sender, events) = event_channel(256);
    let registry = Arc::new(CapabilityRegistry::new(loader));
    let services = AppServices::build(db.clone(), registry.clone(), Arc::new(event_sender));

    TestContext {
        services,
        registry,
        events,
        db,
    }
}

pub fn record(value: Value) -> RawRecord {
    value
        .as_object()
        .expect("test record must be a JSON object")
        .clone()
}

/// A healthy solar reading for the given module.
pub fn solar_row(module_id: &str) -> RawRecord {
    record(json!({
        "module_id": module_id,
        "open_circuit_voltage": 38.4,
        "max_power_voltage": 31.2,
        "max_power_current": 8.3,
        "short_circuit_current": 8.9,
        "max_power": 258.9,
        "efficiency": 0.182,
        "cell_temperature": 44.5,
    }))
}

pub fn environmental_row(location_id: &str) -> RawRecord {
    record(json!({
        "location_id": location_id,
        "ambient_temperature": 29.4,
        "irradiance": 865.0,
        "humidity": 71.0,
        "wind_speed": 2.4,
    }))
}

/// An anomaly-classifier input exhibiting gradual degradation.
pub fn degraded_module_input(module_id: &str) -> RawRecord {
    record(json!({
        "module_id": module_id,
        "voltage_oc": 36.1,
        "voltage_mp": 29.0,
        "current_mp": 7.2,
        "current_sc": 7.9,
        "power_max": 240.0,
        "efficiency": 0.09,
        "cell_temp": 48.0,
    }))
}

/// An anomaly-classifier input well inside normal operating bounds.
pub fn healthy_module_input(module_id: &str) -> RawRecord {
    record(json!({
        "module_id": module_id,
        "voltage_oc": 38.4,
        "voltage_mp": 31.2,
        "current_mp": 8.3,
        "current_sc": 8.9,
        "power_max": 260.0,
        "efficiency": 0.18,
        "cell_temp": 45.0,
    }))
}
