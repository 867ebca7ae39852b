//! Persistence entities for telemetry, derived analytics, and metrics
//! snapshots. All records are append-only except `anomaly`, whose status
//! carries the detection lifecycle.

pub mod anomaly;
pub mod environmental_reading;
pub mod optimization_result;
pub mod prediction;
pub mod solar_reading;
pub mod system_metrics;
