//! Telemetry normalization: declarative field schemas and the pure
//! validation/coercion step that turns raw record mappings into typed
//! feature vectors.
//!
//! All field defaults live in the schema tables here rather than at call
//! sites; the four schemas cover stored telemetry (solar, environmental)
//! and analytic inputs (performance, anomaly).

pub mod normalizer;
pub mod schema;

pub use normalizer::{normalize, normalize_at, FeatureVector, NormalizedRecord, RawRecord};
pub use schema::{RecordSchema, ANOMALY_INPUT, ENVIRONMENTAL_READING, PERFORMANCE_INPUT, SOLAR_READING};
