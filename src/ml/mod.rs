/*!
 * # Analytics Module
 *
 * Learned-model contracts, the capability gateway, and the deterministic
 * fallbacks for the three analytics (performance prediction, anomaly
 * classification, configuration optimization).
 *
 * Learned models are optional external artifacts. Every capability resolves
 * at first use to either a learned implementation or its fallback, and the
 * fallback path is always available, so the system runs correctly with zero
 * model artifacts present.
 */

pub mod anomaly_detection;
pub mod optimization;
pub mod performance;
pub mod registry;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ingestion::FeatureVector;

use anomaly_detection::Classification;
use optimization::{EnvironmentalHistory, ParetoCandidate, SearchKnobs};

/// One of the three analytic capabilities.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Capability {
    Performance,
    Anomaly,
    Optimization,
}

/// Errors raised by learned model implementations. Load errors never cross
/// the gateway boundary; call errors surface as an unavailable capability.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model artifact not found: {0}")]
    ArtifactMissing(String),
    #[error("model load failed: {0}")]
    LoadFailed(String),
    #[error("model call failed: {0}")]
    CallFailed(String),
}

/// Learned power-output predictor: feature vector -> watts.
pub trait PerformanceModel: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError>;
}

/// Learned anomaly detector: batch of feature vectors -> classifications in
/// the same order.
pub trait AnomalyModel: Send + Sync {
    fn classify(&self, batch: &[FeatureVector]) -> Result<Vec<Classification>, ModelError>;
}

/// Learned population-based optimizer returning a Pareto front.
pub trait OptimizationModel: Send + Sync {
    fn optimize(
        &self,
        history: &EnvironmentalHistory,
        technology: &str,
        knobs: &SearchKnobs,
    ) -> Result<Vec<ParetoCandidate>, ModelError>;
}

/// Resolves learned model artifacts. Implementations may read from disk, a
/// model registry service, or anywhere else; the gateway calls each loader
/// method at most once per process.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load_performance(&self) -> Result<Arc<dyn PerformanceModel>, ModelError>;
    async fn load_anomaly(&self) -> Result<Arc<dyn AnomalyModel>, ModelError>;
    async fn load_optimization(&self) -> Result<Arc<dyn OptimizationModel>, ModelError>;
}

/// Loader for deployments without learned artifacts: every capability
/// resolves to its fallback.
#[derive(Debug, Default, Clone)]
pub struct NullModelLoader;

#[async_trait]
impl ModelLoader for NullModelLoader {
    async fn load_performance(&self) -> Result<Arc<dyn PerformanceModel>, ModelError> {
        Err(ModelError::ArtifactMissing("performance".into()))
    }

    async fn load_anomaly(&self) -> Result<Arc<dyn AnomalyModel>, ModelError> {
        Err(ModelError::ArtifactMissing("anomaly".into()))
    }

    async fn load_optimization(&self) -> Result<Arc<dyn OptimizationModel>, ModelError> {
        Err(ModelError::ArtifactMissing("optimization".into()))
    }
}

/// Rounds to `places` decimal places.
pub(crate) fn round_dp(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
