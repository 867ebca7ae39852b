use std::sync::Arc;

use serde::Serialize;
use strum::IntoEnumIterator;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use super::{AnomalyModel, Capability, ModelLoader, OptimizationModel, PerformanceModel};

fn describe(capability: Capability) -> &'static str {
    match capability {
        Capability::Performance => "PV performance predictor for tropical climates",
        Capability::Anomaly => "Solar module anomaly and fault detector",
        Capability::Optimization => "Multi-objective PV configuration optimizer",
    }
}

/// How a capability resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionState {
    /// Learned model loaded and selected.
    Loaded,
    /// Load failed or no artifact; the deterministic fallback is selected
    /// for the rest of the process lifetime.
    Fallback,
    /// Capability has not been used yet.
    Unresolved,
}

/// Outcome of a capability resolution, fixed at first use.
#[derive(Clone)]
pub enum Resolution<T> {
    Learned(T),
    Fallback,
}

impl<T> Resolution<T> {
    fn state(&self) -> ResolutionState {
        match self {
            Resolution::Learned(_) => ResolutionState::Loaded,
            Resolution::Fallback => ResolutionState::Fallback,
        }
    }
}

/// Per-capability entry of a status report.
#[derive(Debug, Clone, Serialize)]
pub struct CapabilityStatus {
    pub capability: Capability,
    pub state: ResolutionState,
    pub description: &'static str,
}

/// The capability gateway: resolves each analytic capability to a learned
/// implementation or its fallback, exactly once per process.
///
/// One instance is shared across all request handlers. Resolution is
/// single-flight: concurrent first users of a capability serialize on the
/// cell and converge on the same outcome, so a failing loader is invoked at
/// most once and never retried.
pub struct CapabilityRegistry {
    loader: Arc<dyn ModelLoader>,
    performance: OnceCell<Resolution<Arc<dyn PerformanceModel>>>,
    anomaly: OnceCell<Resolution<Arc<dyn AnomalyModel>>>,
    optimization: OnceCell<Resolution<Arc<dyn OptimizationModel>>>,
}

impl CapabilityRegistry {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            performance: OnceCell::new(),
            anomaly: OnceCell::new(),
            optimization: OnceCell::new(),
        }
    }

    /// Resolves the performance capability, loading the learned model on
    /// first use.
    pub async fn performance(&self) -> Resolution<Arc<dyn PerformanceModel>> {
        self.performance
            .get_or_init(|| async {
                match self.loader.load_performance().await {
                    Ok(model) => {
                        info!(capability = %Capability::Performance, "Learned model loaded");
                        Resolution::Learned(model)
                    }
                    Err(e) => {
                        warn!(
                            capability = %Capability::Performance,
                            error = %e,
                            "Learned model unavailable, using physical fallback"
                        );
                        Resolution::Fallback
                    }
                }
            })
            .await
            .clone()
    }

    /// Resolves the anomaly capability, loading the learned detector on
    /// first use.
    pub async fn anomaly(&self) -> Resolution<Arc<dyn AnomalyModel>> {
        self.anomaly
            .get_or_init(|| async {
                match self.loader.load_anomaly().await {
                    Ok(model) => {
                        info!(capability = %Capability::Anomaly, "Learned model loaded");
                        Resolution::Learned(model)
                    }
                    Err(e) => {
                        warn!(
                            capability = %Capability::Anomaly,
                            error = %e,
                            "Learned model unavailable, using rule fallback"
                        );
                        Resolution::Fallback
                    }
                }
            })
            .await
            .clone()
    }

    /// Resolves the optimization capability, loading the learned optimizer
    /// on first use.
    pub async fn optimization(&self) -> Resolution<Arc<dyn OptimizationModel>> {
        self.optimization
            .get_or_init(|| async {
                match self.loader.load_optimization().await {
                    Ok(model) => {
                        info!(capability = %Capability::Optimization, "Learned model loaded");
                        Resolution::Learned(model)
                    }
                    Err(e) => {
                        warn!(
                            capability = %Capability::Optimization,
                            error = %e,
                            "Learned model unavailable, using heuristic fallback"
                        );
                        Resolution::Fallback
                    }
                }
            })
            .await
            .clone()
    }

    /// Current resolution state of one capability, without triggering a
    /// resolution.
    pub fn state(&self, capability: Capability) -> ResolutionState {
        match capability {
            Capability::Performance => self
                .performance
                .get()
                .map_or(ResolutionState::Unresolved, Resolution::state),
            Capability::Anomaly => self
                .anomaly
                .get()
                .map_or(ResolutionState::Unresolved, Resolution::state),
            Capability::Optimization => self
                .optimization
                .get()
                .map_or(ResolutionState::Unresolved, Resolution::state),
        }
    }

    /// Status of all three capabilities, for status reporting.
    pub fn status_report(&self) -> Vec<CapabilityStatus> {
        Capability::iter()
            .map(|capability| CapabilityStatus {
                capability,
                state: self.state(capability),
                description: describe(capability),
            })
            .collect()
    }
}
