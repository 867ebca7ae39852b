mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use heliosentinel::errors::ServiceError;
use heliosentinel::events::Event;
use heliosentinel::ml::optimization::{
    EnvironmentalHistory, EnvironmentalSample, ModuleConfiguration, ParetoCandidate, SearchKnobs,
};
use heliosentinel::ml::{
    AnomalyModel, Capability, ModelError, ModelLoader, OptimizationModel, PerformanceModel,
};

use common::{setup, setup_with_loader};

fn two_row_history() -> EnvironmentalHistory {
    EnvironmentalHistory::new(vec![
        EnvironmentalSample {
            ambient_temperature: 20.0,
            irradiance: 800.0,
            humidity: 40.0,
        },
        EnvironmentalSample {
            ambient_temperature: 30.0,
            irradiance: 900.0,
            humidity: 60.0,
        },
    ])
}

fn candidate(tilt: f64, objectives: [f64; 4]) -> ParetoCandidate {
    ParetoCandidate {
        parameters: ModuleConfiguration {
            tilt_angle: tilt,
            azimuth_angle: 175.0,
            tracking_mode: 0,
            cleaning_frequency: 14.0,
            cooling_system: 1,
            mppt_voltage: 33.5,
            inverter_efficiency: 0.97,
        },
        objectives,
    }
}

struct ParetoLoader {
    front: Vec<ParetoCandidate>,
}

#[async_trait]
impl ModelLoader for ParetoLoader {
    async fn load_performance(&self) -> Result<Arc<dyn PerformanceModel>, ModelError> {
        Err(ModelError::ArtifactMissing("performance".into()))
    }

    async fn load_anomaly(&self) -> Result<Arc<dyn AnomalyModel>, ModelError> {
        Err(ModelError::ArtifactMissing("anomaly".into()))
    }

    async fn load_optimization(&self) -> Result<Arc<dyn OptimizationModel>, ModelError> {
        Ok(Arc::new(FixedFrontOptimizer {
            front: self.front.clone(),
        }))
    }
}

struct FixedFrontOptimizer {
    front: Vec<ParetoCandidate>,
}

impl OptimizationModel for FixedFrontOptimizer {
    fn optimize(
        &self,
        _history: &EnvironmentalHistory,
        _technology: &str,
        _knobs: &SearchKnobs,
    ) -> Result<Vec<ParetoCandidate>, ModelError> {
        Ok(self.front.clone())
    }
}

#[tokio::test]
async fn fallback_heuristic_uses_history_means() {
    let mut ctx = setup().await;

    let outcome = ctx
        .services
        .optimization
        .optimize(&two_row_history(), "monocrystalline", None)
        .await
        .expect("optimization failed");

    assert!((outcome.configuration.tilt_angle - 22.5).abs() < 1e-9);
    assert!((outcome.configuration.cleaning_frequency - 25.0).abs() < 1e-9);
    assert_eq!(outcome.configuration.cooling_system, 0);
    assert_eq!(outcome.configuration.azimuth_angle, 180.0);

    // Fallback objectives, rounded and with cost reported as absolute value
    assert_eq!(outcome.objectives.energy_efficiency, 0.18);
    assert_eq!(outcome.objectives.expected_lifespan, 25.0);
    assert_eq!(outcome.objectives.total_cost, 15000.0);
    assert_eq!(outcome.objectives.co2_avoided, 50000.0);

    assert_eq!(outcome.location_id, "default");
    assert_eq!(outcome.technology, "monocrystalline");
    assert!(!outcome.advice.is_empty());

    assert_matches!(
        ctx.events.try_recv(),
        Ok(Event::OptimizationStored { id, location_id })
            if id == outcome.optimization_id && location_id == "default"
    );
}

#[tokio::test]
async fn empty_history_is_rejected_before_any_path_runs() {
    let ctx = setup().await;

    let err = ctx
        .services
        .optimization
        .optimize(&EnvironmentalHistory::default(), "monocrystalline", None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::EmptyHistory);
}

#[tokio::test]
async fn learned_front_selects_best_objective_sum() {
    let ctx = setup_with_loader(Arc::new(ParetoLoader {
        front: vec![
            candidate(18.0, [0.15, 20.0, -18000.0, 40000.0]),
            candidate(24.0, [0.21, 28.0, -12000.0, 55000.0]),
            candidate(21.0, [0.18, 25.0, -15000.0, 50000.0]),
        ],
    }))
    .await;

    let outcome = ctx
        .services
        .optimization
        .optimize(&two_row_history(), "bifacial", Some("plant-7"))
        .await
        .expect("optimization failed");

    assert_eq!(outcome.configuration.tilt_angle, 24.0);
    assert_eq!(outcome.objectives.total_cost, 12000.0);
    assert_eq!(outcome.location_id, "plant-7");
}

#[tokio::test]
async fn empty_pareto_front_is_no_solution() {
    let ctx = setup_with_loader(Arc::new(ParetoLoader { front: Vec::new() })).await;

    let err = ctx
        .services
        .optimization
        .optimize(&two_row_history(), "bifacial", None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NoSolution);
}

#[tokio::test]
async fn capability_errors_reference_optimization() {
    struct BrokenOptimizer;

    impl OptimizationModel for BrokenOptimizer {
        fn optimize(
            &self,
            _history: &EnvironmentalHistory,
            _technology: &str,
            _knobs: &SearchKnobs,
        ) -> Result<Vec<ParetoCandidate>, ModelError> {
            Err(ModelError::CallFailed("solver crashed".into()))
        }
    }

    struct BrokenLoader;

    #[async_trait]
    impl ModelLoader for BrokenLoader {
        async fn load_performance(&self) -> Result<Arc<dyn PerformanceModel>, ModelError> {
            Err(ModelError::ArtifactMissing("performance".into()))
        }

        async fn load_anomaly(&self) -> Result<Arc<dyn AnomalyModel>, ModelError> {
            Err(ModelError::ArtifactMissing("anomaly".into()))
        }

        async fn load_optimization(&self) -> Result<Arc<dyn OptimizationModel>, ModelError> {
            Ok(Arc::new(BrokenOptimizer))
        }
    }

    let ctx = setup_with_loader(Arc::new(BrokenLoader)).await;
    let err = ctx
        .services
        .optimization
        .optimize(&two_row_history(), "bifacial", None)
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::CapabilityUnavailable(Capability::Optimization)
    );
}
