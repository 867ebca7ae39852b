use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, Set};
use serde::Serialize;
use tracing::{error, instrument, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::optimization_result;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::ml::optimization::{
    heuristic_candidate, select_best, EnvironmentalHistory, ModuleConfiguration, ObjectiveScores,
    SearchKnobs,
};
use crate::ml::registry::{CapabilityRegistry, Resolution};
use crate::ml::Capability;

const DEFAULT_LOCATION: &str = "default";

/// A stored optimization result as returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationOutcome {
    pub optimization_id: Uuid,
    pub configuration: ModuleConfiguration,
    pub objectives: ObjectiveScores,
    pub technology: String,
    pub location_id: String,
    /// Human-readable installation advice
    pub advice: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Service orchestrating the multi-objective advisor
#[derive(Clone)]
pub struct OptimizationService {
    db: Arc<DbPool>,
    registry: Arc<CapabilityRegistry>,
    event_sender: Arc<EventSender>,
}

impl OptimizationService {
    pub fn new(
        db: Arc<DbPool>,
        registry: Arc<CapabilityRegistry>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            db,
            registry,
            event_sender,
        }
    }

    /// Recommends a module configuration for the given environmental history
    /// and appends an optimization record.
    ///
    /// With a learned optimizer the best Pareto candidate (maximum unweighted
    /// objective sum) is selected; otherwise the deterministic heuristic over
    /// the history means is used.
    #[instrument(skip(self, history), fields(rows = history.len()))]
    pub async fn optimize(
        &self,
        history: &EnvironmentalHistory,
        technology: &str,
        location_id: Option<&str>,
    ) -> Result<OptimizationOutcome, ServiceError> {
        if history.is_empty() {
            return Err(ServiceError::EmptyHistory);
        }

        let candidate = match self.registry.optimization().await {
            Resolution::Learned(model) => {
                let front = model
                    .optimize(history, technology, &SearchKnobs::default())
                    .map_err(|e| {
                        error!(error = %e, "Learned optimizer call failed");
                        ServiceError::CapabilityUnavailable(Capability::Optimization)
                    })?;
                select_best(&front).cloned().ok_or(ServiceError::NoSolution)?
            }
            Resolution::Fallback => {
                let means = history.means().ok_or(ServiceError::EmptyHistory)?;
                heuristic_candidate(&means)
            }
        };

        let objectives = ObjectiveScores::from_objectives(candidate.objectives);
        let location_id = location_id.unwrap_or(DEFAULT_LOCATION).to_string();

        let model = optimization_result::ActiveModel {
            id: Set(Uuid::new_v4()),
            location_id: Set(location_id.clone()),
            technology: Set(technology.to_string()),
            optimal_config: Set(serde_json::to_value(&candidate.parameters)?),
            energy_efficiency: Set(objectives.energy_efficiency),
            expected_lifespan: Set(objectives.expected_lifespan),
            total_cost: Set(objectives.total_cost),
            co2_avoided: Set(objectives.co2_avoided),
            optimization_type: Set("multi_objective".to_string()),
            created_at: Set(Utc::now()),
        };
        let stored = model.insert(&*self.db).await?;

        if let Err(e) = self
            .event_sender
            .send(Event::OptimizationStored {
                id: stored.id,
                location_id: stored.location_id.clone(),
            })
            .await
        {
            warn!(error = %e, "Event delivery failed");
        }

        Ok(OptimizationOutcome {
            optimization_id: stored.id,
            advice: candidate.parameters.advice(),
            configuration: candidate.parameters,
            objectives,
            technology: stored.technology,
            location_id: stored.location_id,
            timestamp: stored.created_at,
        })
    }
}
