use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::Serialize;
use tracing::{error, instrument, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::prediction::{self, ModelType};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::ingestion::{normalize, FeatureVector, RawRecord, PERFORMANCE_INPUT};
use crate::ml::performance::{physical_estimate, PerformanceEstimate, LEARNED_CONFIDENCE};
use crate::ml::registry::{CapabilityRegistry, Resolution};
use crate::ml::{round_dp, Capability};

/// Default trailing window for prediction history queries, in days.
const DEFAULT_HISTORY_DAYS: i64 = 7;

/// Default row cap for prediction history queries.
const DEFAULT_HISTORY_LIMIT: u64 = 100;

/// A stored performance prediction as returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct PerformancePrediction {
    pub prediction_id: Uuid,
    pub estimate: PerformanceEstimate,
    pub input_conditions: FeatureVector,
    pub timestamp: DateTime<Utc>,
}

/// Service orchestrating the performance estimator
#[derive(Clone)]
pub struct PredictionService {
    db: Arc<DbPool>,
    registry: Arc<CapabilityRegistry>,
    event_sender: Arc<EventSender>,
}

impl PredictionService {
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

    /// Estimates power output for the given conditions and appends a
    /// prediction record.
    ///
    /// Delegates to the learned predictor when the capability resolved to
    /// one, otherwise runs the deterministic physical model.
    #[instrument(skip(self, raw))]
    pub async fn predict_performance(
        &self,
        raw: &RawRecord,
    ) -> Result<PerformancePrediction, ServiceError> {
        let record = normalize(&PERFORMANCE_INPUT, raw)?;

        let estimate = match self.registry.performance().await {
            Resolution::Learned(model) => {
                let watts = model.predict(&record.features).map_err(|e| {
                    error!(error = %e, "Learned performance model call failed");
                    ServiceError::CapabilityUnavailable(Capability::Performance)
                })?;
                PerformanceEstimate {
                    predicted_power_w: round_dp(watts, 2),
                    confidence: LEARNED_CONFIDENCE,
                    factors: None,
                }
            }
            Resolution::Fallback => physical_estimate(&record.features)?,
        };

        let now = Utc::now();
        let model = prediction::ActiveModel {
            id: Set(Uuid::new_v4()),
            model_type: Set(ModelType::Performance),
            input_data: Set(serde_json::to_value(&record.features)?),
            prediction_result: Set(serde_json::to_value(&estimate)?),
            confidence_score: Set(Some(estimate.confidence)),
            module_id: Set(record.text("module_id").map(str::to_string)),
            location_id: Set(record.text("location_id").map(str::to_string)),
            created_at: Set(now),
        };
        let stored = model.insert(&*self.db).await?;

        if let Err(e) = self
            .event_sender
            .send(Event::PredictionStored {
                id: stored.id,
                model_type: ModelType::Performance,
            })
            .await
        {
            warn!(error = %e, "Event delivery failed");
        }

        Ok(PerformancePrediction {
            prediction_id: stored.id,
            estimate,
            input_conditions: record.features,
            timestamp: stored.created_at,
        })
    }

    /// Prediction records from a trailing day window, newest first.
    #[instrument(skip(self))]
    pub async fn history(
        &self,
        model_type: Option<ModelType>,
        days: Option<i64>,
        limit: Option<u64>,
    ) -> Result<Vec<prediction::Model>, ServiceError> {
        let end = Utc::now();
        let start = end - Duration::days(days.unwrap_or(DEFAULT_HISTORY_DAYS));

        let mut query = prediction::Entity::find()
            .filter(prediction::Column::CreatedAt.gte(start))
            .filter(prediction::Column::CreatedAt.lte(end));
        if let Some(model_type) = model_type {
            query = query.filter(prediction::Column::ModelType.eq(model_type));
        }

        Ok(query
            .order_by_desc(prediction::Column::CreatedAt)
            .limit(limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
            .all(&*self.db)
            .await?)
    }
}
