use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::Serialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::anomaly::{self, AnomalyStatus, Severity};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::ingestion::{normalize, RawRecord, ANOMALY_INPUT};
use crate::ml::anomaly_detection::{rule_classify, AnomalyType, Classification};
use crate::ml::registry::{CapabilityRegistry, Resolution};
use crate::ml::Capability;

/// Default row cap for active-anomaly queries.
const DEFAULT_ACTIVE_LIMIT: u64 = 50;

/// Maintenance recommendation attached to a detected anomaly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub action: &'static str,
    pub priority: &'static str,
    pub timeframe: &'static str,
}

/// Fixed anomaly-type -> recommendation table. Unmapped types get a general
/// inspection.
fn recommendation_for(anomaly_type: &AnomalyType) -> Recommendation {
    match anomaly_type {
        AnomalyType::GradualDegradation => Recommendation {
            action: "Continuous monitoring and replacement planning",
            priority: "Medium",
            timeframe: "3-6 months",
        },
        AnomalyType::CellFailure => Recommendation {
            action: "Visual inspection and module replacement",
            priority: "High",
            timeframe: "1-2 weeks",
        },
        AnomalyType::Overheating => Recommendation {
            action: "Improve ventilation and verify mounting",
            priority: "High",
            timeframe: "1 week",
        },
        AnomalyType::Other(_) => Recommendation {
            action: "General inspection recommended",
            priority: "Medium",
            timeframe: "1 month",
        },
    }
}

/// Outcome of one detection request. A record and recommendation are
/// present iff the classification was positive.
#[derive(Debug, Clone, Serialize)]
pub struct DetectionOutcome {
    pub anomaly_detected: bool,
    pub classification: Classification,
    pub record: Option<anomaly::Model>,
    pub recommendation: Option<Recommendation>,
}

/// Service orchestrating anomaly classification and the anomaly lifecycle
#[derive(Clone)]
pub struct AnomalyService {
    db: Arc<DbPool>,
    registry: Arc<CapabilityRegistry>,
    event_sender: Arc<EventSender>,
}

impl AnomalyService {
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

    /// Classifies one module reading; on a positive classification, persists
    /// an active anomaly record with its maintenance recommendation.
    #[instrument(skip(self, raw))]
    pub async fn detect(&self, raw: &RawRecord) -> Result<DetectionOutcome, ServiceError> {
        let record = normalize(&ANOMALY_INPUT, raw)?;
        let module_id = record
            .text("module_id")
            .ok_or_else(|| ServiceError::MissingField("module_id".to_string()))?
            .to_string();

        let classification = match self.registry.anomaly().await {
            Resolution::Learned(model) => {
                let results = model
                    .classify(std::slice::from_ref(&record.features))
                    .map_err(|e| {
                        error!(error = %e, "Learned anomaly model call failed");
                        ServiceError::CapabilityUnavailable(Capability::Anomaly)
                    })?;
                results
                    .into_iter()
                    .next()
                    .ok_or(ServiceError::CapabilityUnavailable(Capability::Anomaly))?
            }
            Resolution::Fallback => rule_classify(&record.features)?,
        };

        if !classification.is_anomaly {
            return Ok(DetectionOutcome {
                anomaly_detected: false,
                classification,
                record: None,
                recommendation: None,
            });
        }

        let anomaly_type = classification
            .anomaly_type
            .clone()
            .unwrap_or_else(|| AnomalyType::Other("Unclassified".to_string()));
        let recommendation = recommendation_for(&anomaly_type);

        let model = anomaly::ActiveModel {
            id: Set(Uuid::new_v4()),
            module_id: Set(module_id.clone()),
            anomaly_type: Set(anomaly_type.label().to_string()),
            severity_level: Set(classification.severity),
            confidence: Set(classification.confidence.clone()),
            description: Set(format!(
                "Anomaly detected on module {module_id}: {anomaly_type}"
            )),
            recommended_action: Set(recommendation.action.to_string()),
            priority: Set(recommendation.priority.to_string()),
            timeframe: Set(recommendation.timeframe.to_string()),
            isolation_score: Set(classification.isolation_score),
            reconstruction_error: Set(classification.reconstruction_error),
            status: Set(AnomalyStatus::Active),
            resolved_at: Set(None),
            created_at: Set(Utc::now()),
        };
        let stored = model.insert(&*self.db).await?;

        info!(
            anomaly_id = %stored.id,
            module_id = %stored.module_id,
            anomaly_type = %stored.anomaly_type,
            severity = %stored.severity_level,
            "Anomaly recorded"
        );

        if let Err(e) = self
            .event_sender
            .send(Event::AnomalyDetected {
                id: stored.id,
                module_id: stored.module_id.clone(),
                anomaly_type: stored.anomaly_type.clone(),
                severity: stored.severity_level,
            })
            .await
        {
            warn!(error = %e, "Event delivery failed");
        }

        Ok(DetectionOutcome {
            anomaly_detected: true,
            classification,
            record: Some(stored),
            recommendation: Some(recommendation),
        })
    }

    /// Marks an anomaly as resolved.
    ///
    /// Resolving an already-resolved record is accepted and overwrites the
    /// resolution timestamp; resolving an ignored record is rejected.
    #[instrument(skip(self))]
    pub async fn resolve(&self, id: Uuid) -> Result<anomaly::Model, ServiceError> {
        self.transition(id, AnomalyStatus::Resolved).await
    }

    /// Marks an anomaly as ignored. Same transition contract as
    /// [`resolve`](Self::resolve): re-ignoring is accepted, ignoring a
    /// resolved record is rejected.
    #[instrument(skip(self))]
    pub async fn ignore(&self, id: Uuid) -> Result<anomaly::Model, ServiceError> {
        self.transition(id, AnomalyStatus::Ignored).await
    }

    async fn transition(
        &self,
        id: Uuid,
        target: AnomalyStatus,
    ) -> Result<anomaly::Model, ServiceError> {
        let existing = anomaly::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Anomaly {id} not found")))?;

        // Active records may take any terminal status; a terminal status may
        // only be re-applied, never exchanged for the other one.
        if existing.status != AnomalyStatus::Active && existing.status != target {
            return Err(ServiceError::InvalidTransition {
                from: existing.status.to_string(),
                to: target.to_string(),
            });
        }

        let resolved_at = Utc::now();
        let mut active: anomaly::ActiveModel = existing.into();
        active.status = Set(target);
        active.resolved_at = Set(Some(resolved_at));
        let updated = active.update(&*self.db).await?;

        let event = match target {
            AnomalyStatus::Resolved => Event::AnomalyResolved {
                id: updated.id,
                resolved_at,
            },
            _ => Event::AnomalyIgnored { id: updated.id },
        };
        if let Err(e) = self.event_sender.send(event).await {
            warn!(error = %e, "Event delivery failed");
        }

        Ok(updated)
    }

    /// Fetches one anomaly record.
    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<anomaly::Model, ServiceError> {
        anomaly::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Anomaly {id} not found")))
    }

    /// Active anomalies, newest first, optionally filtered by severity and
    /// module.
    #[instrument(skip(self))]
    pub async fn active(
        &self,
        severity: Option<Severity>,
        module_id: Option<&str>,
        limit: Option<u64>,
    ) -> Result<Vec<anomaly::Model>, ServiceError> {
        let mut query =
            anomaly::Entity::find().filter(anomaly::Column::Status.eq(AnomalyStatus::Active));
        if let Some(severity) = severity {
            query = query.filter(anomaly::Column::SeverityLevel.eq(severity));
        }
        if let Some(module_id) = module_id {
            query = query.filter(anomaly::Column::ModuleId.eq(module_id));
        }

        Ok(query
            .order_by_desc(anomaly::Column::CreatedAt)
            .limit(limit.unwrap_or(DEFAULT_ACTIVE_LIMIT))
            .all(&*self.db)
            .await?)
    }
}
