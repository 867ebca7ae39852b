// Telemetry ingestion and queries
pub mod telemetry;

// Analytic orchestration
pub mod anomalies;
pub mod optimization;
pub mod predictions;

// Read-side aggregation
pub mod analytics;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::ml::registry::CapabilityRegistry;

/// Bundle of all core services sharing one connection pool, capability
/// registry, and event channel.
#[derive(Clone)]
pub struct AppServices {
    pub telemetry: telemetry::TelemetryService,
    pub predictions: predictions::PredictionService,
    pub anomalies: anomalies::AnomalyService,
    pub optimization: optimization::OptimizationService,
    pub analytics: analytics::AnalyticsService,
}

impl AppServices {
    pub fn build(
        db: Arc<DbPool>,
        registry: Arc<CapabilityRegistry>,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            telemetry: telemetry::TelemetryService::new(db.clone(), event_sender.clone()),
            predictions: predictions::PredictionService::new(
                db.clone(),
                registry.clone(),
                event_sender.clone(),
            ),
            anomalies: anomalies::AnomalyService::new(
                db.clone(),
                registry.clone(),
                event_sender.clone(),
            ),
            optimization: optimization::OptimizationService::new(db.clone(), registry, event_sender),
            analytics: analytics::AnalyticsService::new(db),
        }
    }
}
