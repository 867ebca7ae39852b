use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::entities::anomaly::Severity;
use crate::entities::prediction::ModelType;

/// Events emitted by the core as telemetry is ingested and analytics run.
/// Consumers (dashboards, alerting) subscribe through the channel receiver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    SolarReadingIngested {
        id: Uuid,
        module_id: String,
    },
    EnvironmentalReadingIngested {
        id: Uuid,
        location_id: String,
    },
    PredictionStored {
        id: Uuid,
        model_type: ModelType,
    },
    AnomalyDetected {
        id: Uuid,
        module_id: String,
        anomaly_type: String,
        severity: Severity,
    },
    AnomalyResolved {
        id: Uuid,
        resolved_at: DateTime<Utc>,
    },
    AnomalyIgnored {
        id: Uuid,
    },
    OptimizationStored {
        id: Uuid,
        location_id: String,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Convenience constructor for an event channel with the given buffer size.
pub fn event_channel(buffer: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(buffer);
    (EventSender::new(tx), rx)
}
