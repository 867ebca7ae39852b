use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set};
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::DEFAULT_BULK_ERROR_LIMIT;
use crate::db::DbPool;
use crate::entities::{environmental_reading, solar_reading};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::ingestion::{
    normalize, NormalizedRecord, RawRecord, ENVIRONMENTAL_READING, SOLAR_READING,
};

/// Confirmation of a stored reading.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReceipt {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
}

/// A batch of rows handed over by a bulk-upload collaborator, with the
/// column set it parsed from the file header.
#[derive(Debug, Clone)]
pub struct TelemetryBatch {
    pub columns: Vec<String>,
    pub rows: Vec<RawRecord>,
}

/// Outcome of a bulk ingest: rows stored, the first few per-row failures,
/// and the total failure count.
#[derive(Debug, Clone, Serialize)]
pub struct BatchIngestSummary {
    pub records_created: usize,
    pub errors: Vec<String>,
    pub total_errors: usize,
}

/// Service for ingesting and querying raw telemetry
#[derive(Clone)]
pub struct TelemetryService {
    db: Arc<DbPool>,
    event_sender: Arc<EventSender>,
    bulk_error_limit: usize,
}

impl TelemetryService {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        Self {
            db,
            event_sender,
            bulk_error_limit: DEFAULT_BULK_ERROR_LIMIT,
        }
    }

    pub fn with_bulk_error_limit(mut self, limit: usize) -> Self {
        self.bulk_error_limit = limit;
        self
    }

    /// Stores one module telemetry reading.
    #[instrument(skip(self, raw))]
    pub async fn ingest_solar(&self, raw: &RawRecord) -> Result<IngestReceipt, ServiceError> {
        let record = normalize(&SOLAR_READING, raw)?;
        let stored = self.insert_solar(&record).await?;

        if let Err(e) = self
            .event_sender
            .send(Event::SolarReadingIngested {
                id: stored.id,
                module_id: stored.module_id.clone(),
            })
            .await
        {
            warn!(error = %e, "Event delivery failed");
        }

        Ok(IngestReceipt {
            id: stored.id,
            timestamp: stored.timestamp,
        })
    }

    /// Stores one environmental reading.
    #[instrument(skip(self, raw))]
    pub async fn ingest_environmental(
        &self,
        raw: &RawRecord,
    ) -> Result<IngestReceipt, ServiceError> {
        let record = normalize(&ENVIRONMENTAL_READING, raw)?;
        let stored = self.insert_environmental(&record).await?;

        if let Err(e) = self
            .event_sender
            .send(Event::EnvironmentalReadingIngested {
                id: stored.id,
                location_id: stored.location_id.clone(),
            })
            .await
        {
            warn!(error = %e, "Event delivery failed");
        }

        Ok(IngestReceipt {
            id: stored.id,
            timestamp: stored.timestamp,
        })
    }

    /// Stores a batch of module telemetry rows.
    ///
    /// The whole batch is rejected with `SchemaError` when a required column
    /// is absent from the header; after that, row failures are collected and
    /// never abort the remaining rows.
    #[instrument(skip(self, batch), fields(rows = batch.rows.len()))]
    pub async fn ingest_solar_batch(
        &self,
        batch: &TelemetryBatch,
    ) -> Result<BatchIngestSummary, ServiceError> {
        let missing = SOLAR_READING.missing_columns(&batch.columns);
        if !missing.is_empty() {
            return Err(ServiceError::SchemaError(missing));
        }

        let mut summary = BatchIngestSummary {
            records_created: 0,
            errors: Vec::new(),
            total_errors: 0,
        };

        for (index, row) in batch.rows.iter().enumerate() {
            let result = match normalize(&SOLAR_READING, row) {
                Ok(record) => self.insert_solar(&record).await.map(|_| ()),
                Err(e) => Err(e),
            };
            self.tally(&mut summary, index, result);
        }

        info!(
            created = summary.records_created,
            failed = summary.total_errors,
            "Solar batch processed"
        );
        Ok(summary)
    }

    /// Stores a batch of environmental rows. Same contract as
    /// [`ingest_solar_batch`](Self::ingest_solar_batch).
    #[instrument(skip(self, batch), fields(rows = batch.rows.len()))]
    pub async fn ingest_environmental_batch(
        &self,
        batch: &TelemetryBatch,
    ) -> Result<BatchIngestSummary, ServiceError> {
        let missing = ENVIRONMENTAL_READING.missing_columns(&batch.columns);
        if !missing.is_empty() {
            return Err(ServiceError::SchemaError(missing));
        }

        let mut summary = BatchIngestSummary {
            records_created: 0,
            errors: Vec::new(),
            total_errors: 0,
        };

        for (index, row) in batch.rows.iter().enumerate() {
            let result = match normalize(&ENVIRONMENTAL_READING, row) {
                Ok(record) => self.insert_environmental(&record).await.map(|_| ()),
                Err(e) => Err(e),
            };
            self.tally(&mut summary, index, result);
        }

        info!(
            created = summary.records_created,
            failed = summary.total_errors,
            "Environmental batch processed"
        );
        Ok(summary)
    }

    /// Most recent readings, newest first.
    #[instrument(skip(self))]
    pub async fn latest(
        &self,
        limit: u64,
        module_id: Option<&str>,
        location_id: Option<&str>,
    ) -> Result<LatestTelemetry, ServiceError> {
        let db = &*self.db;

        let mut solar_query = solar_reading::Entity::find();
        if let Some(module_id) = module_id {
            solar_query = solar_query.filter(solar_reading::Column::ModuleId.eq(module_id));
        }
        let solar = solar_query
            .order_by_desc(solar_reading::Column::Timestamp)
            .limit(limit)
            .all(db)
            .await?;

        let mut env_query = environmental_reading::Entity::find();
        if let Some(location_id) = location_id {
            env_query =
                env_query.filter(environmental_reading::Column::LocationId.eq(location_id));
        }
        let environmental = env_query
            .order_by_desc(environmental_reading::Column::Timestamp)
            .limit(limit)
            .all(db)
            .await?;

        Ok(LatestTelemetry {
            solar,
            environmental,
        })
    }

    /// Readings inside `[start, end]`, oldest first.
    #[instrument(skip(self))]
    pub async fn range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        module_id: Option<&str>,
        location_id: Option<&str>,
    ) -> Result<LatestTelemetry, ServiceError> {
        let db = &*self.db;

        let mut solar_query = solar_reading::Entity::find()
            .filter(solar_reading::Column::Timestamp.gte(start))
            .filter(solar_reading::Column::Timestamp.lte(end));
        if let Some(module_id) = module_id {
            solar_query = solar_query.filter(solar_reading::Column::ModuleId.eq(module_id));
        }
        let solar = solar_query
            .order_by_asc(solar_reading::Column::Timestamp)
            .all(db)
            .await?;

        let mut env_query = environmental_reading::Entity::find()
            .filter(environmental_reading::Column::Timestamp.gte(start))
            .filter(environmental_reading::Column::Timestamp.lte(end));
        if let Some(location_id) = location_id {
            env_query =
                env_query.filter(environmental_reading::Column::LocationId.eq(location_id));
        }
        let environmental = env_query
            .order_by_asc(environmental_reading::Column::Timestamp)
            .all(db)
            .await?;

        Ok(LatestTelemetry {
            solar,
            environmental,
        })
    }

    async fn insert_solar(
        &self,
        record: &NormalizedRecord,
    ) -> Result<solar_reading::Model, ServiceError> {
        let module_id = record
            .text("module_id")
            .ok_or_else(|| ServiceError::MissingField("module_id".to_string()))?;
        let features = &record.features;

        let model = solar_reading::ActiveModel {
            id: Set(Uuid::new_v4()),
            module_id: Set(module_id.to_string()),
            open_circuit_voltage: Set(features.require("open_circuit_voltage")?),
            max_power_voltage: Set(features.require("max_power_voltage")?),
            max_power_current: Set(features.require("max_power_current")?),
            short_circuit_current: Set(features.require("short_circuit_current")?),
            max_power: Set(features.require("max_power")?),
            efficiency: Set(features.require("efficiency")?),
            cell_temperature: Set(features.require("cell_temperature")?),
            timestamp: Set(record.timestamp),
            created_at: Set(Utc::now()),
        };

        Ok(model.insert(&*self.db).await?)
    }

    async fn insert_environmental(
        &self,
        record: &NormalizedRecord,
    ) -> Result<environmental_reading::Model, ServiceError> {
        let location_id = record
            .text("location_id")
            .ok_or_else(|| ServiceError::MissingField("location_id".to_string()))?;
        let features = &record.features;

        let model = environmental_reading::ActiveModel {
            id: Set(Uuid::new_v4()),
            location_id: Set(location_id.to_string()),
            ambient_temperature: Set(features.require("ambient_temperature")?),
            irradiance: Set(features.require("irradiance")?),
            humidity: Set(features.require("humidity")?),
            wind_speed: Set(features.require("wind_speed")?),
            precipitation: Set(features.require("precipitation")?),
            cloudiness: Set(features.require("cloudiness")?),
            timestamp: Set(record.timestamp),
            created_at: Set(Utc::now()),
        };

        Ok(model.insert(&*self.db).await?)
    }

    fn tally(
        &self,
        summary: &mut BatchIngestSummary,
        index: usize,
        result: Result<(), ServiceError>,
    ) {
        match result {
            Ok(()) => summary.records_created += 1,
            Err(e) => {
                summary.total_errors += 1;
                if summary.errors.len() < self.bulk_error_limit {
                    summary.errors.push(format!("Row {}: {}", index + 1, e));
                }
            }
        }
    }
}

/// Solar and environmental readings returned together by the query
/// operations.
#[derive(Debug, Clone, Serialize)]
pub struct LatestTelemetry {
    pub solar: Vec<solar_reading::Model>,
    pub environmental: Vec<environmental_reading::Model>,
}
