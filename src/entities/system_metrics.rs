use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cached snapshot of aggregate metrics. Populated by callers of the
/// analytics service; recomputation from raw history is always
/// authoritative.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "system_metrics")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub total_modules: i32,
    pub active_modules: i32,
    pub total_power_generated: f64,
    pub average_efficiency: f64,
    pub total_anomalies: i32,
    pub critical_anomalies: i32,
    pub resolved_anomalies: i32,
    pub average_temperature: f64,
    pub average_irradiance: f64,
    pub average_humidity: f64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
