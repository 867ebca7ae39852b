use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored output of one analytic invocation. Append-only; never mutated.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "predictions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub model_type: ModelType,
    /// Normalized input features as submitted to the analytic
    pub input_data: Json,
    /// Analytic output payload
    pub prediction_result: Json,
    /// Confidence in [0, 1]; absent when the analytic does not score itself
    pub confidence_score: Option<f64>,
    pub module_id: Option<String>,
    pub location_id: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Which analytic produced a prediction record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
pub enum ModelType {
    #[sea_orm(string_value = "performance")]
    Performance,
    #[sea_orm(string_value = "anomaly")]
    Anomaly,
    #[sea_orm(string_value = "optimization")]
    Optimization,
}
