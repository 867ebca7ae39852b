use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recommended module configuration for a location, with the four objective
/// scores it was selected on. Append-only.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "optimization_results")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub location_id: String,
    /// PV technology label (e.g. "monocrystalline")
    pub technology: String,
    /// Named configuration parameters
    pub optimal_config: Json,
    pub energy_efficiency: f64,
    /// Years
    pub expected_lifespan: f64,
    /// Absolute cost; the optimizer negates cost internally
    pub total_cost: f64,
    /// kg CO2
    pub co2_avoided: f64,
    pub optimization_type: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
