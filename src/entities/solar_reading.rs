use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Electrical and thermal telemetry reported by a single PV module.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "solar_readings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub module_id: String,
    /// Voc
    pub open_circuit_voltage: f64,
    /// Vmp
    pub max_power_voltage: f64,
    /// Imp
    pub max_power_current: f64,
    /// Isc
    pub short_circuit_current: f64,
    pub max_power: f64,
    /// Conversion efficiency in [0, 1]
    pub efficiency: f64,
    pub cell_temperature: f64,
    pub timestamp: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
