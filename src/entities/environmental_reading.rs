use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ambient conditions reported by a weather station at a location.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "environmental_readings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub location_id: String,
    pub ambient_temperature: f64,
    /// W/m^2
    pub irradiance: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    pub wind_speed: f64,
    pub precipitation: f64,
    /// Cloud cover in percent
    pub cloudiness: f64,
    pub timestamp: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
