use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::config::DEFAULT_METRICS_WINDOW_HOURS;
use crate::db::DbPool;
use crate::entities::{
    anomaly::{self, AnomalyStatus, Severity},
    environmental_reading, solar_reading, system_metrics,
};
use crate::errors::ServiceError;
use crate::ml::round_dp;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModuleCounts {
    pub total: u64,
    /// Modules with at least one reading inside the window
    pub active: u64,
    pub inactive: u64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PowerMetrics {
    /// Sum of max power over window rows, in watts
    pub total_generated_w: f64,
    /// Mean conversion efficiency over window rows, in [0, 1]
    pub average_efficiency: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct AnomalyCounts {
    pub total_active: u64,
    pub critical: u64,
    pub resolved: u64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EnvironmentAverages {
    pub ambient_temperature: f64,
    pub irradiance: f64,
    pub humidity: f64,
}

/// Aggregate metrics over a trailing window. Derived on demand; zeroed, not
/// absent, when the window holds no rows.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateMetrics {
    pub modules: ModuleCounts,
    pub power: PowerMetrics,
    pub anomalies: AnomalyCounts,
    pub environment: EnvironmentAverages,
    pub window_start: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
}

/// Time-ordered series for performance charts.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSeries {
    pub timestamps: Vec<DateTime<Utc>>,
    pub power: Vec<f64>,
    /// Efficiency in percent
    pub efficiency: Vec<f64>,
    pub cell_temperature: Vec<f64>,
    pub modules: Vec<String>,
}

/// Read-side aggregation over raw and derived history
#[derive(Clone)]
pub struct AnalyticsService {
    db: Arc<DbPool>,
}

impl AnalyticsService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Computes aggregate metrics over a trailing window (default 24 hours),
    /// optionally restricted to one module and/or location.
    ///
    /// Recomputed from raw history on every call; an empty window yields
    /// all-zero counts and averages.
    #[instrument(skip(self))]
    pub async fn dashboard_metrics(
        &self,
        window: Option<Duration>,
        module_id: Option<&str>,
        location_id: Option<&str>,
    ) -> Result<AggregateMetrics, ServiceError> {
        let db = &*self.db;
        let now = Utc::now();
        let window_start = now - window.unwrap_or_else(|| Duration::hours(DEFAULT_METRICS_WINDOW_HOURS));

        // Module counts from distinct module ids, all-time vs inside window
        let mut all_ids_query = solar_reading::Entity::find()
            .select_only()
            .column(solar_reading::Column::ModuleId);
        if let Some(module_id) = module_id {
            all_ids_query = all_ids_query.filter(solar_reading::Column::ModuleId.eq(module_id));
        }
        let all_ids: Vec<String> = all_ids_query.into_tuple::<String>().all(db).await?;
        let total_modules = all_ids.into_iter().collect::<HashSet<_>>().len() as u64;

        let mut window_query = solar_reading::Entity::find()
            .filter(solar_reading::Column::Timestamp.gte(window_start));
        if let Some(module_id) = module_id {
            window_query = window_query.filter(solar_reading::Column::ModuleId.eq(module_id));
        }
        let window_rows = window_query.all(db).await?;

        let active_modules = window_rows
            .iter()
            .map(|row| row.module_id.as_str())
            .collect::<HashSet<_>>()
            .len() as u64;

        let total_power: f64 = window_rows.iter().map(|row| row.max_power).sum();
        let average_efficiency = if window_rows.is_empty() {
            0.0
        } else {
            window_rows.iter().map(|row| row.efficiency).sum::<f64>() / window_rows.len() as f64
        };

        // Anomaly counts
        let mut active_query =
            anomaly::Entity::find().filter(anomaly::Column::Status.eq(AnomalyStatus::Active));
        if let Some(module_id) = module_id {
            active_query = active_query.filter(anomaly::Column::ModuleId.eq(module_id));
        }
        let total_active = active_query.clone().count(db).await?;
        let critical = active_query
            .filter(anomaly::Column::SeverityLevel.eq(Severity::Critical))
            .count(db)
            .await?;

        let mut resolved_query =
            anomaly::Entity::find().filter(anomaly::Column::Status.eq(AnomalyStatus::Resolved));
        if let Some(module_id) = module_id {
            resolved_query = resolved_query.filter(anomaly::Column::ModuleId.eq(module_id));
        }
        let resolved = resolved_query.count(db).await?;

        // Environmental averages over the window
        let mut env_query = environmental_reading::Entity::find()
            .filter(environmental_reading::Column::Timestamp.gte(window_start));
        if let Some(location_id) = location_id {
            env_query =
                env_query.filter(environmental_reading::Column::LocationId.eq(location_id));
        }
        let env_rows = env_query.all(db).await?;

        let environment = if env_rows.is_empty() {
            EnvironmentAverages {
                ambient_temperature: 0.0,
                irradiance: 0.0,
                humidity: 0.0,
            }
        } else {
            let n = env_rows.len() as f64;
            EnvironmentAverages {
                ambient_temperature: round_dp(
                    env_rows.iter().map(|r| r.ambient_temperature).sum::<f64>() / n,
                    1,
                ),
                irradiance: round_dp(env_rows.iter().map(|r| r.irradiance).sum::<f64>() / n, 1),
                humidity: round_dp(env_rows.iter().map(|r| r.humidity).sum::<f64>() / n, 1),
            }
        };

        Ok(AggregateMetrics {
            modules: ModuleCounts {
                total: total_modules,
                active: active_modules,
                inactive: total_modules - active_modules,
            },
            power: PowerMetrics {
                total_generated_w: round_dp(total_power, 2),
                average_efficiency,
            },
            anomalies: AnomalyCounts {
                total_active,
                critical,
                resolved,
            },
            environment,
            window_start,
            generated_at: now,
        })
    }

    /// Time-ordered power/efficiency/temperature series for charting,
    /// over a trailing day window.
    #[instrument(skip(self))]
    pub async fn performance_series(
        &self,
        days: i64,
        module_id: Option<&str>,
    ) -> Result<PerformanceSeries, ServiceError> {
        let end = Utc::now();
        let start = end - Duration::days(days);

        let mut query = solar_reading::Entity::find()
            .filter(solar_reading::Column::Timestamp.gte(start))
            .filter(solar_reading::Column::Timestamp.lte(end));
        if let Some(module_id) = module_id {
            query = query.filter(solar_reading::Column::ModuleId.eq(module_id));
        }
        let rows = query
            .order_by_asc(solar_reading::Column::Timestamp)
            .all(&*self.db)
            .await?;

        let mut modules: Vec<String> = rows
            .iter()
            .map(|row| row.module_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        modules.sort();

        Ok(PerformanceSeries {
            timestamps: rows.iter().map(|row| row.timestamp).collect(),
            power: rows.iter().map(|row| row.max_power).collect(),
            efficiency: rows.iter().map(|row| row.efficiency * 100.0).collect(),
            cell_temperature: rows.iter().map(|row| row.cell_temperature).collect(),
            modules,
        })
    }

    /// Materializes aggregate metrics into a `system_metrics` snapshot row.
    /// The snapshot is a cache; recomputation stays authoritative.
    #[instrument(skip(self, metrics))]
    pub async fn snapshot(
        &self,
        metrics: &AggregateMetrics,
    ) -> Result<system_metrics::Model, ServiceError> {
        let model = system_metrics::ActiveModel {
            id: Set(Uuid::new_v4()),
            total_modules: Set(metrics.modules.total as i32),
            active_modules: Set(metrics.modules.active as i32),
            total_power_generated: Set(metrics.power.total_generated_w),
            average_efficiency: Set(metrics.power.average_efficiency),
            total_anomalies: Set(metrics.anomalies.total_active as i32),
            critical_anomalies: Set(metrics.anomalies.critical as i32),
            resolved_anomalies: Set(metrics.anomalies.resolved as i32),
            average_temperature: Set(metrics.environment.ambient_temperature),
            average_irradiance: Set(metrics.environment.irradiance),
            average_humidity: Set(metrics.environment.humidity),
            created_at: Set(Utc::now()),
        };
        let stored = model.insert(&*self.db).await?;

        info!(snapshot_id = %stored.id, "Metrics snapshot stored");
        Ok(stored)
    }
}
