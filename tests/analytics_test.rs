mod common;

use chrono::{Duration, Utc};
use heliosentinel::entities::anomaly;
use heliosentinel::entities::anomaly::{AnomalyStatus, Severity};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::json;
use uuid::Uuid;

use common::{degraded_module_input, environmental_row, setup, solar_row};

#[tokio::test]
async fn empty_window_yields_zeroes_without_error() {
    let ctx = setup().await;

    let metrics = ctx
        .services
        .analytics
        .dashboard_metrics(None, None, None)
        .await
        .expect("aggregation failed");

    assert_eq!(metrics.modules.total, 0);
    assert_eq!(metrics.modules.active, 0);
    assert_eq!(metrics.modules.inactive, 0);
    assert_eq!(metrics.power.total_generated_w, 0.0);
    assert_eq!(metrics.power.average_efficiency, 0.0);
    assert_eq!(metrics.anomalies.total_active, 0);
    assert_eq!(metrics.anomalies.critical, 0);
    assert_eq!(metrics.environment.ambient_temperature, 0.0);
    assert_eq!(metrics.environment.irradiance, 0.0);
    assert_eq!(metrics.environment.humidity, 0.0);
}

#[tokio::test]
async fn window_separates_active_from_inactive_modules() {
    let ctx = setup().await;
    let telemetry = &ctx.services.telemetry;

    // Two modules reporting now
    telemetry.ingest_solar(&solar_row("PV-001")).await.unwrap();
    telemetry.ingest_solar(&solar_row("PV-002")).await.unwrap();

    // One module last seen three days ago
    let stale = (Utc::now() - Duration::days(3)).to_rfc3339();
    let mut old_row = solar_row("PV-003");
    old_row.insert("timestamp".to_string(), json!(stale));
    telemetry.ingest_solar(&old_row).await.unwrap();

    let metrics = ctx
        .services
        .analytics
        .dashboard_metrics(None, None, None)
        .await
        .unwrap();

    assert_eq!(metrics.modules.total, 3);
    assert_eq!(metrics.modules.active, 2);
    assert_eq!(metrics.modules.inactive, 1);

    // Window sums exclude the stale row: 2 * 258.9
    assert!((metrics.power.total_generated_w - 517.8).abs() < 1e-6);
    assert!((metrics.power.average_efficiency - 0.182).abs() < 1e-9);
}

#[tokio::test]
async fn anomaly_counts_track_status_and_severity() {
    let ctx = setup().await;

    let first = ctx
        .services
        .anomalies
        .detect(&degraded_module_input("PV-001"))
        .await
        .unwrap()
        .record
        .unwrap();
    ctx.services
        .anomalies
        .detect(&degraded_module_input("PV-002"))
        .await
        .unwrap();

    // A critical anomaly as a learned detector would record it
    anomaly::ActiveModel {
        id: Set(Uuid::new_v4()),
        module_id: Set("PV-009".to_string()),
        anomaly_type: Set("Hot Spot".to_string()),
        severity_level: Set(Severity::Critical),
        confidence: Set("High".to_string()),
        description: Set("Anomaly detected on module PV-009: Hot Spot".to_string()),
        recommended_action: Set("General inspection recommended".to_string()),
        priority: Set("Medium".to_string()),
        timeframe: Set("1 month".to_string()),
        isolation_score: Set(Some(-0.61)),
        reconstruction_error: Set(Some(0.034)),
        status: Set(AnomalyStatus::Active),
        resolved_at: Set(None),
        created_at: Set(Utc::now()),
    }
    .insert(&*ctx.db)
    .await
    .unwrap();

    let metrics = ctx
        .services
        .analytics
        .dashboard_metrics(None, None, None)
        .await
        .unwrap();
    assert_eq!(metrics.anomalies.total_active, 3);
    assert_eq!(metrics.anomalies.critical, 1);
    assert_eq!(metrics.anomalies.resolved, 0);

    ctx.services.anomalies.resolve(first.id).await.unwrap();
    let metrics = ctx
        .services
        .analytics
        .dashboard_metrics(None, None, None)
        .await
        .unwrap();
    assert_eq!(metrics.anomalies.total_active, 2);
    assert_eq!(metrics.anomalies.resolved, 1);
}

#[tokio::test]
async fn environmental_averages_are_rounded_to_one_decimal() {
    let ctx = setup().await;
    let telemetry = &ctx.services.telemetry;

    telemetry
        .ingest_environmental(&environmental_row("default"))
        .await
        .unwrap();
    let mut second = environmental_row("default");
    second.insert("ambient_temperature".to_string(), json!(31.0));
    second.insert("irradiance".to_string(), json!(920.0));
    second.insert("humidity".to_string(), json!(64.0));
    telemetry.ingest_environmental(&second).await.unwrap();

    let metrics = ctx
        .services
        .analytics
        .dashboard_metrics(None, None, None)
        .await
        .unwrap();

    // (29.4 + 31.0) / 2 = 30.2
    assert!((metrics.environment.ambient_temperature - 30.2).abs() < 1e-9);
    assert!((metrics.environment.irradiance - 892.5).abs() < 1e-9);
    assert!((metrics.environment.humidity - 67.5).abs() < 1e-9);
}

#[tokio::test]
async fn module_filter_restricts_the_aggregation() {
    let ctx = setup().await;
    let telemetry = &ctx.services.telemetry;

    telemetry.ingest_solar(&solar_row("PV-001")).await.unwrap();
    telemetry.ingest_solar(&solar_row("PV-002")).await.unwrap();
    ctx.services
        .anomalies
        .detect(&degraded_module_input("PV-002"))
        .await
        .unwrap();

    let metrics = ctx
        .services
        .analytics
        .dashboard_metrics(None, Some("PV-001"), None)
        .await
        .unwrap();
    assert_eq!(metrics.modules.total, 1);
    assert_eq!(metrics.modules.active, 1);
    assert_eq!(metrics.anomalies.total_active, 0);
    assert!((metrics.power.total_generated_w - 258.9).abs() < 1e-6);
}

#[tokio::test]
async fn performance_series_is_time_ordered_with_percent_efficiency() {
    let ctx = setup().await;
    let telemetry = &ctx.services.telemetry;

    for (module, ts, power) in [
        ("PV-002", "2025-05-01T13:00:00Z", 250.0),
        ("PV-001", "2025-05-01T12:00:00Z", 240.0),
    ] {
        let mut row = solar_row(module);
        row.insert("timestamp".to_string(), json!(ts));
        row.insert("max_power".to_string(), json!(power));
        telemetry.ingest_solar(&row).await.unwrap();
    }

    let series = ctx
        .services
        .analytics
        .performance_series(365_000, None)
        .await
        .unwrap();

    assert_eq!(series.power, vec![240.0, 250.0]);
    assert!(series.timestamps[0] < series.timestamps[1]);
    assert!((series.efficiency[0] - 18.2).abs() < 1e-9);
    assert_eq!(series.modules, vec!["PV-001", "PV-002"]);

    let filtered = ctx
        .services
        .analytics
        .performance_series(365_000, Some("PV-001"))
        .await
        .unwrap();
    assert_eq!(filtered.power, vec![240.0]);
}

#[tokio::test]
async fn snapshot_materializes_the_aggregate() {
    let ctx = setup().await;

    ctx.services
        .telemetry
        .ingest_solar(&solar_row("PV-001"))
        .await
        .unwrap();
    ctx.services
        .anomalies
        .detect(&degraded_module_input("PV-001"))
        .await
        .unwrap();

    let metrics = ctx
        .services
        .analytics
        .dashboard_metrics(None, None, None)
        .await
        .unwrap();
    let snapshot = ctx.services.analytics.snapshot(&metrics).await.unwrap();

    assert_eq!(snapshot.total_modules, 1);
    assert_eq!(snapshot.active_modules, 1);
    assert_eq!(snapshot.total_anomalies, 1);
    assert_eq!(snapshot.critical_anomalies, 0);
    assert!((snapshot.total_power_generated - 258.9).abs() < 1e-6);
}
