use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_solar_readings_table::Migration),
            Box::new(m20240301_000002_create_environmental_readings_table::Migration),
            Box::new(m20240301_000003_create_predictions_table::Migration),
            Box::new(m20240301_000004_create_anomalies_table::Migration),
            Box::new(m20240301_000005_create_optimization_results_table::Migration),
            Box::new(m20240301_000006_create_system_metrics_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_solar_readings_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_solar_readings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SolarReadings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SolarReadings::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SolarReadings::ModuleId).string().not_null())
                        .col(
                            ColumnDef::new(SolarReadings::OpenCircuitVoltage)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SolarReadings::MaxPowerVoltage)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SolarReadings::MaxPowerCurrent)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SolarReadings::ShortCircuitCurrent)
                                .double()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SolarReadings::MaxPower).double().not_null())
                        .col(
                            ColumnDef::new(SolarReadings::Efficiency)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SolarReadings::CellTemperature)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SolarReadings::Timestamp)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SolarReadings::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_solar_readings_module_timestamp")
                        .table(SolarReadings::Table)
                        .col(SolarReadings::ModuleId)
                        .col(SolarReadings::Timestamp)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SolarReadings::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum SolarReadings {
        Table,
        Id,
        ModuleId,
        OpenCircuitVoltage,
        MaxPowerVoltage,
        MaxPowerCurrent,
        ShortCircuitCurrent,
        MaxPower,
        Efficiency,
        CellTemperature,
        Timestamp,
        CreatedAt,
    }
}

mod m20240301_000002_create_environmental_readings_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_environmental_readings_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(EnvironmentalReadings::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(EnvironmentalReadings::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EnvironmentalReadings::LocationId)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EnvironmentalReadings::AmbientTemperature)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EnvironmentalReadings::Irradiance)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EnvironmentalReadings::Humidity)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EnvironmentalReadings::WindSpeed)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EnvironmentalReadings::Precipitation)
                                .double()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(EnvironmentalReadings::Cloudiness)
                                .double()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(EnvironmentalReadings::Timestamp)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EnvironmentalReadings::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_environmental_readings_location_timestamp")
                        .table(EnvironmentalReadings::Table)
                        .col(EnvironmentalReadings::LocationId)
                        .col(EnvironmentalReadings::Timestamp)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(EnvironmentalReadings::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum EnvironmentalReadings {
        Table,
        Id,
        LocationId,
        AmbientTemperature,
        Irradiance,
        Humidity,
        WindSpeed,
        Precipitation,
        Cloudiness,
        Timestamp,
        CreatedAt,
    }
}

mod m20240301_000003_create_predictions_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_predictions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Predictions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Predictions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Predictions::ModelType).string().not_null())
                        .col(ColumnDef::new(Predictions::InputData).json().not_null())
                        .col(
                            ColumnDef::new(Predictions::PredictionResult)
                                .json()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Predictions::ConfidenceScore).double().null())
                        .col(ColumnDef::new(Predictions::ModuleId).string().null())
                        .col(ColumnDef::new(Predictions::LocationId).string().null())
                        .col(
                            ColumnDef::new(Predictions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Predictions::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Predictions {
        Table,
        Id,
        ModelType,
        InputData,
        PredictionResult,
        ConfidenceScore,
        ModuleId,
        LocationId,
        CreatedAt,
    }
}

mod m20240301_000004_create_anomalies_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_anomalies_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Anomalies::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Anomalies::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Anomalies::ModuleId).string().not_null())
                        .col(ColumnDef::new(Anomalies::AnomalyType).string().not_null())
                        .col(ColumnDef::new(Anomalies::SeverityLevel).string().not_null())
                        .col(ColumnDef::new(Anomalies::Confidence).string().not_null())
                        .col(ColumnDef::new(Anomalies::Description).string().not_null())
                        .col(
                            ColumnDef::new(Anomalies::RecommendedAction)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Anomalies::Priority).string().not_null())
                        .col(ColumnDef::new(Anomalies::Timeframe).string().not_null())
                        .col(ColumnDef::new(Anomalies::IsolationScore).double().null())
                        .col(
                            ColumnDef::new(Anomalies::ReconstructionError)
                                .double()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Anomalies::Status)
                                .string()
                                .not_null()
                                .default("active"),
                        )
                        .col(
                            ColumnDef::new(Anomalies::ResolvedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Anomalies::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name("idx_anomalies_status_severity")
                        .table(Anomalies::Table)
                        .col(Anomalies::Status)
                        .col(Anomalies::SeverityLevel)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Anomalies::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Anomalies {
        Table,
        Id,
        ModuleId,
        AnomalyType,
        SeverityLevel,
        Confidence,
        Description,
        RecommendedAction,
        Priority,
        Timeframe,
        IsolationScore,
        ReconstructionError,
        Status,
        ResolvedAt,
        CreatedAt,
    }
}

mod m20240301_000005_create_optimization_results_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_optimization_results_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(OptimizationResults::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OptimizationResults::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OptimizationResults::LocationId)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OptimizationResults::Technology)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OptimizationResults::OptimalConfig)
                                .json()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OptimizationResults::EnergyEfficiency)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OptimizationResults::ExpectedLifespan)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OptimizationResults::TotalCost)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OptimizationResults::Co2Avoided)
                                .double()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OptimizationResults::OptimizationType)
                                .string()
                                .not_null()
                                .default("multi_objective"),
                        )
                        .col(
                            ColumnDef::new(OptimizationResults::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OptimizationResults::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum OptimizationResults {
        Table,
        Id,
        LocationId,
        Technology,
        OptimalConfig,
        EnergyEfficiency,
        ExpectedLifespan,
        TotalCost,
        Co2Avoided,
        OptimizationType,
        CreatedAt,
    }
}

mod m20240301_000006_create_system_metrics_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000006_create_system_metrics_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SystemMetrics::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SystemMetrics::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SystemMetrics::TotalModules)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SystemMetrics::ActiveModules)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SystemMetrics::TotalPowerGenerated)
                                .double()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SystemMetrics::AverageEfficiency)
                                .double()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SystemMetrics::TotalAnomalies)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SystemMetrics::CriticalAnomalies)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SystemMetrics::ResolvedAnomalies)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SystemMetrics::AverageTemperature)
                                .double()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SystemMetrics::AverageIrradiance)
                                .double()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SystemMetrics::AverageHumidity)
                                .double()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SystemMetrics::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SystemMetrics::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum SystemMetrics {
        Table,
        Id,
        TotalModules,
        ActiveModules,
        TotalPowerGenerated,
        AverageEfficiency,
        TotalAnomalies,
        CriticalAnomalies,
        ResolvedAnomalies,
        AverageTemperature,
        AverageIrradiance,
        AverageHumidity,
        CreatedAt,
    }
}
