//! Waitlist Daemon - Main Entry Point
//! Composition root: config, logging, store, RPC server, maintenance

mod config;
mod telemetry;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use config::DaemonConfig;
use telemetry::OtelStatus;
use waitlist_api_rpc::RpcServer;
use waitlist_core::application::{MaintenanceScheduler, QueueService};
use waitlist_core::port::{MaintenanceConfig, SystemTimeProvider, TimeRandomTicketGenerator};
use waitlist_infra_sqlite::{create_pool, run_migrations, SqliteMaintenance, SqliteQueueRepository};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration + logging
    let (config, config_warnings) = DaemonConfig::from_env();
    let otel_status = telemetry::init(config.log_format).context("Failed to initialize logging")?;

    info!("Waitlist daemon v{} starting...", VERSION);

    for warning in &config_warnings {
        warn!("{}", warning);
    }
    match otel_status {
        OtelStatus::Disabled => {}
        OtelStatus::Enabled { endpoint } => info!(endpoint = %endpoint, "OpenTelemetry enabled"),
        OtelStatus::FeatureMissing => warn!(
            "OTEL_EXPORTER_OTLP_ENDPOINT set but the 'telemetry' feature is not compiled in"
        ),
        OtelStatus::Failed(e) => warn!(error = %e, "OpenTelemetry init failed, continuing without it"),
    }
    if config.uses_default_admin_token() {
        warn!("WAITLIST_ADMIN_TOKEN not set, using the built-in placeholder token");
    }

    // 2. Database
    info!(db_path = %config.db_path, "Initializing database...");
    let pool = create_pool(&config.db_path)
        .await
        .context("DB pool creation failed")?;
    run_migrations(&pool).await.context("Migration failed")?;

    // 3. Dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let ticket_generator = Arc::new(TimeRandomTicketGenerator::new(time_provider.clone()));
    let queue_repo = Arc::new(SqliteQueueRepository::new(pool.clone()));
    let maintenance = Arc::new(SqliteMaintenance::new(pool.clone(), time_provider.clone()));

    let queue_service = Arc::new(QueueService::new(
        queue_repo.clone(),
        queue_repo,
        ticket_generator,
        time_provider,
    ));

    let stats = queue_service.stats().await.context("Failed to read queue state")?;
    info!(
        waiting = stats.waiting,
        max_capacity = stats.max_capacity,
        avg_service_time_minutes = stats.avg_service_time_minutes,
        "Queue state loaded"
    );

    // 4. JSON-RPC server
    let rpc_server = RpcServer::new(config.rpc.clone(), queue_service, maintenance.clone());
    let (rpc_addr, rpc_handle) = rpc_server
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    // 5. Maintenance scheduler
    let maintenance_config = MaintenanceConfig {
        served_retention_days: config.retention_days,
        ..Default::default()
    };
    let scheduler = MaintenanceScheduler::new(
        maintenance,
        maintenance_config,
        config.maintenance_interval_hours,
    );
    let scheduler_handle = tokio::spawn(scheduler.run());

    info!(addr = %rpc_addr, "System ready. Press Ctrl+C to shutdown");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    info!("Shutdown signal received. Exiting gracefully...");

    scheduler_handle.abort();
    if rpc_handle.stop().is_ok() {
        let _ = tokio::time::timeout(Duration::from_secs(5), rpc_handle.stopped()).await;
    }
    pool.close().await;
    telemetry::shutdown();

    info!("Shutdown complete.");

    Ok(())
}
