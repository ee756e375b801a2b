// Maintenance Service
// Periodic daily-counter reset and served-entry cleanup

use crate::error::Result;
use crate::port::{Maintenance, MaintenanceConfig, MaintenanceStats};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// Maintenance scheduler
///
/// Runs full maintenance (reset + GC + optional VACUUM) in the background
pub struct MaintenanceScheduler {
    maintenance: Arc<dyn Maintenance>,
    config: MaintenanceConfig,
    period: Duration,
}

impl MaintenanceScheduler {
    /// Create a new maintenance scheduler
    ///
    /// # Arguments
    /// * `maintenance` - Maintenance implementation
    /// * `config` - Maintenance configuration
    /// * `interval_hours` - How often to run maintenance (hours)
    pub fn new(
        maintenance: Arc<dyn Maintenance>,
        config: MaintenanceConfig,
        interval_hours: u64,
    ) -> Self {
        Self::with_period(
            maintenance,
            config,
            Duration::from_secs(interval_hours.max(1).saturating_mul(3600)),
        )
    }

    pub fn with_period(
        maintenance: Arc<dyn Maintenance>,
        config: MaintenanceConfig,
        period: Duration,
    ) -> Self {
        Self {
            maintenance,
            config,
            period,
        }
    }

    /// Run maintenance loop (background task)
    ///
    /// The first tick is skipped so a restart does not wipe today's counters.
    /// Should be spawned in tokio::spawn
    pub async fn run(self) {
        info!(
            period_secs = self.period.as_secs(),
            retention_days = self.config.served_retention_days,
            "Maintenance scheduler started"
        );

        let mut tick = interval(self.period);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tick.tick().await;

        loop {
            tick.tick().await;

            info!("Running scheduled maintenance...");

            match self.maintenance.run_full_maintenance(&self.config).await {
                Ok(report) => {
                    let stats = report.after;
                    info!(
                        db_size_mb = stats.db_size_mb,
                        entries = stats.entry_count,
                        waiting = stats.waiting_count,
                        served = stats.served_count,
                        "Scheduled maintenance completed successfully"
                    );
                }
                Err(e) => {
                    error!(error = ?e, "Scheduled maintenance failed");
                }
            }
        }
    }

    /// Run maintenance immediately (for manual trigger)
    pub async fn run_now(&self) -> Result<MaintenanceStats> {
        info!("Running manual maintenance...");

        let stats = self.maintenance.run_full_maintenance(&self.config).await?.after;

        info!(
            db_size_mb = stats.db_size_mb,
            entries = stats.entry_count,
            "Manual maintenance completed"
        );

        Ok(stats)
    }
}
