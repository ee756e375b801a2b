// Store Maintenance port: daily counter reset, served-entry GC, VACUUM
use crate::error::Result;
use async_trait::async_trait;

/// Store maintenance statistics
#[derive(Debug, Clone)]
pub struct MaintenanceStats {
    pub db_size_mb: f64,
    pub db_size_bytes: i64,
    pub entry_count: i64,
    pub waiting_count: i64,
    pub served_count: i64,
}

/// Upper bound for served-entry retention (about ten years)
pub const MAX_RETENTION_DAYS: i64 = 3650;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Cutoff (epoch ms) before which SERVED entries are collectable
///
/// Negative retention counts as zero; large values saturate instead of wrapping.
pub fn served_cutoff(now_millis: i64, retention_days: i64) -> i64 {
    now_millis.saturating_sub(retention_days.max(0).saturating_mul(DAY_MS))
}

/// Outcome of one full maintenance run
#[derive(Debug, Clone)]
pub struct MaintenanceReport {
    pub before: MaintenanceStats,
    pub after: MaintenanceStats,
    pub daily_stats_reset: bool,
    pub deleted_entries: i64,
    /// `None` when VACUUM did not run
    pub reclaimed_mb: Option<f64>,
}

/// Maintenance configuration
#[derive(Debug, Clone)]
pub struct MaintenanceConfig {
    /// Retention period for served entries (days)
    pub served_retention_days: i64,

    /// Reset `total_served_today` and `currently_serving_id` on each run
    pub reset_daily_stats: bool,

    /// Store size above which VACUUM runs (MB)
    pub max_db_size_mb: f64,

    /// VACUUM regardless of size
    pub force_vacuum: bool,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        Self {
            served_retention_days: 7,
            reset_daily_stats: true,
            max_db_size_mb: 100.0,
            force_vacuum: false,
        }
    }
}

/// Store maintenance operations
#[async_trait]
pub trait Maintenance: Send + Sync {
    /// Zero the daily served counter and clear the currently-serving pointer
    async fn reset_daily_stats(&self) -> Result<()>;

    /// Delete SERVED entries older than the retention period
    ///
    /// The entry referenced by `currently_serving_id` is never deleted.
    ///
    /// # Returns
    /// Number of entries deleted
    async fn gc_served_entries(&self, retention_days: i64) -> Result<i64>;

    /// Run VACUUM to reclaim space
    ///
    /// # Returns
    /// Space reclaimed in MB
    async fn vacuum(&self) -> Result<f64>;

    /// Get maintenance statistics
    async fn get_stats(&self) -> Result<MaintenanceStats>;

    /// Run full maintenance (reset + GC + VACUUM if forced or large)
    async fn run_full_maintenance(&self, config: &MaintenanceConfig) -> Result<MaintenanceReport> {
        let stats_before = self.get_stats().await?;

        if config.reset_daily_stats {
            self.reset_daily_stats().await?;
        }

        let deleted_entries = self.gc_served_entries(config.served_retention_days).await?;

        let vacuum_due =
            config.force_vacuum || stats_before.db_size_mb > config.max_db_size_mb;
        let reclaimed_mb = if vacuum_due {
            Some(self.vacuum().await?)
        } else {
            None
        };

        let stats_after = self.get_stats().await?;

        tracing::info!(
            daily_stats_reset = config.reset_daily_stats,
            retention_days = config.served_retention_days,
            deleted_entries = deleted_entries,
            vacuum_run = reclaimed_mb.is_some(),
            db_size_mb = stats_after.db_size_mb,
            "Maintenance completed"
        );

        Ok(MaintenanceReport {
            before: stats_before,
            after: stats_after,
            daily_stats_reset: config.reset_daily_stats,
            deleted_entries,
            reclaimed_mb,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_served_cutoff() {
        assert_eq!(served_cutoff(10 * DAY_MS, 7), 3 * DAY_MS);
        assert_eq!(served_cutoff(10 * DAY_MS, 0), 10 * DAY_MS);
        assert_eq!(served_cutoff(10 * DAY_MS, -5), 10 * DAY_MS);
    }

    #[test]
    fn test_served_cutoff_saturates_on_huge_retention() {
        // Saturated cutoff lies before every timestamp, so nothing is collected
        let floor = 10 * DAY_MS - i64::MAX;
        assert_eq!(served_cutoff(10 * DAY_MS, i64::MAX / 1000), floor);
        assert_eq!(served_cutoff(10 * DAY_MS, i64::MAX), floor);
        assert!(floor < 0);
    }
}
