// SQLite Maintenance Implementation
use crate::error::map_sqlx_error;
use crate::queries::{SERVED, WAITING};
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;
use waitlist_core::error::{AppError, Result};
use waitlist_core::port::{served_cutoff, Maintenance, MaintenanceStats, TimeProvider};

/// SQLite maintenance implementation
pub struct SqliteMaintenance {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteMaintenance {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }

    /// Store size in bytes (page_count * page_size)
    async fn db_size_bytes(&self) -> Result<i64> {
        let page_count: i64 = sqlx::query_scalar("PRAGMA page_count")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get page count: {}", e)))?;

        let page_size: i64 = sqlx::query_scalar("PRAGMA page_size")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get page size: {}", e)))?;

        Ok(page_count * page_size)
    }

    async fn count_with_status(&self, status: &str) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM queue_entries WHERE status = ?")
            .bind(status)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

fn bytes_to_mb(bytes: i64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}

#[async_trait]
impl Maintenance for SqliteMaintenance {
    async fn reset_daily_stats(&self) -> Result<()> {
        let now = self.time_provider.now_millis();

        sqlx::query(
            r#"
            UPDATE queue_settings
            SET total_served_today = 0, currently_serving_id = NULL, stats_reset_at = ?
            WHERE id = 1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        info!(reset_at = now, "Daily stats reset");
        Ok(())
    }

    async fn gc_served_entries(&self, retention_days: i64) -> Result<i64> {
        let cutoff_time = served_cutoff(self.time_provider.now_millis(), retention_days);

        info!(
            retention_days = retention_days,
            cutoff_time = cutoff_time,
            "Running served entry GC"
        );

        // Without COALESCE a NULL pointer would make `id <> NULL` match nothing
        let result = sqlx::query(
            r#"
            DELETE FROM queue_entries
            WHERE status = ?
            AND served_at IS NOT NULL
            AND served_at < ?
            AND id <> COALESCE(
                (SELECT currently_serving_id FROM queue_settings WHERE id = 1), -1
            )
            "#,
        )
        .bind(SERVED)
        .bind(cutoff_time)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let deleted = result.rows_affected() as i64;

        info!(deleted_entries = deleted, "Served entry GC completed");

        Ok(deleted)
    }

    async fn vacuum(&self) -> Result<f64> {
        info!("Running VACUUM to optimize database...");

        let size_before = bytes_to_mb(self.db_size_bytes().await?);

        sqlx::query("VACUUM")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Internal(format!("VACUUM failed: {}", e)))?;

        let size_after = bytes_to_mb(self.db_size_bytes().await?);
        let reclaimed = (size_before - size_after).max(0.0);

        info!(
            size_before_mb = size_before,
            size_after_mb = size_after,
            reclaimed_mb = reclaimed,
            "VACUUM completed"
        );

        Ok(reclaimed)
    }

    async fn get_stats(&self) -> Result<MaintenanceStats> {
        let db_size_bytes = self.db_size_bytes().await?;

        let entry_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM queue_entries")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(MaintenanceStats {
            db_size_mb: bytes_to_mb(db_size_bytes),
            db_size_bytes,
            entry_count,
            waiting_count: self.count_with_status(WAITING).await?,
            served_count: self.count_with_status(SERVED).await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations, SqliteQueueRepository};
    use waitlist_core::domain::NewEntry;
    use waitlist_core::port::time_provider::mocks::FixedTimeProvider;
    use waitlist_core::port::{QueueRepository, TransactionalQueueRepository};

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    async fn setup(now_ms: i64) -> (SqliteQueueRepository, SqliteMaintenance) {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        let clock = Arc::new(FixedTimeProvider::new(now_ms));
        (
            SqliteQueueRepository::new(pool.clone()),
            SqliteMaintenance::new(pool, clock),
        )
    }

    /// Insert one entry per `served_at`, serving each; the last one stays current
    async fn seed_served(repo: &SqliteQueueRepository, served_at: &[i64]) {
        let mut tx = repo.begin_transaction().await.unwrap();
        for (i, at) in served_at.iter().enumerate() {
            let entry = tx
                .insert_entry(
                    &NewEntry::new(&format!("P{}", i), None).unwrap(),
                    &format!("S-{}", i),
                    1,
                    0,
                    0,
                )
                .await
                .unwrap();
            tx.mark_served(entry.id, *at).await.unwrap();
            tx.record_served(entry.id).await.unwrap();
        }
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_maintenance_stats() {
        let (_repo, maintenance) = setup(0).await;

        let stats = maintenance.get_stats().await.unwrap();

        assert!(stats.db_size_mb > 0.0);
        assert!(stats.db_size_bytes > 0);
        assert_eq!(stats.entry_count, 0);
        assert_eq!(stats.served_count, 0);
    }

    #[tokio::test]
    async fn test_vacuum() {
        let (_repo, maintenance) = setup(0).await;

        let reclaimed = maintenance.vacuum().await.unwrap();
        assert!(reclaimed >= 0.0);
    }

    #[tokio::test]
    async fn test_reset_daily_stats() {
        let (repo, maintenance) = setup(42_000).await;
        seed_served(&repo, &[1000, 2000]).await;

        let before = repo.read_settings().await.unwrap();
        assert_eq!(before.total_served_today, 2);
        assert!(before.currently_serving_id.is_some());

        maintenance.reset_daily_stats().await.unwrap();

        let after = repo.read_settings().await.unwrap();
        assert_eq!(after.total_served_today, 0);
        assert_eq!(after.currently_serving_id, None);
        assert_eq!(after.stats_reset_at, Some(42_000));
        assert_eq!(after.max_capacity, before.max_capacity);
    }

    #[tokio::test]
    async fn test_gc_served_entries_spares_current() {
        let now = 20 * DAY_MS;
        let (repo, maintenance) = setup(now).await;

        // Two old entries, the second still currently serving
        seed_served(&repo, &[DAY_MS, 2 * DAY_MS]).await;

        let deleted = maintenance.gc_served_entries(7).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(repo.find_by_ticket("S-0").await.unwrap().is_none());
        assert!(repo.find_by_ticket("S-1").await.unwrap().is_some());

        maintenance.reset_daily_stats().await.unwrap();
        assert_eq!(maintenance.gc_served_entries(7).await.unwrap(), 1);

        let stats = maintenance.get_stats().await.unwrap();
        assert_eq!(stats.entry_count, 0);
    }

    #[tokio::test]
    async fn test_gc_never_touches_waiting_entries() {
        let (repo, maintenance) = setup(30 * DAY_MS).await;

        let mut tx = repo.begin_transaction().await.unwrap();
        tx.insert_entry(&NewEntry::new("Old", None).unwrap(), "W-1", 1, 20, 0)
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert_eq!(maintenance.gc_served_entries(1).await.unwrap(), 0);
        assert_eq!(repo.count_waiting().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_gc_with_huge_retention_keeps_everything() {
        let (repo, maintenance) = setup(20 * DAY_MS).await;
        seed_served(&repo, &[DAY_MS, 2 * DAY_MS]).await;
        maintenance.reset_daily_stats().await.unwrap();

        assert_eq!(maintenance.gc_served_entries(i64::MAX / 1000).await.unwrap(), 0);
        assert_eq!(maintenance.gc_served_entries(i64::MAX).await.unwrap(), 0);
        assert_eq!(maintenance.get_stats().await.unwrap().served_count, 2);
    }
}
