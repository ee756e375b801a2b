// SQLite QueueRepository Implementation

use crate::error::map_sqlx_error;
use crate::queries;
use crate::SqliteQueueTransaction;
use async_trait::async_trait;
use sqlx::SqlitePool;
use waitlist_core::domain::{EntryId, QueueEntry, Settings};
use waitlist_core::error::Result;
use waitlist_core::port::{QueueRepository, QueueTransaction, TransactionalQueueRepository};

pub struct SqliteQueueRepository {
    pool: SqlitePool,
}

impl SqliteQueueRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueueRepository for SqliteQueueRepository {
    async fn count_waiting(&self) -> Result<i64> {
        queries::count_waiting(&self.pool).await
    }

    async fn list_waiting(&self) -> Result<Vec<QueueEntry>> {
        queries::list_waiting(&self.pool).await
    }

    async fn find_by_ticket(&self, ticket_number: &str) -> Result<Option<QueueEntry>> {
        queries::find_by_ticket(&self.pool, ticket_number).await
    }

    async fn find_by_id(&self, id: EntryId) -> Result<Option<QueueEntry>> {
        queries::find_by_id(&self.pool, id).await
    }

    async fn read_settings(&self) -> Result<Settings> {
        queries::read_settings(&self.pool).await
    }
}

#[async_trait]
impl TransactionalQueueRepository for SqliteQueueRepository {
    async fn begin_transaction(&self) -> Result<Box<dyn QueueTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteQueueTransaction::new(tx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_migrations};
    use waitlist_core::domain::{EntryStatus, NewEntry};
    use waitlist_core::error::AppError;

    async fn setup_test_repo() -> SqliteQueueRepository {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteQueueRepository::new(pool)
    }

    async fn insert_waiting(repo: &SqliteQueueRepository, names: &[&str]) {
        let mut tx = repo.begin_transaction().await.unwrap();
        for (i, name) in names.iter().enumerate() {
            let position = i as i64 + 1;
            tx.insert_entry(
                &NewEntry::new(name, None).unwrap(),
                &format!("T-{}", name),
                position,
                position * 20,
                1000 + i as i64,
            )
            .await
            .unwrap();
        }
        tx.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = setup_test_repo().await;
        insert_waiting(&repo, &["A"]).await;

        let found = repo.find_by_ticket("T-A").await.unwrap().unwrap();
        assert_eq!(found.name, "A");
        assert_eq!(found.position, 1);
        assert_eq!(found.status, EntryStatus::Waiting);
        assert_eq!(found.estimated_wait_minutes, 20);

        let by_id = repo.find_by_id(found.id).await.unwrap();
        assert_eq!(by_id, Some(found));
        assert!(repo.find_by_ticket("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_waiting_is_ordered() {
        let repo = setup_test_repo().await;
        insert_waiting(&repo, &["A", "B", "C"]).await;

        let names: Vec<String> = repo
            .list_waiting()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(repo.count_waiting().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_ticket_rejected() {
        let repo = setup_test_repo().await;
        insert_waiting(&repo, &["A"]).await;

        let mut tx = repo.begin_transaction().await.unwrap();
        let err = tx
            .insert_entry(&NewEntry::new("Other", None).unwrap(), "T-A", 2, 40, 2000)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_uncommitted_transaction_is_discarded() {
        let repo = setup_test_repo().await;
        insert_waiting(&repo, &["A", "B"]).await;

        {
            let mut tx = repo.begin_transaction().await.unwrap();
            tx.delete_waiting("T-A").await.unwrap();
            tx.shift_positions_after(1).await.unwrap();
            // dropped without commit
        }

        let waiting = repo.list_waiting().await.unwrap();
        assert_eq!(waiting.len(), 2);
        assert_eq!(waiting[0].ticket_number, "T-A");
        assert_eq!(waiting[1].position, 2);
    }

    #[tokio::test]
    async fn test_default_settings() {
        let repo = setup_test_repo().await;
        let settings = repo.read_settings().await.unwrap();
        assert_eq!(settings, Settings::default());
    }
}
