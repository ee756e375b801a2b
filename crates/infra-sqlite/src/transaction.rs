// SQLite Transaction Implementation

use crate::error::map_sqlx_error;
use crate::queries::{self, EntryRow, SERVED, WAITING};
use async_trait::async_trait;
use sqlx::{Sqlite, Transaction as SqlxTransaction};
use waitlist_core::domain::{EntryId, NewEntry, QueueEntry, Settings};
use waitlist_core::error::{AppError, Result};
use waitlist_core::port::{QueueTransaction, Transaction};

/// Wraps one sqlx transaction; dropping it uncommitted rolls back
pub struct SqliteQueueTransaction<'a> {
    tx: SqlxTransaction<'a, Sqlite>,
}

impl<'a> SqliteQueueTransaction<'a> {
    pub fn new(tx: SqlxTransaction<'a, Sqlite>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl Transaction for SqliteQueueTransaction<'_> {
    async fn commit(self: Box<Self>) -> Result<()> {
        self.tx.commit().await.map_err(map_sqlx_error)
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        self.tx.rollback().await.map_err(map_sqlx_error)
    }
}

#[async_trait]
impl QueueTransaction for SqliteQueueTransaction<'_> {
    async fn read_settings(&mut self) -> Result<Settings> {
        queries::read_settings(&mut *self.tx).await
    }

    async fn count_waiting(&mut self) -> Result<i64> {
        queries::count_waiting(&mut *self.tx).await
    }

    async fn insert_entry(
        &mut self,
        entry: &NewEntry,
        ticket_number: &str,
        position: i64,
        estimated_wait_minutes: i64,
        joined_at: i64,
    ) -> Result<QueueEntry> {
        let row = sqlx::query_as::<_, EntryRow>(
            r#"
            INSERT INTO queue_entries (
                name, email, ticket_number, position, status,
                joined_at, estimated_wait_minutes
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&entry.name)
        .bind(&entry.email)
        .bind(ticket_number)
        .bind(position)
        .bind(WAITING)
        .bind(joined_at)
        .bind(estimated_wait_minutes)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        row.into_entry()
    }

    async fn delete_waiting(&mut self, ticket_number: &str) -> Result<QueueEntry> {
        // Conditional delete: served entries are never removed by a leave
        let row = sqlx::query_as::<_, EntryRow>(
            r#"
            DELETE FROM queue_entries
            WHERE ticket_number = ? AND status = ?
            RETURNING *
            "#,
        )
        .bind(ticket_number)
        .bind(WAITING)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        if let Some(row) = row {
            return row.into_entry();
        }

        // Nothing deleted: unknown ticket or wrong status
        match queries::find_by_ticket(&mut *self.tx, ticket_number).await? {
            None => Err(AppError::NotFound(format!(
                "Ticket {} not found",
                ticket_number
            ))),
            Some(entry) => Err(AppError::InvalidState(format!(
                "Cannot leave queue: ticket {} is {}",
                ticket_number, entry.status
            ))),
        }
    }

    async fn front_waiting(&mut self) -> Result<Option<QueueEntry>> {
        sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT * FROM queue_entries
            WHERE status = ?
            ORDER BY position ASC
            LIMIT 1
            "#,
        )
        .bind(WAITING)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?
        .map(EntryRow::into_entry)
        .transpose()
    }

    async fn mark_served(&mut self, id: EntryId, served_at: i64) -> Result<QueueEntry> {
        let row = sqlx::query_as::<_, EntryRow>(
            r#"
            UPDATE queue_entries
            SET status = ?, served_at = ?
            WHERE id = ? AND status = ?
            RETURNING *
            "#,
        )
        .bind(SERVED)
        .bind(served_at)
        .bind(id)
        .bind(WAITING)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => row.into_entry(),
            None => match queries::find_by_id(&mut *self.tx, id).await? {
                None => Err(AppError::NotFound(format!("Entry {} not found", id))),
                Some(entry) => Err(AppError::InvalidState(format!(
                    "Cannot serve entry {} from {}",
                    id, entry.status
                ))),
            },
        }
    }

    async fn shift_positions_after(&mut self, position: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE queue_entries
            SET position = position - 1
            WHERE status = ? AND position > ?
            "#,
        )
        .bind(WAITING)
        .bind(position)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn recompute_wait_times(&mut self, avg_service_time_minutes: i64) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE queue_entries
            SET estimated_wait_minutes = position * ?
            WHERE status = ?
            "#,
        )
        .bind(avg_service_time_minutes)
        .bind(WAITING)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected())
    }

    async fn write_settings(&mut self, settings: &Settings) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE queue_settings
            SET max_capacity = ?, avg_service_time_minutes = ?
            WHERE id = 1
            "#,
        )
        .bind(settings.max_capacity)
        .bind(settings.avg_service_time_minutes)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn record_served(&mut self, id: EntryId) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE queue_settings
            SET currently_serving_id = ?, total_served_today = total_served_today + 1
            WHERE id = 1
            "#,
        )
        .bind(id)
        .execute(&mut *self.tx)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }
}
