// Row types and queries shared by the pool-backed repository and transactions

use crate::error::map_sqlx_error;
use sqlx::{Executor, Sqlite};
use waitlist_core::domain::{EntryId, EntryStatus, QueueEntry, Settings};
use waitlist_core::error::{AppError, Result};

pub(crate) const WAITING: &str = "WAITING";
pub(crate) const SERVED: &str = "SERVED";

/// SQLite row representation of a queue entry
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct EntryRow {
    id: i64,
    name: String,
    email: Option<String>,
    ticket_number: String,
    position: i64,
    status: String,
    joined_at: i64,
    served_at: Option<i64>,
    estimated_wait_minutes: i64,
}

impl EntryRow {
    pub(crate) fn into_entry(self) -> Result<QueueEntry> {
        let status = EntryStatus::parse(&self.status).ok_or_else(|| {
            AppError::Internal(format!(
                "Unknown status {} for entry {}",
                self.status, self.id
            ))
        })?;

        Ok(QueueEntry {
            id: self.id,
            name: self.name,
            email: self.email,
            ticket_number: self.ticket_number,
            position: self.position,
            status,
            joined_at: self.joined_at,
            served_at: self.served_at,
            estimated_wait_minutes: self.estimated_wait_minutes,
        })
    }
}

/// SQLite row representation of the settings singleton
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SettingsRow {
    max_capacity: i64,
    avg_service_time_minutes: i64,
    currently_serving_id: Option<i64>,
    total_served_today: i64,
    stats_reset_at: Option<i64>,
}

impl SettingsRow {
    fn into_settings(self) -> Settings {
        Settings {
            max_capacity: self.max_capacity,
            avg_service_time_minutes: self.avg_service_time_minutes,
            currently_serving_id: self.currently_serving_id,
            total_served_today: self.total_served_today,
            stats_reset_at: self.stats_reset_at,
        }
    }
}

pub(crate) async fn read_settings<'e, E>(executor: E) -> Result<Settings>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, SettingsRow>(
        r#"
        SELECT max_capacity, avg_service_time_minutes, currently_serving_id,
               total_served_today, stats_reset_at
        FROM queue_settings
        WHERE id = 1
        "#,
    )
    .fetch_optional(executor)
    .await
    .map_err(map_sqlx_error)?;

    row.map(SettingsRow::into_settings).ok_or_else(|| {
        AppError::Internal("Settings row missing (migrations not run?)".to_string())
    })
}

pub(crate) async fn count_waiting<'e, E>(executor: E) -> Result<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM queue_entries WHERE status = ?")
        .bind(WAITING)
        .fetch_one(executor)
        .await
        .map_err(map_sqlx_error)
}

pub(crate) async fn find_by_ticket<'e, E>(
    executor: E,
    ticket_number: &str,
) -> Result<Option<QueueEntry>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, EntryRow>("SELECT * FROM queue_entries WHERE ticket_number = ?")
        .bind(ticket_number)
        .fetch_optional(executor)
        .await
        .map_err(map_sqlx_error)?
        .map(EntryRow::into_entry)
        .transpose()
}

pub(crate) async fn find_by_id<'e, E>(executor: E, id: EntryId) -> Result<Option<QueueEntry>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, EntryRow>("SELECT * FROM queue_entries WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
        .map_err(map_sqlx_error)?
        .map(EntryRow::into_entry)
        .transpose()
}

pub(crate) async fn list_waiting<'e, E>(executor: E) -> Result<Vec<QueueEntry>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows: Vec<EntryRow> = sqlx::query_as(
        r#"
        SELECT * FROM queue_entries
        WHERE status = ?
        ORDER BY position ASC
        "#,
    )
    .bind(WAITING)
    .fetch_all(executor)
    .await
    .map_err(map_sqlx_error)?;

    rows.into_iter().map(EntryRow::into_entry).collect()
}
