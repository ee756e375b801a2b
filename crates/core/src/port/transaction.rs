// Transaction port for atomic queue updates

use crate::domain::{EntryId, NewEntry, QueueEntry, Settings};
use crate::error::Result;
use async_trait::async_trait;

/// Transaction trait for atomic multi-step operations
///
/// Dropping a transaction without committing discards every write made through it.
#[async_trait]
pub trait Transaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Transactional queue store
#[async_trait]
pub trait TransactionalQueueRepository: Send + Sync {
    /// Begin a new transaction
    async fn begin_transaction(&self) -> Result<Box<dyn QueueTransaction>>;
}

/// Queue store operations within a transaction
#[async_trait]
pub trait QueueTransaction: Transaction {
    /// Read the settings singleton
    async fn read_settings(&mut self) -> Result<Settings>;

    /// Count entries with status WAITING
    async fn count_waiting(&mut self) -> Result<i64>;

    /// Insert a WAITING entry; fails with `Conflict` on a duplicate ticket
    async fn insert_entry(
        &mut self,
        entry: &NewEntry,
        ticket_number: &str,
        position: i64,
        estimated_wait_minutes: i64,
        joined_at: i64,
    ) -> Result<QueueEntry>;

    /// Delete a WAITING entry and return it
    ///
    /// # Errors
    /// - `NotFound` if no entry has this ticket
    /// - `InvalidState` if the entry is not WAITING
    async fn delete_waiting(&mut self, ticket_number: &str) -> Result<QueueEntry>;

    /// The WAITING entry at the front of the queue
    async fn front_waiting(&mut self) -> Result<Option<QueueEntry>>;

    /// WAITING -> SERVED, stamping `served_at`
    async fn mark_served(&mut self, id: EntryId, served_at: i64) -> Result<QueueEntry>;

    /// Decrement the position of every WAITING entry behind `position` (one range update)
    async fn shift_positions_after(&mut self, position: i64) -> Result<u64>;

    /// Set `estimated_wait_minutes = position * avg` for every WAITING entry
    async fn recompute_wait_times(&mut self, avg_service_time_minutes: i64) -> Result<u64>;

    /// Persist capacity and average service time
    async fn write_settings(&mut self, settings: &Settings) -> Result<()>;

    /// Point `currently_serving_id` at `id` and bump `total_served_today`
    async fn record_served(&mut self, id: EntryId) -> Result<()>;
}
