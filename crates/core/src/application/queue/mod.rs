// Queue Service - join / leave / serve-next / settings / stats

pub mod join;
pub mod leave;
pub mod serve;
pub mod settings;
pub mod stats;

#[cfg(test)]
mod service_test;

pub use join::{JoinRequest, JoinResponse};
pub use serve::ServeOutcome;

use crate::domain::{QueueEntry, QueueSnapshot, QueueStats, Settings, SettingsUpdate};
use crate::error::Result;
use crate::port::{QueueRepository, TicketGenerator, TimeProvider, TransactionalQueueRepository};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Queue Service
///
/// Owns the store handles; tests build one per isolated store.
/// Mutating operations are serialized through `write_lock` so the store
/// only ever sees a single writer.
pub struct QueueService {
    queue_repo: Arc<dyn QueueRepository>,
    tx_queue_repo: Arc<dyn TransactionalQueueRepository>,
    ticket_generator: Arc<dyn TicketGenerator>,
    time_provider: Arc<dyn TimeProvider>,
    write_lock: Mutex<()>,
}

impl QueueService {
    pub fn new(
        queue_repo: Arc<dyn QueueRepository>,
        tx_queue_repo: Arc<dyn TransactionalQueueRepository>,
        ticket_generator: Arc<dyn TicketGenerator>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            queue_repo,
            tx_queue_repo,
            ticket_generator,
            time_provider,
            write_lock: Mutex::new(()),
        }
    }

    /// Join the queue at the tail
    pub async fn join(&self, req: JoinRequest) -> Result<JoinResponse> {
        let _guard = self.write_lock.lock().await;
        join::execute(
            self.tx_queue_repo.as_ref(),
            self.ticket_generator.as_ref(),
            self.time_provider.as_ref(),
            req,
        )
        .await
    }

    /// Leave the queue; returns the removed entry
    pub async fn leave(&self, ticket_number: &str) -> Result<QueueEntry> {
        let _guard = self.write_lock.lock().await;
        leave::execute(self.tx_queue_repo.as_ref(), ticket_number).await
    }

    /// Serve the front entry; `None` when the queue is empty
    pub async fn serve_next(&self) -> Result<Option<QueueEntry>> {
        Ok(self.serve_next_with_counts().await?.served)
    }

    /// Serve the front entry and report the counters as of that serve
    pub async fn serve_next_with_counts(&self) -> Result<ServeOutcome> {
        let _guard = self.write_lock.lock().await;
        serve::execute(self.tx_queue_repo.as_ref(), self.time_provider.as_ref()).await
    }

    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings> {
        let _guard = self.write_lock.lock().await;
        settings::execute(self.tx_queue_repo.as_ref(), update).await
    }

    pub async fn stats(&self) -> Result<QueueStats> {
        stats::stats(self.queue_repo.as_ref()).await
    }

    /// Stats plus the ordered waiting list
    pub async fn snapshot(&self) -> Result<QueueSnapshot> {
        stats::snapshot(self.queue_repo.as_ref()).await
    }

    pub async fn get_ticket(&self, ticket_number: &str) -> Result<QueueEntry> {
        stats::get_ticket(self.queue_repo.as_ref(), ticket_number).await
    }
}
