// Queue Repository Port (read side)

use crate::domain::{EntryId, QueueEntry, Settings};
use crate::error::Result;
use async_trait::async_trait;

/// Read-only access to the queue store
#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Count entries with status WAITING
    async fn count_waiting(&self) -> Result<i64>;

    /// WAITING entries ordered by position ascending
    async fn list_waiting(&self) -> Result<Vec<QueueEntry>>;

    /// Find entry by ticket number (any status)
    async fn find_by_ticket(&self, ticket_number: &str) -> Result<Option<QueueEntry>>;

    /// Find entry by ID (any status)
    async fn find_by_id(&self, id: EntryId) -> Result<Option<QueueEntry>>;

    /// Read the settings singleton
    async fn read_settings(&self) -> Result<Settings>;
}

// ============================================================================
// In-memory store for testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::domain::{EntryStatus, NewEntry};
    use crate::error::AppError;
    use crate::application::wait_time;
    use crate::port::maintenance::{served_cutoff, Maintenance, MaintenanceStats};
    use crate::port::time_provider::{SystemTimeProvider, TimeProvider};
    use crate::port::transaction::{QueueTransaction, Transaction, TransactionalQueueRepository};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, Default)]
    pub struct InMemoryState {
        pub entries: Vec<QueueEntry>,
        pub settings: Settings,
        next_id: EntryId,
    }

    impl InMemoryState {
        fn waiting(&self) -> impl Iterator<Item = &QueueEntry> {
            self.entries.iter().filter(|e| e.is_waiting())
        }

        fn waiting_sorted(&self) -> Vec<QueueEntry> {
            let mut waiting: Vec<QueueEntry> = self.waiting().cloned().collect();
            waiting.sort_by_key(|e| e.position);
            waiting
        }
    }

    /// In-memory queue store with copy-on-begin transactions
    pub struct InMemoryQueueRepository {
        state: Arc<Mutex<InMemoryState>>,
        fail_next_recompute: Arc<AtomicBool>,
        time_provider: Arc<dyn TimeProvider>,
    }

    impl Default for InMemoryQueueRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    impl InMemoryQueueRepository {
        pub fn new() -> Self {
            Self::with_settings(Settings::default())
        }

        pub fn with_settings(settings: Settings) -> Self {
            Self {
                state: Arc::new(Mutex::new(InMemoryState {
                    settings,
                    ..Default::default()
                })),
                fail_next_recompute: Arc::new(AtomicBool::new(false)),
                time_provider: Arc::new(SystemTimeProvider),
            }
        }

        pub fn with_time_provider(mut self, time_provider: Arc<dyn TimeProvider>) -> Self {
            self.time_provider = time_provider;
            self
        }

        /// Copy of the committed state
        pub fn snapshot(&self) -> InMemoryState {
            self.state.lock().unwrap().clone()
        }

        /// Make the next `recompute_wait_times` fail (simulates a store failure mid-operation)
        pub fn fail_next_recompute(&self) {
            self.fail_next_recompute.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl QueueRepository for InMemoryQueueRepository {
        async fn count_waiting(&self) -> Result<i64> {
            Ok(self.state.lock().unwrap().waiting().count() as i64)
        }

        async fn list_waiting(&self) -> Result<Vec<QueueEntry>> {
            Ok(self.state.lock().unwrap().waiting_sorted())
        }

        async fn find_by_ticket(&self, ticket_number: &str) -> Result<Option<QueueEntry>> {
            let state = self.state.lock().unwrap();
            Ok(state
                .entries
                .iter()
                .find(|e| e.ticket_number == ticket_number)
                .cloned())
        }

        async fn find_by_id(&self, id: EntryId) -> Result<Option<QueueEntry>> {
            let state = self.state.lock().unwrap();
            Ok(state.entries.iter().find(|e| e.id == id).cloned())
        }

        async fn read_settings(&self) -> Result<Settings> {
            Ok(self.state.lock().unwrap().settings.clone())
        }
    }

    #[async_trait]
    impl TransactionalQueueRepository for InMemoryQueueRepository {
        async fn begin_transaction(&self) -> Result<Box<dyn QueueTransaction>> {
            let working = self.state.lock().unwrap().clone();
            Ok(Box::new(InMemoryTransaction {
                shared: Arc::clone(&self.state),
                working,
                fail_next_recompute: Arc::clone(&self.fail_next_recompute),
            }))
        }
    }

    #[async_trait]
    impl Maintenance for InMemoryQueueRepository {
        async fn reset_daily_stats(&self) -> Result<()> {
            let mut state = self.state.lock().unwrap();
            state.settings.total_served_today = 0;
            state.settings.currently_serving_id = None;
            state.settings.stats_reset_at = Some(self.time_provider.now_millis());
            Ok(())
        }

        async fn gc_served_entries(&self, retention_days: i64) -> Result<i64> {
            let cutoff = served_cutoff(self.time_provider.now_millis(), retention_days);
            let mut state = self.state.lock().unwrap();
            let current = state.settings.currently_serving_id;
            let before = state.entries.len();
            state.entries.retain(|e| {
                let expired = e.status == EntryStatus::Served
                    && e.served_at.is_some_and(|t| t < cutoff)
                    && Some(e.id) != current;
                !expired
            });
            Ok((before - state.entries.len()) as i64)
        }

        async fn vacuum(&self) -> Result<f64> {
            Ok(0.0)
        }

        async fn get_stats(&self) -> Result<MaintenanceStats> {
            let state = self.state.lock().unwrap();
            let waiting = state.waiting().count() as i64;
            let total = state.entries.len() as i64;
            Ok(MaintenanceStats {
                db_size_mb: 0.0,
                db_size_bytes: 0,
                entry_count: total,
                waiting_count: waiting,
                served_count: total - waiting,
            })
        }
    }

    struct InMemoryTransaction {
        shared: Arc<Mutex<InMemoryState>>,
        working: InMemoryState,
        fail_next_recompute: Arc<AtomicBool>,
    }

    impl InMemoryTransaction {
        fn entry_mut(&mut self, id: EntryId) -> Result<&mut QueueEntry> {
            self.working
                .entries
                .iter_mut()
                .find(|e| e.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Entry {} not found", id)))
        }
    }

    #[async_trait]
    impl Transaction for InMemoryTransaction {
        async fn commit(self: Box<Self>) -> Result<()> {
            *self.shared.lock().unwrap() = self.working;
            Ok(())
        }

        async fn rollback(self: Box<Self>) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl QueueTransaction for InMemoryTransaction {
        async fn read_settings(&mut self) -> Result<Settings> {
            Ok(self.working.settings.clone())
        }

        async fn count_waiting(&mut self) -> Result<i64> {
            Ok(self.working.waiting().count() as i64)
        }

        async fn insert_entry(
            &mut self,
            entry: &NewEntry,
            ticket_number: &str,
            position: i64,
            estimated_wait_minutes: i64,
            joined_at: i64,
        ) -> Result<QueueEntry> {
            if self
                .working
                .entries
                .iter()
                .any(|e| e.ticket_number == ticket_number)
            {
                return Err(AppError::Conflict(format!(
                    "Ticket {} already exists",
                    ticket_number
                )));
            }

            self.working.next_id += 1;
            let inserted = QueueEntry {
                id: self.working.next_id,
                name: entry.name.clone(),
                email: entry.email.clone(),
                ticket_number: ticket_number.to_string(),
                position,
                status: EntryStatus::Waiting,
                joined_at,
                served_at: None,
                estimated_wait_minutes,
            };
            self.working.entries.push(inserted.clone());
            Ok(inserted)
        }

        async fn delete_waiting(&mut self, ticket_number: &str) -> Result<QueueEntry> {
            let idx = self
                .working
                .entries
                .iter()
                .position(|e| e.ticket_number == ticket_number)
                .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", ticket_number)))?;

            let entry = &self.working.entries[idx];
            if !entry.is_waiting() {
                return Err(AppError::InvalidState(format!(
                    "Ticket {} is {}, not WAITING",
                    ticket_number, entry.status
                )));
            }
            Ok(self.working.entries.remove(idx))
        }

        async fn front_waiting(&mut self) -> Result<Option<QueueEntry>> {
            Ok(self.working.waiting_sorted().into_iter().next())
        }

        async fn mark_served(&mut self, id: EntryId, served_at: i64) -> Result<QueueEntry> {
            let entry = self.entry_mut(id)?;
            entry
                .serve(served_at)
                .map_err(|e| AppError::InvalidState(e.to_string()))?;
            Ok(entry.clone())
        }

        async fn shift_positions_after(&mut self, position: i64) -> Result<u64> {
            let mut shifted = 0;
            for entry in self
                .working
                .entries
                .iter_mut()
                .filter(|e| e.is_waiting() && e.position > position)
            {
                entry.position -= 1;
                shifted += 1;
            }
            Ok(shifted)
        }

        async fn recompute_wait_times(&mut self, avg_service_time_minutes: i64) -> Result<u64> {
            if self.fail_next_recompute.swap(false, Ordering::SeqCst) {
                return Err(AppError::Database("injected recompute failure".to_string()));
            }
            Ok(wait_time::recompute(
                &mut self.working.entries,
                avg_service_time_minutes,
            ))
        }

        async fn write_settings(&mut self, settings: &Settings) -> Result<()> {
            self.working.settings.max_capacity = settings.max_capacity;
            self.working.settings.avg_service_time_minutes = settings.avg_service_time_minutes;
            Ok(())
        }

        async fn record_served(&mut self, id: EntryId) -> Result<()> {
            self.working.settings.currently_serving_id = Some(id);
            self.working.settings.total_served_today += 1;
            Ok(())
        }
    }
}
