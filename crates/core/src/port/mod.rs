// Port Layer - Interfaces for external dependencies

pub mod maintenance;
pub mod queue_repository;
pub mod ticket_generator; // For deterministic testing
pub mod time_provider;
pub mod transaction;

// Re-exports
pub use maintenance::{
    served_cutoff, Maintenance, MaintenanceConfig, MaintenanceReport, MaintenanceStats,
    MAX_RETENTION_DAYS,
};
pub use queue_repository::QueueRepository;
pub use ticket_generator::{TicketGenerator, TimeRandomTicketGenerator};
pub use time_provider::{SystemTimeProvider, TimeProvider};
pub use transaction::{QueueTransaction, Transaction, TransactionalQueueRepository};
