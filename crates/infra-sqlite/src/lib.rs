// Waitlist Infrastructure - SQLite Adapter
// Implements: QueueRepository, TransactionalQueueRepository, Maintenance

mod connection;
mod error;
mod maintenance_impl;
mod migration;
mod queue_repository;
mod queries;
mod transaction;

pub use connection::create_pool;
pub use maintenance_impl::SqliteMaintenance;
pub use migration::run_migrations;
pub use queue_repository::SqliteQueueRepository;
pub use transaction::SqliteQueueTransaction;

// Note: sqlx::Error conversion is handled by `error::map_sqlx_error`
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
