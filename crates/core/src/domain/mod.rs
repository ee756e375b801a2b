// Domain Layer - Pure queue bookkeeping entities

pub mod entry;
pub mod error;
pub mod settings;
pub mod stats;

// Re-exports
pub use entry::{EntryId, EntryStatus, NewEntry, QueueEntry, TicketNumber};
pub use error::DomainError;
pub use settings::{Settings, SettingsUpdate};
pub use stats::{QueueSnapshot, QueueStats};
