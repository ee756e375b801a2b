// Application Layer - Queue use cases

pub mod maintenance;
pub mod queue;
pub mod wait_time;

// Re-exports
pub use maintenance::MaintenanceScheduler;
pub use queue::{JoinRequest, JoinResponse, QueueService, ServeOutcome};
