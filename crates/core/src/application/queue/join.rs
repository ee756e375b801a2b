// Join Use Case

use crate::application::wait_time::estimated_wait_minutes;
use crate::domain::NewEntry;
use crate::error::{AppError, Result};
use crate::port::{TicketGenerator, TimeProvider, TransactionalQueueRepository};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Join request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRequest {
    pub name: String,

    #[serde(default)]
    pub email: Option<String>,
}

/// Ticket handed back to the person who joined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinResponse {
    pub ticket_number: String,
    pub position: i64,
    pub estimated_wait_minutes: i64,
    pub name: String,
    pub email: Option<String>,
}

/// Validate the join request shape
pub fn validate_request(req: &JoinRequest) -> Result<NewEntry> {
    Ok(NewEntry::new(&req.name, req.email.as_deref())?)
}

/// Execute join use case (count + insert in one transaction)
///
/// # Errors
/// - `Domain(ValidationError)` if the name is blank
/// - `QueueFull` if waiting entries already reach `max_capacity`
pub async fn execute(
    queue_repo: &dyn TransactionalQueueRepository,
    ticket_generator: &dyn TicketGenerator,
    time_provider: &dyn TimeProvider,
    req: JoinRequest,
) -> Result<JoinResponse> {
    let new_entry = validate_request(&req)?;

    let mut tx = queue_repo.begin_transaction().await?;

    let settings = tx.read_settings().await?;
    let waiting = tx.count_waiting().await?;

    if settings.is_full(waiting) {
        tx.rollback().await?;
        warn!(
            waiting = waiting,
            max_capacity = settings.max_capacity,
            "Join rejected: queue full"
        );
        return Err(AppError::QueueFull {
            waiting,
            max_capacity: settings.max_capacity,
        });
    }

    // New entries always go to the tail
    let position = waiting + 1;
    let estimate = estimated_wait_minutes(position, settings.avg_service_time_minutes);
    let ticket_number = ticket_generator.generate_ticket();
    let joined_at = time_provider.now_millis();

    let entry = tx
        .insert_entry(&new_entry, &ticket_number, position, estimate, joined_at)
        .await?;

    tx.commit().await?;

    info!(
        ticket = %entry.ticket_number,
        position = entry.position,
        estimated_wait_minutes = entry.estimated_wait_minutes,
        "Joined queue"
    );

    Ok(JoinResponse {
        ticket_number: entry.ticket_number,
        position: entry.position,
        estimated_wait_minutes: entry.estimated_wait_minutes,
        name: entry.name,
        email: entry.email,
    })
}
