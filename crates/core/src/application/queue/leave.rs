// Leave Use Case

use crate::domain::QueueEntry;
use crate::error::Result;
use crate::port::TransactionalQueueRepository;
use tracing::info;

/// Remove a waiting entry and close the gap it leaves behind
///
/// Delete, shift and recompute share one transaction; any failure leaves
/// the queue untouched.
///
/// # Errors
/// - `NotFound` if the ticket is unknown
/// - `InvalidState` if the entry was already served
pub async fn execute(
    queue_repo: &dyn TransactionalQueueRepository,
    ticket_number: &str,
) -> Result<QueueEntry> {
    let mut tx = queue_repo.begin_transaction().await?;

    let removed = tx.delete_waiting(ticket_number).await?;
    let shifted = tx.shift_positions_after(removed.position).await?;

    let settings = tx.read_settings().await?;
    tx.recompute_wait_times(settings.avg_service_time_minutes).await?;

    tx.commit().await?;

    info!(
        ticket = %removed.ticket_number,
        position = removed.position,
        shifted = shifted,
        "Left queue"
    );

    Ok(removed)
}
