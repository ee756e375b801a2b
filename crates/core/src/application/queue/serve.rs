// Serve-Next Use Case

use crate::domain::QueueEntry;
use crate::error::Result;
use crate::port::{TimeProvider, TransactionalQueueRepository};
use tracing::{debug, info};

/// Result of a serve-next, with counters read in the same transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeOutcome {
    pub served: Option<QueueEntry>,
    pub waiting: i64,
    pub total_served_today: i64,
}

/// Serve the entry at the front of the queue
///
/// `served` is `None` when nobody is waiting; nothing is written in that case.
pub async fn execute(
    queue_repo: &dyn TransactionalQueueRepository,
    time_provider: &dyn TimeProvider,
) -> Result<ServeOutcome> {
    let mut tx = queue_repo.begin_transaction().await?;

    let Some(next) = tx.front_waiting().await? else {
        let settings = tx.read_settings().await?;
        tx.rollback().await?;
        debug!("Serve-next on empty queue");
        return Ok(ServeOutcome {
            served: None,
            waiting: 0,
            total_served_today: settings.total_served_today,
        });
    };

    let served = tx.mark_served(next.id, time_provider.now_millis()).await?;
    tx.record_served(served.id).await?;
    tx.shift_positions_after(next.position).await?;

    let settings = tx.read_settings().await?;
    tx.recompute_wait_times(settings.avg_service_time_minutes).await?;
    let waiting = tx.count_waiting().await?;

    tx.commit().await?;

    info!(
        served_id = served.id,
        ticket = %served.ticket_number,
        waiting = waiting,
        total_served_today = settings.total_served_today,
        "Served next entry"
    );

    Ok(ServeOutcome {
        served: Some(served),
        waiting,
        total_served_today: settings.total_served_today,
    })
}
