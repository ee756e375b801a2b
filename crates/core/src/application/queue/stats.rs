// Read-side queries: stats, snapshot, ticket lookup

use crate::domain::{QueueEntry, QueueSnapshot, QueueStats};
use crate::error::{AppError, Result};
use crate::port::QueueRepository;

pub async fn stats(queue_repo: &dyn QueueRepository) -> Result<QueueStats> {
    let settings = queue_repo.read_settings().await?;
    let waiting = queue_repo.count_waiting().await?;

    let currently_serving = match settings.currently_serving_id {
        Some(id) => queue_repo.find_by_id(id).await?,
        None => None,
    };

    Ok(QueueStats::new(&settings, waiting, currently_serving))
}

/// Stats whose `waiting` count is taken from the returned list itself
pub async fn snapshot(queue_repo: &dyn QueueRepository) -> Result<QueueSnapshot> {
    let settings = queue_repo.read_settings().await?;
    let waiting_list = queue_repo.list_waiting().await?;

    let currently_serving = match settings.currently_serving_id {
        Some(id) => queue_repo.find_by_id(id).await?,
        None => None,
    };

    Ok(QueueSnapshot {
        stats: QueueStats::new(&settings, waiting_list.len() as i64, currently_serving),
        waiting_list,
    })
}

pub async fn get_ticket(
    queue_repo: &dyn QueueRepository,
    ticket_number: &str,
) -> Result<QueueEntry> {
    queue_repo
        .find_by_ticket(ticket_number)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Ticket {} not found", ticket_number)))
}
