// Update-Settings Use Case

use crate::domain::{Settings, SettingsUpdate};
use crate::error::Result;
use crate::port::TransactionalQueueRepository;
use tracing::info;

/// Validate, persist, then recompute every waiting estimate
///
/// Omitted fields keep their stored values. Lowering the capacity below the
/// current waiting count does not evict anyone; it only blocks new joins.
pub async fn execute(
    queue_repo: &dyn TransactionalQueueRepository,
    update: SettingsUpdate,
) -> Result<Settings> {
    update.validate()?;

    let mut tx = queue_repo.begin_transaction().await?;

    let current = tx.read_settings().await?;
    let updated = update.apply_to(&current)?;

    tx.write_settings(&updated).await?;
    let recomputed = tx
        .recompute_wait_times(updated.avg_service_time_minutes)
        .await?;

    tx.commit().await?;

    info!(
        max_capacity = updated.max_capacity,
        avg_service_time_minutes = updated.avg_service_time_minutes,
        recomputed = recomputed,
        "Settings updated"
    );

    Ok(updated)
}
