// Wait-Time Recalculator
//
// Estimates are always derived from the stored position, never adjusted
// incrementally. Store adapters mirror `estimated_wait_minutes` as a single
// range update: `estimated_wait_minutes = position * avg`.

use crate::domain::QueueEntry;

/// Estimated wait for a waiting entry at `position` (1-based)
pub fn estimated_wait_minutes(position: i64, avg_service_time_minutes: i64) -> i64 {
    position * avg_service_time_minutes
}

/// Recompute estimates for every waiting entry in `entries`
///
/// Returns the number of entries touched.
pub fn recompute(entries: &mut [QueueEntry], avg_service_time_minutes: i64) -> u64 {
    let mut updated = 0;
    for entry in entries.iter_mut().filter(|e| e.is_waiting()) {
        entry.estimated_wait_minutes =
            estimated_wait_minutes(entry.position, avg_service_time_minutes);
        updated += 1;
    }
    updated
}

/// True when every waiting entry carries the derived estimate
pub fn is_consistent(entries: &[QueueEntry], avg_service_time_minutes: i64) -> bool {
    entries.iter().filter(|e| e.is_waiting()).all(|e| {
        e.estimated_wait_minutes == estimated_wait_minutes(e.position, avg_service_time_minutes)
    })
}

/// True when waiting positions are exactly {1..N}
pub fn positions_are_dense(entries: &[QueueEntry]) -> bool {
    let mut positions: Vec<i64> = entries
        .iter()
        .filter(|e| e.is_waiting())
        .map(|e| e.position)
        .collect();
    positions.sort_unstable();
    positions.iter().enumerate().all(|(i, &p)| p == i as i64 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EntryStatus;

    fn entry(position: i64, status: EntryStatus, estimate: i64) -> QueueEntry {
        QueueEntry {
            id: position,
            name: format!("p{}", position),
            email: None,
            ticket_number: format!("T-{}", position),
            position,
            status,
            joined_at: 0,
            served_at: None,
            estimated_wait_minutes: estimate,
        }
    }

    #[test]
    fn test_recompute_uses_position() {
        let mut entries = vec![
            entry(1, EntryStatus::Waiting, 0),
            entry(2, EntryStatus::Waiting, 999),
            entry(3, EntryStatus::Waiting, 1),
        ];
        recompute(&mut entries, 10);

        let estimates: Vec<i64> = entries.iter().map(|e| e.estimated_wait_minutes).collect();
        assert_eq!(estimates, vec![10, 20, 30]);
        assert!(is_consistent(&entries, 10));
        assert!(!is_consistent(&entries, 5));
    }

    #[test]
    fn test_recompute_skips_served() {
        let mut entries = vec![
            entry(1, EntryStatus::Served, 7),
            entry(1, EntryStatus::Waiting, 0),
        ];
        assert_eq!(recompute(&mut entries, 4), 1);
        assert_eq!(entries[0].estimated_wait_minutes, 7);
        assert_eq!(entries[1].estimated_wait_minutes, 4);
    }

    #[test]
    fn test_density() {
        let dense = vec![
            entry(2, EntryStatus::Waiting, 0),
            entry(1, EntryStatus::Waiting, 0),
            entry(5, EntryStatus::Served, 0),
        ];
        assert!(positions_are_dense(&dense));
        assert!(positions_are_dense(&[]));

        let gap = vec![
            entry(1, EntryStatus::Waiting, 0),
            entry(3, EntryStatus::Waiting, 0),
        ];
        assert!(!positions_are_dense(&gap));

        let dup = vec![
            entry(1, EntryStatus::Waiting, 0),
            entry(1, EntryStatus::Waiting, 0),
        ];
        assert!(!positions_are_dense(&dup));
    }
}
