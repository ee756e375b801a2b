//! Unit tests for the queue use cases against the in-memory store

use super::*;
use crate::application::wait_time::{is_consistent, positions_are_dense};
use crate::domain::EntryStatus;
use crate::error::AppError;
use crate::port::queue_repository::mocks::InMemoryQueueRepository;
use crate::port::ticket_generator::mocks::{FixedTicketGenerator, SequentialTicketGenerator};
use crate::port::time_provider::mocks::FixedTimeProvider;
use tokio_test::{assert_err, assert_ok};

fn service_with(
    capacity: i64,
    avg: i64,
) -> (QueueService, Arc<InMemoryQueueRepository>, Arc<FixedTimeProvider>) {
    let repo = Arc::new(InMemoryQueueRepository::with_settings(Settings {
        max_capacity: capacity,
        avg_service_time_minutes: avg,
        ..Default::default()
    }));
    let clock = Arc::new(FixedTimeProvider::new(1_000));
    let service = QueueService::new(
        repo.clone(),
        repo.clone(),
        Arc::new(SequentialTicketGenerator::new()),
        clock.clone(),
    );
    (service, repo, clock)
}

fn join_req(name: &str) -> JoinRequest {
    JoinRequest {
        name: name.to_string(),
        email: None,
    }
}

fn assert_invariants(repo: &InMemoryQueueRepository) {
    let state = repo.snapshot();
    assert!(positions_are_dense(&state.entries), "positions not dense");
    assert!(
        is_consistent(&state.entries, state.settings.avg_service_time_minutes),
        "estimates drifted"
    );
}

#[tokio::test]
async fn test_join_assigns_tail_position() {
    let (service, repo, _) = service_with(10, 5);

    let a = assert_ok!(service.join(join_req("A")).await);
    let b = assert_ok!(service.join(join_req("B")).await);

    assert_eq!((a.position, a.estimated_wait_minutes), (1, 5));
    assert_eq!((b.position, b.estimated_wait_minutes), (2, 10));
    assert_eq!(a.ticket_number, "T-0001");
    assert_eq!(b.ticket_number, "T-0002");
    assert_invariants(&repo);
}

#[tokio::test]
async fn test_join_rejects_blank_name_without_state_change() {
    let (service, repo, _) = service_with(10, 5);

    let err = assert_err!(service.join(join_req("   ")).await);
    assert!(matches!(err, AppError::Domain(_)));
    assert!(err.is_client_error());
    assert!(repo.snapshot().entries.is_empty());
}

#[tokio::test]
async fn test_join_accepts_long_name_and_free_form_email() {
    let (service, repo, _) = service_with(10, 5);

    assert_ok!(service.join(join_req(&"a".repeat(101))).await);
    let resp = assert_ok!(
        service
            .join(JoinRequest {
                name: "Ann".to_string(),
                email: Some("ann at example".to_string()),
            })
            .await
    );

    assert_eq!(resp.position, 2);
    let entries = repo.snapshot().entries;
    assert_eq!(entries[1].email.as_deref(), Some("ann at example"));
}

#[tokio::test]
async fn test_join_when_full_fails_without_state_change() {
    let (service, repo, _) = service_with(1, 5);
    assert_ok!(service.join(join_req("A")).await);

    let before = repo.snapshot().entries;
    let err = assert_err!(service.join(join_req("B")).await);

    assert!(matches!(
        err,
        AppError::QueueFull {
            waiting: 1,
            max_capacity: 1
        }
    ));
    assert_eq!(repo.snapshot().entries, before);
}

#[tokio::test]
async fn test_duplicate_ticket_is_a_conflict() {
    let repo = Arc::new(InMemoryQueueRepository::new());
    let service = QueueService::new(
        repo.clone(),
        repo.clone(),
        Arc::new(FixedTicketGenerator("SAME-TKT".to_string())),
        Arc::new(FixedTimeProvider::new(0)),
    );

    assert_ok!(service.join(join_req("A")).await);
    let err = assert_err!(service.join(join_req("B")).await);
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(repo.snapshot().entries.len(), 1);
}

#[tokio::test]
async fn test_leave_redensifies_positions() {
    let (service, repo, _) = service_with(10, 3);
    for name in ["A", "B", "C", "D"] {
        service.join(join_req(name)).await.unwrap();
    }

    let removed = assert_ok!(service.leave("T-0002").await);
    assert_eq!(removed.name, "B");

    let waiting = service.snapshot().await.unwrap().waiting_list;
    let view: Vec<(&str, i64, i64)> = waiting
        .iter()
        .map(|e| (e.name.as_str(), e.position, e.estimated_wait_minutes))
        .collect();
    assert_eq!(view, vec![("A", 1, 3), ("C", 2, 6), ("D", 3, 9)]);
    assert_invariants(&repo);
}

#[tokio::test]
async fn test_leave_unknown_ticket() {
    let (service, repo, _) = service_with(10, 3);
    service.join(join_req("A")).await.unwrap();
    let before = repo.snapshot().entries;

    let err = assert_err!(service.leave("NOPE").await);
    assert!(matches!(err, AppError::NotFound(_)));
    assert_eq!(repo.snapshot().entries, before);
}

#[tokio::test]
async fn test_leave_after_served_is_invalid_state() {
    let (service, repo, _) = service_with(10, 3);
    service.join(join_req("A")).await.unwrap();
    service.join(join_req("B")).await.unwrap();
    service.serve_next().await.unwrap();

    let before = repo.snapshot();
    let err = assert_err!(service.leave("T-0001").await);
    assert!(matches!(err, AppError::InvalidState(_)));

    let after = repo.snapshot();
    assert_eq!(after.entries, before.entries);
    assert_eq!(after.settings, before.settings);
}

#[tokio::test]
async fn test_serve_next_updates_counters() {
    let (service, repo, clock) = service_with(10, 4);
    service.join(join_req("A")).await.unwrap();
    service.join(join_req("B")).await.unwrap();
    clock.advance(60_000);

    let served = assert_ok!(service.serve_next().await).unwrap();
    assert_eq!(served.name, "A");
    assert_eq!(served.status, EntryStatus::Served);
    assert_eq!(served.served_at, Some(61_000));

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.total_served_today, 1);
    assert_eq!(stats.waiting, 1);
    assert_eq!(stats.currently_serving.map(|e| e.id), Some(served.id));

    let b = service.get_ticket("T-0002").await.unwrap();
    assert_eq!((b.position, b.estimated_wait_minutes), (1, 4));
    assert_invariants(&repo);
}

#[tokio::test]
async fn test_serve_outcome_counts_come_from_the_serve() {
    let (service, _, _) = service_with(10, 4);
    service.join(join_req("A")).await.unwrap();
    service.join(join_req("B")).await.unwrap();

    let outcome = assert_ok!(service.serve_next_with_counts().await);
    assert_eq!(outcome.served.map(|e| e.name), Some("A".to_string()));
    assert_eq!((outcome.waiting, outcome.total_served_today), (1, 1));

    // A later join does not rewrite what the serve reported
    service.join(join_req("C")).await.unwrap();
    let outcome = assert_ok!(service.serve_next_with_counts().await);
    assert_eq!((outcome.waiting, outcome.total_served_today), (1, 2));

    service.serve_next().await.unwrap();
    let empty = assert_ok!(service.serve_next_with_counts().await);
    assert!(empty.served.is_none());
    assert_eq!((empty.waiting, empty.total_served_today), (0, 3));
}

#[tokio::test]
async fn test_snapshot_waiting_matches_list() {
    let (service, _, _) = service_with(2, 4);
    service.join(join_req("A")).await.unwrap();
    service.join(join_req("B")).await.unwrap();

    let snapshot = assert_ok!(service.snapshot().await);
    assert_eq!(snapshot.stats.waiting, snapshot.waiting_list.len() as i64);
    assert!(snapshot.stats.is_full);
    let names: Vec<&str> = snapshot.waiting_list.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[tokio::test]
async fn test_serve_next_on_empty_queue_is_noop() {
    let (service, repo, _) = service_with(10, 4);
    let before = repo.snapshot();

    let served = assert_ok!(service.serve_next().await);
    assert!(served.is_none());

    let after = repo.snapshot();
    assert_eq!(after.settings, before.settings);
    assert!(after.entries.is_empty());
}

#[tokio::test]
async fn test_failed_recompute_rolls_back_leave() {
    let (service, repo, _) = service_with(10, 2);
    for name in ["A", "B", "C"] {
        service.join(join_req(name)).await.unwrap();
    }
    let before = repo.snapshot().entries;

    repo.fail_next_recompute();
    let err = assert_err!(service.leave("T-0001").await);
    assert!(matches!(err, AppError::Database(_)));

    // Neither the delete nor the shift was committed
    assert_eq!(repo.snapshot().entries, before);
    assert_invariants(&repo);
}

#[tokio::test]
async fn test_failed_recompute_rolls_back_serve() {
    let (service, repo, _) = service_with(10, 2);
    service.join(join_req("A")).await.unwrap();
    let before = repo.snapshot();

    repo.fail_next_recompute();
    assert_err!(service.serve_next().await);

    let after = repo.snapshot();
    assert_eq!(after.entries, before.entries);
    assert_eq!(after.settings.total_served_today, 0);
    assert_eq!(after.settings.currently_serving_id, None);
}

#[tokio::test]
async fn test_update_settings_recomputes_estimates() {
    let (service, repo, _) = service_with(10, 5);
    for name in ["A", "B", "C"] {
        service.join(join_req(name)).await.unwrap();
    }

    let updated = assert_ok!(
        service
            .update_settings(SettingsUpdate {
                max_capacity: None,
                avg_service_time_minutes: Some(12),
            })
            .await
    );
    assert_eq!(updated.max_capacity, 10);
    assert_eq!(updated.avg_service_time_minutes, 12);

    let estimates: Vec<i64> = service
        .snapshot()
        .await
        .unwrap()
        .waiting_list
        .iter()
        .map(|e| e.estimated_wait_minutes)
        .collect();
    assert_eq!(estimates, vec![12, 24, 36]);
    assert_invariants(&repo);
}

#[tokio::test]
async fn test_update_settings_rejects_out_of_range() {
    let (service, repo, _) = service_with(10, 5);
    let before = repo.snapshot().settings;

    for update in [
        SettingsUpdate {
            max_capacity: Some(0),
            avg_service_time_minutes: None,
        },
        SettingsUpdate {
            max_capacity: None,
            avg_service_time_minutes: Some(61),
        },
    ] {
        let err = assert_err!(service.update_settings(update).await);
        assert!(err.is_client_error());
    }

    assert_eq!(repo.snapshot().settings, before);
}

#[tokio::test]
async fn test_lowering_capacity_blocks_new_joins_only() {
    let (service, _, _) = service_with(5, 5);
    for name in ["A", "B", "C"] {
        service.join(join_req(name)).await.unwrap();
    }

    service
        .update_settings(SettingsUpdate {
            max_capacity: Some(2),
            avg_service_time_minutes: None,
        })
        .await
        .unwrap();

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.waiting, 3);
    assert!(stats.is_full);
    assert!(matches!(
        service.join(join_req("D")).await,
        Err(AppError::QueueFull { .. })
    ));
}

#[tokio::test]
async fn test_reference_scenario() {
    let (service, repo, _) = service_with(2, 10);

    let a = service.join(join_req("A")).await.unwrap();
    assert_eq!((a.position, a.estimated_wait_minutes), (1, 10));

    let b = service.join(join_req("B")).await.unwrap();
    assert_eq!((b.position, b.estimated_wait_minutes), (2, 20));

    assert!(matches!(
        service.join(join_req("C")).await,
        Err(AppError::QueueFull { .. })
    ));

    service.leave(&a.ticket_number).await.unwrap();
    let b_now = service.get_ticket(&b.ticket_number).await.unwrap();
    assert_eq!((b_now.position, b_now.estimated_wait_minutes), (1, 10));

    let served = service.serve_next().await.unwrap().unwrap();
    assert_eq!(served.ticket_number, b.ticket_number);

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.total_served_today, 1);
    assert_eq!(stats.waiting, 0);
    assert!(!stats.is_full);
    assert_invariants(&repo);
}
