//! Queue lifecycle against a real SQLite store
//!
//! Join / leave / serve-next / settings end to end, including the failure
//! paths that must leave the store untouched.

use std::sync::Arc;

use waitlist_core::application::wait_time::{is_consistent, positions_are_dense};
use waitlist_core::application::{JoinRequest, QueueService};
use waitlist_core::domain::{EntryStatus, SettingsUpdate};
use waitlist_core::error::AppError;
use waitlist_core::port::ticket_generator::mocks::SequentialTicketGenerator;
use waitlist_core::port::time_provider::mocks::FixedTimeProvider;
use waitlist_core::port::{QueueRepository, SystemTimeProvider, TimeRandomTicketGenerator};
use waitlist_infra_sqlite::{create_pool, run_migrations, SqliteQueueRepository};

async fn setup() -> (Arc<SqliteQueueRepository>, QueueService) {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let repo = Arc::new(SqliteQueueRepository::new(pool));
    let service = QueueService::new(
        repo.clone(),
        repo.clone(),
        Arc::new(SequentialTicketGenerator::new()),
        Arc::new(FixedTimeProvider::new(1_700_000_000_000)),
    );
    (repo, service)
}

fn join(name: &str) -> JoinRequest {
    JoinRequest {
        name: name.to_string(),
        email: None,
    }
}

async fn assert_invariants(repo: &SqliteQueueRepository) {
    let waiting = repo.list_waiting().await.unwrap();
    let settings = repo.read_settings().await.unwrap();
    assert!(positions_are_dense(&waiting), "positions not dense: {:?}", waiting);
    assert!(is_consistent(&waiting, settings.avg_service_time_minutes));
}

/// capacity=2, avg=10: A, B join; C bounces; A leaves; B is served
#[tokio::test]
async fn test_reference_scenario() {
    let (repo, service) = setup().await;

    service
        .update_settings(SettingsUpdate {
            max_capacity: Some(2),
            avg_service_time_minutes: Some(10),
        })
        .await
        .unwrap();

    let a = service.join(join("A")).await.unwrap();
    assert_eq!((a.position, a.estimated_wait_minutes), (1, 10));

    let b = service.join(join("B")).await.unwrap();
    assert_eq!((b.position, b.estimated_wait_minutes), (2, 20));

    let err = service.join(join("C")).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::QueueFull {
            waiting: 2,
            max_capacity: 2
        }
    ));

    service.leave(&a.ticket_number).await.unwrap();
    let b_now = service.get_ticket(&b.ticket_number).await.unwrap();
    assert_eq!((b_now.position, b_now.estimated_wait_minutes), (1, 10));
    assert_invariants(&repo).await;

    let served = service.serve_next().await.unwrap().unwrap();
    assert_eq!(served.ticket_number, b.ticket_number);
    assert_eq!(served.status, EntryStatus::Served);

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.total_served_today, 1);
    assert_eq!(stats.waiting, 0);
    assert!(!stats.is_full);
    assert_eq!(
        stats.currently_serving.map(|e| e.ticket_number),
        Some(b.ticket_number)
    );
}

#[tokio::test]
async fn test_full_queue_join_changes_nothing() {
    let (repo, service) = setup().await;
    service
        .update_settings(SettingsUpdate {
            max_capacity: Some(3),
            avg_service_time_minutes: None,
        })
        .await
        .unwrap();

    for name in ["A", "B", "C"] {
        service.join(join(name)).await.unwrap();
    }
    let before = repo.list_waiting().await.unwrap();

    for _ in 0..5 {
        let err = service.join(join("Late")).await.unwrap_err();
        assert!(matches!(err, AppError::QueueFull { .. }));
    }

    assert_eq!(repo.list_waiting().await.unwrap(), before);
    assert!(service.stats().await.unwrap().is_full);
}

#[tokio::test]
async fn test_failed_leave_changes_nothing() {
    let (repo, service) = setup().await;
    for name in ["A", "B", "C"] {
        service.join(join(name)).await.unwrap();
    }
    let served = service.serve_next().await.unwrap().unwrap();
    let before = repo.list_waiting().await.unwrap();
    let settings_before = repo.read_settings().await.unwrap();

    let err = service.leave("NOPE").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = service.leave(&served.ticket_number).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));

    assert_eq!(repo.list_waiting().await.unwrap(), before);
    assert_eq!(repo.read_settings().await.unwrap(), settings_before);

    // The served entry is still stored with its final state
    let stored = service.get_ticket(&served.ticket_number).await.unwrap();
    assert_eq!(stored.status, EntryStatus::Served);
    assert!(stored.served_at.is_some());
}

#[tokio::test]
async fn test_serve_next_on_empty_queue_is_noop() {
    let (repo, service) = setup().await;
    let before = repo.read_settings().await.unwrap();

    assert!(service.serve_next().await.unwrap().is_none());
    assert_eq!(repo.read_settings().await.unwrap(), before);
}

#[tokio::test]
async fn test_serve_order_and_counters() {
    let (repo, service) = setup().await;
    for name in ["A", "B", "C", "D"] {
        service.join(join(name)).await.unwrap();
    }

    for (expected, served_so_far) in [("A", 1), ("B", 2)] {
        let served = service.serve_next().await.unwrap().unwrap();
        assert_eq!(served.name, expected);

        let settings = repo.read_settings().await.unwrap();
        assert_eq!(settings.total_served_today, served_so_far);
        assert_eq!(settings.currently_serving_id, Some(served.id));
        assert_invariants(&repo).await;
    }

    let names: Vec<String> = repo
        .list_waiting()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["C", "D"]);
}

#[tokio::test]
async fn test_settings_change_recomputes_all_estimates() {
    let (repo, service) = setup().await;
    for name in ["A", "B", "C"] {
        service.join(join(name)).await.unwrap();
    }

    let settings = service
        .update_settings(SettingsUpdate {
            max_capacity: None,
            avg_service_time_minutes: Some(7),
        })
        .await
        .unwrap();
    assert_eq!(settings.max_capacity, 50);
    assert_eq!(settings.avg_service_time_minutes, 7);

    let waits: Vec<i64> = repo
        .list_waiting()
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.estimated_wait_minutes)
        .collect();
    assert_eq!(waits, vec![7, 14, 21]);

    let err = service
        .update_settings(SettingsUpdate {
            max_capacity: Some(1001),
            avg_service_time_minutes: Some(5),
        })
        .await
        .unwrap_err();
    assert!(err.is_client_error());
    assert_eq!(repo.read_settings().await.unwrap().avg_service_time_minutes, 7);
}

#[tokio::test]
async fn test_blank_name_and_email_handling() {
    let (_repo, service) = setup().await;

    let err = service.join(join("  \t ")).await.unwrap_err();
    assert!(err.is_client_error());

    let joined = service
        .join(JoinRequest {
            name: "  Ann  ".to_string(),
            email: Some("ann@example.com".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(joined.name, "Ann");
    assert_eq!(joined.email.as_deref(), Some("ann@example.com"));
}

#[tokio::test]
async fn test_production_ticket_generator_yields_unique_tickets() {
    let pool = create_pool("sqlite::memory:").await.unwrap();
    run_migrations(&pool).await.unwrap();

    let repo = Arc::new(SqliteQueueRepository::new(pool));
    let time = Arc::new(SystemTimeProvider);
    let service = QueueService::new(
        repo.clone(),
        repo.clone(),
        Arc::new(TimeRandomTicketGenerator::new(time.clone())),
        time,
    );

    let mut tickets = Vec::new();
    for i in 0..5 {
        let joined = service.join(join(&format!("P{}", i))).await.unwrap();
        assert!(joined.ticket_number.contains('-'));
        tickets.push(joined.ticket_number);
        // Distinct millisecond prefixes
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    tickets.sort();
    tickets.dedup();
    assert_eq!(tickets.len(), 5);
}
