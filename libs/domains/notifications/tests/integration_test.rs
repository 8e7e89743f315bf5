//! Integration tests for Notifications domain
//!
//! These tests use real PostgreSQL via testcontainers and need Docker:
//! run them with `cargo test -- --ignored`.

use domain_notifications::*;
use test_utils::{assertions::*, TestDatabase, TestDataBuilder};
use uuid::Uuid;

fn notification(user_id: &str, title: &str) -> Notification {
    Notification::new(CreateNotification::new(user_id, "task_assigned", title, "M"))
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_insert_get_and_delete() {
    let db = TestDatabase::new().await;
    let repo = PgNotificationRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("insert_get_delete");
    let user_id = builder.user_key();

    let created = repo.insert(notification(&user_id, "T")).await.unwrap();
    let fetched = assert_some(
        repo.get_by_id(created.id).await.unwrap(),
        "notification should exist",
    );
    assert_uuid_eq(fetched.id, created.id, "notification id");
    assert_eq!(fetched.notification_type, "task_assigned");
    assert!(!fetched.is_read);

    assert!(repo.delete(created.id).await.unwrap());
    assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    assert!(!repo.delete(Uuid::now_v7()).await.unwrap());
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_list_for_user_paginates_per_user() {
    let db = TestDatabase::new().await;
    let repo = PgNotificationRepository::new(db.connection());

    for i in 0..3 {
        repo.insert(notification("u1", &format!("u1-{}", i))).await.unwrap();
        repo.insert(notification("u2", &format!("u2-{}", i))).await.unwrap();
    }

    let page = repo.list_for_user("u1", 1, 10).await.unwrap();
    let titles: Vec<&str> = page.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["u1-1", "u1-2"]);
}

#[tokio::test]
#[ignore = "requires Docker"]
async fn test_read_state() {
    let db = TestDatabase::new().await;
    let repo = PgNotificationRepository::new(db.connection());

    let first = repo.insert(notification("u1", "a")).await.unwrap();
    repo.insert(notification("u1", "b")).await.unwrap();
    repo.insert(notification("u1", "c")).await.unwrap();

    let marked = assert_some(repo.mark_read(first.id).await.unwrap(), "marked notification");
    assert!(marked.is_read);
    assert!(marked.updated_at >= first.updated_at);
    assert_eq!(repo.unread_count("u1").await.unwrap(), 2);

    assert_eq!(repo.mark_all_read("u1").await.unwrap(), 2);
    assert_eq!(repo.unread_count("u1").await.unwrap(), 0);
    assert!(repo.mark_read(Uuid::now_v7()).await.unwrap().is_none());
}
