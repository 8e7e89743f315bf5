//! Event pipeline tests: `notifications` topic → worker → store.

use domain_notifications::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use stream_worker::{MemoryBroker, StreamDef, StreamWorker, WorkerConfig};
use tokio::sync::watch;

fn config() -> WorkerConfig {
    WorkerConfig::from_stream_def::<NotificationStream>()
        .with_consumer_id("notifications-test")
        .with_poll_interval_ms(5)
        .with_backoff_ms(1, 5)
}

async fn drain(
    broker: &MemoryBroker,
    service: Arc<NotificationService<InMemoryNotificationRepository>>,
    expected: u64,
) {
    let worker = StreamWorker::new(
        broker.consumer(&config()),
        Arc::new(NotificationProcessor::new(service.clone())),
        config(),
    );
    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(async move { worker.run(rx).await });

    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let stored = service.unread_count("u1").await.unwrap();
            let pending = broker
                .pending(NotificationStream::STREAM_NAME, NotificationStream::CONSUMER_GROUP)
                .await;
            if stored >= expected && pending == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("worker did not catch up");

    tx.send(true).unwrap();
    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_published_event_yields_one_unread_notification() {
    let broker = MemoryBroker::new();
    let service = Arc::new(NotificationService::new(InMemoryNotificationRepository::new()));

    broker
        .publish_raw(
            NotificationStream::STREAM_NAME,
            Some(
                json!({
                    "event_type": "task_assigned",
                    "user_id": "u1",
                    "notification_type": "task_assigned",
                    "title": "T",
                    "message": "M",
                    "timestamp": "2025-03-01T10:00:00Z"
                })
                .to_string(),
            ),
            Some("u1".to_string()),
        )
        .await
        .unwrap();

    drain(&broker, service.clone(), 1).await;

    let stored = service
        .list_for_user(UserNotificationsQuery::new("u1", 0, 10))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].notification_type, "task_assigned");
    assert!(!stored[0].is_read);
}

#[tokio::test]
async fn test_bad_events_are_acknowledged_and_skipped() {
    let broker = MemoryBroker::new();
    let service = Arc::new(
        NotificationService::new(InMemoryNotificationRepository::new())
            .with_publisher(Arc::new(broker.producer(NotificationStream::STREAM_NAME))),
    );

    broker
        .publish_raw(
            NotificationStream::STREAM_NAME,
            Some(json!({"event_type": "x", "user_id": "u1"}).to_string()),
            None,
        )
        .await
        .unwrap();
    service
        .publish(CreateNotification::new("u1", "project_invitation", "Invitación", "Mural"))
        .await
        .unwrap();

    drain(&broker, service.clone(), 1).await;

    let stored = service
        .list_for_user(UserNotificationsQuery::new("u1", 0, 10))
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].title, "Invitación");
}
