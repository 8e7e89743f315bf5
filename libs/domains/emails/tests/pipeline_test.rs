//! Event pipeline tests: `emails` topic → worker → service → log.
//!
//! Uses the in-memory broker, so ordering and acknowledgement follow the
//! same consumer-group rules as Redis Streams without a container.

use domain_emails::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use stream_worker::{MemoryBroker, StreamDef, StreamWorker, WorkerConfig};
use tokio::sync::watch;

fn config() -> WorkerConfig {
    WorkerConfig::from_stream_def::<EmailStream>()
        .with_consumer_id("email-test")
        .with_poll_interval_ms(5)
        .with_backoff_ms(1, 5)
}

async fn publish(broker: &MemoryBroker, body: String) {
    broker
        .publish_raw(EmailStream::STREAM_NAME, Some(body), None)
        .await
        .unwrap();
}

async fn wait_for_logs(repo: &InMemoryEmailLogRepository, broker: &MemoryBroker, count: u64) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let total = repo.stats().await.unwrap().total();
            let pending = broker
                .pending(EmailStream::STREAM_NAME, EmailStream::CONSUMER_GROUP)
                .await;
            if total >= count && pending == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("worker did not catch up");
}

#[tokio::test]
async fn test_events_are_sent_in_order_and_bad_ones_dropped() {
    let broker = MemoryBroker::new();
    let repo = InMemoryEmailLogRepository::new();
    let provider = RecordingEmailProvider::new();
    let service = Arc::new(EmailService::new(repo.clone(), Arc::new(provider.clone())).unwrap());

    publish(
        &broker,
        json!({
            "event_type": "welcome",
            "to_email": "first@example.com",
            "subject": "Hola",
            "body": "uno",
            "timestamp": "2025-03-01T10:00:00Z"
        })
        .to_string(),
    )
    .await;
    // Missing subject: dropped without a log
    publish(
        &broker,
        json!({
            "event_type": "welcome",
            "to_email": "broken@example.com",
            "body": "dos",
            "timestamp": "2025-03-01T10:00:00Z"
        })
        .to_string(),
    )
    .await;
    publish(&broker, "not json".to_string()).await;
    publish(
        &broker,
        json!({
            "event_type": "project_invitation",
            "to_email": "second@example.com",
            "subject": "Invitación",
            "body": "tres",
            "template_name": "project_invitation",
            "template_data": {"user_name": "Ana", "inviter_name": "Leo", "project_name": "Mural"},
            "timestamp": "2025-03-01T10:05:00"
        })
        .to_string(),
    )
    .await;

    let worker = StreamWorker::new(
        broker.consumer(&config()),
        Arc::new(EmailProcessor::new(service)),
        config(),
    );
    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(async move { worker.run(rx).await });

    wait_for_logs(&repo, &broker, 2).await;
    tx.send(true).unwrap();
    handle.await.unwrap().unwrap();

    let logs = repo.list(0, 10).await.unwrap();
    let recipients: Vec<&str> = logs.iter().map(|l| l.to_email.as_str()).collect();
    assert_eq!(recipients, vec!["first@example.com", "second@example.com"]);
    assert!(logs[1].body.contains("Mural"));
    assert!(!provider.was_sent_to("broken@example.com").await);
}

#[tokio::test]
async fn test_queue_then_consume() {
    let broker = MemoryBroker::new();
    let repo = InMemoryEmailLogRepository::new();
    let service = Arc::new(
        EmailService::new(repo.clone(), Arc::new(RecordingEmailProvider::new()))
            .unwrap()
            .with_publisher(Arc::new(broker.producer(EmailStream::STREAM_NAME))),
    );

    service
        .queue(SendEmailRequest::new("ana@example.com", "Hola", "Body"))
        .await
        .unwrap();

    let worker = StreamWorker::new(
        broker.consumer(&config()),
        Arc::new(EmailProcessor::new(service.clone())),
        config(),
    );
    let (tx, rx) = watch::channel(false);
    let handle = tokio::spawn(async move { worker.run(rx).await });

    wait_for_logs(&repo, &broker, 1).await;
    tx.send(true).unwrap();
    handle.await.unwrap().unwrap();

    let logs = service.list_logs(Pagination::default()).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, EmailStatus::Sent);
    assert_eq!(logs[0].event_type.as_deref(), Some("email_requested"));
}
