//! Handler tests for Notifications domain
//!
//! These tests drive the notification router in-process against the
//! in-memory repository:
//! - Request deserialization and validation
//! - Response serialization and status codes
//! - Error envelopes

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use domain_notifications::*;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use stream_worker::MemoryBroker;
use tower::ServiceExt; // For oneshot()

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

type Service = Arc<NotificationService<InMemoryNotificationRepository>>;

fn service() -> Service {
    Arc::new(NotificationService::new(InMemoryNotificationRepository::new()))
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn seed(service: &Service, user_id: &str, count: usize) -> Vec<Notification> {
    let mut created = Vec::new();
    for i in 0..count {
        created.push(
            service
                .create(CreateNotification::new(user_id, "task_assigned", format!("T{}", i), "M"))
                .await
                .unwrap(),
        );
    }
    created
}

fn app(service: &Service) -> Router {
    handlers::router(service.clone())
}

#[tokio::test]
async fn test_create_returns_200_unread() {
    let service = service();
    let response = app(&service)
        .oneshot(request(
            "POST",
            "/",
            Some(json!({
                "user_id": "u1",
                "type": "task_assigned",
                "title": "Nueva tarea",
                "message": "Boceto inicial",
                "related_task_id": "t-1"
            })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["type"], "task_assigned");
    assert_eq!(body["is_read"], false);
    assert_eq!(body["related_task_id"], "t-1");
    assert_eq!(service.unread_count("u1").await.unwrap(), 1);
}

#[tokio::test]
async fn test_create_validates_input() {
    let response = app(&service())
        .oneshot(request(
            "POST",
            "/",
            Some(json!({"user_id": "", "type": "t", "title": "T", "message": "M"})),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert!(body["details"]["user_id"].is_array());
}

#[tokio::test]
async fn test_list_requires_user_and_paginates() {
    let service = service();
    seed(&service, "u1", 3).await;
    seed(&service, "u2", 2).await;

    let response = app(&service)
        .oneshot(request("GET", "/?user_id=u1&skip=1&limit=5", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page: Vec<Notification> = json_body(response.into_body()).await;
    let titles: Vec<&str> = page.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["T1", "T2"]);

    let missing_user = app(&service).oneshot(request("GET", "/", None)).await.unwrap();
    assert_eq!(missing_user.status(), StatusCode::BAD_REQUEST);

    let bad_limit = app(&service)
        .oneshot(request("GET", "/?user_id=u1&limit=0", None))
        .await
        .unwrap();
    assert_eq!(bad_limit.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_by_id() {
    let service = service();
    let created = seed(&service, "u1", 1).await.remove(0);

    let found = app(&service)
        .oneshot(request("GET", &format!("/{}", created.id), None))
        .await
        .unwrap();
    assert_eq!(found.status(), StatusCode::OK);
    let notification: Notification = json_body(found.into_body()).await;
    assert_eq!(notification, created);

    let missing = app(&service)
        .oneshot(request("GET", &format!("/{}", uuid::Uuid::now_v7()), None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let malformed = app(&service)
        .oneshot(request("GET", "/not-a-uuid", None))
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unread_count() {
    let service = service();
    seed(&service, "u1", 2).await;

    let response = app(&service)
        .oneshot(request("GET", "/unread/count?user_id=u1", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({"user_id": "u1", "unread_count": 2}));
}

#[tokio::test]
async fn test_mark_read() {
    let service = service();
    let created = seed(&service, "u1", 1).await.remove(0);

    let response = app(&service)
        .oneshot(request("PUT", &format!("/{}/read", created.id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["is_read"], true);

    let missing = app(&service)
        .oneshot(request("PUT", &format!("/{}/read", uuid::Uuid::now_v7()), None))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mark_all_read() {
    let service = service();
    let created = seed(&service, "u1", 3).await;
    service.mark_read(created[0].id).await.unwrap();

    let response = app(&service)
        .oneshot(request("PUT", "/user/u1/read-all", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({"user_id": "u1", "marked_as_read": 2}));
    assert_eq!(service.unread_count("u1").await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete() {
    let service = service();
    let created = seed(&service, "u1", 1).await.remove(0);

    let response = app(&service)
        .oneshot(request("DELETE", &format!("/{}", created.id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body, json!({"message": "Notification deleted"}));

    let again = app(&service)
        .oneshot(request("DELETE", &format!("/{}", created.id), None))
        .await
        .unwrap();
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health() {
    let response = app(&service())
        .oneshot(request("GET", "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(
        body,
        json!({"status": "healthy", "service": "notifications-service"})
    );
}

#[tokio::test]
async fn test_publish_event() {
    let body = json!({"user_id": "u1", "type": "task_assigned", "title": "T", "message": "M"});

    let without_broker = app(&service())
        .oneshot(request("POST", "/events", Some(body.clone())))
        .await
        .unwrap();
    assert_eq!(without_broker.status(), StatusCode::SERVICE_UNAVAILABLE);

    let broker = MemoryBroker::new();
    let service = Arc::new(
        NotificationService::new(InMemoryNotificationRepository::new())
            .with_publisher(Arc::new(broker.producer("notifications"))),
    );
    let response = app(&service)
        .oneshot(request("POST", "/events", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);
    assert_eq!(broker.len("notifications").await, 1);
}
