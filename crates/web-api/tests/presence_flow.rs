//! HTTP 流程测试
//!
//! 使用内存实现的依赖启动完整路由，验证网关视角的请求/响应契约。

use std::sync::Arc;

use application::{
    cache::memory::MemoryPresenceCache,
    publisher::memory::MemoryEventPublisher,
    repository::memory::{MemoryNotificationRepository, MemoryPresenceRepository},
    NotificationService, PresenceService, PresenceServiceDependencies, SystemClock,
};
use domain::{NotificationType, PresenceStatus};
use uuid::Uuid;
use web_api::{router, AppState};

struct TestApp {
    base_url: String,
    client: reqwest::Client,
    notifications: Arc<MemoryNotificationRepository>,
}

async fn spawn_app() -> TestApp {
    let presence_repository = Arc::new(MemoryPresenceRepository::new());
    let notification_repository = Arc::new(MemoryNotificationRepository::new());

    let presence_service = Arc::new(PresenceService::new(PresenceServiceDependencies {
        repository: presence_repository,
        cache: Arc::new(MemoryPresenceCache::new()),
        publisher: Arc::new(MemoryEventPublisher::new()),
        clock: Arc::new(SystemClock),
    }));
    let notification_service = Arc::new(NotificationService::new(notification_repository.clone()));

    let app = router(AppState::new(presence_service, notification_service));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{addr}"),
        client: reqwest::Client::new(),
        notifications: notification_repository,
    }
}

#[tokio::test]
async fn test_presence_update_and_query_flow() {
    let app = spawn_app().await;
    let user_id = Uuid::new_v4();

    let response = app
        .client
        .post(format!("{}/api/v1/presence/update", app.base_url))
        .header("x-user-id", user_id.to_string())
        .json(&serde_json::json!({ "status": "ONLINE" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["userId"], user_id.to_string());
    assert_eq!(body["status"], "ONLINE");
    assert!(!body["lastSeenAt"].is_null());

    let me: serde_json::Value = app
        .client
        .get(format!("{}/api/v1/presence/me", app.base_url))
        .header("x-user-id", user_id.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["status"], "ONLINE");
}

#[tokio::test]
async fn test_unknown_user_reads_offline() {
    let app = spawn_app().await;
    let unknown = Uuid::new_v4();

    let body: serde_json::Value = app
        .client
        .get(format!("{}/api/v1/presence/user/{unknown}", app.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["userId"], unknown.to_string());
    assert_eq!(body["status"], "OFFLINE");
    assert!(body["lastSeenAt"].is_null());
}

#[tokio::test]
async fn test_bulk_presence_preserves_input_order() {
    let app = spawn_app().await;
    let online = Uuid::new_v4();
    let missing = Uuid::new_v4();

    app.client
        .post(format!("{}/api/v1/presence/update", app.base_url))
        .header("x-user-id", online.to_string())
        .json(&serde_json::json!({ "status": "BUSY" }))
        .send()
        .await
        .unwrap();

    let body: serde_json::Value = app
        .client
        .post(format!("{}/api/v1/presence/bulk", app.base_url))
        .json(&serde_json::json!({ "userIds": [missing, online] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["userId"], missing.to_string());
    assert_eq!(records[0]["status"], "OFFLINE");
    assert_eq!(records[1]["userId"], online.to_string());
    assert_eq!(records[1]["status"], "BUSY");
}

#[tokio::test]
async fn test_heartbeat_and_offline() {
    let app = spawn_app().await;
    let user_id = Uuid::new_v4();

    let heartbeat: serde_json::Value = app
        .client
        .post(format!("{}/api/v1/presence/heartbeat", app.base_url))
        .header("x-user-id", user_id.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(heartbeat["success"], true);

    let offline: serde_json::Value = app
        .client
        .post(format!("{}/api/v1/presence/offline", app.base_url))
        .header("x-user-id", user_id.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(offline["status"], "OFFLINE");
    assert!(!offline["lastSeenAt"].is_null());
}

#[tokio::test]
async fn test_missing_identity_header_is_unauthorized() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(format!("{}/api/v1/presence/update", app.base_url))
        .json(&serde_json::json!({ "status": "ONLINE" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = app
        .client
        .post(format!("{}/api/v1/presence/update", app.base_url))
        .header("x-user-id", "not-a-uuid")
        .json(&serde_json::json!({ "status": "ONLINE" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_notification_flow() {
    let app = spawn_app().await;
    let user_id = Uuid::new_v4();

    // 通知由物化器写入，这里直接灌入仓储
    let notification = domain::Notification::new(
        user_id,
        NotificationType::NewMessage,
        "New Message",
        "You have a new message",
        None,
    );
    domain::repositories::NotificationRepository::create(&*app.notifications, &notification)
        .await
        .unwrap();

    let list: serde_json::Value = app
        .client
        .get(format!("{}/api/v1/notifications", app.base_url))
        .header("x-user-id", user_id.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["total"], 1);
    assert_eq!(list["unreadCount"], 1);
    assert_eq!(list["data"][0]["read"], false);

    let marked: serde_json::Value = app
        .client
        .post(format!(
            "{}/api/v1/notifications/{}/read",
            app.base_url, notification.id
        ))
        .header("x-user-id", user_id.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(marked["read"], true);

    let count: serde_json::Value = app
        .client
        .get(format!("{}/api/v1/notifications/unread-count", app.base_url))
        .header("x-user-id", user_id.to_string())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["unreadCount"], 0);

    let deleted = app
        .client
        .delete(format!(
            "{}/api/v1/notifications/{}",
            app.base_url, notification.id
        ))
        .header("x-user-id", user_id.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status(), 200);

    // 再次删除返回 404
    let missing = app
        .client
        .delete(format!(
            "{}/api/v1/notifications/{}",
            app.base_url, notification.id
        ))
        .header("x-user-id", user_id.to_string())
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
}

#[tokio::test]
async fn test_presence_status_round_trip_over_http() {
    let app = spawn_app().await;
    let user_id = Uuid::new_v4();

    for status in [PresenceStatus::Away, PresenceStatus::Busy, PresenceStatus::Online] {
        let body: serde_json::Value = app
            .client
            .post(format!("{}/api/v1/presence/update", app.base_url))
            .header("x-user-id", user_id.to_string())
            .json(&serde_json::json!({ "status": status.to_string() }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], status.to_string());
    }
}
