//! Inbox API integration tests
//!
//! Tests for `/api/v1/notifications` including auth, paging, filtering and
//! ownership checks.

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use socialhub::shared::{MarkAsReadResponse, NotificationListResponse, NotificationType};

use crate::common::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();
    let server = app.server();

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let app = TestApp::new();
    let server = app.server();

    let response = server.get("/api/v1/nope").expect_failure().await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["status"], json!(404));
}

#[tokio::test]
async fn test_requires_token() {
    let app = TestApp::new();
    let server = app.server();

    let response = server.get("/api/v1/notifications").expect_failure().await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server
        .get("/api/v1/notifications/unread/count")
        .authorization_bearer("not-a-token")
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_pages_newest_first() {
    let app = TestApp::new();
    let server = app.server();
    let (alice, token) = app.user("alice").await;
    let (bob, _) = app.user("bob").await;
    let (carol, _) = app.user("carol").await;

    for age in 0..25 {
        app.seed(alice, bob, NotificationType::TopicLike, age).await;
    }
    app.seed(carol, bob, NotificationType::TopicLike, 0).await;

    let response = server
        .get("/api/v1/notifications")
        .authorization_bearer(&token)
        .add_query_param("page", 3)
        .add_query_param("limit", 10)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: NotificationListResponse = response.json();
    assert_eq!(body.notifications.len(), 5);
    assert_eq!(body.total_count, 25);
    assert_eq!(body.unread_count, 25);
    assert_eq!(body.page, 3);
    assert_eq!(body.limit, 10);
    assert_eq!(body.total_pages, 3);
    assert!(body.notifications.iter().all(|n| n.user_id == alice));
    assert!(body
        .notifications
        .windows(2)
        .all(|w| w[0].created_at >= w[1].created_at));
    assert_eq!(body.notifications[0].actor.username.as_deref(), Some("bob"));
}

#[tokio::test]
async fn test_list_defaults_and_filters() {
    let app = TestApp::new();
    let server = app.server();
    let (alice, token) = app.user("alice").await;
    let bob = Uuid::new_v4();

    let liked = app.seed(alice, bob, NotificationType::TopicLike, 3).await;
    app.seed(alice, bob, NotificationType::NewFollower, 2).await;
    app.seed(alice, bob, NotificationType::TopicLike, 1).await;
    app.store_mark(liked.id).await;

    let body: NotificationListResponse = server
        .get("/api/v1/notifications")
        .authorization_bearer(&token)
        .await
        .json();
    assert_eq!(body.page, 1);
    assert_eq!(body.limit, 20);
    assert_eq!(body.total_count, 3);
    assert_eq!(body.unread_count, 2);
    // unknown actor still lists, just without a name
    assert_eq!(body.notifications[0].actor.id, bob);
    assert_eq!(body.notifications[0].actor.username, None);

    let body: NotificationListResponse = server
        .get("/api/v1/notifications")
        .authorization_bearer(&token)
        .add_query_param("type", "topic_like")
        .add_query_param("isRead", false)
        .await
        .json();
    assert_eq!(body.total_count, 1);
    assert_eq!(body.notifications[0].notification_type, NotificationType::TopicLike);
    assert!(!body.notifications[0].is_read);
    // the unread badge ignores list filters
    assert_eq!(body.unread_count, 2);
}

#[tokio::test]
async fn test_list_rejects_bad_paging() {
    let app = TestApp::new();
    let server = app.server();
    let (_, token) = app.user("alice").await;

    for (key, value) in [("limit", 0), ("limit", 101), ("page", 0)] {
        let response = server
            .get("/api/v1/notifications")
            .authorization_bearer(&token)
            .add_query_param(key, value)
            .expect_failure()
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST, "{}={}", key, value);
    }
}

#[tokio::test]
async fn test_mark_one_as_read() {
    let app = TestApp::new();
    let server = app.server();
    let (alice, alice_token) = app.user("alice").await;
    let (_, bob_token) = app.user("bob").await;
    let notification = app
        .seed(alice, Uuid::new_v4(), NotificationType::VideoLike, 0)
        .await;
    let path = format!("/api/v1/notifications/{}/read", notification.id);

    let response = server
        .put(&path)
        .authorization_bearer(&bob_token)
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server
        .put(&format!("/api/v1/notifications/{}/read", Uuid::new_v4()))
        .authorization_bearer(&alice_token)
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let response = server.put(&path).authorization_bearer(&alice_token).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["message"], json!("Notification marked as read"));

    let count: Value = server
        .get("/api/v1/notifications/unread/count")
        .authorization_bearer(&alice_token)
        .await
        .json();
    assert_eq!(count, json!({ "count": 0 }));
}

#[tokio::test]
async fn test_mark_multiple_checks_every_id() {
    let app = TestApp::new();
    let server = app.server();
    let (alice, token) = app.user("alice").await;
    let (bob, _) = app.user("bob").await;
    let actor = Uuid::new_v4();

    let first = app.seed(alice, actor, NotificationType::TopicReply, 2).await;
    let second = app.seed(alice, actor, NotificationType::TopicReply, 1).await;
    let foreign = app.seed(bob, actor, NotificationType::TopicReply, 0).await;

    let response = server
        .put("/api/v1/notifications/read")
        .authorization_bearer(&token)
        .json(&json!({ "notificationIds": [first.id, foreign.id] }))
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    assert_eq!(app.unread(alice).await, 2);

    let body: MarkAsReadResponse = server
        .put("/api/v1/notifications/read")
        .authorization_bearer(&token)
        .json(&json!({ "notificationIds": [first.id, second.id] }))
        .await
        .json();
    assert_eq!(body.count, 2);
    assert_eq!(app.unread(alice).await, 0);

    let body: MarkAsReadResponse = server
        .put("/api/v1/notifications/read")
        .authorization_bearer(&token)
        .json(&json!({ "notificationIds": [] }))
        .await
        .json();
    assert_eq!(body.count, 0);
}

#[tokio::test]
async fn test_mark_all_as_read() {
    let app = TestApp::new();
    let server = app.server();
    let (alice, token) = app.user("alice").await;
    let (bob, _) = app.user("bob").await;
    for age in 0..3 {
        app.seed(alice, bob, NotificationType::CommentLike, age).await;
    }
    app.seed(bob, alice, NotificationType::CommentLike, 0).await;

    let body: MarkAsReadResponse = server
        .put("/api/v1/notifications/read-all")
        .authorization_bearer(&token)
        .await
        .json();

    assert_eq!(body.message, "All notifications marked as read");
    assert_eq!(body.count, 3);
    assert_eq!(app.unread(alice).await, 0);
    assert_eq!(app.unread(bob).await, 1);
}

#[tokio::test]
async fn test_delete_one_and_all() {
    let app = TestApp::new();
    let server = app.server();
    let (alice, alice_token) = app.user("alice").await;
    let (bob, bob_token) = app.user("bob").await;

    let doomed = app.seed(alice, bob, NotificationType::NewFollower, 2).await;
    app.seed(alice, bob, NotificationType::VideoComment, 1).await;
    app.seed(alice, bob, NotificationType::CommentReply, 0).await;
    app.seed(bob, alice, NotificationType::NewFollower, 0).await;

    let path = format!("/api/v1/notifications/{}", doomed.id);
    let response = server
        .delete(&path)
        .authorization_bearer(&bob_token)
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let response = server.delete(&path).authorization_bearer(&alice_token).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .delete(&path)
        .authorization_bearer(&alice_token)
        .expect_failure()
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    let body: MarkAsReadResponse = server
        .delete("/api/v1/notifications")
        .authorization_bearer(&alice_token)
        .await
        .json();
    assert_eq!(body.count, 2);
    assert!(app.store.all_for_user(alice).await.is_empty());
    assert_eq!(app.store.all_for_user(bob).await.len(), 1);
}

#[tokio::test]
async fn test_realtime_stats_is_public() {
    let app = TestApp::new();
    let server = app.server();

    let body: Value = server.get("/api/v1/realtime/stats").await.json();
    assert_eq!(body, json!({ "totalConnections": 0 }));

    let body: Value = server
        .get("/api/v1/realtime/stats")
        .add_query_param("roomId", "video:42")
        .await
        .json();
    assert_eq!(body, json!({ "totalConnections": 0, "roomConnections": 0 }));
}
