//! WebSocket endpoint integration tests
//!
//! Tests for `/ws`: session identity from the query or the bearer header,
//! anonymous fallback, initial room, room protocol frames and shutdown.

use std::time::Duration;

use axum_test::{TestWebSocket, WsMessage as Frame};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::time::timeout;
use uuid::Uuid;

use socialhub::backend::auth::sessions::{create_token, TOKEN_TTL_SECS};
use socialhub::backend::notifications::{DomainEvent, ResourceKind};
use socialhub::backend::realtime::Dispatcher;

use crate::common::TestApp;

async fn next_json(socket: &mut TestWebSocket) -> Value {
    timeout(Duration::from_secs(2), socket.receive_json::<Value>())
        .await
        .expect("frame within timeout")
}

/// Ping until the reader answers, then wait for the registration to land
async fn settle(socket: &mut TestWebSocket, dispatcher: &Dispatcher) {
    socket.send_json(&json!({ "type": "ping" })).await;
    assert_eq!(next_json(socket).await, json!({ "type": "pong", "data": "pong" }));
    dispatcher.sync().await;
}

#[tokio::test]
async fn test_query_token_receives_notification_push() {
    let app = TestApp::new();
    let server = app.ws_server();
    let dispatcher = app.app.dispatcher().clone();
    let (alice, alice_token) = app.user("alice").await;
    let (bob, _) = app.user("bob").await;
    let topic = Uuid::new_v4();
    app.directory
        .add_resource(ResourceKind::Topic, topic, alice, Some("T"))
        .await;

    let mut socket = server
        .get_websocket("/ws")
        .add_query_param("token", &alice_token)
        .await
        .into_websocket()
        .await;
    settle(&mut socket, &dispatcher).await;

    assert!(app.app.notifier().emit(DomainEvent::TopicLiked {
        topic_id: topic,
        actor_id: bob,
    }));

    let frame = next_json(&mut socket).await;
    assert_eq!(frame["type"], json!("notification"));
    assert_eq!(frame["data"]["type"], json!("topic_like"));
    assert_eq!(frame["data"]["message"], json!("bob liked your topic: T"));
    assert_eq!(frame["data"]["actorId"], json!(bob));
    assert!(frame.get("userId").is_none());
}

#[tokio::test]
async fn test_bearer_header_identifies_socket() {
    let app = TestApp::new();
    let server = app.ws_server();
    let dispatcher = app.app.dispatcher().clone();
    let (alice, alice_token) = app.user("alice").await;

    let mut socket = server
        .get_websocket("/ws")
        .authorization_bearer(&alice_token)
        .await
        .into_websocket()
        .await;
    settle(&mut socket, &dispatcher).await;

    dispatcher.broadcast_to_user(alice, "direct", json!({ "n": 1 }));

    assert_eq!(
        next_json(&mut socket).await,
        json!({ "type": "direct", "data": { "n": 1 } })
    );
}

#[tokio::test]
async fn test_invalid_token_connects_anonymously() {
    let app = TestApp::new();
    let server = app.ws_server();
    let dispatcher = app.app.dispatcher().clone();
    let (alice, _) = app.user("alice").await;
    let forged = create_token("some-other-secret", alice, None, TOKEN_TTL_SECS).expect("sign token");

    let mut socket = server
        .get_websocket("/ws")
        .add_query_param("token", &forged)
        .await
        .into_websocket()
        .await;
    settle(&mut socket, &dispatcher).await;
    assert_eq!(dispatcher.total_connections(), 1);

    // frames from the loop arrive in order, so the user push would come first
    dispatcher.broadcast_to_user(alice, "direct", json!({}));
    dispatcher.broadcast_to_all("announcement", json!("hello"));

    assert_eq!(
        next_json(&mut socket).await,
        json!({ "type": "announcement", "data": "hello" })
    );
}

#[tokio::test]
async fn test_room_id_query_places_connection() {
    let app = TestApp::new();
    let server = app.ws_server();
    let dispatcher = app.app.dispatcher().clone();

    let mut socket = server
        .get_websocket("/ws")
        .add_query_param("roomId", "video:42")
        .await
        .into_websocket()
        .await;
    settle(&mut socket, &dispatcher).await;
    assert_eq!(dispatcher.room_connection_count("video:42"), 1);

    let stats: Value = server
        .get("/api/v1/realtime/stats")
        .add_query_param("roomId", "video:42")
        .await
        .json();
    assert_eq!(stats, json!({ "totalConnections": 1, "roomConnections": 1 }));

    dispatcher.broadcast_to_room("video:42", "comment_added", json!({ "id": 1 }));
    assert_eq!(next_json(&mut socket).await["type"], json!("comment_added"));
}

#[tokio::test]
async fn test_room_frames_round_trip() {
    let app = TestApp::new();
    let server = app.ws_server();
    let dispatcher = app.app.dispatcher().clone();

    let mut socket = server.get_websocket("/ws").await.into_websocket().await;
    settle(&mut socket, &dispatcher).await;

    socket
        .send_json(&json!({ "type": "join_room", "data": { "roomId": "topic:9" } }))
        .await;
    assert_eq!(
        next_json(&mut socket).await,
        json!({
            "type": "room_joined",
            "data": { "roomId": "topic:9", "message": "Joined room topic:9" }
        })
    );
    assert_eq!(dispatcher.room_connection_count("topic:9"), 1);

    socket.send_json(&json!({ "type": "leave_room" })).await;
    assert_eq!(
        next_json(&mut socket).await,
        json!({ "type": "room_left", "data": "Left room successfully" })
    );
    dispatcher.sync().await;
    assert_eq!(dispatcher.room_connection_count("topic:9"), 0);
}

#[tokio::test]
async fn test_shutdown_closes_open_sockets() {
    let app = TestApp::new();
    let server = app.ws_server();
    let dispatcher = app.app.dispatcher().clone();

    let mut socket = server.get_websocket("/ws").await.into_websocket().await;
    settle(&mut socket, &dispatcher).await;

    app.app.shutdown().await;
    assert_eq!(dispatcher.total_connections(), 0);

    let frame = timeout(Duration::from_secs(2), socket.receive_message())
        .await
        .expect("close within timeout");
    assert!(matches!(frame, Frame::Close(_)), "expected close, got {:?}", frame);
}
