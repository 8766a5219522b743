//! Notification pipeline tests
//!
//! Domain events go through the notifier, land in the store and reach the
//! recipient's live connections through the dispatcher.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::timeout;
use uuid::Uuid;

use socialhub::backend::notifications::{DomainEvent, ResourceKind};
use socialhub::shared::{message_types, NotificationType, WsMessage};

use crate::common::TestApp;

async fn next_frame(rx: &mut mpsc::UnboundedReceiver<WsMessage>) -> WsMessage {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("frame within timeout")
        .expect("connection still open")
}

#[tokio::test]
async fn test_like_notifies_owner_live() {
    let app = TestApp::new();
    let (alice, _) = app.user("alice").await;
    let (bob, _) = app.user("bob").await;
    let topic = Uuid::new_v4();
    app.directory
        .add_resource(ResourceKind::Topic, topic, alice, Some("Rust tips"))
        .await;

    let (tx, mut alice_rx) = mpsc::unbounded_channel();
    app.app.dispatcher().register(Some(alice), None, tx);
    let (tx, mut bob_rx) = mpsc::unbounded_channel();
    app.app.dispatcher().register(Some(bob), None, tx);
    app.app.dispatcher().sync().await;

    assert!(app.app.notifier().emit(DomainEvent::TopicLiked {
        topic_id: topic,
        actor_id: bob,
    }));

    let frame = next_frame(&mut alice_rx).await;
    assert_eq!(frame.message_type, message_types::NOTIFICATION);
    assert_eq!(frame.data["type"], json!("topic_like"));
    assert_eq!(frame.data["actorId"], json!(bob));
    assert_eq!(frame.data["isRead"], json!(false));

    let stored = app.store.all_for_user(alice).await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].notification_type, NotificationType::TopicLike);
    assert_eq!(stored[0].resource_id, Some(topic));
    assert_eq!(frame.data["id"], json!(stored[0].id));
    assert!(stored[0].message.contains("bob"));
    assert_eq!(app.unread(alice).await, 1);

    app.app.dispatcher().sync().await;
    assert!(bob_rx.try_recv().is_err());

    app.app.shutdown().await;
}

#[tokio::test]
async fn test_self_action_creates_nothing() {
    let app = TestApp::new();
    let (alice, _) = app.user("alice").await;
    let topic = Uuid::new_v4();
    app.directory
        .add_resource(ResourceKind::Topic, topic, alice, Some("Rust tips"))
        .await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    app.app.dispatcher().register(Some(alice), None, tx);

    app.app.notifier().emit(DomainEvent::TopicLiked {
        topic_id: topic,
        actor_id: alice,
    });
    app.app.notifier().emit(DomainEvent::UserFollowed {
        followed_id: alice,
        follower_id: alice,
    });

    let store = app.store.clone();
    // drains queued events before closing connections
    app.app.shutdown().await;

    assert!(store.is_empty().await);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn test_missing_resource_is_swallowed() {
    let app = TestApp::new();
    let (bob, _) = app.user("bob").await;

    assert!(app.app.notifier().emit(DomainEvent::VideoLiked {
        video_id: Uuid::new_v4(),
        actor_id: bob,
    }));

    let store = app.store.clone();
    app.app.shutdown().await;
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_follow_has_no_resource() {
    let app = TestApp::new();
    let (alice, _) = app.user("alice").await;
    let (bob, _) = app.user("bob").await;

    let created = app
        .app
        .state
        .notifications
        .handle_event(DomainEvent::UserFollowed {
            followed_id: alice,
            follower_id: bob,
        })
        .await
        .expect("follow notification")
        .expect("not a self-follow");

    assert_eq!(created.user_id, alice);
    assert_eq!(created.notification_type, NotificationType::NewFollower);
    assert_eq!(created.resource_id, None);
}

#[tokio::test]
async fn test_room_broadcast_follows_membership() {
    let app = TestApp::new();
    let dispatcher = app.app.dispatcher().clone();

    let (tx, mut watcher) = mpsc::unbounded_channel();
    dispatcher.register(None, Some("video:42".to_string()), tx);
    let (tx, mut joiner) = mpsc::unbounded_channel();
    let joiner_id = dispatcher.register(Some(Uuid::new_v4()), None, tx);
    let (tx, mut elsewhere) = mpsc::unbounded_channel();
    dispatcher.register(None, Some("video:7".to_string()), tx);

    dispatcher.join_room(joiner_id, "video:42");
    dispatcher.sync().await;
    assert_eq!(dispatcher.room_connection_count("video:42"), 2);
    assert_eq!(dispatcher.total_connections(), 3);

    let joined = joiner.try_recv().expect("room_joined reply");
    assert_eq!(joined.message_type, message_types::ROOM_JOINED);
    assert_eq!(joined.data["roomId"], json!("video:42"));

    dispatcher.broadcast_to_room("video:42", "comment_added", json!({ "text": "first" }));
    dispatcher.sync().await;
    assert_eq!(watcher.try_recv().map(|f| f.message_type).ok().as_deref(), Some("comment_added"));
    assert_eq!(joiner.try_recv().map(|f| f.message_type).ok().as_deref(), Some("comment_added"));
    assert!(elsewhere.try_recv().is_err());

    dispatcher.leave_room(joiner_id);
    dispatcher.sync().await;
    let left = joiner.try_recv().expect("room_left reply");
    assert_eq!(left.message_type, message_types::ROOM_LEFT);

    dispatcher.broadcast_to_room("video:42", "comment_added", json!({ "text": "second" }));
    dispatcher.sync().await;
    assert!(watcher.try_recv().is_ok());
    assert!(joiner.try_recv().is_err());
    assert_eq!(dispatcher.room_connection_count("video:42"), 1);

    app.app.shutdown().await;
}
