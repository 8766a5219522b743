//! Common test utilities and helpers
//!
//! Builds a fully wired app on the in-memory store and directory, so tests
//! can seed data directly and drive it over HTTP or through the dispatcher.

use std::sync::Arc;

use axum_test::TestServer;
use chrono::{Duration, Utc};
use uuid::Uuid;

use socialhub::backend::auth::sessions::{create_token, TOKEN_TTL_SECS};
use socialhub::backend::notifications::{
    MemoryDirectory, MemoryNotificationStore, NotificationStore,
};
use socialhub::backend::server::{create_app_with, App, ServerConfig};
use socialhub::shared::{Notification, NotificationType};

pub const TEST_SECRET: &str = "integration-test-secret";

/// An app plus direct handles on its storage
pub struct TestApp {
    pub app: App,
    pub store: Arc<MemoryNotificationStore>,
    pub directory: Arc<MemoryDirectory>,
}

impl TestApp {
    /// Must be called from within a Tokio runtime
    pub fn new() -> Self {
        let config = ServerConfig::builder()
            .jwt_secret(TEST_SECRET)
            .worker_count(2)
            .task_queue_capacity(64)
            .build()
            .expect("valid test config");
        let store = Arc::new(MemoryNotificationStore::new());
        let directory = Arc::new(MemoryDirectory::new());
        let app = create_app_with(config, store.clone(), directory.clone());
        Self {
            app,
            store,
            directory,
        }
    }

    pub fn server(&self) -> TestServer {
        TestServer::new(self.app.router.clone()).expect("test server")
    }

    /// A server on a real port, needed for WebSocket upgrades
    pub fn ws_server(&self) -> TestServer {
        TestServer::builder()
            .http_transport()
            .build(self.app.router.clone())
            .expect("ws test server")
    }

    /// Register a user in the directory and return a bearer token for them
    pub async fn user(&self, username: &str) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        self.directory.add_user(user_id, username).await;
        (user_id, token_for(user_id))
    }

    /// Insert a notification for `user_id`, `age_secs` seconds in the past
    pub async fn seed(
        &self,
        user_id: Uuid,
        actor_id: Uuid,
        kind: NotificationType,
        age_secs: i64,
    ) -> Notification {
        let mut notification = Notification::new(
            user_id,
            actor_id,
            kind,
            Some(Uuid::new_v4()),
            format!("seeded {}", kind),
        );
        notification.created_at = Utc::now() - Duration::seconds(age_secs);
        self.store
            .create(&notification)
            .await
            .expect("seed notification");
        notification
    }

    pub async fn store_mark(&self, notification_id: Uuid) {
        self.store
            .mark_as_read(notification_id)
            .await
            .expect("mark seeded notification");
    }

    pub async fn unread(&self, user_id: Uuid) -> i64 {
        self.store.unread_count(user_id).await.expect("unread count")
    }
}

pub fn token_for(user_id: Uuid) -> String {
    create_token(TEST_SECRET, user_id, None, TOKEN_TTL_SECS).expect("sign token")
}
