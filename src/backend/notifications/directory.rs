/**
 * Domain Directory
 *
 * Read-only lookups into data owned by other domain services: who owns a
 * topic, video, comment or reply, and what a user is called. Notification
 * creation needs both to pick the recipient and render the message.
 *
 * `PgDirectory` reads the shared tables and skips soft-deleted rows.
 * `MemoryDirectory` is filled by hand, for tests and database-less runs.
 */

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{StoreError, StoreResult};

/// Kinds of resource a notification can point at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Topic,
    Video,
    Comment,
    Reply,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Topic => "topic",
            ResourceKind::Video => "video",
            ResourceKind::Comment => "comment",
            ResourceKind::Reply => "reply",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Owner of a resource, plus its title when the resource has one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceOwner {
    pub user_id: Uuid,
    /// Topics and videos only
    pub title: Option<String>,
}

#[async_trait]
pub trait Directory: Send + Sync {
    /// `StoreError::NotFound` when the resource is missing or deleted
    async fn resource_owner(&self, kind: ResourceKind, id: Uuid) -> StoreResult<ResourceOwner>;

    /// `StoreError::NotFound` when the user is missing
    async fn display_name(&self, user_id: Uuid) -> StoreResult<String>;
}

#[derive(Debug, Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Directory for PgDirectory {
    async fn resource_owner(&self, kind: ResourceKind, id: Uuid) -> StoreResult<ResourceOwner> {
        let sql = match kind {
            ResourceKind::Topic => {
                "SELECT user_id, title FROM topics WHERE id = $1 AND deleted_at IS NULL"
            }
            ResourceKind::Video => {
                "SELECT user_id, title FROM videos WHERE id = $1 AND deleted_at IS NULL"
            }
            ResourceKind::Comment => {
                "SELECT user_id, NULL::varchar AS title FROM comments WHERE id = $1 AND deleted_at IS NULL"
            }
            ResourceKind::Reply => {
                "SELECT user_id, NULL::varchar AS title FROM replies WHERE id = $1 AND deleted_at IS NULL"
            }
        };

        let row = sqlx::query(sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(kind.to_string()))?;

        Ok(ResourceOwner {
            user_id: row.get("user_id"),
            title: row.get("title"),
        })
    }

    async fn display_name(&self, user_id: Uuid) -> StoreResult<String> {
        let row = sqlx::query("SELECT username FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound("user".to_string()))?;

        Ok(row.get("username"))
    }
}

#[derive(Debug, Default)]
pub struct MemoryDirectory {
    users: RwLock<HashMap<Uuid, String>>,
    resources: RwLock<HashMap<(ResourceKind, Uuid), ResourceOwner>>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, user_id: Uuid, username: impl Into<String>) {
        self.users.write().await.insert(user_id, username.into());
    }

    pub async fn add_resource(
        &self,
        kind: ResourceKind,
        id: Uuid,
        owner: Uuid,
        title: Option<&str>,
    ) {
        self.resources.write().await.insert(
            (kind, id),
            ResourceOwner {
                user_id: owner,
                title: title.map(str::to_string),
            },
        );
    }

    /// Forget a resource, as a soft delete would
    pub async fn remove_resource(&self, kind: ResourceKind, id: Uuid) {
        self.resources.write().await.remove(&(kind, id));
    }
}

#[async_trait]
impl Directory for MemoryDirectory {
    async fn resource_owner(&self, kind: ResourceKind, id: Uuid) -> StoreResult<ResourceOwner> {
        self.resources
            .read()
            .await
            .get(&(kind, id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(kind.to_string()))
    }

    async fn display_name(&self, user_id: Uuid) -> StoreResult<String> {
        self.users
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound("user".to_string()))
    }
}
