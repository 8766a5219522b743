/**
 * Notification Persistence
 *
 * `NotificationStore` is the seam between the notification service and
 * storage. Two implementations exist: `PgNotificationStore` over sqlx and
 * `MemoryNotificationStore`, used when no database is configured and by
 * tests.
 *
 * Stores do not enforce ownership. The service checks `user_id` before any
 * mutation and only then calls into the store.
 */

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::{Notification, NotificationQuery, Pagination};

#[derive(Debug, Error)]
pub enum StoreError {
    /// The named record does not exist
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    /// A stored row could not be turned back into a domain value
    #[error("decode error: {0}")]
    Decode(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, notification: &Notification) -> StoreResult<()>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Notification>>;

    /// One page of a user's notifications, newest first, plus the total
    /// number matching the filters
    async fn list_for_user(
        &self,
        user_id: Uuid,
        query: &NotificationQuery,
        page: Pagination,
    ) -> StoreResult<(Vec<Notification>, i64)>;

    async fn unread_count(&self, user_id: Uuid) -> StoreResult<i64>;

    /// `(id, owner)` for each of `ids` that exists
    async fn owners_of(&self, ids: &[Uuid]) -> StoreResult<Vec<(Uuid, Uuid)>>;

    async fn mark_as_read(&self, id: Uuid) -> StoreResult<()>;

    /// Marks the given ids that belong to `user_id`; returns how many of
    /// them exist
    async fn mark_many_as_read(&self, user_id: Uuid, ids: &[Uuid]) -> StoreResult<u64>;

    /// Returns how many were unread
    async fn mark_all_as_read(&self, user_id: Uuid) -> StoreResult<u64>;

    async fn delete(&self, id: Uuid) -> StoreResult<()>;

    async fn delete_for_user(&self, user_id: Uuid) -> StoreResult<u64>;

    fn backend_name(&self) -> &'static str;
}
