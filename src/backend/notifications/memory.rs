//! In-memory notification store.
//!
//! Used when `DATABASE_URL` is not set and by the test suite. Not durable:
//! everything is lost on restart, and separate processes never share state.
//! Listing scans every record, which is fine at development scale.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{NotificationStore, StoreError, StoreResult};
use crate::shared::{Notification, NotificationQuery, Pagination};

#[derive(Debug, Default)]
pub struct MemoryNotificationStore {
    notifications: RwLock<HashMap<Uuid, Notification>>,
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored notification addressed to `user_id`, in no particular order
    pub async fn all_for_user(&self, user_id: Uuid) -> Vec<Notification> {
        let notifications = self.notifications.read().await;
        notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.notifications.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.notifications.read().await.is_empty()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(&self, notification: &Notification) -> StoreResult<()> {
        let mut notifications = self.notifications.write().await;
        notifications.insert(notification.id, notification.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications.get(&id).cloned())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        query: &NotificationQuery,
        page: Pagination,
    ) -> StoreResult<(Vec<Notification>, i64)> {
        let notifications = self.notifications.read().await;
        let mut matching: Vec<&Notification> = notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .filter(|n| query.notification_type.map_or(true, |t| n.notification_type == t))
            .filter(|n| query.is_read.map_or(true, |r| n.is_read == r))
            .collect();

        // newest first, id as a stable tie-break
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();

        Ok((items, total))
    }

    async fn unread_count(&self, user_id: Uuid) -> StoreResult<i64> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .values()
            .filter(|n| n.user_id == user_id && !n.is_read)
            .count() as i64)
    }

    async fn owners_of(&self, ids: &[Uuid]) -> StoreResult<Vec<(Uuid, Uuid)>> {
        let notifications = self.notifications.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| notifications.get(id).map(|n| (n.id, n.user_id)))
            .collect())
    }

    async fn mark_as_read(&self, id: Uuid) -> StoreResult<()> {
        let mut notifications = self.notifications.write().await;
        let notification = notifications
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("notification".to_string()))?;
        notification.is_read = true;
        Ok(())
    }

    async fn mark_many_as_read(&self, user_id: Uuid, ids: &[Uuid]) -> StoreResult<u64> {
        let mut notifications = self.notifications.write().await;
        let ids: HashSet<&Uuid> = ids.iter().collect();
        let mut count = 0;
        for id in ids {
            if let Some(notification) = notifications.get_mut(id) {
                if notification.user_id == user_id {
                    notification.is_read = true;
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    async fn mark_all_as_read(&self, user_id: Uuid) -> StoreResult<u64> {
        let mut notifications = self.notifications.write().await;
        let mut count = 0;
        for notification in notifications.values_mut() {
            if notification.user_id == user_id && !notification.is_read {
                notification.is_read = true;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let mut notifications = self.notifications.write().await;
        notifications
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound("notification".to_string()))
    }

    async fn delete_for_user(&self, user_id: Uuid) -> StoreResult<u64> {
        let mut notifications = self.notifications.write().await;
        let before = notifications.len();
        notifications.retain(|_, n| n.user_id != user_id);
        Ok((before - notifications.len()) as u64)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
