/**
 * Notification Service
 *
 * Creates notifications for the eight social event kinds and serves a
 * user's inbox.
 *
 * # Creation
 *
 * Every `create_*` operation follows the same path:
 *
 * 1. Resolve the recipient (the owner of the resource acted on, or the
 *    followed user).
 * 2. Stop quietly if the recipient is the actor.
 * 3. Resolve the actor's display name and render the message.
 * 4. Persist the notification as unread.
 * 5. Push a `notification` frame to the recipient's live connections.
 *
 * The push is a dispatcher command: it never waits for delivery and
 * succeeds whether or not the recipient is online.
 *
 * # Inbox
 *
 * Mutations check ownership first. Touching another user's notification is
 * `Forbidden` and leaves it unchanged.
 */

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use super::directory::{Directory, ResourceKind};
use super::events::DomainEvent;
use super::store::NotificationStore;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::realtime::Dispatcher;
use crate::shared::{
    message_types, ActorSummary, Notification, NotificationListResponse, NotificationQuery,
    NotificationResponse, NotificationType,
};

/// Render the human-readable line shown in the inbox
pub fn render_message(kind: NotificationType, actor: &str, title: Option<&str>) -> String {
    let title = title.unwrap_or_default();
    match kind {
        NotificationType::TopicReply => format!("{} replied to your topic: {}", actor, title),
        NotificationType::TopicLike => format!("{} liked your topic: {}", actor, title),
        NotificationType::VideoLike => format!("{} liked your video: {}", actor, title),
        NotificationType::VideoComment => format!("{} commented on your video: {}", actor, title),
        NotificationType::CommentReply => format!("{} replied to your comment", actor),
        NotificationType::ReplyLike => format!("{} liked your reply", actor),
        NotificationType::CommentLike => format!("{} liked your comment", actor),
        NotificationType::NewFollower => format!("{} started following you", actor),
    }
}

#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    directory: Arc<dyn Directory>,
    dispatcher: Dispatcher,
}

impl NotificationService {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        directory: Arc<dyn Directory>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            store,
            directory,
            dispatcher,
        }
    }

    pub fn store_backend(&self) -> &'static str {
        self.store.backend_name()
    }

    // ---- creation ----

    /// Someone replied to `topic_id`
    pub async fn create_topic_reply_notification(
        &self,
        topic_id: Uuid,
        actor_id: Uuid,
    ) -> BackendResult<Option<Notification>> {
        self.notify_owner(ResourceKind::Topic, topic_id, actor_id, NotificationType::TopicReply)
            .await
    }

    pub async fn create_topic_like_notification(
        &self,
        topic_id: Uuid,
        actor_id: Uuid,
    ) -> BackendResult<Option<Notification>> {
        self.notify_owner(ResourceKind::Topic, topic_id, actor_id, NotificationType::TopicLike)
            .await
    }

    pub async fn create_video_like_notification(
        &self,
        video_id: Uuid,
        actor_id: Uuid,
    ) -> BackendResult<Option<Notification>> {
        self.notify_owner(ResourceKind::Video, video_id, actor_id, NotificationType::VideoLike)
            .await
    }

    pub async fn create_video_comment_notification(
        &self,
        video_id: Uuid,
        actor_id: Uuid,
    ) -> BackendResult<Option<Notification>> {
        self.notify_owner(
            ResourceKind::Video,
            video_id,
            actor_id,
            NotificationType::VideoComment,
        )
        .await
    }

    /// Someone replied to comment `comment_id`
    pub async fn create_comment_reply_notification(
        &self,
        comment_id: Uuid,
        actor_id: Uuid,
    ) -> BackendResult<Option<Notification>> {
        self.notify_owner(
            ResourceKind::Comment,
            comment_id,
            actor_id,
            NotificationType::CommentReply,
        )
        .await
    }

    pub async fn create_reply_like_notification(
        &self,
        reply_id: Uuid,
        actor_id: Uuid,
    ) -> BackendResult<Option<Notification>> {
        self.notify_owner(ResourceKind::Reply, reply_id, actor_id, NotificationType::ReplyLike)
            .await
    }

    pub async fn create_comment_like_notification(
        &self,
        comment_id: Uuid,
        actor_id: Uuid,
    ) -> BackendResult<Option<Notification>> {
        self.notify_owner(
            ResourceKind::Comment,
            comment_id,
            actor_id,
            NotificationType::CommentLike,
        )
        .await
    }

    /// `follower_id` started following `followed_id`; no resource id is stored
    pub async fn create_new_follower_notification(
        &self,
        followed_id: Uuid,
        follower_id: Uuid,
    ) -> BackendResult<Option<Notification>> {
        if followed_id == follower_id {
            tracing::debug!(user_id = %follower_id, "[Notifications] Skipping self-follow");
            return Ok(None);
        }

        let actor = self.directory.display_name(follower_id).await?;
        let message = render_message(NotificationType::NewFollower, &actor, None);
        let notification = Notification::new(
            followed_id,
            follower_id,
            NotificationType::NewFollower,
            None,
            message,
        );
        self.persist_and_push(notification).await.map(Some)
    }

    /// Route a domain event to its `create_*` operation
    pub async fn handle_event(&self, event: DomainEvent) -> BackendResult<Option<Notification>> {
        match event {
            DomainEvent::TopicReplied { topic_id, actor_id } => {
                self.create_topic_reply_notification(topic_id, actor_id).await
            }
            DomainEvent::TopicLiked { topic_id, actor_id } => {
                self.create_topic_like_notification(topic_id, actor_id).await
            }
            DomainEvent::VideoLiked { video_id, actor_id } => {
                self.create_video_like_notification(video_id, actor_id).await
            }
            DomainEvent::VideoCommented { video_id, actor_id } => {
                self.create_video_comment_notification(video_id, actor_id).await
            }
            DomainEvent::CommentReplied { comment_id, actor_id } => {
                self.create_comment_reply_notification(comment_id, actor_id).await
            }
            DomainEvent::ReplyLiked { reply_id, actor_id } => {
                self.create_reply_like_notification(reply_id, actor_id).await
            }
            DomainEvent::CommentLiked { comment_id, actor_id } => {
                self.create_comment_like_notification(comment_id, actor_id).await
            }
            DomainEvent::UserFollowed {
                followed_id,
                follower_id,
            } => {
                self.create_new_follower_notification(followed_id, follower_id)
                    .await
            }
        }
    }

    async fn notify_owner(
        &self,
        kind: ResourceKind,
        resource_id: Uuid,
        actor_id: Uuid,
        notification_type: NotificationType,
    ) -> BackendResult<Option<Notification>> {
        let owner = self.directory.resource_owner(kind, resource_id).await?;
        if owner.user_id == actor_id {
            tracing::debug!(
                user_id = %actor_id,
                %resource_id,
                notification_type = %notification_type,
                "[Notifications] Skipping self-action"
            );
            return Ok(None);
        }

        let actor = self.directory.display_name(actor_id).await?;
        let message = render_message(notification_type, &actor, owner.title.as_deref());
        let notification = Notification::new(
            owner.user_id,
            actor_id,
            notification_type,
            Some(resource_id),
            message,
        );
        self.persist_and_push(notification).await.map(Some)
    }

    async fn persist_and_push(&self, notification: Notification) -> BackendResult<Notification> {
        self.store.create(&notification).await?;

        self.dispatcher.broadcast_to_user(
            notification.user_id,
            message_types::NOTIFICATION,
            notification.push_payload(),
        );

        tracing::info!(
            notification_id = %notification.id,
            user_id = %notification.user_id,
            notification_type = %notification.notification_type,
            "[Notifications] Notification created"
        );
        Ok(notification)
    }

    // ---- inbox ----

    pub async fn get_notifications(
        &self,
        user_id: Uuid,
        query: &NotificationQuery,
    ) -> BackendResult<NotificationListResponse> {
        let page = query.pagination()?;
        let (notifications, total_count) = self.store.list_for_user(user_id, query, page).await?;
        let unread_count = self.store.unread_count(user_id).await?;

        let mut names: HashMap<Uuid, Option<String>> = HashMap::new();
        let mut items = Vec::with_capacity(notifications.len());
        for notification in notifications {
            let username = match names.get(&notification.actor_id) {
                Some(name) => name.clone(),
                None => {
                    let name = self.actor_name(notification.actor_id).await;
                    names.insert(notification.actor_id, name.clone());
                    name
                }
            };

            items.push(NotificationResponse {
                id: notification.id,
                user_id: notification.user_id,
                actor: ActorSummary {
                    id: notification.actor_id,
                    username,
                },
                notification_type: notification.notification_type,
                resource_id: notification.resource_id,
                message: notification.message,
                is_read: notification.is_read,
                created_at: notification.created_at,
            });
        }

        Ok(NotificationListResponse {
            notifications: items,
            total_count,
            unread_count,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages(total_count),
        })
    }

    /// Display name for list items; a failed lookup only drops the name
    async fn actor_name(&self, actor_id: Uuid) -> Option<String> {
        match self.directory.display_name(actor_id).await {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::debug!(%actor_id, error = %e, "[Notifications] Actor lookup failed");
                None
            }
        }
    }

    pub async fn get_unread_count(&self, user_id: Uuid) -> BackendResult<i64> {
        Ok(self.store.unread_count(user_id).await?)
    }

    pub async fn mark_as_read(&self, user_id: Uuid, notification_id: Uuid) -> BackendResult<()> {
        self.owned_notification(user_id, notification_id).await?;
        self.store.mark_as_read(notification_id).await?;
        Ok(())
    }

    /// Returns how many of `ids` were marked; unknown ids are skipped
    pub async fn mark_multiple_as_read(&self, user_id: Uuid, ids: &[Uuid]) -> BackendResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let owners = self.store.owners_of(ids).await?;
        if let Some((id, _)) = owners.iter().find(|(_, owner)| *owner != user_id) {
            tracing::warn!(%user_id, notification_id = %id, "[Notifications] Bulk mark touches foreign notification");
            return Err(BackendError::forbidden("unauthorized to mark these notifications"));
        }

        Ok(self.store.mark_many_as_read(user_id, ids).await?)
    }

    /// Returns how many were unread
    pub async fn mark_all_as_read(&self, user_id: Uuid) -> BackendResult<u64> {
        Ok(self.store.mark_all_as_read(user_id).await?)
    }

    pub async fn delete_notification(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> BackendResult<()> {
        self.owned_notification(user_id, notification_id).await?;
        self.store.delete(notification_id).await?;
        Ok(())
    }

    /// Returns how many were deleted
    pub async fn delete_all_notifications(&self, user_id: Uuid) -> BackendResult<u64> {
        Ok(self.store.delete_for_user(user_id).await?)
    }

    async fn owned_notification(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> BackendResult<Notification> {
        let notification = self
            .store
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| BackendError::not_found("notification not found"))?;

        if notification.user_id != user_id {
            tracing::warn!(%user_id, %notification_id, "[Notifications] Access to foreign notification");
            return Err(BackendError::forbidden("unauthorized to modify this notification"));
        }
        Ok(notification)
    }
}
