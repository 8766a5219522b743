/**
 * Domain Events
 *
 * Domain services (likes, replies, comments, follows) report what happened
 * as a `DomainEvent` and hand it to a `Notifier`. The notifier queues the
 * matching `create_*` operation on the background pool and returns at once,
 * so the caller's request never waits on notification work and never sees
 * its errors.
 */

use uuid::Uuid;

use super::service::NotificationService;
use crate::backend::tasks::BackgroundTasks;

/// Something a user did that may notify another user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainEvent {
    TopicReplied { topic_id: Uuid, actor_id: Uuid },
    TopicLiked { topic_id: Uuid, actor_id: Uuid },
    VideoLiked { video_id: Uuid, actor_id: Uuid },
    VideoCommented { video_id: Uuid, actor_id: Uuid },
    CommentReplied { comment_id: Uuid, actor_id: Uuid },
    ReplyLiked { reply_id: Uuid, actor_id: Uuid },
    CommentLiked { comment_id: Uuid, actor_id: Uuid },
    UserFollowed { followed_id: Uuid, follower_id: Uuid },
}

impl DomainEvent {
    /// Short name used in logs
    pub fn label(&self) -> &'static str {
        match self {
            DomainEvent::TopicReplied { .. } => "topic_replied",
            DomainEvent::TopicLiked { .. } => "topic_liked",
            DomainEvent::VideoLiked { .. } => "video_liked",
            DomainEvent::VideoCommented { .. } => "video_commented",
            DomainEvent::CommentReplied { .. } => "comment_replied",
            DomainEvent::ReplyLiked { .. } => "reply_liked",
            DomainEvent::CommentLiked { .. } => "comment_liked",
            DomainEvent::UserFollowed { .. } => "user_followed",
        }
    }
}

/// Fire-and-forget entry point for domain services
#[derive(Clone)]
pub struct Notifier {
    service: NotificationService,
    tasks: BackgroundTasks,
}

impl Notifier {
    pub fn new(service: NotificationService, tasks: BackgroundTasks) -> Self {
        Self { service, tasks }
    }

    /// Queue notification work for `event`
    ///
    /// Returns `false` when the pool is full or shut down and the event was
    /// dropped.
    pub fn emit(&self, event: DomainEvent) -> bool {
        let service = self.service.clone();
        self.tasks.submit(event.label(), async move {
            service.handle_event(event).await.map(|_| ())
        })
    }
}
