//! Notification records and inbox request/response bodies.
//!
//! JSON bodies use camelCase keys, and the type tag is serialized as `type`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Default page size for inbox listings
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Largest page size a client may request
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Closed set of notification kinds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    TopicReply,
    TopicLike,
    VideoLike,
    VideoComment,
    CommentReply,
    ReplyLike,
    CommentLike,
    NewFollower,
}

impl NotificationType {
    pub const ALL: [NotificationType; 8] = [
        NotificationType::TopicReply,
        NotificationType::TopicLike,
        NotificationType::VideoLike,
        NotificationType::VideoComment,
        NotificationType::CommentReply,
        NotificationType::ReplyLike,
        NotificationType::CommentLike,
        NotificationType::NewFollower,
    ];

    /// Tag stored in the database and sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TopicReply => "topic_reply",
            Self::TopicLike => "topic_like",
            Self::VideoLike => "video_like",
            Self::VideoComment => "video_comment",
            Self::CommentReply => "comment_reply",
            Self::ReplyLike => "reply_like",
            Self::CommentLike => "comment_like",
            Self::NewFollower => "new_follower",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| SharedError::validation("type", format!("unknown notification type '{}'", s)))
    }
}

/// A durable record of one actor acting on one resource, directed at one recipient
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    /// Recipient
    pub user_id: Uuid,
    pub actor_id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    /// Topic, video, comment or reply acted on; absent for follows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<Uuid>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Build a new unread notification stamped with the current time
    pub fn new(
        user_id: Uuid,
        actor_id: Uuid,
        notification_type: NotificationType,
        resource_id: Option<Uuid>,
        message: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            actor_id,
            notification_type,
            resource_id,
            message,
            is_read: false,
            created_at: Utc::now(),
        }
    }

    /// Data carried by the `notification` push frame
    pub fn push_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "type": self.notification_type,
            "message": self.message,
            "actorId": self.actor_id,
            "isRead": self.is_read,
            "createdAt": self.created_at,
        })
    }
}

/// Query string of `GET /api/v1/notifications`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationQuery {
    #[serde(rename = "type", default)]
    pub notification_type: Option<NotificationType>,
    #[serde(default)]
    pub is_read: Option<bool>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Validated page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn total_pages(&self, total_count: i64) -> u32 {
        if total_count <= 0 {
            return 0;
        }
        let limit = i64::from(self.limit);
        ((total_count + limit - 1) / limit) as u32
    }
}

impl NotificationQuery {
    /// Resolve defaults and reject out-of-range paging values
    pub fn pagination(&self) -> Result<Pagination, SharedError> {
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(SharedError::validation("page", "must be at least 1"));
        }
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(SharedError::validation(
                "limit",
                format!("must be between 1 and {}", MAX_PAGE_LIMIT),
            ));
        }
        Ok(Pagination { page, limit })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActorSummary {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// One inbox entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub actor: ActorSummary,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<Uuid>,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationResponse>,
    pub total_count: i64,
    pub unread_count: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// Body of `PUT /api/v1/notifications/read`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MarkAsReadRequest {
    pub notification_ids: Vec<Uuid>,
}

/// Result of a bulk mark-read or bulk delete
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkAsReadResponse {
    pub message: String,
    pub count: u64,
}
