/**
 * Notification Inbox Handlers
 *
 * HTTP handlers for `/api/v1/notifications`. Every route sits behind
 * `auth_middleware`, so the caller is always known; ownership checks happen
 * in `NotificationService`.
 */

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use super::service::NotificationService;
use crate::backend::error::BackendResult;
use crate::backend::middleware::AuthUser;
use crate::shared::{
    MarkAsReadRequest, MarkAsReadResponse, NotificationListResponse, NotificationQuery,
    UnreadCountResponse,
};

/// Body for single-item mutations
#[derive(Debug, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// GET /api/v1/notifications
pub async fn list_notifications(
    State(service): State<NotificationService>,
    AuthUser(user): AuthUser,
    Query(query): Query<NotificationQuery>,
) -> BackendResult<Json<NotificationListResponse>> {
    let response = service.get_notifications(user.user_id, &query).await?;
    Ok(Json(response))
}

/// GET /api/v1/notifications/unread/count
pub async fn unread_count(
    State(service): State<NotificationService>,
    AuthUser(user): AuthUser,
) -> BackendResult<Json<UnreadCountResponse>> {
    let count = service.get_unread_count(user.user_id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// PUT /api/v1/notifications/{id}/read
pub async fn mark_as_read(
    State(service): State<NotificationService>,
    AuthUser(user): AuthUser,
    Path(notification_id): Path<Uuid>,
) -> BackendResult<Json<MessageResponse>> {
    service.mark_as_read(user.user_id, notification_id).await?;
    Ok(MessageResponse::new("Notification marked as read"))
}

/// PUT /api/v1/notifications/read
pub async fn mark_multiple_as_read(
    State(service): State<NotificationService>,
    AuthUser(user): AuthUser,
    Json(request): Json<MarkAsReadRequest>,
) -> BackendResult<Json<MarkAsReadResponse>> {
    let count = service
        .mark_multiple_as_read(user.user_id, &request.notification_ids)
        .await?;
    Ok(Json(MarkAsReadResponse {
        message: "Notifications marked as read".to_string(),
        count,
    }))
}

/// PUT /api/v1/notifications/read-all
pub async fn mark_all_as_read(
    State(service): State<NotificationService>,
    AuthUser(user): AuthUser,
) -> BackendResult<Json<MarkAsReadResponse>> {
    let count = service.mark_all_as_read(user.user_id).await?;
    Ok(Json(MarkAsReadResponse {
        message: "All notifications marked as read".to_string(),
        count,
    }))
}

/// DELETE /api/v1/notifications/{id}
pub async fn delete_notification(
    State(service): State<NotificationService>,
    AuthUser(user): AuthUser,
    Path(notification_id): Path<Uuid>,
) -> BackendResult<Json<MessageResponse>> {
    service
        .delete_notification(user.user_id, notification_id)
        .await?;
    Ok(MessageResponse::new("Notification deleted"))
}

/// DELETE /api/v1/notifications
pub async fn delete_all_notifications(
    State(service): State<NotificationService>,
    AuthUser(user): AuthUser,
) -> BackendResult<Json<MarkAsReadResponse>> {
    let count = service.delete_all_notifications(user.user_id).await?;
    Ok(Json(MarkAsReadResponse {
        message: "All notifications deleted".to_string(),
        count,
    }))
}
