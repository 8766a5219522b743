/**
 * PostgreSQL Notification Store
 *
 * Runtime-checked sqlx queries against the `notifications` table created by
 * `migrations/20250101000001_create_notifications.sql`.
 *
 * Optional list filters are bound as nullable parameters
 * (`$2::varchar IS NULL OR type = $2`) so one statement serves every filter
 * combination.
 */

use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use super::store::{NotificationStore, StoreError, StoreResult};
use crate::shared::{Notification, NotificationQuery, NotificationType, Pagination};

#[derive(Debug, Clone)]
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Convert a `notifications` row back into a `Notification`
fn notification_from_row(row: &PgRow) -> StoreResult<Notification> {
    let type_tag: String = row.get("type");
    let notification_type = type_tag
        .parse::<NotificationType>()
        .map_err(|e| StoreError::Decode(e.to_string()))?;

    Ok(Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        actor_id: row.get("actor_id"),
        notification_type,
        resource_id: row.get("resource_id"),
        message: row.get("message"),
        is_read: row.get("is_read"),
        created_at: row.get("created_at"),
    })
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn create(&self, notification: &Notification) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, user_id, actor_id, type, resource_id, message, is_read, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(notification.actor_id)
        .bind(notification.notification_type.as_str())
        .bind(notification.resource_id)
        .bind(&notification.message)
        .bind(notification.is_read)
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Notification>> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, actor_id, type, resource_id, message, is_read, created_at
            FROM notifications
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(notification_from_row).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        query: &NotificationQuery,
        page: Pagination,
    ) -> StoreResult<(Vec<Notification>, i64)> {
        let type_filter = query.notification_type.map(|t| t.as_str());

        let total: i64 = sqlx::query(
            r#"
            SELECT COUNT(*) AS total
            FROM notifications
            WHERE user_id = $1
              AND ($2::varchar IS NULL OR type = $2)
              AND ($3::boolean IS NULL OR is_read = $3)
            "#,
        )
        .bind(user_id)
        .bind(type_filter)
        .bind(query.is_read)
        .fetch_one(&self.pool)
        .await?
        .get("total");

        let rows = sqlx::query(
            r#"
            SELECT id, user_id, actor_id, type, resource_id, message, is_read, created_at
            FROM notifications
            WHERE user_id = $1
              AND ($2::varchar IS NULL OR type = $2)
              AND ($3::boolean IS NULL OR is_read = $3)
            ORDER BY created_at DESC, id DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(user_id)
        .bind(type_filter)
        .bind(query.is_read)
        .bind(i64::from(page.limit))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let notifications = rows
            .iter()
            .map(notification_from_row)
            .collect::<StoreResult<Vec<_>>>()?;

        Ok((notifications, total))
    }

    async fn unread_count(&self, user_id: Uuid) -> StoreResult<i64> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS unread
            FROM notifications
            WHERE user_id = $1 AND is_read = FALSE
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("unread"))
    }

    async fn owners_of(&self, ids: &[Uuid]) -> StoreResult<Vec<(Uuid, Uuid)>> {
        let rows = sqlx::query("SELECT id, user_id FROM notifications WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| (row.get("id"), row.get("user_id")))
            .collect())
    }

    async fn mark_as_read(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("notification".to_string()));
        }
        Ok(())
    }

    async fn mark_many_as_read(&self, user_id: Uuid, ids: &[Uuid]) -> StoreResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND id = ANY($2)",
        )
        .bind(user_id)
        .bind(ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn mark_all_as_read(&self, user_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("notification".to_string()));
        }
        Ok(())
    }

    async fn delete_for_user(&self, user_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
