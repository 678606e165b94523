use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;

use super::notification_dto::NotificationStats;
use super::notification_models::{NewNotification, Notification};
use super::notification_store::NotificationStore;

#[derive(Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn create(&self, new: NewNotification) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, task_id, title, description, notification_type)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(new.user_id)
        .bind(new.task_id)
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.notification_type.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    async fn find_page(
        &self,
        user_id: Uuid,
        page: u32,
        limit: u32,
        unseen_only: bool,
    ) -> Result<(Vec<Notification>, i64)> {
        let offset = (page.saturating_sub(1)) as i64 * limit as i64;

        let (list_query, count_query) = if unseen_only {
            (
                "SELECT * FROM notifications WHERE user_id = $1 AND is_seen = false
                 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
                "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_seen = false",
            )
        } else {
            (
                "SELECT * FROM notifications WHERE user_id = $1
                 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
                "SELECT COUNT(*) FROM notifications WHERE user_id = $1",
            )
        };

        let notifications = sqlx::query_as::<_, Notification>(list_query)
            .bind(user_id)
            .bind(limit as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        let total: (i64,) = sqlx::query_as(count_query)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok((notifications, total.0))
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_seen = false",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    async fn mark_as_seen(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notification>> {
        let notification = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_seen = true WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    async fn mark_all_seen(&self, user_id: Uuid) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_seen = true WHERE user_id = $1 AND is_seen = false",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn stats(&self, user_id: Uuid) -> Result<NotificationStats> {
        let stats = sqlx::query_as::<_, NotificationStats>(
            "SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE is_seen = false) AS unread,
                COUNT(*) FILTER (WHERE notification_type = 'info') AS info,
                COUNT(*) FILTER (WHERE notification_type = 'good') AS good,
                COUNT(*) FILTER (WHERE notification_type = 'alert') AS alert
             FROM notifications WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}
