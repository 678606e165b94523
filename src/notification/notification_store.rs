use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;

use super::notification_dto::NotificationStats;
use super::notification_models::{NewNotification, Notification};

#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, new: NewNotification) -> Result<Notification>;

    /// One page of notifications, newest first, plus the total row count for
    /// the same filter.
    async fn find_page(
        &self,
        user_id: Uuid,
        page: u32,
        limit: u32,
        unseen_only: bool,
    ) -> Result<(Vec<Notification>, i64)>;

    async fn unread_count(&self, user_id: Uuid) -> Result<i64>;

    async fn mark_as_seen(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notification>>;

    async fn mark_all_seen(&self, user_id: Uuid) -> Result<u64>;

    async fn stats(&self, user_id: Uuid) -> Result<NotificationStats>;
}
