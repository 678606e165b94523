use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::notification_models::Notification;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListNotificationsQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub unseen_only: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationListResponse {
    pub data: Vec<Notification>,
    pub total: i64,
    pub unread_count: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct NotificationStats {
    pub total: i64,
    pub unread: i64,
    pub info: i64,
    pub good: i64,
    pub alert: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}
