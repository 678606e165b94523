use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text")]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    Info,
    Good,
    Alert,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::Info => write!(f, "info"),
            NotificationType::Good => write!(f, "good"),
            NotificationType::Alert => write!(f, "alert"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub task_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub notification_type: String,
    pub is_seen: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a notification. Rows are only ever mutated by
/// mark-read operations after this point, never deleted here.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub task_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub notification_type: NotificationType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_type_display() {
        assert_eq!(NotificationType::Info.to_string(), "info");
        assert_eq!(NotificationType::Good.to_string(), "good");
        assert_eq!(NotificationType::Alert.to_string(), "alert");
    }
}
