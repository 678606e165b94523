use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SendReminderRequest {
    #[validate(length(max = 500))]
    pub message: Option<String>,
    /// Immediate sends only; clients pass 0.
    #[serde(default)]
    pub days_threshold: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ManualReminderResponse {
    pub task_id: Uuid,
    pub recipient_id: Uuid,
    pub threshold: String,
    pub sent_at: DateTime<Utc>,
}
