use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, Result},
    state::AppState,
};

use super::{
    reminder_dto::{ManualReminderResponse, SendReminderRequest},
    threshold::ThresholdLabel,
};

/// Send an immediate reminder for a task
#[utoipa::path(
    post,
    path = "/api/tasks/{id}/remind",
    params(
        ("id" = Uuid, Path, description = "Task ID")
    ),
    request_body = SendReminderRequest,
    responses(
        (status = 200, description = "Reminder sent", body = ManualReminderResponse),
        (status = 403, description = "Caller is neither creator nor assignee"),
        (status = 404, description = "Task not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "reminders",
    security(("bearer_auth" = []))
)]
pub async fn send_task_reminder(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(task_id): Path<Uuid>,
    Json(payload): Json<SendReminderRequest>,
) -> Result<Json<ManualReminderResponse>> {
    payload.validate()?;
    if payload.days_threshold != 0 {
        return Err(AppError::BadRequest(
            "Only immediate reminders are supported".to_string(),
        ));
    }

    let outcome = state
        .reminders
        .send_manual(user_id, task_id, payload.message.as_deref())
        .await?;

    Ok(Json(ManualReminderResponse {
        task_id: outcome.task_id,
        recipient_id: outcome.recipient_id,
        threshold: ThresholdLabel::ManualFollowUp.to_string(),
        sent_at: outcome.sent_at,
    }))
}
