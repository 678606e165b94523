use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::reminder::ThresholdLabel;

use super::task_models::Task;

/// The slice of the task store the reminder pipeline reads and mutates.
/// Everything else about tasks (CRUD, sharing, search) belongs to the
/// dashboard service and stays behind this seam.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Active tasks whose due date falls in `[start, end)` and whose last
    /// reminder was not already sent under `label`.
    async fn find_due_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        label: ThresholdLabel,
    ) -> Result<Vec<Task>>;

    /// Active tasks overdue before `due_before` with follow-ups enabled and
    /// no follow-up sent since `resend_cutoff`.
    async fn find_follow_up_candidates(
        &self,
        due_before: DateTime<Utc>,
        resend_cutoff: DateTime<Utc>,
    ) -> Result<Vec<Task>>;

    async fn mark_reminder_sent(
        &self,
        task_id: Uuid,
        label: ThresholdLabel,
        at: DateTime<Utc>,
    ) -> Result<()>;

    async fn mark_follow_up_sent(&self, task_id: Uuid, at: DateTime<Utc>) -> Result<()>;

    /// Task lookup scoped to an organization, for the manual-reminder path.
    async fn find_in_organization(
        &self,
        task_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Task>>;
}
