use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::reminder::ThresholdLabel;

use super::task_models::Task;
use super::task_store::TaskStore;

#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskStore for TaskRepository {
    async fn find_due_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        label: ThresholdLabel,
    ) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks
             WHERE due_date >= $1 AND due_date < $2
               AND status IN ('Pending', 'InProgress')
               AND (last_reminder_sent IS NULL OR last_reminder_sent <> $3)",
        )
        .bind(start)
        .bind(end)
        .bind(label.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn find_follow_up_candidates(
        &self,
        due_before: DateTime<Utc>,
        resend_cutoff: DateTime<Utc>,
    ) -> Result<Vec<Task>> {
        let tasks = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks
             WHERE due_date IS NOT NULL AND due_date < $1
               AND status IN ('Pending', 'InProgress')
               AND follow_up_enabled = true
               AND (last_follow_up_sent IS NULL OR last_follow_up_sent < $2)",
        )
        .bind(due_before)
        .bind(resend_cutoff)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn mark_reminder_sent(
        &self,
        task_id: Uuid,
        label: ThresholdLabel,
        at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE tasks
             SET last_reminder_sent = $2, last_reminder_at = $3, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(task_id)
        .bind(label.as_str())
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_follow_up_sent(&self, task_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            "UPDATE tasks SET last_follow_up_sent = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(task_id)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_in_organization(
        &self,
        task_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks WHERE id = $1 AND organization_id = $2",
        )
        .bind(task_id)
        .bind(organization_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }
}
