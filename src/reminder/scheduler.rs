use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::notification::{NewNotification, NotificationService, NotificationType};
use crate::task::TaskStore;
use crate::user::UserStore;

use super::dispatcher::{EmailDispatcher, ReminderEvent};
use super::threshold::{day_window, days_left, days_overdue, ThresholdLabel};

/// Daily tick at 09:00 UTC. Not externally configurable.
pub const DAILY_SCHEDULE: &str = "0 0 9 * * *";

/// How soon a follow-up may repeat for the same task.
fn follow_up_resend_after() -> Duration {
    Duration::hours(24)
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub skipped: bool,
    pub reminders_sent: usize,
    pub follow_ups_sent: usize,
}

#[derive(Debug, Clone)]
pub struct ManualReminderOutcome {
    pub task_id: Uuid,
    pub recipient_id: Uuid,
    pub sent_at: DateTime<Utc>,
}

/// Time-driven reminder evaluator with an explicit start/stop lifecycle.
/// One pass walks the four due-date thresholds and then the overdue
/// follow-ups; a non-reentrant guard makes overlapping ticks skip instead
/// of double-evaluating a threshold.
pub struct ReminderScheduler {
    tasks: Arc<dyn TaskStore>,
    users: Arc<dyn UserStore>,
    dispatcher: EmailDispatcher,
    notifications: NotificationService,
    run_guard: Mutex<()>,
    job_scheduler: Mutex<Option<JobScheduler>>,
}

impl ReminderScheduler {
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        users: Arc<dyn UserStore>,
        dispatcher: EmailDispatcher,
        notifications: NotificationService,
    ) -> Arc<Self> {
        Arc::new(Self {
            tasks,
            users,
            dispatcher,
            notifications,
            run_guard: Mutex::new(()),
            job_scheduler: Mutex::new(None),
        })
    }

    pub async fn start(self: Arc<Self>) -> anyhow::Result<()> {
        let mut slot = self.job_scheduler.lock().await;
        if slot.is_some() {
            return Ok(());
        }

        let scheduler = JobScheduler::new().await?;
        let this = Arc::clone(&self);
        let job = Job::new_async(DAILY_SCHEDULE, move |_uuid, _lock| {
            let this = Arc::clone(&this);
            Box::pin(async move {
                match this.run_once().await {
                    Ok(summary) if summary.skipped => {}
                    Ok(summary) => info!(
                        reminders = summary.reminders_sent,
                        follow_ups = summary.follow_ups_sent,
                        "reminder pass complete"
                    ),
                    Err(e) => error!("Reminder pass failed: {e:?}"),
                }
            })
        })?;

        scheduler.add(job).await?;
        scheduler.start().await?;
        *slot = Some(scheduler);

        info!("Reminder scheduler started ({DAILY_SCHEDULE})");
        Ok(())
    }

    pub async fn shutdown(&self) {
        if let Some(mut scheduler) = self.job_scheduler.lock().await.take() {
            if let Err(e) = scheduler.shutdown().await {
                error!("Failed to stop reminder scheduler: {e:?}");
            } else {
                info!("Reminder scheduler stopped");
            }
        }
    }

    /// One full evaluation pass. Public so operators can trigger it out of
    /// band; the daily job calls the same path.
    pub async fn run_once(&self) -> Result<RunSummary> {
        let Ok(_guard) = self.run_guard.try_lock() else {
            warn!("Previous reminder pass still running, skipping this tick");
            return Ok(RunSummary {
                skipped: true,
                ..RunSummary::default()
            });
        };

        let now = Utc::now();
        let mut summary = RunSummary::default();

        for label in ThresholdLabel::SCHEDULED {
            match self.threshold_pass(label, now).await {
                Ok(sent) => summary.reminders_sent += sent,
                Err(e) => error!("{label} pass failed: {e:?}"),
            }
        }

        match self.follow_up_pass(now).await {
            Ok(sent) => summary.follow_ups_sent += sent,
            Err(e) => error!("follow-up pass failed: {e:?}"),
        }

        Ok(summary)
    }

    async fn threshold_pass(&self, label: ThresholdLabel, now: DateTime<Utc>) -> Result<usize> {
        let Some(days_ahead) = label.days_ahead() else {
            return Ok(0);
        };
        let (start, end) = day_window(now, days_ahead);
        let tasks = self.tasks.find_due_between(start, end, label).await?;

        let mut sent = 0;
        for task in tasks {
            let Some(due) = task.due_date else { continue };
            let event = ReminderEvent {
                threshold: label,
                days_offset: days_left(due, now),
                task,
            };

            match self.dispatch(&event, None).await {
                Ok(()) => {
                    // Flag only after a successful send; a crash between the
                    // two can duplicate once, which is accepted.
                    if let Err(e) = self
                        .tasks
                        .mark_reminder_sent(event.task.id, label, now)
                        .await
                    {
                        error!(
                            "Failed to record {label} reminder for task {}: {e:?}",
                            event.task.id
                        );
                    }
                    sent += 1;
                }
                // Flag withheld, so the next run retries this threshold.
                Err(e) => error!("{label} reminder for task {} failed: {e:?}", event.task.id),
            }
        }

        Ok(sent)
    }

    async fn follow_up_pass(&self, now: DateTime<Utc>) -> Result<usize> {
        let (start_of_today, _) = day_window(now, 0);
        let resend_cutoff = now - follow_up_resend_after();
        let tasks = self
            .tasks
            .find_follow_up_candidates(start_of_today, resend_cutoff)
            .await?;

        let mut sent = 0;
        for task in tasks {
            let Some(due) = task.due_date else { continue };
            let event = ReminderEvent {
                threshold: ThresholdLabel::FollowUp,
                days_offset: -days_overdue(due, now),
                task,
            };

            match self.dispatch(&event, None).await {
                Ok(()) => {
                    if let Err(e) = self.tasks.mark_follow_up_sent(event.task.id, now).await {
                        error!(
                            "Failed to record follow-up for task {}: {e:?}",
                            event.task.id
                        );
                    }
                    sent += 1;
                }
                Err(e) => error!("Follow-up for task {} failed: {e:?}", event.task.id),
            }
        }

        Ok(sent)
    }

    /// Send a reminder for one task right now, on behalf of `caller_id`.
    /// Deliberately skips the idempotency gate: resending is allowed.
    pub async fn send_manual(
        &self,
        caller_id: Uuid,
        task_id: Uuid,
        message: Option<&str>,
    ) -> Result<ManualReminderOutcome> {
        let caller = self
            .users
            .find_by_id(caller_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Unknown caller".to_string()))?;

        let task = self
            .tasks
            .find_in_organization(task_id, caller.organization_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

        if task.created_by != caller_id && task.assigned_to != Some(caller_id) {
            return Err(AppError::Forbidden(
                "Only the task creator or assignee can send a reminder".to_string(),
            ));
        }

        let recipient_id = task.recipient_id();
        let event = ReminderEvent {
            threshold: ThresholdLabel::ManualFollowUp,
            days_offset: 0,
            task,
        };
        self.dispatch(&event, message).await?;

        Ok(ManualReminderOutcome {
            task_id,
            recipient_id,
            sent_at: Utc::now(),
        })
    }

    async fn dispatch(&self, event: &ReminderEvent, custom_message: Option<&str>) -> Result<()> {
        let recipient = self
            .users
            .find_by_id(event.task.recipient_id())
            .await?
            .ok_or_else(|| AppError::NotFound("Reminder recipient not found".to_string()))?;
        let assigned_by = self.users.find_by_id(event.task.created_by).await?;

        self.dispatcher
            .send_reminder(event, &recipient, assigned_by.as_ref(), custom_message)
            .await?;

        // The email already went out; a store failure here must not
        // withhold the idempotency flag, so it is logged and swallowed.
        if let Err(e) = self
            .notifications
            .publish(reminder_notification(event, recipient.id, custom_message))
            .await
        {
            error!(
                "Failed to record in-app notification for task {}: {e:?}",
                event.task.id
            );
        }

        Ok(())
    }
}

fn reminder_notification(
    event: &ReminderEvent,
    recipient_id: Uuid,
    custom_message: Option<&str>,
) -> NewNotification {
    let timing = if event.is_immediate() {
        "needs your attention".to_string()
    } else {
        match event.days_offset {
            0 => "is due today".to_string(),
            1 => "is due tomorrow".to_string(),
            d if d > 1 => format!("is due in {d} days"),
            -1 => "is 1 day overdue".to_string(),
            d => format!("is {} days overdue", -d),
        }
    };

    let description = match custom_message {
        Some(message) => format!("\"{}\" {timing}: {message}", event.task.title),
        None => format!("\"{}\" {timing}", event.task.title),
    };

    NewNotification {
        user_id: recipient_id,
        task_id: Some(event.task.id),
        title: "Task Reminder".to_string(),
        description,
        notification_type: if event.days_offset <= 0 {
            NotificationType::Alert
        } else {
            NotificationType::Info
        },
    }
}
