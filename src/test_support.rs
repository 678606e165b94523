//! In-memory fakes and builders shared by the unit tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::notification::notification_store::NotificationStore;
use crate::notification::{NewNotification, Notification, NotificationStats, NotificationType};
use crate::reminder::mailer::{EmailMessage, Mailer};
use crate::reminder::ThresholdLabel;
use crate::task::{Task, TaskPriority, TaskStatus, TaskStore};
use crate::user::{User, UserStore};

pub fn sample_user(username: &str, email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        organization_id: Uuid::new_v4(),
        username: username.to_string(),
        email: email.to_string(),
        created_at: Utc::now(),
    }
}

pub fn sample_task() -> Task {
    let now = Utc::now();
    Task {
        id: Uuid::new_v4(),
        organization_id: Uuid::new_v4(),
        created_by: Uuid::new_v4(),
        assigned_to: None,
        title: "Sample task".to_string(),
        description: None,
        status: TaskStatus::Pending.to_string(),
        priority: TaskPriority::Medium.to_string(),
        due_date: None,
        last_reminder_sent: None,
        last_reminder_at: None,
        follow_up_enabled: false,
        last_follow_up_sent: None,
        created_at: now,
        updated_at: now,
    }
}

pub fn sample_notification(user_id: Uuid, is_seen: bool) -> Notification {
    Notification {
        id: Uuid::new_v4(),
        user_id,
        task_id: None,
        title: "Task Reminder".to_string(),
        description: "\"Sample task\" is due today".to_string(),
        notification_type: NotificationType::Info.to_string(),
        is_seen,
        created_at: Utc::now(),
    }
}

// ── Mailer fake ────────────────────────────────────────────────

pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    fail_addresses: Mutex<HashSet<String>>,
    fail_all: AtomicBool,
}

pub fn recording_mailer() -> (Arc<RecordingMailer>, Arc<Mutex<Vec<EmailMessage>>>) {
    let sent = Arc::new(Mutex::new(Vec::new()));
    let mailer = Arc::new(RecordingMailer {
        sent: Arc::clone(&sent),
        fail_addresses: Mutex::new(HashSet::new()),
        fail_all: AtomicBool::new(false),
    });
    (mailer, sent)
}

impl RecordingMailer {
    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn fail_for(&self, address: &str) {
        self.fail_addresses
            .lock()
            .unwrap()
            .insert(address.to_string());
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        if self.fail_all.load(Ordering::SeqCst)
            || self.fail_addresses.lock().unwrap().contains(&message.to)
        {
            return Err(AppError::Mail("injected transport failure".to_string()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

// ── Task store fake ────────────────────────────────────────────

fn is_active(task: &Task) -> bool {
    task.status == TaskStatus::Pending.to_string()
        || task.status == TaskStatus::InProgress.to_string()
}

pub struct InMemoryTaskStore {
    tasks: Mutex<Vec<Task>>,
}

impl InMemoryTaskStore {
    pub fn new(tasks: Vec<Task>) -> Arc<Self> {
        Arc::new(Self {
            tasks: Mutex::new(tasks),
        })
    }

    pub fn get(&self, id: Uuid) -> Option<Task> {
        self.tasks.lock().unwrap().iter().find(|t| t.id == id).cloned()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn find_due_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        label: ThresholdLabel,
    ) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| {
                t.due_date.map_or(false, |due| due >= start && due < end)
                    && is_active(t)
                    && t.last_reminder_sent.as_deref() != Some(label.as_str())
            })
            .cloned()
            .collect())
    }

    async fn find_follow_up_candidates(
        &self,
        due_before: DateTime<Utc>,
        resend_cutoff: DateTime<Utc>,
    ) -> Result<Vec<Task>> {
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| {
                t.due_date.map_or(false, |due| due < due_before)
                    && is_active(t)
                    && t.follow_up_enabled
                    && t.last_follow_up_sent.map_or(true, |at| at < resend_cutoff)
            })
            .cloned()
            .collect())
    }

    async fn mark_reminder_sent(
        &self,
        task_id: Uuid,
        label: ThresholdLabel,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let mut tasks = self.tasks.lock().unwrap();
        if let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) {
            task.last_reminder_sent = Some(label.as_str().to_string());
            task.last_reminder_at = Some(at);
        }
        Ok(())
    }

    async fn mark_follow_up_sent(&self, task_id: Uuid, at: DateTime<Utc>) -> Result<()> {
        let mut tasks = self.tasks.lock().unwrap();
        if let Some(task) = tasks.iter_mut().find(|t| t.id == task_id) {
            task.last_follow_up_sent = Some(at);
        }
        Ok(())
    }

    async fn find_in_organization(
        &self,
        task_id: Uuid,
        organization_id: Uuid,
    ) -> Result<Option<Task>> {
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == task_id && t.organization_id == organization_id)
            .cloned())
    }
}

// ── User store fake ────────────────────────────────────────────

pub struct InMemoryUserStore {
    users: Vec<User>,
}

impl InMemoryUserStore {
    pub fn new(users: Vec<User>) -> Arc<Self> {
        Arc::new(Self { users })
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }
}

// ── Notification store fake ────────────────────────────────────

pub struct InMemoryNotificationStore {
    rows: Mutex<Vec<Notification>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(Vec::new()),
        })
    }

    pub fn all(&self) -> Vec<Notification> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn create(&self, new: NewNotification) -> Result<Notification> {
        let notification = Notification {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            task_id: new.task_id,
            title: new.title,
            description: new.description,
            notification_type: new.notification_type.to_string(),
            is_seen: false,
            created_at: Utc::now(),
        };
        self.rows.lock().unwrap().push(notification.clone());
        Ok(notification)
    }

    async fn find_page(
        &self,
        user_id: Uuid,
        page: u32,
        limit: u32,
        unseen_only: bool,
    ) -> Result<(Vec<Notification>, i64)> {
        let rows = self.rows.lock().unwrap();
        let mut matching: Vec<Notification> = rows
            .iter()
            .filter(|n| n.user_id == user_id && (!unseen_only || !n.is_seen))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let offset = (page.saturating_sub(1) as usize) * limit as usize;
        let data = matching.into_iter().skip(offset).take(limit as usize).collect();
        Ok((data, total))
    }

    async fn unread_count(&self, user_id: Uuid) -> Result<i64> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.user_id == user_id && !n.is_seen)
            .count() as i64)
    }

    async fn mark_as_seen(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notification>> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|n| n.id == id && n.user_id == user_id) {
            Some(n) => {
                n.is_seen = true;
                Ok(Some(n.clone()))
            }
            None => Ok(None),
        }
    }

    async fn mark_all_seen(&self, user_id: Uuid) -> Result<u64> {
        let mut rows = self.rows.lock().unwrap();
        let mut updated = 0;
        for n in rows.iter_mut().filter(|n| n.user_id == user_id && !n.is_seen) {
            n.is_seen = true;
            updated += 1;
        }
        Ok(updated)
    }

    async fn stats(&self, user_id: Uuid) -> Result<NotificationStats> {
        let rows = self.rows.lock().unwrap();
        let mine: Vec<&Notification> = rows.iter().filter(|n| n.user_id == user_id).collect();
        Ok(NotificationStats {
            total: mine.len() as i64,
            unread: mine.iter().filter(|n| !n.is_seen).count() as i64,
            info: mine.iter().filter(|n| n.notification_type == "info").count() as i64,
            good: mine.iter().filter(|n| n.notification_type == "good").count() as i64,
            alert: mine.iter().filter(|n| n.notification_type == "alert").count() as i64,
        })
    }
}
