use std::sync::Arc;

use crate::db::DbPool;
use crate::notification::{NotificationRepository, NotificationService};
use crate::reminder::ReminderScheduler;
use crate::sse::ConnectionRegistry;
use crate::task::TaskRepository;
use crate::user::UserRepository;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub user_repository: UserRepository,
    pub task_repository: TaskRepository,
    pub notification_repository: NotificationRepository,
    pub notifications: NotificationService,
    pub registry: ConnectionRegistry,
    pub reminders: Arc<ReminderScheduler>,
}

#[derive(Clone)]
pub struct Config {
    pub jwt_secret: String,
    /// Base URL of the dashboard frontend, used for deep links in reminder emails.
    pub app_base_url: String,
    pub mail_from: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: std::env::var("JWT_SECRET")
                .expect("JWT_SECRET must be set"),
            app_base_url: std::env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "reminders@task-notifier.local".to_string()),
        }
    }
}
