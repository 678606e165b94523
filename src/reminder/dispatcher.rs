use std::sync::Arc;

use crate::error::Result;
use crate::task::Task;
use crate::user::User;

use super::mailer::{EmailMessage, Mailer};
use super::threshold::ThresholdLabel;

/// One reminder to be sent, constructed per send and discarded. A negative
/// `days_offset` means the task is overdue by that many days.
#[derive(Debug, Clone)]
pub struct ReminderEvent {
    pub task: Task,
    pub threshold: ThresholdLabel,
    pub days_offset: i64,
}

impl ReminderEvent {
    /// Manual sends with a zero offset render with "now" wording instead of
    /// a countdown.
    pub fn is_immediate(&self) -> bool {
        self.days_offset == 0 && self.threshold == ThresholdLabel::ManualFollowUp
    }
}

const TEMPLATE_NAME: &str = "task-reminder";

struct ReminderContext {
    task_title: String,
    due_date_text: String,
    days_offset: i64,
    priority: String,
    assigned_by: String,
    custom_message: Option<String>,
    task_url: String,
    is_immediate: bool,
}

/// Renders reminder emails and hands them to the mail transport. Pure
/// rendering plus hand-off; retry and idempotency decisions belong to the
/// caller.
#[derive(Clone)]
pub struct EmailDispatcher {
    mailer: Arc<dyn Mailer>,
    app_base_url: String,
}

impl EmailDispatcher {
    pub fn new(mailer: Arc<dyn Mailer>, app_base_url: impl Into<String>) -> Self {
        Self {
            mailer,
            app_base_url: app_base_url.into(),
        }
    }

    pub async fn send_reminder(
        &self,
        event: &ReminderEvent,
        recipient: &User,
        assigned_by: Option<&User>,
        custom_message: Option<&str>,
    ) -> Result<()> {
        let context = self.build_context(event, assigned_by, custom_message);
        let subject = format!("Task Reminder: {}", event.task.title);

        tracing::debug!(
            template = TEMPLATE_NAME,
            task_id = %event.task.id,
            threshold = %event.threshold,
            to = %recipient.email,
            "rendering reminder email"
        );

        self.mailer
            .send(EmailMessage {
                to: recipient.email.clone(),
                subject,
                html_body: render_html(&context),
                text_body: render_text(&context),
            })
            .await
    }

    fn build_context(
        &self,
        event: &ReminderEvent,
        assigned_by: Option<&User>,
        custom_message: Option<&str>,
    ) -> ReminderContext {
        let due_date_text = match event.task.due_date {
            Some(due) => due.format("%B %-d, %Y at %H:%M UTC").to_string(),
            None => "No due date".to_string(),
        };

        ReminderContext {
            task_title: event.task.title.clone(),
            due_date_text,
            days_offset: event.days_offset,
            priority: event.task.priority.clone(),
            assigned_by: assigned_by
                .map(|u| u.username.clone())
                .unwrap_or_else(|| "your team".to_string()),
            custom_message: custom_message.map(str::to_string),
            task_url: format!(
                "{}/tasks/{}",
                self.app_base_url.trim_end_matches('/'),
                event.task.id
            ),
            is_immediate: event.is_immediate(),
        }
    }
}

fn timing_line(context: &ReminderContext) -> String {
    if context.is_immediate {
        return "needs your attention now".to_string();
    }
    match context.days_offset {
        0 => "is due today".to_string(),
        1 => "is due tomorrow".to_string(),
        d if d > 1 => format!("is due in {d} days"),
        -1 => "is 1 day overdue".to_string(),
        d => format!("is {} days overdue", -d),
    }
}

fn render_html(context: &ReminderContext) -> String {
    let timing = timing_line(context);
    let custom_block = match &context.custom_message {
        Some(message) => format!(
            "<blockquote style=\"border-left:3px solid #ccc;padding-left:12px;color:#555;\">{message}</blockquote>"
        ),
        None => String::new(),
    };

    format!(
        "<html><body style=\"font-family:sans-serif;color:#222;\">\
<h2>Task Reminder</h2>\
<p><strong>{title}</strong> {timing}.</p>\
<ul>\
<li>Due: {due}</li>\
<li>Priority: {priority}</li>\
<li>Assigned by: {assigned_by}</li>\
</ul>\
{custom_block}\
<p><a href=\"{url}\">Open the task</a></p>\
</body></html>",
        title = context.task_title,
        timing = timing,
        due = context.due_date_text,
        priority = context.priority,
        assigned_by = context.assigned_by,
        custom_block = custom_block,
        url = context.task_url,
    )
}

fn render_text(context: &ReminderContext) -> String {
    let timing = timing_line(context);
    let mut text = format!(
        "Task Reminder\n\n\"{title}\" {timing}.\n\nDue: {due}\nPriority: {priority}\nAssigned by: {assigned_by}\n",
        title = context.task_title,
        timing = timing,
        due = context.due_date_text,
        priority = context.priority,
        assigned_by = context.assigned_by,
    );
    if let Some(message) = &context.custom_message {
        text.push_str("\n");
        text.push_str(message);
        text.push('\n');
    }
    text.push_str(&format!("\n{}\n", context.task_url));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{recording_mailer, sample_task, sample_user};
    use chrono::{Duration, Utc};

    fn event(days_offset: i64, threshold: ThresholdLabel) -> ReminderEvent {
        let mut task = sample_task();
        task.title = "Quarterly report".to_string();
        task.due_date = Some(Utc::now() + Duration::days(days_offset.max(0)));
        ReminderEvent {
            task,
            threshold,
            days_offset,
        }
    }

    #[tokio::test]
    async fn test_subject_pattern_and_deep_link() {
        let (mailer, sent) = recording_mailer();
        let dispatcher = EmailDispatcher::new(mailer, "https://tasks.example.com/");
        let event = event(3, ThresholdLabel::ThreeDay);
        let recipient = sample_user("rania", "rania@example.com");

        dispatcher
            .send_reminder(&event, &recipient, None, None)
            .await
            .unwrap();

        let messages = sent.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].subject, "Task Reminder: Quarterly report");
        assert_eq!(messages[0].to, "rania@example.com");
        let url = format!("https://tasks.example.com/tasks/{}", event.task.id);
        assert!(messages[0].html_body.contains(&url));
        assert!(messages[0].text_body.contains(&url));
        assert!(messages[0].text_body.contains("is due in 3 days"));
    }

    #[tokio::test]
    async fn test_overdue_wording() {
        let (mailer, sent) = recording_mailer();
        let dispatcher = EmailDispatcher::new(mailer, "http://localhost");
        let event = event(-2, ThresholdLabel::FollowUp);
        let recipient = sample_user("omar", "omar@example.com");

        dispatcher
            .send_reminder(&event, &recipient, None, None)
            .await
            .unwrap();

        let messages = sent.lock().unwrap();
        assert!(messages[0].text_body.contains("is 2 days overdue"));
    }

    #[tokio::test]
    async fn test_immediate_manual_reminder_with_custom_message() {
        let (mailer, sent) = recording_mailer();
        let dispatcher = EmailDispatcher::new(mailer, "http://localhost");
        let event = event(0, ThresholdLabel::ManualFollowUp);
        assert!(event.is_immediate());

        let recipient = sample_user("dana", "dana@example.com");
        let assigner = sample_user("lee", "lee@example.com");

        dispatcher
            .send_reminder(&event, &recipient, Some(&assigner), Some("Please review before standup"))
            .await
            .unwrap();

        let messages = sent.lock().unwrap();
        assert!(messages[0].text_body.contains("needs your attention now"));
        assert!(messages[0].text_body.contains("Please review before standup"));
        assert!(messages[0].html_body.contains("Please review before standup"));
        assert!(messages[0].text_body.contains("Assigned by: lee"));
    }

    #[test]
    fn test_scheduled_today_is_not_immediate() {
        let event = event(0, ThresholdLabel::Today);
        assert!(!event.is_immediate());
    }
}
