pub mod dispatcher;
pub mod mailer;
pub mod reminder_dto;
pub mod reminder_handlers;
pub mod scheduler;
pub mod threshold;

pub use dispatcher::{EmailDispatcher, ReminderEvent};
pub use mailer::{EmailMessage, LogMailer, Mailer};
pub use reminder_dto::{ManualReminderResponse, SendReminderRequest};
pub use reminder_handlers::send_task_reminder;
pub use scheduler::{ManualReminderOutcome, ReminderScheduler, RunSummary};
pub use threshold::ThresholdLabel;
