use async_trait::async_trait;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// Hand-off point to the mail provider. The SMTP integration lives outside
/// this service and plugs in here.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<()>;
}

/// Development transport: logs the message instead of delivering it.
pub struct LogMailer {
    from: String,
}

impl LogMailer {
    pub fn new(from: impl Into<String>) -> Self {
        Self { from: from.into() }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        tracing::info!(
            from = %self.from,
            to = %message.to,
            subject = %message.subject,
            "email dispatched (log transport)"
        );
        tracing::debug!("email text body:\n{}", message.text_body);
        Ok(())
    }
}
