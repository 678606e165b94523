use std::sync::Arc;

use crate::error::Result;
use crate::sse::{ConnectionRegistry, StreamFrame};

use super::notification_models::{NewNotification, Notification};
use super::notification_store::NotificationStore;

/// Single choke point between the notification store and the SSE gateway:
/// every server-side action that wants to inform a user goes through
/// `publish`, which persists the record and fans it out to the target
/// user's open streams.
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    registry: ConnectionRegistry,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>, registry: ConnectionRegistry) -> Self {
        Self { store, registry }
    }

    pub async fn publish(&self, new: NewNotification) -> Result<Notification> {
        let notification = self.store.create(new).await?;

        let delivered = self.registry.push_to_user(
            notification.user_id,
            StreamFrame::NewNotification {
                data: notification.clone(),
            },
        );

        tracing::debug!(
            user_id = %notification.user_id,
            notification_id = %notification.id,
            delivered,
            "notification published"
        );

        Ok(notification)
    }
}
