use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use super::frames::StreamFrame;

pub type ConnectionId = Uuid;

type FrameSender = UnboundedSender<StreamFrame>;

/// Registry of open notification streams, keyed by user. A user may hold
/// several connections at once (one per tab). All mutation goes through
/// `register`/`deregister`/`push_to_user`; the map is never touched ad hoc,
/// so a handle can't be fanned out to while it is mid-teardown.
#[derive(Clone)]
pub struct ConnectionRegistry {
    connections: Arc<DashMap<Uuid, HashMap<ConnectionId, FrameSender>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(DashMap::new()),
        }
    }

    /// Register a new stream for `user_id`. Frames pushed to the user are
    /// delivered on the returned receiver.
    pub fn register(&self, user_id: Uuid) -> (ConnectionId, UnboundedReceiver<StreamFrame>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = Uuid::new_v4();

        self.connections
            .entry(user_id)
            .or_default()
            .insert(connection_id, tx);

        tracing::info!(%user_id, %connection_id, "notification stream registered");
        (connection_id, rx)
    }

    /// Remove one connection; dropping the last one removes the user key.
    pub fn deregister(&self, user_id: Uuid, connection_id: ConnectionId) {
        if let Some(mut handles) = self.connections.get_mut(&user_id) {
            handles.remove(&connection_id);
        }
        self.connections.remove_if(&user_id, |_, handles| handles.is_empty());

        tracing::info!(%user_id, %connection_id, "notification stream deregistered");
    }

    /// Fan a frame out to every open connection of `user_id`, pruning
    /// handles whose receiving stream has already shut down. Returns the
    /// number of connections the frame was delivered to.
    pub fn push_to_user(&self, user_id: Uuid, frame: StreamFrame) -> usize {
        let delivered = match self.connections.get_mut(&user_id) {
            Some(mut handles) => {
                handles.retain(|_, tx| tx.send(frame.clone()).is_ok());
                handles.len()
            }
            None => 0,
        };
        self.connections.remove_if(&user_id, |_, handles| handles.is_empty());

        delivered
    }

    pub fn is_user_connected(&self, user_id: Uuid) -> bool {
        self.connections.contains_key(&user_id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.iter().map(|entry| entry.value().len()).sum()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::{Notification, NotificationType};
    use chrono::Utc;

    fn notification(user_id: Uuid) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id,
            task_id: None,
            title: "Task Reminder".to_string(),
            description: "\"Write minutes\" is due today".to_string(),
            notification_type: NotificationType::Info.to_string(),
            is_seen: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_fan_out_reaches_all_user_connections() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::new_v4();
        let other = Uuid::new_v4();

        let (_id_a, mut rx_a) = registry.register(user);
        let (_id_b, mut rx_b) = registry.register(user);
        let (_id_c, mut rx_c) = registry.register(other);

        let delivered = registry.push_to_user(user, StreamFrame::NewNotification {
            data: notification(user),
        });

        assert_eq!(delivered, 2);
        assert!(matches!(rx_a.try_recv(), Ok(StreamFrame::NewNotification { .. })));
        assert!(matches!(rx_b.try_recv(), Ok(StreamFrame::NewNotification { .. })));
        assert!(rx_c.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_deregister_drops_user_key_with_last_handle() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::new_v4();

        let (id_a, _rx_a) = registry.register(user);
        let (id_b, _rx_b) = registry.register(user);
        assert_eq!(registry.connection_count(), 2);

        registry.deregister(user, id_a);
        assert!(registry.is_user_connected(user));

        registry.deregister(user, id_b);
        assert!(!registry.is_user_connected(user));
        assert_eq!(registry.connection_count(), 0);
    }

    #[tokio::test]
    async fn test_push_prunes_closed_handles() {
        let registry = ConnectionRegistry::new();
        let user = Uuid::new_v4();

        let (_id_a, rx_a) = registry.register(user);
        let (_id_b, mut rx_b) = registry.register(user);
        drop(rx_a);

        let delivered = registry.push_to_user(user, StreamFrame::Heartbeat);

        assert_eq!(delivered, 1);
        assert!(matches!(rx_b.try_recv(), Ok(StreamFrame::Heartbeat)));
        assert_eq!(registry.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_push_to_unknown_user_is_a_no_op() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.push_to_user(Uuid::new_v4(), StreamFrame::Heartbeat), 0);
    }
}
