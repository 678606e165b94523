use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::notification::Notification;

/// One frame on the notification stream. Decoded exhaustively on the client
/// side; an unknown `type` is a protocol error, not a silently dropped frame.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamFrame {
    /// Emitted once, immediately after the stream is accepted.
    Connected,
    /// Carries the unread count fetched once at connection time.
    Initial { unread_count: i64 },
    /// Fan-out of a freshly created notification.
    NewNotification { data: Notification },
    /// Periodic no-op so idle proxies keep the connection open.
    Heartbeat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationType;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_frame_tags() {
        let connected = serde_json::to_value(&StreamFrame::Connected).unwrap();
        assert_eq!(connected["type"], "connected");

        let initial = serde_json::to_value(&StreamFrame::Initial { unread_count: 4 }).unwrap();
        assert_eq!(initial["type"], "initial");
        assert_eq!(initial["unread_count"], 4);

        let heartbeat = serde_json::to_value(&StreamFrame::Heartbeat).unwrap();
        assert_eq!(heartbeat["type"], "heartbeat");
    }

    #[test]
    fn test_new_notification_round_trip() {
        let frame = StreamFrame::NewNotification {
            data: Notification {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                task_id: None,
                title: "Task Reminder".to_string(),
                description: "\"Quarterly report\" is due tomorrow".to_string(),
                notification_type: NotificationType::Alert.to_string(),
                is_seen: false,
                created_at: Utc::now(),
            },
        };

        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"type\":\"new-notification\""));

        match serde_json::from_str::<StreamFrame>(&json).unwrap() {
            StreamFrame::NewNotification { data } => {
                assert_eq!(data.title, "Task Reminder");
                assert!(!data.is_seen);
            }
            other => panic!("decoded wrong frame: {other:?}"),
        }
    }
}
