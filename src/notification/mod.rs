pub mod notification_dto;
pub mod notification_handlers;
pub mod notification_models;
pub mod notification_repository;
pub mod notification_service;
pub mod notification_store;

pub use notification_dto::{
    ListNotificationsQuery, MarkAllReadResponse, NotificationListResponse, NotificationStats,
};
pub use notification_handlers::{
    get_notifications, mark_all_notifications_read, mark_notification_read, notification_stats,
};
pub use notification_models::{NewNotification, Notification, NotificationType};
pub use notification_repository::NotificationRepository;
pub use notification_service::NotificationService;
pub use notification_store::NotificationStore;
