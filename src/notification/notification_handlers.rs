use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    error::{AppError, Result},
    state::AppState,
};

use super::{
    notification_dto::{
        ListNotificationsQuery, MarkAllReadResponse, NotificationListResponse, NotificationStats,
    },
    notification_models::Notification,
    notification_store::NotificationStore,
};

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;

/// Get a page of notifications plus the authoritative unread count
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(
        ("page" = Option<u32>, Query, description = "Page number"),
        ("limit" = Option<u32>, Query, description = "Items per page"),
        ("unseen_only" = Option<bool>, Query, description = "Only unseen notifications")
    ),
    responses(
        (status = 200, description = "Page of notifications", body = NotificationListResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn get_notifications(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Query(query): Query<ListNotificationsQuery>,
) -> Result<Json<NotificationListResponse>> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let unseen_only = query.unseen_only.unwrap_or(false);

    let (notifications, total) = state
        .notification_repository
        .find_page(user_id, page, limit, unseen_only)
        .await?;
    let unread_count = state.notification_repository.unread_count(user_id).await?;

    let total_pages = (total as f64 / limit as f64).ceil() as u32;

    Ok(Json(NotificationListResponse {
        data: notifications,
        total,
        unread_count,
        page,
        limit,
        total_pages,
    }))
}

/// Mark one notification as seen
#[utoipa::path(
    patch,
    path = "/api/notifications/{id}/read",
    params(
        ("id" = Uuid, Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Notification marked as read", body = Notification),
        (status = 404, description = "Notification not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Path(notification_id): Path<Uuid>,
) -> Result<Json<Notification>> {
    let notification = state
        .notification_repository
        .mark_as_seen(notification_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

    Ok(Json(notification))
}

/// Mark every unseen notification as seen
#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    responses(
        (status = 200, description = "Notifications marked as read", body = MarkAllReadResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn mark_all_notifications_read(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<MarkAllReadResponse>> {
    let updated = state.notification_repository.mark_all_seen(user_id).await?;

    Ok(Json(MarkAllReadResponse { updated }))
}

/// Notification statistics for the authenticated user
#[utoipa::path(
    get,
    path = "/api/notifications/stats",
    responses(
        (status = 200, description = "Notification statistics", body = NotificationStats),
        (status = 401, description = "Unauthorized")
    ),
    tag = "notifications",
    security(("bearer_auth" = []))
)]
pub async fn notification_stats(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
) -> Result<Json<NotificationStats>> {
    let stats = state.notification_repository.stats(user_id).await?;

    Ok(Json(stats))
}
