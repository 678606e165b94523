use crate::{
    middleware::auth_middleware,
    notification::{
        notification_dto::{
            MarkAllReadResponse, NotificationListResponse, NotificationStats,
        },
        notification_handlers,
        notification_models::{Notification, NotificationType},
    },
    reminder::{
        reminder_dto::{ManualReminderResponse, SendReminderRequest},
        reminder_handlers,
    },
    sse::{frames::StreamFrame, sse_handlers},
    state::AppState,
    task::{Task, TaskPriority, TaskStatus},
    user::User,
};
use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        notification_handlers::get_notifications,
        notification_handlers::mark_notification_read,
        notification_handlers::mark_all_notifications_read,
        notification_handlers::notification_stats,
        sse_handlers::notification_stream,
        reminder_handlers::send_task_reminder,
    ),
    components(
        schemas(
            Notification,
            NotificationType,
            NotificationListResponse,
            NotificationStats,
            MarkAllReadResponse,
            SendReminderRequest,
            ManualReminderResponse,
            StreamFrame,
            Task,
            TaskStatus,
            TaskPriority,
            User,
        )
    ),
    tags(
        (name = "notifications", description = "Notification list and real-time stream"),
        (name = "reminders", description = "Manual reminder dispatch")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            )
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Bearer-protected REST surface; the stream route is added after the
    // auth layer because it authenticates via its token query parameter.
    let notification_routes = Router::new()
        .route("/", get(notification_handlers::get_notifications))
        .route("/:id/read", patch(notification_handlers::mark_notification_read))
        .route("/read-all", post(notification_handlers::mark_all_notifications_read))
        .route("/stats", get(notification_handlers::notification_stats))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .route("/stream", get(sse_handlers::notification_stream));

    let task_routes = Router::new()
        .route("/:id/remind", post(reminder_handlers::send_task_reminder))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .nest("/notifications", notification_routes)
        .nest("/tasks", task_routes);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state)
}
