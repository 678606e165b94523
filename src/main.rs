use std::sync::Arc;

use task_notifier::db::{create_pool, run_migrations};
use task_notifier::notification::{NotificationRepository, NotificationService};
use task_notifier::reminder::{EmailDispatcher, LogMailer, ReminderScheduler};
use task_notifier::routes::create_router;
use task_notifier::sse::ConnectionRegistry;
use task_notifier::state::{AppState, Config};
use task_notifier::task::TaskRepository;
use task_notifier::user::UserRepository;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,task_notifier=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Arc::new(Config::from_env());

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    tracing::info!("Connecting to database...");
    let db = create_pool(&database_url).await?;

    tracing::info!("Running migrations...");
    run_migrations(&db).await?;

    // Create repositories
    let user_repository = UserRepository::new(db.clone());
    let task_repository = TaskRepository::new(db.clone());
    let notification_repository = NotificationRepository::new(db.clone());

    // Connection registry shared by the gateway and the fan-out path
    let registry = ConnectionRegistry::new();

    let notifications = NotificationService::new(
        Arc::new(notification_repository.clone()),
        registry.clone(),
    );

    // Reminder pipeline: log transport in development; the SMTP provider
    // plugs into the same Mailer seam in production.
    let dispatcher = EmailDispatcher::new(
        Arc::new(LogMailer::new(config.mail_from.clone())),
        config.app_base_url.clone(),
    );
    let reminders = ReminderScheduler::new(
        Arc::new(task_repository.clone()),
        Arc::new(user_repository.clone()),
        dispatcher,
        notifications.clone(),
    );
    reminders.clone().start().await?;

    // Create application state
    let state = AppState {
        db,
        config,
        user_repository,
        task_repository,
        notification_repository,
        notifications,
        registry,
        reminders: reminders.clone(),
    };

    // Create router
    let app = create_router(state);

    // Start server
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reminders.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}
