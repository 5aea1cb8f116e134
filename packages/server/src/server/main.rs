// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walks_core::domains::auth::JwtService;
use walks_core::domains::walks::PostgresWalkStore;
use walks_core::kernel::{
    spawn_notification_dispatcher, BaseNotifier, DirectoryClient, EventHub, LogNotifier,
    ServerDeps, SystemClock, WebhookNotifier,
};
use walks_core::{server::build_app, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,walks_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting walk marketplace API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(platform_fee_rate = %config.platform_fee_rate, "Configuration loaded");

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    // External collaborators
    let directory = Arc::new(
        DirectoryClient::new(config.directory_service_url.clone())
            .context("Failed to create directory client")?,
    );
    let notifier: Arc<dyn BaseNotifier> = match &config.notification_webhook_url {
        Some(url) => Arc::new(
            WebhookNotifier::new(url.clone()).context("Failed to create notification client")?,
        ),
        None => {
            tracing::warn!("NOTIFICATION_WEBHOOK_URL not set, notifications will only be logged");
            Arc::new(LogNotifier)
        }
    };

    let events = EventHub::new();
    let deps = ServerDeps::new(
        Arc::new(PostgresWalkStore::new(pool)),
        directory.clone(),
        directory,
        notifier.clone(),
        Arc::new(SystemClock),
        events.clone(),
        config.platform_fee_rate,
        Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone())),
    );

    // Post-commit events -> notifications
    spawn_notification_dispatcher(&events, notifier);

    // Build application
    let app = build_app(deps, &config.allowed_origins);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
