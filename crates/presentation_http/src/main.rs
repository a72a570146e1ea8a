//! Taskboard HTTP server
//!
//! Main entry point for the REST API process.

use std::sync::Arc;

use application::{TaskService, UserService};
use infrastructure::{AppConfig, SqliteTaskStore, SqliteUserStore, create_pool};
use presentation_http::{routes, state::AppState};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Taskboard API v{} starting", env!("CARGO_PKG_VERSION"));

    // Load configuration; the store path is mandatory
    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });

    info!(
        host = %config.server.host,
        port = %config.server.port,
        "Configuration loaded"
    );

    // Bring up the store
    let pool = Arc::new(
        create_pool(&config.database)
            .map_err(|e| anyhow::anyhow!("Failed to open task store: {e}"))?,
    );
    let task_store = Arc::new(SqliteTaskStore::new(Arc::clone(&pool)));
    let user_store: Arc<dyn application::UserStorePort> =
        Arc::new(SqliteUserStore::new(Arc::clone(&pool)));

    // Initialize services
    let task_service = TaskService::new(task_store, Arc::clone(&user_store));
    let user_service = UserService::new(user_store);

    let state = AppState {
        task_service: Arc::new(task_service),
        user_service: Arc::new(user_service),
    };

    // Build router
    let app = routes::create_router(state);

    // Configure CORS layer
    let cors_layer = if config.cors.allowed_origins.is_empty() {
        // Development mode: allow all origins
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        // Production mode: restrict to configured origins
        use axum::http::{HeaderValue, Method};
        let origins: Vec<HeaderValue> = config
            .cors
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers(Any)
    };

    // Add middleware (order matters: first added = outermost)
    let app = app.layer(TraceLayer::new_for_http()).layer(cors_layer);

    // Start server
    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
