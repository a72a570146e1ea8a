//! Taskboard due-scan worker
//!
//! Main entry point for the background process: claims due tasks on a
//! fixed interval and publishes one reminder per claimed task; a sibling
//! consumer logs each reminder. Exits non-zero when the store path is
//! missing or the broker stays unreachable through the startup backoff.

use std::sync::Arc;

use application::DueScanService;
use infrastructure::{
    AppConfig, BrokerConnection, DueConsumer, DueScanWorker, RabbitMqPublisher, SqliteTaskStore,
    create_pool, declare_topology,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskboard_worker=debug,lapin=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Taskboard worker v{} starting", env!("CARGO_PKG_VERSION"));

    // Load configuration; the store path is mandatory here
    let config = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("Failed to load config, using defaults: {}", e);
        AppConfig::default()
    });
    config
        .database
        .require_path()
        .map_err(|e| anyhow::anyhow!(e))?;

    // Bring up the store
    let pool = Arc::new(
        create_pool(&config.database)
            .map_err(|e| anyhow::anyhow!("Failed to open task store: {e}"))?,
    );
    let task_store = Arc::new(SqliteTaskStore::new(pool));

    // Bring up the broker; exhausting the backoff here is fatal
    let broker = Arc::new(
        BrokerConnection::connect(&config.broker)
            .await
            .map_err(|e| anyhow::anyhow!("Broker unreachable at startup: {e}"))?,
    );
    let channel = broker.channel().await.map_err(|e| anyhow::anyhow!("{e}"))?;
    declare_topology(&channel)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to declare broker topology: {e}"))?;

    let publisher = Arc::new(RabbitMqPublisher::new(Arc::clone(&broker)));
    let scan_service = Arc::new(DueScanService::new(task_store, publisher));
    let scan_worker = DueScanWorker::new(scan_service, config.due_scan);
    let consumer = DueConsumer::new(broker);

    // Cooperative shutdown
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
            signal_cancel.cancel();
        }
    });

    let consumer_cancel = cancel.clone();
    let consumer_handle = tokio::spawn(async move { consumer.run(consumer_cancel).await });

    scan_worker.run(cancel.clone()).await;

    cancel.cancel();
    match consumer_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(error = %e, "Consumer exited with error"),
        Err(e) => error!(error = %e, "Consumer task panicked"),
    }

    info!("Worker stopped");
    Ok(())
}
