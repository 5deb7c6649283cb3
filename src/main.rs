use anyhow::Context;
use std::sync::Arc;
use tokio::time::{interval_at, Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use resource_catalog::{
    offline::{HttpNetwork, OfflineWorker, FETCH_UPDATES_TAG},
    storage::{FileStore, KeyValueStore},
    web::{self, AppState},
    Catalog, Config,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resource_catalog=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let store: Box<dyn KeyValueStore> = Box::new(FileStore::new(&config.data_dir));
    let catalog = Catalog::load(store).with_context(|| {
        format!("Failed to load catalog from {}", config.data_dir.display())
    })?;
    tracing::info!(
        resources = catalog.list_resources().len(),
        categories = catalog.list_categories().len(),
        "Catalog loaded"
    );

    let network = Arc::new(HttpNetwork::new(config.origin.clone()));
    let worker = Arc::new(OfflineWorker::new(config.worker_config(), network));
    let state = Arc::new(AppState::new(catalog, worker.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr()))?;
    tracing::info!("Resource catalog running on http://{}", config.bind_addr());

    let lifecycle_worker = worker.clone();
    tokio::spawn(async move {
        offline_lifecycle(lifecycle_worker).await;
    });

    let sync_worker = worker.clone();
    let sync_interval = config.sync_interval;
    tokio::spawn(async move {
        periodic_sync_service(sync_worker, sync_interval).await;
    });

    axum::serve(listener, web::router(state))
        .await
        .context("Server error")?;
    Ok(())
}

/// Installs the offline cache against our own origin, then activates it.
async fn offline_lifecycle(worker: Arc<OfflineWorker>) {
    if let Err(e) = worker.install().await {
        tracing::error!(error = %e, "Offline cache unavailable");
        return;
    }
    let deleted = worker.activate().await;
    tracing::info!(deleted = deleted.len(), "Offline cache ready");
}

async fn periodic_sync_service(worker: Arc<OfflineWorker>, period: Duration) {
    let mut interval = interval_at(Instant::now() + period, period);

    loop {
        interval.tick().await;
        worker.periodic_sync(FETCH_UPDATES_TAG).await;
    }
}
