use content_index_manager::{
    api::{build_router, AppState},
    config::Config,
    indexing::{IndexRebuilder, IndexRegistry},
    scheduler::{RebuildScheduler, RebuildTarget},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "content_index_manager={},tower_http=info",
            config.observability.log_level
        )
        .into()
    });
    let json_layer = config
        .observability
        .json_logs
        .then(|| tracing_subscriber::fmt::layer().json());
    let text_layer = (!config.observability.json_logs).then(|| tracing_subscriber::fmt::layer());
    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    tracing::info!("Starting content index manager v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Prometheus metrics
    if config.observability.prometheus_enabled {
        if let Err(e) = content_index_manager::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
            tracing::warn!("Continuing without metrics");
        }
    } else {
        tracing::info!("Prometheus metrics disabled in configuration");
    }

    // Register indexes and populators
    let registry = Arc::new(IndexRegistry::from_definitions(&config.indexing.indexes));
    tracing::info!(indexes = registry.len(), "Index registry initialized");

    let rebuilder = Arc::new(IndexRebuilder::new(registry.clone(), &config.indexing));

    // Startup rebuild runs after a delay so the server can come up first
    if config.indexing.rebuild_on_startup {
        tracing::info!(
            only_empty = config.indexing.only_empty_on_startup,
            delay_ms = config.indexing.startup_delay_ms,
            "Startup rebuild queued"
        );
        rebuilder.rebuild_all_after(
            config.indexing.only_empty_on_startup,
            config.indexing.startup_delay(),
        );
    }

    // Periodic rebuilds
    let mut scheduler = match &config.indexing.rebuild_schedule {
        Some(schedule) => {
            let mut scheduler = RebuildScheduler::new(rebuilder.clone()).await?;
            scheduler
                .schedule(schedule, RebuildTarget::All { only_empty: false })
                .await?;
            scheduler.start().await?;
            Some(scheduler)
        }
        None => None,
    };

    let app_state = AppState::new(rebuilder.clone()).with_search_config(config.search.clone());
    let app = build_router(app_state);

    // Start HTTP server
    let http_addr = format!("{}:{}", config.server.host, config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_addr).await?;

    tracing::info!("HTTP API server listening on http://{}", http_addr);
    tracing::info!("   Health check: http://{}/health", http_addr);
    tracing::info!("   Indexes: http://{}/v1/indexes", http_addr);

    let http_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(http_listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = http_handle => {
            tracing::warn!("HTTP server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Shutting down gracefully...");
    if let Some(scheduler) = scheduler.as_mut() {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!("Failed to stop rebuild scheduler: {}", e);
        }
    }

    Ok(())
}
