use review_lookup_api::api::AppState;
use review_lookup_api::build_app;
use review_lookup_api::config::{AppConfig, Backend};
use review_lookup_api::storage::connect::Bootstrap;
use review_lookup_api::storage::{InMemoryStore, MongoStore, ReviewStore, demo_reviews};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    info!("🚀 Starting Review Lookup API Server");

    // Load configuration
    let config = AppConfig::load()?;
    info!("📋 Configuration loaded");
    info!("   - Backend: {}", config.storage.backend);
    info!("   - Server: {}", config.bind_addr());

    let store: Arc<dyn ReviewStore> = match config.storage.backend {
        Backend::Memory => {
            let store = if config.storage.seed_demo_data {
                InMemoryStore::with_reviews(demo_reviews())
            } else {
                InMemoryStore::new()
            };
            Arc::new(store)
        }
        Backend::Mongo => {
            info!("💾 Connecting to MongoDB...");
            let mut bootstrap = Bootstrap::new(config.mongo.retry_policy());
            let store = bootstrap
                .run(|| MongoStore::connect(&config.mongo))
                .await?;
            Arc::new(store)
        }
    };

    let review_count = store.count().await?;
    info!("✅ Review storage ready ({} reviews)", review_count);

    let app = build_app(AppState::new(store));

    // Start server
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 Server listening on http://{}", addr);
    info!("📡 Available endpoints:");
    for (method, path) in ENDPOINTS {
        info!("   {:<6} {}", method, path);
    }
    info!("✨ Server is ready to accept requests!");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutting down gracefully");

    Ok(())
}

const ENDPOINTS: &[(&str, &str)] = &[
    ("GET", "/reviews"),
    ("GET", "/reviews/{id}"),
    ("GET", "/reviews/product/{pid}"),
    ("GET", "/reviews/product/{pid}/average"),
    ("GET", "/reviews/search?q="),
    ("GET", "/reviews/filter?rating="),
    ("GET", "/reviews/sort?order=asc|desc"),
    ("GET", "/reviews/recent?limit="),
    ("POST", "/reviews"),
    ("PUT", "/reviews/{id}"),
    ("DELETE", "/reviews/{id}"),
];

/// Resolves on Ctrl+C or SIGTERM. A handler that cannot be installed is
/// logged and never fires, leaving the other one in charge.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => "Ctrl+C",
            Err(e) => {
                warn!("Ctrl+C handler unavailable: {}", e);
                std::future::pending().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                "SIGTERM"
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable: {}", e);
                std::future::pending().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&str>();

    let received = tokio::select! {
        name = ctrl_c => name,
        name = terminate => name,
    };

    info!("🛑 {} received", received);
}
