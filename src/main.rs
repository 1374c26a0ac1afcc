use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use link_manager::config::Config;
use link_manager::db::LinkStore;
use link_manager::extractor::MetadataExtractor;
use link_manager::state::AppState;

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // Initialize tracing — JSON in production, human-readable in dev.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("link_manager=info,tower_http=info,sqlx=warn"));

    if config.is_production {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("🚀 Link Manager starting...");
    info!(
        database = %config.database_url,
        fetch_timeout_secs = config.fetch_timeout.as_secs(),
        max_description_len = config.max_description_len,
        "📝 Configuration loaded"
    );

    let store = LinkStore::open(&config.database_url)
        .await
        .expect("Failed to open link database");

    store
        .health_check()
        .await
        .expect("Database health check failed");
    info!("✅ Database health check passed");

    let extractor = MetadataExtractor::new(config.extractor_settings())
        .expect("Failed to build HTTP client");

    let cors = if config.is_production {
        CorsLayer::new()
    } else {
        info!("🔓 CORS: permissive (dev mode)");
        CorsLayer::permissive()
    };

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let state = AppState::new(store.clone(), extractor);
    let app = link_manager::app(state)
        .route(
            "/metrics",
            get(move || async move { metric_handle.render() }),
        )
        .layer(prometheus_layer)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr = config.server_addr();
    info!("🎧 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed to start");

    store.close().await;
    info!("👋 Link Manager stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("🛑 Shutdown signal received");
}
