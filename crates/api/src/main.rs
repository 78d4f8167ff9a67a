use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use machmon_core::thresholds::ThresholdSet;
use machmon_events::EventHub;
use machmon_feed::{FeedClient, ReconnectConfig};
use machmon_registry::UnitStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use machmon_api::config::ServerConfig;
use machmon_api::router::build_app_router;
use machmon_api::state::AppState;
use machmon_api::background;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "machmon_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Event hub ---
    let hub = Arc::new(EventHub::new());

    // --- Unit store ---
    let store = Arc::new(UnitStore::new(
        ThresholdSet::standard(chrono::Utc::now()),
        Arc::clone(&hub),
    ));
    tracing::info!("Unit store created with standard thresholds");

    // --- Background tasks ---
    let cancel = tokio_util::sync::CancellationToken::new();

    let sweep_handle = tokio::spawn(background::liveness_sweep::run(
        Arc::clone(&store),
        Duration::from_secs(config.sweep_interval_secs),
        cancel.clone(),
    ));

    let retention_handle = tokio::spawn(background::history_retention::run(
        Arc::clone(&store),
        config.history_retention_days,
        cancel.clone(),
    ));

    // --- Upstream feed (optional) ---
    let feed_handle = config.feed_url.as_ref().map(|url| {
        tracing::info!(url = %url, "Starting upstream feed client");
        let client = FeedClient::new(url.clone(), config.feed_token.clone());
        machmon_feed::spawn_feed(
            client,
            ReconnectConfig::default(),
            Arc::clone(&store),
            cancel.clone(),
        )
    });
    let feed_state = feed_handle.as_ref().map(|h| h.state.clone());

    // --- App state ---
    let state = AppState {
        store: Arc::clone(&store),
        hub: Arc::clone(&hub),
        config: Arc::new(config.clone()),
        feed_state,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();

    let drain = Duration::from_secs(config.shutdown_timeout_secs.min(5));
    if let Some(handle) = feed_handle {
        let _ = tokio::time::timeout(drain, handle.task).await;
        tracing::info!("Feed client stopped");
    }
    let _ = tokio::time::timeout(drain, sweep_handle).await;
    let _ = tokio::time::timeout(drain, retention_handle).await;
    tracing::info!("Background tasks stopped");

    hub.shutdown().await;
    tracing::info!("Event hub shut down");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
