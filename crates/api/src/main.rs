use std::net::SocketAddr;
use std::sync::Arc;

use facelens_device::scheduler::AutoCaptureConfig;
use facelens_device::{CapturePipeline, SessionSupervisor};
use facelens_events::EventBus;
use facelens_inference::{FaceDetector, HostedDetector};
use facelens_store::SessionStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use facelens_api::config::ServerConfig;
use facelens_api::router::build_app_router;
use facelens_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "facelens_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Session store (all state is in-memory; lost on restart) ---
    let store = Arc::new(SessionStore::new());

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());
    tracing::info!("Event bus created");

    // --- Inference client ---
    let detector: Arc<dyn FaceDetector> = Arc::new(HostedDetector::new(
        config.inference.api_url.clone(),
        config.inference.model_id.clone(),
        config.inference.api_key.clone(),
    ));
    tracing::info!(api_url = %config.inference.api_url, model_id = %config.inference.model_id, "Inference client ready");

    // --- Capture pipeline & session supervisor ---
    // The wearable SDK transport hands sessions and button events to the
    // supervisor; its webhook/handshake plumbing lives outside this crate.
    let pipeline = Arc::new(CapturePipeline::new(
        Arc::clone(&store),
        detector,
        Arc::clone(&event_bus),
    ));
    let supervisor = Arc::new(SessionSupervisor::new(
        Arc::clone(&store),
        pipeline,
        Arc::clone(&event_bus),
        AutoCaptureConfig::from_secs(
            config.auto_capture_tick_secs,
            config.auto_capture_fallback_secs,
        ),
    ));
    tracing::info!("Session supervisor ready");

    // --- App state ---
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        event_bus,
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

    supervisor.shutdown().await;
    tracing::info!("Session loops stopped");

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
