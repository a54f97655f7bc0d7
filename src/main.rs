//! Valve Timer - remote control client for a network-attached irrigation valve
//!
//! Polls the backend for the valve's timer, keeps the presentation state
//! ticking every second and serves a small local control API.

use std::sync::Arc;
use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use valve_timer::{
    api::create_router,
    clock::SystemClock,
    config::Config,
    services::{FileSettingsStore, RestDbClient},
    state::{AppState, SessionDefaults},
    tasks::{status_log_task, SessionController},
    utils::watch_shutdown_signals,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("valve_timer={},tower_http=info", config.log_level()))
        .init();

    info!("Starting valve-timer v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration: backend={}, poll={}s, last_seen_threshold={}s, settings={}",
        config.restdb_url,
        config.poll_interval,
        config.last_seen_threshold,
        config.settings.display()
    );

    let settings = FileSettingsStore::open(&config.settings)
        .with_context(|| format!("failed to open settings at {}", config.settings.display()))?;
    let remote = RestDbClient::new(&config.restdb_url, &config.restdb_key, config.request_timeout())
        .context("failed to build backend client")?;

    let state = Arc::new(AppState::new(
        Arc::new(remote),
        Arc::new(settings),
        Arc::new(SystemClock),
        config.polling(),
        SessionDefaults {
            valve_name: config.default_valve_name.clone(),
            length_minutes: config.default_length,
        },
    ));
    info!("Valve name: {}", state.valve_name()?);

    tokio::spawn(status_log_task(state.subscribe()));

    let session = Arc::new(SessionController::new(Arc::clone(&state)));
    session.resume()?;

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if let Err(e) = watch_shutdown_signals(signal_token.clone()).await {
            tracing::error!("Failed to install signal handler: {}", e);
            signal_token.cancel();
        }
    });

    let app = create_router(Arc::clone(&session));
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Control API running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /status                   - Session and valve state");
    info!("  POST /timer                    - Run the valve {{\"minutes\": n}}");
    info!("  POST /timer/stop               - Turn the valve off");
    info!("  PUT  /settings/name            - Rename the valve");
    info!("  PUT  /settings/default-length  - Set the default run length");
    info!("  POST /session/pause            - Pause polling");
    info!("  POST /session/resume           - Resume polling");
    info!("  GET  /health                   - Health check");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .await?;

    session.shutdown();
    info!("Shutdown complete");
    Ok(())
}
