// Framework bootstrap for the tank game server runtime.

use crate::domain::tuning::{BulletTuning, EnemyTuning};
use crate::domain::{Bounds, LevelStorage};
use crate::frameworks::config;
use crate::interface_adapters::audio::TracingAudio;
use crate::interface_adapters::net::{
    get_level_handler, place_element_handler, save_level_handler, spawn_render_serializer,
    ws_handler,
};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::storage::{JsonFileStorage, MemoryStorage};
use crate::use_cases::{Game, GameSettings};

use axum::{
    Router,
    routing::{get, post},
};
use std::net::SocketAddr;
use std::{io::Result, sync::Arc};

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Serves the game on `listener` with settings from the environment.
pub async fn run(listener: tokio::net::TcpListener) -> Result<()> {
    let storage: Arc<dyn LevelStorage> = match config::level_path() {
        Some(path) => Arc::new(JsonFileStorage::new(path)),
        None => Arc::new(MemoryStorage::default()),
    };
    run_with_storage(listener, config::grid_bounds(), storage).await
}

/// Serves the game with explicit bounds and level storage.
pub async fn run_with_storage(
    listener: tokio::net::TcpListener,
    bounds: Bounds,
    storage: Arc<dyn LevelStorage>,
) -> Result<()> {
    let address = listener.local_addr()?;
    let state = build_state(bounds, storage).await?;
    let game = state.game.clone();

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .route("/level", get(get_level_handler).put(save_level_handler))
        .route("/elements", post(place_element_handler))
        .with_state(state);

    tracing::info!(%address, "listening");

    // Serve app and report errors rather than panicking
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "server error");
        });
    game.shutdown();
    served
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let address = SocketAddr::from(([127, 0, 0, 1], config::http_port()));

    // Bind TCP listener with error handling
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .inspect_err(|e| {
            tracing::error!(%address, error = %e, "failed to bind");
        })?;

    run(listener).await
}

async fn build_state(bounds: Bounds, storage: Arc<dyn LevelStorage>) -> Result<Arc<AppState>> {
    let game = Game::new(
        GameSettings {
            bounds,
            bullet: BulletTuning::default(),
            enemy: EnemyTuning::default(),
            render_capacity: config::RENDER_BROADCAST_CAPACITY,
            rng_seed: None,
        },
        Arc::new(TracingAudio),
        storage,
    );
    tracing::debug!(
        columns = bounds.columns(),
        rows = bounds.rows(),
        cell_size = bounds.cell_size,
        "grid configured"
    );

    let report = game
        .load_level()
        .await
        .map_err(|e| std::io::Error::other(format!("failed to load level: {e}")))?;
    tracing::info!(
        placed = report.placed,
        skipped = report.skipped,
        "session ready; paused"
    );

    let state = Arc::new(AppState::new(game, config::RENDER_BYTES_CAPACITY));
    spawn_render_serializer(&state);
    Ok(state)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        // Without a signal handler, keep serving until the process is killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
