use crate::use_cases::Game;
use axum::extract::ws::Utf8Bytes;
use std::sync::atomic::{AtomicU64, AtomicUsize};
use tokio::sync::broadcast;

pub struct AppState {
    // The single game session this server hosts.
    pub game: Game,
    // Serialized render events, shared across all viewer connections.
    pub render_bytes_tx: broadcast::Sender<Utf8Bytes>,
    // Live /ws viewers; reaching zero pauses the session.
    pub viewers: AtomicUsize,
    // Connection ids for log correlation.
    pub next_conn_id: AtomicU64,
}

impl AppState {
    pub fn new(game: Game, render_bytes_capacity: usize) -> Self {
        let (render_bytes_tx, _render_bytes_rx) = broadcast::channel(render_bytes_capacity.max(1));
        Self {
            game,
            render_bytes_tx,
            viewers: AtomicUsize::new(0),
            next_conn_id: AtomicU64::new(1),
        }
    }
}
