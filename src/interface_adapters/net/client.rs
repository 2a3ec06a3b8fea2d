use crate::domain::RenderEvent;
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage, SnapshotDto};
use crate::interface_adapters::state::AppState;
use crate::use_cases::Game;

use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::{
    sync::{Arc, atomic::Ordering},
    time::{Duration, Instant},
};
use tokio::sync::broadcast;
use tracing::{Instrument, debug, error, info, info_span, warn};

#[derive(Debug)]
enum NetError {
    // Categorizes connection lifecycle failures so callers can decide policy.
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    RenderClosed,
}

impl From<axum::Error> for NetError {
    fn from(e: axum::Error) -> Self {
        NetError::Ws(e)
    }
}

const LOG_THROTTLE: Duration = Duration::from_secs(2);
const MAX_INVALID_JSON: u32 = 10;

/// Serializes each render event once and rebroadcasts the shared bytes to viewers.
pub async fn render_event_serializer(
    mut render_rx: broadcast::Receiver<RenderEvent>,
    render_bytes_tx: broadcast::Sender<Utf8Bytes>,
) {
    loop {
        match render_rx.recv().await {
            Ok(event) => {
                let msg = ServerMessage::from(event);
                let txt = match serde_json::to_string(&msg) {
                    Ok(txt) => txt,
                    Err(e) => {
                        error!(error = ?e, "failed to serialize render event");
                        continue;
                    }
                };
                let _ = render_bytes_tx.send(Utf8Bytes::from(txt));
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                // Viewers notice the gap through their own lag and resync from a snapshot.
                warn!(missed = n, "render serializer lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                warn!("render channel closed; serializer exiting");
                break;
            }
        }
    }
}

pub fn spawn_render_serializer(state: &AppState) {
    tokio::spawn(render_event_serializer(
        state.game.subscribe(),
        state.render_bytes_tx.clone(),
    ));
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let conn_id = state.next_conn_id.fetch_add(1, Ordering::Relaxed);
    serve_viewer(socket, state)
        .instrument(info_span!("conn", conn_id))
        .await;
}

async fn serve_viewer(mut socket: WebSocket, state: Arc<AppState>) {
    // Subscribe before the snapshot so nothing between the two is missed.
    let render_bytes_rx = state.render_bytes_tx.subscribe();
    let viewers = state.viewers.fetch_add(1, Ordering::SeqCst) + 1;
    info!(viewers, "viewer connected");

    let mut ctx = ConnCtx {
        game: state.game.clone(),
        render_bytes_rx,
        msgs_in: 0,
        msgs_out: 0,
        invalid_json: 0,
        lag_recovery_count: 0,
        last_lag_log: Instant::now() - LOG_THROTTLE,
        last_invalid_log: Instant::now() - LOG_THROTTLE,
        close_frame: None,
    };

    let result = match send_snapshot(&mut socket, &ctx.game).await {
        Ok(()) => run_client_loop(&mut socket, &mut ctx).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        warn!(error = ?e, "viewer loop exited with error");
    }

    debug!(
        msgs_in = ctx.msgs_in,
        msgs_out = ctx.msgs_out,
        invalid_json = ctx.invalid_json,
        lag_recovery_count = ctx.lag_recovery_count,
        "connection stats"
    );

    let remaining = state.viewers.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
    info!(viewers = remaining, "viewer disconnected");
    if remaining == 0 && state.game.force_pause() {
        info!("last viewer left; session paused");
    }
}

struct ConnCtx {
    game: Game,
    render_bytes_rx: broadcast::Receiver<Utf8Bytes>,
    msgs_in: u64,
    msgs_out: u64,
    invalid_json: u32,
    lag_recovery_count: u64,
    last_lag_log: Instant,
    last_invalid_log: Instant,
    close_frame: Option<CloseFrame>,
}

enum LoopControl {
    Continue,
    Disconnect,
}

fn should_log(last: &mut Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = Instant::now();
        true
    } else {
        false
    }
}

async fn send_message(socket: &mut WebSocket, msg: &ServerMessage) -> Result<(), NetError> {
    let txt = serde_json::to_string(msg).map_err(NetError::Serialization)?;
    socket.send(Message::Text(txt.into())).await?;
    Ok(())
}

async fn send_snapshot(socket: &mut WebSocket, game: &Game) -> Result<(), NetError> {
    let snapshot = game.snapshot().await;
    send_message(socket, &ServerMessage::Snapshot(SnapshotDto::from(snapshot))).await
}

async fn run_client_loop(socket: &mut WebSocket, ctx: &mut ConnCtx) -> Result<(), NetError> {
    let mut fatal: Option<NetError> = None;

    loop {
        let control = tokio::select! {
            incoming = socket.recv() => handle_incoming(incoming, ctx).await,

            render = ctx.render_bytes_rx.recv() => match render {
                Ok(bytes) => match socket.send(Message::Text(bytes)).await {
                    Ok(()) => {
                        ctx.msgs_out += 1;
                        LoopControl::Continue
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to send render event");
                        LoopControl::Disconnect
                    }
                },
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    if should_log(&mut ctx.last_lag_log) {
                        warn!(missed = n, "render events lagged; sending snapshot");
                    }
                    // Resync strategy: replace the viewer's picture wholesale.
                    ctx.lag_recovery_count += 1;
                    match send_snapshot(socket, &ctx.game).await {
                        Ok(()) => LoopControl::Continue,
                        Err(e) => {
                            fatal = Some(e);
                            LoopControl::Disconnect
                        }
                    }
                }
                Err(broadcast::error::RecvError::Closed) => {
                    fatal = Some(NetError::RenderClosed);
                    LoopControl::Disconnect
                }
            },
        };

        if let LoopControl::Disconnect = control {
            if let Some(frame) = ctx.close_frame.take() {
                let _ = socket.send(Message::Close(Some(frame))).await;
            }
            if let Err(err) = socket.close().await {
                debug!(error = ?err, "socket close error");
            }
            break;
        }
    }

    match fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

async fn handle_incoming(
    incoming: Option<Result<Message, axum::Error>>,
    ctx: &mut ConnCtx,
) -> LoopControl {
    match incoming {
        Some(Ok(Message::Text(text))) => {
            ctx.msgs_in += 1;
            match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => {
                    ctx.game.handle_input(message.into()).await;
                    LoopControl::Continue
                }
                Err(parse_err) => {
                    ctx.invalid_json += 1;
                    if should_log(&mut ctx.last_invalid_log) {
                        warn!(
                            bytes = text.len(),
                            error = %parse_err,
                            "failed to parse client message"
                        );
                    }
                    if ctx.invalid_json > MAX_INVALID_JSON {
                        ctx.close_frame = Some(CloseFrame {
                            code: close_code::POLICY,
                            reason: "too many invalid messages".into(),
                        });
                        return LoopControl::Disconnect;
                    }
                    LoopControl::Continue
                }
            }
        }
        Some(Ok(Message::Binary(_))) => {
            ctx.close_frame = Some(CloseFrame {
                code: close_code::UNSUPPORTED,
                reason: "binary messages not supported".into(),
            });
            LoopControl::Disconnect
        }
        Some(Ok(Message::Ping(_) | Message::Pong(_))) => LoopControl::Continue,
        Some(Ok(Message::Close(_))) => LoopControl::Disconnect,
        Some(Err(e)) => {
            warn!(error = %e, "websocket recv error");
            LoopControl::Disconnect
        }
        None => {
            info!("websocket closed");
            LoopControl::Disconnect
        }
    }
}
