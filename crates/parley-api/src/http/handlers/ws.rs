//! WebSocket bridge between the panel and one chat session.
//!
//! The `/ws/panel` endpoint upgrades an HTTP connection to a WebSocket.
//! Each connection owns exactly one session:
//!
//! - **Open:** a session with an empty log is created in the registry.
//! - **Inbound:** every text frame is parsed as a [`UiCommand`] and handed
//!   to the session on its own task, so a `ping` is answered while a
//!   question is still in flight.
//! - **Outbound:** [`UiEvent`]s are written in the order their commands
//!   complete.
//! - **Close:** the session is disposed. A question already sent to the
//!   provider still runs to completion; its event is dropped.
//!
//! At most [`MAX_PENDING_COMMANDS`] commands per connection may be running
//! or queued at once. A frame beyond that is answered immediately with an
//! error event and never reaches the session.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{Semaphore, mpsc};

use parley_core::chat::handle::SessionHandle;
use parley_types::event::{UiCommand, UiEvent};

use crate::state::AppState;

/// Commands one connection may have in flight or waiting for the session.
pub const MAX_PENDING_COMMANDS: usize = 16;

/// Upgrade an HTTP request to a panel WebSocket.
///
/// This is mounted at `/ws/panel` in the router.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_panel_connection(socket, state))
}

async fn handle_panel_connection(socket: WebSocket, state: AppState) {
    let handle = state.registry.create();
    let session_id = handle.id();
    tracing::info!(%session_id, "Panel connected");

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (event_tx, mut event_rx) = mpsc::channel::<UiEvent>(MAX_PENDING_COMMANDS);
    let pending = Arc::new(Semaphore::new(MAX_PENDING_COMMANDS));

    loop {
        tokio::select! {
            // --- Branch 1: Forward finished events to the panel ---
            Some(event) = event_rx.recv() => {
                if send_event(&mut ws_sender, &event).await.is_err() {
                    break;
                }
            }

            // --- Branch 2: Dispatch commands from the panel ---
            msg_result = ws_receiver.next() => {
                match msg_result {
                    Some(Ok(Message::Text(text))) => {
                        let Ok(permit) = pending.clone().try_acquire_owned() else {
                            tracing::warn!(
                                %session_id,
                                limit = MAX_PENDING_COMMANDS,
                                "Rejecting panel command: too many pending"
                            );
                            let event = UiEvent::Error(too_many_pending_message());
                            if send_event(&mut ws_sender, &event).await.is_err() {
                                break;
                            }
                            continue;
                        };

                        let handle = handle.clone();
                        let event_tx = event_tx.clone();
                        let frame = text.as_str().to_owned();
                        tokio::spawn(async move {
                            let event = respond(&handle, &frame).await;
                            // Receiver gone means the panel closed mid-question.
                            let _ = event_tx.send(event).await;
                            drop(permit);
                        });
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(%session_id, "WebSocket receive error: {err}");
                        break;
                    }
                    // Binary and protocol-level ping/pong frames are ignored.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    if let Err(err) = state.registry.dispose(&session_id) {
        tracing::warn!(%session_id, "Session already gone at disconnect: {err}");
    }
    tracing::info!(%session_id, "Panel disconnected");
}

fn too_many_pending_message() -> String {
    format!(
        "Too many pending commands (limit {MAX_PENDING_COMMANDS}). Wait for an answer before sending more."
    )
}

async fn send_event(
    ws_sender: &mut SplitSink<WebSocket, Message>,
    event: &UiEvent,
) -> Result<(), axum::Error> {
    match serde_json::to_string(event) {
        Ok(json) => ws_sender.send(Message::Text(json.into())).await,
        Err(err) => {
            tracing::warn!("Failed to serialize UiEvent: {err}");
            Ok(())
        }
    }
}

/// Parse one inbound frame and run it against the session.
///
/// Malformed frames never reach the orchestrator; they produce an error
/// event and leave the log untouched.
pub(crate) async fn respond(handle: &SessionHandle, frame: &str) -> UiEvent {
    match serde_json::from_str::<UiCommand>(frame) {
        Ok(command) => handle.handle_command(command).await,
        Err(err) => {
            tracing::warn!(
                session_id = %handle.id(),
                raw = %frame,
                error = %err,
                "Rejecting malformed panel command"
            );
            UiEvent::Error(format!("Malformed command: {err}"))
        }
    }
}
