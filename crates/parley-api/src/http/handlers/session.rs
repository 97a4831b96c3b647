//! Session HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/v1/sessions            - Create a session
//! - GET    /api/v1/sessions            - List live sessions
//! - GET    /api/v1/sessions/{id}       - Get a session summary
//! - GET    /api/v1/sessions/{id}/turns - Get the message log
//! - POST   /api/v1/sessions/{id}/ask   - Send a UI command, get the UI event
//! - DELETE /api/v1/sessions/{id}       - Dispose a session

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use parley_types::chat::{SessionInfo, Turn};
use parley_types::event::{UiCommand, UiEvent};

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Parse a UUID from a path parameter, returning a 400 error on invalid format.
fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    s.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("Invalid UUID: {s}")))
}

fn session_link(id: &Uuid) -> String {
    format!("/api/v1/sessions/{id}")
}

/// POST /api/v1/sessions - Create a session with an empty log.
pub async fn create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<SessionInfo>>) {
    let start = Instant::now();
    let handle = state.registry.create();
    let info = handle.info();

    let resp = ApiResponse::success(info, start)
        .with_link("self", &session_link(&handle.id()))
        .with_link("ask", &format!("{}/ask", session_link(&handle.id())));

    (StatusCode::CREATED, Json(resp))
}

/// GET /api/v1/sessions - List live sessions, oldest first.
pub async fn list_sessions(State(state): State<AppState>) -> Json<ApiResponse<Vec<SessionInfo>>> {
    let start = Instant::now();
    let sessions = state.registry.list();
    Json(ApiResponse::success(sessions, start).with_link("self", "/api/v1/sessions"))
}

/// GET /api/v1/sessions/{id} - Get a session summary.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<SessionInfo>>, AppError> {
    let start = Instant::now();
    let sid = parse_uuid(&session_id)?;
    let handle = state.registry.get(&sid)?;

    let resp = ApiResponse::success(handle.info(), start)
        .with_link("self", &session_link(&sid))
        .with_link("turns", &format!("{}/turns", session_link(&sid)));

    Ok(Json(resp))
}

/// GET /api/v1/sessions/{id}/turns - Get the log as of the last completed question.
pub async fn get_turns(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<Turn>>>, AppError> {
    let start = Instant::now();
    let sid = parse_uuid(&session_id)?;
    let handle = state.registry.get(&sid)?;

    Ok(Json(
        ApiResponse::success(handle.turns(), start)
            .with_link("session", &session_link(&sid)),
    ))
}

/// POST /api/v1/sessions/{id}/ask - Run one panel command.
///
/// A failed exchange is still a 200: the error travels inside the UI event,
/// exactly as it would over the WebSocket.
pub async fn ask(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(command): Json<UiCommand>,
) -> Result<Json<ApiResponse<UiEvent>>, AppError> {
    let start = Instant::now();
    let sid = parse_uuid(&session_id)?;
    let handle = state.registry.get(&sid)?;

    let event = handle.handle_command(command).await;

    Ok(Json(
        ApiResponse::success(event, start).with_link("session", &session_link(&sid)),
    ))
}

/// DELETE /api/v1/sessions/{id} - Dispose a session and its log.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let sid = parse_uuid(&session_id)?;
    state.registry.dispose(&sid)?;

    Ok(Json(ApiResponse::success(
        serde_json::json!({ "id": sid, "disposed": true }),
        start,
    )))
}
