//! HTTP layer for Parley.
//!
//! Axum server hosting the panel bridge at `/ws/panel` and a REST surface
//! at `/api/v1/` for driving sessions without a WebSocket.

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
