//! Shared domain types for Parley.
//!
//! This crate contains the types passed between the panel bridge, the
//! session orchestrator, and the inference client: turns, request
//! envelopes, UI events, configuration, and their error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod event;
pub mod llm;
