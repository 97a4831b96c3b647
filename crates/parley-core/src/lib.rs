//! Session orchestration and provider trait definitions for Parley.
//!
//! This crate defines the "ports" (provider traits) that the infrastructure
//! layer implements, and the session orchestrator that drives them. It
//! depends only on `parley-types` -- never on `parley-infra` or any HTTP crate.

pub mod chat;
pub mod llm;
