//! Conversation sessions for Parley.
//!
//! - `MessageLog`: append-only turn sequence and its envelope projection
//! - `ChatSession`: the orchestrator for one panel's conversation
//! - `SessionHandle`: one-in-flight wrapper around a session
//! - `SessionRegistry`: live sessions indexed by id

pub mod handle;
pub mod log;
pub mod registry;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;
