//! Infrastructure layer for Parley.
//!
//! Contains implementations of the ports defined in `parley-core`: the
//! OpenAI-compatible inference client, the provider source that binds it to
//! configuration, config file loading, and environment secret lookup.

pub mod config;
pub mod filesystem;
pub mod llm;
pub mod secret;
