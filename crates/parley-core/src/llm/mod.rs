//! LLM provider abstractions for Parley.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: object-safe wrapper for dynamic dispatch
//! - `ProviderSource`: resolves a configured provider per question

pub mod box_provider;
pub mod provider;
pub mod source;
