//! Secret lookup for provider credentials.

pub mod env;
