//! Global configuration types for Parley.
//!
//! `GlobalConfig` represents the top-level `config.toml` that selects the
//! inference endpoint, model, output bound, and session concurrency policy.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a session does when a question arrives while another is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusyPolicy {
    /// Wait for the in-flight question, then run (FIFO).
    #[default]
    Queue,
    /// Answer immediately with a busy error; the log is not touched.
    Reject,
}

impl fmt::Display for BusyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusyPolicy::Queue => write!(f, "queue"),
            BusyPolicy::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for BusyPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "queue" => Ok(BusyPolicy::Queue),
            "reject" => Ok(BusyPolicy::Reject),
            other => Err(format!("invalid busy policy: '{other}'")),
        }
    }
}

/// Top-level configuration for Parley.
///
/// Loaded from `~/.parley/config.toml`. All fields have defaults.
#[derive(Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Chat-completions endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier sent with every request.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum output tokens per completion.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Credential. When absent, the `PARLEY_API_KEY` environment variable is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Transport timeout override; the HTTP client default applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub busy_policy: BusyPolicy,
}

fn default_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            api_key: None,
            request_timeout_secs: None,
            busy_policy: BusyPolicy::default(),
        }
    }
}

// Hand-written so the credential never reaches logs.
impl fmt::Debug for GlobalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalConfig")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("busy_policy", &self.busy_policy)
            .finish()
    }
}
