//! CLI command definitions for the `parley` binary.

pub mod ask;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use parley_infra::config::ConfigOverrides;

/// Ask questions of an OpenAI-compatible model from a panel or the terminal.
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    /// Model identifier (overrides config.toml).
    #[arg(long, global = true, env = "PARLEY_MODEL")]
    pub model: Option<String>,

    /// Maximum output tokens per answer (overrides config.toml).
    #[arg(long, global = true)]
    pub max_tokens: Option<u32>,

    /// Chat-completions endpoint URL (overrides config.toml).
    #[arg(long, global = true, env = "PARLEY_ENDPOINT")]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the panel bridge and REST server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Ask a single question in a fresh session.
    Ask {
        /// Question text. May be omitted when an image is attached.
        text: Option<String>,

        /// Image file to attach.
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Show the effective configuration.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_parse_ask_with_overrides() {
        let cli = Cli::try_parse_from([
            "parley",
            "--model",
            "gpt-4o",
            "--max-tokens",
            "128",
            "ask",
            "What is 6*7?",
        ])
        .unwrap();

        let overrides = cli.overrides();
        assert_eq!(overrides.model.as_deref(), Some("gpt-4o"));
        assert_eq!(overrides.max_tokens, Some(128));
        match cli.command {
            Commands::Ask { text, image } => {
                assert_eq!(text.as_deref(), Some("What is 6*7?"));
                assert!(image.is_none());
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["parley", "serve"]).unwrap();
        match cli.command {
            Commands::Serve { port, host } => {
                assert_eq!(port, 3000);
                assert_eq!(host, "127.0.0.1");
            }
            _ => panic!("expected serve"),
        }
    }
}
