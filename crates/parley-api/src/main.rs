//! Parley CLI and panel bridge entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, loads configuration, then runs a one-shot command
//! or starts the bridge server.

mod cli;
mod http;
mod state;
#[cfg(test)]
mod test_support;

use clap::Parser;
use clap_complete::generate;

use parley_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = TracingOptions::from_verbosity(cli.verbose, cli.quiet)
        .with_json(cli.json)
        .with_otel(cli.otel);
    init_tracing(&options).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "parley", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(cli.overrides()).await?;

    let result = run(cli, state).await;
    shutdown_tracing();

    match result {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(err) => Err(err),
    }
}

/// Dispatch a command. `Ok(false)` means the command ran but reported failure.
async fn run(cli: Cli, state: AppState) -> anyhow::Result<bool> {
    match cli.command {
        Commands::Ask { text, image } => {
            cli::ask::ask(&state, text, image.as_deref(), cli.json).await
        }

        Commands::Status => {
            cli::status::status(&state, cli.json)?;
            Ok(true)
        }

        Commands::Serve { port, host } => {
            if !state.credential_configured() {
                tracing::warn!(
                    "No API key configured; questions will be answered with a configuration error until one is set"
                );
            }

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} Parley bridge listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("ws://{addr}/ws/panel")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
            Ok(true)
        }

        Commands::Completions { .. } => unreachable!("handled in main"),
    }
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
