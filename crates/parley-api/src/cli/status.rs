//! Effective configuration display.

use anyhow::Result;
use console::style;

use crate::state::AppState;

pub fn status(state: &AppState, json: bool) -> Result<()> {
    let config = &state.config;
    let credential = state.credential_configured();

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "endpoint": config.endpoint,
            "model": config.model,
            "max_tokens": config.max_tokens,
            "request_timeout_secs": config.request_timeout_secs,
            "busy_policy": config.busy_policy.to_string(),
            "credential_configured": credential,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!("  {} Parley v{}", style("⚡").bold(), env!("CARGO_PKG_VERSION"));
    println!();
    println!("  {}", style("── Provider ──").dim());
    println!("  Endpoint:   {}", style(&config.endpoint).cyan());
    println!("  Model:      {}", style(&config.model).bold());
    println!("  Max tokens: {}", config.max_tokens);
    if let Some(secs) = config.request_timeout_secs {
        println!("  Timeout:    {secs}s");
    }
    println!(
        "  API key:    {}",
        if credential {
            style("configured").green()
        } else {
            style("missing").red()
        }
    );
    println!();
    println!("  {}", style("── Sessions ──").dim());
    println!("  Busy policy: {}", config.busy_policy);
    println!("  Data dir:    {}", style(state.data_dir.display()).dim());
    println!();

    Ok(())
}
