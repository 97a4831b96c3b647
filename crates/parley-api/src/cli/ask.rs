//! One-shot question from the terminal.

use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use console::style;

use parley_types::chat::ImageAttachment;
use parley_types::event::UiEvent;

use crate::state::AppState;

/// Ask one question in a fresh session and print the resulting event.
///
/// Returns `false` when the event is an error, so the caller can set the
/// exit status.
pub async fn ask(
    state: &AppState,
    text: Option<String>,
    image: Option<&Path>,
    json: bool,
) -> Result<bool> {
    let image = match image {
        Some(path) => Some(load_image(path).await?),
        None => None,
    };

    let handle = state.registry.create();
    let event = handle.ask(text.unwrap_or_default(), image).await;
    if let Err(err) = state.registry.dispose(&handle.id()) {
        tracing::warn!(session_id = %handle.id(), "Session already gone after ask: {err}");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&event)?);
        return Ok(!event.is_error());
    }

    match &event {
        UiEvent::Response(content) => println!("{content}"),
        UiEvent::Error(message) => eprintln!("  {} {message}", style("✗").red()),
        UiEvent::Pong => {}
    }

    Ok(!event.is_error())
}

/// Read an image file into a `data:` URI attachment.
async fn load_image(path: &Path) -> Result<ImageAttachment> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read image {}", path.display()))?;
    let mime_type = mime_for(path);

    Ok(ImageAttachment {
        data: format!("data:{mime_type};base64,{}", STANDARD.encode(&bytes)),
        mime_type: mime_type.to_string(),
        name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()),
    })
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}
