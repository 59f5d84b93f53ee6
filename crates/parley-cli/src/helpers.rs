//! Shared CLI helpers: image loading, response printing, banner.

use std::path::Path;

use anyhow::{bail, Context, Result};
use base64::Engine;
use colored::Colorize;

use parley_core::types::ImageAttachment;

/// Read an image file and encode it for attachment.
pub fn load_image(path: &Path) -> Result<ImageAttachment> {
    let mime_type = mime_for(path)
        .with_context(|| format!("unsupported image type: {}", path.display()))?;
    let bytes = std::fs::read(path)
        .with_context(|| format!("failed to read image: {}", path.display()))?;
    if bytes.is_empty() {
        bail!("image file is empty: {}", path.display());
    }
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(ImageAttachment::new(encoded, mime_type))
}

fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Print an assistant reply to stdout.
pub fn print_response(response: &str) {
    println!();
    println!("{}", "Parley".cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print the banner shown at REPL start.
pub fn print_banner(chat_id: &str) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "Parley".cyan().bold(), version.dimmed());
    println!(
        "{}",
        format!("Chat \"{chat_id}\". Type a message, \"/clear\" to reset, or \"exit\" to quit.")
            .dimmed()
    );
    println!();
}

pub fn print_thinking() {
    eprint!("{}", "thinking...".dimmed());
}

pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
