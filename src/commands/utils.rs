use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;

use jobfill::{BrowserDocument, BrowserType, MemoryDocument, ViewportSize};

/// Parse the shared browser flags and open a session
pub async fn open_browser(
    browser: &str,
    viewport: Option<String>,
    no_headless: bool,
) -> Result<BrowserDocument> {
    let browser_type = BrowserType::from_str(browser)?;
    let viewport = viewport.as_deref().map(ViewportSize::parse).transpose()?;
    BrowserDocument::connect(browser_type, viewport, !no_headless).await
}

/// Load a saved page into an in-memory document
pub fn open_html(path: &Path) -> Result<MemoryDocument> {
    let html = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let url = format!("file://{}", path.display());
    Ok(MemoryDocument::from_html(&html, &url))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Check a page URL before a browser is started for it
pub fn validate_url(raw: &str) -> Result<url::Url> {
    let parsed = url::Url::parse(raw).with_context(|| format!("Invalid URL: {}", raw))?;
    match parsed.scheme() {
        "http" | "https" | "file" => Ok(parsed),
        other => anyhow::bail!("Invalid URL: unsupported scheme {:?} in {}", other, raw),
    }
}

/// Exactly one of `url` and `--html` must be given
pub fn require_target(url: &Option<String>, html: &Option<std::path::PathBuf>) -> Result<()> {
    match (url, html) {
        (Some(_), Some(_)) => anyhow::bail!("Pass either a URL or --html, not both"),
        (None, None) => anyhow::bail!("Pass a URL or --html <file>"),
        _ => Ok(()),
    }
}
