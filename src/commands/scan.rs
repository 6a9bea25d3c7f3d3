use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use jobfill::port::DocumentPort;
use jobfill::scanner;
use jobfill::{OutputFormat, ScanResult};

use crate::commands::utils;

pub async fn handle_scan(
    url: Option<String>,
    html: Option<PathBuf>,
    browser: String,
    format: OutputFormat,
) -> Result<()> {
    utils::require_target(&url, &html)?;

    let result = match (url, html) {
        (_, Some(path)) => {
            let page = utils::open_html(&path)?;
            scanner::scan(&page.snapshot().await?)
        }
        (Some(url), None) => {
            let url = utils::validate_url(&url)?;
            let page = utils::open_browser(&browser, None, false).await?;
            page.goto(url.as_str()).await?;
            let dom = page.snapshot().await;
            page.close().await?;
            scanner::scan(&dom?)
        }
        (None, None) => ScanResult::default(),
    };
    info!("Found {} fields and {} file inputs", result.fields.len(), result.files.len());

    match format {
        OutputFormat::Json => utils::print_json(&result)?,
        OutputFormat::Simple => print_simple(&result),
    }
    Ok(())
}

fn print_simple(result: &ScanResult) {
    for (i, field) in result.fields.iter().enumerate() {
        match field.max_length {
            Some(limit) => println!("{}. [{}] {} (max {})", i + 1, field.kind_name(), field.label, limit),
            None => println!("{}. [{}] {}", i + 1, field.kind_name(), field.label),
        }
    }
    for file in &result.files {
        println!("-. [file] {}", file.label);
    }
    if result.is_empty() {
        println!("No form fields found");
    }
}
