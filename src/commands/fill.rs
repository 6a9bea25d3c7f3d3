use anyhow::Result;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

use jobfill::{
    AnswerRequester, DocumentPort, FillReport, FillerConfig, Orchestrator, OutputFormat,
    ProfileStore, WriteOutcome,
};

use crate::commands::utils;

pub struct FillOptions {
    pub url: Option<String>,
    pub html: Option<PathBuf>,
    pub browser: String,
    pub no_headless: bool,
    pub viewport: Option<String>,
    pub keep_open: bool,
    pub format: OutputFormat,
}

pub async fn handle_fill(options: FillOptions) -> Result<()> {
    utils::require_target(&options.url, &options.html)?;

    let config = FillerConfig::load()?;
    let profile = ProfileStore::new()?.load()?;
    let requester = AnswerRequester::new(&config)?;

    if let Some(path) = &options.html {
        let page = utils::open_html(path)?;
        let report = run(&page, &requester, &config, &profile).await?;
        match options.format {
            OutputFormat::Json => utils::print_json(&json!({
                "report": report,
                "journal": page.journal(),
            }))?,
            OutputFormat::Simple => print_simple(&report),
        }
        return Ok(());
    }

    let Some(url) = &options.url else {
        return Ok(());
    };
    let url = utils::validate_url(url)?;
    let page = utils::open_browser(&options.browser, options.viewport.clone(), options.no_headless).await?;
    let outcome = match page.goto(url.as_str()).await {
        Ok(()) => run(&page, &requester, &config, &profile).await,
        Err(e) => Err(e),
    };

    if options.keep_open && outcome.is_ok() {
        info!("Leaving the browser open for review. Press Ctrl+C when done");
        tokio::signal::ctrl_c().await?;
    }
    page.close().await?;

    let report = outcome?;
    match options.format {
        OutputFormat::Json => utils::print_json(&report)?,
        OutputFormat::Simple => print_simple(&report),
    }
    Ok(())
}

async fn run<D: DocumentPort>(
    page: &D,
    requester: &AnswerRequester,
    config: &FillerConfig,
    profile: &jobfill::StoredProfile,
) -> Result<FillReport> {
    let report = Orchestrator::new(page, requester, config).run(profile).await?;
    Ok(report)
}

fn print_simple(report: &FillReport) {
    for field in &report.fields {
        let status = match &field.outcome {
            WriteOutcome::Written(v) | WriteOutcome::Typed(v) => format!("= {}", v),
            WriteOutcome::Selected(v) => format!("-> {}", v),
            WriteOutcome::Attached(v) => format!("+ {}", v),
            WriteOutcome::Unmatched => format!("? no option matched {:?}", field.answer),
            WriteOutcome::Skipped => "(skipped)".to_string(),
            WriteOutcome::Failed(e) => format!("! {}", e),
        };
        println!("{} [{}] {}", field.label, field.kind, status);
    }
    println!(
        "Filled {} of {} fields, attached {} of {} files",
        report.fields_written, report.fields_found, report.files_attached, report.files_found
    );
}
