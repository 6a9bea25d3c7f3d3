#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jobfill::driver::GLOBAL_DRIVER_MANAGER;
use jobfill::{FillError, OutputFormat};

mod commands;

use crate::commands::fill::FillOptions;
use crate::commands::profile::ProfileCommands;

const EXIT_SUCCESS: i32 = 0;

#[derive(Parser)]
#[command(name = "jobfill")]
#[command(about = "Fill job application forms with answers drafted from your resume", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill the application form at a URL (or in a saved HTML file)
    Fill {
        /// URL of the application form
        url: Option<String>,

        /// Dry run against a saved HTML page instead of a browser
        #[arg(long, conflicts_with = "url")]
        html: Option<PathBuf>,

        /// Browser to use
        #[arg(short, long, default_value = "firefox")]
        browser: String,

        /// Run browser in visible mode (disables headless)
        #[arg(long = "no-headless")]
        no_headless: bool,

        /// Set viewport size (WIDTHxHEIGHT, e.g., 1920x1080)
        #[arg(long)]
        viewport: Option<String>,

        /// Keep the browser open after filling until Ctrl+C
        #[arg(long)]
        keep_open: bool,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// List the form fields a fill would answer
    Scan {
        /// URL of the page to scan
        url: Option<String>,

        /// Scan a saved HTML page instead of a browser
        #[arg(long, conflicts_with = "url")]
        html: Option<PathBuf>,

        /// Browser to use
        #[arg(short, long, default_value = "firefox")]
        browser: String,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Manage the stored API key and résumé
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },

    /// Open a page and fill it on every `{"action":"fillForm"}` line read from stdin
    Bridge {
        /// URL of the application form
        url: String,

        /// Browser to use
        #[arg(short, long, default_value = "firefox")]
        browser: String,

        /// Run browser in visible mode (disables headless)
        #[arg(long = "no-headless")]
        no_headless: bool,

        /// Set viewport size (WIDTHxHEIGHT, e.g., 1920x1080)
        #[arg(long)]
        viewport: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let result = run().await;

    // Always clean up WebDriver processes before exiting
    GLOBAL_DRIVER_MANAGER.stop_all();

    match result {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            let fill_err: FillError = err.into();

            // JSON error on stdout for programmatic consumers
            let error_json = json!({
                "error": true,
                "message": fill_err.to_string(),
                "exit_code": fill_err.exit_code()
            });
            println!(
                "{}",
                serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string())
            );
            eprintln!("Error: {}", fill_err);

            std::process::exit(fill_err.exit_code());
        }
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr so JSON output on stdout stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobfill=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fill {
            url,
            html,
            browser,
            no_headless,
            viewport,
            keep_open,
            format,
        } => {
            commands::fill::handle_fill(FillOptions {
                url,
                html,
                browser,
                no_headless,
                viewport,
                keep_open,
                format,
            })
            .await?
        }

        Commands::Scan {
            url,
            html,
            browser,
            format,
        } => commands::scan::handle_scan(url, html, browser, format).await?,

        Commands::Profile { command } => commands::profile::handle_profile(command).await?,

        Commands::Bridge {
            url,
            browser,
            no_headless,
            viewport,
        } => commands::bridge::handle_bridge(url, browser, no_headless, viewport).await?,
    }

    Ok(())
}
