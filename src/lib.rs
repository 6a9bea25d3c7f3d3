//! # jobfill
//!
//! Fills job application forms with answers drafted by Gemini from your résumé
//! and the job posting on the page.
//!
//! ## CLI Usage
//!
//! ```bash
//! # Save the API key and the résumé once
//! jobfill profile set-key "$GEMINI_API_KEY"
//! jobfill profile set-resume resume.txt
//!
//! # Keep a PDF for upload fields and extract its text with the model
//! jobfill profile import-resume resume.pdf --extract
//!
//! # Fill a live application form (Firefox by default)
//! jobfill fill "https://jobs.example.com/apply/123" --no-headless --keep-open
//!
//! # See which questions would be asked, without a browser
//! jobfill scan --html saved-form.html --format simple
//!
//! # Dry run against a saved page: prints the report and every write
//! jobfill fill --html saved-form.html
//!
//! # Answer `{"action":"fillForm"}` lines on stdin
//! jobfill bridge "https://jobs.example.com/apply/123"
//! ```
//!
//! ## Library Usage
//!
//! ```no_run
//! use jobfill::{AnswerRequester, FillerConfig, MemoryDocument, Orchestrator, ProfileStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = FillerConfig::load()?;
//! let profile = ProfileStore::new()?.load()?;
//! let requester = AnswerRequester::new(&config)?;
//!
//! let page = MemoryDocument::from_html("<form>...</form>", "https://jobs.example.com/1");
//! let report = Orchestrator::new(&page, &requester, &config).run(&profile).await?;
//! println!("{} fields written", report.fields_written);
//! # Ok(())
//! # }
//! ```
//!
//! The page is reached through [`DocumentPort`]: [`BrowserDocument`] drives a
//! real browser over WebDriver, [`MemoryDocument`] works on parsed HTML.

#![allow(clippy::uninlined_format_args)]

pub mod answers;
pub mod bridge;
pub mod browser;
pub mod config;
pub mod dom;
pub mod driver;
pub mod errors;
pub mod fallback;
pub mod gemini;
mod html;
pub mod labels;
pub mod memory;
pub mod orchestrator;
pub mod port;
pub mod profile;
pub mod prompt;
pub mod requester;
pub mod resume;
pub mod scanner;
pub mod types;
pub mod writer;

pub use browser::{BrowserDocument, BrowserType};
pub use config::{FillerConfig, WriterSettings};
pub use dom::{DomSnapshot, NodeId};
pub use errors::FillError;
pub use memory::{MemoryDocument, WriteAction};
pub use orchestrator::{FillState, Orchestrator};
pub use port::DocumentPort;
pub use profile::{ProfileStore, ResumeFile, StoredProfile};
pub use requester::AnswerRequester;
pub use types::{
    AnswerSet, FieldDescriptor, FieldKind, FillReport, JobContext, OutputFormat, ScanResult,
    ViewportSize, WriteOutcome,
};
