//! One fill run: scan, ask, write.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::FillerConfig;
use crate::errors::FillError;
use crate::port::{DocumentPort, NoticeLevel};
use crate::profile::StoredProfile;
use crate::requester::AnswerRequester;
use crate::scanner;
use crate::types::{FieldKind, FieldReport, FillReport, WriteOutcome};
use crate::writer::FieldWriter;

/// Where a run currently is
#[derive(Debug, Clone, PartialEq)]
pub enum FillState {
    Idle,
    Scanning,
    Requesting,
    Writing,
    Done,
    Failed(String),
}

pub struct Orchestrator<'a, D: DocumentPort + ?Sized> {
    port: &'a D,
    requester: &'a AnswerRequester,
    config: &'a FillerConfig,
    state: FillState,
}

impl<'a, D: DocumentPort + ?Sized> Orchestrator<'a, D> {
    pub fn new(port: &'a D, requester: &'a AnswerRequester, config: &'a FillerConfig) -> Self {
        Orchestrator {
            port,
            requester,
            config,
            state: FillState::Idle,
        }
    }

    pub fn state(&self) -> &FillState {
        &self.state
    }

    /// Fill the current page with answers drawn from `profile`
    pub async fn run(&mut self, profile: &StoredProfile) -> Result<FillReport, FillError> {
        let run_id = Uuid::new_v4().to_string();
        info!("Fill run {} started", run_id);

        match self.fill(&run_id, profile).await {
            Ok(report) => {
                self.transition(FillState::Done);
                self.notify(
                    &format!("Filled {} fields", report.fields_written + report.files_attached),
                    NoticeLevel::Success,
                )
                .await;
                Ok(report)
            }
            Err(e) => {
                self.transition(FillState::Failed(e.to_string()));
                self.notify(&format!("Error: {}", e), NoticeLevel::Error).await;
                Err(e)
            }
        }
    }

    async fn fill(&mut self, run_id: &str, profile: &StoredProfile) -> Result<FillReport, FillError> {
        if !profile.has_credentials() {
            return Err(FillError::NoCredentials);
        }
        let (port, config) = (self.port, self.config);

        self.transition(FillState::Scanning);
        self.notify("Scanning form fields...", NoticeLevel::Info).await;
        let dom = port.snapshot().await?;
        let scan = scanner::scan(&dom);
        info!("Found {} fields and {} file inputs", scan.fields.len(), scan.files.len());
        if scan.is_empty() {
            return Err(FillError::NoFieldsFound);
        }

        let job = port.job_context(config.page_text_limit).await?;
        let writer = FieldWriter::new(port, &dom, &config.writer, config.default_text_limit);

        let mut files_attached = 0;
        if !scan.files.is_empty() {
            match profile.resume_file()? {
                Some(file) => {
                    for field in &scan.files {
                        match writer.attach(field, &file).await {
                            Ok(_) => files_attached += 1,
                            Err(e) => warn!("Could not attach {} to \"{}\": {:#}", file.name, field.label, e),
                        }
                    }
                }
                None => debug!("No resume file stored, skipping {} file inputs", scan.files.len()),
            }
        }

        self.transition(FillState::Requesting);
        self.notify(
            &format!("Found {} fields. Asking AI for answers...", scan.fields.len()),
            NoticeLevel::Info,
        )
        .await;
        let answers = self
            .requester
            .request_answers(&scan.fields, scan.files.len(), profile, &job)
            .await?;

        self.transition(FillState::Writing);
        let settings = &config.writer;
        let mut reports = Vec::with_capacity(scan.fields.len());
        for (i, field) in scan.fields.iter().enumerate() {
            let answer = answers.get(i).unwrap_or_default();
            let outcome = match writer.apply(field, answer).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Error filling \"{}\": {:#}", field.label, e);
                    WriteOutcome::Failed(format!("{:#}", e))
                }
            };

            if !matches!(outcome, WriteOutcome::Skipped) {
                let delay = match field.kind {
                    FieldKind::Select2Search { .. } => settings.widget_delay(),
                    _ => settings.field_delay(),
                };
                tokio::time::sleep(delay).await;
            }

            reports.push(FieldReport {
                label: field.label.clone(),
                kind: field.kind_name().to_string(),
                answer: answer.to_string(),
                outcome,
            });
        }

        let fields_written = reports.iter().filter(|r| r.outcome.is_applied()).count();
        info!("Fill run {} wrote {} of {} fields", run_id, fields_written, reports.len());

        Ok(FillReport {
            run_id: run_id.to_string(),
            fields_found: scan.fields.len(),
            files_found: scan.files.len(),
            fields_written,
            files_attached,
            fields: reports,
        })
    }

    fn transition(&mut self, next: FillState) {
        debug!("State {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    async fn notify(&self, message: &str, level: NoticeLevel) {
        if let Err(e) = self.port.notify(message, level).await {
            debug!("Notification failed: {:#}", e);
        }
    }
}
