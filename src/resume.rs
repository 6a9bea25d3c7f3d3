//! Résumé import: plain text is stored as is, PDFs are kept as files and can
//! be turned into text by the model.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::config::FillerConfig;
use crate::errors::FillError;
use crate::fallback::{Attempt, FallbackError, first_success};
use crate::gemini::{GeminiClient, GenerateContentRequest, InlineData, Part};
use crate::profile::{ProfileStore, ResumeFile, StoredProfile};

const EXTRACTION_PROMPT: &str = "Extract all text from this resume PDF. \
Return only the plain text content, keeping the section order \
(contact details, summary, experience, education, skills). \
Do not add commentary or formatting.";

const EXTRACTION_TEMPERATURE: f32 = 0.1;
const EXTRACTION_MAX_TOKENS: u32 = 8192;

/// Extracted text shorter than this counts as a failed extraction
const MIN_EXTRACTED_CHARS: usize = 10;

/// What an import stored
#[derive(Debug, Clone, PartialEq)]
pub enum ImportedResume {
    Text { chars: usize },
    Pdf { file_name: String, extracted_chars: Option<usize> },
}

/// Pull the text out of a PDF résumé, trying each extraction model in order
pub async fn extract_pdf_text(
    client: &GeminiClient,
    api_key: &str,
    models: &[String],
    file: &ResumeFile,
) -> Result<String, FillError> {
    let request = GenerateContentRequest::new(
        vec![
            Part::Text {
                text: EXTRACTION_PROMPT.to_string(),
            },
            Part::InlineData {
                inline_data: InlineData {
                    mime_type: "application/pdf".to_string(),
                    data: file.to_base64(),
                },
            },
        ],
        EXTRACTION_TEMPERATURE,
        EXTRACTION_MAX_TOKENS,
    );

    first_success(models, |model| {
        let request = &request;
        async move {
            info!("Extracting resume text with {}", model);
            match client.generate_text(api_key, model, request).await {
                Ok(text) if text.chars().count() >= MIN_EXTRACTED_CHARS => Ok(text),
                Ok(_) => {
                    let e = FillError::model_unavailable(model, "extracted text too short");
                    warn!("{}", e);
                    Err(Attempt::Retry(e))
                }
                Err(FillError::QuotaExceeded) => Err(Attempt::Stop(FillError::QuotaExceeded)),
                Err(e) => {
                    warn!("{}", e);
                    Err(Attempt::Retry(e))
                }
            }
        }
    })
    .await
    .map_err(|e| match e {
        FallbackError::Stopped(e) => e,
        FallbackError::Exhausted(last) => FillError::AllModelsFailed {
            last: Box::new(
                last.unwrap_or_else(|| FillError::model_unavailable("-", "no extraction models configured")),
            ),
        },
    })
}

/// Store a résumé file in the profile.
///
/// `.txt` files become the résumé text. `.pdf` files are stored as a data URL
/// for upload controls; with `extract` their text is drafted by the model and
/// stored too. Anything else is rejected.
pub async fn import_resume(
    path: &Path,
    store: &ProfileStore,
    extract: bool,
    config: &FillerConfig,
) -> Result<ImportedResume> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("resume")
        .to_string();

    match extension.as_str() {
        "txt" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if text.trim().is_empty() {
                anyhow::bail!("{} is empty", path.display());
            }
            let chars = text.chars().count();
            store.update(|profile| profile.resume_text = Some(text))?;
            info!("Stored {} characters of resume text", chars);
            Ok(ImportedResume::Text { chars })
        }
        "pdf" => {
            let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
            let file = ResumeFile {
                name: file_name.clone(),
                mime_type: "application/pdf".to_string(),
                bytes,
            };

            let mut profile = store.load()?;
            profile.set_resume_file(&file.name, &file.mime_type, &file.bytes);

            let extracted_chars = if extract {
                let text = extract_with_profile(&profile, &file, config).await?;
                let chars = text.chars().count();
                profile.resume_text = Some(text);
                Some(chars)
            } else {
                None
            };

            store.save(&profile)?;
            Ok(ImportedResume::Pdf {
                file_name,
                extracted_chars,
            })
        }
        other => anyhow::bail!(
            "Unsupported resume type {:?}. Use a .txt or .pdf file",
            if other.is_empty() { "(none)" } else { other }
        ),
    }
}

async fn extract_with_profile(
    profile: &StoredProfile,
    file: &ResumeFile,
    config: &FillerConfig,
) -> Result<String> {
    let api_key = profile.api_key().ok_or(FillError::NoCredentials)?;
    let client = GeminiClient::new(&config.api_base)?;
    let text = extract_pdf_text(&client, api_key, &config.extraction_models, file).await?;
    Ok(text)
}

#[cfg(test)]
#[path = "resume_test.rs"]
mod resume_test;
