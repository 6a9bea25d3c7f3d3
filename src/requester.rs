//! Ask the model for every answer in one request.

use tracing::{info, warn};

use crate::answers::parse_answers;
use crate::config::FillerConfig;
use crate::errors::FillError;
use crate::fallback::{Attempt, FallbackError, first_success};
use crate::gemini::{GeminiClient, GenerateContentRequest, Part};
use crate::profile::StoredProfile;
use crate::prompt::build_prompt;
use crate::types::{AnswerSet, FieldDescriptor, JobContext};

/// Drafts answers for a list of fields, walking the configured model list
pub struct AnswerRequester {
    client: GeminiClient,
    models: Vec<String>,
    temperature: f32,
    max_output_tokens: u32,
    default_text_limit: usize,
}

impl AnswerRequester {
    pub fn new(config: &FillerConfig) -> anyhow::Result<Self> {
        Ok(AnswerRequester {
            client: GeminiClient::new(&config.api_base)?,
            models: config.models.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            default_text_limit: config.default_text_limit,
        })
    }

    pub fn models(&self) -> &[String] {
        &self.models
    }

    /// One answer per field, in field order.
    ///
    /// `file_count` only matters when `fields` is empty: a page with file
    /// inputs alone is still worth filling, so it gets an empty answer set
    /// instead of [`FillError::NoFieldsFound`].
    pub async fn request_answers(
        &self,
        fields: &[FieldDescriptor],
        file_count: usize,
        profile: &StoredProfile,
        job: &JobContext,
    ) -> Result<AnswerSet, FillError> {
        let (Some(api_key), Some(resume)) = (profile.api_key(), profile.full_resume_text()) else {
            return Err(FillError::NoCredentials);
        };
        if fields.is_empty() {
            if file_count == 0 {
                return Err(FillError::NoFieldsFound);
            }
            return Ok(AnswerSet::default());
        }

        let prompt = build_prompt(fields, &resume, job, self.default_text_limit);
        let request = GenerateContentRequest::new(
            vec![Part::Text { text: prompt }],
            self.temperature,
            self.max_output_tokens,
        );

        let raw = first_success(&self.models, |model| {
            let request = &request;
            async move {
                info!("Trying model: {}", model);
                match self.client.generate_text(api_key, model, request).await {
                    Ok(text) => {
                        info!("Success with model: {}", model);
                        Ok(text)
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
            FallbackError::Exhausted(Some(last)) => FillError::AllModelsFailed {
                last: Box::new(last),
            },
            FallbackError::Exhausted(None) => FillError::AllModelsFailed {
                last: Box::new(FillError::model_unavailable("-", "no models configured")),
            },
        })?;

        Ok(parse_answers(&raw, fields.len()))
    }
}
