use thiserror::Error;

/// Errors a fill run can end with, each carrying its own exit code
#[derive(Debug, Error)]
pub enum FillError {
    /// API key or résumé missing (exit code 2)
    #[error("API key or resume not found. Save them with `jobfill profile set-key` and `jobfill profile set-resume` first")]
    NoCredentials,
    /// Nothing fillable on the page (exit code 3)
    #[error("No form fields found on this page")]
    NoFieldsFound,
    /// Remote rate limit, never retried (exit code 4)
    #[error(
        "Quota exceeded. Please wait 10-15 minutes or get a new API key from https://aistudio.google.com/app/apikey"
    )]
    QuotaExceeded,
    /// One model could not answer; the next one is tried (exit code 5)
    #[error("Model {model} unavailable: {reason}")]
    ModelUnavailable { model: String, reason: String },
    /// Every configured model failed (exit code 5)
    #[error("All models failed. Last error: {last}")]
    AllModelsFailed {
        #[source]
        last: Box<FillError>,
    },
    /// WebDriver connection failed (exit code 6)
    #[error("WebDriver connection failed: {0}")]
    WebDriverFailed(String),
    /// Generic error (exit code 1)
    #[error(transparent)]
    Other(anyhow::Error),
}

impl FillError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            FillError::NoCredentials => 2,
            FillError::NoFieldsFound => 3,
            FillError::QuotaExceeded => 4,
            FillError::ModelUnavailable { .. } | FillError::AllModelsFailed { .. } => 5,
            FillError::WebDriverFailed(_) => 6,
            FillError::Other(_) => 1,
        }
    }

    pub fn model_unavailable(model: &str, reason: impl Into<String>) -> Self {
        FillError::ModelUnavailable {
            model: model.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<anyhow::Error> for FillError {
    fn from(err: anyhow::Error) -> Self {
        let err = match err.downcast::<FillError>() {
            Ok(fill) => return fill,
            Err(err) => err,
        };

        // WebDriver failures surface from fantoccini as plain messages
        let msg = format!("{:#}", err);
        if msg.contains("Failed to connect to WebDriver")
            || msg.contains("WebDriver")
            || msg.contains("geckodriver")
            || msg.contains("chromedriver")
        {
            FillError::WebDriverFailed(msg)
        } else {
            FillError::Other(err)
        }
    }
}

#[cfg(test)]
#[path = "errors_test.rs"]
mod errors_test;
