//! Turn raw model output into one answer per field.

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::AnswerSet;

/// The model text held no usable JSON array. Recovered locally, never surfaced.
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("No JSON array found in response")]
    NoArray,
    #[error("Response array is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Response is not an array")]
    NotAnArray,
}

/// Parse model output and reconcile it to exactly `expected` answers.
pub fn parse_answers(raw: &str, expected: usize) -> AnswerSet {
    let answers = match parse_json_array(raw) {
        Ok(answers) => answers,
        Err(e) => {
            warn!("Failed to parse JSON answers ({}), splitting by lines", e);
            split_lines(raw)
        }
    };

    if answers.len() != expected {
        debug!(
            "Expected {} answers, got {}. Reconciling",
            expected,
            answers.len()
        );
    }
    AnswerSet::reconcile(answers, expected)
}

/// Parse the span from the first `[` to the last `]` as a JSON array.
///
/// Numbers and booleans are kept as their text; `null` becomes an empty string.
pub fn parse_json_array(raw: &str) -> Result<Vec<String>, ParseFailure> {
    let start = raw.find('[').ok_or(ParseFailure::NoArray)?;
    let end = raw.rfind(']').ok_or(ParseFailure::NoArray)?;
    if end < start {
        return Err(ParseFailure::NoArray);
    }

    let value: Value = serde_json::from_str(&raw[start..=end])?;
    let Value::Array(items) = value else {
        return Err(ParseFailure::NotAnArray);
    };

    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::String(s) => s,
            Value::Null => String::new(),
            other => other.to_string(),
        })
        .collect())
}

/// Line-by-line fallback for output that is not valid JSON.
///
/// Drops blank and bracket lines, then strips leading numbering and quotes
/// and trailing quotes and commas.
pub fn split_lines(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('[') && !line.starts_with(']'))
        .map(|line| {
            line.trim_start_matches(|c: char| {
                c == '"' || c == '\'' || c.is_ascii_digit() || c == '.' || c == '-' || c.is_whitespace()
            })
            .trim_end_matches(['"', '\'', ','])
            .trim()
            .to_string()
        })
        .collect()
}

#[cfg(test)]
#[path = "answers_test.rs"]
mod answers_test;
