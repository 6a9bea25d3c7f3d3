use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::dom::NodeId;

/// Output format for CLI results
#[derive(Clone, Copy, Debug, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON format for programmatic consumption
    Json,
    /// Human-readable simple format
    Simple,
}

/// One discovered form control and the question it asks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// The control to write into (the search input for Select2 search widgets)
    pub node: NodeId,
    /// Cleaned question text
    pub label: String,
    /// How the control is written
    pub kind: FieldKind,
    /// `maxlength` attribute, when present and numeric
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
}

impl FieldDescriptor {
    /// Character limit applied to the answer.
    ///
    /// Falls back to `default_limit` for textareas and plain `text` inputs.
    pub fn char_limit(&self, default_limit: usize) -> Option<usize> {
        if let Some(limit) = self.max_length {
            return Some(limit);
        }
        match &self.kind {
            FieldKind::TextArea => Some(default_limit),
            FieldKind::Text { input_type } if input_type == "text" => Some(default_limit),
            _ => None,
        }
    }

    /// Short name of the field kind, used in logs and reports
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Closed set of control kinds the writer knows how to fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// `<input>` of type text, email, tel, url, number or untyped
    Text { input_type: String },
    /// `<textarea>`
    TextArea,
    /// Native `<select>`
    Select,
    /// Native `<select>` hidden behind a Select2 container
    Select2 { container: NodeId },
    /// Visible Select2 search input, optionally backed by a native `<select>`
    Select2Search {
        backing_select: Option<NodeId>,
        container: Option<NodeId>,
    },
    /// Radio buttons sharing one `name`
    RadioGroup {
        name: String,
        options: Vec<RadioOption>,
    },
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text { .. } => "text",
            FieldKind::TextArea => "textarea",
            FieldKind::Select => "select",
            FieldKind::Select2 { .. } => "select2",
            FieldKind::Select2Search { .. } => "select2-search",
            FieldKind::RadioGroup { .. } => "radio",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Text { input_type } if input_type == "number")
    }
}

/// One radio button of a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadioOption {
    pub node: NodeId,
    pub label: String,
    pub value: String,
}

/// A file upload control. Only ever receives the stored résumé file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileFieldDescriptor {
    pub node: NodeId,
    pub label: String,
}

/// Everything one pass over the page found
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub fields: Vec<FieldDescriptor>,
    pub files: Vec<FileFieldDescriptor>,
}

impl ScanResult {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.files.is_empty()
    }
}

/// Snapshot of the page the form lives on, used to tailor answers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobContext {
    /// Visible page text, truncated
    pub page_content: String,
    pub page_title: String,
    pub url: String,
}

impl JobContext {
    /// Build a context, keeping at most `limit` characters of page text
    pub fn new(page_text: &str, page_title: &str, url: &str, limit: usize) -> Self {
        JobContext {
            page_content: page_text.chars().take(limit).collect(),
            page_title: page_title.to_string(),
            url: url.to_string(),
        }
    }
}

/// Answers aligned index-for-index with the scanned fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(Vec<String>);

impl AnswerSet {
    /// Pad with empty strings or truncate so there is exactly one answer per field
    pub fn reconcile(mut answers: Vec<String>, expected: usize) -> Self {
        answers.resize(expected, String::new());
        AnswerSet(answers)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_inner(self) -> Vec<String> {
        self.0
    }
}

/// Browser viewport dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportSize {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
}

impl ViewportSize {
    /// Parse viewport size from "WIDTHxHEIGHT" format (e.g., "1920x1080")
    pub fn parse(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('x').collect();
        if parts.len() != 2 {
            anyhow::bail!("Invalid viewport format. Use WIDTHxHEIGHT (e.g., 1920x1080)");
        }

        let width = parts[0]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid width in viewport size"))?;
        let height = parts[1]
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("Invalid height in viewport size"))?;

        Ok(ViewportSize { width, height })
    }
}

/// What happened to one field during the write pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "value", rename_all = "snake_case")]
pub enum WriteOutcome {
    /// Value assigned (after truncation or numeric cleanup)
    Written(String),
    /// Option chosen, carrying its visible label
    Selected(String),
    /// Answer typed into a search widget
    Typed(String),
    /// File attached, carrying the file name
    Attached(String),
    /// No option matched the answer; the control is unchanged
    Unmatched,
    /// Blank answer, nothing written
    Skipped,
    /// The page rejected the write; the run carries on with the next field
    Failed(String),
}

impl WriteOutcome {
    /// True when the control now holds the answer
    pub fn is_applied(&self) -> bool {
        matches!(
            self,
            WriteOutcome::Written(_) | WriteOutcome::Selected(_) | WriteOutcome::Typed(_) | WriteOutcome::Attached(_)
        )
    }
}

/// Per-field line of a fill report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldReport {
    pub label: String,
    pub kind: String,
    pub answer: String,
    pub outcome: WriteOutcome,
}

/// Result of one complete fill run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillReport {
    pub run_id: String,
    pub fields_found: usize,
    pub files_found: usize,
    pub fields_written: usize,
    pub files_attached: usize,
    pub fields: Vec<FieldReport>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
