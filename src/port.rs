//! The page, seen as a capability.
//!
//! Scanning reads a [`DomSnapshot`]; every write goes back through the port,
//! addressed by the snapshot's [`NodeId`]s.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::dom::{DomSnapshot, NodeId};
use crate::profile::ResumeFile;
use crate::types::JobContext;

/// Events host pages listen for after a programmatic write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomEvent {
    Input,
    Change,
    Blur,
}

impl DomEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomEvent::Input => "input",
            DomEvent::Change => "change",
            DomEvent::Blur => "blur",
        }
    }
}

/// The events fired after every value write
pub const WRITE_EVENTS: &[DomEvent] = &[DomEvent::Input, DomEvent::Change, DomEvent::Blur];

/// Tone of an in-page notification banner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[async_trait]
pub trait DocumentPort: Send + Sync {
    /// Capture the current element tree
    async fn snapshot(&self) -> Result<DomSnapshot>;

    /// Visible page text (at most `limit` characters), title and URL
    async fn job_context(&self, limit: usize) -> Result<JobContext>;

    /// Assign `value` to an input or textarea
    async fn set_value(&self, node: NodeId, value: &str) -> Result<()>;

    /// Make `option` the selected option of `select`
    async fn select_option(&self, select: NodeId, option: NodeId) -> Result<()>;

    /// Check a radio button and click it
    async fn check(&self, radio: NodeId) -> Result<()>;

    /// Put `file` into a file input's file list
    async fn attach_file(&self, input: NodeId, file: &ResumeFile) -> Result<()>;

    async fn dispatch(&self, node: NodeId, events: &[DomEvent]) -> Result<()>;

    /// Tint the element for a moment as visual feedback
    async fn highlight(&self, node: NodeId) -> Result<()>;

    /// Set a Select2 widget through the page's own jQuery bridge.
    ///
    /// Returns `Ok(false)` when the page has no such bridge for `select`.
    async fn widget_select(&self, select: NodeId, answer: &str) -> Result<bool>;

    async fn click(&self, node: NodeId) -> Result<()>;

    /// Focus `node` and type `text` into it, firing input events
    async fn type_text(&self, node: NodeId, text: &str) -> Result<()>;

    /// Click the first unselected Select2 result. Returns `false` if none is shown.
    async fn pick_first_widget_result(&self) -> Result<bool>;

    /// Send an Enter keydown to `node`
    async fn press_enter(&self, node: NodeId) -> Result<()>;

    /// Show a banner on the page
    async fn notify(&self, message: &str, level: NoticeLevel) -> Result<()>;
}
