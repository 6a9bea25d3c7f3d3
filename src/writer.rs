//! Write answers back into the page.
//!
//! One handler per [`FieldKind`]; every successful write fires `input`,
//! `change` and `blur` and tints the control for a moment.

use anyhow::Result;
use tracing::{debug, info};

use crate::config::WriterSettings;
use crate::dom::{DomSnapshot, NodeId};
use crate::port::{DocumentPort, DomEvent, WRITE_EVENTS};
use crate::profile::ResumeFile;
use crate::types::{FieldDescriptor, FieldKind, FileFieldDescriptor, RadioOption, WriteOutcome};

pub struct FieldWriter<'a, D: DocumentPort + ?Sized> {
    port: &'a D,
    dom: &'a DomSnapshot,
    settings: &'a WriterSettings,
    default_text_limit: usize,
}

impl<'a, D: DocumentPort + ?Sized> FieldWriter<'a, D> {
    pub fn new(
        port: &'a D,
        dom: &'a DomSnapshot,
        settings: &'a WriterSettings,
        default_text_limit: usize,
    ) -> Self {
        FieldWriter {
            port,
            dom,
            settings,
            default_text_limit,
        }
    }

    /// Apply one answer. Blank answers leave the field untouched.
    pub async fn apply(&self, field: &FieldDescriptor, answer: &str) -> Result<WriteOutcome> {
        if answer.trim().is_empty() {
            debug!("Skipping empty value for \"{}\"", field.label);
            return Ok(WriteOutcome::Skipped);
        }

        let outcome = match &field.kind {
            FieldKind::Text { .. } | FieldKind::TextArea => self.write_text(field, answer).await?,
            FieldKind::Select => self.write_select(field.node, answer).await?,
            FieldKind::Select2 { container } => {
                let outcome = self.write_select(field.node, answer).await?;
                if self.settings.highlight {
                    self.port.highlight(*container).await?;
                }
                outcome
            }
            FieldKind::RadioGroup { options, .. } => self.write_radio(options, answer).await?,
            FieldKind::Select2Search {
                backing_select,
                container,
            } => {
                self.write_search_widget(field.node, *backing_select, *container, answer)
                    .await?
            }
        };

        match &outcome {
            WriteOutcome::Unmatched => info!("No matching option for \"{}\": {:?}", field.label, answer),
            other => debug!("Filled \"{}\": {:?}", field.label, other),
        }
        Ok(outcome)
    }

    /// Attach the stored résumé to a file input
    pub async fn attach(&self, field: &FileFieldDescriptor, file: &ResumeFile) -> Result<WriteOutcome> {
        self.port.attach_file(field.node, file).await?;
        self.port.dispatch(field.node, &[DomEvent::Change]).await?;
        if self.settings.highlight
            && let Some(parent) = self.dom.parent(field.node)
        {
            self.port.highlight(parent).await?;
        }
        info!("Uploaded {} to \"{}\"", file.name, field.label);
        Ok(WriteOutcome::Attached(file.name.clone()))
    }

    async fn write_text(&self, field: &FieldDescriptor, answer: &str) -> Result<WriteOutcome> {
        let answer = if field.kind.is_numeric() {
            numeric_only(answer)
        } else {
            answer.to_string()
        };
        let value = match field.char_limit(self.default_text_limit) {
            Some(limit) if answer.chars().count() > limit => {
                info!(
                    "Answer for \"{}\" is {} chars, truncating to {}",
                    field.label,
                    answer.chars().count(),
                    limit
                );
                truncate_chars(&answer, limit)
            }
            _ => answer,
        };

        self.port.set_value(field.node, &value).await?;
        self.after_write(field.node).await?;
        Ok(WriteOutcome::Written(value))
    }

    async fn write_select(&self, select: NodeId, answer: &str) -> Result<WriteOutcome> {
        let outcome = match match_select_option(self.dom, select, answer) {
            Some(option) => {
                self.port.select_option(select, option).await?;
                WriteOutcome::Selected(option_text(self.dom, option))
            }
            None => WriteOutcome::Unmatched,
        };
        self.after_write(select).await?;
        Ok(outcome)
    }

    async fn write_radio(&self, options: &[RadioOption], answer: &str) -> Result<WriteOutcome> {
        let Some(option) = match_radio_option(options, answer) else {
            return Ok(WriteOutcome::Unmatched);
        };
        self.port.check(option.node).await?;
        self.port.dispatch(option.node, WRITE_EVENTS).await?;
        if self.settings.highlight
            && let Some(parent) = self.dom.parent(option.node)
        {
            self.port.highlight(parent).await?;
        }
        Ok(WriteOutcome::Selected(option.label.clone()))
    }

    async fn write_search_widget(
        &self,
        input: NodeId,
        backing_select: Option<NodeId>,
        container: Option<NodeId>,
        answer: &str,
    ) -> Result<WriteOutcome> {
        if let Some(select) = backing_select
            && self.port.widget_select(select, answer).await?
        {
            debug!("Set Select2 through the page bridge: {:?}", answer);
            if self.settings.highlight
                && let Some(container) = container
            {
                self.port.highlight(container).await?;
            }
            return Ok(WriteOutcome::Typed(answer.to_string()));
        }

        if let Some(container) = container {
            self.port.click(container).await?;
        }
        tokio::time::sleep(self.settings.widget_open_delay()).await;

        self.port.type_text(input, answer).await?;
        tokio::time::sleep(self.settings.widget_results_delay()).await;

        if !self.port.pick_first_widget_result().await? {
            self.port.press_enter(input).await?;
        }
        if self.settings.highlight
            && let Some(container) = container
        {
            self.port.highlight(container).await?;
        }
        Ok(WriteOutcome::Typed(answer.to_string()))
    }

    async fn after_write(&self, node: NodeId) -> Result<()> {
        self.port.dispatch(node, WRITE_EVENTS).await?;
        if self.settings.highlight {
            self.port.highlight(node).await?;
        }
        Ok(())
    }
}

/// First `max` characters of `s`
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Keep digits and decimal points only: `"$50,000"` becomes `"50000"`
pub fn numeric_only(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect()
}

fn option_text(dom: &DomSnapshot, option: NodeId) -> String {
    dom.text_content(option).trim().to_string()
}

/// First option, in document order, whose text or value contains the answer,
/// or whose text is contained in the answer. Case-insensitive.
pub fn match_select_option(dom: &DomSnapshot, select: NodeId, answer: &str) -> Option<NodeId> {
    let answer = answer.trim().to_lowercase();
    dom.options(select).into_iter().find(|option| {
        let text = option_text(dom, *option).to_lowercase();
        let value = dom.node(*option).value.to_lowercase();
        text.contains(&answer) || value.contains(&answer) || (!text.is_empty() && answer.contains(&text))
    })
}

/// First radio option whose label contains the answer or is contained in it
/// (case-insensitive), or whose value equals the answer exactly
pub fn match_radio_option<'o>(options: &'o [RadioOption], answer: &str) -> Option<&'o RadioOption> {
    let lowered = answer.trim().to_lowercase();
    options.iter().find(|option| {
        let label = option.label.trim().to_lowercase();
        (!label.is_empty() && (label.contains(&lowered) || lowered.contains(&label)))
            || option.value == answer
    })
}

#[cfg(test)]
#[path = "writer_test.rs"]
mod writer_test;
