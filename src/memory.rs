//! In-memory document: a snapshot plus a journal of every write.
//!
//! Backs `--html` dry runs and the tests of the scanner and writer.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Mutex;

use crate::dom::{DomSnapshot, NodeId};
use crate::port::{DocumentPort, DomEvent, NoticeLevel};
use crate::profile::ResumeFile;
use crate::types::JobContext;
use crate::writer::match_select_option;

/// One recorded write
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WriteAction {
    SetValue { node: NodeId, value: String },
    SelectOption { select: NodeId, option: NodeId, value: String },
    Check { node: NodeId },
    AttachFile { node: NodeId, name: String, mime_type: String, size: usize },
    Dispatch { node: NodeId, event: DomEvent },
    Highlight { node: NodeId },
    WidgetSelect { select: NodeId, answer: String },
    Click { node: NodeId },
    TypeText { node: NodeId, text: String },
    PressEnter { node: NodeId },
    Notify { message: String, level: NoticeLevel },
}

pub struct MemoryDocument {
    dom: Mutex<DomSnapshot>,
    url: String,
    widget_bridge: bool,
    journal: Mutex<Vec<WriteAction>>,
}

impl MemoryDocument {
    pub fn new(dom: DomSnapshot, url: &str) -> Self {
        MemoryDocument {
            dom: Mutex::new(dom),
            url: url.to_string(),
            widget_bridge: false,
            journal: Mutex::new(Vec::new()),
        }
    }

    pub fn from_html(html: &str, url: &str) -> Self {
        Self::new(DomSnapshot::from_html(html), url)
    }

    /// Pretend the page ships jQuery with Select2 attached
    pub fn with_widget_bridge(mut self) -> Self {
        self.widget_bridge = true;
        self
    }

    pub fn journal(&self) -> Vec<WriteAction> {
        self.journal.lock().map(|j| j.clone()).unwrap_or_default()
    }

    /// Current value of a control
    pub fn value(&self, node: NodeId) -> Option<String> {
        let dom = self.dom.lock().ok()?;
        dom.get(node).map(|n| n.value.clone())
    }

    pub fn is_checked(&self, node: NodeId) -> bool {
        self.dom
            .lock()
            .ok()
            .and_then(|dom| dom.get(node).map(|n| n.has_attr("checked")))
            .unwrap_or(false)
    }

    /// Events dispatched to `node`, in order
    pub fn events_for(&self, node: NodeId) -> Vec<DomEvent> {
        self.journal()
            .into_iter()
            .filter_map(|a| match a {
                WriteAction::Dispatch { node: n, event } if n == node => Some(event),
                _ => None,
            })
            .collect()
    }

    fn record(&self, action: WriteAction) {
        if let Ok(mut journal) = self.journal.lock() {
            journal.push(action);
        }
    }

    fn with_dom<T>(&self, f: impl FnOnce(&mut DomSnapshot) -> Result<T>) -> Result<T> {
        let mut dom = self
            .dom
            .lock()
            .map_err(|_| anyhow::anyhow!("document lock poisoned"))?;
        f(&mut dom)
    }
}

#[async_trait]
impl DocumentPort for MemoryDocument {
    async fn snapshot(&self) -> Result<DomSnapshot> {
        self.with_dom(|dom| Ok(dom.clone()))
    }

    async fn job_context(&self, limit: usize) -> Result<JobContext> {
        self.with_dom(|dom| {
            let text = dom.body().map(|b| dom.visible_text(b)).unwrap_or_default();
            Ok(JobContext::new(&text, &dom.title(), &self.url, limit))
        })
    }

    async fn set_value(&self, node: NodeId, value: &str) -> Result<()> {
        self.with_dom(|dom| {
            let el = dom.node_mut(node).with_context(|| format!("No element {}", node))?;
            el.value = value.to_string();
            Ok(())
        })?;
        self.record(WriteAction::SetValue {
            node,
            value: value.to_string(),
        });
        Ok(())
    }

    async fn select_option(&self, select: NodeId, option: NodeId) -> Result<()> {
        let value = self.with_dom(|dom| {
            let value = dom
                .get(option)
                .with_context(|| format!("No option {}", option))?
                .value
                .clone();
            for o in dom.options(select) {
                if let Some(el) = dom.node_mut(o) {
                    el.attrs.remove("selected");
                }
            }
            if let Some(el) = dom.node_mut(option) {
                el.attrs.insert("selected".to_string(), String::new());
            }
            let el = dom.node_mut(select).with_context(|| format!("No select {}", select))?;
            el.value = value.clone();
            Ok(value)
        })?;
        self.record(WriteAction::SelectOption {
            select,
            option,
            value,
        });
        Ok(())
    }

    async fn check(&self, radio: NodeId) -> Result<()> {
        self.with_dom(|dom| {
            let name = dom.attr(radio, "name").map(str::to_string);
            let group: Vec<NodeId> = dom
                .select(|n| n.is("input") && n.attr("name").map(str::to_string) == name)
                .collect();
            for r in group {
                if let Some(el) = dom.node_mut(r) {
                    el.attrs.remove("checked");
                }
            }
            let el = dom.node_mut(radio).with_context(|| format!("No radio {}", radio))?;
            el.attrs.insert("checked".to_string(), String::new());
            Ok(())
        })?;
        self.record(WriteAction::Check { node: radio });
        Ok(())
    }

    async fn attach_file(&self, input: NodeId, file: &ResumeFile) -> Result<()> {
        self.record(WriteAction::AttachFile {
            node: input,
            name: file.name.clone(),
            mime_type: file.mime_type.clone(),
            size: file.bytes.len(),
        });
        Ok(())
    }

    async fn dispatch(&self, node: NodeId, events: &[DomEvent]) -> Result<()> {
        for event in events {
            self.record(WriteAction::Dispatch {
                node,
                event: *event,
            });
        }
        Ok(())
    }

    async fn highlight(&self, node: NodeId) -> Result<()> {
        self.record(WriteAction::Highlight { node });
        Ok(())
    }

    async fn widget_select(&self, select: NodeId, answer: &str) -> Result<bool> {
        if !self.widget_bridge {
            return Ok(false);
        }
        let matched = self.with_dom(|dom| {
            let Some(option) = match_select_option(dom, select, answer) else {
                return Ok(false);
            };
            let value = dom.node(option).value.clone();
            for o in dom.options(select) {
                if let Some(el) = dom.node_mut(o) {
                    el.attrs.remove("selected");
                }
            }
            if let Some(el) = dom.node_mut(option) {
                el.attrs.insert("selected".to_string(), String::new());
            }
            if let Some(el) = dom.node_mut(select) {
                el.value = value;
            }
            Ok(true)
        })?;
        if matched {
            self.record(WriteAction::WidgetSelect {
                select,
                answer: answer.to_string(),
            });
        }
        Ok(matched)
    }

    async fn click(&self, node: NodeId) -> Result<()> {
        self.record(WriteAction::Click { node });
        Ok(())
    }

    async fn type_text(&self, node: NodeId, text: &str) -> Result<()> {
        self.with_dom(|dom| {
            if let Some(el) = dom.node_mut(node) {
                el.value = text.to_string();
            }
            Ok(())
        })?;
        self.record(WriteAction::TypeText {
            node,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn pick_first_widget_result(&self) -> Result<bool> {
        let result = self.with_dom(|dom| {
            let result = dom
                .select(|n| {
                    n.has_class("select2-results__option") && n.attr("aria-selected") == Some("false")
                })
                .next();
            Ok(result)
        })?;
        match result {
            Some(node) => {
                self.record(WriteAction::Click { node });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn press_enter(&self, node: NodeId) -> Result<()> {
        self.record(WriteAction::PressEnter { node });
        Ok(())
    }

    async fn notify(&self, message: &str, level: NoticeLevel) -> Result<()> {
        self.record(WriteAction::Notify {
            message: message.to_string(),
            level,
        });
        Ok(())
    }
}
