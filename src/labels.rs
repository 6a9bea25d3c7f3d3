//! Question text for form controls.
//!
//! Each source is a pure function over the snapshot. Sources are tried in
//! order and the first one that yields a non-empty cleaned label wins.

use tracing::trace;

use crate::dom::{DomSnapshot, ElementNode, NodeId};

type LabelSource = fn(&DomSnapshot, NodeId) -> Option<String>;

/// Lookup order for ordinary controls
const FIELD_LABEL_SOURCES: &[(&str, LabelSource)] = &[
    ("placeholder", from_placeholder),
    ("label[for]", from_label_for),
    ("wrapping label", from_wrapping_label),
    ("layout wrapper", from_layout_wrapper),
    ("previous sibling", from_previous_sibling),
    ("aria-label", from_aria_label),
    ("name", from_name),
];

/// Lookup order for the question of a radio group
const RADIO_GROUP_SOURCES: &[(&str, LabelSource)] = &[
    ("question container", from_question_container),
    ("aria-labelledby", from_aria_labelledby),
    ("name", from_name),
];

/// Wrapper classes common in Bootstrap-style form layouts
const LAYOUT_WRAPPER_CLASSES: &[&str] = &["col-md-4", "col-xs-12", "form-group", "field-wrapper"];

/// Class fragments used by known applicant-tracking sites for option text
const OPTION_TEXT_CLASS_FRAGMENTS: &[&str] = &["1hx0a07", "eu4oa1w0"];

/// Resolve the label of an ordinary control
pub fn resolve(dom: &DomSnapshot, node: NodeId) -> Option<String> {
    first_label(dom, node, FIELD_LABEL_SOURCES)
}

/// Resolve the question shared by a radio group, given any of its buttons
pub fn resolve_radio_group(dom: &DomSnapshot, radio: NodeId) -> Option<String> {
    first_label(dom, radio, RADIO_GROUP_SOURCES)
}

/// Visible text of a single radio option, falling back to its value
pub fn resolve_radio_option(dom: &DomSnapshot, radio: NodeId) -> String {
    if let Some(label) = dom.closest(radio, |n| n.is("label")) {
        let span = dom
            .find_descendant(label, |n| {
                n.is("span")
                    && n.attr("class").is_some_and(|c| {
                        OPTION_TEXT_CLASS_FRAGMENTS.iter().any(|f| c.contains(f))
                    })
            })
            .or_else(|| {
                dom.descendants(label).into_iter().find(|d| {
                    dom.node(*d).is("span") && is_last_element_child(dom, *d)
                })
            });
        if let Some(span) = span {
            let text = dom.text_content(span).trim().to_string();
            if !text.is_empty() {
                return text;
            }
        }

        let text = dom
            .text_content_without(label, |n| n.is("input"))
            .trim()
            .to_string();
        if !text.is_empty() {
            return text;
        }
    }

    dom.node(radio).value.clone()
}

fn first_label(dom: &DomSnapshot, node: NodeId, sources: &[(&str, LabelSource)]) -> Option<String> {
    for (name, source) in sources {
        if let Some(raw) = source(dom, node) {
            let label = clean_label(&raw);
            if !label.is_empty() {
                trace!("Label for {} from {}: {:?}", node, name, label);
                return Some(label);
            }
        }
    }
    None
}

/// Normalize raw label text.
///
/// Drops asterisks and colons, collapses whitespace and removes the
/// `(required)` / `(optional)` markers in any letter case.
pub fn clean_label(raw: &str) -> String {
    let stripped: String = raw.chars().filter(|c| *c != '*' && *c != ':').collect();
    let stripped = remove_ignore_ascii_case(&stripped, "(required)");
    let stripped = remove_ignore_ascii_case(&stripped, "(optional)");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn remove_ignore_ascii_case(haystack: &str, needle: &str) -> String {
    let needle = needle.as_bytes();
    let bytes = haystack.as_bytes();
    let mut out = String::with_capacity(haystack.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes.len() - i >= needle.len() && bytes[i..i + needle.len()].eq_ignore_ascii_case(needle) {
            i += needle.len();
            continue;
        }
        // needle is ASCII, so `i` always sits on a char boundary here
        let ch = haystack[i..].chars().next().unwrap_or_default();
        out.push(ch);
        i += ch.len_utf8().max(1);
    }
    out
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn is_form_control(n: &ElementNode) -> bool {
    n.is("input") || n.is("textarea") || n.is("select")
}

fn is_last_element_child(dom: &DomSnapshot, id: NodeId) -> bool {
    dom.parent(id)
        .and_then(|p| dom.element_children(p).last())
        .is_some_and(|last| last == id)
}

fn from_placeholder(dom: &DomSnapshot, node: NodeId) -> Option<String> {
    dom.attr(node, "placeholder").and_then(non_blank)
}

fn from_label_for(dom: &DomSnapshot, node: NodeId) -> Option<String> {
    let id = dom.node(node).id()?;
    let label = dom
        .select(|n| n.is("label") && n.attr("for") == Some(id))
        .next()?;
    non_blank(&dom.text_content(label))
}

fn from_wrapping_label(dom: &DomSnapshot, node: NodeId) -> Option<String> {
    let label = dom.closest(node, |n| n.is("label"))?;
    non_blank(&dom.text_content_without(label, is_form_control))
}

fn from_layout_wrapper(dom: &DomSnapshot, node: NodeId) -> Option<String> {
    let wrapper = dom.closest(node, |n| {
        LAYOUT_WRAPPER_CLASSES.iter().any(|c| n.has_class(c))
    })?;
    let label = dom.find_descendant(wrapper, |n| n.is("label"))?;
    non_blank(&dom.text_content(label))
}

fn from_previous_sibling(dom: &DomSnapshot, node: NodeId) -> Option<String> {
    let prev = dom.previous_element_sibling(node)?;
    if !dom.node(prev).is("label") {
        return None;
    }
    non_blank(&dom.text_content(prev))
}

fn from_aria_label(dom: &DomSnapshot, node: NodeId) -> Option<String> {
    dom.attr(node, "aria-label").and_then(non_blank)
}

fn from_name(dom: &DomSnapshot, node: NodeId) -> Option<String> {
    let name = dom.attr(node, "name")?;
    non_blank(&name.replace(['_', '-'], " "))
}

/// Heading-style question text inside the nearest `data-testid*="input-"` container
fn from_question_container(dom: &DomSnapshot, radio: NodeId) -> Option<String> {
    let container = dom.closest(radio, |n| {
        n.attr("data-testid").is_some_and(|t| t.contains("input-"))
    })?;
    let label = dom
        .find_descendant(container, |n| {
            n.is("label") && n.attr("id").is_some_and(|id| id.contains("label"))
        })
        .or_else(|| {
            dom.find_descendant(container, |n| {
                n.is("label") && n.attr("class").is_some_and(|c| c.contains("10g55w1"))
            })
        })?;

    let heading = dom
        .find_descendant(label, |n| {
            n.attr("data-testid")
                .is_some_and(|t| t.contains("label") && !t.contains("asterisk"))
        })
        .or_else(|| {
            dom.find_descendant(label, |n| {
                n.is("span") && n.attr("data-testid") == Some("safe-markup")
            })
        });
    if let Some(heading) = heading
        && let Some(text) = non_blank(&dom.text_content(heading))
    {
        return Some(text);
    }

    non_blank(&dom.text_content_without(label, |n| {
        n.attr("data-testid").is_some_and(|t| t.contains("asterisk"))
    }))
}

fn from_aria_labelledby(dom: &DomSnapshot, radio: NodeId) -> Option<String> {
    let target = dom.attr(radio, "aria-labelledby")?;
    let label = dom.get_element_by_id(target.trim())?;
    non_blank(&dom.text_content(label))
}

#[cfg(test)]
#[path = "labels_test.rs"]
mod labels_test;
