//! Discover fillable controls in a page snapshot.

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::dom::{DomSnapshot, ElementNode, NodeId};
use crate::labels;
use crate::types::{FieldDescriptor, FieldKind, FileFieldDescriptor, RadioOption, ScanResult};

/// Input types treated as free text
const TEXT_INPUT_TYPES: &[&str] = &["text", "email", "tel", "url", "number"];

/// Class of the Select2 search box
const SELECT2_SEARCH_CLASS: &str = "select2-search__field";

/// Class of the Select2 container element
const SELECT2_CONTAINER_CLASS: &str = "select2-container";

/// Label used for file inputs nobody bothered to label
const DEFAULT_FILE_LABEL: &str = "File Upload";

/// Walk the snapshot once and describe every fillable control.
///
/// Non-radio fields come out in document order; radio groups follow in the
/// order their first button appears. File inputs are returned separately.
pub fn scan(dom: &DomSnapshot) -> ScanResult {
    let mut fields = Vec::new();
    let mut consumed: HashSet<NodeId> = HashSet::new();

    for (search, label, backing_select, container) in select2_search_fields(dom) {
        if let Some(select) = backing_select {
            consumed.insert(select);
        }
        fields.push(FieldDescriptor {
            node: search,
            label,
            kind: FieldKind::Select2Search {
                backing_select,
                container,
            },
            max_length: None,
        });
    }

    let backed_selects = select2_backed_selects(dom);
    let is_backed = |node: NodeId| backed_selects.iter().any(|(select, _)| *select == node);

    for node in dom.select(is_text_like) {
        let el = dom.node(node);
        if el.has_class(SELECT2_SEARCH_CLASS) || consumed.contains(&node) || is_backed(node) {
            continue;
        }
        if !is_fillable(el) {
            continue;
        }
        let Some(label) = labels::resolve(dom, node) else {
            debug!("Skipping unlabeled <{}> {}", el.tag, node);
            continue;
        };
        consumed.insert(node);
        fields.push(FieldDescriptor {
            node,
            label,
            kind: text_like_kind(el),
            max_length: el.attr("maxlength").and_then(|m| m.trim().parse().ok()),
        });
    }

    for (select, container) in backed_selects {
        if consumed.contains(&select) {
            continue;
        }
        if let Some(label) = labels::resolve(dom, select) {
            consumed.insert(select);
            fields.push(FieldDescriptor {
                node: select,
                label,
                kind: FieldKind::Select2 { container },
                max_length: None,
            });
        }
    }

    fields.sort_by_key(|f| f.node);
    fields.extend(radio_groups(dom));

    let files = file_fields(dom);

    debug!(
        "Scan found {} fields and {} file inputs",
        fields.len(),
        files.len()
    );
    ScanResult { fields, files }
}

fn is_text_like(el: &ElementNode) -> bool {
    match el.tag.as_str() {
        "textarea" | "select" => true,
        "input" => match el.input_type() {
            None => true,
            Some(t) => TEXT_INPUT_TYPES.contains(&t.as_str()),
        },
        _ => false,
    }
}

fn is_fillable(el: &ElementNode) -> bool {
    el.visible && !el.disabled && !el.read_only
}

fn text_like_kind(el: &ElementNode) -> FieldKind {
    match el.tag.as_str() {
        "textarea" => FieldKind::TextArea,
        "select" => FieldKind::Select,
        _ => FieldKind::Text {
            input_type: el.input_type().unwrap_or_else(|| "text".to_string()),
        },
    }
}

/// Select2 search inputs whose placeholder cleans to a usable label, paired
/// with that label, the native `<select>` they drive and their container
fn select2_search_fields(dom: &DomSnapshot) -> Vec<(NodeId, String, Option<NodeId>, Option<NodeId>)> {
    dom.select(|n| n.is("input") && n.has_class(SELECT2_SEARCH_CLASS))
        .filter(|input| is_wide_search_box(&dom.node(*input).style_width))
        .filter_map(|input| {
            let label = labels::clean_label(dom.attr(input, "placeholder")?);
            if label.is_empty() {
                return None;
            }
            let container = dom.closest(input, |n| n.has_class(SELECT2_CONTAINER_CLASS));
            let backing = container.and_then(|c| backing_select_for(dom, c));
            Some((input, label, backing, container))
        })
        .collect()
}

/// Select2 shrinks its inline search box to a few em when it is only an
/// internal helper. Real search boxes get a pixel width above 50.
fn is_wide_search_box(style_width: &str) -> bool {
    let width = style_width.trim();
    if width == "5.25em" {
        return false;
    }
    leading_number(width).is_some_and(|w| w > 50.0)
}

/// Parse the numeric prefix of a CSS length, like `parseFloat`
fn leading_number(s: &str) -> Option<f64> {
    let end = s
        .char_indices()
        .find(|(i, c)| !(c.is_ascii_digit() || *c == '.' || (*i == 0 && (*c == '-' || *c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    s[..end].parse().ok()
}

fn backing_select_for(dom: &DomSnapshot, container: NodeId) -> Option<NodeId> {
    let is_select = |id: &NodeId| dom.node(*id).is("select");
    dom.previous_element_sibling(container)
        .filter(is_select)
        .or_else(|| dom.next_element_sibling(container).filter(is_select))
        .or_else(|| {
            let controls = dom.attr(container, "aria-controls")?;
            let select2_id = controls.replace("-results", "");
            let select = dom
                .select(|n| n.is("select") && n.attr("data-select2-id") == Some(select2_id.as_str()))
                .next();
            select
        })
}

/// Native selects hidden behind a Select2 container
fn select2_backed_selects(dom: &DomSnapshot) -> Vec<(NodeId, NodeId)> {
    dom.select(|n| n.has_class(SELECT2_CONTAINER_CLASS))
        .filter_map(|container| {
            let select = match dom.attr(container, "aria-owns") {
                Some(owns) => dom
                    .get_element_by_id(&owns.replace("-results", ""))
                    .filter(|s| dom.node(*s).is("select")),
                None => dom
                    .previous_element_sibling(container)
                    .filter(|s| dom.node(*s).is("select")),
            }?;
            Some((select, container))
        })
        .collect()
}

fn radio_groups(dom: &DomSnapshot) -> Vec<FieldDescriptor> {
    let radios: Vec<NodeId> = dom
        .select(|n| n.is("input") && n.input_type().as_deref() == Some("radio"))
        .collect();

    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, FieldDescriptor> = HashMap::new();

    for radio in &radios {
        let el = dom.node(*radio);
        if !el.visible || el.disabled {
            continue;
        }
        let Some(name) = el.attr("name").filter(|n| !n.is_empty()) else {
            continue;
        };
        if groups.contains_key(name) {
            continue;
        }
        let Some(label) = labels::resolve_radio_group(dom, *radio) else {
            continue;
        };

        let options = radios
            .iter()
            .filter(|r| dom.attr(**r, "name") == Some(name))
            .map(|r| RadioOption {
                node: *r,
                label: labels::resolve_radio_option(dom, *r),
                value: dom.node(*r).value.clone(),
            })
            .collect();

        order.push(name.to_string());
        groups.insert(
            name.to_string(),
            FieldDescriptor {
                node: *radio,
                label,
                kind: FieldKind::RadioGroup {
                    name: name.to_string(),
                    options,
                },
                max_length: None,
            },
        );
    }

    order
        .into_iter()
        .filter_map(|name| groups.remove(&name))
        .collect()
}

fn file_fields(dom: &DomSnapshot) -> Vec<FileFieldDescriptor> {
    dom.select(|n| n.is("input") && n.input_type().as_deref() == Some("file"))
        .filter(|f| {
            let el = dom.node(*f);
            el.visible && !el.disabled
        })
        .map(|node| FileFieldDescriptor {
            node,
            label: labels::resolve(dom, node).unwrap_or_else(|| DEFAULT_FILE_LABEL.to_string()),
        })
        .collect()
}

#[cfg(test)]
#[path = "scanner_test.rs"]
mod scanner_test;
