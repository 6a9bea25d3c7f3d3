//! Build a [`DomSnapshot`] from static HTML.
//!
//! There is no layout engine here, so "visible" means not hidden by the
//! `hidden` attribute, `type="hidden"`, or an inline `display:none` /
//! `visibility:hidden` on the element or an ancestor.

use ego_tree::NodeRef;
use scraper::{Html, Node};

use crate::dom::{DomChild, DomSnapshot, ElementNode, NodeId};

/// Elements whose content never renders as text
const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template"];

impl DomSnapshot {
    pub fn from_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        let mut nodes = Vec::new();
        for child in document.tree.root().children() {
            walk(child, None, true, &mut nodes);
        }
        DomSnapshot::new(nodes)
    }
}

fn walk(
    node: NodeRef<'_, Node>,
    parent: Option<NodeId>,
    parent_visible: bool,
    nodes: &mut Vec<ElementNode>,
) -> Option<DomChild> {
    match node.value() {
        Node::Text(text) => Some(DomChild::Text(String::from(&**text))),
        Node::Element(element) => {
            let tag = element.name().to_ascii_lowercase();
            if SKIPPED_TAGS.contains(&tag.as_str()) {
                return None;
            }

            let attrs = element
                .attrs()
                .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
                .collect();
            let mut el = ElementNode {
                tag,
                attrs,
                parent,
                ..Default::default()
            };
            el.visible = parent_visible && !hidden_by_markup(&el);
            el.disabled = el.has_attr("disabled");
            el.read_only = el.has_attr("readonly");
            el.style_width = inline_style(&el, "width").unwrap_or_default();

            let id = NodeId(nodes.len());
            let visible = el.visible;
            nodes.push(el);

            let children: Vec<DomChild> = node
                .children()
                .filter_map(|c| walk(c, Some(id), visible, nodes))
                .collect();
            nodes[id.0].children = children;
            nodes[id.0].value = initial_value(nodes, id);

            Some(DomChild::Element(id))
        }
        _ => None,
    }
}

fn hidden_by_markup(el: &ElementNode) -> bool {
    if el.is("head") || el.has_attr("hidden") {
        return true;
    }
    if el.is("input") && el.input_type().as_deref() == Some("hidden") {
        return true;
    }
    matches!(inline_style(el, "display").as_deref(), Some("none"))
        || matches!(inline_style(el, "visibility").as_deref(), Some("hidden"))
}

/// Value of one declaration in the inline `style` attribute
fn inline_style(el: &ElementNode, property: &str) -> Option<String> {
    el.attr("style")?.split(';').find_map(|decl| {
        let (name, value) = decl.split_once(':')?;
        (name.trim().eq_ignore_ascii_case(property)).then(|| {
            value
                .trim()
                .trim_end_matches("!important")
                .trim()
                .to_ascii_lowercase()
        })
    })
}

fn initial_value(nodes: &[ElementNode], id: NodeId) -> String {
    let snapshot_text = |id: NodeId| -> String {
        nodes[id.0]
            .children
            .iter()
            .filter_map(|c| match c {
                DomChild::Text(t) => Some(t.as_str()),
                DomChild::Element(_) => None,
            })
            .collect()
    };
    let el = &nodes[id.0];
    match el.tag.as_str() {
        "input" => el.attr("value").unwrap_or_default().to_string(),
        "textarea" => snapshot_text(id),
        "option" => el
            .attr("value")
            .map(str::to_string)
            .unwrap_or_else(|| snapshot_text(id).trim().to_string()),
        "select" => {
            let options: Vec<&ElementNode> = nodes[id.0 + 1..]
                .iter()
                .take_while(|n| n.parent.is_some_and(|p| p.0 >= id.0))
                .filter(|n| n.is("option"))
                .collect();
            options
                .iter()
                .find(|o| o.has_attr("selected"))
                .or(options.first())
                .map(|o| o.value.clone())
                .unwrap_or_default()
        }
        _ => String::new(),
    }
}

#[cfg(test)]
#[path = "html_test.rs"]
mod html_test;
