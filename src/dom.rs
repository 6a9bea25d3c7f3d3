//! Read-only element tree captured from a page.
//!
//! Nodes are stored in document order, so comparing two [`NodeId`]s compares
//! their position in the page.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Index of an element inside a [`DomSnapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Child of an element: another element or a run of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomChild {
    Element(NodeId),
    Text(String),
}

/// One element of the page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementNode {
    /// Lowercase tag name
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<DomChild>,
    #[serde(default)]
    pub parent: Option<NodeId>,
    /// Element has a rendered box
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub read_only: bool,
    /// Current value for form controls, effective value for `<option>`
    #[serde(default)]
    pub value: String,
    /// Inline `style.width`, empty when unset
    #[serde(default)]
    pub style_width: String,
}

impl ElementNode {
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id").filter(|id| !id.is_empty())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    /// Lowercased `type` attribute, `None` when the attribute is absent
    pub fn input_type(&self) -> Option<String> {
        self.attr("type").map(|t| t.trim().to_ascii_lowercase())
    }
}

/// Arena of elements in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomSnapshot {
    pub nodes: Vec<ElementNode>,
}

impl DomSnapshot {
    pub fn new(nodes: Vec<ElementNode>) -> Self {
        DomSnapshot { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &ElementNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&ElementNode> {
        self.nodes.get(id.0)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut ElementNode> {
        self.nodes.get_mut(id.0)
    }

    /// All element ids in document order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Elements matching `pred`, in document order
    pub fn select<'a>(
        &'a self,
        pred: impl Fn(&ElementNode) -> bool + 'a,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.ids().filter(move |id| pred(self.node(*id)))
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id).attr(name)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Ancestors from the parent upwards
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |p| self.parent(*p))
    }

    /// Like DOM `closest`: the element itself or its nearest matching ancestor
    pub fn closest(&self, id: NodeId, pred: impl Fn(&ElementNode) -> bool) -> Option<NodeId> {
        std::iter::once(id)
            .chain(self.ancestors(id))
            .find(|n| pred(self.node(*n)))
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id).children.iter().filter_map(|c| match c {
            DomChild::Element(e) => Some(*e),
            DomChild::Text(_) => None,
        })
    }

    pub fn previous_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings: Vec<NodeId> = self.element_children(parent).collect();
        let pos = siblings.iter().position(|s| *s == id)?;
        pos.checked_sub(1).map(|p| siblings[p])
    }

    pub fn next_element_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let mut siblings = self.element_children(parent).skip_while(|s| *s != id);
        siblings.next()?;
        siblings.next()
    }

    /// Descendants (not including `id`) in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.element_children(id).collect();
        stack.reverse();
        while let Some(next) = stack.pop() {
            out.push(next);
            let mut children: Vec<NodeId> = self.element_children(next).collect();
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// First descendant matching `pred`, like `querySelector` scoped to `id`
    pub fn find_descendant(
        &self,
        id: NodeId,
        pred: impl Fn(&ElementNode) -> bool,
    ) -> Option<NodeId> {
        self.descendants(id)
            .into_iter()
            .find(|d| pred(self.node(*d)))
    }

    pub fn get_element_by_id(&self, element_id: &str) -> Option<NodeId> {
        self.select(|n| n.id() == Some(element_id)).next()
    }

    pub fn body(&self) -> Option<NodeId> {
        self.select(|n| n.is("body")).next()
    }

    pub fn title(&self) -> String {
        self.select(|n| n.is("title"))
            .next()
            .map(|t| self.text_content(t).trim().to_string())
            .unwrap_or_default()
    }

    /// Concatenated text of the element and all its descendants
    pub fn text_content(&self, id: NodeId) -> String {
        self.text_content_without(id, |_| false)
    }

    /// Text content skipping every subtree whose root matches `skip`.
    /// `id` itself is never skipped.
    pub fn text_content_without(&self, id: NodeId, skip: impl Fn(&ElementNode) -> bool) -> String {
        let mut out = String::new();
        self.collect_text(id, &skip, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, skip: &dyn Fn(&ElementNode) -> bool, out: &mut String) {
        for child in &self.node(id).children {
            match child {
                DomChild::Text(text) => out.push_str(text),
                DomChild::Element(e) => {
                    if !skip(self.node(*e)) {
                        self.collect_text(*e, skip, out);
                    }
                }
            }
        }
    }

    /// `<option>` elements of a `<select>`, including those inside `<optgroup>`
    pub fn options(&self, select: NodeId) -> Vec<NodeId> {
        self.descendants(select)
            .into_iter()
            .filter(|d| self.node(*d).is("option"))
            .collect()
    }

    /// Visible text with whitespace collapsed per line, roughly `innerText`
    pub fn visible_text(&self, id: NodeId) -> String {
        let text = self.text_content_without(id, |n| !n.visible && !n.is("body"));
        text.lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
#[path = "dom_test.rs"]
mod dom_test;
