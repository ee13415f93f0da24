// File: src/dom/mod.rs
// Purpose: In-memory document model the validation layer reads and mutates

//! A small arena-backed DOM.
//!
//! Nodes are addressed by [`NodeId`], which doubles as element identity: the
//! per-form validation state and the message container associations are keyed
//! by it. Detached nodes stay in the arena so the engine can keep handles to
//! labels that were removed from the tree.

mod html;
mod selector;

pub use selector::Selector;

use crate::error::Result;
use serde::Serialize;
use std::collections::HashMap;

/// Handle to a node in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Element payload: tag, ordered attributes, element data and visibility
#[derive(Debug, Clone, Default)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    data: HashMap<String, NodeId>,
    hidden: bool,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Self::default()
        }
    }

    /// Lowercase tag name
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn attrs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .attrs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) => *existing = value,
            None => self.attrs.push((name.to_ascii_lowercase(), value)),
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
    }

    /// The `name` attribute, empty when absent
    pub fn name(&self) -> &str {
        self.attr("name").unwrap_or_default()
    }

    /// Lowercased `type` attribute (inputs default to `text`)
    pub fn input_type(&self) -> String {
        match self.attr("type") {
            Some(kind) => kind.to_ascii_lowercase(),
            None if self.tag == "input" => "text".to_string(),
            None => String::new(),
        }
    }

    /// True for the elements jQuery's `:input` pseudo-class matches
    pub fn is_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "select" | "textarea" | "button")
    }

    pub fn is_checkbox(&self) -> bool {
        self.tag == "input" && self.input_type() == "checkbox"
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = self
            .classes()
            .chain(std::iter::once(class))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr("class", joined);
    }

    pub fn remove_class(&mut self, class: &str) {
        if !self.has_class(class) {
            return;
        }
        let joined = self
            .classes()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr("class", joined);
    }

    /// Element data (the `$.data` store), holding node references
    pub fn data(&self, key: &str) -> Option<NodeId> {
        self.data.get(key).copied()
    }

    pub fn set_data(&mut self, key: impl Into<String>, node: NodeId) {
        self.data.insert(key.into(), node);
    }

    pub fn remove_data(&mut self, key: &str) -> Option<NodeId> {
        self.data.remove(key)
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }
}

#[derive(Debug, Clone)]
enum NodeData {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// Arena of nodes with a synthetic document root
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                data: NodeData::Document,
            }],
        }
    }

    /// Build a document from HTML markup
    pub fn parse_html(markup: &str) -> Self {
        html::parse(markup)
    }

    /// Nodes ever allocated, attached or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element(Element::new(tag)))
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(text.into()))
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.node(id)?.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.0)?.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Child elements only, skipping text
    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
            .collect()
    }

    /// Walks parent links, nearest first, excluding `id`
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            current: self.parent(id),
        }
    }

    /// Elements below `id` in document order, excluding `id`
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            if self.is_element(next) {
                out.push(next);
            }
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Nearest `form` ancestor
    pub fn closest_form(&self, id: NodeId) -> Option<NodeId> {
        self.ancestors(id)
            .find(|ancestor| self.element(*ancestor).is_some_and(|e| e.tag() == "form"))
    }

    /// True when the node is reachable from the document root
    pub fn is_attached(&self, id: NodeId) -> bool {
        id == self.root() || self.ancestors(id).any(|ancestor| ancestor == self.root())
    }

    /// Move `child` under `parent` as its last child
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.ancestors(parent).any(|a| a == child) {
            return;
        }
        self.detach(child);
        if let Some(node) = self.nodes.get_mut(child.0) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(child);
        }
    }

    /// Unlink a node from its parent; the node and its subtree stay in the arena
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.retain(|child| *child != id);
        }
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.parent = None;
        }
    }

    /// Remove every child of `id`
    pub fn empty(&mut self, id: NodeId) {
        for child in self.children(id).to_vec() {
            self.detach(child);
        }
    }

    /// Concatenated text of the subtree
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        if let NodeData::Text(text) = &node.data {
            out.push_str(text);
        }
        for child in &node.children {
            self.collect_text(*child, out);
        }
    }

    /// Replace the children of `id` with a single text node
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        let existing = self.children(id).iter().copied().find(|child| {
            matches!(self.node(*child).map(|n| &n.data), Some(NodeData::Text(_)))
        });
        self.empty(id);

        // An existing text node is rewritten in place so repeated updates
        // do not grow the arena
        let node = match existing {
            Some(node) => {
                if let Some(n) = self.nodes.get_mut(node.0) {
                    n.data = NodeData::Text(text.to_string());
                }
                node
            }
            None if text.is_empty() => return,
            None => self.create_text(text),
        };
        self.append_child(id, node);
    }

    /// Current value of a form control, the way `.val()` reports it
    pub fn value(&self, id: NodeId) -> String {
        let Some(element) = self.element(id) else {
            return String::new();
        };
        match element.tag() {
            "textarea" => self.text_content(id),
            "select" => {
                let options: Vec<NodeId> = self
                    .descendants(id)
                    .into_iter()
                    .filter(|o| self.element(*o).is_some_and(|e| e.tag() == "option"))
                    .collect();
                options
                    .iter()
                    .find(|o| self.element(**o).is_some_and(|e| e.has_attr("selected")))
                    .or_else(|| options.first())
                    .map(|o| self.option_value(*o))
                    .unwrap_or_default()
            }
            "input" if matches!(element.input_type().as_str(), "checkbox" | "radio") => {
                if element.has_attr("checked") {
                    element.attr("value").unwrap_or("on").to_string()
                } else {
                    String::new()
                }
            }
            _ => element.attr("value").unwrap_or_default().to_string(),
        }
    }

    fn option_value(&self, option: NodeId) -> String {
        match self.element(option).and_then(|e| e.attr("value")) {
            Some(value) => value.to_string(),
            None => self.text_content(option).trim().to_string(),
        }
    }

    /// Set the value of a form control (checkboxes and radios toggle `checked`)
    pub fn set_value(&mut self, id: NodeId, value: &str) {
        let Some(element) = self.element(id) else {
            return;
        };
        let tag = element.tag().to_string();
        let kind = element.input_type();
        let own_value = element.attr("value").map(str::to_string);
        match tag.as_str() {
            "textarea" => self.set_text(id, value),
            "select" => {
                let options: Vec<NodeId> = self
                    .descendants(id)
                    .into_iter()
                    .filter(|o| self.element(*o).is_some_and(|e| e.tag() == "option"))
                    .collect();
                for option in options {
                    let selected = self.option_value(option) == value;
                    if let Some(element) = self.element_mut(option) {
                        if selected {
                            element.set_attr("selected", "");
                        } else {
                            element.remove_attr("selected");
                        }
                    }
                }
            }
            "input" if matches!(kind.as_str(), "checkbox" | "radio") => {
                let checked = !value.is_empty()
                    && own_value.map_or(true, |v| v == value || value == "on");
                if let Some(element) = self.element_mut(id) {
                    if checked {
                        element.set_attr("checked", "");
                    } else {
                        element.remove_attr("checked");
                    }
                }
            }
            _ => {
                if let Some(element) = self.element_mut(id) {
                    element.set_attr("value", value);
                }
            }
        }
    }

    /// Elements below `scope` matching `selector` (jQuery `.find`)
    pub fn find(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let selector = Selector::parse(selector)?;
        Ok(self.find_with(scope, &selector))
    }

    pub fn find_with(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.element(*id).is_some_and(|e| selector.matches(e)))
            .collect()
    }

    /// Every element in the document matching `selector`
    pub fn select(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.find(self.root(), selector)
    }

    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        self.element(id).is_some_and(|e| selector.matches(e))
    }
}

/// Iterator over parent links, see [`Document::ancestors`]
pub struct Ancestors<'a> {
    doc: &'a Document,
    current: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        self.current = self.doc.parent(current);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_manipulation() {
        let mut element = Element::new("span");
        element.add_class("field-validation-valid");
        element.add_class("field-validation-valid");
        assert_eq!(element.attr("class"), Some("field-validation-valid"));

        element.add_class("extra");
        element.remove_class("field-validation-valid");
        assert_eq!(element.attr("class"), Some("extra"));
        assert!(!element.has_class("field-validation-valid"));
    }

    #[test]
    fn test_append_moves_node() {
        let mut doc = Document::new();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        let span = doc.create_element("span");
        doc.append_child(doc.root(), a);
        doc.append_child(doc.root(), b);
        doc.append_child(a, span);
        doc.append_child(b, span);

        assert!(doc.children(a).is_empty());
        assert_eq!(doc.children(b), &[span]);
        assert_eq!(doc.parent(span), Some(b));
    }

    #[test]
    fn test_empty_detaches_children() {
        let mut doc = Document::parse_html("<div id=\"box\"><span>one</span><b>two</b></div>");
        let div = doc.select("#box").unwrap()[0];
        let span = doc.find(div, "span").unwrap()[0];
        doc.empty(div);

        assert_eq!(doc.text_content(div), "");
        assert!(!doc.is_attached(span));
        assert!(doc.element(span).is_some());
    }

    #[test]
    fn test_set_text_rewrites_in_place() {
        let mut doc = Document::new();
        let label = doc.create_element("span");
        doc.set_text(label, "first");
        let count = doc.node_count();

        doc.set_text(label, "");
        doc.set_text(label, "second");
        doc.set_text(label, "third");

        assert_eq!(doc.text_content(label), "third");
        assert_eq!(doc.children(label).len(), 1);
        assert_eq!(doc.node_count(), count);
    }

    #[test]
    fn test_closest_form() {
        let doc = Document::parse_html(
            r#"<form id="f"><fieldset><input name="a"></fieldset></form><input name="b">"#,
        );
        let a = doc.select("[name=a]").unwrap()[0];
        let b = doc.select("[name=b]").unwrap()[0];
        let form = doc.select("form").unwrap()[0];

        assert_eq!(doc.closest_form(a), Some(form));
        assert_eq!(doc.closest_form(b), None);
    }

    #[test]
    fn test_values() {
        let mut doc = Document::parse_html(
            r#"<input name="t" value="x">
               <input type="checkbox" name="c">
               <textarea name="ta">hello</textarea>
               <select name="s"><option value="1">One</option><option selected>Two</option></select>"#,
        );
        let t = doc.select("[name=t]").unwrap()[0];
        let c = doc.select("[name=c]").unwrap()[0];
        let ta = doc.select("[name=ta]").unwrap()[0];
        let s = doc.select("[name=s]").unwrap()[0];

        assert_eq!(doc.value(t), "x");
        assert_eq!(doc.value(c), "");
        assert_eq!(doc.value(ta), "hello");
        assert_eq!(doc.value(s), "Two");

        doc.set_value(c, "on");
        doc.set_value(s, "1");
        doc.set_value(t, "y");
        assert_eq!(doc.value(c), "on");
        assert_eq!(doc.value(s), "1");
        assert_eq!(doc.value(t), "y");
    }
}
