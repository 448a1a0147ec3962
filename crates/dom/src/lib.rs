//! A small in-memory document: an element tree with attributes, class lists,
//! simple selector queries, text/markup content and bubbling event listeners.
//!
//! Nodes are `Rc` handles, mirroring how DOM element references behave: a
//! subtree removed from the document lives only as long as someone still
//! holds a handle into it. Everything here is single-threaded.

use std::{
    cell::RefCell,
    fmt,
    hash::{Hash, Hasher},
    rc::{Rc, Weak},
};

use scraper::Html;
use shared::{protocol::CustomEvent, surface::Element};
use tracing::warn;

pub mod selector;

pub use selector::{Selector, SelectorError};
use selector::Subject;

type ListenerFn = Rc<dyn Fn(&DispatchedEvent)>;

/// An event as seen by a listener while it travels up the tree.
#[derive(Debug, Clone)]
pub struct DispatchedEvent {
    pub event: CustomEvent,
    pub target: Node,
    pub current_target: Node,
}

enum NodeKind {
    Element {
        tag: String,
        classes: Vec<String>,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    /// Markup assigned through `set_inner_html`, kept verbatim.
    Markup(String),
}

struct NodeData {
    kind: NodeKind,
    parent: Weak<RefCell<NodeData>>,
    children: Vec<Node>,
    listeners: Vec<(String, ListenerFn)>,
}

struct ElementView<'a> {
    tag: &'a str,
    classes: &'a [String],
    attributes: &'a [(String, String)],
}

impl Subject for ElementView<'_> {
    fn tag(&self) -> &str {
        self.tag
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

impl NodeData {
    fn view(&self) -> Option<ElementView<'_>> {
        match &self.kind {
            NodeKind::Element {
                tag,
                classes,
                attributes,
            } => Some(ElementView {
                tag,
                classes,
                attributes,
            }),
            _ => None,
        }
    }
}

/// Owner of the `body` element; creates detached elements.
#[derive(Clone)]
pub struct Document {
    body: Node,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document with an empty `body` element.
    pub fn new() -> Self {
        Self {
            body: Node::new_element("body"),
        }
    }

    pub fn body(&self) -> Node {
        self.body.clone()
    }

    /// Creates a detached element.
    pub fn create_element(&self, tag: &str) -> Node {
        Node::new_element(&tag.to_ascii_lowercase())
    }

    pub fn element_by_id(&self, id: &str) -> Option<Node> {
        if self.body.attribute("id").as_deref() == Some(id) {
            return Some(self.body());
        }
        self.body.query_selector(&format!("[id=\"{id}\"]"))
    }
}

/// Handle onto one node of a document.
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeData>>);

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as usize).hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node").field("tag", &self.tag()).finish()
    }
}

impl Node {
    fn from_kind(kind: NodeKind) -> Self {
        Self(Rc::new(RefCell::new(NodeData {
            kind,
            parent: Weak::new(),
            children: Vec::new(),
            listeners: Vec::new(),
        })))
    }

    fn new_element(tag: &str) -> Self {
        Self::from_kind(NodeKind::Element {
            tag: tag.to_string(),
            classes: Vec::new(),
            attributes: Vec::new(),
        })
    }

    /// Tag name for elements, `None` for text and markup nodes.
    pub fn tag(&self) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { tag, .. } => Some(tag.clone()),
            _ => None,
        }
    }

    pub fn class_names(&self) -> Vec<String> {
        match &self.0.borrow().kind {
            NodeKind::Element { classes, .. } => classes.clone(),
            _ => Vec::new(),
        }
    }

    /// Moves `child` (and its subtree) to the end of this element.
    pub fn append_child(&self, child: &Node) {
        child.detach();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child.clone());
    }

    fn detach(&self) {
        let parent = self.0.borrow().parent.upgrade();
        if let Some(parent) = parent {
            parent.borrow_mut().children.retain(|c| c != self);
        }
        self.0.borrow_mut().parent = Weak::new();
    }

    fn replace_children(&self, kind: Option<NodeKind>) {
        let old = std::mem::take(&mut self.0.borrow_mut().children);
        for child in &old {
            child.0.borrow_mut().parent = Weak::new();
        }
        if let Some(kind) = kind {
            self.append_child(&Node::from_kind(kind));
        }
    }

    pub fn with_class(self, class: &str) -> Self {
        self.toggle_class(class, true);
        self
    }

    pub fn with_id(self, id: &str) -> Self {
        self.set_attribute("id", id);
        self
    }

    pub fn with_attr(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(self, child: Node) -> Self {
        self.append_child(&child);
        self
    }

    /// Concatenated text; assigned markup contributes its decoded text.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Markup(markup) => {
                let fragment = Html::parse_fragment(markup);
                out.extend(fragment.root_element().text());
            }
            NodeKind::Element { .. } => {
                for child in &data.children {
                    child.collect_text(out);
                }
            }
        }
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.0.borrow().children {
            child.serialize(&mut out);
        }
        out
    }

    pub fn outer_html(&self) -> String {
        let mut out = String::new();
        self.serialize(&mut out);
        out
    }

    fn serialize(&self, out: &mut String) {
        let data = self.0.borrow();
        match &data.kind {
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Markup(markup) => out.push_str(markup),
            NodeKind::Element {
                tag,
                classes,
                attributes,
            } => {
                out.push('<');
                out.push_str(tag);
                if !classes.is_empty() {
                    out.push_str(&format!(" class=\"{}\"", escape_attr(&classes.join(" "))));
                }
                for (name, value) in attributes {
                    out.push_str(&format!(" {name}=\"{}\"", escape_attr(value)));
                }
                out.push('>');
                for child in &data.children {
                    child.serialize(out);
                }
                out.push_str(&format!("</{tag}>"));
            }
        }
    }

    pub fn add_event_listener(&self, name: &str, listener: impl Fn(&DispatchedEvent) + 'static) {
        self.0
            .borrow_mut()
            .listeners
            .push((name.to_string(), Rc::new(listener)));
    }

    fn descendants(&self, out: &mut Vec<Node>) {
        for child in &self.0.borrow().children {
            out.push(child.clone());
            child.descendants(out);
        }
    }

    fn matches_parsed(&self, selector: &Selector) -> bool {
        self.0
            .borrow()
            .view()
            .is_some_and(|view| selector.matches(&view))
    }

    fn edit_element(&self, edit: impl FnOnce(&mut Vec<String>, &mut Vec<(String, String)>)) {
        if let NodeKind::Element {
            classes,
            attributes,
            ..
        } = &mut self.0.borrow_mut().kind
        {
            edit(classes, attributes);
        }
    }

    fn parse_selector(selector: &str) -> Option<Selector> {
        match selector.parse::<Selector>() {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(selector, error = %err, "dom: ignoring invalid selector");
                None
            }
        }
    }
}

impl Element for Node {
    fn attribute(&self, name: &str) -> Option<String> {
        match &self.0.borrow().kind {
            NodeKind::Element {
                classes,
                attributes,
                ..
            } => {
                if name == "class" {
                    return (!classes.is_empty()).then(|| classes.join(" "));
                }
                attributes
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, v)| v.clone())
            }
            _ => None,
        }
    }

    fn set_attribute(&self, name: &str, value: &str) {
        self.edit_element(|classes, attributes| {
            if name == "class" {
                *classes = Vec::new();
                for class in value.split_whitespace() {
                    if !classes.iter().any(|c| c == class) {
                        classes.push(class.to_string());
                    }
                }
                return;
            }
            match attributes.iter_mut().find(|(n, _)| n == name) {
                Some((_, existing)) => *existing = value.to_string(),
                None => attributes.push((name.to_string(), value.to_string())),
            }
        });
    }

    fn remove_attribute(&self, name: &str) {
        self.edit_element(|classes, attributes| {
            if name == "class" {
                classes.clear();
            } else {
                attributes.retain(|(n, _)| n != name);
            }
        });
    }

    fn has_class(&self, class: &str) -> bool {
        self.class_names().iter().any(|c| c == class)
    }

    fn toggle_class(&self, class: &str, on: bool) {
        if class.is_empty() {
            return;
        }
        self.edit_element(|classes, _| {
            let present = classes.iter().any(|c| c == class);
            if on && !present {
                classes.push(class.to_string());
            } else if !on && present {
                classes.retain(|c| c != class);
            }
        });
    }

    fn parent(&self) -> Option<Self> {
        let parent = self.0.borrow().parent.upgrade();
        parent.map(Node)
    }

    fn matches(&self, selector: &str) -> bool {
        Self::parse_selector(selector).is_some_and(|parsed| self.matches_parsed(&parsed))
    }

    fn query_selector_all(&self, selector: &str) -> Vec<Self> {
        let Some(parsed) = Self::parse_selector(selector) else {
            return Vec::new();
        };
        let mut nodes = Vec::new();
        self.descendants(&mut nodes);
        nodes.retain(|node| node.matches_parsed(&parsed));
        nodes
    }

    fn set_text_content(&self, text: &str) {
        self.replace_children((!text.is_empty()).then(|| NodeKind::Text(text.to_string())));
    }

    fn set_inner_html(&self, markup: &str) {
        self.replace_children((!markup.is_empty()).then(|| NodeKind::Markup(markup.to_string())));
    }

    fn dispatch_event(&self, event: &CustomEvent) {
        let mut path = vec![self.clone()];
        if event.bubbles {
            let mut current = self.parent();
            while let Some(node) = current {
                current = node.parent();
                path.push(node);
            }
        }

        for current_target in path {
            // Listeners run with the node unborrowed so they may touch it.
            let listeners: Vec<ListenerFn> = current_target
                .0
                .borrow()
                .listeners
                .iter()
                .filter(|(name, _)| *name == event.name)
                .map(|(_, listener)| Rc::clone(listener))
                .collect();
            if listeners.is_empty() {
                continue;
            }
            let dispatched = DispatchedEvent {
                event: event.clone(),
                target: self.clone(),
                current_target,
            };
            for listener in listeners {
                listener(&dispatched);
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

#[cfg(test)]
#[path = "tests/document_tests.rs"]
mod tests;
