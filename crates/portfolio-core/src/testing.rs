#![forbid(unsafe_code)]

//! In-memory document for tests.
//!
//! [`FakeDocument`] is a flat list of nodes with tag, attributes, classes,
//! inline styles and an `offsetTop`. It understands enough selector syntax
//! for the page: `#id`, `.class`, `tag`, `[attr]`, `[attr="v"]`,
//! `[attr^="v"]`, compounds of those, and comma lists. Side effects that a
//! browser would show to the user (alerts, scrolls, console lines, form
//! resets) are recorded for inspection.

use std::collections::BTreeMap;

use crate::config::ObserverOptions;
use crate::dom::{Dom, EventType, ListenerId, ObserverId, ReadyState, ScrollBehavior, Target};

/// Element handle of the fake document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Default)]
struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    styles: BTreeMap<String, String>,
    offset_top: f64,
    connected: bool,
}

// ---------------------------------------------------------------------------
// Selector matching
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, AttrOp)>,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(s: &str) -> (&str, &str) {
    let end = s.find(|c: char| !is_ident_char(c)).unwrap_or(s.len());
    s.split_at(end)
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(s)
        .to_string()
}

fn parse_compound(selector: &str) -> Option<Compound> {
    let selector = selector.trim();
    if selector.is_empty() {
        return None;
    }
    let mut compound = Compound::default();
    let (tag, mut rest) = take_ident(selector);
    if !tag.is_empty() {
        compound.tag = Some(tag.to_ascii_lowercase());
    }
    while let Some(c) = rest.chars().next() {
        match c {
            '#' | '.' => {
                let (ident, tail) = take_ident(&rest[1..]);
                if ident.is_empty() {
                    return None;
                }
                if c == '#' {
                    compound.id = Some(ident.to_string());
                } else {
                    compound.classes.push(ident.to_string());
                }
                rest = tail;
            }
            '[' => {
                let close = rest.find(']')?;
                let inner = &rest[1..close];
                let op = if let Some((name, value)) = inner.split_once("^=") {
                    (name.trim().to_string(), AttrOp::Prefix(unquote(value)))
                } else if let Some((name, value)) = inner.split_once('=') {
                    (name.trim().to_string(), AttrOp::Equals(unquote(value)))
                } else {
                    (inner.trim().to_string(), AttrOp::Exists)
                };
                compound.attrs.push(op);
                rest = &rest[close + 1..];
            }
            _ => return None,
        }
    }
    Some(compound)
}

impl Node {
    fn attr(&self, name: &str) -> Option<String> {
        if name == "class" {
            return (!self.classes.is_empty()).then(|| self.classes.join(" "));
        }
        self.attrs.get(name).cloned()
    }

    fn matches(&self, compound: &Compound) -> bool {
        if let Some(tag) = &compound.tag
            && *tag != self.tag
        {
            return false;
        }
        if let Some(id) = &compound.id
            && self.attrs.get("id") != Some(id)
        {
            return false;
        }
        if !compound.classes.iter().all(|c| self.classes.contains(c)) {
            return false;
        }
        compound.attrs.iter().all(|(name, op)| {
            let Some(value) = self.attr(name) else {
                return false;
            };
            match op {
                AttrOp::Exists => true,
                AttrOp::Equals(expected) => value == *expected,
                AttrOp::Prefix(prefix) => value.starts_with(prefix.as_str()),
            }
        })
    }
}

// ---------------------------------------------------------------------------
// FakeDocument
// ---------------------------------------------------------------------------

/// Recorded `scroll_to` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCall {
    pub top: f64,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Clone)]
pub struct FakeDocument {
    nodes: Vec<Node>,
    body: NodeId,
    ready_state: ReadyState,
    scroll_y: f64,
    intersection_observer: bool,
    scrolls: Vec<ScrollCall>,
    alerts: Vec<String>,
    console: Vec<(String, String)>,
    form_resets: Vec<NodeId>,
    listeners: Vec<(ListenerId, Target<NodeId>, EventType)>,
    observers: BTreeMap<ObserverId, (ObserverOptions, Vec<NodeId>)>,
}

impl Default for FakeDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeDocument {
    /// Empty, fully loaded document with a `<body>`.
    #[must_use]
    pub fn new() -> Self {
        let body = Node {
            tag: "body".into(),
            connected: true,
            ..Node::default()
        };
        Self {
            nodes: vec![body],
            body: NodeId(0),
            ready_state: ReadyState::Complete,
            scroll_y: 0.0,
            intersection_observer: true,
            scrolls: Vec::new(),
            alerts: Vec::new(),
            console: Vec::new(),
            form_resets: Vec::new(),
            listeners: Vec::new(),
            observers: BTreeMap::new(),
        }
    }

    /// Append an element. A `class` attribute is split into classes.
    pub fn add(&mut self, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut node = Node {
            tag: tag.to_ascii_lowercase(),
            connected: true,
            ..Node::default()
        };
        for (name, value) in attrs {
            if *name == "class" {
                node.classes = value.split_whitespace().map(str::to_string).collect();
            } else {
                node.attrs.insert((*name).to_string(), (*value).to_string());
            }
        }
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    pub fn set_scroll_y(&mut self, y: f64) {
        self.scroll_y = y;
    }

    pub fn set_intersection_observer_support(&mut self, supported: bool) {
        self.intersection_observer = supported;
    }

    pub fn set_offset_top(&mut self, el: NodeId, top: f64) {
        if let Some(node) = self.nodes.get_mut(el.0) {
            node.offset_top = top;
        }
    }

    #[must_use]
    pub fn body_id(&self) -> NodeId {
        self.body
    }

    #[must_use]
    pub fn style(&self, el: NodeId, property: &str) -> Option<&str> {
        self.nodes
            .get(el.0)
            .and_then(|n| n.styles.get(property))
            .map(String::as_str)
    }

    #[must_use]
    pub fn classes(&self, el: NodeId) -> Vec<String> {
        self.nodes
            .get(el.0)
            .map(|n| n.classes.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn scrolls(&self) -> &[ScrollCall] {
        &self.scrolls
    }

    #[must_use]
    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    #[must_use]
    pub fn console_lines(&self) -> &[(String, String)] {
        &self.console
    }

    #[must_use]
    pub fn form_resets(&self) -> &[NodeId] {
        &self.form_resets
    }

    /// Listeners currently attached through the wiring hooks.
    #[must_use]
    pub fn attached_listeners(&self) -> usize {
        self.listeners.len()
    }

    /// Listeners attached to `(target, event)`, in attach order. A browser
    /// calls exactly these, once each, for one native event.
    #[must_use]
    pub fn listeners_on(&self, target: &Target<NodeId>, event: EventType) -> Vec<ListenerId> {
        self.listeners
            .iter()
            .filter(|(_, t, e)| t == target && *e == event)
            .map(|(id, _, _)| *id)
            .collect()
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn observer_options(&self, id: ObserverId) -> Option<ObserverOptions> {
        self.observers.get(&id).map(|(options, _)| *options)
    }

    /// Elements observed by `id`, in observation order.
    #[must_use]
    pub fn observed(&self, id: ObserverId) -> Vec<NodeId> {
        self.observers
            .get(&id)
            .map(|(_, els)| els.clone())
            .unwrap_or_default()
    }

    fn node(&self, el: &NodeId) -> Option<&Node> {
        self.nodes.get(el.0)
    }

    fn node_mut(&mut self, el: &NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(el.0)
    }
}

impl Dom for FakeDocument {
    type Element = NodeId;

    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn body(&self) -> Option<NodeId> {
        Some(self.body)
    }

    fn query_selector(&self, selector: &str) -> Option<NodeId> {
        self.query_selector_all(selector).into_iter().next()
    }

    fn query_selector_all(&self, selector: &str) -> Vec<NodeId> {
        let compounds: Vec<Compound> = selector.split(',').filter_map(parse_compound).collect();
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.connected && compounds.iter().any(|c| node.matches(c)))
            .map(|(idx, _)| NodeId(idx))
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.connected && n.attrs.get("id").map(String::as_str) == Some(id))
            .map(NodeId)
    }

    fn attribute(&self, el: &NodeId, name: &str) -> Option<String> {
        self.node(el).and_then(|n| n.attr(name))
    }

    fn set_attribute(&mut self, el: &NodeId, name: &str, value: &str) {
        let Some(node) = self.node_mut(el) else {
            return;
        };
        if name == "class" {
            node.classes = value.split_whitespace().map(str::to_string).collect();
        } else {
            node.attrs.insert(name.to_string(), value.to_string());
        }
    }

    fn has_class(&self, el: &NodeId, class: &str) -> bool {
        self.node(el)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, el: &NodeId, class: &str) {
        if let Some(node) = self.node_mut(el)
            && !node.classes.iter().any(|c| c == class)
        {
            node.classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, el: &NodeId, class: &str) {
        if let Some(node) = self.node_mut(el) {
            node.classes.retain(|c| c != class);
        }
    }

    fn set_style(&mut self, el: &NodeId, property: &str, value: &str) {
        let Some(node) = self.node_mut(el) else {
            return;
        };
        if value.is_empty() {
            node.styles.remove(property);
        } else {
            node.styles.insert(property.to_string(), value.to_string());
        }
    }

    fn remove_element(&mut self, el: &NodeId) {
        if let Some(node) = self.node_mut(el) {
            node.connected = false;
        }
    }

    fn is_connected(&self, el: &NodeId) -> bool {
        self.node(el).is_some_and(|n| n.connected)
    }

    fn offset_top(&self, el: &NodeId) -> f64 {
        self.node(el).map_or(0.0, |n| n.offset_top)
    }

    fn reset_form(&mut self, el: &NodeId) {
        self.form_resets.push(*el);
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn scroll_to(&mut self, top: f64, behavior: ScrollBehavior) {
        self.scrolls.push(ScrollCall { top, behavior });
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }

    fn supports_intersection_observer(&self) -> bool {
        self.intersection_observer
    }

    fn console_styled(&mut self, text: &str, css: &str) {
        self.console.push((text.to_string(), css.to_string()));
    }

    fn attach_listener(&mut self, id: ListenerId, target: &Target<NodeId>, event: EventType) {
        self.listeners.push((id, target.clone(), event));
    }

    fn detach_listener(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _, _)| *lid != id);
    }

    fn create_observer(&mut self, id: ObserverId, options: &ObserverOptions) {
        self.observers.insert(id, (*options, Vec::new()));
    }

    fn observe(&mut self, id: ObserverId, el: &NodeId) {
        if let Some((_, els)) = self.observers.get_mut(&id) {
            els.push(*el);
        }
    }

    fn unobserve(&mut self, id: ObserverId, el: &NodeId) {
        if let Some((_, els)) = self.observers.get_mut(&id) {
            els.retain(|e| e != el);
        }
    }

    fn disconnect_observer(&mut self, id: ObserverId) {
        self.observers.remove(&id);
    }
}
