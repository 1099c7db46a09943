//! In-memory host: an arena element tree plus scripted history, network and viewport.
//!
//! Every mutation the engine performs is appended to a journal so tests can assert on
//! ordering, not just on end state.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use pagefx_core::{
    Clock, Dom, Fetcher, Method, PageError, Response, Selector, SessionHistory, Viewport,
};

use crate::gate::Gate;
use crate::{pages, FixtureNode, PageFixture};

pub const ORIGIN: &str = "https://example.test";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryOp {
    Push { title: String, url: String },
    Replace { title: String, url: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Fetch(String),
    SetTitle(String),
    History(HistoryOp),
    AddClass(NodeId, String),
    RemoveClass(NodeId, String),
    SetAttr(NodeId, String, String),
    RemoveAttr(NodeId, String),
    SetStyle(NodeId, String, String),
    Detach(NodeId),
    Append { parent: NodeId, child: NodeId },
    AnimationEnd(NodeId),
    ScrollToTop,
    ScrollIntoView(NodeId),
    Watch(NodeId),
    Unwatch(NodeId),
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    style: BTreeMap<String, String>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Default)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn create(&mut self, tag: &str, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            tag: tag.to_string(),
            attrs: BTreeMap::new(),
            classes: Vec::new(),
            style: BTreeMap::new(),
            text: String::new(),
            parent,
            children: Vec::new(),
        });
        if let Some(p) = parent {
            self.node_mut(p).children.push(id);
        }
        id
    }

    fn build(&mut self, node: &FixtureNode, parent: Option<NodeId>) -> NodeId {
        let id = self.create(&node.tag, parent);
        for (name, value) in &node.attrs {
            if name == "class" {
                self.node_mut(id).classes =
                    value.split_whitespace().map(str::to_string).collect();
            } else {
                self.node_mut(id).attrs.insert(name.clone(), value.clone());
            }
        }
        if let Some(text) = &node.text {
            self.node_mut(id).text = text.clone();
        }
        for child in &node.children {
            self.build(child, Some(id));
        }
        id
    }

    /// `<html><head><title/></head><body/></html>` for a fixture; returns the html node.
    fn build_document(&mut self, page: &PageFixture) -> NodeId {
        let html = self.create("html", None);
        let head = self.create("head", Some(html));
        if let Some(title) = &page.title {
            let t = self.create("title", Some(head));
            self.node_mut(t).text = title.clone();
        }
        self.build(&page.body, Some(html));
        html
    }

    fn root_of(&self, mut id: NodeId) -> NodeId {
        while let Some(p) = self.node(id).parent {
            id = p;
        }
        id
    }

    fn descendants(&self, root: NodeId, out: &mut Vec<NodeId>) {
        for &child in &self.node(root).children {
            out.push(child);
            self.descendants(child, out);
        }
    }

    fn text(&self, id: NodeId) -> String {
        let mut s = self.node(id).text.clone();
        for &child in &self.node(id).children {
            s.push_str(&self.text(child));
        }
        s
    }

    fn detach(&mut self, id: NodeId) {
        if let Some(p) = self.node_mut(id).parent.take() {
            self.node_mut(p).children.retain(|c| *c != id);
        }
    }

    fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        let node = self.node(id);
        match selector {
            Selector::Attr(name) => node.attrs.contains_key(name),
            Selector::Tag(tag) => node.tag.eq_ignore_ascii_case(tag),
        }
    }
}

pub struct FakeHost {
    tree: RefCell<Tree>,
    document: NodeId,
    location: RefCell<String>,
    title: RefCell<String>,
    journal: RefCell<Vec<Op>>,
    responses: RefCell<HashMap<String, Result<Response, PageError>>>,
    fetch_gate: RefCell<Option<Gate>>,
    animation_gate: RefCell<Option<Gate>>,
    listeners: Cell<usize>,
    breakpoint: RefCell<String>,
    scroll_top: Cell<f64>,
    watched: RefCell<Vec<NodeId>>,
    clock: Cell<f64>,
}

impl FakeHost {
    /// Live document built from the named page fixture, located at `path`.
    pub fn from_page(name: &str, path: &str) -> Result<Self> {
        let page = pages::load(name)?;
        let mut tree = Tree::default();
        let document = tree.build_document(&page);
        Ok(Self {
            tree: RefCell::new(tree),
            document,
            location: RefCell::new(url(path)),
            title: RefCell::new(page.title.unwrap_or_default()),
            journal: RefCell::new(Vec::new()),
            responses: RefCell::new(HashMap::new()),
            fetch_gate: RefCell::new(None),
            animation_gate: RefCell::new(None),
            listeners: Cell::new(0),
            breakpoint: RefCell::new("\"large\"".to_string()),
            scroll_top: Cell::new(0.0),
            watched: RefCell::new(Vec::new()),
            clock: Cell::new(0.0),
        })
    }

    // ----- scripting -----

    /// Answer GET `path` with the named page fixture.
    pub fn serve(&self, path: &str, page: &str) -> Result<()> {
        let body = pages::body(page)?;
        self.serve_body(path, 200, "OK", &body);
        Ok(())
    }

    pub fn serve_body(&self, path: &str, status: u16, status_text: &str, body: &str) {
        self.responses.borrow_mut().insert(
            url(path),
            Ok(Response {
                status,
                status_text: status_text.to_string(),
                body: body.to_string(),
            }),
        );
    }

    pub fn serve_status(&self, path: &str, status: u16, status_text: &str) {
        self.serve_body(path, status, status_text, "");
    }

    /// Make requests for `path` fail before any response arrives.
    pub fn fail_transport(&self, path: &str) {
        self.responses.borrow_mut().insert(
            url(path),
            Err(PageError::Fetch {
                status: 0,
                status_text: String::new(),
            }),
        );
    }

    /// Hold every fetch until the returned gate opens.
    pub fn gate_fetches(&self) -> Gate {
        let gate = Gate::new();
        *self.fetch_gate.borrow_mut() = Some(gate.clone());
        gate
    }

    /// Hold every animation until the returned gate opens.
    pub fn gate_animations(&self) -> Gate {
        let gate = Gate::new();
        *self.animation_gate.borrow_mut() = Some(gate.clone());
        gate
    }

    /// Raw `content` value, e.g. `"\"small\""`.
    pub fn set_breakpoint(&self, raw: &str) {
        *self.breakpoint.borrow_mut() = raw.to_string();
    }

    pub fn set_scroll_top(&self, value: f64) {
        self.scroll_top.set(value);
    }

    /// What the browser does before firing popstate.
    pub fn set_location(&self, path: &str) {
        *self.location.borrow_mut() = url(path);
    }

    pub fn advance_clock(&self, ms: f64) {
        self.clock.set(self.clock.get() + ms);
    }

    // ----- inspection -----

    /// Connected element with the given id. Panics if absent.
    pub fn id(&self, id: &str) -> NodeId {
        self.element_by_id(id)
            .unwrap_or_else(|| panic!("no connected element with id '{id}'"))
    }

    pub fn has_id(&self, id: &str) -> bool {
        self.element_by_id(id).is_some()
    }

    pub fn classes(&self, el: NodeId) -> Vec<String> {
        self.tree.borrow().node(el).classes.clone()
    }

    pub fn attr(&self, el: NodeId, name: &str) -> Option<String> {
        self.tree.borrow().node(el).attrs.get(name).cloned()
    }

    pub fn style(&self, el: NodeId, name: &str) -> Option<String> {
        self.tree.borrow().node(el).style.get(name).cloned()
    }

    pub fn parent_of(&self, el: NodeId) -> Option<NodeId> {
        self.tree.borrow().node(el).parent
    }

    pub fn journal(&self) -> Vec<Op> {
        self.journal.borrow().clone()
    }

    pub fn clear_journal(&self) {
        self.journal.borrow_mut().clear();
    }

    /// Index of the first journal entry equal to `op`.
    pub fn position(&self, op: &Op) -> Option<usize> {
        self.journal.borrow().iter().position(|o| o == op)
    }

    pub fn history(&self) -> Vec<HistoryOp> {
        self.journal
            .borrow()
            .iter()
            .filter_map(|op| match op {
                Op::History(h) => Some(h.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn fetches(&self) -> Vec<String> {
        self.journal
            .borrow()
            .iter()
            .filter_map(|op| match op {
                Op::Fetch(u) => Some(u.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn scroll_resets(&self) -> usize {
        self.journal
            .borrow()
            .iter()
            .filter(|op| **op == Op::ScrollToTop)
            .count()
    }

    pub fn watched(&self) -> Vec<NodeId> {
        self.watched.borrow().clone()
    }

    /// Animation listeners registered and not yet fired.
    pub fn active_listeners(&self) -> usize {
        self.listeners.get()
    }

    fn record(&self, op: Op) {
        self.journal.borrow_mut().push(op);
    }
}

pub fn url(path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else if path.starts_with('/') {
        format!("{ORIGIN}{path}")
    } else {
        format!("{ORIGIN}/{path}")
    }
}

impl Dom for FakeHost {
    type Element = NodeId;

    fn parent(&self, el: &NodeId) -> Option<NodeId> {
        self.tree.borrow().node(*el).parent
    }

    fn has_attribute(&self, el: &NodeId, name: &str) -> bool {
        self.tree.borrow().node(*el).attrs.contains_key(name)
    }

    fn attribute(&self, el: &NodeId, name: &str) -> Option<String> {
        self.attr(*el, name)
    }

    fn set_attribute(&self, el: &NodeId, name: &str, value: &str) {
        self.tree
            .borrow_mut()
            .node_mut(*el)
            .attrs
            .insert(name.to_string(), value.to_string());
        self.record(Op::SetAttr(*el, name.to_string(), value.to_string()));
    }

    fn remove_attribute(&self, el: &NodeId, name: &str) {
        self.tree.borrow_mut().node_mut(*el).attrs.remove(name);
        self.record(Op::RemoveAttr(*el, name.to_string()));
    }

    fn has_class(&self, el: &NodeId, class: &str) -> bool {
        self.tree
            .borrow()
            .node(*el)
            .classes
            .iter()
            .any(|c| c == class)
    }

    fn add_class(&self, el: &NodeId, class: &str) {
        {
            let mut tree = self.tree.borrow_mut();
            let classes = &mut tree.node_mut(*el).classes;
            if !classes.iter().any(|c| c == class) {
                classes.push(class.to_string());
            }
        }
        self.record(Op::AddClass(*el, class.to_string()));
    }

    fn remove_class(&self, el: &NodeId, class: &str) {
        self.tree
            .borrow_mut()
            .node_mut(*el)
            .classes
            .retain(|c| c != class);
        self.record(Op::RemoveClass(*el, class.to_string()));
    }

    fn set_style_property(&self, el: &NodeId, name: &str, value: &str) {
        self.tree
            .borrow_mut()
            .node_mut(*el)
            .style
            .insert(name.to_string(), value.to_string());
        self.record(Op::SetStyle(*el, name.to_string(), value.to_string()));
    }

    fn query_all(&self, root: Option<&NodeId>, selector: &Selector) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        let mut candidates = Vec::new();
        match root {
            Some(root) => tree.descendants(*root, &mut candidates),
            None => {
                candidates.push(self.document);
                tree.descendants(self.document, &mut candidates);
            }
        }
        candidates
            .into_iter()
            .filter(|id| tree.matches(*id, selector))
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let tree = self.tree.borrow();
        let mut all = vec![self.document];
        tree.descendants(self.document, &mut all);
        all.into_iter()
            .find(|n| tree.node(*n).attrs.get("id").map(String::as_str) == Some(id))
    }

    fn body(&self) -> Option<NodeId> {
        self.query_first(None, &Selector::tag("body"))
    }

    fn document_element(&self) -> Option<NodeId> {
        Some(self.document)
    }

    fn text_content(&self, el: &NodeId) -> Option<String> {
        Some(self.tree.borrow().text(*el))
    }

    fn href(&self, el: &NodeId) -> Option<String> {
        let tree = self.tree.borrow();
        let node = tree.node(*el);
        if !node.tag.eq_ignore_ascii_case("a") {
            return None;
        }
        let raw = node.attrs.get("href")?;
        if let Some(fragment) = raw.strip_prefix('#') {
            let location = self.location.borrow();
            let doc = location.split_once('#').map_or(location.as_str(), |(d, _)| d);
            return Some(format!("{doc}#{fragment}"));
        }
        Some(url(raw))
    }

    fn is_connected(&self, el: &NodeId) -> bool {
        self.tree.borrow().root_of(*el) == self.document
    }

    fn detach(&self, el: &NodeId) {
        self.tree.borrow_mut().detach(*el);
        self.record(Op::Detach(*el));
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        {
            let mut tree = self.tree.borrow_mut();
            tree.detach(*child);
            tree.node_mut(*child).parent = Some(*parent);
            tree.node_mut(*parent).children.push(*child);
        }
        self.record(Op::Append {
            parent: *parent,
            child: *child,
        });
    }

    fn title(&self) -> String {
        self.title.borrow().clone()
    }

    fn set_title(&self, title: &str) {
        *self.title.borrow_mut() = title.to_string();
        self.record(Op::SetTitle(title.to_string()));
    }

    fn parse_document(&self, body: &str) -> Option<NodeId> {
        let page: PageFixture = serde_json::from_str(body).ok()?;
        Some(self.tree.borrow_mut().build_document(&page))
    }

    async fn animation_end(&self, el: &NodeId) {
        self.listeners.set(self.listeners.get() + 1);
        let gate = self.animation_gate.borrow().clone();
        if let Some(gate) = gate {
            gate.wait().await;
        }
        self.listeners.set(self.listeners.get() - 1);
        self.record(Op::AnimationEnd(*el));
    }
}

impl SessionHistory for FakeHost {
    fn location(&self) -> String {
        self.location.borrow().clone()
    }

    fn push_state(&self, title: &str, url: &str) {
        *self.location.borrow_mut() = url.to_string();
        self.record(Op::History(HistoryOp::Push {
            title: title.to_string(),
            url: url.to_string(),
        }));
    }

    fn replace_state(&self, title: &str, url: &str) {
        *self.location.borrow_mut() = url.to_string();
        self.record(Op::History(HistoryOp::Replace {
            title: title.to_string(),
            url: url.to_string(),
        }));
    }
}

impl Viewport for FakeHost {
    fn scroll_top(&self) -> f64 {
        self.scroll_top.get()
    }

    fn scroll_to_top(&self) {
        self.scroll_top.set(0.0);
        self.record(Op::ScrollToTop);
    }

    fn scroll_into_view(&self, el: &NodeId) {
        self.record(Op::ScrollIntoView(*el));
    }

    fn breakpoint_content(&self) -> String {
        self.breakpoint.borrow().clone()
    }

    fn watch_reveal(&self, el: &NodeId) {
        self.watched.borrow_mut().push(*el);
        self.record(Op::Watch(*el));
    }

    fn unwatch_reveal(&self, el: &NodeId) {
        self.watched.borrow_mut().retain(|w| w != el);
        self.record(Op::Unwatch(*el));
    }
}

impl Fetcher for FakeHost {
    async fn fetch(&self, url: &str, method: Method) -> Result<Response, PageError> {
        self.record(Op::Fetch(url.to_string()));
        log::trace!("fake fetch {} {url}", method.as_str());
        let gate = self.fetch_gate.borrow().clone();
        if let Some(gate) = gate {
            gate.wait().await;
        }
        self.responses
            .borrow()
            .get(url)
            .cloned()
            .unwrap_or_else(|| {
                Ok(Response {
                    status: 404,
                    status_text: "Not Found".to_string(),
                    body: String::new(),
                })
            })
    }
}

impl Clock for FakeHost {
    fn now_ms(&self) -> f64 {
        self.clock.get()
    }
}
