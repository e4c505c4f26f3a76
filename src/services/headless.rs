//! In-memory document for tests and non-browser targets
//!
//! `HeadlessHost` keeps a tiny element tree, a body, body-level listeners, a
//! manually advanced clock for intervals, a log of alerts, and a queue of
//! outstanding fetches that the caller resolves by hand. Handles are cheap
//! clones of one shared document, so a test can keep its own handle while a
//! dialog holds another.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use futures::channel::oneshot;
use futures::future::LocalBoxFuture;

use super::host::{ClickHandler, ClickOutcome, Host, KeyHandler, Size, TickHandler};
use crate::utils::errors::{FetchError, ModalError};

const DEFAULT_VIEWPORT: Size = Size { width: 1024.0, height: 768.0 };

// =============================================================================
// Elements
// =============================================================================

/// Element in a headless document; equality is identity
#[derive(Clone)]
pub struct HeadlessNode(Rc<RefCell<NodeData>>);

struct NodeData {
    tag: String,
    class_name: String,
    attributes: Vec<(String, String)>,
    style: Vec<(String, String)>,
    children: Vec<Child>,
    parent: Weak<RefCell<NodeData>>,
    size: Size,
}

#[derive(Clone)]
enum Child {
    Element(HeadlessNode),
    Markup(String),
}

impl PartialEq for HeadlessNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HeadlessNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        write!(f, "<{} class=\"{}\">", data.tag, data.class_name)
    }
}

impl HeadlessNode {
    fn new(tag: &str) -> Self {
        HeadlessNode(Rc::new(RefCell::new(NodeData {
            tag: tag.to_string(),
            class_name: String::new(),
            attributes: Vec::new(),
            style: Vec::new(),
            children: Vec::new(),
            parent: Weak::new(),
            size: Size::default(),
        })))
    }

    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    pub fn class_name(&self) -> String {
        self.0.borrow().class_name.clone()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.0.borrow().class_name.split_whitespace().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.iter().find(|(n, _)| n == name).map(|(_, v)| v.clone())
    }

    /// Inline style value for `property`, if set
    pub fn style(&self, property: &str) -> Option<String> {
        self.0.borrow().style.iter().find(|(p, _)| p == property).map(|(_, v)| v.clone())
    }

    /// Element children, in order (markup text is skipped)
    pub fn child_elements(&self) -> Vec<HeadlessNode> {
        self.0
            .borrow()
            .children
            .iter()
            .filter_map(|c| match c {
                Child::Element(node) => Some(node.clone()),
                Child::Markup(_) => None,
            })
            .collect()
    }

    fn parent(&self) -> Option<HeadlessNode> {
        self.0.borrow().parent.upgrade().map(HeadlessNode)
    }

    fn set_style_entry(&self, property: &str, value: &str) {
        let mut data = self.0.borrow_mut();
        match data.style.iter_mut().find(|(p, _)| p == property) {
            Some(entry) => entry.1 = value.to_string(),
            None => data.style.push((property.to_string(), value.to_string())),
        }
    }

    fn remove_style_entry(&self, property: &str) {
        self.0.borrow_mut().style.retain(|(p, _)| p != property);
    }

    fn remove_from_parent(&self) {
        if let Some(parent) = self.parent() {
            parent.0.borrow_mut().children.retain(|c| match c {
                Child::Element(node) => node != self,
                Child::Markup(_) => true,
            });
        }
        self.0.borrow_mut().parent = Weak::new();
    }

    fn root(&self) -> HeadlessNode {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    fn deep_clone(&self) -> HeadlessNode {
        let data = self.0.borrow();
        let copy = HeadlessNode(Rc::new(RefCell::new(NodeData {
            tag: data.tag.clone(),
            class_name: data.class_name.clone(),
            attributes: data.attributes.clone(),
            style: data.style.clone(),
            children: Vec::new(),
            parent: Weak::new(),
            size: data.size,
        })));
        for child in &data.children {
            let child = match child {
                Child::Element(node) => {
                    let node = node.deep_clone();
                    node.0.borrow_mut().parent = Rc::downgrade(&copy.0);
                    Child::Element(node)
                }
                Child::Markup(html) => Child::Markup(html.clone()),
            };
            copy.0.borrow_mut().children.push(child);
        }
        copy
    }

    fn inner_html(&self) -> String {
        self.0
            .borrow()
            .children
            .iter()
            .map(|c| match c {
                Child::Element(node) => node.outer_html(),
                Child::Markup(html) => html.clone(),
            })
            .collect()
    }

    fn outer_html(&self) -> String {
        let data = self.0.borrow();
        let mut out = format!("<{}", data.tag);
        if !data.class_name.is_empty() {
            out.push_str(&format!(" class=\"{}\"", data.class_name));
        }
        for (name, value) in &data.attributes {
            out.push_str(&format!(" {}=\"{}\"", name, value));
        }
        if !data.style.is_empty() {
            let style: Vec<String> = data.style.iter().map(|(p, v)| format!("{}: {};", p, v)).collect();
            out.push_str(&format!(" style=\"{}\"", style.join(" ")));
        }
        out.push('>');
        drop(data);
        out.push_str(&self.inner_html());
        out.push_str(&format!("</{}>", self.0.borrow().tag));
        out
    }
}

// =============================================================================
// Document
// =============================================================================

struct Timer {
    id: u64,
    period_ms: u64,
    due_ms: u64,
    tick: Rc<RefCell<TickHandler>>,
}

struct PendingRequest {
    sender: oneshot::Sender<Result<String, FetchError>>,
}

/// A request issued through [`HeadlessHost::fetch_text`]
#[derive(Debug, Clone, PartialEq)]
pub struct RequestRecord {
    pub locator: String,
    pub params: Vec<(String, String)>,
}

struct Document {
    body: RefCell<Vec<HeadlessNode>>,
    viewport: Cell<Size>,
    now_ms: Cell<u64>,
    next_id: Cell<u64>,
    clicks: RefCell<Vec<(u64, Rc<RefCell<ClickHandler<HeadlessNode>>>)>>,
    key_ups: RefCell<Vec<(u64, Rc<RefCell<KeyHandler>>)>>,
    intervals: RefCell<Vec<Timer>>,
    alerts: RefCell<Vec<String>>,
    pending: RefCell<VecDeque<PendingRequest>>,
    requests: RefCell<Vec<RequestRecord>>,
    style_writes: Cell<usize>,
}

impl Document {
    fn next_id(&self) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }
}

/// In-memory [`Host`] with a controllable clock and scripted network
#[derive(Clone)]
pub struct HeadlessHost {
    doc: Rc<Document>,
}

/// Registration handle for a headless body listener
pub struct HeadlessListener {
    id: u64,
    doc: Weak<Document>,
}

impl Drop for HeadlessListener {
    fn drop(&mut self) {
        if let Some(doc) = self.doc.upgrade() {
            doc.clicks.borrow_mut().retain(|(id, _)| *id != self.id);
            doc.key_ups.borrow_mut().retain(|(id, _)| *id != self.id);
        }
    }
}

/// Registration handle for a headless interval
pub struct HeadlessInterval {
    id: u64,
    doc: Weak<Document>,
}

impl Drop for HeadlessInterval {
    fn drop(&mut self) {
        if let Some(doc) = self.doc.upgrade() {
            doc.intervals.borrow_mut().retain(|t| t.id != self.id);
        }
    }
}

impl Default for HeadlessHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self {
            doc: Rc::new(Document {
                body: RefCell::new(Vec::new()),
                viewport: Cell::new(DEFAULT_VIEWPORT),
                now_ms: Cell::new(0),
                next_id: Cell::new(0),
                clicks: RefCell::new(Vec::new()),
                key_ups: RefCell::new(Vec::new()),
                intervals: RefCell::new(Vec::new()),
                alerts: RefCell::new(Vec::new()),
                pending: RefCell::new(VecDeque::new()),
                requests: RefCell::new(Vec::new()),
                style_writes: Cell::new(0),
            }),
        }
    }

    // ---- geometry ----

    pub fn set_viewport(&self, size: Size) {
        self.doc.viewport.set(size);
    }

    /// Give a node a rendered size (there is no layout engine here)
    pub fn set_outer_size(&self, node: &HeadlessNode, size: Size) {
        node.0.borrow_mut().size = size;
    }

    /// Number of inline style writes made through the host so far
    pub fn style_writes(&self) -> usize {
        self.doc.style_writes.get()
    }

    // ---- document ----

    /// Top-level children of the body, in order
    pub fn body_children(&self) -> Vec<HeadlessNode> {
        self.doc.body.borrow().clone()
    }

    // ---- events ----

    /// Dispatch a click on `target`. Only attached targets reach body listeners.
    pub fn click(&self, target: &HeadlessNode) -> ClickOutcome {
        if !self.is_attached(target) {
            return ClickOutcome::Ignore;
        }

        let snapshot: Vec<_> = self.doc.clicks.borrow().iter().map(|(id, h)| (*id, h.clone())).collect();
        let mut outcome = ClickOutcome::Ignore;
        for (id, handler) in snapshot {
            // A listener removed by an earlier one in this dispatch does not run
            if !self.doc.clicks.borrow().iter().any(|(i, _)| *i == id) {
                continue;
            }
            let mut handler = handler.borrow_mut();
            if (*handler)(target) == ClickOutcome::PreventDefault {
                outcome = ClickOutcome::PreventDefault;
            }
        }
        outcome
    }

    /// Dispatch a key-up for `key` (e.g. `"Escape"`)
    pub fn key_up(&self, key: &str) {
        let snapshot: Vec<_> = self.doc.key_ups.borrow().iter().map(|(id, h)| (*id, h.clone())).collect();
        for (id, handler) in snapshot {
            if !self.doc.key_ups.borrow().iter().any(|(i, _)| *i == id) {
                continue;
            }
            let mut handler = handler.borrow_mut();
            (*handler)(key);
        }
    }

    pub fn click_listener_count(&self) -> usize {
        self.doc.clicks.borrow().len()
    }

    pub fn key_up_listener_count(&self) -> usize {
        self.doc.key_ups.borrow().len()
    }

    // ---- clock ----

    pub fn now_ms(&self) -> u64 {
        self.doc.now_ms.get()
    }

    pub fn active_intervals(&self) -> usize {
        self.doc.intervals.borrow().len()
    }

    /// Move the clock forward, firing every interval that comes due on the way
    pub fn advance(&self, ms: u64) {
        let target = self.doc.now_ms.get() + ms;
        loop {
            let next = self
                .doc
                .intervals
                .borrow()
                .iter()
                .filter(|t| t.due_ms <= target)
                .min_by_key(|t| (t.due_ms, t.id))
                .map(|t| (t.id, t.due_ms, t.tick.clone()));

            let Some((id, due_ms, tick)) = next else { break };

            self.doc.now_ms.set(due_ms);
            if let Some(timer) = self.doc.intervals.borrow_mut().iter_mut().find(|t| t.id == id) {
                timer.due_ms += timer.period_ms;
            }
            let mut tick = tick.borrow_mut();
            (*tick)();
        }
        self.doc.now_ms.set(target);
    }

    // ---- notifications ----

    /// Messages passed to `alert`, oldest first
    pub fn alerts(&self) -> Vec<String> {
        self.doc.alerts.borrow().clone()
    }

    // ---- network ----

    /// Every request issued so far, oldest first
    pub fn requests(&self) -> Vec<RequestRecord> {
        self.doc.requests.borrow().clone()
    }

    pub fn pending_requests(&self) -> usize {
        self.doc.pending.borrow().len()
    }

    /// Resolve the oldest outstanding request with `body`.
    /// Returns false when nothing was waiting.
    pub fn respond(&self, body: &str) -> bool {
        self.settle(Ok(body.to_string()))
    }

    /// Fail the oldest outstanding request
    pub fn fail(&self, error: FetchError) -> bool {
        self.settle(Err(error))
    }

    fn settle(&self, outcome: Result<String, FetchError>) -> bool {
        let request = self.doc.pending.borrow_mut().pop_front();
        match request {
            Some(request) => {
                if request.sender.send(outcome).is_err() {
                    log::debug!("Headless request settled after its caller went away");
                }
                true
            }
            None => false,
        }
    }
}

impl Host for HeadlessHost {
    type Node = HeadlessNode;
    type Listener = HeadlessListener;
    type Interval = HeadlessInterval;

    fn create_element(&self, tag: &str) -> Result<HeadlessNode, ModalError> {
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(ModalError::CreateElement {
                tag: tag.to_string(),
                message: "invalid tag name".to_string(),
            });
        }
        Ok(HeadlessNode::new(tag))
    }

    fn clone_node(&self, node: &HeadlessNode) -> Result<HeadlessNode, ModalError> {
        Ok(node.deep_clone())
    }

    fn append_child(&self, parent: &HeadlessNode, child: &HeadlessNode) {
        self.detach(child);
        child.0.borrow_mut().parent = Rc::downgrade(&parent.0);
        parent.0.borrow_mut().children.push(Child::Element(child.clone()));
    }

    fn set_class_name(&self, node: &HeadlessNode, class_name: &str) {
        node.0.borrow_mut().class_name = class_name.to_string();
    }

    fn set_attribute(&self, node: &HeadlessNode, name: &str, value: &str) {
        let mut data = node.0.borrow_mut();
        match data.attributes.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => data.attributes.push((name.to_string(), value.to_string())),
        }
    }

    fn set_style(&self, node: &HeadlessNode, property: &str, value: &str) {
        self.doc.style_writes.set(self.doc.style_writes.get() + 1);
        node.set_style_entry(property, value);
    }

    fn set_visible(&self, node: &HeadlessNode, visible: bool) {
        if visible {
            node.remove_style_entry("display");
        } else {
            node.set_style_entry("display", "none");
        }
    }

    fn is_visible(&self, node: &HeadlessNode) -> bool {
        node.style("display").as_deref() != Some("none")
    }

    fn set_inner_html(&self, node: &HeadlessNode, html: &str) {
        let old = std::mem::take(&mut node.0.borrow_mut().children);
        for child in old {
            if let Child::Element(child) = child {
                child.0.borrow_mut().parent = Weak::new();
            }
        }
        if !html.is_empty() {
            node.0.borrow_mut().children.push(Child::Markup(html.to_string()));
        }
    }

    fn inner_html(&self, node: &HeadlessNode) -> String {
        node.inner_html()
    }

    fn outer_html(&self, node: &HeadlessNode) -> String {
        node.outer_html()
    }

    fn append_to_body(&self, node: &HeadlessNode) {
        self.detach(node);
        self.doc.body.borrow_mut().push(node.clone());
    }

    fn detach(&self, node: &HeadlessNode) {
        if node.parent().is_some() {
            node.remove_from_parent();
        } else {
            self.doc.body.borrow_mut().retain(|n| n != node);
        }
    }

    fn is_attached(&self, node: &HeadlessNode) -> bool {
        let root = node.root();
        self.doc.body.borrow().iter().any(|n| *n == root)
    }

    fn viewport_size(&self) -> Size {
        self.doc.viewport.get()
    }

    fn outer_size(&self, node: &HeadlessNode) -> Size {
        node.0.borrow().size
    }

    fn listen_click(&self, handler: ClickHandler<HeadlessNode>) -> Result<HeadlessListener, ModalError> {
        let id = self.doc.next_id();
        self.doc.clicks.borrow_mut().push((id, Rc::new(RefCell::new(handler))));
        Ok(HeadlessListener { id, doc: Rc::downgrade(&self.doc) })
    }

    fn listen_key_up(&self, handler: KeyHandler) -> Result<HeadlessListener, ModalError> {
        let id = self.doc.next_id();
        self.doc.key_ups.borrow_mut().push((id, Rc::new(RefCell::new(handler))));
        Ok(HeadlessListener { id, doc: Rc::downgrade(&self.doc) })
    }

    fn start_interval(&self, period_ms: u32, tick: TickHandler) -> HeadlessInterval {
        let id = self.doc.next_id();
        // Browsers clamp zero-length intervals; a zero period would never let the clock move
        let period_ms = u64::from(period_ms.max(1));
        self.doc.intervals.borrow_mut().push(Timer {
            id,
            period_ms,
            due_ms: self.doc.now_ms.get() + period_ms,
            tick: Rc::new(RefCell::new(tick)),
        });
        HeadlessInterval { id, doc: Rc::downgrade(&self.doc) }
    }

    fn alert(&self, message: &str) {
        log::info!("alert: {}", message);
        self.doc.alerts.borrow_mut().push(message.to_string());
    }

    fn fetch_text(
        &self,
        locator: &str,
        params: &[(&str, &str)],
    ) -> LocalBoxFuture<'static, Result<String, FetchError>> {
        let (sender, receiver) = oneshot::channel();
        self.doc.requests.borrow_mut().push(RequestRecord {
            locator: locator.to_string(),
            params: params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        });
        self.doc.pending.borrow_mut().push_back(PendingRequest { sender });

        Box::pin(async move {
            receiver
                .await
                .unwrap_or_else(|_| Err(FetchError::Network("request dropped".to_string())))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    #[test]
    fn test_attach_and_detach() {
        let host = HeadlessHost::new();
        let parent = host.create_element("div").unwrap();
        let child = host.create_element("span").unwrap();
        host.append_child(&parent, &child);

        assert!(!host.is_attached(&child));
        host.append_to_body(&parent);
        assert!(host.is_attached(&parent));
        assert!(host.is_attached(&child));

        host.detach(&parent);
        assert!(!host.is_attached(&child));
        assert!(host.body_children().is_empty());
    }

    #[test]
    fn test_markup_serialization() {
        let host = HeadlessHost::new();
        let link = host.create_element("a").unwrap();
        host.set_class_name(&link, "modal-close");
        host.set_attribute(&link, "href", "#");
        host.set_inner_html(&link, "&times;");
        assert_eq!(host.outer_html(&link), "<a class=\"modal-close\" href=\"#\">&times;</a>");

        host.set_visible(&link, false);
        assert!(!host.is_visible(&link));
        assert!(host.outer_html(&link).contains("style=\"display: none;\""));
        host.set_visible(&link, true);
        assert!(host.is_visible(&link));
    }

    #[test]
    fn test_inner_html_replaces_children() {
        let host = HeadlessHost::new();
        let parent = host.create_element("div").unwrap();
        let child = host.create_element("p").unwrap();
        host.append_child(&parent, &child);
        assert_eq!(host.inner_html(&parent), "<p></p>");

        host.set_inner_html(&parent, "<b>hi</b>");
        assert_eq!(host.inner_html(&parent), "<b>hi</b>");
        assert!(parent.child_elements().is_empty());
    }

    #[test]
    fn test_invalid_tag_rejected() {
        let host = HeadlessHost::new();
        assert!(host.create_element("").is_err());
        assert!(host.create_element("<div>").is_err());
    }

    #[test]
    fn test_dropping_listener_unregisters() {
        let host = HeadlessHost::new();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let listener = host
            .listen_key_up(Box::new(move |_| counter.set(counter.get() + 1)))
            .unwrap();

        host.key_up("a");
        assert_eq!(hits.get(), 1);
        drop(listener);
        host.key_up("a");
        assert_eq!(hits.get(), 1);
        assert_eq!(host.key_up_listener_count(), 0);
    }

    #[test]
    fn test_interval_fires_per_period_until_dropped() {
        let host = HeadlessHost::new();
        let ticks = Rc::new(Cell::new(0));
        let counter = ticks.clone();
        let interval = host.start_interval(300, Box::new(move || counter.set(counter.get() + 1)));

        host.advance(299);
        assert_eq!(ticks.get(), 0);
        host.advance(1);
        assert_eq!(ticks.get(), 1);
        host.advance(900);
        assert_eq!(ticks.get(), 4);

        drop(interval);
        host.advance(3000);
        assert_eq!(ticks.get(), 4);
        assert_eq!(host.now_ms(), 4200);
    }

    #[test]
    fn test_scripted_fetch() {
        let host = HeadlessHost::new();
        let request = host.fetch_text("/terms", &[("lang", "en")]);
        assert_eq!(host.pending_requests(), 1);
        assert_eq!(
            host.requests(),
            vec![RequestRecord {
                locator: "/terms".into(),
                params: vec![("lang".into(), "en".into())],
            }]
        );

        assert!(host.respond("<p>Terms</p>"));
        assert_eq!(block_on(request), Ok("<p>Terms</p>".to_string()));
        assert!(!host.respond("nobody is waiting"));
    }
}
