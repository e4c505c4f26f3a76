//! The seam between a dialog controller and the document it lives in
//!
//! Everything the controller does to the outside world goes through [`Host`]:
//! building and attaching elements, reading geometry, document-body event
//! listeners, the recurring centering timer, blocking notifications, and the
//! network collaborator used for remote content.
//!
//! Listener and interval registrations come back as owned handles. Dropping a
//! handle unregisters exactly that listener or cancels exactly that timer, so
//! a controller tears down its own bindings without any shared global state.

use futures::future::LocalBoxFuture;

use crate::utils::errors::{FetchError, ModalError};

/// Width/height pair in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// What a click listener wants done with the native event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Let the event continue normally
    Ignore,
    /// Call `preventDefault()` on the event (e.g. stop an `<a href="#">` navigating)
    PreventDefault,
}

/// Body-level click listener: receives the element the click targeted
pub type ClickHandler<N> = Box<dyn FnMut(&N) -> ClickOutcome>;

/// Body-level key-up listener: receives the key name (`"Escape"`, `"a"`, ...)
pub type KeyHandler = Box<dyn FnMut(&str)>;

/// Recurring timer callback
pub type TickHandler = Box<dyn FnMut()>;

/// Key names that count as the escape key (`"Esc"` is the legacy spelling)
pub fn is_escape_key(key: &str) -> bool {
    matches!(key, "Escape" | "Esc")
}

/// A document a dialog can be rendered into
pub trait Host: 'static {
    /// Element handle; equality is identity
    type Node: Clone + PartialEq + std::fmt::Debug + 'static;
    /// Registered body listener; dropping it unregisters the listener
    type Listener: 'static;
    /// Running interval; dropping it cancels the timer
    type Interval: 'static;

    fn create_element(&self, tag: &str) -> Result<Self::Node, ModalError>;
    fn clone_node(&self, node: &Self::Node) -> Result<Self::Node, ModalError>;
    fn append_child(&self, parent: &Self::Node, child: &Self::Node);

    fn set_class_name(&self, node: &Self::Node, class_name: &str);
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
    /// Set one inline style property; `property` is already in CSS form
    fn set_style(&self, node: &Self::Node, property: &str, value: &str);
    /// Show (drop any inline `display: none`) or hide the node
    fn set_visible(&self, node: &Self::Node, visible: bool);
    fn is_visible(&self, node: &Self::Node) -> bool;

    fn set_inner_html(&self, node: &Self::Node, html: &str);
    fn inner_html(&self, node: &Self::Node) -> String;
    fn outer_html(&self, node: &Self::Node) -> String;

    /// Append the node as the last child of the document body
    fn append_to_body(&self, node: &Self::Node);
    /// Remove the node from wherever it is attached; no-op when detached
    fn detach(&self, node: &Self::Node);
    /// Whether the node is currently part of the rendered document
    fn is_attached(&self, node: &Self::Node) -> bool;

    fn viewport_size(&self) -> Size;
    /// Rendered size of the node including padding and border
    fn outer_size(&self, node: &Self::Node) -> Size;

    fn listen_click(&self, handler: ClickHandler<Self::Node>) -> Result<Self::Listener, ModalError>;
    fn listen_key_up(&self, handler: KeyHandler) -> Result<Self::Listener, ModalError>;
    fn start_interval(&self, period_ms: u32, tick: TickHandler) -> Self::Interval;

    /// Blocking user-facing notification
    fn alert(&self, message: &str);

    /// Single asynchronous GET of `locator` with `params` as the query string.
    /// Resolves exactly once with the response body or the failure.
    fn fetch_text(
        &self,
        locator: &str,
        params: &[(&str, &str)],
    ) -> LocalBoxFuture<'static, Result<String, FetchError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_key_names() {
        assert!(is_escape_key("Escape"));
        assert!(is_escape_key("Esc"));
        assert!(!is_escape_key("Enter"));
        assert!(!is_escape_key("escape"));
    }
}
