//! web-sys backed host for dialogs rendered into the current page
//!
//! Follows the same lifecycle rules as the rest of the app's DOM glue:
//! - No Closure::forget() - each listener closure lives in its handle
//! - Dropping a handle removes exactly the listener it registered
//! - Intervals are gloo timers, cancelled on drop

use futures::future::LocalBoxFuture;
use gloo_timers::callback::Interval;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, KeyboardEvent, Window};

use super::host::{ClickHandler, ClickOutcome, Host, KeyHandler, Size, TickHandler};
use super::http;
use crate::utils::errors::{FetchError, ModalError};

/// The browser document of the current window
#[derive(Clone)]
pub struct BrowserHost {
    window: Window,
    document: Document,
    body: HtmlElement,
}

/// A listener registered on the document body
pub struct BodyListener {
    body: HtmlElement,
    event: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

impl Drop for BodyListener {
    fn drop(&mut self) {
        if let Err(e) = self
            .body
            .remove_event_listener_with_callback(self.event, self.closure.as_ref().unchecked_ref())
        {
            log::error!("Failed to remove {} listener: {:?}", self.event, e);
        }
    }
}

impl BrowserHost {
    pub fn new() -> Result<Self, ModalError> {
        let window = web_sys::window().ok_or(ModalError::NoDocument)?;
        let document = window.document().ok_or(ModalError::NoDocument)?;
        let body = document.body().ok_or(ModalError::NoBody)?;
        Ok(Self { window, document, body })
    }

    fn listen(
        &self,
        event: &'static str,
        callback: Box<dyn FnMut(web_sys::Event)>,
    ) -> Result<BodyListener, ModalError> {
        let closure = Closure::wrap(callback);
        self.body
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|e| ModalError::Dom(format!("Failed to add {} listener: {:?}", event, e)))?;

        Ok(BodyListener { body: self.body.clone(), event, closure })
    }

    fn with_html_element(node: &Element, f: impl FnOnce(&HtmlElement)) {
        match node.dyn_ref::<HtmlElement>() {
            Some(el) => f(el),
            None => log::warn!("<{}> has no inline style", node.tag_name().to_lowercase()),
        }
    }
}

impl Host for BrowserHost {
    type Node = Element;
    type Listener = BodyListener;
    type Interval = Interval;

    fn create_element(&self, tag: &str) -> Result<Element, ModalError> {
        self.document.create_element(tag).map_err(|e| ModalError::CreateElement {
            tag: tag.to_string(),
            message: format!("{:?}", e),
        })
    }

    fn clone_node(&self, node: &Element) -> Result<Element, ModalError> {
        node.clone_node_with_deep(true)
            .map_err(|e| ModalError::Dom(format!("Failed to clone node: {:?}", e)))?
            .dyn_into::<Element>()
            .map_err(|_| ModalError::Dom("Cloned node is not an element".to_string()))
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        if let Err(e) = parent.append_child(child) {
            log::warn!("Failed to append child: {:?}", e);
        }
    }

    fn set_class_name(&self, node: &Element, class_name: &str) {
        node.set_class_name(class_name);
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) {
        if let Err(e) = node.set_attribute(name, value) {
            log::warn!("Failed to set attribute {}: {:?}", name, e);
        }
    }

    fn set_style(&self, node: &Element, property: &str, value: &str) {
        Self::with_html_element(node, |el| {
            if let Err(e) = el.style().set_property(property, value) {
                log::warn!("Failed to set style {}: {:?}", property, e);
            }
        });
    }

    fn set_visible(&self, node: &Element, visible: bool) {
        Self::with_html_element(node, |el| {
            let style = el.style();
            let result = if visible {
                style.remove_property("display").map(|_| ())
            } else {
                style.set_property("display", "none")
            };
            if let Err(e) = result {
                log::warn!("Failed to toggle visibility: {:?}", e);
            }
        });
    }

    fn is_visible(&self, node: &Element) -> bool {
        node.dyn_ref::<HtmlElement>()
            .and_then(|el| el.style().get_property_value("display").ok())
            .map_or(true, |display| display != "none")
    }

    fn set_inner_html(&self, node: &Element, html: &str) {
        node.set_inner_html(html);
    }

    fn inner_html(&self, node: &Element) -> String {
        node.inner_html()
    }

    fn outer_html(&self, node: &Element) -> String {
        node.outer_html()
    }

    fn append_to_body(&self, node: &Element) {
        if let Err(e) = self.body.append_child(node) {
            log::warn!("Failed to attach to body: {:?}", e);
        }
    }

    fn detach(&self, node: &Element) {
        node.remove();
    }

    fn is_attached(&self, node: &Element) -> bool {
        let node: &web_sys::Node = node;
        self.document.contains(Some(node))
    }

    fn viewport_size(&self) -> Size {
        let width = self.window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        let height = self.window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
        Size::new(width, height)
    }

    fn outer_size(&self, node: &Element) -> Size {
        node.dyn_ref::<HtmlElement>()
            .map(|el| Size::new(el.offset_width() as f64, el.offset_height() as f64))
            .unwrap_or_default()
    }

    fn listen_click(&self, mut handler: ClickHandler<Element>) -> Result<BodyListener, ModalError> {
        self.listen(
            "click",
            Box::new(move |event: web_sys::Event| {
                let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                    return;
                };
                if handler(&target) == ClickOutcome::PreventDefault {
                    event.prevent_default();
                }
            }),
        )
    }

    fn listen_key_up(&self, mut handler: KeyHandler) -> Result<BodyListener, ModalError> {
        self.listen(
            "keyup",
            Box::new(move |event: web_sys::Event| {
                if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                    handler(&event.key());
                }
            }),
        )
    }

    fn start_interval(&self, period_ms: u32, mut tick: TickHandler) -> Interval {
        Interval::new(period_ms, move || tick())
    }

    fn alert(&self, message: &str) {
        if let Err(e) = self.window.alert_with_message(message) {
            log::error!("Failed to show alert: {:?}", e);
        }
    }

    fn fetch_text(
        &self,
        locator: &str,
        params: &[(&str, &str)],
    ) -> LocalBoxFuture<'static, Result<String, FetchError>> {
        http::get_text(locator, params)
    }
}
