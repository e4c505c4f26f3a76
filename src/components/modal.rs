//! Modal dialog controller
//!
//! A [`Modal`] owns four elements for its whole life: the overlay, the
//! container, the close affordance and the content region inside the
//! container. Opening attaches overlay and container to the document body;
//! closing detaches them. Whether the container is attached is the only
//! record of "open".
//!
//! While open the dialog holds:
//! - its own pair of body listeners (click, key-up), stored as owned handles
//!   so exactly this dialog's listeners go away on close
//! - at most one auto-centering interval, also an owned handle, dropped on
//!   every close path
//!
//! Listener and timer closures only hold weak references back to the dialog,
//! so dropping the last [`Modal`] handle releases them too.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::content::Content;
use super::modal_config::ModalConfig;
use crate::services::host::{is_escape_key, ClickOutcome, Host};
use crate::utils::css::{property_name, px};
use crate::utils::errors::{FetchError, ModalError};

pub const OVERLAY_CLASS: &str = "modal-overlay";
pub const CONTAINER_CLASS: &str = "modal-container";
pub const CLOSE_CLASS: &str = "modal-close";
pub const CONTENT_CLASS: &str = "modal-content";

/// Handle to one modal dialog. Clones share the same dialog.
pub struct Modal<H: Host> {
    inner: Rc<Inner<H>>,
}

impl<H: Host> Clone for Modal<H> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

struct Inner<H: Host> {
    host: H,
    config: ModalConfig,
    overlay: H::Node,
    container: H::Node,
    content: H::Node,
    close_affordance: H::Node,
    /// Present exactly while this dialog's body listeners are registered
    listeners: RefCell<Option<DocumentListeners<H>>>,
    /// Present exactly while the centering tick runs
    auto_center: RefCell<Option<H::Interval>>,
    /// Bumped by every fetch; a response whose generation is stale is dropped
    fetch_generation: Cell<u64>,
}

struct DocumentListeners<H: Host> {
    _click: H::Listener,
    _key_up: H::Listener,
}

impl<H: Host> Modal<H> {
    /// Build the dialog's elements. Nothing is attached to the document.
    pub fn new(host: H, config: ModalConfig) -> Result<Self, ModalError> {
        let overlay = host.create_element("div")?;
        host.set_class_name(&overlay, &class_list(OVERLAY_CLASS, &config.overlay_class_name));
        for (property, value) in &config.overlay_style {
            host.set_style(&overlay, &property_name(property), &value.to_css());
        }

        let container = host.create_element("div")?;
        host.set_class_name(&container, &class_list(CONTAINER_CLASS, &config.container_class_name));

        let close_affordance = host.create_element("a")?;
        host.set_attribute(&close_affordance, "href", "#");
        host.set_class_name(&close_affordance, CLOSE_CLASS);
        host.set_inner_html(&close_affordance, &config.close_affordance_content);
        host.append_child(&container, &close_affordance);
        if !config.show_close_affordance {
            host.set_visible(&close_affordance, false);
        }

        let content = host.create_element("div")?;
        host.set_class_name(&content, CONTENT_CLASS);
        host.append_child(&container, &content);

        for (property, value) in config.dimensions() {
            host.set_style(&container, property, &value.to_css());
        }
        for (property, value) in &config.container_style {
            host.set_style(&container, &property_name(property), &value.to_css());
        }

        Ok(Self {
            inner: Rc::new(Inner {
                host,
                config,
                overlay,
                container,
                content,
                close_affordance,
                listeners: RefCell::new(None),
                auto_center: RefCell::new(None),
                fetch_generation: Cell::new(0),
            }),
        })
    }

    /// Build a dialog whose initial content is a copy of `fragment`, made
    /// visible, and open it unless `auto_open` is off.
    pub fn bind(host: H, fragment: &H::Node, config: ModalConfig) -> Result<Self, ModalError> {
        let copy = host.clone_node(fragment)?;
        host.set_visible(&copy, true);
        let html = host.outer_html(&copy);

        let modal = Self::new(host, config)?;
        modal.inner.host.set_inner_html(&modal.inner.content, &html);
        if modal.inner.config.auto_open {
            modal.open();
        }
        Ok(modal)
    }

    /// Whether the dialog is currently part of the document
    pub fn is_attached(&self) -> bool {
        self.inner.host.is_attached(&self.inner.container)
    }

    /// Open the dialog, keeping its current content
    pub fn open(&self) -> &Self {
        self.open_inner(None)
    }

    /// Replace the content and open the dialog
    pub fn open_with(&self, content: impl Into<Content<H::Node>>) -> &Self {
        self.open_inner(Some(content.into()))
    }

    fn open_inner(&self, content: Option<Content<H::Node>>) -> &Self {
        let inner = &self.inner;
        if !inner.config.allows_open() {
            log::debug!("Modal open vetoed by on_open hook");
            return self;
        }

        if let Some(content) = content {
            let html = content.to_html(&inner.host);
            inner.host.set_inner_html(&inner.content, &html);
        }

        if !self.is_attached() {
            inner.host.append_to_body(&inner.overlay);
            inner.host.append_to_body(&inner.container);
            self.register_listeners();
            log::debug!("Modal opened");
        }

        if inner.config.auto_center {
            self.start_auto_center();
        }

        self
    }

    /// Close the dialog. Closing a closed dialog is a no-op apart from the
    /// hook and stopping any leftover centering tick.
    pub fn close(&self) -> &Self {
        let inner = &self.inner;
        if !inner.config.allows_close() {
            log::debug!("Modal close vetoed by on_close hook");
            return self;
        }

        // Taken out first so the handles drop after the borrow is released;
        // close may be running inside one of these very listeners.
        let listeners = inner.listeners.borrow_mut().take();
        drop(listeners);

        if self.is_attached() {
            inner.host.detach(&inner.container);
            inner.host.detach(&inner.overlay);
            log::debug!("Modal closed");
        }

        self.stop_auto_center();
        self
    }

    /// GET `locator` and show the response body in the dialog.
    ///
    /// With loading content configured, the dialog opens on it (close
    /// affordance hidden) before the request goes out. A failure alerts the
    /// configured error message, closing the loading dialog first. The close
    /// affordance is shown again once the exchange settles if it is
    /// configured visible. Only the latest fetch on a dialog takes effect;
    /// older ones settle as [`FetchError::Superseded`].
    pub async fn fetch(&self, locator: &str, params: &[(&str, &str)]) -> Result<(), FetchError> {
        let inner = &self.inner;
        let generation = inner.fetch_generation.get() + 1;
        inner.fetch_generation.set(generation);

        let loading = inner.config.loading_content.clone();
        let show_loading = !loading.is_empty();
        if show_loading {
            inner.host.set_visible(&inner.close_affordance, false);
            self.open_with(Content::Html(loading));
        }

        log::debug!("Fetching modal content from {}", locator);
        let outcome = inner.host.fetch_text(locator, params).await;

        if inner.fetch_generation.get() != generation {
            log::debug!("Discarding response from {}: a newer fetch is in flight", locator);
            return Err(FetchError::Superseded);
        }

        let result = match outcome {
            Ok(body) => {
                log::info!("Loaded modal content from {}", locator);
                self.open_with(Content::Html(body));
                Ok(())
            }
            Err(e) => {
                log::warn!("Failed to load modal content from {}: {}", locator, e);
                let message = &inner.config.ajax_error_message;
                if !message.is_empty() {
                    if show_loading {
                        self.close();
                    }
                    inner.host.alert(message);
                }
                Err(e)
            }
        };

        if inner.config.show_close_affordance {
            inner.host.set_visible(&inner.close_affordance, true);
        }

        result
    }

    /// Current markup of the content region
    pub fn content_html(&self) -> String {
        self.inner.host.inner_html(&self.inner.content)
    }

    pub fn config(&self) -> &ModalConfig {
        &self.inner.config
    }

    pub fn host(&self) -> &H {
        &self.inner.host
    }

    pub fn overlay(&self) -> &H::Node {
        &self.inner.overlay
    }

    pub fn container(&self) -> &H::Node {
        &self.inner.container
    }

    pub fn content(&self) -> &H::Node {
        &self.inner.content
    }

    pub fn close_affordance(&self) -> &H::Node {
        &self.inner.close_affordance
    }

    /// Whether the centering tick is currently scheduled
    pub fn is_auto_centering(&self) -> bool {
        self.inner.auto_center.borrow().is_some()
    }

    fn downgrade(&self) -> Weak<Inner<H>> {
        Rc::downgrade(&self.inner)
    }

    fn from_weak(weak: &Weak<Inner<H>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn register_listeners(&self) {
        let host = &self.inner.host;

        let weak = self.downgrade();
        let click = host.listen_click(Box::new(move |target: &H::Node| {
            match Self::from_weak(&weak) {
                Some(modal) => modal.handle_click(target),
                None => ClickOutcome::Ignore,
            }
        }));

        let weak = self.downgrade();
        let key_up = host.listen_key_up(Box::new(move |key: &str| {
            if let Some(modal) = Self::from_weak(&weak) {
                modal.handle_key_up(key);
            }
        }));

        match (click, key_up) {
            (Ok(click), Ok(key_up)) => {
                // Replacing any stale pair drops it, so there is never more than one
                *self.inner.listeners.borrow_mut() = Some(DocumentListeners {
                    _click: click,
                    _key_up: key_up,
                });
            }
            (Err(e), _) | (_, Err(e)) => {
                log::warn!("Failed to register modal listeners: {}", e);
            }
        }
    }

    fn handle_click(&self, target: &H::Node) -> ClickOutcome {
        let inner = &self.inner;
        if *target == inner.overlay {
            if inner.config.close_on_outside_click {
                self.close();
            }
            ClickOutcome::Ignore
        } else if *target == inner.close_affordance {
            self.close();
            ClickOutcome::PreventDefault
        } else {
            ClickOutcome::Ignore
        }
    }

    fn handle_key_up(&self, key: &str) {
        if self.inner.config.close_on_escape && is_escape_key(key) {
            self.close();
        }
    }

    fn start_auto_center(&self) {
        self.center();

        let mut slot = self.inner.auto_center.borrow_mut();
        if slot.is_none() {
            let weak = self.downgrade();
            let interval = self.inner.host.start_interval(
                self.inner.config.auto_center_interval_ms,
                Box::new(move || {
                    if let Some(modal) = Self::from_weak(&weak) {
                        modal.center();
                    }
                }),
            );
            *slot = Some(interval);
            log::debug!("Modal auto-centering started");
        }
    }

    fn stop_auto_center(&self) {
        let interval = self.inner.auto_center.borrow_mut().take();
        if interval.is_some() {
            log::debug!("Modal auto-centering stopped");
        }
    }

    /// Position the container in the middle of the viewport
    pub fn center(&self) {
        let host = &self.inner.host;
        let viewport = host.viewport_size();
        let size = host.outer_size(&self.inner.container);
        host.set_style(&self.inner.container, "left", &px((viewport.width - size.width) / 2.0));
        host.set_style(&self.inner.container, "top", &px((viewport.height - size.height) / 2.0));
    }
}

#[cfg(target_arch = "wasm32")]
impl Modal<crate::services::browser::BrowserHost> {
    /// Build a dialog for the current page
    pub fn in_browser(config: ModalConfig) -> Result<Self, ModalError> {
        Self::new(crate::services::browser::BrowserHost::new()?, config)
    }

    /// Run [`Modal::fetch`] in the background; the outcome is only logged
    pub fn spawn_fetch(&self, locator: &str, params: &[(&str, &str)]) {
        let modal = self.clone();
        let locator = locator.to_string();
        let params: Vec<(String, String)> = params.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();

        wasm_bindgen_futures::spawn_local(async move {
            let params: Vec<(&str, &str)> = params.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
            if let Err(e) = modal.fetch(&locator, &params).await {
                log::debug!("Background modal fetch for {} ended: {}", locator, e);
            }
        });
    }
}

fn class_list(base: &str, extra: &str) -> String {
    let extra = extra.trim();
    if extra.is_empty() {
        base.to_string()
    } else {
        format!("{} {}", base, extra)
    }
}
