//! Modal dialog options
//!
//! All fields are optional when deserialized; anything missing falls back to
//! the defaults below. Field names are camelCase on the wire so a page can
//! hand over the same options object it would write in script.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};

use super::content::Content;
use crate::services::host::Host;
use crate::utils::css::{dimension, CssValue};
use crate::utils::errors::ModalError;

/// Transition hook; returning `false` vetoes the open/close
pub type Hook = Rc<dyn Fn() -> bool>;

/// Default period of the auto-centering tick
pub const AUTO_CENTER_INTERVAL_MS: u32 = 300;

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModalConfig {
    /// Alerted when a fetch fails; empty disables the alert
    pub ajax_error_message: String,
    /// Markup shown while a fetch is pending; empty disables the loading
    /// state. Use [`ModalConfig::loading`] to set it from an element.
    pub loading_content: String,

    pub auto_center: bool,
    pub auto_center_interval_ms: u32,
    /// Open immediately when built with [`Modal::bind`](super::modal::Modal::bind)
    pub auto_open: bool,

    pub close_on_outside_click: bool,
    pub close_on_escape: bool,

    pub overlay_class_name: String,
    pub overlay_style: BTreeMap<String, CssValue>,
    pub container_class_name: String,
    /// Applied after the size options, so it wins over them
    pub container_style: BTreeMap<String, CssValue>,

    pub show_close_affordance: bool,
    /// Markup inside the close link. Use [`ModalConfig::close_affordance`]
    /// to set it from an element.
    pub close_affordance_content: String,

    #[serde(with = "dimension")]
    pub height: Option<CssValue>,
    #[serde(with = "dimension")]
    pub width: Option<CssValue>,
    #[serde(with = "dimension")]
    pub min_height: Option<CssValue>,
    #[serde(with = "dimension")]
    pub min_width: Option<CssValue>,
    #[serde(with = "dimension")]
    pub max_height: Option<CssValue>,
    #[serde(with = "dimension")]
    pub max_width: Option<CssValue>,

    /// Veto hook run before every open (`false` keeps the dialog closed)
    #[serde(skip)]
    pub on_open: Option<Hook>,
    /// Veto hook run before every close (`false` keeps the dialog open)
    #[serde(skip)]
    pub on_close: Option<Hook>,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            ajax_error_message: String::new(),
            loading_content: String::new(),
            auto_center: true,
            auto_center_interval_ms: AUTO_CENTER_INTERVAL_MS,
            auto_open: true,
            close_on_outside_click: true,
            close_on_escape: true,
            overlay_class_name: String::new(),
            overlay_style: BTreeMap::new(),
            container_class_name: String::new(),
            container_style: BTreeMap::new(),
            show_close_affordance: true,
            close_affordance_content: String::new(),
            height: Some(CssValue::Text("auto".to_string())),
            width: Some(CssValue::Text("auto".to_string())),
            min_height: None,
            min_width: None,
            max_height: None,
            max_width: None,
            on_open: None,
            on_close: None,
        }
    }
}

impl fmt::Debug for ModalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalConfig")
            .field("ajax_error_message", &self.ajax_error_message)
            .field("loading_content", &self.loading_content)
            .field("auto_center", &self.auto_center)
            .field("auto_center_interval_ms", &self.auto_center_interval_ms)
            .field("auto_open", &self.auto_open)
            .field("close_on_outside_click", &self.close_on_outside_click)
            .field("close_on_escape", &self.close_on_escape)
            .field("overlay_class_name", &self.overlay_class_name)
            .field("container_class_name", &self.container_class_name)
            .field("show_close_affordance", &self.show_close_affordance)
            .field("on_open", &self.on_open.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish_non_exhaustive()
    }
}

impl ModalConfig {
    /// Parse options from a JSON object.
    ///
    /// Hooks cannot travel through JSON; `onOpen`/`onClose` keys are ignored
    /// with a warning. Attach hooks with [`ModalConfig::on_open`] and
    /// [`ModalConfig::on_close`].
    pub fn from_json(json: &str) -> Result<Self, ModalError> {
        let hooks: HookKeys = serde_json::from_str(json)?;
        hooks.warn();
        Ok(serde_json::from_str(json)?)
    }

    /// Parse options from a JS object handed over by page script.
    ///
    /// Function-valued `onOpen`/`onClose` keys are ignored with a warning,
    /// as in [`ModalConfig::from_json`].
    #[cfg(target_arch = "wasm32")]
    pub fn from_js(value: wasm_bindgen::JsValue) -> Result<Self, ModalError> {
        let hooks: HookKeys = serde_wasm_bindgen::from_value(value.clone())
            .map_err(|e| ModalError::InvalidConfig(e.to_string()))?;
        hooks.warn();
        serde_wasm_bindgen::from_value(value).map_err(|e| ModalError::InvalidConfig(e.to_string()))
    }

    /// Set the loading content from markup or an element
    pub fn loading<H: Host>(mut self, host: &H, content: impl Into<Content<H::Node>>) -> Self {
        self.loading_content = content.into().to_html(host);
        self
    }

    /// Set the close link's content from markup or an element
    pub fn close_affordance<H: Host>(mut self, host: &H, content: impl Into<Content<H::Node>>) -> Self {
        self.close_affordance_content = content.into().to_html(host);
        self
    }

    /// Veto hook run before every open
    pub fn on_open(mut self, hook: impl Fn() -> bool + 'static) -> Self {
        self.on_open = Some(Rc::new(hook));
        self
    }

    /// Veto hook run before every close
    pub fn on_close(mut self, hook: impl Fn() -> bool + 'static) -> Self {
        self.on_close = Some(Rc::new(hook));
        self
    }

    /// Run the open hook; true when the dialog may open
    pub(crate) fn allows_open(&self) -> bool {
        self.on_open.as_ref().map_or(true, |hook| hook())
    }

    /// Run the close hook; true when the dialog may close
    pub(crate) fn allows_close(&self) -> bool {
        self.on_close.as_ref().map_or(true, |hook| hook())
    }

    /// The six size constraints in CSS property form, unset ones skipped
    pub(crate) fn dimensions(&self) -> Vec<(&'static str, &CssValue)> {
        [
            ("height", &self.height),
            ("width", &self.width),
            ("min-height", &self.min_height),
            ("min-width", &self.min_width),
            ("max-height", &self.max_height),
            ("max-width", &self.max_width),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_ref().map(|v| (name, v)))
        .collect()
    }
}

/// Hook keys an options object may carry; they cannot be deserialized
/// into [`Hook`]s and are dropped
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HookKeys {
    on_open: Option<IgnoredAny>,
    on_close: Option<IgnoredAny>,
}

impl HookKeys {
    fn ignored(&self) -> Vec<&'static str> {
        let mut keys = Vec::new();
        if self.on_open.is_some() {
            keys.push("onOpen");
        }
        if self.on_close.is_some() {
            keys.push("onClose");
        }
        keys
    }

    fn warn(&self) {
        for key in self.ignored() {
            log::warn!("Ignoring `{}` in modal options; attach hooks with ModalConfig::on_open/on_close", key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::headless::HeadlessHost;
    use std::cell::Cell;

    #[test]
    fn test_defaults() {
        let config = ModalConfig::default();
        assert!(config.auto_center);
        assert!(config.auto_open);
        assert!(config.close_on_outside_click);
        assert!(config.close_on_escape);
        assert!(config.show_close_affordance);
        assert_eq!(config.auto_center_interval_ms, 300);
        assert!(config.ajax_error_message.is_empty());
        assert!(config.loading_content.is_empty());
        assert_eq!(
            config.dimensions(),
            vec![("height", &CssValue::Text("auto".into())), ("width", &CssValue::Text("auto".into()))]
        );
    }

    #[test]
    fn test_from_json_partial() {
        let config = ModalConfig::from_json(
            r#"{
                "ajaxErrorMessage": "Failed",
                "closeOnEscape": false,
                "width": 480,
                "maxHeight": "80%",
                "height": false,
                "containerStyle": {"backgroundColor": "white", "padding": 12}
            }"#,
        )
        .unwrap();

        assert_eq!(config.ajax_error_message, "Failed");
        assert!(!config.close_on_escape);
        assert!(config.close_on_outside_click);
        assert_eq!(config.height, None);
        assert_eq!(config.width, Some(CssValue::Number(480.0)));
        assert_eq!(
            config.dimensions(),
            vec![("width", &CssValue::Number(480.0)), ("max-height", &CssValue::Text("80%".into()))]
        );
        assert_eq!(config.container_style.get("padding"), Some(&CssValue::Number(12.0)));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            ModalConfig::from_json(r#"{"autoOpen": "yes please"}"#),
            Err(ModalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_hooks() {
        let config = ModalConfig::default();
        assert!(config.allows_open());
        assert!(config.allows_close());

        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let config = config.on_open(move || {
            counter.set(counter.get() + 1);
            false
        });
        assert!(!config.allows_open());
        assert!(config.allows_close());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_from_json_drops_hook_keys() {
        let json = r#"{"onOpen": "confirm()", "autoOpen": false}"#;
        let hooks: HookKeys = serde_json::from_str(json).unwrap();
        assert_eq!(hooks.ignored(), vec!["onOpen"]);

        let config = ModalConfig::from_json(json).unwrap();
        assert!(!config.auto_open);
        assert!(config.on_open.is_none());

        let hooks: HookKeys = serde_json::from_str(r#"{"width": 300}"#).unwrap();
        assert!(hooks.ignored().is_empty());
    }

    #[test]
    fn test_content_builders_accept_nodes() {
        let host = HeadlessHost::new();
        let spinner = host.create_element("span").unwrap();
        host.set_inner_html(&spinner, "Loading");

        let config = ModalConfig::default()
            .loading(&host, Content::Node(spinner))
            .close_affordance(&host, "<b>x</b>");
        assert_eq!(config.loading_content, "<span>Loading</span>");
        assert_eq!(config.close_affordance_content, "<b>x</b>");
    }
}
