//! Modal dialogs for browser documents
//!
//! A [`Modal`] builds an overlay and a dialog box, attaches them to the page
//! on [`Modal::open`], removes them on [`Modal::close`], keeps the box
//! centered while open, and can fill itself from a remote URL with
//! [`Modal::fetch`].
//!
//! ```
//! use modal_dialog::{HeadlessHost, Modal, ModalConfig};
//!
//! let host = HeadlessHost::new();
//! let modal = Modal::new(host, ModalConfig::default()).unwrap();
//! modal.open_with("<p>Hi</p>");
//! assert!(modal.is_attached());
//! assert_eq!(modal.content_html(), "<p>Hi</p>");
//! ```
//!
//! In the browser, use [`Modal::in_browser`] (wasm32 only), which renders
//! into the current page through web-sys.

pub mod components;
pub mod services;
pub mod utils;

pub use components::{Content, Modal, ModalConfig};
pub use services::{ClickOutcome, HeadlessHost, HeadlessNode, Host, Size};
pub use utils::{CssValue, FetchError, ModalError};

#[cfg(target_arch = "wasm32")]
pub use services::BrowserHost;
