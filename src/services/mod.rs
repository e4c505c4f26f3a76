// Services
// Hosts a dialog can render into, and the network collaborator

pub mod headless;
pub mod host;

#[cfg(target_arch = "wasm32")]
pub mod browser;
#[cfg(target_arch = "wasm32")]
pub mod http;

pub use headless::{HeadlessHost, HeadlessNode};
pub use host::{ClickOutcome, Host, Size};

#[cfg(target_arch = "wasm32")]
pub use browser::BrowserHost;
