// Utility functions
// Helpers shared by the dialog controller and its hosts

pub mod css;
pub mod errors;

pub use css::CssValue;
pub use errors::{FetchError, ModalError};
