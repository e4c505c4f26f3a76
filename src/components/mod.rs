pub mod content;
pub mod modal;
pub mod modal_config;

pub use content::Content;
pub use modal::Modal;
pub use modal_config::ModalConfig;
