//! Modal dialog error types
//!
//! Vetoed transitions and closing an already-closed dialog are not errors;
//! these types only cover a missing or broken host document, bad
//! configuration input, and the outcome of a remote content exchange.

use std::fmt;

/// Failures while building a dialog or talking to the host document
#[derive(Debug, Clone, PartialEq)]
pub enum ModalError {
    /// No `window`/`document` is available (not running in a browser page)
    NoDocument,
    /// The document has no `<body>` to attach to
    NoBody,
    /// The host refused to create an element
    CreateElement { tag: String, message: String },
    /// Any other host-level DOM failure
    Dom(String),
    /// Configuration input could not be parsed
    InvalidConfig(String),
}

impl fmt::Display for ModalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDocument => write!(f, "No document available"),
            Self::NoBody => write!(f, "Document has no body"),
            Self::CreateElement { tag, message } => {
                write!(f, "Failed to create <{}> element: {}", tag, message)
            }
            Self::Dom(msg) => write!(f, "DOM error: {}", msg),
            Self::InvalidConfig(msg) => write!(f, "Invalid modal configuration: {}", msg),
        }
    }
}

impl std::error::Error for ModalError {}

impl From<serde_json::Error> for ModalError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

/// Outcome of a failed remote content exchange
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The request never produced a response (offline, CORS, aborted)
    Network(String),
    /// The server answered with a non-success status
    Status(u16),
    /// The response body could not be read as text
    Body(String),
    /// A newer fetch on the same dialog started before this one settled
    Superseded,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "Request failed: {}", msg),
            Self::Status(code) => write!(f, "HTTP error: {}", code),
            Self::Body(msg) => write!(f, "Failed to read response: {}", msg),
            Self::Superseded => write!(f, "Superseded by a newer request"),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// True when the exchange was dropped in favour of a newer one rather
    /// than failing on the wire
    pub fn is_superseded(&self) -> bool {
        matches!(self, Self::Superseded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(FetchError::Status(404).to_string(), "HTTP error: 404");
        assert_eq!(
            ModalError::CreateElement { tag: "div".into(), message: "nope".into() }.to_string(),
            "Failed to create <div> element: nope"
        );
    }

    #[test]
    fn test_config_parse_errors_convert() {
        let err: ModalError = serde_json::from_str::<u32>("{").unwrap_err().into();
        assert!(matches!(err, ModalError::InvalidConfig(_)));
    }

    #[test]
    fn test_superseded() {
        assert!(FetchError::Superseded.is_superseded());
        assert!(!FetchError::Network("offline".into()).is_superseded());
    }
}
