//! Inline style helpers
//!
//! Options arrive the way a page author writes them: numbers meaning pixels,
//! camelCase or kebab-case property names, and `false` for "leave unset".

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single inline style value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CssValue {
    /// A length in pixels
    Number(f64),
    /// Any CSS text, used verbatim (`"auto"`, `"50%"`, `"red"`)
    Text(String),
}

impl CssValue {
    /// Render as a value for `style.setProperty`
    pub fn to_css(&self) -> String {
        match self {
            CssValue::Number(n) => px(*n),
            CssValue::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for CssValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

impl From<f64> for CssValue {
    fn from(n: f64) -> Self {
        CssValue::Number(n)
    }
}

impl From<&str> for CssValue {
    fn from(s: &str) -> Self {
        CssValue::Text(s.to_string())
    }
}

impl From<String> for CssValue {
    fn from(s: String) -> Self {
        CssValue::Text(s)
    }
}

/// Format a pixel length (`300.0` -> `"300px"`, `12.5` -> `"12.5px"`)
pub fn px(value: f64) -> String {
    format!("{}px", value)
}

/// Convert a camelCase property name to its CSS form (`minHeight` -> `min-height`).
/// Names that are already kebab-case pass through unchanged.
pub fn property_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Serde adapter for size options: `false` (or a missing key) means unset,
/// a number means pixels, a string is used verbatim.
pub mod dimension {
    use super::CssValue;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Flag(bool),
        Value(CssValue),
    }

    pub fn serialize<S: Serializer>(value: &Option<CssValue>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => v.serialize(serializer),
            None => serializer.serialize_bool(false),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<CssValue>, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Flag(true) => {
                log::warn!("Ignoring `true` for a size option; expected false, a number or a CSS string");
                Ok(None)
            }
            Repr::Flag(false) => Ok(None),
            Repr::Value(CssValue::Text(s)) if s.is_empty() => Ok(None),
            Repr::Value(v) => Ok(Some(v)),
        }
    }
}
