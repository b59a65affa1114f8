//! Response projection strategy.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::ui::view::RenderedContent;

/// A citation surfaced by the research API.
///
/// Derived once from the raw response when the assistant turn is created and
/// cached on that turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Title of the cited document.
    pub display_title: String,
    /// Source or jurisdiction label.
    pub source_label: String,
    /// Plain-text snippet (emphasis markup removed).
    pub snippet: String,
    /// Outbound link.
    pub link: String,
}

/// Strategy reading one research response shape.
///
/// All methods are pure: the same raw value always yields the same output.
pub trait Projection: Send + Sync + fmt::Debug {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Flatten a raw response into resources, in response order.
    fn resources(&self, raw: &Value) -> Result<Vec<Resource>>;

    /// Build display cards for a raw response.
    fn render(&self, raw: &Value) -> Result<RenderedContent>;

    /// Synthesize a response of this shape describing a failed request.
    ///
    /// `message` is the full display text, e.g.
    /// `"Error: API request failed with status 500. Please try again."`.
    fn error_document(&self, message: &str) -> Value;
}

/// Deserialize a raw response into a typed shape, reporting missing or
/// mistyped fields as [`Error::Shape`].
pub(crate) fn parse_shape<T: serde::de::DeserializeOwned>(raw: &Value) -> Result<T> {
    T::deserialize(raw).map_err(|e| Error::Shape(e.to_string()))
}

/// A JSON scalar the API sends as either a string or a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum Scalar {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

/// Free text the API sends as a string or as a list of strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum TextOrList {
    Text(String),
    List(Vec<String>),
}

impl fmt::Display for TextOrList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::List(items) => f.write_str(&items.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_accepts_strings_and_numbers() {
        let s: Scalar = serde_json::from_value(json!("12345")).unwrap();
        let n: Scalar = serde_json::from_value(json!(12345)).unwrap();
        assert_eq!(s.to_string(), "12345");
        assert_eq!(n.to_string(), "12345");
    }

    #[test]
    fn text_or_list_joins_lists() {
        let t: TextOrList = serde_json::from_value(json!(["offer", "acceptance"])).unwrap();
        assert_eq!(t.to_string(), "offer, acceptance");
    }
}
