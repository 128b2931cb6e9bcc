//! Fence metadata and its marker comment encoding.
//!
//! The scanner stores each fence's metadata in an HTML comment placed right
//! before the opening fence line:
//!
//! ```text
//! <!-- do-fence:{"label":"app.py","prefix_type":"command","prefix_value":"$"} -->
//! ```
//!
//! pulldown-cmark passes the comment through untouched, and the redeemer finds
//! it again in the rendered HTML.

use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::info::PrefixFlag;

/// Prefix shared by every marker comment.
pub const MARKER_PREFIX: &str = "<!-- do-fence:";

/// Matches a marker comment; group 1 is the JSON payload.
pub(crate) static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!-- do-fence:(.*?) -->").unwrap());

/// Metadata extracted from one fence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FenceMetadata {
    /// Text of the `[label ...]` directive.
    pub label: Option<String>,
    /// Text of the `[secondary_label ...]` directive.
    pub secondary_label: Option<String>,
    /// Name from an accepted `[environment ...]` directive.
    pub environment: Option<String>,
    /// Prefix flag name (`line_numbers`, `command`, ...).
    pub prefix_type: Option<String>,
    /// Fixed prefix for every line; absent for `line_numbers`.
    pub prefix_value: Option<String>,
}

impl FenceMetadata {
    /// Check if no key is set (no marker is emitted for such fences).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.label.is_none()
            && self.secondary_label.is_none()
            && self.environment.is_none()
            && self.prefix_type.is_none()
            && self.prefix_value.is_none()
    }

    /// Record a prefix flag, replacing any earlier one.
    pub fn set_prefix(&mut self, flag: &PrefixFlag) {
        self.prefix_type = Some(flag.prefix_type().to_owned());
        self.prefix_value = flag.prefix_value().map(str::to_owned);
    }

    /// Encode as a single-line marker comment.
    ///
    /// Every `>` in the JSON is written as `\u003e`, so no value can close
    /// the comment early.
    ///
    /// # Example
    ///
    /// ```
    /// use dm_extensions::fence::FenceMetadata;
    ///
    /// let metadata = FenceMetadata {
    ///     label: Some("a --> b".to_owned()),
    ///     ..FenceMetadata::default()
    /// };
    /// assert_eq!(
    ///     metadata.to_marker(),
    ///     r#"<!-- do-fence:{"label":"a --\u003e b"} -->"#
    /// );
    /// ```
    #[must_use]
    pub fn to_marker(&self) -> String {
        let mut map = Map::new();
        let fields = [
            ("label", &self.label),
            ("secondary_label", &self.secondary_label),
            ("environment", &self.environment),
            ("prefix_type", &self.prefix_type),
            ("prefix_value", &self.prefix_value),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                map.insert(key.to_owned(), Value::String(value.clone()));
            }
        }
        let json = Value::Object(map).to_string().replace('>', "\\u003e");
        format!("{MARKER_PREFIX}{json} -->")
    }

    /// Decode the JSON payload of a marker comment.
    ///
    /// Unknown keys are ignored; non-string values are an error.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
