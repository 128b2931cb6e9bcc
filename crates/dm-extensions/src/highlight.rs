//! `<^>text<^>` highlight markers.
//!
//! pulldown-cmark escapes the marker to `&lt;^&gt;` in prose, code spans and
//! fenced code alike, so a single pass over the rendered HTML turns every
//! marked pair into `<mark>text</mark>`.
//!
//! # Example
//!
//! ```
//! use dm_extensions::HighlightExtension;
//! use dm_pipeline::Pipeline;
//!
//! let pipeline = Pipeline::new().with_extension(HighlightExtension);
//! assert_eq!(
//!     pipeline.convert("Set <^>port<^> first."),
//!     "<p>Set <mark>port</mark> first.</p>\n"
//! );
//! ```

use std::sync::LazyLock;

use dm_pipeline::{Extension, Pipeline, Postprocessor};
use regex::Regex;

/// Registry name of the highlight postprocessor.
pub const POSTPROCESSOR_NAME: &str = "do-highlight-post";

/// An escaped `<^>...<^>` pair on one line; group 1 is the highlighted text.
static ESCAPED_HIGHLIGHT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&lt;\^&gt;(.*?)&lt;\^&gt;").unwrap());

/// Replaces escaped highlight pairs with `<mark>` elements.
#[derive(Clone, Copy, Debug, Default)]
pub struct HighlightPostprocessor;

impl Postprocessor for HighlightPostprocessor {
    fn run(&self, html: &mut String) {
        if !ESCAPED_HIGHLIGHT_RE.is_match(html) {
            return;
        }
        *html = ESCAPED_HIGHLIGHT_RE
            .replace_all(html, "<mark>$1</mark>")
            .into_owned();
    }
}

/// Registers the highlight postprocessor (priority 25).
#[derive(Clone, Copy, Debug, Default)]
pub struct HighlightExtension;

impl Extension for HighlightExtension {
    fn extend(self, pipeline: &mut Pipeline) {
        pipeline
            .postprocessors_mut()
            .register(POSTPROCESSOR_NAME, 25, Box::new(HighlightPostprocessor));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn render(markdown: &str) -> String {
        Pipeline::new()
            .with_extension(HighlightExtension)
            .convert(markdown)
    }

    #[test]
    fn test_basic_inline() {
        assert_eq!(
            render("Set the <^>variable<^> here."),
            "<p>Set the <mark>variable</mark> here.</p>\n"
        );
    }

    #[test]
    fn test_multiple_highlights_same_line() {
        let html = render("<^>a<^> and <^>b<^>");
        assert!(html.contains("<mark>a</mark>"));
        assert!(html.contains("<mark>b</mark>"));
    }

    #[test]
    fn test_inline_code_highlight() {
        assert_eq!(
            render("Use `let <^>var<^> = 1;`"),
            "<p>Use <code>let <mark>var</mark> = 1;</code></p>\n"
        );
    }

    #[test]
    fn test_fenced_code_highlight() {
        let html = render("```js\nconst x = <^>highlighted<^>;\n```\n");
        assert_eq!(
            html,
            "<pre><code class=\"language-js\">const x = <mark>highlighted</mark>;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_unclosed_marker_left_alone() {
        let html = render("only <^>one marker");
        assert!(!html.contains("<mark>"));
        assert!(html.contains("&lt;^&gt;one marker"));
    }

    #[test]
    fn test_empty_highlight() {
        assert!(render("x <^><^> y").contains("<mark></mark>"));
    }

    #[test]
    fn test_does_not_cross_lines() {
        let html = render("```\n<^>first\nsecond<^>\n```\n");
        assert!(!html.contains("<mark>"));
    }

    #[test]
    fn test_no_markers_passthrough() {
        assert_eq!(
            render("plain text with no markers"),
            "<p>plain text with no markers</p>\n"
        );
    }
}
