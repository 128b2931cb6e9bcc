//! Fence marker redeemer.
//!
//! Runs on the rendered HTML. Every marker comment left by the scanner is
//! removed and its metadata applied to the `<pre>`/`<code>` block that
//! follows it: label divs, environment and prefix classes, and per-line
//! prefix lists.
//!
//! All edits for all markers are computed against the same rendered string
//! and applied in one pass with [`Edits`], so no marker's rewrite can shift
//! the offsets of another.

use std::ops::Range;
use std::sync::LazyLock;

use dm_pipeline::{Edits, Postprocessor, escape_html};
use regex::Regex;

use super::FenceConfig;
use super::info::LINE_NUMBERS;
use super::metadata::{FenceMetadata, MARKER_PREFIX, MARKER_RE};

static PRE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<pre[^>]*>").unwrap());
static CODE_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<code[^>]*>").unwrap());

const CODE_CLOSE: &str = "</code>";

/// Postprocessor that replaces fence markers with label and prefix markup.
///
/// # Example
///
/// ```
/// use dm_extensions::fence::{FenceConfig, FencePostprocessor};
/// use dm_pipeline::Postprocessor;
///
/// let redeemer = FencePostprocessor::new(&FenceConfig::default());
/// let mut html = concat!(
///     r#"<!-- do-fence:{"label":"app.py","prefix_type":"command","prefix_value":"$"} -->"#,
///     "\n<pre><code>ls\n</code></pre>\n",
/// )
/// .to_owned();
/// redeemer.run(&mut html);
///
/// assert_eq!(
///     html,
///     concat!(
///         r#"<div class="code-label" title="app.py">app.py</div>"#,
///         "\n\n",
///         r#"<pre class="prefixed command"><code><ol><li data-prefix="$">ls</li></ol></code></pre>"#,
///         "\n",
///     )
/// );
/// ```
#[derive(Clone, Debug)]
pub struct FencePostprocessor {
    label_class: String,
    secondary_label_class: String,
}

impl FencePostprocessor {
    /// Create a redeemer with the label classes from `config`.
    #[must_use]
    pub fn new(config: &FenceConfig) -> Self {
        Self {
            label_class: escape_html(&config.label_class),
            secondary_label_class: escape_html(&config.secondary_label_class),
        }
    }

    /// Register the edits for one marker spanning `marker`.
    ///
    /// Tags are searched forward from the end of the marker comment and must
    /// end before `limit`, the start of the next marker. A marker with no
    /// block of its own in that window only has its label applied.
    fn redeem(
        &self,
        html: &str,
        marker: Range<usize>,
        limit: usize,
        metadata: &FenceMetadata,
        edits: &mut Edits,
    ) {
        let search_from = marker.end;
        let window = &html[..limit];

        let label_html = metadata
            .label
            .as_deref()
            .map(|label| label_div(&self.label_class, label) + "\n")
            .unwrap_or_default();
        edits.replace(marker, label_html);

        let mut classes = Vec::new();
        if let Some(environment) = &metadata.environment {
            let name = sanitize_environment(environment);
            if name.is_empty() {
                tracing::debug!(%environment, "Environment sanitizes to empty, skipping class");
            } else {
                classes.push(format!("environment-{name}"));
            }
        }
        if let Some(prefix_type) = &metadata.prefix_type {
            classes.push(format!("prefixed {}", escape_html(prefix_type)));
        }
        if !classes.is_empty() {
            if let Some(pre) = PRE_TAG_RE.find_at(window, search_from) {
                let mut tag = pre.as_str().to_owned();
                for class in &classes {
                    tag = add_class(&tag, class);
                }
                edits.replace(pre.range(), tag);
            } else {
                tracing::debug!(search_from, "No <pre> tag after fence marker");
            }
        }

        let needs_code = metadata.secondary_label.is_some() || metadata.prefix_type.is_some();
        if !needs_code {
            return;
        }
        let Some(code) = CODE_TAG_RE.find_at(window, search_from) else {
            tracing::debug!(search_from, "No <code> tag after fence marker");
            return;
        };

        // Must be registered before the prefix list so an insertion into
        // empty content still lands ahead of the list.
        if let Some(secondary) = &metadata.secondary_label {
            edits.insert(code.end(), label_div(&self.secondary_label_class, secondary));
        }

        if let Some(prefix_type) = &metadata.prefix_type {
            let Some(close) = window[code.end()..].find(CODE_CLOSE) else {
                tracing::debug!(search_from, "Unclosed <code> tag after fence marker");
                return;
            };
            let inner = code.end()..code.end() + close;
            let list = prefix_list(
                &html[inner.clone()],
                prefix_type,
                metadata.prefix_value.as_deref(),
            );
            edits.replace(inner, list);
        }
    }
}

impl Postprocessor for FencePostprocessor {
    fn run(&self, html: &mut String) {
        if !html.contains(MARKER_PREFIX) {
            return;
        }

        let markers: Vec<_> = MARKER_RE
            .captures_iter(html)
            .filter_map(|caps| Some((caps.get(0)?.range(), caps.get(1)?.as_str())))
            .collect();

        let mut edits = Edits::new();
        for (idx, (marker, json)) in markers.iter().enumerate() {
            let limit = markers
                .get(idx + 1)
                .map_or(html.len(), |(next, _)| next.start);
            match FenceMetadata::from_json(json) {
                Ok(metadata) => self.redeem(html, marker.clone(), limit, &metadata, &mut edits),
                Err(error) => {
                    tracing::debug!(%error, marker = &html[marker.clone()], "Malformed fence marker, removing");
                    edits.replace(marker.clone(), "");
                }
            }
        }

        tracing::debug!(edits = edits.len(), "Redeemed fence markers");
        edits.apply(html);
    }
}

/// Render a label `div` with escaped title and text.
fn label_div(class: &str, text: &str) -> String {
    let text = escape_html(text);
    format!(r#"<div class="{class}" title="{text}">{text}</div>"#)
}

/// Keep only ASCII letters, digits and hyphens.
fn sanitize_environment(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

/// Add `class` to an opening tag, ahead of any existing classes.
fn add_class(tag: &str, class: &str) -> String {
    if tag.contains(r#"class=""#) {
        tag.replacen(r#"class=""#, &format!(r#"class="{class} "#), 1)
    } else {
        tag.replacen("<pre", &format!(r#"<pre class="{class}""#), 1)
    }
}

/// Wrap each line of rendered code content in a prefixed list item.
fn prefix_list(content: &str, prefix_type: &str, prefix_value: Option<&str>) -> String {
    if content.is_empty() {
        return "<ol></ol>".to_owned();
    }

    let content = content.strip_suffix('\n').unwrap_or(content);
    let fixed = escape_html(prefix_value.unwrap_or_default());

    let mut list = String::with_capacity(content.len() * 2);
    list.push_str("<ol>");
    for (idx, line) in content.split('\n').enumerate() {
        let prefix = if prefix_type == LINE_NUMBERS {
            (idx + 1).to_string()
        } else {
            fixed.clone()
        };
        list.push_str(&format!(r#"<li data-prefix="{prefix}">{line}</li>"#));
    }
    list.push_str("</ol>");
    list
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn redeem(html: &str) -> String {
        let mut html = html.to_owned();
        FencePostprocessor::new(&FenceConfig::default()).run(&mut html);
        html
    }

    #[test]
    fn test_no_markers_unchanged() {
        let html = "<pre><code>x\n</code></pre>\n";
        assert_eq!(redeem(html), html);
    }

    #[test]
    fn test_label_replaces_marker() {
        let html = "<!-- do-fence:{\"label\":\"test.py\"} -->\n<pre><code>x\n</code></pre>\n";
        assert_eq!(
            redeem(html),
            "<div class=\"code-label\" title=\"test.py\">test.py</div>\n\n<pre><code>x\n</code></pre>\n"
        );
    }

    #[test]
    fn test_label_escaped() {
        let html = r#"<!-- do-fence:{"label":"<b>\"x\" & y</b>"} -->"#;
        assert_eq!(
            redeem(html),
            "<div class=\"code-label\" title=\"&lt;b&gt;&quot;x&quot; &amp; y&lt;/b&gt;\">\
             &lt;b&gt;&quot;x&quot; &amp; y&lt;/b&gt;</div>\n"
        );
    }

    #[test]
    fn test_custom_label_classes() {
        let config = FenceConfig {
            label_class: "my-label".to_owned(),
            secondary_label_class: "my-secondary".to_owned(),
            ..FenceConfig::default()
        };
        let mut html = concat!(
            r#"<!-- do-fence:{"label":"a","secondary_label":"b"} -->"#,
            "\n<pre><code>x\n</code></pre>"
        )
        .to_owned();
        FencePostprocessor::new(&config).run(&mut html);

        assert!(html.contains(r#"<div class="my-label" title="a">a</div>"#));
        assert!(html.contains(r#"<code><div class="my-secondary" title="b">b</div>x"#));
    }

    #[test]
    fn test_environment_class_added() {
        let html = "<!-- do-fence:{\"environment\":\"local\"} -->\n<pre><code>x\n</code></pre>";
        assert_eq!(
            redeem(html),
            "\n<pre class=\"environment-local\"><code>x\n</code></pre>"
        );
    }

    #[test]
    fn test_environment_prefixes_existing_class() {
        let html = "<!-- do-fence:{\"environment\":\"prod\"} -->\n<pre class=\"x\"><code>y</code></pre>";
        assert_eq!(
            redeem(html),
            "\n<pre class=\"environment-prod x\"><code>y</code></pre>"
        );
    }

    #[test]
    fn test_environment_sanitized() {
        let html = "<!-- do-fence:{\"environment\":\"my env!<x>\"} -->\n<pre><code></code></pre>";
        assert!(redeem(html).contains(r#"<pre class="environment-myenvx">"#));
    }

    #[test]
    fn test_environment_sanitized_to_empty_skipped() {
        let html = "<!-- do-fence:{\"environment\":\"!!\"} -->\n<pre><code>x</code></pre>";
        assert_eq!(redeem(html), "\n<pre><code>x</code></pre>");
    }

    #[test]
    fn test_line_numbers() {
        let html = concat!(
            r#"<!-- do-fence:{"prefix_type":"line_numbers"} -->"#,
            "\n<pre><code class=\"language-python\">a\nb\nc\n</code></pre>\n"
        );
        assert_eq!(
            redeem(html),
            concat!(
                "\n<pre class=\"prefixed line_numbers\"><code class=\"language-python\"><ol>",
                r#"<li data-prefix="1">a</li><li data-prefix="2">b</li><li data-prefix="3">c</li>"#,
                "</ol></code></pre>\n"
            )
        );
    }

    #[test]
    fn test_fixed_prefix_escaped() {
        let html = concat!(
            r#"<!-- do-fence:{"prefix_type":"custom_prefix","prefix_value":"(srv) mysql>"} -->"#,
            "\n<pre><code>SELECT 1;\nSELECT 2;\n</code></pre>"
        );
        let output = redeem(html);
        assert_eq!(output.matches(r#"data-prefix="(srv) mysql&gt;""#).count(), 2);
    }

    #[test]
    fn test_blank_lines_kept_as_items() {
        let html = "<!-- do-fence:{\"prefix_type\":\"line_numbers\"} -->\n<pre><code>a\n\nb\n</code></pre>";
        assert!(redeem(html).contains(
            r#"<ol><li data-prefix="1">a</li><li data-prefix="2"></li><li data-prefix="3">b</li></ol>"#
        ));
    }

    #[test]
    fn test_empty_content_gives_empty_list() {
        let html = concat!(
            r#"<!-- do-fence:{"prefix_type":"command","prefix_value":"$","secondary_label":"Out"} -->"#,
            "\n<pre><code class=\"language-bash\"></code></pre>"
        );
        assert_eq!(
            redeem(html),
            concat!(
                "\n<pre class=\"prefixed command\"><code class=\"language-bash\">",
                r#"<div class="secondary-code-label" title="Out">Out</div><ol></ol>"#,
                "</code></pre>"
            )
        );
    }

    #[test]
    fn test_environment_and_prefix_share_pre_tag() {
        let html = concat!(
            r##"<!-- do-fence:{"environment":"local","prefix_type":"super_user","prefix_value":"#"} -->"##,
            "\n<pre><code>id\n</code></pre>"
        );
        assert_eq!(
            redeem(html),
            concat!(
                "\n<pre class=\"prefixed super_user environment-local\"><code>",
                r##"<ol><li data-prefix="#">id</li></ol>"##,
                "</code></pre>"
            )
        );
    }

    #[test]
    fn test_secondary_label_inside_code() {
        let html = "<!-- do-fence:{\"secondary_label\":\"Output\"} -->\n<pre><code>hi\n</code></pre>";
        assert_eq!(
            redeem(html),
            "\n<pre><code><div class=\"secondary-code-label\" title=\"Output\">Output</div>hi\n</code></pre>"
        );
    }

    #[test]
    fn test_malformed_marker_removed() {
        let html = "<!-- do-fence:{broken -->\n<pre><code>x</code></pre>";
        assert_eq!(redeem(html), "\n<pre><code>x</code></pre>");
    }

    #[test]
    fn test_missing_tags_skip_injection() {
        let html = r#"<p>a</p><!-- do-fence:{"label":"l","environment":"e","prefix_type":"command","prefix_value":"$"} -->"#;
        assert_eq!(
            redeem(html),
            r#"<p>a</p><div class="code-label" title="l">l</div>
"#
        );
    }

    #[test]
    fn test_multiple_markers_land_in_own_fence() {
        let html = concat!(
            r#"<!-- do-fence:{"label":"first.py","prefix_type":"line_numbers"} -->"#,
            "\n<pre><code>one\ntwo\n</code></pre>\n<p>between</p>\n",
            r#"<!-- do-fence:{"environment":"staging","secondary_label":"Out"} -->"#,
            "\n<pre><code>three\n</code></pre>\n",
            r#"<!-- do-fence:{"prefix_type":"line_numbers"} -->"#,
            "\n<pre><code>four\n</code></pre>\n",
        );

        assert_eq!(
            redeem(html),
            concat!(
                r#"<div class="code-label" title="first.py">first.py</div>"#,
                "\n\n<pre class=\"prefixed line_numbers\"><code><ol>",
                r#"<li data-prefix="1">one</li><li data-prefix="2">two</li>"#,
                "</ol></code></pre>\n<p>between</p>\n",
                "\n<pre class=\"environment-staging\"><code>",
                r#"<div class="secondary-code-label" title="Out">Out</div>"#,
                "three\n</code></pre>\n",
                "\n<pre class=\"prefixed line_numbers\"><code><ol>",
                r#"<li data-prefix="1">four</li>"#,
                "</ol></code></pre>\n",
            )
        );
    }

    #[test]
    fn test_marker_without_block_leaves_next_fence_alone() {
        let html = concat!(
            "<div>\n",
            r#"<!-- do-fence:{"prefix_type":"command","prefix_value":"$"} -->"#,
            "\n```\nls\n```\n</div>\n",
            r#"<!-- do-fence:{"prefix_type":"line_numbers"} -->"#,
            "\n<pre><code>a\nb\n</code></pre>\n",
        );

        assert_eq!(
            redeem(html),
            concat!(
                "<div>\n\n```\nls\n```\n</div>\n",
                "\n<pre class=\"prefixed line_numbers\"><code><ol>",
                r#"<li data-prefix="1">a</li><li data-prefix="2">b</li>"#,
                "</ol></code></pre>\n",
            )
        );
    }

    #[test]
    fn test_add_class() {
        assert_eq!(add_class("<pre>", "a"), r#"<pre class="a">"#);
        assert_eq!(add_class(r#"<pre class="b">"#, "a"), r#"<pre class="a b">"#);
        assert_eq!(add_class(r#"<pre id="x">"#, "a"), r#"<pre class="a" id="x">"#);
    }

    #[test]
    fn test_prefix_list() {
        assert_eq!(prefix_list("", LINE_NUMBERS, None), "<ol></ol>");
        assert_eq!(
            prefix_list("\n", LINE_NUMBERS, None),
            r#"<ol><li data-prefix="1"></li></ol>"#
        );
        assert_eq!(
            prefix_list("x", "custom_prefix", None),
            r#"<ol><li data-prefix="">x</li></ol>"#
        );
    }
}
