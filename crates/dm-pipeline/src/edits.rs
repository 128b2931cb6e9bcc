//! Offset-based string edits applied in a single pass.
//!
//! Post-processors that patch rendered HTML at several positions compute every
//! edit against the same unmodified string, then rebuild it once. No edit ever
//! has to account for the length change of another.

use std::ops::Range;

/// A single replacement of a byte range.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Edit {
    range: Range<usize>,
    replacement: String,
}

/// Collects byte-range edits for single-pass application.
///
/// Edits are applied in `(start, end)` order, so an insertion at offset `n`
/// lands before a replacement that starts at `n`. Among edits with identical
/// ranges, the one added first is applied first. An edit that overlaps an
/// already applied one is dropped.
///
/// # Example
///
/// ```
/// use dm_pipeline::Edits;
///
/// let mut html = "<pre><code>x</code></pre>".to_owned();
/// let mut edits = Edits::new();
/// edits.replace(11..12, "<ol><li>x</li></ol>");
/// edits.insert(11, "<div>label</div>");
/// edits.replace(0..5, r#"<pre class="prefixed">"#);
/// edits.apply(&mut html);
///
/// assert_eq!(
///     html,
///     r#"<pre class="prefixed"><code><div>label</div><ol><li>x</li></ol></code></pre>"#
/// );
/// ```
#[derive(Debug, Default)]
pub struct Edits {
    items: Vec<Edit>,
}

impl Edits {
    /// Create a new empty edit list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new edit list with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Register a replacement of `range` with `replacement`.
    pub fn replace(&mut self, range: Range<usize>, replacement: impl Into<String>) {
        self.items.push(Edit {
            range,
            replacement: replacement.into(),
        });
    }

    /// Register an insertion of `text` at byte offset `at`.
    pub fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.replace(at..at, text);
    }

    /// Apply all registered edits.
    ///
    /// Edits with out-of-bounds or non-char-boundary ranges, and edits
    /// overlapping an earlier one, are skipped.
    ///
    /// Note: This consumes the edits to prevent accidental reuse.
    pub fn apply(mut self, text: &mut String) {
        if self.items.is_empty() {
            return;
        }

        // Stable sort keeps insertion order for identical ranges.
        self.items.sort_by_key(|edit| (edit.range.start, edit.range.end));

        let growth: usize = self.items.iter().map(|e| e.replacement.len()).sum();
        let mut result = String::with_capacity(text.len() + growth);
        let mut cursor = 0;

        for edit in self.items {
            let Range { start, end } = edit.range;
            if start < cursor
                || end < start
                || end > text.len()
                || !text.is_char_boundary(start)
                || !text.is_char_boundary(end)
            {
                tracing::debug!(start, end, cursor, "Skipping conflicting edit");
                continue;
            }
            result.push_str(&text[cursor..start]);
            result.push_str(&edit.replacement);
            cursor = end;
        }

        result.push_str(&text[cursor..]);
        *text = result;
    }

    /// Check if there are any edits registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of registered edits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
