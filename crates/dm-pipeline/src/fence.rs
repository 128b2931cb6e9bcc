//! Code fence detection for line-based stages.
//!
//! Fences open only at column 0: a run of three or more backticks or tildes
//! followed by an optional info string. A fence closes on a line whose
//! whitespace-stripped content is nothing but a run of the same character, at
//! least as long as the opening run.

/// An opening fence line, borrowed from the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FenceOpen<'a> {
    /// Character used for the fence (backtick or tilde).
    pub marker_char: char,
    /// Length of the opening run (minimum length for closing).
    pub marker_len: usize,
    /// Everything after the marker run, untouched.
    pub info: &'a str,
}

impl<'a> FenceOpen<'a> {
    /// Detect a fence opener at the start of `line`.
    ///
    /// Leading whitespace is not skipped: an indented run is not an opener.
    ///
    /// # Example
    ///
    /// ```
    /// use dm_pipeline::FenceOpen;
    ///
    /// let open = FenceOpen::parse("````python,line_numbers").unwrap();
    /// assert_eq!(open.marker_char, '`');
    /// assert_eq!(open.marker_len, 4);
    /// assert_eq!(open.info, "python,line_numbers");
    ///
    /// assert!(FenceOpen::parse("  ```").is_none());
    /// ```
    #[must_use]
    pub fn parse(line: &'a str) -> Option<Self> {
        let (marker_char, marker_len) = marker_run(line)?;
        if marker_len < 3 {
            return None;
        }
        Some(Self {
            marker_char,
            marker_len,
            info: &line[marker_len..],
        })
    }

    /// The opening marker run as a string (e.g. `"~~~~"`).
    #[must_use]
    pub fn marker(&self) -> String {
        self.marker_char.to_string().repeat(self.marker_len)
    }

    /// Check whether `line` closes this fence.
    #[must_use]
    pub fn is_closed_by(&self, line: &str) -> bool {
        is_closing_fence(line, self.marker_char, self.marker_len)
    }
}

/// Leading run of a fence character, if the line starts with one.
fn marker_run(line: &str) -> Option<(char, usize)> {
    let first = line.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }
    // Fence characters are ASCII, so the char count is also the byte length.
    let count = line.chars().take_while(|&c| c == first).count();
    Some((first, count))
}

/// Check if a line is a valid closing fence.
///
/// The closing fence must:
/// - Start at column 0 with the same character as the opening
/// - Be at least as long as the opening
/// - Carry nothing but whitespace after the run
#[must_use]
pub fn is_closing_fence(line: &str, expected_char: char, min_len: usize) -> bool {
    let Some((ch, len)) = marker_run(line) else {
        return false;
    };
    ch == expected_char && len >= 3 && len >= min_len && line.trim() == &line[..len]
}

/// Tracks code fence state during line-by-line processing.
#[derive(Debug, Default)]
pub struct FenceTracker {
    /// Character and length of the currently open fence.
    open: Option<(char, usize)>,
}

impl FenceTracker {
    /// Create a new fence tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if currently inside a fenced code block.
    #[must_use]
    pub fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Update fence state based on a line.
    ///
    /// Returns `true` if the line is a fence marker (opening or closing).
    pub fn update(&mut self, line: &str) -> bool {
        if let Some((fence_char, fence_len)) = self.open {
            if is_closing_fence(line, fence_char, fence_len) {
                self.open = None;
                return true;
            }
            false
        } else if let Some(open) = FenceOpen::parse(line) {
            self.open = Some((open.marker_char, open.marker_len));
            true
        } else {
            false
        }
    }
}
