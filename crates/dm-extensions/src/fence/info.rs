//! Prefix flags in fence info strings.
//!
//! The info string (text after the opening fence marker) is a comma-separated
//! token list. Prefix flags are removed from it; anything else, such as the
//! language name, is kept as written.

/// A per-line prefix requested in a fence info string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrefixFlag {
    /// `line_numbers`: each line is prefixed with its 1-based number.
    LineNumbers,
    /// `command`: each line is prefixed with `$`.
    Command,
    /// `super_user`: each line is prefixed with `#`.
    SuperUser,
    /// `custom_prefix(VALUE)`: each line is prefixed with `VALUE`.
    Custom(String),
}

/// Prefix type name written into the marker for numbered lines.
pub const LINE_NUMBERS: &str = "line_numbers";

impl PrefixFlag {
    /// Parse a single info-string token (surrounding whitespace ignored).
    ///
    /// In `custom_prefix(VALUE)`, the two-character escape `\s` stands for a
    /// space.
    ///
    /// # Example
    ///
    /// ```
    /// use dm_extensions::fence::PrefixFlag;
    ///
    /// assert_eq!(PrefixFlag::parse(" command "), Some(PrefixFlag::Command));
    /// assert_eq!(
    ///     PrefixFlag::parse(r"custom_prefix((srv)\smysql>)"),
    ///     Some(PrefixFlag::Custom("(srv) mysql>".to_owned()))
    /// );
    /// assert_eq!(PrefixFlag::parse("python"), None);
    /// ```
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim() {
            LINE_NUMBERS => Some(Self::LineNumbers),
            "command" => Some(Self::Command),
            "super_user" => Some(Self::SuperUser),
            other => {
                let value = other.strip_prefix("custom_prefix(")?.strip_suffix(')')?;
                Some(Self::Custom(value.replace(r"\s", " ")))
            }
        }
    }

    /// Name recorded as `prefix_type`.
    #[must_use]
    pub fn prefix_type(&self) -> &'static str {
        match self {
            Self::LineNumbers => LINE_NUMBERS,
            Self::Command => "command",
            Self::SuperUser => "super_user",
            Self::Custom(_) => "custom_prefix",
        }
    }

    /// Fixed prefix recorded as `prefix_value`; `None` for line numbers.
    #[must_use]
    pub fn prefix_value(&self) -> Option<&str> {
        match self {
            Self::LineNumbers => None,
            Self::Command => Some("$"),
            Self::SuperUser => Some("#"),
            Self::Custom(value) => Some(value.as_str()),
        }
    }

    /// Shell prompts imply `bash` when no language is given.
    fn implies_bash(&self) -> bool {
        matches!(self, Self::Command | Self::SuperUser)
    }
}

/// Extract the prefix flag from an info string.
///
/// Returns `None` when the info string holds no flag, in which case the
/// opening line must be kept byte-for-byte. Otherwise returns the flag (the
/// last one wins if several are given) and the rewritten info string.
///
/// # Example
///
/// ```
/// use dm_extensions::fence::{PrefixFlag, rewrite_info};
///
/// assert_eq!(
///     rewrite_info("line_numbers,python"),
///     Some((PrefixFlag::LineNumbers, "python".to_owned()))
/// );
/// assert_eq!(
///     rewrite_info("super_user"),
///     Some((PrefixFlag::SuperUser, "bash".to_owned()))
/// );
/// assert_eq!(rewrite_info("python"), None);
/// ```
#[must_use]
pub fn rewrite_info(info: &str) -> Option<(PrefixFlag, String)> {
    let mut flag = None;
    let mut kept = Vec::new();

    for token in info.split(',') {
        if let Some(parsed) = PrefixFlag::parse(token) {
            flag = Some(parsed);
        } else if !token.trim().is_empty() {
            kept.push(token);
        }
    }

    let flag = flag?;
    if kept.is_empty() && flag.implies_bash() {
        kept.push("bash");
    }
    Some((flag, kept.join(",")))
}
