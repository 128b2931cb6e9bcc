//! Fence directive scanner.
//!
//! Walks the raw source lines, strips directives and prefix flags from every
//! fenced code block, and leaves the extracted metadata in a marker comment
//! right before the fence for [`FencePostprocessor`](super::FencePostprocessor)
//! to pick up after rendering.

use std::collections::HashSet;
use std::sync::LazyLock;
use std::vec::IntoIter;

use dm_pipeline::{FenceOpen, Preprocessor};
use regex::Regex;

use super::FenceConfig;
use super::info::rewrite_info;
use super::metadata::FenceMetadata;

/// Whole-line directive: `[label TEXT]`, `[secondary_label TEXT]` or
/// `[environment NAME]`, matched against the whitespace-stripped line.
static DIRECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[(label|secondary_label|environment) (.+)\]$").unwrap());

/// A directive line recognized at the top of a fence body.
#[derive(Debug, PartialEq, Eq)]
enum Directive {
    Label(String),
    SecondaryLabel(String),
    Environment(String),
}

/// Parse a whitespace-stripped line for directive syntax.
fn parse_directive(stripped: &str) -> Option<Directive> {
    let caps = DIRECTIVE_RE.captures(stripped)?;
    let value = caps[2].to_owned();
    match &caps[1] {
        "label" => Some(Directive::Label(value)),
        "secondary_label" => Some(Directive::SecondaryLabel(value)),
        "environment" => Some(Directive::Environment(value)),
        _ => None,
    }
}

/// Preprocessor that extracts fence directives and prefix flags.
///
/// Directives are only recognized in the directive zone: the leading lines
/// of a fence body. The first line that is not a directive, or an
/// `environment` outside the allowlist, ends the zone for that fence and
/// stays in the code as written.
///
/// # Example
///
/// ```
/// use dm_extensions::fence::{FenceConfig, FencePreprocessor};
/// use dm_pipeline::Preprocessor;
///
/// let scanner = FencePreprocessor::new(&FenceConfig::default());
/// let lines = ["```python,line_numbers", "[label app.py]", "print('hi')", "```"]
///     .map(str::to_owned)
///     .to_vec();
///
/// let output = scanner.run(lines);
/// assert_eq!(output[1], "```python");
/// assert_eq!(output[2], "print('hi')");
/// assert!(output[0].starts_with("<!-- do-fence:"));
/// assert!(output[0].contains(r#""label":"app.py""#));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FencePreprocessor {
    /// Accepted environment names; empty accepts every name.
    allowed_environments: HashSet<String>,
}

impl FencePreprocessor {
    /// Create a scanner with the environment allowlist from `config`.
    #[must_use]
    pub fn new(config: &FenceConfig) -> Self {
        Self {
            allowed_environments: config.allowed_environments.iter().cloned().collect(),
        }
    }

    fn environment_allowed(&self, name: &str) -> bool {
        self.allowed_environments.is_empty() || self.allowed_environments.contains(name)
    }

    /// Consume one fence span starting at `opening`, pushing its rewritten
    /// lines to `output`.
    fn scan_fence(&self, opening: String, rest: &mut IntoIter<String>, output: &mut Vec<String>) {
        let mut metadata = FenceMetadata::default();
        let Some(open) = FenceOpen::parse(&opening) else {
            output.push(opening);
            return;
        };
        let rewritten_opening = rewrite_info(open.info).map(|(flag, info)| {
            metadata.set_prefix(&flag);
            format!("{}{info}", open.marker())
        });

        let mut body = Vec::new();
        let mut closing = None;
        let mut in_directive_zone = true;

        for line in rest.by_ref() {
            if open.is_closed_by(&line) {
                closing = Some(line);
                break;
            }

            if in_directive_zone {
                match parse_directive(line.trim()) {
                    Some(Directive::Label(text)) => {
                        metadata.label = Some(text);
                        continue;
                    }
                    Some(Directive::SecondaryLabel(text)) => {
                        metadata.secondary_label = Some(text);
                        continue;
                    }
                    Some(Directive::Environment(name)) if self.environment_allowed(&name) => {
                        metadata.environment = Some(name);
                        continue;
                    }
                    Some(Directive::Environment(name)) => {
                        tracing::debug!(
                            environment = %name,
                            "Environment not allowed, keeping directive as code"
                        );
                        in_directive_zone = false;
                    }
                    None => in_directive_zone = false,
                }
            }

            body.push(line);
        }

        if closing.is_none() {
            tracing::debug!(fence = %opening, "Unterminated fence runs to end of input");
        }

        if !metadata.is_empty() {
            output.push(metadata.to_marker());
        }
        output.push(rewritten_opening.unwrap_or(opening));
        output.extend(body);
        output.extend(closing);
    }
}

impl Preprocessor for FencePreprocessor {
    fn run(&self, lines: Vec<String>) -> Vec<String> {
        let mut output = Vec::with_capacity(lines.len());
        let mut rest = lines.into_iter();

        while let Some(line) = rest.next() {
            if FenceOpen::parse(&line).is_some() {
                self.scan_fence(line, &mut rest, &mut output);
            } else {
                output.push(line);
            }
        }

        output
    }
}
