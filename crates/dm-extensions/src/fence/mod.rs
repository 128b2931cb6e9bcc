//! Code fence labels, environments and line prefixes.
//!
//! Two stages work together:
//!
//! 1. [`FencePreprocessor`] reads directives (`[label ...]`,
//!    `[secondary_label ...]`, `[environment ...]`) from the top of each fence
//!    body and prefix flags (`line_numbers`, `command`, `super_user`,
//!    `custom_prefix(...)`) from its info string, then leaves a marker
//!    comment carrying that metadata in front of the fence.
//! 2. [`FencePostprocessor`] finds those markers in the rendered HTML and
//!    injects the label, classes and prefix list into the following
//!    `<pre>`/`<code>` block.
//!
//! # Example
//!
//! ```
//! use dm_extensions::fence::{FenceConfig, FenceExtension};
//! use dm_pipeline::Pipeline;
//!
//! let pipeline = Pipeline::new().with_extension(FenceExtension::new(FenceConfig::default()));
//! let html = pipeline.convert("```bash,command\n[label Install]\nmake install\n```\n");
//!
//! assert!(html.contains(r#"<div class="code-label" title="Install">Install</div>"#));
//! assert!(html.contains(r#"<pre class="prefixed command">"#));
//! assert!(html.contains(r#"<li data-prefix="$">make install</li>"#));
//! assert!(!html.contains("do-fence"));
//! ```

mod info;
mod metadata;
mod redeemer;
mod scanner;

pub use info::{LINE_NUMBERS, PrefixFlag, rewrite_info};
pub use metadata::{FenceMetadata, MARKER_PREFIX};
pub use redeemer::FencePostprocessor;
pub use scanner::FencePreprocessor;

use dm_pipeline::{Extension, Pipeline};
use serde::Deserialize;

/// Registry name of the directive scanner.
pub const PREPROCESSOR_NAME: &str = "do-fence-pre";
/// Registry name of the HTML redeemer.
pub const POSTPROCESSOR_NAME: &str = "do-fence-post";

/// Fence extension configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FenceConfig {
    /// CSS class of the label `div`.
    pub label_class: String,
    /// CSS class of the secondary label `div`.
    pub secondary_label_class: String,
    /// Accepted `[environment ...]` names. Empty accepts every name.
    pub allowed_environments: Vec<String>,
}

impl Default for FenceConfig {
    fn default() -> Self {
        Self {
            label_class: "code-label".to_owned(),
            secondary_label_class: "secondary-code-label".to_owned(),
            allowed_environments: Vec::new(),
        }
    }
}

/// Registers the fence scanner (priority 40) and redeemer (priority 25).
#[derive(Clone, Debug, Default)]
pub struct FenceExtension {
    config: FenceConfig,
}

impl FenceExtension {
    #[must_use]
    pub fn new(config: FenceConfig) -> Self {
        Self { config }
    }
}

impl Extension for FenceExtension {
    fn extend(self, pipeline: &mut Pipeline) {
        pipeline.preprocessors_mut().register(
            PREPROCESSOR_NAME,
            40,
            Box::new(FencePreprocessor::new(&self.config)),
        );
        pipeline.postprocessors_mut().register(
            POSTPROCESSOR_NAME,
            25,
            Box::new(FencePostprocessor::new(&self.config)),
        );
    }
}
