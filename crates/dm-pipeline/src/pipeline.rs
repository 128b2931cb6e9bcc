//! Markdown-to-HTML pipeline with prioritized stages.

use pulldown_cmark::{Options, Parser, html};

use crate::{Extension, Postprocessor, Preprocessor, Registry};

/// Renders markdown to HTML through registered stages.
///
/// Rendering runs every [`Preprocessor`] on the source lines, parses and
/// renders the joined result with pulldown-cmark, then runs every
/// [`Postprocessor`] on the HTML. Stages keep no per-document state, so one
/// pipeline can convert any number of documents.
///
/// # Example
///
/// ```
/// use dm_pipeline::Pipeline;
///
/// let pipeline = Pipeline::new();
/// assert_eq!(pipeline.convert("# Hello"), "<h1>Hello</h1>\n");
/// ```
pub struct Pipeline {
    preprocessors: Registry<Box<dyn Preprocessor>>,
    postprocessors: Registry<Box<dyn Postprocessor>>,
    gfm: bool,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    /// Create a new pipeline with GFM enabled and no stages.
    #[must_use]
    pub fn new() -> Self {
        Self {
            preprocessors: Registry::new(),
            postprocessors: Registry::new(),
            gfm: true,
        }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Register all stages of an extension.
    #[must_use]
    pub fn with_extension<E: Extension>(mut self, extension: E) -> Self {
        extension.extend(&mut self);
        self
    }

    /// Stages run on source lines before parsing.
    pub fn preprocessors_mut(&mut self) -> &mut Registry<Box<dyn Preprocessor>> {
        &mut self.preprocessors
    }

    /// Stages run on the rendered HTML.
    pub fn postprocessors_mut(&mut self) -> &mut Registry<Box<dyn Postprocessor>> {
        &mut self.postprocessors
    }

    /// Registered preprocessors.
    #[must_use]
    pub fn preprocessors(&self) -> &Registry<Box<dyn Preprocessor>> {
        &self.preprocessors
    }

    /// Registered postprocessors.
    #[must_use]
    pub fn postprocessors(&self) -> &Registry<Box<dyn Postprocessor>> {
        &self.postprocessors
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Convert markdown source to HTML.
    #[must_use]
    pub fn convert(&self, source: &str) -> String {
        let normalized = source.replace("\r\n", "\n").replace('\r', "\n");
        let mut lines: Vec<String> = normalized.split('\n').map(str::to_owned).collect();

        for (name, stage) in self.preprocessors.named() {
            tracing::trace!(stage = name, lines = lines.len(), "Running preprocessor");
            lines = stage.run(lines);
        }

        let markdown = lines.join("\n");
        let parser = Parser::new_ext(&markdown, self.parser_options());
        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, parser);

        for (name, stage) in self.postprocessors.named() {
            tracing::trace!(stage = name, bytes = output.len(), "Running postprocessor");
            stage.run(&mut output);
        }

        tracing::debug!(
            source_bytes = source.len(),
            html_bytes = output.len(),
            "Converted markdown"
        );
        output
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    struct Append(&'static str);

    impl Preprocessor for Append {
        fn run(&self, mut lines: Vec<String>) -> Vec<String> {
            lines.push(self.0.to_owned());
            lines
        }
    }

    struct Wrap(&'static str);

    impl Postprocessor for Wrap {
        fn run(&self, html: &mut String) {
            *html = format!("<{0}>{html}</{0}>", self.0);
        }
    }

    struct Both;

    impl Extension for Both {
        fn extend(self, pipeline: &mut Pipeline) {
            pipeline
                .preprocessors_mut()
                .register("append", 10, Box::new(Append("tail")));
            pipeline
                .postprocessors_mut()
                .register("wrap", 10, Box::new(Wrap("main")));
        }
    }

    #[test]
    fn test_plain_conversion() {
        let pipeline = Pipeline::new();
        assert_eq!(pipeline.convert("**bold**"), "<p><strong>bold</strong></p>\n");
    }

    #[test]
    fn test_crlf_normalized() {
        let pipeline = Pipeline::new();
        assert_eq!(pipeline.convert("a\r\nb"), pipeline.convert("a\nb"));
    }

    #[test]
    fn test_preprocessor_priority_order() {
        let mut pipeline = Pipeline::new();
        pipeline
            .preprocessors_mut()
            .register("second", 10, Box::new(Append("second")));
        pipeline
            .preprocessors_mut()
            .register("first", 20, Box::new(Append("first")));

        assert_eq!(pipeline.convert(""), "<p>first\nsecond</p>\n");
    }

    #[test]
    fn test_postprocessor_priority_order() {
        let mut pipeline = Pipeline::new();
        pipeline
            .postprocessors_mut()
            .register("inner", 30, Box::new(Wrap("b")));
        pipeline
            .postprocessors_mut()
            .register("outer", 10, Box::new(Wrap("a")));

        assert_eq!(pipeline.convert("x"), "<a><b><p>x</p>\n</b></a>");
    }

    #[test]
    fn test_with_extension_registers_stages() {
        let pipeline = Pipeline::new().with_extension(Both);

        assert!(pipeline.preprocessors().contains("append"));
        assert!(pipeline.postprocessors().contains("wrap"));
        assert_eq!(pipeline.convert("head"), "<main><p>head\ntail</p>\n</main>");
    }

    #[test]
    fn test_gfm_toggle() {
        let with_gfm = Pipeline::new();
        let without_gfm = Pipeline::new().with_gfm(false);

        assert!(with_gfm.convert("~~gone~~").contains("<del>"));
        assert!(!without_gfm.convert("~~gone~~").contains("<del>"));
    }

    #[test]
    fn test_raw_html_comment_passes_through() {
        let pipeline = Pipeline::new();
        let html = pipeline.convert("<!-- marker -->\n```\ncode\n```");
        assert!(html.starts_with("<!-- marker -->\n"));
        assert!(html.contains("<pre><code>code\n</code></pre>"));
    }
}
