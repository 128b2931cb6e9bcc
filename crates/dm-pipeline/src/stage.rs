//! Pipeline stage traits.
//!
//! A pipeline runs in three steps: preprocessors rewrite raw source lines,
//! pulldown-cmark renders the result, postprocessors rewrite the final HTML.
//! Extensions bundle related stages and register them together.

use crate::Pipeline;

/// Stage that rewrites raw source lines before block parsing.
///
/// # Example
///
/// ```
/// use dm_pipeline::{Pipeline, Preprocessor};
///
/// struct Shout;
///
/// impl Preprocessor for Shout {
///     fn run(&self, lines: Vec<String>) -> Vec<String> {
///         lines.into_iter().map(|line| line.to_uppercase()).collect()
///     }
/// }
///
/// let mut pipeline = Pipeline::new();
/// pipeline.preprocessors_mut().register("shout", 10, Box::new(Shout));
/// assert_eq!(pipeline.convert("hello"), "<p>HELLO</p>\n");
/// ```
pub trait Preprocessor: Send + Sync {
    /// Transform the full ordered list of source lines.
    fn run(&self, lines: Vec<String>) -> Vec<String>;
}

/// Stage that rewrites the fully rendered HTML.
pub trait Postprocessor: Send + Sync {
    /// Rewrite `html` in place.
    fn run(&self, html: &mut String);
}

/// A bundle of stages registered into a [`Pipeline`].
pub trait Extension {
    /// Register this extension's stages.
    fn extend(self, pipeline: &mut Pipeline);
}
