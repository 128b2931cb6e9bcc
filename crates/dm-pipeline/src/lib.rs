//! Staged markdown pipeline with prioritized pre- and post-processors.
//!
//! This crate provides a [`Pipeline`] that renders markdown to HTML with
//! pulldown-cmark and lets extensions hook in on both sides of the render:
//!
//! - [`Preprocessor`]: rewrites raw source lines before block parsing
//! - [`Postprocessor`]: rewrites the final HTML string
//!
//! Stages live in a [`Registry`] ordered by priority (highest first).
//! Extensions implement [`Extension`] to register several stages at once.
//!
//! It also carries the text helpers stages share: column-0 fence detection
//! ([`FenceOpen`], [`FenceTracker`]), HTML escaping ([`escape_html`]) and a
//! single-pass offset edit list ([`Edits`]).
//!
//! # Example
//!
//! ```
//! use dm_pipeline::{Pipeline, Postprocessor};
//!
//! struct Emphasize;
//!
//! impl Postprocessor for Emphasize {
//!     fn run(&self, html: &mut String) {
//!         *html = html.replace("<p>", r#"<p class="lead">"#);
//!     }
//! }
//!
//! let mut pipeline = Pipeline::new();
//! pipeline
//!     .postprocessors_mut()
//!     .register("emphasize", 10, Box::new(Emphasize));
//!
//! assert_eq!(pipeline.convert("Hi"), "<p class=\"lead\">Hi</p>\n");
//! ```

mod edits;
mod fence;
mod pipeline;
mod registry;
mod stage;
mod util;

pub use edits::Edits;
pub use fence::{FenceOpen, FenceTracker, is_closing_fence};
pub use pipeline::Pipeline;
pub use registry::Registry;
pub use stage::{Extension, Postprocessor, Preprocessor};
pub use util::escape_html;
