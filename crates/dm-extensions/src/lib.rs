//! Markdown extensions for technical tutorials.
//!
//! Each extension implements [`dm_pipeline::Extension`] and registers its
//! stages on a [`dm_pipeline::Pipeline`]:
//!
//! - [`FenceExtension`]: labels, environments and line prefixes on code fences
//! - [`HighlightExtension`]: `<^>text<^>` becomes `<mark>text</mark>`
//! - [`YouTubeExtension`]: `[youtube ID HEIGHT WIDTH]` becomes an iframe
//!
//! # Example
//!
//! ```
//! use dm_extensions::{FenceExtension, HighlightExtension, YouTubeExtension};
//! use dm_pipeline::Pipeline;
//!
//! let pipeline = Pipeline::new()
//!     .with_extension(FenceExtension::default())
//!     .with_extension(HighlightExtension)
//!     .with_extension(YouTubeExtension);
//!
//! let html = pipeline.convert("```command\n[label Shell]\nexport <^>PORT<^>=80\n```\n");
//! assert!(html.contains(r#"<li data-prefix="$">export <mark>PORT</mark>=80</li>"#));
//! ```

pub mod fence;
mod fraction;
pub mod highlight;
pub mod youtube;

pub use fence::{FenceConfig, FenceExtension};
pub use fraction::reduce_fraction;
pub use highlight::HighlightExtension;
pub use youtube::YouTubeExtension;
