//! `[youtube ID HEIGHT WIDTH]` embeds.
//!
//! A line consisting only of the directive becomes a responsive `<iframe>`.
//! Height and width are optional (270 and 480 by default) and the
//! `aspect-ratio` style uses the reduced width/height fraction.

use std::sync::LazyLock;

use dm_pipeline::{Extension, FenceTracker, Pipeline, Preprocessor};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;

use crate::fraction::reduce_fraction;

/// Registry name of the embed preprocessor.
pub const PREPROCESSOR_NAME: &str = "do-youtube";

pub const DEFAULT_HEIGHT: u32 = 270;
pub const DEFAULT_WIDTH: u32 = 480;

static YOUTUBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[youtube (\S+?)(?:\s+([0-9]+))?(?:\s+([0-9]+))?\]$").unwrap()
});

/// Everything except `A-Za-z0-9_.-~` is escaped in the video ID.
const VIDEO_ID: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

/// A parsed embed directive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YouTubeEmbed {
    pub video_id: String,
    pub height: u32,
    pub width: u32,
}

impl YouTubeEmbed {
    /// Parse a directive line. Surrounding whitespace is ignored.
    ///
    /// Returns `None` if the line is not a directive or a dimension does not
    /// fit in `u32`.
    ///
    /// # Example
    ///
    /// ```
    /// use dm_extensions::youtube::YouTubeEmbed;
    ///
    /// let embed = YouTubeEmbed::parse("[youtube iom_nhYQIYk 380]").unwrap();
    /// assert_eq!(embed.video_id, "iom_nhYQIYk");
    /// assert_eq!((embed.height, embed.width), (380, 480));
    ///
    /// assert!(YouTubeEmbed::parse("watch [youtube abc] now").is_none());
    /// ```
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let caps = YOUTUBE_RE.captures(line.trim())?;
        let dimension = |idx: usize, default: u32| match caps.get(idx) {
            Some(m) => m.as_str().parse::<u32>().ok(),
            None => Some(default),
        };

        Some(Self {
            video_id: caps[1].to_owned(),
            height: dimension(2, DEFAULT_HEIGHT)?,
            width: dimension(3, DEFAULT_WIDTH)?,
        })
    }

    /// Render the embed as an `<iframe>` with a fallback link.
    #[must_use]
    pub fn to_html(&self) -> String {
        let id = utf8_percent_encode(&self.video_id, VIDEO_ID);
        let (ratio_width, ratio_height) = reduce_fraction(self.width, self.height);

        format!(
            concat!(
                r#"<iframe src="https://www.youtube.com/embed/{id}" class="youtube" "#,
                r#"height="{height}" width="{width}" style="aspect-ratio: {rw}/{rh}" "#,
                r#"frameborder="0" allowfullscreen>"#,
                "\n",
                r#"    <a href="https://www.youtube.com/watch?v={id}" target="_blank">View YouTube video</a>"#,
                "\n",
                "</iframe>",
            ),
            id = id,
            height = self.height,
            width = self.width,
            rw = ratio_width,
            rh = ratio_height,
        )
    }
}

/// Replaces directive lines outside fenced code with iframe HTML.
#[derive(Clone, Copy, Debug, Default)]
pub struct YouTubePreprocessor;

impl Preprocessor for YouTubePreprocessor {
    fn run(&self, lines: Vec<String>) -> Vec<String> {
        let mut fence = FenceTracker::new();

        lines
            .into_iter()
            .map(|line| {
                if fence.update(&line) || fence.in_fence() {
                    return line;
                }
                match YouTubeEmbed::parse(&line) {
                    Some(embed) => {
                        tracing::trace!(video_id = %embed.video_id, "Embedding YouTube video");
                        embed.to_html()
                    }
                    None => line,
                }
            })
            .collect()
    }
}

/// Registers the embed preprocessor (priority 20).
#[derive(Clone, Copy, Debug, Default)]
pub struct YouTubeExtension;

impl Extension for YouTubeExtension {
    fn extend(self, pipeline: &mut Pipeline) {
        pipeline
            .preprocessors_mut()
            .register(PREPROCESSOR_NAME, 20, Box::new(YouTubePreprocessor));
    }
}
