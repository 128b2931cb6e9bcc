//! `dm render` command implementation.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::Args;
use dm_config::{CliSettings, Config};
use dm_extensions::{FenceExtension, HighlightExtension, YouTubeExtension};
use dm_pipeline::Pipeline;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (`-` reads stdin).
    input: PathBuf,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: built-in defaults).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Allowed `[environment ...]` name, repeatable (overrides config).
    #[arg(long = "allow-environment", value_name = "NAME")]
    allowed_environments: Vec<String>,

    /// CSS class for fence labels (overrides config).
    #[arg(long)]
    label_class: Option<String>,

    /// CSS class for secondary fence labels (overrides config).
    #[arg(long)]
    secondary_label_class: Option<String>,

    /// Disable GitHub-flavored Markdown extensions.
    #[arg(long)]
    no_gfm: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the input or output file
    /// cannot be accessed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let cli_settings = CliSettings {
            gfm: self.no_gfm.then_some(false),
            label_class: self.label_class,
            secondary_label_class: self.secondary_label_class,
            allowed_environments: (!self.allowed_environments.is_empty())
                .then_some(self.allowed_environments),
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        if let Some(path) = &config.config_path {
            tracing::info!(config = %path.display(), "Loaded configuration");
        }

        let source = read_input(&self.input)?;
        let html = build_pipeline(&config).convert(&source);
        tracing::info!(
            input = %self.input.display(),
            bytes = html.len(),
            "Rendered document"
        );

        match &self.output {
            Some(path) => {
                std::fs::write(path, &html).map_err(|source| CliError::Write {
                    path: path.clone(),
                    source,
                })?;
                Output::new().success(&format!("Wrote {}", path.display()));
            }
            None => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(html.as_bytes())?;
                stdout.flush()?;
            }
        }

        Ok(())
    }
}

/// Build a pipeline with every extension configured from `config`.
pub(crate) fn build_pipeline(config: &Config) -> Pipeline {
    Pipeline::new()
        .with_gfm(config.markdown.gfm)
        .with_extension(FenceExtension::new(config.fence.clone()))
        .with_extension(HighlightExtension)
        .with_extension(YouTubeExtension)
}

/// Read Markdown from a file, or from stdin for `-`.
fn read_input(path: &Path) -> Result<String, CliError> {
    if path == Path::new("-") {
        let mut source = String::new();
        io::stdin().read_to_string(&mut source)?;
        return Ok(source);
    }

    std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}
