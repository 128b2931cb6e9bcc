//! dm CLI - Markdown tutorial renderer.
//!
//! Provides commands for:
//! - `render`: Render a Markdown file to HTML with the fence, highlight and
//!   YouTube extensions

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::RenderArgs;
use output::Output;

/// dm - Markdown tutorial renderer.
#[derive(Parser)]
#[command(name = "dm", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a Markdown file to HTML.
    Render(RenderArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Render(args) if args.verbose);

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

/// `--verbose` enables INFO level, otherwise use `RUST_LOG` or default to WARN.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_verbose_flag_parsed() {
        let cli = Cli::try_parse_from(["dm", "render", "doc.md", "--verbose"]).unwrap();
        assert!(matches!(cli.command, Commands::Render(args) if args.verbose));
    }

    #[test]
    fn test_verbose_selects_info_filter() {
        assert_eq!(log_filter(true).to_string(), "info");
    }
}
