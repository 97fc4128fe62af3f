//! # Termlink CLI
//!
//! Command-line interface for the Termlink glossary linker.
//!
//! ## Commands
//!
//! - `termlink link` - Link glossary terms across the docs tree
//! - `termlink link --cleanup` - Remove generated glossary links
//! - `termlink definitions` - Render the glossary into the definitions page
//! - `termlink terms` - List terms in the order they are applied
//! - `termlink lexicon` - Compile a categorised lexicon into a page
//!
//! ## Example Usage
//!
//! ```bash
//! # Link every term in docs/
//! termlink link
//!
//! # Fail CI if any file still needs links
//! termlink link --check
//!
//! # Regenerate the definitions table in place
//! termlink definitions --template docs/model/02-definitions.md
//! ```

mod app;
mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Termlink - Glossary term linking for Markdown docs
#[derive(Parser)]
#[command(name = "termlink")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Link glossary terms in every document
    Link {
        /// Glossary YAML file
        #[arg(short, long)]
        glossary: Option<PathBuf>,

        /// Documentation directory
        #[arg(short, long)]
        docs: Option<PathBuf>,

        /// Remove generated links instead of adding them
        #[arg(long)]
        cleanup: bool,

        /// Report changes without writing files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Exit with an error if any file would change (implies --dry-run)
        #[arg(long)]
        check: bool,

        /// Process files in parallel
        #[arg(short, long)]
        parallel: bool,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Render the glossary table into the definitions page
    Definitions {
        /// Glossary YAML file
        #[arg(short, long)]
        glossary: Option<PathBuf>,

        /// Page template containing a {{.Table}} placeholder
        /// (default: the definitions page source in the docs directory)
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Output file (default: the template, rewritten in place)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compile a categorised lexicon into a standalone page
    Lexicon {
        /// Lexicon YAML file
        #[arg(short, long, default_value = "lexicon.yaml")]
        lexicon: PathBuf,

        /// Output Markdown file
        #[arg(short, long)]
        output: PathBuf,

        /// Version stamped on the page (default: the lexicon's own, else "dev")
        #[arg(long = "set-version", value_name = "VERSION")]
        version: Option<String>,
    },

    /// List glossary terms in application order
    Terms {
        /// Glossary YAML file
        #[arg(short, long)]
        glossary: Option<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging; stdout is reserved for command output
    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => termlink_core::Config::load_from(path)?,
        None => termlink_core::Config::load()?,
    };

    // Execute command
    match cli.command {
        Commands::Link {
            glossary,
            docs,
            cleanup,
            dry_run,
            check,
            parallel,
            output,
        } => {
            app::apply_overrides(&mut config, glossary, docs);
            config.processing.parallel |= parallel;
            let options = commands::link::LinkOptions {
                cleanup,
                dry_run: dry_run || check,
                check,
                output,
            };
            commands::link::run(config, options)
        }
        Commands::Definitions {
            glossary,
            template,
            output,
        } => {
            app::apply_overrides(&mut config, glossary, None);
            commands::definitions::run(config, template, output)
        }
        Commands::Lexicon {
            lexicon,
            output,
            version,
        } => commands::lexicon::run(&lexicon, &output, version.as_deref()),
        Commands::Terms { glossary, output } => {
            app::apply_overrides(&mut config, glossary, None);
            commands::terms::run(config, output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("text".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_cli_parses_link_flags() {
        let cli = Cli::try_parse_from([
            "termlink", "-vv", "link", "--docs", "site", "--cleanup", "--check", "-o", "json",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Link {
                docs,
                cleanup,
                check,
                output,
                ..
            } => {
                assert_eq!(docs, Some(PathBuf::from("site")));
                assert!(cleanup);
                assert!(check);
                assert_eq!(output, OutputFormat::Json);
            }
            _ => panic!("expected link command"),
        }
    }

    #[test]
    fn test_cli_parses_lexicon() {
        let cli = Cli::try_parse_from([
            "termlink", "lexicon", "-o", "site/lexicon.md", "--set-version", "1.4",
        ])
        .unwrap();
        match cli.command {
            Commands::Lexicon {
                lexicon,
                output,
                version,
            } => {
                assert_eq!(lexicon, PathBuf::from("lexicon.yaml"));
                assert_eq!(output, PathBuf::from("site/lexicon.md"));
                assert_eq!(version.as_deref(), Some("1.4"));
            }
            _ => panic!("expected lexicon command"),
        }
        assert!(Cli::try_parse_from(["termlink", "lexicon"]).is_err());
    }
}
