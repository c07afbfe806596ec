// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! GemStone Smalltalk command-line interface.
//!
//! This is the main entry point for the `gemstone` command.

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser, Subcommand};
use miette::Result;
use tracing_subscriber::EnvFilter;

mod commands;
mod diagnostic;
mod paths;

use commands::OutputFormat;
use commands::index::Query;

/// Formatter and method index for GemStone Smalltalk sources
#[derive(Debug, Parser)]
#[command(name = "gemstone")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v: debug, -vv+: trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Formatter settings as JSON (camelCase keys)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Format source files in place
    Fmt {
        /// Files or directories to format
        #[arg(default_value = ".")]
        paths: Vec<Utf8PathBuf>,

        /// Print diffs and exit non-zero instead of writing
        #[arg(long)]
        check: bool,
    },

    /// Report syntax errors and warnings
    Check {
        /// Files or directories to check
        #[arg(default_value = ".")]
        paths: Vec<Utf8PathBuf>,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Find methods whose `Class >> selector` contains a string
    Search {
        query: String,

        /// Files or directories to index
        #[arg(default_value = ".")]
        paths: Vec<Utf8PathBuf>,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Find methods that send a selector
    Senders {
        selector: String,

        /// Files or directories to index
        #[arg(default_value = ".")]
        paths: Vec<Utf8PathBuf>,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },

    /// Find methods that implement a selector
    Implementors {
        selector: String,

        /// Files or directories to index
        #[arg(default_value = ".")]
        paths: Vec<Utf8PathBuf>,

        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
}

fn directive_for_verbosity(v: u8) -> &'static str {
    match v {
        0 => "gemstone=warn,gemstone_core=warn",
        1 => "gemstone=debug,gemstone_core=debug",
        _ => "gemstone=trace,gemstone_core=trace",
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Fmt { paths, check } => {
            let settings = crate::paths::load_settings(cli.config.as_deref())?;
            commands::fmt::run_fmt(&paths, check, &settings)
        }
        Command::Check { paths, format } => commands::check::run_check(&paths, format),
        Command::Search {
            query,
            paths,
            format,
        } => commands::index::run_query(&paths, Query::Search(&query), format),
        Command::Senders {
            selector,
            paths,
            format,
        } => commands::index::run_query(&paths, Query::Senders(&selector), format),
        Command::Implementors {
            selector,
            paths,
            format,
        } => commands::index::run_query(&paths, Query::Implementors(&selector), format),
    }
}

fn main() -> Result<()> {
    // Install miette's fancy error handler
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(directive_for_verbosity(cli.verbose))),
        )
        .with_writer(std::io::stderr)
        .init();

    // Exit with appropriate code
    match run(cli) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fmt_check_with_config() {
        let cli =
            Cli::try_parse_from(["gemstone", "fmt", "--check", "src", "--config", "fmt.json"])
                .unwrap();
        assert_eq!(cli.config.as_deref(), Some(camino::Utf8Path::new("fmt.json")));
        match cli.command {
            Command::Fmt { paths, check } => {
                assert!(check);
                assert_eq!(paths, vec![Utf8PathBuf::from("src")]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn query_commands_default_to_current_directory() {
        let cli = Cli::try_parse_from(["gemstone", "-v", "senders", "at:put:"]).unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Senders {
                selector,
                paths,
                format,
            } => {
                assert_eq!(selector, "at:put:");
                assert_eq!(paths, vec![Utf8PathBuf::from(".")]);
                assert_eq!(format, OutputFormat::Text);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn check_accepts_json_format() {
        let cli = Cli::try_parse_from(["gemstone", "check", "--format", "json", "a.gs"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Check {
                format: OutputFormat::Json,
                ..
            }
        ));
    }
}
