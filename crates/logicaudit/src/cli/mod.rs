//! Command-line interface for logicaudit.
//!
//! This module provides the CLI structure for the `logicaudit` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, ListCommand, OutputFormat, RunCommand, ShowCommand};

/// logicaudit - Spot the flaw, then reveal the audit
///
/// Walks a deck of flawed code snippets. Study each one, run the audit, and
/// compare your diagnosis with the critique, corrected code and reasoning.
#[derive(Debug, Parser)]
#[command(name = "logicaudit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start an audit session
    Run(RunCommand),

    /// List the scenarios in the deck
    List(ListCommand),

    /// Print one scenario with its audit
    Show(ShowCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PanelFormat;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "logicaudit");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        use crate::logging::Verbosity;

        assert_eq!(parse(&["logicaudit", "list"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["logicaudit", "-v", "list"]).verbosity(), Verbosity::Verbose);
        assert_eq!(parse(&["logicaudit", "-vv", "list"]).verbosity(), Verbosity::Trace);
        assert_eq!(parse(&["logicaudit", "-q", "list"]).verbosity(), Verbosity::Quiet);
    }

    #[test]
    fn test_parse_run_defaults() {
        let cli = parse(&["logicaudit", "run"]);
        match cli.command {
            Command::Run(run) => {
                assert!(run.format.is_none());
                assert!(!run.tour);
                assert!(!run.allow_skip);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_run_with_flags() {
        let cli = parse(&["logicaudit", "run", "--format", "json", "--tour", "--allow-skip"]);
        match cli.command {
            Command::Run(run) => {
                assert_eq!(run.format, Some(PanelFormat::Json));
                assert!(run.tour);
                assert!(run.allow_skip);
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_list_default_format() {
        let cli = parse(&["logicaudit", "list"]);
        assert!(matches!(
            cli.command,
            Command::List(ListCommand {
                format: OutputFormat::Table
            })
        ));
    }

    #[test]
    fn test_parse_show() {
        let cli = parse(&["logicaudit", "show", "3", "--json"]);
        assert!(matches!(
            cli.command,
            Command::Show(ShowCommand { id: 3, json: true })
        ));
    }

    #[test]
    fn test_parse_show_rejects_non_numeric_id() {
        assert!(Cli::try_parse_from(["logicaudit", "show", "three"]).is_err());
    }

    #[test]
    fn test_parse_with_config() {
        let cli = parse(&["logicaudit", "-c", "/custom/config.toml", "config", "show"]);
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Show { json: false })
        ));
    }

    #[test]
    fn test_command_required() {
        assert!(Cli::try_parse_from(["logicaudit"]).is_err());
    }
}
