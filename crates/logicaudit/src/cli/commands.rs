//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand, ValueEnum};

use crate::config::PanelFormat;

/// Run command arguments.
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Panel format (overrides `display.format`)
    #[arg(short, long, value_enum)]
    pub format: Option<PanelFormat>,

    /// Audit and advance through every scenario without input
    #[arg(long)]
    pub tour: bool,

    /// Accept `next` before the current scenario is audited
    #[arg(long)]
    pub allow_skip: bool,
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Show command arguments.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Scenario id, as printed by `list`
    pub id: u32,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// One scenario per line
    #[default]
    Plain,
    /// Aligned columns with a header
    Table,
    /// JSON array
    Json,
}
