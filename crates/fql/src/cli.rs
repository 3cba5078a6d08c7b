//! CLI argument parsing using clap derive macros.
//!
//! This module defines the command-line interface for the fql CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use filterql::Comparator;

/// fql - Parse, format and evaluate filter expressions
#[derive(Parser, Debug)]
#[command(name = "fql")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbose output (show debug information)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Force JSON output
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a filter and print its canonical form
    #[command(alias = "p")]
    Parse {
        /// Filter expression (e.g., 'name == "bob" and age exists')
        expr: String,

        /// Reject a comparator (repeatable, e.g., --deny matches)
        #[arg(long = "deny", value_name = "COMPARATOR")]
        deny: Vec<Comparator>,

        /// Print the clause tree instead of the canonical text
        #[arg(long)]
        tree: bool,
    },

    /// Evaluate a filter against JSON documents
    #[command(alias = "m")]
    Match {
        /// Filter expression
        expr: String,

        /// JSON file holding an object or an array of objects (default: stdin)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,

        /// Reject a comparator (repeatable)
        #[arg(long = "deny", value_name = "COMPARATOR")]
        deny: Vec<Comparator>,

        /// Only list the documents that match
        #[arg(long)]
        only_matching: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

/// Shell types for completions
#[derive(ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Configuration value
        value: String,
    },

    /// Print config file path
    Path,
}
