//! Command implementations for the fql CLI.
//!
//! This module contains the actual command handlers that are invoked by the CLI.

pub mod completions;
pub mod config;
pub mod matches;
pub mod parse;

use std::env;

use filterql::{Comparator, ParserConfig};

use crate::cli::Cli;
use self::config::Config;

/// Error type for command execution.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// Filter parsing error.
    #[error("filter error: {0}")]
    Parse(#[from] filterql::ParseError),

    /// Filter evaluation error.
    #[error("match error: {0}")]
    Match(#[from] filterql::MatchError),

    /// Input documents are not usable.
    #[error("input error: {0}")]
    Input(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for command execution.
pub type Result<T> = std::result::Result<T, CommandError>;

/// Context for command execution, containing common dependencies.
pub struct CommandContext {
    /// Whether to output JSON.
    pub json_output: bool,
    /// Whether to use colors.
    pub use_colors: bool,
    /// Whether to be quiet (errors only).
    pub quiet: bool,
    /// Comparators rejected by the configuration file.
    pub denied_comparators: Vec<Comparator>,
}

impl CommandContext {
    /// Creates a new command context from CLI arguments and the loaded config.
    pub fn from_cli(cli: &Cli, config: &Config) -> Self {
        let use_colors = !cli.no_color
            && config.output.color.unwrap_or(true)
            && env::var_os("NO_COLOR").is_none();
        Self {
            json_output: cli.json,
            use_colors,
            quiet: cli.quiet,
            denied_comparators: config.parser.unsupported_comparators.clone(),
        }
    }

    /// Builds the parser configuration from the config file and `--deny` flags.
    pub fn parser_config(&self, deny: &[Comparator]) -> ParserConfig {
        ParserConfig::new().with_unsupported_comparators(
            self.denied_comparators.iter().chain(deny.iter()).copied(),
        )
    }
}
