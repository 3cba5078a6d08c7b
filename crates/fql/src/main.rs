use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands, ConfigCommands};
use commands::config::{load_config, ConfigSetOptions};
use commands::matches::MatchOptions;
use commands::parse::ParseOptions;
use commands::{CommandContext, CommandError};
use filterql::ErrorPayload;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "FQL_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                match serde_json::to_string_pretty(&error_payload(&e)) {
                    Ok(json) => eprintln!("{json}"),
                    Err(_) => eprintln!("Error: {e}"),
                }
            } else {
                eprintln!("Error: {e}");
            }
            error_exit_code(&e)
        }
    }
}

/// Log level selected by the verbosity flags.
fn default_log_level(cli: &Cli) -> &'static str {
    if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    }
}

/// Installs the stderr log subscriber. `FQL_LOG` wins over the verbosity flags.
fn init_tracing(cli: &Cli) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_log_level(cli)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(cli: &Cli) -> commands::Result<()> {
    // A broken config file must not prevent inspecting or fixing it.
    let config = match &cli.command {
        Some(Commands::Config { .. }) | Some(Commands::Completions { .. }) | None => {
            load_config().unwrap_or_default()
        }
        _ => load_config()?,
    };
    let ctx = CommandContext::from_cli(cli, &config);

    match &cli.command {
        Some(Commands::Parse { expr, deny, tree }) => {
            let opts = ParseOptions {
                expr: expr.clone(),
                deny: deny.clone(),
                tree: *tree,
            };
            commands::parse::execute(&ctx, &opts)
        }
        Some(Commands::Match {
            expr,
            input,
            deny,
            only_matching,
        }) => {
            let opts = MatchOptions {
                expr: expr.clone(),
                input: input.clone(),
                deny: deny.clone(),
                only_matching: *only_matching,
            };
            commands::matches::execute(&ctx, &opts)
        }
        Some(Commands::Config { command }) => match command {
            Some(ConfigCommands::Show) | None => commands::config::execute_show(&ctx),
            Some(ConfigCommands::Set { key, value }) => {
                let opts = ConfigSetOptions {
                    key: key.clone(),
                    value: value.clone(),
                };
                commands::config::execute_set(&ctx, &opts)
            }
            Some(ConfigCommands::Path) => commands::config::execute_path(&ctx),
        },
        Some(Commands::Completions { shell }) => {
            commands::completions::execute(shell).map_err(CommandError::Io)
        }
        None => {
            if !ctx.quiet {
                println!("fql - filter query language");
                println!("Use --help for usage information");
            }
            Ok(())
        }
    }
}

/// Returns the error code string for JSON output.
fn error_code(e: &CommandError) -> &'static str {
    match e {
        CommandError::Parse(_) => "FILTER_ERROR",
        CommandError::Match(_) => "MATCH_ERROR",
        CommandError::Input(_) => "INPUT_ERROR",
        CommandError::Config(_) => "CONFIG_ERROR",
        CommandError::Io(_) => "IO_ERROR",
        CommandError::Json(_) => "JSON_ERROR",
    }
}

/// Builds the JSON error payload. Filter errors carry their own payload.
fn error_payload(e: &CommandError) -> ErrorPayload {
    match e {
        CommandError::Parse(err) => ErrorPayload::from(err),
        CommandError::Match(err) => ErrorPayload::from(err),
        CommandError::Input(_) | CommandError::Json(_) => {
            ErrorPayload::new("Bad Request", e.to_string(), "input", 400)
        }
        CommandError::Config(_) => {
            ErrorPayload::new("Configuration Error", e.to_string(), "config", 500)
        }
        CommandError::Io(_) => ErrorPayload::new("I/O Error", e.to_string(), "io", 500),
    }
    .with_data(serde_json::json!({ "code": error_code(e) }))
}

/// Returns the process status for an error.
fn error_status(e: &CommandError) -> u8 {
    match e {
        CommandError::Parse(_) => 1,
        CommandError::Match(_) => 1,
        CommandError::Input(_) => 1,
        CommandError::Json(_) => 1,
        CommandError::Io(_) => 3,
        CommandError::Config(_) => 5,
    }
}

/// Returns the exit code for an error.
fn error_exit_code(e: &CommandError) -> ExitCode {
    ExitCode::from(error_status(e))
}
