//! Parse command implementation.
//!
//! Parses a filter expression and prints its canonical form or clause tree.

use filterql::{Comparator, Filter, FilterParser};
use tracing::debug;

use super::{CommandContext, Result};
use crate::output::{format_filter_json, format_filter_text, format_filter_tree};

/// Options for the parse command.
#[derive(Debug, Default)]
pub struct ParseOptions {
    /// The filter expression.
    pub expr: String,
    /// Comparators rejected on top of the configured ones.
    pub deny: Vec<Comparator>,
    /// Print the clause tree.
    pub tree: bool,
}

/// Parses the expression with the context's parser configuration.
pub fn parse_filter(ctx: &CommandContext, expr: &str, deny: &[Comparator]) -> Result<Filter> {
    let config = ctx.parser_config(deny);
    debug!(
        denied = config.unsupported_comparators().count(),
        "parsing filter"
    );
    Ok(FilterParser::with_config(expr, config).parse()?)
}

/// Executes the parse command.
pub fn execute(ctx: &CommandContext, opts: &ParseOptions) -> Result<()> {
    let filter = parse_filter(ctx, &opts.expr, &opts.deny)?;

    if ctx.json_output {
        println!("{}", format_filter_json(&filter)?);
    } else if !ctx.quiet {
        if opts.tree {
            print!("{}", format_filter_tree(&filter, ctx.use_colors));
        } else {
            print!("{}", format_filter_text(&filter));
        }
    }

    Ok(())
}
