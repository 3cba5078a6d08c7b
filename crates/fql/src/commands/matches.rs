//! Match command implementation.
//!
//! Evaluates a filter against JSON documents read from a file or stdin.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use filterql::{Attributes, Comparator, FilterMatcher};
use tracing::debug;

use super::parse::parse_filter;
use super::{CommandContext, CommandError, Result};
use crate::output::{format_matches_json, format_matches_table, MatchRow};

/// Options for the match command.
#[derive(Debug, Default)]
pub struct MatchOptions {
    /// The filter expression.
    pub expr: String,
    /// Input file; stdin when absent.
    pub input: Option<PathBuf>,
    /// Comparators rejected on top of the configured ones.
    pub deny: Vec<Comparator>,
    /// Only report matching documents.
    pub only_matching: bool,
}

/// Reads the raw input text.
fn read_input(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) => Ok(fs::read_to_string(path)?),
        None => {
            let mut content = String::new();
            io::stdin().read_to_string(&mut content)?;
            Ok(content)
        }
    }
}

/// Splits the input into documents: one object, or an array of objects.
pub fn parse_documents(content: &str) -> Result<Vec<serde_json::Value>> {
    let json: serde_json::Value = serde_json::from_str(content)?;
    match json {
        serde_json::Value::Object(_) => Ok(vec![json]),
        serde_json::Value::Array(items) => {
            if let Some(index) = items.iter().position(|item| !item.is_object()) {
                return Err(CommandError::Input(format!(
                    "document {index} is not a JSON object"
                )));
            }
            Ok(items)
        }
        _ => Err(CommandError::Input(
            "expected a JSON object or an array of objects".to_string(),
        )),
    }
}

/// Evaluates the filter against every document.
pub fn evaluate(
    matcher: &FilterMatcher<'_>,
    documents: Vec<serde_json::Value>,
) -> Result<Vec<MatchRow>> {
    documents
        .into_iter()
        .enumerate()
        .map(|(index, document)| {
            let attributes = Attributes::from_json(&document).ok_or_else(|| {
                CommandError::Input(format!("document {index} is not a JSON object"))
            })?;
            let matched = matcher.matches(&attributes)?;
            debug!(index, matched, attributes = attributes.len(), "evaluated document");
            Ok(MatchRow {
                index,
                matched,
                document,
            })
        })
        .collect()
}

/// Executes the match command.
pub fn execute(ctx: &CommandContext, opts: &MatchOptions) -> Result<()> {
    let filter = parse_filter(ctx, &opts.expr, &opts.deny)?;
    let content = read_input(opts.input.as_ref())?;
    let documents = parse_documents(&content)?;
    let total = documents.len();

    let mut rows = evaluate(&FilterMatcher::new(&filter), documents)?;
    if opts.only_matching {
        rows.retain(|row| row.matched);
    }

    if ctx.json_output {
        println!(
            "{}",
            format_matches_json(&filter.to_string(), total, &rows)?
        );
    } else if !ctx.quiet {
        print!("{}", format_matches_table(total, &rows, ctx.use_colors));
    }

    Ok(())
}
