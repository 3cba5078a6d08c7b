//! Match result output formatting.

use owo_colors::OwoColorize;
use serde::Serialize;

use super::helpers::{plural, truncate_str};

/// Maximum width of the document column.
const DOCUMENT_WIDTH: usize = 60;

/// The outcome of evaluating one input document.
#[derive(Debug)]
pub struct MatchRow {
    /// Position of the document in the input.
    pub index: usize,
    /// Whether the document matched.
    pub matched: bool,
    /// The document itself.
    pub document: serde_json::Value,
}

/// JSON output structure for the match command.
#[derive(Serialize)]
pub struct MatchesOutput<'a> {
    pub filter: &'a str,
    pub total: usize,
    pub matched: usize,
    pub results: Vec<MatchResultOutput>,
}

/// JSON output structure for a single evaluated document.
#[derive(Serialize)]
pub struct MatchResultOutput {
    pub index: usize,
    pub matched: bool,
}

/// Formats match results as JSON.
///
/// `total` counts every evaluated document, even when `rows` was narrowed.
pub fn format_matches_json(
    filter: &str,
    total: usize,
    rows: &[MatchRow],
) -> Result<String, serde_json::Error> {
    let output = MatchesOutput {
        filter,
        total,
        matched: rows.iter().filter(|row| row.matched).count(),
        results: rows
            .iter()
            .map(|row| MatchResultOutput {
                index: row.index,
                matched: row.matched,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats match results as a table followed by a summary line.
pub fn format_matches_table(total: usize, rows: &[MatchRow], use_colors: bool) -> String {
    let matched = rows.iter().filter(|row| row.matched).count();
    let mut output = String::new();

    if rows.is_empty() {
        output.push_str("No documents to show.\n");
    } else {
        let header = format!("{:<6} {:<7} {}", "#", "Match", "Document");
        if use_colors {
            output.push_str(&format!("{}\n", header.dimmed()));
        } else {
            output.push_str(&header);
            output.push('\n');
        }

        for row in rows {
            let mark = match (row.matched, use_colors) {
                (true, true) => format!("{:<7}", "yes").green().to_string(),
                (false, true) => format!("{:<7}", "no").red().to_string(),
                (true, false) => format!("{:<7}", "yes"),
                (false, false) => format!("{:<7}", "no"),
            };
            let document = truncate_str(&row.document.to_string(), DOCUMENT_WIDTH);
            output.push_str(&format!("{:<6} {} {}\n", row.index, mark, document));
        }
    }

    output.push_str(&format!(
        "\n{} of {} matched\n",
        matched,
        plural(total, "document", "documents")
    ));
    output
}
