//! Parsed filter output formatting.

use filterql::{Clause, Combinator, Comparator, Filter, Value};
use owo_colors::OwoColorize;
use serde::Serialize;

/// JSON node of the clause tree.
#[derive(Serialize)]
#[serde(untagged)]
pub enum TreeNode<'a> {
    Comparison {
        key: &'a str,
        comparator: Comparator,
        values: &'a [Value],
    },
    Group {
        combinator: Combinator,
        filters: Vec<TreeNode<'a>>,
    },
}

/// JSON output structure for the parse command.
#[derive(Serialize)]
pub struct FilterOutput<'a> {
    pub filter: String,
    pub tree: TreeNode<'a>,
}

/// Builds the tree node of a filter. Several top-level clauses form an `and` group.
fn filter_node(filter: &Filter) -> TreeNode<'_> {
    match filter.clauses() {
        [clause] => clause_node(clause),
        clauses => TreeNode::Group {
            combinator: Combinator::And,
            filters: clauses.iter().map(clause_node).collect(),
        },
    }
}

fn clause_node(clause: &Clause) -> TreeNode<'_> {
    match clause {
        Clause::Comparison(comparison) => TreeNode::Comparison {
            key: &comparison.key,
            comparator: comparison.comparator,
            values: &comparison.values,
        },
        Clause::Group(group) => TreeNode::Group {
            combinator: group.combinator,
            filters: group.filters.iter().map(filter_node).collect(),
        },
    }
}

/// Formats a filter as JSON with its canonical text and clause tree.
pub fn format_filter_json(filter: &Filter) -> Result<String, serde_json::Error> {
    let output = FilterOutput {
        filter: filter.to_string(),
        tree: filter_node(filter),
    };
    serde_json::to_string_pretty(&output)
}

/// Formats the canonical text of a filter.
pub fn format_filter_text(filter: &Filter) -> String {
    format!("{filter}\n")
}

/// Formats a filter as an indented clause tree.
///
/// ```text
/// or
///   and
///     a == 1
///     b == 2
///   c == 3
/// ```
pub fn format_filter_tree(filter: &Filter, use_colors: bool) -> String {
    let mut output = String::new();
    if filter.is_empty() {
        output.push_str("(empty filter)\n");
        return output;
    }
    write_filter(&mut output, filter, 0, use_colors);
    output
}

fn write_filter(output: &mut String, filter: &Filter, depth: usize, use_colors: bool) {
    match filter.clauses() {
        [clause] => write_clause(output, clause, depth, use_colors),
        clauses => {
            write_combinator(output, Combinator::And, depth, use_colors);
            for clause in clauses {
                write_clause(output, clause, depth + 1, use_colors);
            }
        }
    }
}

fn write_clause(output: &mut String, clause: &Clause, depth: usize, use_colors: bool) {
    match clause {
        Clause::Comparison(comparison) => {
            output.push_str(&format!("{}{comparison}\n", "  ".repeat(depth)));
        }
        Clause::Group(group) => {
            write_combinator(output, group.combinator, depth, use_colors);
            for filter in &group.filters {
                write_filter(output, filter, depth + 1, use_colors);
            }
        }
    }
}

fn write_combinator(output: &mut String, combinator: Combinator, depth: usize, use_colors: bool) {
    let indent = "  ".repeat(depth);
    let label = combinator.to_string();
    if use_colors {
        output.push_str(&format!("{indent}{}\n", label.cyan().bold()));
    } else {
        output.push_str(&format!("{indent}{label}\n"));
    }
}
