//! Output formatting utilities for the fql CLI.
//!
//! This module provides functions for formatting data as text, tables or JSON:
//!
//! - [`filter`] - Parsed filter output (canonical text, clause tree)
//! - [`matches`] - Match results (table and summary)
//! - [`helpers`] - Common formatting utilities

mod filter;
pub mod helpers;
mod matches;

pub use filter::{format_filter_json, format_filter_text, format_filter_tree};
pub use matches::{format_matches_json, format_matches_table, MatchRow};
