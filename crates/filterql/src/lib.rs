//! A small query-filter language.
//!
//! Filters are written as boolean expressions over object attributes, such as
//! `name == "bob" and (age == 10 or tags contains ["admin"])`. They are parsed
//! into an immutable [`Filter`], printed back in a canonical form that parses
//! to the same filter, and evaluated against any type implementing
//! [`AttributeSpecifiable`].
//!
//! # Supported Syntax
//!
//! ## Comparators
//! - `==`, `!=`, `<`, `<=`, `>`, `>=`
//! - `contains`, `not contains`, `in`, `not in`, `matches`
//! - `exists`, `not exists` (no value)
//!
//! ## Values
//! - Strings: `"double"`, `'single'` or a single bare word
//! - Numbers: `42`, `-3`, `38.9`
//! - Booleans: `true`, `false`
//! - Dates: `date("2018-04-26")`, `date("2018-04-26 10:30")`, RFC 3339
//! - Durations: `now()`, `now("-1h")`, `now("1h30m")`
//! - Arrays: `["a", 1, true]`
//!
//! ## Boolean Operators
//! - `and`, `or` (case-insensitive, no relative precedence)
//! - `()` - Grouping
//!
//! # Example
//!
//! ```
//! use filterql::{Attributes, FilterComposer};
//!
//! let filter = filterql::parse(r#"name == "bob" and admin exists"#).unwrap();
//! assert_eq!(filter.to_string(), r#"((name == "bob") and (admin exists))"#);
//!
//! let bob = Attributes::new().with("name", "bob").with("admin", false);
//! assert!(filter.matches(&bob).unwrap());
//!
//! let composed = FilterComposer::new()
//!     .and([
//!         FilterComposer::new().with_key("name").equals("bob").done(),
//!         FilterComposer::new().with_key("admin").exists().done(),
//!     ])
//!     .done();
//! assert_eq!(composed, filter);
//! ```

mod attributes;
mod composer;
mod error;
mod filter;
mod matcher;
mod parser;
mod scanner;
mod value;

pub use attributes::{AttributeSpecifiable, Attributes};
pub use composer::{FilterComposer, FilterValueComposer};
pub use error::{ErrorPayload, MatchError, MatchResult, ParseError, ParseResult, ERROR_SUBJECT};
pub use filter::{Clause, Combinator, Comparator, Comparison, Filter, Group};
pub use matcher::{matches_filter, FilterMatcher};
pub use parser::{FilterParser, ParserConfig, MAX_NESTING_DEPTH};
pub use scanner::{Scanner, Token, TokenKind};
pub use value::{format_duration, parse_date, parse_duration, Value};

/// Parses a filter expression with the default configuration.
pub fn parse(input: &str) -> ParseResult<Filter> {
    FilterParser::new(input).parse()
}

#[cfg(test)]
mod tests;
