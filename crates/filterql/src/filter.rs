//! Filter data model and canonical text form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::scanner::is_word_char;
use crate::value::{write_quoted, Value};

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    /// `==`
    #[serde(rename = "==")]
    Equal,
    /// `!=`
    #[serde(rename = "!=")]
    NotEqual,
    /// `>`
    #[serde(rename = ">")]
    Greater,
    /// `>=`
    #[serde(rename = ">=")]
    GreaterOrEqual,
    /// `<`
    #[serde(rename = "<")]
    Lesser,
    /// `<=`
    #[serde(rename = "<=")]
    LesserOrEqual,
    /// `in`
    #[serde(rename = "in")]
    In,
    /// `not in`
    #[serde(rename = "not in")]
    NotIn,
    /// `contains`
    #[serde(rename = "contains")]
    Contain,
    /// `not contains`
    #[serde(rename = "not contains")]
    NotContain,
    /// `matches`
    #[serde(rename = "matches")]
    Match,
    /// `not matches`. Reserved: the parser never produces it.
    #[serde(rename = "not matches")]
    NotMatch,
    /// `exists`
    #[serde(rename = "exists")]
    Exists,
    /// `not exists`
    #[serde(rename = "not exists")]
    NotExists,
}

impl Comparator {
    /// Every comparator, in declaration order.
    pub const ALL: [Comparator; 14] = [
        Comparator::Equal,
        Comparator::NotEqual,
        Comparator::Greater,
        Comparator::GreaterOrEqual,
        Comparator::Lesser,
        Comparator::LesserOrEqual,
        Comparator::In,
        Comparator::NotIn,
        Comparator::Contain,
        Comparator::NotContain,
        Comparator::Match,
        Comparator::NotMatch,
        Comparator::Exists,
        Comparator::NotExists,
    ];

    /// Returns the canonical text of the comparator.
    pub fn as_str(self) -> &'static str {
        match self {
            Comparator::Equal => "==",
            Comparator::NotEqual => "!=",
            Comparator::Greater => ">",
            Comparator::GreaterOrEqual => ">=",
            Comparator::Lesser => "<",
            Comparator::LesserOrEqual => "<=",
            Comparator::In => "in",
            Comparator::NotIn => "not in",
            Comparator::Contain => "contains",
            Comparator::NotContain => "not contains",
            Comparator::Match => "matches",
            Comparator::NotMatch => "not matches",
            Comparator::Exists => "exists",
            Comparator::NotExists => "not exists",
        }
    }

    /// Returns true if the comparator takes a list of values.
    pub fn is_multi_value(self) -> bool {
        matches!(
            self,
            Comparator::In
                | Comparator::NotIn
                | Comparator::Contain
                | Comparator::NotContain
                | Comparator::Match
                | Comparator::NotMatch
        )
    }

    /// Returns true for `exists` and `not exists`, which carry no value.
    pub fn is_existence(self) -> bool {
        matches!(self, Comparator::Exists | Comparator::NotExists)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Comparator {
    type Err = ParseError;

    /// Parses the canonical text, ignoring case and extra inner whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();
        Comparator::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ParseError::invalid_operator(s))
    }
}

/// How the sub-filters of a group are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// Every sub-filter must match.
    And,
    /// At least one sub-filter must match.
    Or,
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Combinator::And => "and",
            Combinator::Or => "or",
        })
    }
}

/// A single `key comparator value` test.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    /// The attribute name.
    pub key: String,
    /// The comparator.
    pub comparator: Comparator,
    /// One value for single-value comparators, any number for multi-value
    /// ones, and a synthetic boolean for `exists` / `not exists`.
    pub values: Vec<Value>,
}

impl Comparison {
    /// Returns the value of a single-value comparison.
    pub fn value(&self) -> Option<&Value> {
        self.values.first()
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_key(f, &self.key)?;
        write!(f, " {}", self.comparator)?;

        if self.comparator.is_existence() {
            return Ok(());
        }
        if self.comparator.is_multi_value() {
            return write!(f, " {}", Value::List(self.values.clone()));
        }
        match self.values.first() {
            Some(value) => write!(f, " {value}"),
            None => Ok(()),
        }
    }
}

/// Sub-filters combined with `and` or `or`.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// How the sub-filters are combined.
    pub combinator: Combinator,
    /// The sub-filters, in order.
    pub filters: Vec<Filter>,
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", self.combinator)?;
            }
            write!(f, "({filter})")?;
        }
        f.write_str(")")
    }
}

/// One element of a [`Filter`].
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// A comparison on one attribute.
    Comparison(Comparison),
    /// A group of sub-filters.
    Group(Group),
}

impl Clause {
    /// The conjunction printed before this clause when it is not the first one.
    fn joiner(&self) -> Combinator {
        match self {
            Clause::Comparison(_) => Combinator::And,
            Clause::Group(group) => group.combinator,
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clause::Comparison(comparison) => comparison.fmt(f),
            Clause::Group(group) => group.fmt(f),
        }
    }
}

/// A parsed or composed filter.
///
/// A filter is an ordered list of clauses which must all match. It is
/// immutable once built; use [`FilterComposer`](crate::FilterComposer) or
/// [`FilterParser`](crate::FilterParser) to create one.
///
/// `Display` produces the canonical text, which parses back to an equivalent
/// filter.
///
/// # Example
///
/// ```
/// use filterql::Filter;
///
/// let filter: Filter = r#"name=="bob" and age == 3"#.parse().unwrap();
/// assert_eq!(filter.to_string(), r#"((name == "bob") and (age == 3))"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    pub(crate) fn from_clauses(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    /// Builds a filter made of a single comparison.
    pub(crate) fn comparison(comparison: Comparison) -> Self {
        Self::from_clauses(vec![Clause::Comparison(comparison)])
    }

    /// Builds a filter made of a single group.
    pub(crate) fn group(combinator: Combinator, filters: Vec<Filter>) -> Self {
        Self::from_clauses(vec![Clause::Group(Group {
            combinator,
            filters,
        })])
    }

    /// Returns the clauses in order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Returns true if the filter has no clause.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Returns the number of top-level clauses.
    pub fn len(&self) -> usize {
        self.clauses.len()
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", clause.joiner())?;
            }
            clause.fmt(f)?;
        }
        Ok(())
    }
}

impl FromStr for Filter {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::FilterParser::new(s).parse()
    }
}

/// Writes a key bare when it scans back as the same word, quoted otherwise.
fn write_key(f: &mut fmt::Formatter<'_>, key: &str) -> fmt::Result {
    if key_needs_quotes(key) {
        write_quoted(f, key)
    } else {
        f.write_str(key)
    }
}

fn key_needs_quotes(key: &str) -> bool {
    const KEYWORDS: [&str; 9] = [
        "and", "or", "true", "false", "contains", "matches", "in", "not", "exists",
    ];

    key.is_empty()
        || key.contains(['\\', '<', '>'])
        || key.contains("==")
        || key.contains("!=")
        || !key.chars().all(is_word_char)
        || KEYWORDS.iter().any(|k| key.eq_ignore_ascii_case(k))
}
