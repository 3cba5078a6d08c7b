//! Error types for filter parsing and matching.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::Comparator;

/// A specialized Result type for filter parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// A specialized Result type for filter matching operations.
pub type MatchResult<T> = Result<T, MatchError>;

/// Errors that can occur while parsing a filter expression.
///
/// Parsing stops at the first error; no partial filter is ever returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The expression does not start with a key, a quote or a parenthesis.
    #[error("invalid start of expression. found {found}")]
    InvalidStart {
        /// The literal that was found instead.
        found: String,
    },

    /// A key was not followed by a known comparator.
    #[error(
        "invalid operator. found {found} instead of (==, !=, <, <=, >, >=, contains, in, matches, exists)"
    )]
    InvalidOperator {
        /// The literal that was found instead.
        found: String,
    },

    /// `NOT` was placed before something other than `contains`, `in` or `exists`.
    #[error("invalid usage of operator NOT before {found}")]
    InvalidNot {
        /// The literal following `NOT`.
        found: String,
    },

    /// The comparator has been disabled through [`ParserConfig`](crate::ParserConfig).
    #[error("unsupported comparator: {comparator}")]
    UnsupportedComparator {
        /// The rejected comparator.
        comparator: Comparator,
    },

    /// A complete clause was followed by something other than `and`, `or`, `)` or the end.
    #[error("invalid keyword after {clause}. found {found}")]
    InvalidKeyword {
        /// The canonical text of the clause just parsed.
        clause: String,
        /// The literal that was found instead.
        found: String,
    },

    /// Keys starting with `$` are reserved for parameters.
    #[error("could not start a parameter with $. Found {key}")]
    ParameterKey {
        /// The offending key.
        key: String,
    },

    /// A quoted string was never closed.
    #[error("missing quote after {text}")]
    MissingClosingQuote {
        /// The text read before the end of input.
        text: String,
    },

    /// A bare value was followed by a quote.
    #[error("missing quote before the value: {value}")]
    MissingOpeningQuote {
        /// The bare value.
        value: String,
    },

    /// Two bare words were found where a single value was expected.
    #[error("missing parenthese to protect value: {value} {next}")]
    UnprotectedValue {
        /// The first word.
        value: String,
        /// The word that followed it.
        next: String,
    },

    /// The token in value position cannot start a value.
    #[error("invalid value. found {found}")]
    InvalidValue {
        /// The literal that was found.
        found: String,
    },

    /// An array was interrupted by a parenthesis or the end of input.
    #[error("invalid end of array. found {found}")]
    InvalidArrayEnd {
        /// The literal that was found.
        found: String,
    },

    /// The argument of `date(...)` is not a supported date format.
    #[error("unable to parse date format {text}")]
    InvalidDate {
        /// The raw date text.
        text: String,
    },

    /// The argument of `now(...)` is not a valid duration.
    #[error("unable to parse duration {text}: {reason}")]
    InvalidDuration {
        /// The raw duration text.
        text: String,
        /// Why the duration was rejected.
        reason: String,
    },

    /// The input ended inside a parenthesised group.
    #[error("missing closing parenthesis. found EOF")]
    MissingClosingParenthesis,

    /// A closing parenthesis without a matching opening one.
    #[error("unexpected closing parenthesis. found )")]
    UnexpectedClosingParenthesis,

    /// Groups or arrays are nested deeper than the parser allows.
    #[error("max nesting depth exceeded. limit is {limit}")]
    NestingTooDeep {
        /// The maximum accepted depth.
        limit: usize,
    },
}

impl ParseError {
    /// Creates an invalid start error.
    pub fn invalid_start(found: impl Into<String>) -> Self {
        ParseError::InvalidStart {
            found: found.into(),
        }
    }

    /// Creates an invalid operator error.
    pub fn invalid_operator(found: impl Into<String>) -> Self {
        ParseError::InvalidOperator {
            found: found.into(),
        }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(found: impl Into<String>) -> Self {
        ParseError::InvalidValue {
            found: found.into(),
        }
    }

    /// Creates an invalid date error.
    pub fn invalid_date(text: impl Into<String>) -> Self {
        ParseError::InvalidDate { text: text.into() }
    }
}

/// Errors that can occur while matching an object against a filter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatchError {
    /// The matcher only evaluates equality and existence comparators.
    #[error("unsupported comparator: \"{comparator}\"")]
    UnsupportedComparator {
        /// The comparator that cannot be evaluated.
        comparator: Comparator,
    },
}

/// A serializable error description that can be handed back to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Status-like numeric code.
    pub code: u16,
    /// Short title for the code.
    pub title: String,
    /// Human readable description.
    pub description: String,
    /// What the error is about.
    pub subject: String,
    /// Optional extra data.
    pub data: Option<serde_json::Value>,
}

/// Subject used for every payload built from a filter error.
pub const ERROR_SUBJECT: &str = "filter";

impl ErrorPayload {
    /// Creates a new payload without data.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        subject: impl Into<String>,
        code: u16,
    ) -> Self {
        Self {
            code,
            title: title.into(),
            description: description.into(),
            subject: subject.into(),
            data: None,
        }
    }

    /// Attaches extra data to the payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

impl std::fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "error {} ({}): {}: {}",
            self.code, self.subject, self.title, self.description
        )
    }
}

impl std::error::Error for ErrorPayload {}

impl From<&ParseError> for ErrorPayload {
    fn from(err: &ParseError) -> Self {
        ErrorPayload::new("Bad Request", err.to_string(), ERROR_SUBJECT, 400)
    }
}

impl From<ParseError> for ErrorPayload {
    fn from(err: ParseError) -> Self {
        ErrorPayload::from(&err)
    }
}

impl From<&MatchError> for ErrorPayload {
    fn from(err: &MatchError) -> Self {
        ErrorPayload::new("Unprocessable Entity", err.to_string(), ERROR_SUBJECT, 422)
    }
}

impl From<MatchError> for ErrorPayload {
    fn from(err: MatchError) -> Self {
        ErrorPayload::from(&err)
    }
}
