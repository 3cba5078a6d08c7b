//! Parser turning filter expressions into [`Filter`]s.

use std::collections::HashSet;

use tracing::trace;

use crate::error::{ParseError, ParseResult};
use crate::filter::{Combinator, Comparator, Comparison, Filter};
use crate::scanner::{Scanner, Token, TokenKind};
use crate::value::{parse_date, parse_duration, Value};

/// Deepest accepted nesting of parenthesised groups and arrays.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Options changing what the parser accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserConfig {
    unsupported_comparators: HashSet<Comparator>,
}

impl ParserConfig {
    /// Creates a configuration accepting every comparator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects the given comparators with [`ParseError::UnsupportedComparator`].
    pub fn with_unsupported_comparators(
        mut self,
        comparators: impl IntoIterator<Item = Comparator>,
    ) -> Self {
        self.unsupported_comparators.extend(comparators);
        self
    }

    /// Returns true if the comparator is accepted.
    pub fn is_supported(&self, comparator: Comparator) -> bool {
        !self.unsupported_comparators.contains(&comparator)
    }

    /// Returns the rejected comparators.
    pub fn unsupported_comparators(&self) -> impl Iterator<Item = Comparator> + '_ {
        self.unsupported_comparators.iter().copied()
    }
}

/// Parser for filter expressions.
///
/// # Grammar
///
/// ```text
/// expr       ::= clause ( ("and" | "or") clause )*
/// clause     ::= key comparator value? | "(" expr ")"
/// key        ::= quoted | word
/// comparator ::= "==" | "!=" | "<" | "<=" | ">" | ">="
///              | "contains" | "not contains" | "in" | "not in"
///              | "matches" | "exists" | "not exists"
/// value      ::= quoted | word | number | "true" | "false"
///              | "date(" text ")" | "now(" text? ")"
///              | "[" value ("," value)* "]"
/// ```
///
/// # Precedence
///
/// `and` and `or` have no precedence over each other. Clauses are stacked
/// while the conjunction stays the same; when it changes, everything stacked
/// so far becomes a single group. `a and b or c` reads as `(a and b) or c`
/// and `a or b and c` as `(a or b) and c`.
///
/// # Example
///
/// ```
/// use filterql::{FilterParser, ParserConfig, Comparator};
///
/// let filter = FilterParser::new(r#"name == "bob" and age == 42"#).parse().unwrap();
/// assert_eq!(filter.to_string(), r#"((name == "bob") and (age == 42))"#);
///
/// let config = ParserConfig::new().with_unsupported_comparators([Comparator::Match]);
/// let err = FilterParser::with_config("name matches bo", config).parse().unwrap_err();
/// assert_eq!(err.to_string(), "unsupported comparator: matches");
/// ```
pub struct FilterParser {
    scanner: Scanner,
    config: ParserConfig,
    /// The last token read, returned again after [`unscan`](Self::unscan).
    last: Token,
    pushed_back: bool,
    /// Current group and array nesting.
    depth: usize,
}

impl FilterParser {
    /// Creates a parser with the default configuration.
    pub fn new(input: &str) -> Self {
        Self::with_config(input, ParserConfig::default())
    }

    /// Creates a parser with the given configuration.
    pub fn with_config(input: &str, config: ParserConfig) -> Self {
        trace!(input, "creating filter parser");
        Self {
            scanner: Scanner::new(input),
            config,
            last: Token {
                kind: TokenKind::Eof,
                literal: String::new(),
                position: 0,
            },
            pushed_back: false,
            depth: 0,
        }
    }

    /// Parses the whole input.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] encountered; no partial filter is
    /// returned.
    pub fn parse(mut self) -> ParseResult<Filter> {
        let filter = self.parse_expression(false)?;
        trace!(filter = %filter, "parsed filter");
        Ok(filter)
    }

    // ==================== Token buffer ====================

    /// Returns the pushed back token, or scans a new one.
    fn scan(&mut self) -> Token {
        if self.pushed_back {
            self.pushed_back = false;
            return self.last.clone();
        }
        self.last = self.scanner.scan();
        self.last.clone()
    }

    /// Pushes back the last token read.
    fn unscan(&mut self) {
        self.pushed_back = true;
    }

    /// Scans the next token, skipping one whitespace token.
    fn scan_ignore_whitespace(&mut self) -> Token {
        let token = self.scan();
        if token.kind == TokenKind::Whitespace {
            return self.scan();
        }
        token
    }

    /// Returns the next non-whitespace token without consuming it.
    fn peek_ignore_whitespace(&mut self) -> Token {
        let token = self.scan_ignore_whitespace();
        self.unscan();
        token
    }

    /// Enters one nesting level, failing past [`MAX_NESTING_DEPTH`].
    fn enter(&mut self) -> ParseResult<()> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            });
        }
        self.depth += 1;
        Ok(())
    }

    // ==================== Expressions ====================

    fn parse_expression(&mut self, nested: bool) -> ParseResult<Filter> {
        let start = self.peek_ignore_whitespace();
        if !matches!(
            start.kind,
            TokenKind::Word | TokenKind::Quote | TokenKind::SingleQuote | TokenKind::LeftParen
        ) {
            return Err(ParseError::invalid_start(start.describe()));
        }

        let mut stack: Vec<Filter> = Vec::new();
        let mut conjunction: Option<Combinator> = None;

        loop {
            let token = self.scan_ignore_whitespace();
            match token.kind {
                TokenKind::Eof if nested => return Err(ParseError::MissingClosingParenthesis),
                TokenKind::RightParen if !nested => {
                    return Err(ParseError::UnexpectedClosingParenthesis)
                }
                TokenKind::Eof | TokenKind::RightParen => break,
                TokenKind::Quote | TokenKind::SingleQuote => {
                    let key = self.parse_quoted(token.kind)?;
                    stack.push(self.parse_clause(key)?);
                }
                TokenKind::Word => stack.push(self.parse_clause(token.literal)?),
                TokenKind::And | TokenKind::Or => {
                    let next = if token.kind == TokenKind::And {
                        Combinator::And
                    } else {
                        Combinator::Or
                    };
                    if let Some(previous) = conjunction {
                        if previous != next && stack.len() > 1 {
                            trace!(%previous, %next, clauses = stack.len(), "collapsing clauses");
                            stack = vec![Filter::group(previous, stack)];
                        }
                    }
                    conjunction = Some(next);
                }
                TokenKind::LeftParen => {
                    self.enter()?;
                    let nested = self.parse_expression(true)?;
                    self.depth -= 1;
                    stack.push(nested);
                }
                _ => return Err(ParseError::invalid_start(token.describe())),
            }
        }

        let filter = match stack.len() {
            0 => Filter::default(),
            1 => stack.swap_remove(0),
            _ => Filter::group(conjunction.unwrap_or(Combinator::And), stack),
        };
        Ok(filter)
    }

    /// Parses the comparator and value following `key`.
    fn parse_clause(&mut self, key: String) -> ParseResult<Filter> {
        let comparator = self.parse_comparator()?;
        if !self.config.is_supported(comparator) {
            return Err(ParseError::UnsupportedComparator { comparator });
        }

        let value = if comparator.is_existence() {
            None
        } else {
            Some(self.parse_value()?)
        };

        if key.starts_with('$') {
            return Err(ParseError::ParameterKey { key });
        }

        let values = match (comparator, value) {
            (Comparator::Exists, _) => vec![Value::Bool(true)],
            (Comparator::NotExists, _) => vec![Value::Bool(false)],
            (c, Some(Value::List(values))) if c.is_multi_value() => values,
            (_, Some(value)) => vec![value],
            (_, None) => Vec::new(),
        };

        let filter = Filter::comparison(Comparison {
            key,
            comparator,
            values,
        });

        let next = self.peek_ignore_whitespace();
        if !matches!(
            next.kind,
            TokenKind::And | TokenKind::Or | TokenKind::RightParen | TokenKind::Eof
        ) {
            return Err(ParseError::InvalidKeyword {
                clause: filter.to_string(),
                found: next.describe().to_string(),
            });
        }

        Ok(filter)
    }

    fn parse_comparator(&mut self) -> ParseResult<Comparator> {
        let mut token = self.scan_ignore_whitespace();

        let negated = token.kind == TokenKind::Not;
        if negated {
            token = self.scan_ignore_whitespace();
        }

        let comparator = token
            .kind
            .comparator()
            .ok_or_else(|| ParseError::invalid_operator(token.describe()))?;

        if !negated {
            return Ok(comparator);
        }
        match comparator {
            Comparator::Contain => Ok(Comparator::NotContain),
            Comparator::In => Ok(Comparator::NotIn),
            Comparator::Exists => Ok(Comparator::NotExists),
            _ => Err(ParseError::InvalidNot {
                found: token.literal,
            }),
        }
    }

    // ==================== Values ====================

    fn parse_value(&mut self) -> ParseResult<Value> {
        let token = self.scan_ignore_whitespace();

        match token.kind {
            TokenKind::Quote | TokenKind::SingleQuote => {
                return self.parse_quoted(token.kind).map(Value::String)
            }
            TokenKind::LeftBracket => {
                self.enter()?;
                let list = self.parse_array()?;
                self.depth -= 1;
                return Ok(list);
            }
            TokenKind::True => return Ok(Value::Bool(true)),
            TokenKind::False => return Ok(Value::Bool(false)),
            TokenKind::Word => {}
            _ => return Err(ParseError::invalid_value(token.describe())),
        }

        if let Ok(i) = token.literal.parse::<i64>() {
            return Ok(Value::Int(i));
        }
        if let Ok(x) = token.literal.parse::<f64>() {
            return Ok(Value::Float(x));
        }

        if token.literal == "date" || token.literal == "now" {
            if self.peek_ignore_whitespace().kind == TokenKind::LeftParen {
                self.scan_ignore_whitespace();
                return if token.literal == "date" {
                    self.parse_date_call()
                } else {
                    self.parse_now_call()
                };
            }
        }

        self.parse_bare_word(token)
    }

    /// Reads everything up to the closing quote of the same kind.
    fn parse_quoted(&mut self, quote: TokenKind) -> ParseResult<String> {
        let mut text = String::new();
        loop {
            let token = self.scan();
            if token.kind == TokenKind::Eof {
                return Err(ParseError::MissingClosingQuote { text });
            }
            if token.kind == quote {
                return Ok(text);
            }
            text.push_str(&token.literal);
        }
    }

    /// A bare word must stand alone: neither a quote nor another word may follow.
    fn parse_bare_word(&mut self, token: Token) -> ParseResult<Value> {
        let next = self.peek_ignore_whitespace();
        match next.kind {
            TokenKind::Quote | TokenKind::SingleQuote => Err(ParseError::MissingOpeningQuote {
                value: token.literal,
            }),
            TokenKind::Word => Err(ParseError::UnprotectedValue {
                value: token.literal,
                next: next.literal,
            }),
            _ => Ok(Value::String(token.literal)),
        }
    }

    fn parse_array(&mut self) -> ParseResult<Value> {
        let mut values = Vec::new();
        loop {
            let token = self.scan_ignore_whitespace();
            match token.kind {
                TokenKind::Eof | TokenKind::LeftParen | TokenKind::RightParen => {
                    return Err(ParseError::InvalidArrayEnd {
                        found: token.describe().to_string(),
                    })
                }
                TokenKind::RightBracket => break,
                TokenKind::Comma => continue,
                _ => {
                    self.unscan();
                    values.push(self.parse_value()?);
                }
            }
        }
        Ok(Value::List(values))
    }

    /// Reads the raw text up to the `)` closing a `date(` or `now(` call.
    ///
    /// Returns `Err` with the text read so far if the call is not closed.
    fn read_call_argument(&mut self) -> Result<String, String> {
        let mut raw = String::new();
        loop {
            let token = self.scan();
            match token.kind {
                TokenKind::RightParen => return Ok(trim_argument(&raw)),
                TokenKind::LeftParen | TokenKind::Eof => return Err(trim_argument(&raw)),
                _ => raw.push_str(&token.literal),
            }
        }
    }

    fn parse_date_call(&mut self) -> ParseResult<Value> {
        let text = self
            .read_call_argument()
            .map_err(ParseError::invalid_date)?;
        parse_date(&text)
            .map(Value::Time)
            .ok_or_else(|| ParseError::invalid_date(text))
    }

    fn parse_now_call(&mut self) -> ParseResult<Value> {
        let text = self
            .read_call_argument()
            .map_err(|text| ParseError::InvalidDuration {
                text,
                reason: "missing closing parenthesis".to_string(),
            })?;
        if text.is_empty() {
            return Ok(Value::Duration(chrono::Duration::zero()));
        }
        parse_duration(&text)
            .map(Value::Duration)
            .map_err(|reason| ParseError::InvalidDuration { text, reason })
    }
}

fn trim_argument(raw: &str) -> String {
    raw.trim_matches(|c| c == ' ' || c == '"' || c == '\'')
        .to_string()
}
