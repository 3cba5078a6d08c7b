//! Scanner (tokenizer) for filter expressions.

use std::fmt;

use crate::filter::Comparator;

/// The kind of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // ==================== Literals ====================
    /// A bare word: key, unquoted value, number, `date`, `now`...
    Word,
    /// A run of whitespace.
    Whitespace,
    /// A double quote `"`.
    Quote,
    /// A single quote `'`.
    SingleQuote,

    // ==================== Comparators ====================
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Lesser,
    /// `<=`
    LesserOrEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
    /// The `contains` keyword.
    Contains,
    /// The `matches` keyword.
    Matches,
    /// The `in` keyword.
    In,
    /// The `exists` keyword.
    Exists,
    /// The `not` keyword.
    Not,

    // ==================== Conjunctions ====================
    /// The `and` keyword.
    And,
    /// The `or` keyword.
    Or,

    // ==================== Booleans ====================
    /// The `true` keyword.
    True,
    /// The `false` keyword.
    False,

    // ==================== Punctuation ====================
    /// `(`
    LeftParen,
    /// `)`
    RightParen,
    /// `[`
    LeftBracket,
    /// `]`
    RightBracket,
    /// `,`
    Comma,

    // ==================== Special ====================
    /// A character that cannot start any token.
    Illegal,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Returns the comparator this token introduces on its own, if any.
    ///
    /// `not` is excluded: the parser combines it with the following keyword.
    pub fn comparator(self) -> Option<Comparator> {
        match self {
            TokenKind::Equal => Some(Comparator::Equal),
            TokenKind::NotEqual => Some(Comparator::NotEqual),
            TokenKind::Lesser => Some(Comparator::Lesser),
            TokenKind::LesserOrEqual => Some(Comparator::LesserOrEqual),
            TokenKind::Greater => Some(Comparator::Greater),
            TokenKind::GreaterOrEqual => Some(Comparator::GreaterOrEqual),
            TokenKind::Contains => Some(Comparator::Contain),
            TokenKind::Matches => Some(Comparator::Match),
            TokenKind::In => Some(Comparator::In),
            TokenKind::Exists => Some(Comparator::Exists),
            _ => None,
        }
    }

    /// Returns the keyword kind for a word, ignoring case.
    fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word.to_ascii_uppercase().as_str() {
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "TRUE" => TokenKind::True,
            "FALSE" => TokenKind::False,
            "CONTAINS" => TokenKind::Contains,
            "MATCHES" => TokenKind::Matches,
            "IN" => TokenKind::In,
            "NOT" => TokenKind::Not,
            "EXISTS" => TokenKind::Exists,
            _ => return None,
        };
        Some(kind)
    }
}

/// A token with its literal text and position in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The token kind.
    pub kind: TokenKind,
    /// The text consumed for this token, with escapes resolved.
    pub literal: String,
    /// The byte position where the token starts (0-indexed).
    pub position: usize,
}

impl Token {
    fn new(kind: TokenKind, literal: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            literal: literal.into(),
            position,
        }
    }

    /// Text used when reporting this token in an error message.
    pub fn describe(&self) -> &str {
        if self.kind == TokenKind::Eof {
            "EOF"
        } else {
            &self.literal
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Returns true if `c` can appear in a bare word.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
        || matches!(
            c,
            '-' | '_' | '@' | ':' | '$' | '#' | '.' | '/' | '\\' | '*' | '<' | '>' | '=' | '!'
        )
}

/// Returns true if an operator starts with `c` followed by `next`.
fn starts_operator(c: char, next: Option<char>) -> bool {
    match c {
        '<' | '>' => true,
        '=' | '!' => next == Some('='),
        _ => false,
    }
}

/// Scanner producing [`Token`]s from a filter expression.
///
/// The scanner works one character at a time with a single character of
/// lookahead and can push back the last character read.
pub struct Scanner {
    chars: Vec<(usize, char)>,
    /// Index of the next character in `chars`.
    index: usize,
    /// Byte length of the input.
    len: usize,
}

impl Scanner {
    /// Creates a new scanner for the given input string.
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.char_indices().collect(),
            index: 0,
            len: input.len(),
        }
    }

    /// Consumes and returns the next character.
    fn read(&mut self) -> Option<char> {
        let c = self.chars.get(self.index).map(|&(_, c)| c);
        if c.is_some() {
            self.index += 1;
        }
        c
    }

    /// Returns the character `ahead` positions after the next one, without consuming it.
    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.index + ahead).map(|&(_, c)| c)
    }

    /// Returns the next character without consuming it.
    fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    /// Pushes back the last character read.
    fn unread(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    /// Returns the byte offset of the next character.
    fn offset(&self) -> usize {
        self.chars.get(self.index).map_or(self.len, |&(pos, _)| pos)
    }

    /// Scans the next token. Returns an `Eof` token once the input is exhausted.
    pub fn scan(&mut self) -> Token {
        let start = self.offset();
        let Some(c) = self.read() else {
            return Token::new(TokenKind::Eof, "", start);
        };

        if c.is_whitespace() {
            self.unread();
            return self.scan_whitespace(start);
        }

        if let Some(kind) = self.scan_operator(c) {
            let literal: String = self.chars[self.index - operator_width(kind)..self.index]
                .iter()
                .map(|&(_, c)| c)
                .collect();
            return Token::new(kind, literal, start);
        }

        if is_word_char(c) {
            self.unread();
            return self.scan_word(start);
        }

        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ',' => TokenKind::Comma,
            '"' => TokenKind::Quote,
            '\'' => TokenKind::SingleQuote,
            _ => TokenKind::Illegal,
        };
        Token::new(kind, c.to_string(), start)
    }

    /// Scans every remaining token, excluding the final `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan();
            if token.kind == TokenKind::Eof {
                break;
            }
            tokens.push(token);
        }
        tokens
    }

    /// Consumes the rest of an operator whose first character `c` was just read.
    fn scan_operator(&mut self, c: char) -> Option<TokenKind> {
        if !starts_operator(c, self.peek()) {
            return None;
        }
        if self.peek() == Some('=') {
            self.read();
            return Some(match c {
                '=' => TokenKind::Equal,
                '!' => TokenKind::NotEqual,
                '<' => TokenKind::LesserOrEqual,
                _ => TokenKind::GreaterOrEqual,
            });
        }
        Some(if c == '<' {
            TokenKind::Lesser
        } else {
            TokenKind::Greater
        })
    }

    /// Collapses a run of whitespace into a single token.
    fn scan_whitespace(&mut self, start: usize) -> Token {
        let mut literal = String::new();
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            literal.push(c);
            self.read();
        }
        Token::new(TokenKind::Whitespace, literal, start)
    }

    /// Scans a bare word, resolving backslash escapes, then classifies keywords.
    fn scan_word(&mut self, start: usize) -> Token {
        let mut literal = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.read();
                // A trailing backslash is kept as is.
                literal.push(self.read().unwrap_or('\\'));
                continue;
            }
            if !is_word_char(c) || starts_operator(c, self.peek_at(1)) {
                break;
            }
            literal.push(c);
            self.read();
        }

        let kind = TokenKind::keyword(&literal).unwrap_or(TokenKind::Word);
        Token::new(kind, literal, start)
    }
}

fn operator_width(kind: TokenKind) -> usize {
    match kind {
        TokenKind::Lesser | TokenKind::Greater => 1,
        _ => 2,
    }
}
