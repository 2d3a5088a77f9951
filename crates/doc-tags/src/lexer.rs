//! Doc comment lexer
//!
//! Tokenizes the body of a structured documentation comment (comment
//! markers already stripped) into a stream of tokens for the parser.
//! Tokens cover the input contiguously, so the concatenation of every
//! token's span reproduces the source exactly.

use serde::{Deserialize, Serialize};
use std::iter::Peekable;
use std::str::Chars;

/// A token in a doc comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// The kind of token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Block tag marker (`@name`), only at start of input or after whitespace
    BlockTag(String),
    /// Inline tag opener (`{@name`)
    InlineTag(String),
    /// Opening brace ({) that does not start an inline tag
    OpenBrace,
    /// Closing brace (})
    CloseBrace,
    /// Plain text content
    Text(String),
    /// Whitespace (spaces and tabs, not newlines)
    Whitespace(String),
    /// Newline (\n, \r\n or \r)
    Newline,
    /// End of input
    Eof,
}

/// Source location span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    /// Starting byte offset
    pub start: usize,
    /// Ending byte offset (exclusive)
    pub end: usize,
    /// Starting line (1-indexed)
    pub line: usize,
    /// Starting column (1-indexed)
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    /// Smallest span covering both `self` and `other`
    pub fn merge(self, other: Span) -> Span {
        if other.start < self.start {
            Span::new(other.start, self.end.max(other.end), other.line, other.column)
        } else {
            Span::new(self.start, self.end.max(other.end), self.line, self.column)
        }
    }

    /// Slice the source text covered by this span
    pub fn slice(self, source: &str) -> &str {
        &source[self.start..self.end]
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Lexer for doc comments
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    /// Remaining input, used for two-character lookahead
    rest: &'a str,
    /// Current byte position
    pos: usize,
    /// Current line (1-indexed)
    line: usize,
    /// Current column (1-indexed)
    column: usize,
    /// Last consumed character
    prev: Option<char>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            rest: input,
            pos: 0,
            line: 1,
            column: 1,
            prev: None,
        }
    }

    /// Tokenize the entire input
    pub fn tokenize(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Token {
        let start_pos = self.pos;
        let start_line = self.line;
        let start_col = self.column;

        let Some(ch) = self.peek() else {
            return Token {
                kind: TokenKind::Eof,
                span: Span::new(start_pos, start_pos, start_line, start_col),
            };
        };

        let kind = match ch {
            '@' if self.at_word_start() && self.tag_name_follows(1) => {
                self.advance();
                TokenKind::BlockTag(self.consume_tag_name())
            }
            '{' if self.rest[1..].starts_with('@') && self.tag_name_follows(2) => {
                self.advance();
                self.advance();
                TokenKind::InlineTag(self.consume_tag_name())
            }
            '{' => {
                self.advance();
                TokenKind::OpenBrace
            }
            '}' => {
                self.advance();
                TokenKind::CloseBrace
            }
            '\n' => {
                self.advance();
                TokenKind::Newline
            }
            '\r' => {
                self.advance();
                // Handle \r\n as single newline
                if self.peek() == Some('\n') {
                    self.advance();
                }
                TokenKind::Newline
            }
            ' ' | '\t' => TokenKind::Whitespace(self.consume_whitespace()),
            _ => TokenKind::Text(self.consume_text()),
        };

        Token {
            kind,
            span: Span::new(start_pos, self.pos, start_line, start_col),
        }
    }

    /// Peek at the next character without consuming it
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    /// Advance to the next character
    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        let width = ch.len_utf8();
        self.pos += width;
        self.rest = &self.rest[width..];
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        self.prev = Some(ch);
        Some(ch)
    }

    /// Whether the previous character allows a block tag to start here
    fn at_word_start(&self) -> bool {
        self.prev.is_none_or(char::is_whitespace)
    }

    /// Whether an ASCII letter sits `offset` bytes ahead
    fn tag_name_follows(&self, offset: usize) -> bool {
        self.rest
            .as_bytes()
            .get(offset)
            .is_some_and(|b| b.is_ascii_alphabetic())
    }

    /// Consume a tag name (`[A-Za-z][A-Za-z0-9_]*`)
    fn consume_tag_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        name
    }

    /// Consume whitespace (spaces and tabs)
    fn consume_whitespace(&mut self) -> String {
        let mut ws = String::new();
        while let Some(ch) = self.peek() {
            if ch == ' ' || ch == '\t' {
                ws.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        ws
    }

    /// Consume text until whitespace or a brace
    ///
    /// An `@` inside a word (e.g. an email address) never starts a tag, so it
    /// is kept as part of the text run.
    fn consume_text(&mut self) -> String {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            match ch {
                '{' | '}' | '\n' | '\r' | ' ' | '\t' => break,
                _ => {
                    text.push(ch);
                    self.advance();
                }
            }
        }
        text
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}
