//! Parser state and match primitives
//!
//! This module provides the [`Parser`] struct and the core infrastructure
//! the grammar productions are built from: the rewindable token buffer, the
//! `accept`/`expect` primitives, and the [`Parser::parse`] entry point that
//! collects top-level definitions into a
//! [`TranslationUnit`](crate::ast::TranslationUnit).
//!
//! `accept` consumes the current token and returns it when it matches, and
//! returns `None` without consuming anything otherwise. `expect` is the
//! erroring variant. Everything the grammar modules do is phrased in terms
//! of these two, which is what makes the did-not-match / consumed-then-failed
//! distinction in `parse_statement` and `parse_top_level` reliable.

use crate::ast::TranslationUnit;
use crate::lexer::{LexError, Lexer, Position, Token, TokenKind};
use crate::parser::declarations::TopLevel;
use std::fmt;

/// Parser error type.
///
/// Carries the offending token; for a lexer error surfaced mid-parse this
/// is the lexer's `Error` token.
#[derive(Debug)]
pub struct ParseError {
    pub token: Token,
    pub message: String,
}

impl ParseError {
    pub(crate) fn new(token: Token, message: impl Into<String>) -> Self {
        ParseError {
            token,
            message: message.into(),
        }
    }

    /// Where the error occurred.
    pub fn position(&self) -> &Position {
        &self.token.start
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error on line {}, at token: {}: {}",
            self.token.start.line, self.token, self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            token: err.token,
            message: err.message,
        }
    }
}

/// Recursive descent parser for B.
///
/// Owns its lexer; tokens are pulled lazily into the buffer as the index
/// reaches its end. Rewinds move the index only and never drop tokens.
pub struct Parser {
    lex: Lexer,
    tokens: Vec<Token>,
    idx: usize,
}

impl Parser {
    /// Create a parser over `source`, tagging positions with `name`.
    pub fn new(name: &str, source: &str) -> Result<Self, ParseError> {
        let mut lex = Lexer::new(name, source);
        let first = lex.next_token()?;
        Ok(Self {
            lex,
            tokens: vec![first],
            idx: 0,
        })
    }

    /// Parse a whole translation unit. The first error ends the parse.
    pub fn parse(&mut self) -> Result<TranslationUnit, ParseError> {
        let mut unit = TranslationUnit {
            file: self.lex.name().to_string(),
            functions: Vec::new(),
            globals: Vec::new(),
        };

        loop {
            if self.accept(TokenKind::Eof)?.is_some() {
                break;
            }

            match self.parse_top_level()? {
                TopLevel::Function(function) => unit.functions.push(function),
                TopLevel::Global(global) => unit.globals.push(global),
            }
        }

        Ok(unit)
    }

    // ===== Token buffer =====

    pub(crate) fn token(&self) -> &Token {
        &self.tokens[self.idx]
    }

    pub(crate) fn token_at(&self, idx: usize) -> &Token {
        &self.tokens[idx]
    }

    /// The current buffer index, for a later [`Parser::rewind_to`].
    pub(crate) fn mark(&self) -> usize {
        self.idx
    }

    pub(crate) fn rewind_to(&mut self, pos: usize) {
        self.idx = pos;
    }

    /// Step to the next token, pulling from the lexer when the index runs
    /// off the end of the buffer. A lexer failure pushes its `Error` token
    /// into the buffer (so the index still moves past the consumed token)
    /// and surfaces as a `ParseError`.
    pub(crate) fn advance(&mut self) -> Result<(), ParseError> {
        if self.idx + 1 == self.tokens.len() {
            match self.lex.next_token() {
                Ok(token) => self.tokens.push(token),
                Err(err) => {
                    self.tokens.push(err.token.clone());
                    self.idx += 1;
                    return Err(err.into());
                }
            }
        }
        self.idx += 1;
        Ok(())
    }

    // ===== Match primitives =====

    /// Consume and return the current token if it has the given kind.
    pub(crate) fn accept(&mut self, kind: TokenKind) -> Result<Option<Token>, ParseError> {
        self.accept_value(kind, None)
    }

    /// Consume and return the current token if it has the given kind and,
    /// when `value` is supplied, that exact lexeme. Does not consume on a
    /// mismatch.
    pub(crate) fn accept_value(
        &mut self,
        kind: TokenKind,
        value: Option<&str>,
    ) -> Result<Option<Token>, ParseError> {
        let matched = self.token().kind == kind
            && value.map_or(true, |value| value == self.token().value);

        if matched {
            let token = self.token().clone();
            self.advance()?;
            Ok(Some(token))
        } else {
            Ok(None)
        }
    }

    /// Like [`Parser::accept`], but a mismatch is a syntax error. The
    /// offending token is not consumed.
    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        self.expect_value(kind, None)
    }

    pub(crate) fn expect_value(
        &mut self,
        kind: TokenKind,
        value: Option<&str>,
    ) -> Result<Token, ParseError> {
        match self.accept_value(kind, value)? {
            Some(token) => Ok(token),
            None => {
                let message = match value {
                    None => format!("Expected {}", kind),
                    Some(value) => format!("Expected ({}: {})", kind, value),
                };
                Err(ParseError::new(self.token().clone(), message))
            }
        }
    }

    pub(crate) fn accept_keyword(&mut self, word: &str) -> Result<Option<Token>, ParseError> {
        self.accept_value(TokenKind::Keyword, Some(word))
    }

    pub(crate) fn expect_keyword(&mut self, word: &str) -> Result<Token, ParseError> {
        self.expect_value(TokenKind::Keyword, Some(word))
    }

    /// Consume the current token if its kind is any of `kinds`, returning
    /// the matched kind alongside the token.
    pub(crate) fn expect_one_of(
        &mut self,
        kinds: &[TokenKind],
    ) -> Result<(TokenKind, Token), ParseError> {
        for &kind in kinds {
            if self.token().kind == kind {
                let token = self.token().clone();
                self.advance()?;
                return Ok((kind, token));
            }
        }

        let names: Vec<String> = kinds.iter().map(TokenKind::to_string).collect();
        Err(ParseError::new(
            self.token().clone(),
            format!("Expected one of: {}", names.join(", ")),
        ))
    }
}
