//! Top-level declaration parsing
//!
//! A translation unit is a sequence of external variable definitions and
//! function definitions:
//!
//! ```text
//! top_level    ::= extern_def | function_def
//! extern_def   ::= ident "[" number "]" constant ("," constant)* ";"
//!                | ident constant? ";"
//! function_def ::= ident "(" var_list ")" statement
//! var_list     ::= (ident ("," ident)*)?
//! ```
//!
//! Both forms start with an identifier, so `parse_top_level` tries the
//! external definition first and rewinds to retry as a function exactly
//! when that attempt died after consuming only the leading identifier
//! (the `name (` shape). Failing deeper than that is a real syntax error.

use crate::ast::{Expr, Function, Global};
use crate::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

/// A parsed top-level definition, routed into the matching
/// `TranslationUnit` group by [`Parser::parse`].
pub(crate) enum TopLevel {
    Function(Function),
    Global(Global),
}

impl Parser {
    pub(crate) fn parse_top_level(&mut self) -> Result<TopLevel, ParseError> {
        let pos = self.mark();

        match self.parse_global() {
            Ok(global) => return Ok(TopLevel::Global(global)),
            Err(err) => {
                if self.mark() == pos + 1 {
                    // Only the leading identifier went by; this can still be
                    // a function definition.
                    self.rewind_to(pos);
                } else {
                    return Err(err);
                }
            }
        }

        match self.parse_function() {
            Ok(function) => return Ok(TopLevel::Function(function)),
            Err(err) => {
                if self.mark() != pos {
                    return Err(err);
                }
            }
        }

        Err(ParseError::new(
            self.token().clone(),
            "expected top level declaration",
        ))
    }

    /// Parse an external variable definition, scalar or vector. A scalar
    /// without an initializer is zero filled.
    fn parse_global(&mut self) -> Result<Global, ParseError> {
        let name = self.expect(TokenKind::Ident)?.value;

        if self.accept(TokenKind::OpenBracket)?.is_some() {
            let size_tok = self.expect(TokenKind::Number)?;
            let size = size_tok
                .value
                .parse::<i64>()
                .map_err(|_| ParseError::new(size_tok.clone(), "invalid integer literal"))?;
            self.expect(TokenKind::CloseBracket)?;

            // The declared size is not checked against the value count;
            // that is a semantic concern, not a syntactic one.
            let mut values = vec![self.parse_constant()?];
            while self.accept(TokenKind::Comma)?.is_some() {
                values.push(self.parse_constant()?);
            }

            self.expect(TokenKind::Semicolon)?;
            return Ok(Global::Vector { name, size, values });
        }

        let value = match self.parse_constant() {
            Ok(value) => value,
            Err(err) => {
                if self.accept(TokenKind::Semicolon)?.is_some() {
                    // Empty definitions are zero filled.
                    return Ok(Global::Scalar {
                        name,
                        value: Expr::Integer(0),
                    });
                }
                return Err(err);
            }
        };

        self.expect(TokenKind::Semicolon)?;
        Ok(Global::Scalar { name, value })
    }

    /// Parse a function definition. The body is a single statement, usually
    /// but not necessarily a block.
    fn parse_function(&mut self) -> Result<Function, ParseError> {
        let name = self.expect(TokenKind::Ident)?.value;

        self.expect(TokenKind::OpenParen)?;
        let params = self.parse_variable_list()?;
        self.expect(TokenKind::CloseParen)?;

        let body = self.parse_statement()?;

        Ok(Function { name, params, body })
    }

    /// Zero or more comma separated identifiers.
    pub(crate) fn parse_variable_list(&mut self) -> Result<Vec<String>, ParseError> {
        let mut vars = Vec::new();

        if let Some(id) = self.accept(TokenKind::Ident)? {
            vars.push(id.value);
            while self.accept(TokenKind::Comma)?.is_some() {
                vars.push(self.expect(TokenKind::Ident)?.value);
            }
        }

        Ok(vars)
    }
}
