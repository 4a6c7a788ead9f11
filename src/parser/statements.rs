//! Statement parsing
//!
//! ```text
//! statement ::= if_stmt | block | auto_decl | extrn_decl | while_stmt
//!             | switch_stmt | ";" | break_stmt | return_stmt | goto_stmt
//!             | label | expr ";"
//! ```
//!
//! `parse_statement` tries the bracketed and keyword-led forms in order.
//! Each attempt either returns a node or fails without having consumed a
//! token, which reads as "not this production, try the next one"; a failure
//! that did consume tokens is a real syntax error and is returned as-is.
//! The only genuinely ambiguous prefix is a leading identifier, which can
//! open a label (`name:`), a bare expression statement (`name;`), or an
//! arbitrary expression; the identifier is taken back via a one-token
//! rewind in the last case.

use crate::ast::{AutoDecl, Case, Expr, Stmt};
use crate::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

impl Parser {
    pub(crate) fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let pos = self.mark();

        match self.parse_if() {
            Ok(stmt) => return Ok(stmt),
            Err(err) if self.mark() != pos => return Err(err),
            Err(_) => {}
        }

        match self.parse_block() {
            Ok(stmt) => return Ok(stmt),
            Err(err) if self.mark() != pos => return Err(err),
            Err(_) => {}
        }

        match self.parse_auto_decl() {
            Ok(stmt) => return Ok(stmt),
            Err(err) if self.mark() != pos => return Err(err),
            Err(_) => {}
        }

        match self.parse_extern_decl() {
            Ok(stmt) => return Ok(stmt),
            Err(err) if self.mark() != pos => return Err(err),
            Err(_) => {}
        }

        match self.parse_while() {
            Ok(stmt) => return Ok(stmt),
            Err(err) if self.mark() != pos => return Err(err),
            Err(_) => {}
        }

        match self.parse_switch() {
            Ok(stmt) => return Ok(stmt),
            Err(err) if self.mark() != pos => return Err(err),
            Err(_) => {}
        }

        if self.accept(TokenKind::Semicolon)?.is_some() {
            return Ok(Stmt::Null);
        }

        if self.accept_keyword("break")?.is_some() {
            self.expect(TokenKind::Semicolon)?;
            return Ok(Stmt::Break);
        }

        if self.accept_keyword("return")?.is_some() {
            if self.accept(TokenKind::Semicolon)?.is_some() {
                return Ok(Stmt::Return(None));
            }
            let value = self.parse_expression()?;
            self.expect(TokenKind::Semicolon)?;
            return Ok(Stmt::Return(Some(value)));
        }

        if self.accept_keyword("goto")?.is_some() {
            let label = self.expect(TokenKind::Ident)?.value;
            self.expect(TokenKind::Semicolon)?;
            return Ok(Stmt::Goto(label));
        }

        if let Some(ident) = self.accept(TokenKind::Ident)? {
            if self.accept(TokenKind::Colon)?.is_some() {
                return Ok(Stmt::Label(ident.value));
            }
            if self.accept(TokenKind::Semicolon)?.is_some() {
                return Ok(Stmt::Expr(Expr::Ident(ident.value)));
            }

            // Neither a label nor a bare identifier statement; give the
            // identifier back and take the expression path.
            self.rewind_to(pos);
        }

        match self.parse_expression() {
            Ok(expr) => {
                self.expect(TokenKind::Semicolon)?;
                return Ok(Stmt::Expr(expr));
            }
            Err(err) => {
                if self.mark() != pos {
                    return Err(err);
                }
            }
        }

        Err(ParseError::new(
            self.token_at(pos).clone(),
            "expected statement",
        ))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword("if")?;

        self.expect(TokenKind::OpenParen)?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::CloseParen)?;

        let body = Box::new(self.parse_statement()?);

        let else_body = if self.accept_keyword("else")?.is_some() {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            cond,
            body,
            else_body,
        })
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword("while")?;

        self.expect(TokenKind::OpenParen)?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::CloseParen)?;

        let body = Box::new(self.parse_statement()?);

        Ok(Stmt::While { cond, body })
    }

    pub(crate) fn parse_block(&mut self) -> Result<Stmt, ParseError> {
        self.expect(TokenKind::OpenBrace)?;

        let mut nodes = Vec::new();
        while self.accept(TokenKind::CloseBrace)?.is_none() {
            nodes.push(self.parse_statement()?);
        }

        Ok(Stmt::Block(nodes))
    }

    /// Parse an `auto` declaration: `auto name, vec[10], ...;`
    fn parse_auto_decl(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword("auto")?;

        let mut vars = Vec::new();
        loop {
            let name = self.expect(TokenKind::Ident)?.value;

            if self.accept(TokenKind::OpenBracket)?.is_some() {
                let num = self.expect(TokenKind::Number)?;
                let size = num
                    .value
                    .parse::<i64>()
                    .map_err(|_| ParseError::new(num.clone(), "invalid integer literal"))?;
                self.expect(TokenKind::CloseBracket)?;

                vars.push(AutoDecl {
                    name,
                    vector: true,
                    size,
                });
            } else {
                vars.push(AutoDecl {
                    name,
                    vector: false,
                    size: 0,
                });
            }

            if self.accept(TokenKind::Comma)?.is_none() {
                break;
            }
        }

        self.expect(TokenKind::Semicolon)?;
        Ok(Stmt::VarDecl(vars))
    }

    /// Parse an `extrn` declaration: `extrn a, b, c;` with at least one name.
    fn parse_extern_decl(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword("extrn")?;

        let names = self.parse_variable_list()?;
        self.expect(TokenKind::Semicolon)?;

        if names.is_empty() {
            return Err(ParseError::new(
                self.token().clone(),
                "expected at least 1 variable in extrn declaration",
            ));
        }

        Ok(Stmt::ExternDecl(names))
    }

    fn parse_switch(&mut self) -> Result<Stmt, ParseError> {
        self.expect_keyword("switch")?;

        self.expect(TokenKind::OpenParen)?;
        let cond = self.parse_expression()?;
        self.expect(TokenKind::CloseParen)?;

        self.expect(TokenKind::OpenBrace)?;

        let mut cases = Vec::new();
        let mut default = None;

        loop {
            if self.accept(TokenKind::CloseBrace)?.is_some() {
                break;
            }

            if self.accept_keyword("case")?.is_some() {
                let value = self.parse_constant()?;
                self.expect(TokenKind::Colon)?;

                cases.push(Case {
                    value,
                    body: self.parse_case_body()?,
                });
            } else if let Some(tok) = self.accept_keyword("default")? {
                self.expect(TokenKind::Colon)?;

                if default.is_some() {
                    return Err(ParseError::new(tok, "Multiple 'default' cases"));
                }
                default = Some(self.parse_case_body()?);
            } else {
                return Err(ParseError::new(
                    self.token().clone(),
                    "expected 'case' or 'default'",
                ));
            }
        }

        Ok(Stmt::Switch {
            cond,
            cases,
            default,
        })
    }

    /// Statements under a case label run until the next `case`, `default`,
    /// or the closing brace of the switch.
    fn parse_case_body(&mut self) -> Result<Vec<Stmt>, ParseError> {
        let mut body = Vec::new();

        loop {
            let tok = self.token();
            let at_boundary = tok.kind == TokenKind::CloseBrace
                || (tok.kind == TokenKind::Keyword
                    && (tok.value == "case" || tok.value == "default"));
            if at_boundary {
                break;
            }

            body.push(self.parse_statement()?);
        }

        Ok(body)
    }
}
