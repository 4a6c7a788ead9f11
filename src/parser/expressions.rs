//! Expression parsing
//!
//! Binary operators are handled with a precedence cascade: one function per
//! precedence level, each building left-associative nodes from the results
//! of the next-tighter level. From loosest to tightest:
//!
//! ```text
//! assignment   = and the =op forms (right-associative)
//! ternary      ?:
//! logical      || , &&
//! bitwise      | , ^ , &
//! equality     == !=
//! relational   < <= > >=
//! shift        << >>
//! additive     + -
//! multiplicative * / %
//! unary prefix * & - ! ++ -- ~
//! postfix      ++ -- , calls, subscripts
//! ```
//!
//! The lexer hands every operator over as a plain `Operator` token; whether
//! a spelling is unary or binary is decided here, purely by position. Nodes
//! are final once built; precedence is resolved while shifting, never by
//! restructuring a finished subtree.

use crate::ast::{BinOp, Expr, UnaryOp};
use crate::lexer::TokenKind;
use crate::parser::parse::{ParseError, Parser};

const ASSIGNMENT_OPS: [&str; 11] = [
    "=", "=+", "=-", "=*", "=/", "=%", "=&", "=|", "=^", "=<<", "=>>",
];

impl Parser {
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_assignment()
    }

    /// Assignment binds loosest and associates to the right:
    /// `a = b = c` is `a = (b = c)`.
    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_ternary()?;

        if let Some(op) = self.accept_binary_op(&ASSIGNMENT_OPS)? {
            let right = self.parse_assignment()?;
            return Ok(Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_logical_or()?;

        if self.accept(TokenKind::Ternary)?.is_some() {
            let then = self.parse_expression()?;
            self.expect(TokenKind::Colon)?;
            let otherwise = self.parse_ternary()?;

            return Ok(Expr::Ternary {
                cond: Box::new(expr),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            });
        }

        Ok(expr)
    }

    fn parse_logical_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&["||"], Self::parse_logical_and)
    }

    fn parse_logical_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&["&&"], Self::parse_bitwise_or)
    }

    fn parse_bitwise_or(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&["|"], Self::parse_bitwise_xor)
    }

    fn parse_bitwise_xor(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&["^"], Self::parse_bitwise_and)
    }

    fn parse_bitwise_and(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&["&"], Self::parse_equality)
    }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&["==", "!="], Self::parse_relational)
    }

    fn parse_relational(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&["<", "<=", ">", ">="], Self::parse_shift)
    }

    fn parse_shift(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&["<<", ">>"], Self::parse_additive)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&["+", "-"], Self::parse_multiplicative)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        self.parse_binary_level(&["*", "/", "%"], Self::parse_unary)
    }

    /// One left-associative precedence level: fold `next (op next)*`.
    fn parse_binary_level(
        &mut self,
        ops: &[&str],
        next: fn(&mut Self) -> Result<Expr, ParseError>,
    ) -> Result<Expr, ParseError> {
        let mut left = next(self)?;

        while let Some(op) = self.accept_binary_op(ops)? {
            let right = next(self)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    /// Consume the current token if it is an operator spelled as one of
    /// `ops`, returning the resolved [`BinOp`].
    fn accept_binary_op(&mut self, ops: &[&str]) -> Result<Option<BinOp>, ParseError> {
        if self.token().kind != TokenKind::Operator
            || !ops.contains(&self.token().value.as_str())
        {
            return Ok(None);
        }

        let token = self.token().clone();
        self.advance()?;

        match BinOp::from_symbol(&token.value) {
            Some(op) => Ok(Some(op)),
            None => Err(ParseError::new(token, "invalid binary operator")),
        }
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if self.token().kind == TokenKind::Operator {
            if let Some(op) = UnaryOp::from_prefix(&self.token().value) {
                self.advance()?;
                let expr = self.parse_unary()?;
                return Ok(Expr::Unary {
                    op,
                    expr: Box::new(expr),
                    postfix: false,
                });
            }
        }

        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        loop {
            let op = match (self.token().kind, self.token().value.as_str()) {
                (TokenKind::Operator, "++") => UnaryOp::Inc,
                (TokenKind::Operator, "--") => UnaryOp::Dec,
                _ => break,
            };
            self.advance()?;

            expr = Expr::Unary {
                op,
                expr: Box::new(expr),
                postfix: true,
            };
        }

        Ok(expr)
    }

    /// Parse a primary expression and any number of trailing subscripts and
    /// calls: `(expr)`, a constant, or an identifier, then `[index]` and
    /// `(args)` chains.
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.token().clone();

        let mut expr = match token.kind {
            TokenKind::OpenParen => {
                self.advance()?;
                let inner = self.parse_expression()?;
                self.expect(TokenKind::CloseParen)?;
                Expr::Paren(Box::new(inner))
            }
            TokenKind::Number | TokenKind::Character | TokenKind::String => {
                self.parse_constant()?
            }
            TokenKind::Ident => {
                self.advance()?;
                Expr::Ident(token.value)
            }
            _ => {
                return Err(ParseError::new(token, "expected primary expression"));
            }
        };

        loop {
            if self.accept(TokenKind::OpenBracket)?.is_some() {
                let index = self.parse_expression()?;
                self.expect(TokenKind::CloseBracket)?;

                expr = Expr::ArrayAccess {
                    array: Box::new(expr),
                    index: Box::new(index),
                };
            } else if self.accept(TokenKind::OpenParen)?.is_some() {
                let mut args = Vec::new();
                if self.token().kind != TokenKind::CloseParen {
                    loop {
                        args.push(self.parse_expression()?);
                        if self.accept(TokenKind::Comma)?.is_none() {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::CloseParen)?;

                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                };
            } else {
                break;
            }
        }

        Ok(expr)
    }

    /// A constant: number, character, or string. The only expressions
    /// allowed as case labels and vector initializer values.
    pub(crate) fn parse_constant(&mut self) -> Result<Expr, ParseError> {
        let (kind, token) = self.expect_one_of(&[
            TokenKind::Number,
            TokenKind::Character,
            TokenKind::String,
        ])?;

        match kind {
            TokenKind::Number => {
                let value = token
                    .value
                    .parse::<i64>()
                    .map_err(|_| ParseError::new(token.clone(), "invalid integer literal"))?;
                Ok(Expr::Integer(value))
            }
            TokenKind::Character => Ok(Expr::Character(token.value)),
            TokenKind::String => Ok(Expr::String(token.value)),
            _ => unreachable!("expect_one_of returned an unrequested kind"),
        }
    }
}
