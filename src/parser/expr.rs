use crate::lexer::TokenKind;
use crate::span::Span;

use super::ast::{
    BinOp, Expression, FormattedExpr, Identifier, IndexExpr, Literal, RangeExpr, SetElement,
    SetLiteralExpr, UnOp,
};
use super::{ParseError, Parser};

impl<'a> Parser<'a> {
    /// Entry point; precedence level 1 (`or`), the loosest binding level.
    pub(super) fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_and()?;
        while self.check(TokenKind::Or) {
            self.advance();
            let rhs = self.parse_and()?;
            lhs = bin(BinOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_comparison()?;
        while self.check(TokenKind::And) {
            self.advance();
            let rhs = self.parse_comparison()?;
            lhs = bin(BinOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    /// `= <> < <= > >= in`, level 3.
    fn parse_comparison(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_additive()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Equal => BinOp::Eq,
                TokenKind::NotEqual => BinOp::NotEq,
                TokenKind::Less => BinOp::Lt,
                TokenKind::LessEqual => BinOp::LtEq,
                TokenKind::Greater => BinOp::Gt,
                TokenKind::GreaterEqual => BinOp::GtEq,
                TokenKind::In => BinOp::In,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_additive()?;
            lhs = bin(op, lhs, rhs);
        }
        Ok(lhs)
    }

    /// `+ - ` (also set union/difference), level 4.
    fn parse_additive(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_multiplicative()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Plus => BinOp::Add,
                TokenKind::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_multiplicative()?;
            lhs = bin(op, lhs, rhs);
        }
        Ok(lhs)
    }

    /// `* / div mod` (also set intersection), level 5.
    fn parse_multiplicative(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_unary()?;
        loop {
            let op = match self.current.kind {
                TokenKind::Star => BinOp::Mul,
                TokenKind::Slash => BinOp::Div,
                TokenKind::Div => BinOp::IntDiv,
                TokenKind::Mod => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = bin(op, lhs, rhs);
        }
        Ok(lhs)
    }

    /// `not`, unary `+`/`-`, `@` (address-of), level 6.
    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        let start = Span::point(self.current.location);
        match self.current.kind {
            TokenKind::Not => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(un(UnOp::Not, operand, start))
            }
            TokenKind::Plus => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(un(UnOp::Plus, operand, start))
            }
            TokenKind::Minus => {
                self.advance();
                let operand = self.parse_unary()?;
                Ok(un(UnOp::Neg, operand, start))
            }
            TokenKind::At => {
                self.advance();
                let operand = self.parse_unary()?;
                let span = start.merge(&operand.span());
                Ok(Expression::AddressOf(Box::new(operand), span))
            }
            _ => self.parse_postfix(),
        }
    }

    /// Call `(args)`, field `.name`, index `[e, ...]`, postfix `^` — all
    /// bind tighter than any binary operator and compose left-to-right.
    fn parse_postfix(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.current.kind {
                TokenKind::LParen => {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check(TokenKind::RParen) {
                        loop {
                            args.push(self.parse_expression()?);
                            if self.matches(TokenKind::Comma) {
                                continue;
                            }
                            break;
                        }
                    }
                    let end = self.expect(TokenKind::RParen, "')'")?;
                    let span = expr.span().merge(&Span::point(end.location));
                    expr = Expression::Call(super::ast::CallExpr {
                        callee: Box::new(expr),
                        args,
                        span,
                    });
                }
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect(TokenKind::Identifier, "a field name")?;
                    let span = expr.span().merge(&Span::point(name.location));
                    expr = Expression::Field(super::ast::FieldExpr {
                        base: Box::new(expr),
                        field: name.text,
                        span,
                    });
                }
                TokenKind::LBracket => {
                    self.advance();
                    let mut indices = vec![self.parse_expression()?];
                    while self.matches(TokenKind::Comma) {
                        indices.push(self.parse_expression()?);
                    }
                    let end = self.expect(TokenKind::RBracket, "']'")?;
                    let span = expr.span().merge(&Span::point(end.location));
                    expr = Expression::Index(IndexExpr {
                        base: Box::new(expr),
                        indices,
                        span,
                    });
                }
                TokenKind::Caret => {
                    let tok = self.advance();
                    let span = expr.span().merge(&Span::point(tok.location));
                    expr = Expression::Dereference(Box::new(expr), span);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        let start = Span::point(self.current.location);
        let expr = match self.current.kind {
            TokenKind::IntegerLiteral => {
                let tok = self.advance();
                let value: i64 = tok.text.parse().map_err(|_| {
                    ParseError::new("a valid integer literal", tok.clone())
                })?;
                Expression::Literal(Literal::Integer(value), start)
            }
            TokenKind::RealLiteral => {
                let tok = self.advance();
                let value: f64 = tok
                    .text
                    .parse()
                    .map_err(|_| ParseError::new("a valid real literal", tok.clone()))?;
                Expression::Literal(Literal::Real(value), start)
            }
            TokenKind::StringLiteral => {
                let tok = self.advance();
                Expression::Literal(Literal::Str(tok.text), start)
            }
            TokenKind::CharLiteral => {
                let tok = self.advance();
                Expression::Literal(Literal::Char(parse_char_literal(&tok.text)), start)
            }
            TokenKind::True => {
                self.advance();
                Expression::Literal(Literal::Bool(true), start)
            }
            TokenKind::False => {
                self.advance();
                Expression::Literal(Literal::Bool(false), start)
            }
            TokenKind::Nil => {
                self.advance();
                Expression::Literal(Literal::Nil, start)
            }
            TokenKind::Identifier => {
                let tok = self.advance();
                Expression::Identifier(Identifier::new(tok.text, start))
            }
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen, "')'")?;
                inner
            }
            TokenKind::LBracket => self.parse_set_literal()?,
            other => {
                let tok = self.current.clone();
                self.errors.push(ParseError::new("an expression", tok.clone()));
                self.advance();
                return Err(ParseError::new(
                    format!("an expression, got {other:?}"),
                    tok,
                ));
            }
        };
        self.maybe_parse_range(expr, start)
            .and_then(|e| self.maybe_parse_formatted(e))
    }

    /// `a..b` as a standalone expression (used outside sets, e.g. case
    /// branch values and for-loop bounds never use this directly, but
    /// type range bounds and case ranges do).
    fn maybe_parse_range(&mut self, lhs: Expression, start: Span) -> Result<Expression, ParseError> {
        if self.check(TokenKind::DotDot) {
            self.advance();
            let end = self.parse_additive()?;
            let span = start.merge(&end.span());
            Ok(Expression::Range(RangeExpr {
                start: Box::new(lhs),
                end: Box::new(end),
                span,
            }))
        } else {
            Ok(lhs)
        }
    }

    /// `expr:width:precision`, only meaningful directly inside a
    /// `write`/`writeln` argument list, but parsed generically here since
    /// the grammar is unambiguous (`:` never otherwise follows an
    /// expression in this position).
    fn maybe_parse_formatted(&mut self, expr: Expression) -> Result<Expression, ParseError> {
        if !self.check(TokenKind::Colon) {
            return Ok(expr);
        }
        self.advance();
        let width = self.parse_additive()?;
        let precision = if self.matches(TokenKind::Colon) {
            Some(Box::new(self.parse_additive()?))
        } else {
            None
        };
        let span = expr.span().merge(&width.span());
        Ok(Expression::Formatted(FormattedExpr {
            expr: Box::new(expr),
            width: Some(Box::new(width)),
            precision,
            span,
        }))
    }

    fn parse_set_literal(&mut self) -> Result<Expression, ParseError> {
        let start = Span::point(self.current.location);
        self.advance(); // '['
        let mut elements = Vec::new();
        if !self.check(TokenKind::RBracket) {
            loop {
                let first = self.parse_additive()?;
                let element = if self.matches(TokenKind::DotDot) {
                    let end = self.parse_additive()?;
                    SetElement::Range(first, end)
                } else {
                    SetElement::Single(first)
                };
                elements.push(element);
                if self.matches(TokenKind::Comma) {
                    continue;
                }
                break;
            }
        }
        let end = self.expect(TokenKind::RBracket, "']'")?;
        let span = start.merge(&Span::point(end.location));
        Ok(Expression::SetLiteral(SetLiteralExpr { elements, span }))
    }
}

fn bin(op: BinOp, lhs: Expression, rhs: Expression) -> Expression {
    let span = lhs.span().merge(&rhs.span());
    Expression::Binary(super::ast::BinaryExpr {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
        span,
    })
}

fn un(op: UnOp, operand: Expression, start: Span) -> Expression {
    let span = start.merge(&operand.span());
    Expression::Unary(super::ast::UnaryExpr {
        op,
        operand: Box::new(operand),
        span,
    })
}

fn parse_char_literal(text: &str) -> char {
    if let Some(ord) = text.strip_prefix('#') {
        let value: u32 = ord.parse().unwrap_or(0);
        char::from_u32(value).unwrap_or('\0')
    } else {
        text.chars().next().unwrap_or('\0')
    }
}
