use std::cell::RefCell;

use crate::lexer::TokenKind;
use crate::span::Span;

use super::ast::{
    Expression, FieldDecl, Literal, RecordType, TypeExpr, VariantCase, VariantPart,
};
use super::{ParseError, Parser};

impl<'a> Parser<'a> {
    /// Parses a type as written in source, dispatching on its leading
    /// token the way §4.2 describes ("recognized by textual shape").
    pub(super) fn parse_type_expr(&mut self) -> Result<TypeExpr, ParseError> {
        match self.current.kind {
            TokenKind::Packed => {
                self.advance();
                self.parse_type_expr()
            }
            TokenKind::LParen => self.parse_enum_type(),
            TokenKind::Set => self.parse_set_type(),
            TokenKind::StringType => self.parse_bounded_string_type(),
            TokenKind::Array => self.parse_array_type(),
            TokenKind::File => self.parse_file_type(),
            TokenKind::Text => {
                self.advance();
                Ok(TypeExpr::FileOf(None))
            }
            TokenKind::Caret => {
                self.advance();
                let pointee = self.parse_type_expr()?;
                Ok(TypeExpr::Pointer(Box::new(pointee)))
            }
            TokenKind::Integer | TokenKind::Real | TokenKind::Boolean | TokenKind::Char => {
                let tok = self.advance();
                Ok(TypeExpr::named(tok.text.to_ascii_lowercase()))
            }
            _ => self.parse_named_or_range_type(),
        }
    }

    fn parse_enum_type(&mut self) -> Result<TypeExpr, ParseError> {
        self.advance(); // '('
        let mut names = Vec::new();
        loop {
            let name = self.expect(TokenKind::Identifier, "an enumeration member")?;
            names.push(name.text);
            if self.matches(TokenKind::Comma) {
                continue;
            }
            break;
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(TypeExpr::Enum(names))
    }

    fn parse_set_type(&mut self) -> Result<TypeExpr, ParseError> {
        self.advance(); // 'set'
        self.expect(TokenKind::Of, "'of'")?;
        let element = self.parse_type_expr()?;
        Ok(TypeExpr::SetOf(Box::new(element)))
    }

    fn parse_bounded_string_type(&mut self) -> Result<TypeExpr, ParseError> {
        self.advance(); // 'string'
        if self.matches(TokenKind::LBracket) {
            let size_tok = self.expect(TokenKind::IntegerLiteral, "a string size")?;
            self.expect(TokenKind::RBracket, "']'")?;
            let size: u32 = size_tok.text.parse().unwrap_or(255);
            Ok(TypeExpr::BoundedString(Some(size)))
        } else {
            Ok(TypeExpr::BoundedString(None))
        }
    }

    fn parse_array_type(&mut self) -> Result<TypeExpr, ParseError> {
        self.advance(); // 'array'
        self.expect(TokenKind::LBracket, "'['")?;
        let mut dims = vec![self.parse_type_expr()?];
        while self.matches(TokenKind::Comma) {
            dims.push(self.parse_type_expr()?);
        }
        self.expect(TokenKind::RBracket, "']'")?;
        self.expect(TokenKind::Of, "'of'")?;
        let element = self.parse_type_expr()?;
        Ok(TypeExpr::Array {
            dims,
            element: Box::new(element),
            lower_bounds: RefCell::new(None),
        })
    }

    fn parse_file_type(&mut self) -> Result<TypeExpr, ParseError> {
        self.advance(); // 'file'
        if self.matches(TokenKind::Of) {
            let element = self.parse_type_expr()?;
            Ok(TypeExpr::FileOf(Some(Box::new(element))))
        } else {
            Ok(TypeExpr::FileOf(None))
        }
    }

    /// A bare name (`integer`, `Color`, ...) or a range `L..U` whose bounds
    /// are literals, constants or enum member names.
    fn parse_named_or_range_type(&mut self) -> Result<TypeExpr, ParseError> {
        let lhs = self.parse_range_bound()?;
        if self.matches(TokenKind::DotDot) {
            let rhs = self.parse_range_bound()?;
            return Ok(TypeExpr::Range(Box::new(lhs), Box::new(rhs)));
        }

        match lhs {
            Expression::Identifier(id) => Ok(TypeExpr::named(id.name)),
            _ => Err(ParseError::new(
                "a type name or range bound",
                self.current.clone(),
            )),
        }
    }

    /// A single range endpoint: an (optionally negated) integer/char
    /// literal, or an identifier (constant or enum member).
    fn parse_range_bound(&mut self) -> Result<Expression, ParseError> {
        let start = Span::point(self.current.location);
        let negate = self.matches(TokenKind::Minus);
        let expr = match self.current.kind {
            TokenKind::IntegerLiteral => {
                let tok = self.advance();
                let value: i64 = tok.text.parse().unwrap_or(0);
                Expression::Literal(Literal::Integer(if negate { -value } else { value }), start)
            }
            TokenKind::CharLiteral => {
                let tok = self.advance();
                let c = tok.text.chars().next().unwrap_or('\0');
                Expression::Literal(Literal::Char(c), start)
            }
            TokenKind::Identifier => {
                let tok = self.advance();
                Expression::Identifier(super::ast::Identifier::new(tok.text, start))
            }
            _ => {
                return Err(ParseError::new(
                    "a range bound (literal or identifier)",
                    self.current.clone(),
                ))
            }
        };
        Ok(expr)
    }

    /// Record body: fixed fields, then an optional variant part. The
    /// variant part follows, never interleaves with, the fixed fields.
    pub(super) fn parse_record_type(&mut self) -> Result<RecordType, ParseError> {
        let start = Span::point(self.current.location);
        self.expect(TokenKind::Record, "'record'")?;

        let mut fields = Vec::new();
        while self.check(TokenKind::Identifier) {
            fields.extend(self.parse_field_group()?);
            if !self.matches(TokenKind::Semicolon) {
                break;
            }
        }

        let variant = if self.check(TokenKind::Case) {
            Some(self.parse_variant_part()?)
        } else {
            None
        };

        self.expect(TokenKind::End, "'end'")?;
        let span = self.span_from(start);
        Ok(RecordType {
            fields,
            variant,
            span,
        })
    }

    fn parse_field_group(&mut self) -> Result<Vec<FieldDecl>, ParseError> {
        let start = Span::point(self.current.location);
        let mut names = vec![self.expect(TokenKind::Identifier, "a field name")?.text];
        while self.matches(TokenKind::Comma) {
            names.push(self.expect(TokenKind::Identifier, "a field name")?.text);
        }
        self.expect(TokenKind::Colon, "':'")?;
        let type_name = self.parse_type_expr()?;
        let span = self.span_from(start);
        Ok(names
            .into_iter()
            .map(|name| FieldDecl {
                name,
                type_name: type_name.clone(),
                span,
            })
            .collect())
    }

    fn parse_variant_part(&mut self) -> Result<VariantPart, ParseError> {
        let start = Span::point(self.current.location);
        self.expect(TokenKind::Case, "'case'")?;

        let first = self.expect(TokenKind::Identifier, "a variant selector")?;
        let (selector_name, selector_type) = if self.matches(TokenKind::Colon) {
            (Some(first.text), self.parse_type_expr()?)
        } else {
            // bare `case T of` with no selector name — `first` was the type.
            (None, TypeExpr::named(first.text))
        };
        self.expect(TokenKind::Of, "'of'")?;

        let mut cases = Vec::new();
        while !self.check(TokenKind::End) && !self.at_end() {
            let mut values = vec![self.parse_expression()?];
            while self.matches(TokenKind::Comma) {
                values.push(self.parse_expression()?);
            }
            self.expect(TokenKind::Colon, "':'")?;
            self.expect(TokenKind::LParen, "'('")?;
            let mut fields = Vec::new();
            while self.check(TokenKind::Identifier) {
                fields.extend(self.parse_field_group()?);
                if !self.matches(TokenKind::Semicolon) {
                    break;
                }
            }
            self.expect(TokenKind::RParen, "')'")?;
            cases.push(VariantCase { values, fields });
            if !self.matches(TokenKind::Semicolon) {
                break;
            }
        }

        let span = self.span_from(start);
        Ok(VariantPart {
            selector_name,
            selector_type,
            cases,
            span,
        })
    }
}
