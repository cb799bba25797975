use crate::lexer::TokenKind;
use crate::span::Span;

use super::ast::{
    Assignment, CaseBranch, CaseStatement, CompoundStatement, ForDirection, ForStatement,
    GotoStatement, IfStatement, LabelStatement, RepeatStatement, Statement, WhileStatement,
    WithStatement,
};
use super::{ParseError, Parser};

impl<'a> Parser<'a> {
    pub(super) fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let start = Span::point(self.current.location);
        match self.current.kind {
            TokenKind::Begin => self.parse_compound().map(Statement::Compound),
            TokenKind::If => self.parse_if(),
            TokenKind::While => self.parse_while(),
            TokenKind::For => self.parse_for(),
            TokenKind::Repeat => self.parse_repeat(),
            TokenKind::Case => self.parse_case(),
            TokenKind::With => self.parse_with(),
            TokenKind::Goto => {
                self.advance();
                let label = self.expect(TokenKind::Identifier, "a label")?;
                let span = self.span_from(start);
                Ok(Statement::Goto(GotoStatement {
                    label: label.text,
                    span,
                }))
            }
            TokenKind::Identifier if self.looks_like_label_prefix() => self.parse_labelled(),
            _ => self.parse_simple_statement(),
        }
    }

    /// An `Identifier:` label prefixing a statement. Checked by peeking
    /// one token past `current` (without consuming it) so a plain
    /// assignment's `:=` isn't mistaken for a label colon.
    fn looks_like_label_prefix(&mut self) -> bool {
        self.lexer.peek_token().kind == TokenKind::Colon
    }

    fn parse_labelled(&mut self) -> Result<Statement, ParseError> {
        let start = Span::point(self.current.location);
        let label = self.advance();
        self.expect(TokenKind::Colon, "':'")?;
        let statement = Box::new(self.parse_statement()?);
        let span = self.span_from(start);
        Ok(Statement::Label(LabelStatement {
            label: label.text,
            statement,
            span,
        }))
    }

    /// Expression-as-statement or assignment: both start with an
    /// expression, disambiguated by whether `:=` follows.
    fn parse_simple_statement(&mut self) -> Result<Statement, ParseError> {
        let start = Span::point(self.current.location);
        let expr = self.parse_expression()?;
        if self.matches(TokenKind::Assign) {
            let value = self.parse_expression()?;
            let span = self.span_from(start);
            return Ok(Statement::Assignment(Assignment {
                target: expr,
                value,
                span,
            }));
        }

        // `break`/`continue` aren't in the fixed keyword set (§4.1); they
        // are recognized contextually as bare identifiers in statement
        // position so the names stay available elsewhere (e.g. as a
        // built-in procedure name would be).
        if let crate::parser::ast::Expression::Identifier(id) = &expr {
            match id.name.to_ascii_lowercase().as_str() {
                "break" => return Ok(Statement::Break(expr.span())),
                "continue" => return Ok(Statement::Continue(expr.span())),
                _ => {}
            }
        }

        Ok(Statement::Expression(expr))
    }

    /// `begin stmts end`, with an optional trailing semicolon before `end`.
    pub(super) fn parse_compound(&mut self) -> Result<CompoundStatement, ParseError> {
        let start = Span::point(self.current.location);
        self.expect(TokenKind::Begin, "'begin'")?;
        let mut statements = Vec::new();
        while !self.check(TokenKind::End) && !self.at_end() {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(_) => {
                    self.synchronize();
                    continue;
                }
            }
            if !self.matches(TokenKind::Semicolon) {
                break;
            }
        }
        self.expect(TokenKind::End, "'end'")?;
        let span = self.span_from(start);
        Ok(CompoundStatement { statements, span })
    }

    fn parse_if(&mut self) -> Result<Statement, ParseError> {
        let start = Span::point(self.current.location);
        self.advance(); // 'if'
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Then, "'then'")?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.matches(TokenKind::Else) {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        let span = self.span_from(start);
        Ok(Statement::If(IfStatement {
            condition,
            then_branch,
            else_branch,
            span,
        }))
    }

    fn parse_while(&mut self) -> Result<Statement, ParseError> {
        let start = Span::point(self.current.location);
        self.advance(); // 'while'
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Do, "'do'")?;
        let body = Box::new(self.parse_statement()?);
        let span = self.span_from(start);
        Ok(Statement::While(WhileStatement {
            condition,
            body,
            span,
        }))
    }

    fn parse_for(&mut self) -> Result<Statement, ParseError> {
        let start = Span::point(self.current.location);
        self.advance(); // 'for'
        let variable = self.expect(TokenKind::Identifier, "a loop variable")?;
        self.expect(TokenKind::Assign, "':='")?;
        let from = self.parse_expression()?;
        let direction = if self.matches(TokenKind::Downto) {
            ForDirection::Downto
        } else {
            self.expect(TokenKind::To, "'to' or 'downto'")?;
            ForDirection::To
        };
        let to = self.parse_expression()?;
        self.expect(TokenKind::Do, "'do'")?;
        let body = Box::new(self.parse_statement()?);
        let span = self.span_from(start);
        Ok(Statement::For(ForStatement {
            variable: variable.text,
            start: from,
            direction,
            end: to,
            body,
            span,
        }))
    }

    fn parse_repeat(&mut self) -> Result<Statement, ParseError> {
        let start = Span::point(self.current.location);
        self.advance(); // 'repeat'
        let mut body = Vec::new();
        while !self.check(TokenKind::Until) && !self.at_end() {
            match self.parse_statement() {
                Ok(stmt) => body.push(stmt),
                Err(_) => {
                    self.synchronize();
                    continue;
                }
            }
            if !self.matches(TokenKind::Semicolon) {
                break;
            }
        }
        self.expect(TokenKind::Until, "'until'")?;
        let condition = self.parse_expression()?;
        let span = self.span_from(start);
        Ok(Statement::Repeat(RepeatStatement {
            body,
            condition,
            span,
        }))
    }

    fn parse_case(&mut self) -> Result<Statement, ParseError> {
        let start = Span::point(self.current.location);
        self.advance(); // 'case'
        let subject = self.parse_expression()?;
        self.expect(TokenKind::Of, "'of'")?;

        let mut branches = Vec::new();
        let mut else_branch = None;
        loop {
            if self.check(TokenKind::Else) {
                self.advance();
                let mut stmts = Vec::new();
                while !self.check(TokenKind::End) && !self.at_end() {
                    stmts.push(self.parse_statement()?);
                    if !self.matches(TokenKind::Semicolon) {
                        break;
                    }
                }
                let span = Span::point(self.current.location);
                else_branch = Some(Box::new(Statement::Compound(CompoundStatement {
                    statements: stmts,
                    span,
                })));
                break;
            }
            if self.check(TokenKind::End) || self.at_end() {
                break;
            }
            let mut values = vec![self.parse_expression()?];
            while self.matches(TokenKind::Comma) {
                values.push(self.parse_expression()?);
            }
            self.expect(TokenKind::Colon, "':'")?;
            let body = Box::new(self.parse_statement()?);
            branches.push(CaseBranch { values, body });
            if !self.matches(TokenKind::Semicolon) {
                break;
            }
        }
        self.expect(TokenKind::End, "'end'")?;
        let span = self.span_from(start);
        Ok(Statement::Case(CaseStatement {
            subject,
            branches,
            else_branch,
            span,
        }))
    }

    fn parse_with(&mut self) -> Result<Statement, ParseError> {
        let start = Span::point(self.current.location);
        self.advance(); // 'with'
        let mut targets = vec![self.parse_expression()?];
        while self.matches(TokenKind::Comma) {
            targets.push(self.parse_expression()?);
        }
        self.expect(TokenKind::Do, "'do'")?;
        let body = Box::new(self.parse_statement()?);
        let span = self.span_from(start);
        Ok(Statement::With(WithStatement {
            targets,
            body,
            span,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::super::ast::*;

    fn parse_body(src: &str) -> Vec<Statement> {
        let full = format!("program P; begin {src} end.");
        let (unit, errors) = parse(&full);
        assert!(errors.is_empty(), "{errors:?}");
        let Some(CompilationUnit::Program(program)) = unit else {
            panic!("expected program");
        };
        program.block.statements
    }

    #[test]
    fn parses_case_with_range_branch() {
        let stmts = parse_body("case c of Red..Green: writeln('warm'); Blue: writeln('cool') end;");
        let Statement::Case(case) = &stmts[0] else {
            panic!("expected case statement");
        };
        assert_eq!(case.branches.len(), 2);
        assert!(matches!(case.branches[0].values[0], Expression::Range(_)));
    }

    #[test]
    fn parses_nested_with_statement() {
        let stmts = parse_body("with a, b do x := y;");
        let Statement::With(with) = &stmts[0] else {
            panic!("expected with statement");
        };
        assert_eq!(with.targets.len(), 2);
    }

    #[test]
    fn repeat_until_collects_body_before_condition() {
        let stmts = parse_body("repeat x := x + 1 until x = 10;");
        let Statement::Repeat(repeat) = &stmts[0] else {
            panic!("expected repeat statement");
        };
        assert_eq!(repeat.body.len(), 1);
    }
}
