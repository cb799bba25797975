//! Visitor protocol over the AST.
//!
//! Each node family is a closed, tagged variant; traversal is an
//! exhaustive match rather than open-ended dynamic dispatch. `Visitor`
//! gives every node an "accept a visitor" entry point with a default
//! recursive walk; a caller overrides only the hooks it cares about. The
//! two heavyweight passes — semantic analysis and emission — are *not*
//! built on top of this trait (they need per-pass return types: a `Type`
//! result for the analyzer, a `String` fragment for the emitter) and
//! instead match on the AST directly in their own modules, which is the
//! same exhaustive-match style this trait's default methods use
//! internally.
use super::{declaration::*, expression::*, statement::*};

pub trait Visitor {
    fn visit_expression(&mut self, expr: &Expression) {
        walk_expression(self, expr);
    }
    fn visit_statement(&mut self, stmt: &Statement) {
        walk_statement(self, stmt);
    }
    fn visit_block(&mut self, block: &Block) {
        walk_block(self, block);
    }
    fn visit_identifier(&mut self, _id: &Identifier) {}
    fn visit_literal(&mut self, _lit: &Literal) {}
}

pub fn walk_expression<V: Visitor + ?Sized>(v: &mut V, expr: &Expression) {
    match expr {
        Expression::Literal(lit, _) => v.visit_literal(lit),
        Expression::Identifier(id) => v.visit_identifier(id),
        Expression::Binary(e) => {
            v.visit_expression(&e.lhs);
            v.visit_expression(&e.rhs);
        }
        Expression::Unary(e) => v.visit_expression(&e.operand),
        Expression::AddressOf(inner, _) | Expression::Dereference(inner, _) => {
            v.visit_expression(inner)
        }
        Expression::Call(e) => {
            v.visit_expression(&e.callee);
            for arg in &e.args {
                v.visit_expression(arg);
            }
        }
        Expression::Field(e) => v.visit_expression(&e.base),
        Expression::Index(e) => {
            v.visit_expression(&e.base);
            for idx in &e.indices {
                v.visit_expression(idx);
            }
        }
        Expression::SetLiteral(e) => {
            for el in &e.elements {
                match el {
                    SetElement::Single(expr) => v.visit_expression(expr),
                    SetElement::Range(start, end) => {
                        v.visit_expression(start);
                        v.visit_expression(end);
                    }
                }
            }
        }
        Expression::Range(e) => {
            v.visit_expression(&e.start);
            v.visit_expression(&e.end);
        }
        Expression::Formatted(e) => {
            v.visit_expression(&e.expr);
            if let Some(w) = &e.width {
                v.visit_expression(w);
            }
            if let Some(p) = &e.precision {
                v.visit_expression(p);
            }
        }
    }
}

pub fn walk_statement<V: Visitor + ?Sized>(v: &mut V, stmt: &Statement) {
    match stmt {
        Statement::Expression(e) => v.visit_expression(e),
        Statement::Compound(s) => {
            for stmt in &s.statements {
                v.visit_statement(stmt);
            }
        }
        Statement::Assignment(s) => {
            v.visit_expression(&s.target);
            v.visit_expression(&s.value);
        }
        Statement::If(s) => {
            v.visit_expression(&s.condition);
            v.visit_statement(&s.then_branch);
            if let Some(e) = &s.else_branch {
                v.visit_statement(e);
            }
        }
        Statement::While(s) => {
            v.visit_expression(&s.condition);
            v.visit_statement(&s.body);
        }
        Statement::For(s) => {
            v.visit_expression(&s.start);
            v.visit_expression(&s.end);
            v.visit_statement(&s.body);
        }
        Statement::Repeat(s) => {
            for stmt in &s.body {
                v.visit_statement(stmt);
            }
            v.visit_expression(&s.condition);
        }
        Statement::Case(s) => {
            v.visit_expression(&s.subject);
            for branch in &s.branches {
                for value in &branch.values {
                    v.visit_expression(value);
                }
                v.visit_statement(&branch.body);
            }
            if let Some(e) = &s.else_branch {
                v.visit_statement(e);
            }
        }
        Statement::With(s) => {
            for target in &s.targets {
                v.visit_expression(target);
            }
            v.visit_statement(&s.body);
        }
        Statement::Label(s) => v.visit_statement(&s.statement),
        Statement::Goto(_) | Statement::Break(_) | Statement::Continue(_) => {}
    }
}

pub fn walk_block<V: Visitor + ?Sized>(v: &mut V, block: &Block) {
    for constant in &block.declarations.constants {
        v.visit_expression(&constant.value);
    }
    for routine in &block.declarations.routines {
        if let Some(body) = &routine.body {
            v.visit_block(body);
        }
    }
    for stmt in &block.statements {
        v.visit_statement(stmt);
    }
}
