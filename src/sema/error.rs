use std::fmt;

use crate::span::Span;

use super::types::DataType;

/// Hand-written semantic-analysis error, mirroring the lexer/parser error
/// style rather than a `thiserror` derive.
#[derive(Debug, Clone, PartialEq)]
pub enum SemaErrorKind {
    DuplicateDefinition(String),
    UndefinedSymbol(String),
    TypeMismatch { expected: DataType, found: DataType },
    NotCallable(String),
    WrongArgumentCount { name: String, expected: usize, found: usize },
    NoMatchingOverload(String),
    InvalidAssignmentTarget,
    AssignmentToConstant(String),
    UnresolvedForward(String),
    ForwardSignatureMismatch(String),
    UnknownUnit(String),
    NotAType(String),
    RangeTooLarge { count: i64, limit: i64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SemaError {
    pub kind: SemaErrorKind,
    pub span: Span,
}

impl SemaError {
    pub fn new(kind: SemaErrorKind, span: Span) -> Self {
        SemaError { kind, span }
    }
}

impl fmt::Display for SemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SemaErrorKind::DuplicateDefinition(name) => {
                write!(f, "{}: '{name}' is already defined in this scope", self.span.start)
            }
            SemaErrorKind::UndefinedSymbol(name) => {
                write!(f, "{}: undefined symbol '{name}'", self.span.start)
            }
            SemaErrorKind::TypeMismatch { expected, found } => write!(
                f,
                "{}: expected type '{expected}' but found '{found}'",
                self.span.start
            ),
            SemaErrorKind::NotCallable(name) => {
                write!(f, "{}: '{name}' is not callable", self.span.start)
            }
            SemaErrorKind::WrongArgumentCount { name, expected, found } => write!(
                f,
                "{}: '{name}' expects {expected} argument(s) but got {found}",
                self.span.start
            ),
            SemaErrorKind::NoMatchingOverload(name) => write!(
                f,
                "{}: no overload of '{name}' matches the given arguments",
                self.span.start
            ),
            SemaErrorKind::InvalidAssignmentTarget => {
                write!(f, "{}: expression is not assignable", self.span.start)
            }
            SemaErrorKind::AssignmentToConstant(name) => {
                write!(f, "{}: cannot assign to constant '{name}'", self.span.start)
            }
            SemaErrorKind::UnresolvedForward(name) => write!(
                f,
                "{}: '{name}' is declared forward but never given a body",
                self.span.start
            ),
            SemaErrorKind::ForwardSignatureMismatch(name) => write!(
                f,
                "{}: '{name}' is implemented with a signature that does not match its forward declaration",
                self.span.start
            ),
            SemaErrorKind::UnknownUnit(name) => {
                write!(f, "{}: unit '{name}' could not be loaded", self.span.start)
            }
            SemaErrorKind::NotAType(name) => {
                write!(f, "{}: '{name}' does not name a type", self.span.start)
            }
            SemaErrorKind::RangeTooLarge { count, limit } => write!(
                f,
                "{}: range spans {count} ordinals, over the {limit} expansion limit",
                self.span.start
            ),
        }
    }
}

impl std::error::Error for SemaError {}
