use std::cell::RefCell;

use crate::span::Span;

use super::expression::Expression;

/// A type as written in source, before the analyzer resolves it against
/// the built-in set and the scope chain. The textual shape drives parsing
/// (§4.2); `raw` is kept verbatim so the emitter can re-derive bounds and
/// members without re-walking the resolved form when convenient.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    /// A bare name: built-in (`integer`, `real`, ...) or a user type alias,
    /// resolved later by scope lookup.
    Named(String),
    /// `L..U`, numeric or character bounds.
    Range(Box<Expression>, Box<Expression>),
    /// `(A, B, C)`.
    Enum(Vec<String>),
    /// `set of T`.
    SetOf(Box<TypeExpr>),
    /// `string[N]`; `None` means an unbounded `string`.
    BoundedString(Option<u32>),
    /// `array[dim, dim, ...] of T`.
    Array {
        dims: Vec<TypeExpr>,
        element: Box<TypeExpr>,
        /// Write-once: lower bound of each dimension, resolved once the
        /// analyzer has evaluated the dimension range expressions (or the
        /// enum ordinal base, for enum-typed dimensions).
        lower_bounds: RefCell<Option<Vec<i64>>>,
    },
    /// `file of T`, or plain `file`/`text` when `element` is `None`.
    FileOf(Option<Box<TypeExpr>>),
    /// `^T`.
    Pointer(Box<TypeExpr>),
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamMode {
    Value,
    Reference,    // var
    ConstReference, // const
}

/// One field in a record's fixed part or inside a variant case.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    pub name: String,
    pub type_name: TypeExpr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantCase {
    pub values: Vec<Expression>,
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantPart {
    pub selector_name: Option<String>,
    pub selector_type: TypeExpr,
    pub cases: Vec<VariantCase>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordType {
    pub fields: Vec<FieldDecl>,
    pub variant: Option<VariantPart>,
    pub span: Span,
}
