use crate::span::Span;

use super::{
    expression::Expression,
    statement::Statement,
    type_expr::{ParamMode, RecordType, TypeExpr},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantDecl {
    pub name: String,
    pub value: Expression,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelDecl {
    pub names: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeDefBody {
    Alias(TypeExpr),
    Record(RecordType),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: String,
    pub body: TypeDefBody,
    /// Verbatim source text of the definition, preserved so the emitter
    /// can re-derive bounds/members without re-walking `body`.
    pub raw: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub names: Vec<String>,
    pub type_name: TypeExpr,
    pub mode: ParamMode,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterGroup {
    pub names: Vec<String>,
    pub type_name: TypeExpr,
    pub mode: ParamMode,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeclarationBlock {
    pub constants: Vec<ConstantDecl>,
    pub labels: Vec<LabelDecl>,
    pub types: Vec<TypeDecl>,
    pub variables: Vec<VariableDecl>,
    pub routines: Vec<Routine>,
}

/// A procedure or function declaration. Interface-context parsing records
/// a signature with `body: None`; a `forward`-marked routine does the
/// same in implementation context, to be matched by a later full
/// definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Routine {
    pub name: String,
    pub parameters: Vec<ParameterGroup>,
    /// `None` for a procedure, `Some` for a function.
    pub return_type: Option<TypeExpr>,
    pub is_forward: bool,
    pub is_external: bool,
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub declarations: DeclarationBlock,
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct UsesClause {
    pub unit_names: Vec<String>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: String,
    pub uses: UsesClause,
    pub block: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    pub name: String,
    pub interface_uses: UsesClause,
    pub interface: DeclarationBlock,
    pub implementation_uses: UsesClause,
    pub implementation: DeclarationBlock,
    pub initialization: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompilationUnit {
    Program(Program),
    Unit(Unit),
}
