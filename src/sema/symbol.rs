use crate::span::Span;

use super::types::DataType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Constant,
    Variable,
    TypeName,
    Routine,
    EnumMember,
    Unit,
}

/// One declared name, carrying the kind-dependent extension slots the
/// data model calls for: stored definition text for type aliases,
/// original user type name for variables declared with a custom type,
/// pointee name/type for pointer-typed symbols, and a parameter
/// signature for routines (used for overload discrimination).
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub data_type: DataType,
    pub scope_level: usize,
    pub declared_at: Span,

    /// For variables declared with a user-defined type name.
    pub type_name: Option<String>,
    /// For type-alias symbols: the verbatim source text of the definition.
    pub raw_type_text: Option<String>,
    /// For pointer-typed symbols: the declared pointee type name.
    pub pointee_name: Option<String>,
    /// For routine symbols: positional parameter types, used to pick an
    /// overload by matching call-site argument types.
    pub params: Option<Vec<DataType>>,
    /// `true` for a function (has a return value slot), `false` for a
    /// procedure. Only meaningful when `kind == Routine`.
    pub is_function: bool,
    /// Ordinal position within its enclosing enum. Only meaningful when
    /// `kind == EnumMember`.
    pub ordinal: Option<i64>,
    /// `true` for a `var` parameter, passed by reference.
    pub is_reference: bool,
}

impl Symbol {
    pub fn variable(name: impl Into<String>, data_type: DataType, scope_level: usize, span: Span) -> Self {
        Symbol {
            name: name.into(),
            kind: SymbolKind::Variable,
            data_type,
            scope_level,
            declared_at: span,
            type_name: None,
            raw_type_text: None,
            pointee_name: None,
            params: None,
            is_function: false,
            ordinal: None,
            is_reference: false,
        }
    }

    pub fn routine(
        name: impl Into<String>,
        params: Vec<DataType>,
        return_type: DataType,
        is_function: bool,
        scope_level: usize,
        span: Span,
    ) -> Self {
        Symbol {
            name: name.into(),
            kind: SymbolKind::Routine,
            data_type: return_type,
            scope_level,
            declared_at: span,
            type_name: None,
            raw_type_text: None,
            pointee_name: None,
            params: Some(params),
            is_function,
            ordinal: None,
            is_reference: false,
        }
    }
}
