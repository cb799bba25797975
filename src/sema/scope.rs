use std::collections::HashMap;

use super::error::{SemaError, SemaErrorKind};
use super::symbol::Symbol;
use crate::span::Span;

/// One lexical scope: a name-indexed symbol map, a separate overload map
/// for routines (several `Symbol`s may share a name), and a parent link.
/// Scopes are arena-indexed inside [`SymbolTable`] rather than
/// `Rc<RefCell<_>>`-linked, so lookups borrow the table immutably.
#[derive(Debug, Default)]
pub struct Scope {
    symbols: HashMap<String, Symbol>,
    overloads: HashMap<String, Vec<Symbol>>,
    parent: Option<usize>,
    /// Set for a scope pushed by a `with` target: the textual alias the
    /// emitter qualifies field accesses through. `None` for an ordinary
    /// block/routine scope.
    with_alias: Option<String>,
}

/// A stack of scopes with global scope always resident at index 0 and
/// never popped. `enter_scope`/`exit_scope` must balance exactly, which
/// the analyzer enforces by always pairing them around a block/routine
/// body/with-statement.
pub struct SymbolTable {
    scopes: Vec<Scope>,
    current: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            scopes: vec![Scope::default()],
            current: 0,
        }
    }

    pub fn enter_scope(&mut self) {
        let parent = self.current;
        self.scopes.push(Scope {
            parent: Some(parent),
            ..Scope::default()
        });
        self.current = self.scopes.len() - 1;
    }

    /// Pushes a scope for a `with target do` body, pre-populated by the
    /// caller with one symbol per field of the target's record type.
    pub fn enter_with_scope(&mut self, alias: impl Into<String>) {
        let parent = self.current;
        self.scopes.push(Scope {
            parent: Some(parent),
            with_alias: Some(alias.into()),
            ..Scope::default()
        });
        self.current = self.scopes.len() - 1;
    }

    pub fn exit_scope(&mut self) {
        debug_assert!(self.current != 0, "global scope is never popped");
        if let Some(parent) = self.scopes[self.current].parent {
            self.current = parent;
        }
    }

    pub fn depth(&self) -> usize {
        self.current
    }

    /// Defines a plain (non-overloaded) symbol in the current scope.
    /// Duplicate names within the same scope are rejected; shadowing an
    /// outer scope's name is allowed.
    pub fn define(&mut self, symbol: Symbol, span: Span) -> Result<(), SemaError> {
        let scope = &mut self.scopes[self.current];
        if scope.symbols.contains_key(&symbol.name) || scope.overloads.contains_key(&symbol.name) {
            return Err(SemaError::new(
                SemaErrorKind::DuplicateDefinition(symbol.name.clone()),
                span,
            ));
        }
        scope.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Adds a routine symbol to its name's overload set in the current
    /// scope, permitting repeats (distinct parameter signatures) while
    /// still forbidding a routine name colliding with a plain symbol.
    pub fn define_overload(&mut self, symbol: Symbol, span: Span) -> Result<(), SemaError> {
        let scope = &mut self.scopes[self.current];
        if scope.symbols.contains_key(&symbol.name) {
            return Err(SemaError::new(
                SemaErrorKind::DuplicateDefinition(symbol.name.clone()),
                span,
            ));
        }
        scope.overloads.entry(symbol.name.clone()).or_default().push(symbol);
        Ok(())
    }

    /// Looks up a plain symbol by name, walking outward through parent
    /// scopes.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.lookup_with_alias(name).map(|(sym, _)| sym)
    }

    /// Like [`Self::lookup`] but also reports the `with`-alias of the
    /// scope the name resolved in, if any — used to annotate an
    /// [`Identifier`](crate::parser::ast::Identifier) node's write-once
    /// with-qualifier slot.
    pub fn lookup_with_alias(&self, name: &str) -> Option<(&Symbol, Option<&str>)> {
        let mut idx = Some(self.current);
        while let Some(i) = idx {
            if let Some(sym) = self.scopes[i].symbols.get(name) {
                return Some((sym, self.scopes[i].with_alias.as_deref()));
            }
            idx = self.scopes[i].parent;
        }
        None
    }

    /// Looks up a routine's full overload set, walking outward through
    /// parent scopes and stopping at the first scope that defines the
    /// name at all (an inner overload set fully shadows an outer one of
    /// the same name, it is not merged with it).
    pub fn lookup_overloads(&self, name: &str) -> Option<&[Symbol]> {
        let mut idx = Some(self.current);
        while let Some(i) = idx {
            if let Some(set) = self.scopes[i].overloads.get(name) {
                return Some(set.as_slice());
            }
            idx = self.scopes[i].parent;
        }
        None
    }

    /// Picks the overload whose positional parameter types match `args`
    /// exactly or via numeric widening, falling back to the first symbol
    /// of the set (the "primary" overload) when none matches — the
    /// documented fallback-to-primary-then-parent-scope behavior.
    pub fn resolve_overload<'a>(&'a self, name: &str, args: &[super::types::DataType]) -> Option<&'a Symbol> {
        let set = self.lookup_overloads(name)?;
        set.iter()
            .find(|sym| {
                let params = sym.params.as_deref().unwrap_or(&[]);
                params.len() == args.len()
                    && params.iter().zip(args).all(|(p, a)| p.is_compatible_with(a))
            })
            .or_else(|| set.first())
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        SymbolTable::new()
    }
}
