//! Lowers a checked AST to C++17 source text. Walks the same tree the
//! analyzer walked (so write-once annotations — with-qualifiers, array
//! lower bounds — are already populated) and reads its [`TypeRegistry`]
//! and global-scope [`SymbolTable`] slice for the rest. Like the
//! analyzer, this matches the AST directly rather than through the
//! visitor trait: emission needs a `String` accumulator threaded through
//! every call, which the trait's `()`-returning default methods don't
//! carry.
pub mod config;
pub mod expr;
pub mod mangle;
pub mod stmt;
pub mod types;

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::parser::ast::*;
use crate::sema::registry::TypeRegistry;
use crate::sema::scope::SymbolTable;
use crate::sema::types::DataType;

use config::Config;
use mangle::mangled_name;
use types::cpp_type_name;

pub struct EmitResult {
    pub source: String,
    pub diagnostics: Diagnostics,
}

/// Maximum ordinals a `case`/set range literal is expanded into at an
/// emission site; mirrors [`crate::sema::RANGE_EXPANSION_LIMIT`] so a
/// program that passed analysis never trips this at emission.
pub const RANGE_EXPANSION_LIMIT: i64 = crate::sema::RANGE_EXPANSION_LIMIT;

pub struct Emitter<'a> {
    pub(crate) config: Config,
    pub(crate) types: TypeRegistry,
    pub(crate) symbols: &'a SymbolTable,
    pub(crate) diagnostics: Diagnostics,
    /// Enclosing function names, innermost last, for rewriting a
    /// Pascal-style `FunctionName := value` / bare `FunctionName` read
    /// into the synthesized `F_result` local.
    pub(crate) routine_stack: Vec<String>,
    /// One frame per routine body currently being emitted, mapping
    /// locally-visible names (parameters and `var` declarations) to
    /// their resolved type. Looked up innermost-first, the same order
    /// Pascal's own lexical scoping resolves names in.
    pub(crate) locals: Vec<HashMap<String, DataType>>,
}

impl<'a> Emitter<'a> {
    pub fn new(config: Config, types: TypeRegistry, symbols: &'a SymbolTable) -> Self {
        Emitter {
            config,
            types,
            symbols,
            diagnostics: Diagnostics::new(),
            routine_stack: Vec::new(),
            locals: Vec::new(),
        }
    }

    pub fn emit(mut self, unit: &CompilationUnit) -> EmitResult {
        let mut out = String::new();
        let _ = writeln!(out, "#include \"{}\"", self.config.runtime_header);
        let _ = writeln!(out, "#include <array>");
        let _ = writeln!(out, "#include <string>");
        let _ = writeln!(out, "using namespace pasrt;");
        out.push('\n');

        match unit {
            CompilationUnit::Program(program) => self.emit_program(&mut out, program),
            CompilationUnit::Unit(u) => self.emit_unit(&mut out, u),
        }

        EmitResult {
            source: out,
            diagnostics: self.diagnostics,
        }
    }

    fn emit_program(&mut self, out: &mut String, program: &Program) {
        self.emit_declaration_block(out, &program.block.declarations);
        let _ = writeln!(out, "int main() {{");
        self.push_locals_from_block(out, &program.block, 1);
        for stmt in &program.block.statements {
            self.emit_statement(out, stmt, 1);
        }
        self.locals.pop();
        let _ = writeln!(out, "    return 0;");
        let _ = writeln!(out, "}}");
    }

    fn emit_unit(&mut self, out: &mut String, unit: &Unit) {
        let _ = writeln!(out, "// unit {}", unit.name);
        self.emit_declaration_block(out, &unit.interface);
        self.emit_declaration_block(out, &unit.implementation);
        if !unit.initialization.is_empty() {
            let _ = writeln!(out, "namespace {{");
            let _ = writeln!(out, "struct {}_init {{", unit.name);
            let _ = writeln!(out, "    {}_init() {{", unit.name);
            for stmt in &unit.initialization {
                self.emit_statement(out, stmt, 2);
            }
            let _ = writeln!(out, "    }}");
            let _ = writeln!(out, "}} {}_init_instance;", unit.name.to_ascii_lowercase());
            let _ = writeln!(out, "}}");
        }
    }

    fn emit_declaration_block(&mut self, out: &mut String, decls: &DeclarationBlock) {
        types::emit_type_declarations(out, &self.types);

        for constant in &decls.constants {
            let ty = self.type_of(&constant.value);
            let _ = writeln!(
                out,
                "const {} {} = {};",
                cpp_type_name(&ty),
                constant.name,
                expr::emit_expr(self, &constant.value)
            );
        }

        for var in &decls.variables {
            let ty = self.resolve_type_expr(&var.type_name);
            for name in &var.names {
                let _ = writeln!(out, "{} {};", cpp_type_name(&ty), name);
            }
        }

        // Forward-declare every routine first so mutual recursion and
        // out-of-order call sites resolve without a C++-side prototype
        // juggling pass of our own.
        for routine in &decls.routines {
            self.emit_routine_prototype(out, routine);
        }
        for routine in &decls.routines {
            if routine.body.is_some() {
                self.emit_routine(out, routine);
            }
        }
    }

    fn mangled(&self, name: &str, params: &[DataType]) -> String {
        let count = self.symbols.lookup_overloads(name).map(|o| o.len()).unwrap_or(1);
        mangled_name(name, params, count)
    }

    fn emit_routine_prototype(&mut self, out: &mut String, routine: &Routine) {
        let params = self.param_types(routine);
        let ret = routine
            .return_type
            .as_ref()
            .map(|t| self.resolve_type_expr(t))
            .unwrap_or(DataType::Void);
        let name = self.mangled(&routine.name, &params);
        let param_list = self.format_params(routine, &params);
        let _ = writeln!(out, "{} {name}({param_list});", cpp_type_name(&ret));
    }

    fn format_params(&mut self, routine: &Routine, params: &[DataType]) -> String {
        let mut parts = Vec::new();
        let mut i = 0;
        for group in &routine.parameters {
            for name in &group.names {
                let ty = &params[i];
                let decl = if group.mode == ParamMode::Value {
                    format!("{} {name}", cpp_type_name(ty))
                } else {
                    format!("{}& {name}", cpp_type_name(ty))
                };
                parts.push(decl);
                i += 1;
            }
        }
        parts.join(", ")
    }

    fn param_types(&mut self, routine: &Routine) -> Vec<DataType> {
        let mut out = Vec::new();
        for group in &routine.parameters {
            let ty = self.resolve_type_expr(&group.type_name);
            for _ in &group.names {
                out.push(ty.clone());
            }
        }
        out
    }

    fn emit_routine(&mut self, out: &mut String, routine: &Routine) {
        let Some(body) = &routine.body else { return };

        // C++ has no nested ordinary function definitions: a Pascal
        // nested procedure/function is hoisted to an everyday free
        // function, defined just ahead of its enclosing routine, in the
        // same prototype-then-body order `emit_declaration_block` uses
        // at the top level. It gets no access to the enclosing routine's
        // locals (see the nested-procedure note in DESIGN.md) — only
        // programs that nest for structuring, not for capturing outer
        // variables, translate correctly as a result.
        for nested in &body.declarations.routines {
            self.emit_routine_prototype(out, nested);
        }
        for nested in &body.declarations.routines {
            if nested.body.is_some() {
                self.emit_routine(out, nested);
            }
        }

        let params = self.param_types(routine);
        let is_function = routine.return_type.is_some();
        let ret = routine
            .return_type
            .as_ref()
            .map(|t| self.resolve_type_expr(t))
            .unwrap_or(DataType::Void);
        let name = self.mangled(&routine.name, &params);
        let param_list = self.format_params(routine, &params);

        let _ = writeln!(out, "{} {name}({param_list}) {{", cpp_type_name(&ret));

        let mut frame = HashMap::new();
        let mut i = 0;
        for group in &routine.parameters {
            for pname in &group.names {
                frame.insert(pname.clone(), params[i].clone());
                i += 1;
            }
        }
        if is_function {
            let _ = writeln!(out, "    {} F_result{{}};", cpp_type_name(&ret));
            frame.insert(routine.name.clone(), ret.clone());
        }
        self.locals.push(frame);
        self.routine_stack.push(routine.name.clone());

        self.push_locals_from_block(out, body, 1);
        for stmt in &body.statements {
            self.emit_statement(out, stmt, 1);
        }
        self.locals.pop();

        self.routine_stack.pop();
        self.locals.pop();

        if is_function {
            let _ = writeln!(out, "    return F_result;");
        }
        let _ = writeln!(out, "}}");
    }

    /// Emits the block's own `var`/`const` declarations as C++ locals at
    /// `indent`, and pushes a locals frame recording their types (on top
    /// of whatever frame `emit_routine`/`emit_program` already pushed for
    /// parameters) so references to them resolve during the rest of the
    /// body's emission. A routine's own `var` section is the single most
    /// common Pascal idiom — without writing these out, every statement
    /// referencing a local variable would compile to a read/write of a
    /// C++ identifier nothing ever declared.
    fn push_locals_from_block(&mut self, out: &mut String, block: &Block, indent: usize) {
        let pad = self.pad(indent);
        let mut frame = HashMap::new();
        for var in &block.declarations.variables {
            let ty = self.resolve_type_expr(&var.type_name);
            for name in &var.names {
                let _ = writeln!(out, "{pad}{} {name};", cpp_type_name(&ty));
                frame.insert(name.clone(), ty.clone());
            }
        }
        for c in &block.declarations.constants {
            let ty = self.type_of(&c.value);
            let value = expr::emit_expr(self, &c.value);
            let _ = writeln!(out, "{pad}const {} {} = {value};", cpp_type_name(&ty), c.name);
            frame.insert(c.name.clone(), ty);
        }
        self.locals.push(frame);
    }

    /// Resolves a locally or globally visible name's type, searching
    /// local frames innermost-first before falling back to the
    /// global-scope symbol table.
    pub(crate) fn lookup_type(&self, name: &str) -> DataType {
        for frame in self.locals.iter().rev() {
            if let Some(ty) = frame.get(name) {
                return ty.clone();
            }
        }
        self.symbols
            .lookup(name)
            .map(|s| s.data_type.clone())
            .unwrap_or(DataType::Unknown)
    }

    pub(crate) fn report(&mut self, span: crate::span::Span, message: impl Into<String>) {
        self.diagnostics.push(Diagnostic::error(span, message));
    }
}
