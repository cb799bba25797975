//! Semantic analysis: scope/symbol-table construction, type resolution
//! and overload discrimination, walking the parsed AST directly rather
//! than through the visitor trait (see `parser::ast::visitor`'s doc
//! comment) since every pass here needs a different shape of side effect
//! than a uniform `()`-returning traversal would give.
pub mod builtins;
pub mod error;
pub mod loader;
pub mod registry;
pub mod scope;
pub mod symbol;
pub mod types;

use sha2::{Digest, Sha256};

use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::parser::ast::*;
use crate::span::Span;

use error::{SemaError, SemaErrorKind};
use loader::UnitLoader;
use registry::{TypeRegistry, TypeShape};
use scope::SymbolTable;
use symbol::{Symbol, SymbolKind};
use types::DataType;

/// The maximum number of ordinals a `case`/set range is expanded into
/// before the analyzer gives up and reports it rather than handing the
/// emitter a range it would have to materialize in full.
pub const RANGE_EXPANSION_LIMIT: i64 = 65_536;

pub struct AnalysisResult {
    pub symbols: SymbolTable,
    pub types: TypeRegistry,
    pub diagnostics: Diagnostics,
}

pub struct Analyzer<'a> {
    symbols: SymbolTable,
    types: TypeRegistry,
    errors: Vec<SemaError>,
    loader: &'a dyn UnitLoader,
    /// Tracks the enclosing function's name while analyzing its body, so
    /// an assignment to that bare name is recognized as the Pascal
    /// return-value idiom rather than an ordinary variable reference
    /// (both read the same underlying slot once the routine scope has
    /// bound it as a variable symbol, so no special case is needed there;
    /// this stack only matters for loop/statement-level constructs that
    /// need to know "am I inside routine X").
    routine_stack: Vec<String>,
}

impl<'a> Analyzer<'a> {
    pub fn new(loader: &'a dyn UnitLoader) -> Self {
        let mut symbols = SymbolTable::new();
        builtins::register_builtins(&mut symbols);
        Analyzer {
            symbols,
            types: TypeRegistry::new(),
            errors: Vec::new(),
            loader,
            routine_stack: Vec::new(),
        }
    }

    pub fn analyze(mut self, unit: &CompilationUnit) -> AnalysisResult {
        match unit {
            CompilationUnit::Program(program) => self.analyze_program(program),
            CompilationUnit::Unit(u) => self.analyze_unit(u),
        }

        let mut diagnostics = Diagnostics::new();
        for err in self.errors {
            diagnostics.push(Diagnostic::error(err.span, err.to_string()));
        }
        AnalysisResult {
            symbols: self.symbols,
            types: self.types,
            diagnostics,
        }
    }

    fn report(&mut self, kind: SemaErrorKind, span: Span) {
        self.errors.push(SemaError::new(kind, span));
    }

    fn analyze_program(&mut self, program: &Program) {
        self.load_uses(&program.uses);
        self.analyze_block(&program.block);
    }

    fn analyze_unit(&mut self, unit: &Unit) {
        self.load_uses(&unit.interface_uses);
        self.analyze_declaration_block(&unit.interface);
        self.load_uses(&unit.implementation_uses);
        self.analyze_declaration_block(&unit.implementation);
        for stmt in &unit.initialization {
            self.analyze_statement(stmt);
        }
    }

    fn load_uses(&mut self, uses: &UsesClause) {
        for name in &uses.unit_names {
            if self.loader.load(name).is_none() {
                self.report(SemaErrorKind::UnknownUnit(name.clone()), uses.span);
            }
        }
    }

    fn analyze_block(&mut self, block: &Block) {
        self.analyze_declaration_block(&block.declarations);
        for stmt in &block.statements {
            self.analyze_statement(stmt);
        }
    }

    fn analyze_declaration_block(&mut self, decls: &DeclarationBlock) {
        for c in &decls.constants {
            let dt = self.analyze_expression(&c.value);
            let mut sym = Symbol::variable(c.name.clone(), dt, self.symbols.depth(), c.span);
            sym.kind = SymbolKind::Constant;
            if let Err(e) = self.symbols.define(sym, c.span) {
                self.errors.push(e);
            }
        }
        for t in &decls.types {
            self.analyze_type_decl(t);
        }
        for v in &decls.variables {
            self.analyze_variable_decl(v);
        }
        for r in &decls.routines {
            self.analyze_routine(r, &decls.routines);
        }
    }

    fn analyze_type_decl(&mut self, decl: &TypeDecl) {
        match &decl.body {
            TypeDefBody::Alias(TypeExpr::Enum(members)) => {
                self.types.define(
                    decl.name.clone(),
                    TypeShape::Enum {
                        members: members.clone(),
                    },
                );
                for (i, member) in members.iter().enumerate() {
                    let mut sym = Symbol::variable(
                        member.clone(),
                        DataType::Custom(decl.name.clone()),
                        self.symbols.depth(),
                        decl.span,
                    );
                    sym.kind = SymbolKind::EnumMember;
                    sym.ordinal = Some(i as i64);
                    if let Err(e) = self.symbols.define(sym, decl.span) {
                        self.errors.push(e);
                    }
                }
            }
            TypeDefBody::Alias(inner) => {
                let dt = self.eval_type_expr(inner);
                self.types.define(decl.name.clone(), TypeShape::Alias(dt));
            }
            TypeDefBody::Record(record) => {
                let mut seen: std::collections::HashSet<String> = std::collections::HashSet::new();
                let mut fields = Vec::new();
                for f in &record.fields {
                    if !seen.insert(f.name.to_ascii_lowercase()) {
                        self.report(SemaErrorKind::DuplicateDefinition(f.name.clone()), decl.span);
                        continue;
                    }
                    fields.push((f.name.clone(), self.eval_type_expr(&f.type_name)));
                }
                let mut variant_fields = Vec::new();
                for case in record.variant.iter().flat_map(|v| v.cases.iter()) {
                    for f in &case.fields {
                        if !seen.insert(f.name.to_ascii_lowercase()) {
                            self.report(SemaErrorKind::DuplicateDefinition(f.name.clone()), decl.span);
                            continue;
                        }
                        variant_fields.push((f.name.clone(), self.eval_type_expr(&f.type_name)));
                    }
                }
                self.types.define(
                    decl.name.clone(),
                    TypeShape::Record {
                        fields,
                        variant_fields,
                    },
                );
            }
        }

        let mut sym = Symbol::variable(
            decl.name.clone(),
            DataType::Custom(decl.name.clone()),
            self.symbols.depth(),
            decl.span,
        );
        sym.kind = SymbolKind::TypeName;
        sym.raw_type_text = Some(decl.raw.clone());
        if let Err(e) = self.symbols.define(sym, decl.span) {
            self.errors.push(e);
        }
    }

    fn analyze_variable_decl(&mut self, decl: &VariableDecl) {
        let dt = self.eval_type_expr(&decl.type_name);
        for name in &decl.names {
            let mut sym = Symbol::variable(name.clone(), dt.clone(), self.symbols.depth(), decl.span);
            sym.is_reference = decl.mode == ParamMode::Reference;
            if let TypeExpr::Named(type_name) = &decl.type_name {
                sym.type_name = Some(type_name.clone());
            }
            if let DataType::Pointer(pointee) = &dt {
                if let DataType::Custom(n) = pointee.as_ref() {
                    sym.pointee_name = Some(n.clone());
                }
            }
            if let Err(e) = self.symbols.define(sym, decl.span) {
                self.errors.push(e);
            }
        }
    }

    /// Flattens one `DataType` per individual parameter *name*, not per
    /// `ParameterGroup` — a group like `a, b: integer` declares two
    /// parameters sharing one type annotation, and the signature used for
    /// overload resolution and forward-declaration matching needs one
    /// entry per name to have the right arity.
    fn flatten_param_types(&mut self, routine: &Routine) -> Vec<DataType> {
        let mut out = Vec::new();
        for group in &routine.parameters {
            let ty = self.eval_type_expr(&group.type_name);
            for _ in &group.names {
                out.push(ty.clone());
            }
        }
        out
    }

    fn analyze_routine(&mut self, routine: &Routine, siblings: &[Routine]) {
        let param_types = self.flatten_param_types(routine);
        let return_type = routine
            .return_type
            .as_ref()
            .map(|t| self.eval_type_expr(t))
            .unwrap_or(DataType::Void);
        let is_function = routine.return_type.is_some();

        let sym = Symbol::routine(
            routine.name.clone(),
            param_types.clone(),
            return_type.clone(),
            is_function,
            self.symbols.depth(),
            routine.span,
        );
        if let Err(e) = self.symbols.define_overload(sym, routine.span) {
            self.errors.push(e);
        }

        let Some(body) = &routine.body else {
            if routine.is_forward && !routine.is_external {
                // Only flagged here for a forward routine never completed
                // by a matching implementation-section definition; the
                // parser already reports the same-section case (see
                // `Parser::check_unresolved_forwards`), so this mainly
                // covers interface-declared routines with no unit loader
                // able to supply their implementation. A same-named
                // sibling with a body resolves the forward declaration
                // only if its signature — per-name parameter types and
                // return type — actually matches; a name match with a
                // mismatched signature is reported distinctly so it isn't
                // mistaken for an ordinary unresolved forward.
                let mut name_match = false;
                let mut signature_match = false;
                for sibling in siblings {
                    if sibling.body.is_none() || !sibling.name.eq_ignore_ascii_case(&routine.name) {
                        continue;
                    }
                    name_match = true;
                    let sibling_params = self.flatten_param_types(sibling);
                    let sibling_return = sibling
                        .return_type
                        .as_ref()
                        .map(|t| self.eval_type_expr(t))
                        .unwrap_or(DataType::Void);
                    if sibling_params == param_types && sibling_return == return_type {
                        signature_match = true;
                        break;
                    }
                }
                if name_match && !signature_match {
                    self.report(
                        SemaErrorKind::ForwardSignatureMismatch(routine.name.clone()),
                        routine.span,
                    );
                } else if !name_match {
                    self.report(SemaErrorKind::UnresolvedForward(routine.name.clone()), routine.span);
                }
            }
            return;
        };

        self.symbols.enter_scope();
        self.routine_stack.push(routine.name.clone());

        for (group, ty) in routine.parameters.iter().zip(
            routine
                .parameters
                .iter()
                .map(|p| self.eval_type_expr(&p.type_name)),
        ) {
            for name in &group.names {
                let mut sym = Symbol::variable(name.clone(), ty.clone(), self.symbols.depth(), group.span);
                sym.is_reference = group.mode != ParamMode::Value;
                if let Err(e) = self.symbols.define(sym, group.span) {
                    self.errors.push(e);
                }
            }
        }

        if is_function {
            let result_sym = Symbol::variable(
                routine.name.clone(),
                return_type,
                self.symbols.depth(),
                routine.span,
            );
            if let Err(e) = self.symbols.define(result_sym, routine.span) {
                self.errors.push(e);
            }
        }

        self.analyze_block(body);

        self.routine_stack.pop();
        self.symbols.exit_scope();
    }

    /// Resolves a type as written in source to a [`DataType`], registering
    /// an anonymous shape (array/set/bounded-string) under a deterministic
    /// synthesized name when the written type has no declared name of its
    /// own — e.g. `var a: array[1..10] of integer`.
    fn eval_type_expr(&mut self, type_expr: &TypeExpr) -> DataType {
        match type_expr {
            TypeExpr::Named(name) => self.resolve_named_type(name),
            TypeExpr::Range(lo, hi) => {
                let lo_ty = self.analyze_expression(lo);
                let hi_ty = self.analyze_expression(hi);
                if lo_ty == DataType::Char || hi_ty == DataType::Char {
                    DataType::Char
                } else {
                    DataType::Integer
                }
            }
            TypeExpr::Enum(_) => {
                // Only reachable when an enum literal appears outside a
                // named type declaration (not produced by the parser
                // today); fall back to an opaque custom type rather than
                // panicking.
                DataType::Custom(self.synth_name("anon_enum", "enum"))
            }
            TypeExpr::SetOf(inner) => {
                let element = self.eval_type_expr(inner);
                let name = self.synth_name("set", &element.to_string());
                self.types.define(name.clone(), TypeShape::Set { element });
                DataType::Custom(name)
            }
            TypeExpr::BoundedString(size) => match size {
                None => DataType::Str,
                Some(n) => {
                    let name = self.synth_name("string", &n.to_string());
                    self.types
                        .define(name.clone(), TypeShape::BoundedString { size: Some(*n) });
                    DataType::Custom(name)
                }
            },
            TypeExpr::Array {
                dims,
                element,
                lower_bounds,
            } => {
                let bounds: Vec<(i64, i64)> = dims.iter().map(|d| self.eval_array_dim(d)).collect();
                let already_set = lower_bounds.borrow().is_some();
                if !already_set {
                    *lower_bounds.borrow_mut() = Some(bounds.iter().map(|(lo, _)| *lo).collect());
                }
                let element_ty = self.eval_type_expr(element);
                let name = self.synth_name(
                    "array",
                    &format!("{bounds:?}{element_ty}"),
                );
                self.types.define(
                    name.clone(),
                    TypeShape::Array {
                        bounds,
                        element: element_ty,
                    },
                );
                DataType::Custom(name)
            }
            TypeExpr::FileOf(inner) => {
                DataType::FileType(Box::new(inner.as_ref().map(|t| self.eval_type_expr(t))))
            }
            TypeExpr::Pointer(inner) => DataType::Pointer(Box::new(self.eval_type_expr(inner))),
        }
    }

    fn resolve_named_type(&mut self, name: &str) -> DataType {
        match name.to_ascii_lowercase().as_str() {
            "integer" | "longint" | "word" => DataType::Integer,
            "real" | "double" | "single" => DataType::Real,
            "boolean" => DataType::Boolean,
            "char" => DataType::Char,
            "byte" | "shortint" => DataType::Byte,
            "string" => DataType::Str,
            _ => {
                if self.types.is_defined(name) || self.symbols.lookup(name).is_some() {
                    DataType::Custom(name.to_string())
                } else {
                    DataType::Unknown
                }
            }
        }
    }

    /// Evaluates one array dimension, either an explicit `L..U` range or
    /// an enum type name (bounds `0..members.len()-1`).
    fn eval_array_dim(&mut self, dim: &TypeExpr) -> (i64, i64) {
        match dim {
            TypeExpr::Range(lo, hi) => {
                let lo = self.evaluate_ordinal_const(lo);
                let hi = self.evaluate_ordinal_const(hi);
                (lo, hi)
            }
            TypeExpr::Named(name) => {
                if let Some(TypeShape::Enum { members }) = self.types.shape(name) {
                    (0, members.len() as i64 - 1)
                } else {
                    (0, 0)
                }
            }
            other => {
                self.eval_type_expr(other);
                (0, 0)
            }
        }
    }

    /// Best-effort constant folding for ordinal bounds: integer/char
    /// literals directly, enum members via their registered ordinal,
    /// anything else falls back to 0 with a diagnostic left for the
    /// expression-level check that already ran over it.
    fn evaluate_ordinal_const(&mut self, expr: &Expression) -> i64 {
        match expr {
            Expression::Literal(Literal::Integer(n), _) => *n,
            Expression::Literal(Literal::Char(c), _) => *c as i64,
            Expression::Identifier(id) => {
                if let Some((_, ord)) = self.types.enum_ordinal(&id.name) {
                    ord
                } else {
                    0
                }
            }
            Expression::Unary(u) if u.op == UnOp::Neg => -self.evaluate_ordinal_const(&u.operand),
            _ => 0,
        }
    }

    fn synth_name(&self, prefix: &str, content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let digest = hasher.finalize();
        format!("__{prefix}_{:x}", digest)
            .chars()
            .take(24)
            .collect()
    }

    fn analyze_statement(&mut self, stmt: &Statement) {
        match stmt {
            Statement::Expression(e) => {
                self.analyze_expression(e);
            }
            Statement::Compound(c) => {
                for s in &c.statements {
                    self.analyze_statement(s);
                }
            }
            Statement::Assignment(a) => self.analyze_assignment(a),
            Statement::If(s) => {
                self.expect_boolean(&s.condition);
                self.analyze_statement(&s.then_branch);
                if let Some(e) = &s.else_branch {
                    self.analyze_statement(e);
                }
            }
            Statement::While(s) => {
                self.expect_boolean(&s.condition);
                self.analyze_statement(&s.body);
            }
            Statement::For(s) => {
                if self.symbols.lookup(&s.variable).is_none() {
                    self.report(
                        SemaErrorKind::UndefinedSymbol(s.variable.clone()),
                        s.span,
                    );
                }
                self.analyze_expression(&s.start);
                self.analyze_expression(&s.end);
                self.analyze_statement(&s.body);
            }
            Statement::Repeat(s) => {
                for stmt in &s.body {
                    self.analyze_statement(stmt);
                }
                self.expect_boolean(&s.condition);
            }
            Statement::Case(s) => {
                let subject_ty = self.analyze_expression(&s.subject);
                for branch in &s.branches {
                    for value in &branch.values {
                        self.check_case_value(value, &subject_ty);
                    }
                    self.analyze_statement(&branch.body);
                }
                if let Some(e) = &s.else_branch {
                    self.analyze_statement(e);
                }
            }
            Statement::With(s) => self.analyze_with(s),
            Statement::Label(s) => self.analyze_statement(&s.statement),
            Statement::Goto(_) | Statement::Break(_) | Statement::Continue(_) => {}
        }
    }

    fn check_case_value(&mut self, value: &Expression, subject_ty: &DataType) {
        match value {
            Expression::Range(r) => {
                let lo = self.evaluate_ordinal_const(&r.start);
                let hi = self.evaluate_ordinal_const(&r.end);
                let count = (hi - lo + 1).max(0);
                if count > RANGE_EXPANSION_LIMIT {
                    self.report(
                        SemaErrorKind::RangeTooLarge {
                            count,
                            limit: RANGE_EXPANSION_LIMIT,
                        },
                        r.span,
                    );
                }
            }
            other => {
                let ty = self.analyze_expression(other);
                if !ty.is_compatible_with(subject_ty) && ty != DataType::Unknown {
                    self.report(
                        SemaErrorKind::TypeMismatch {
                            expected: subject_ty.clone(),
                            found: ty,
                        },
                        other.span(),
                    );
                }
            }
        }
    }

    fn analyze_assignment(&mut self, assignment: &Assignment) {
        if !assignment.target.is_place_shape() {
            self.report(SemaErrorKind::InvalidAssignmentTarget, assignment.span);
            return;
        }
        if let Expression::Identifier(id) = &assignment.target {
            if let Some(sym) = self.symbols.lookup(&id.name) {
                if sym.kind == SymbolKind::Constant {
                    self.report(
                        SemaErrorKind::AssignmentToConstant(id.name.clone()),
                        assignment.span,
                    );
                }
            }
        }
        let target_ty = self.analyze_expression(&assignment.target);
        let value_ty = self.analyze_expression(&assignment.value);
        if target_ty != DataType::Unknown
            && value_ty != DataType::Unknown
            && !value_ty.is_compatible_with(&target_ty)
        {
            self.report(
                SemaErrorKind::TypeMismatch {
                    expected: target_ty,
                    found: value_ty,
                },
                assignment.span,
            );
        }
    }

    fn expect_boolean(&mut self, expr: &Expression) {
        let ty = self.analyze_expression(expr);
        if ty != DataType::Boolean && ty != DataType::Unknown {
            self.report(
                SemaErrorKind::TypeMismatch {
                    expected: DataType::Boolean,
                    found: ty,
                },
                expr.span(),
            );
        }
    }

    /// Pushes one scope per `with` target, innermost (last target) on
    /// top, populating each with the target's record fields as `Variable`
    /// symbols so plain field-name references resolve inside the body;
    /// identifiers that resolve through one of these scopes get their
    /// write-once with-qualifier annotation set to the target's alias.
    fn analyze_with(&mut self, stmt: &WithStatement) {
        let mut pushed = 0;
        for target in &stmt.targets {
            let target_ty = self.analyze_expression(target);
            let alias = match target {
                Expression::Identifier(id) => id.name.clone(),
                _ => self.synth_name("with", &format!("{:?}", target.span())),
            };
            if let DataType::Custom(name) = &target_ty {
                if let Some(TypeShape::Record { fields, variant_fields }) =
                    self.types.shape(name).cloned().as_ref()
                {
                    self.symbols.enter_with_scope(alias);
                    pushed += 1;
                    for (field_name, field_ty) in fields.iter().chain(variant_fields.iter()) {
                        let sym = Symbol::variable(field_name.clone(), field_ty.clone(), self.symbols.depth(), stmt.span);
                        let _ = self.symbols.define(sym, stmt.span);
                    }
                    continue;
                }
            }
            self.report(
                SemaErrorKind::TypeMismatch {
                    expected: DataType::Custom("record".to_string()),
                    found: target_ty,
                },
                target.span(),
            );
        }

        self.analyze_statement(&stmt.body);

        for _ in 0..pushed {
            self.symbols.exit_scope();
        }
    }

    fn analyze_expression(&mut self, expr: &Expression) -> DataType {
        match expr {
            Expression::Literal(lit, _) => match lit {
                Literal::Integer(_) => DataType::Integer,
                Literal::Real(_) => DataType::Real,
                Literal::Str(_) => DataType::Str,
                Literal::Char(_) => DataType::Char,
                Literal::Bool(_) => DataType::Boolean,
                Literal::Nil => DataType::Pointer(Box::new(DataType::Unknown)),
            },
            Expression::Identifier(id) => {
                match self.symbols.lookup_with_alias(&id.name) {
                    Some((sym, Some(alias))) => {
                        id.set_with_qualifier(alias.to_string());
                        sym.data_type.clone()
                    }
                    Some((sym, None)) => sym.data_type.clone(),
                    None => {
                        self.report(SemaErrorKind::UndefinedSymbol(id.name.clone()), id.span);
                        DataType::Unknown
                    }
                }
            }
            Expression::Binary(b) => self.analyze_binary(b),
            Expression::Unary(u) => {
                let operand_ty = self.analyze_expression(&u.operand);
                match u.op {
                    UnOp::Not => {
                        if operand_ty != DataType::Boolean && operand_ty != DataType::Unknown {
                            self.report(
                                SemaErrorKind::TypeMismatch {
                                    expected: DataType::Boolean,
                                    found: operand_ty.clone(),
                                },
                                u.span,
                            );
                        }
                        DataType::Boolean
                    }
                    UnOp::Neg | UnOp::Plus => operand_ty,
                }
            }
            Expression::AddressOf(inner, _) => {
                let ty = self.analyze_expression(inner);
                DataType::Pointer(Box::new(ty))
            }
            Expression::Dereference(inner, span) => {
                let ty = self.analyze_expression(inner);
                match ty {
                    DataType::Pointer(pointee) => *pointee,
                    DataType::Unknown => DataType::Unknown,
                    other => {
                        self.report(
                            SemaErrorKind::TypeMismatch {
                                expected: DataType::Pointer(Box::new(DataType::Unknown)),
                                found: other,
                            },
                            *span,
                        );
                        DataType::Unknown
                    }
                }
            }
            Expression::Call(call) => self.analyze_call(call),
            Expression::Field(field) => self.analyze_field(field),
            Expression::Index(index) => self.analyze_index(index),
            Expression::SetLiteral(set) => self.analyze_set_literal(set),
            Expression::Range(r) => {
                let lo = self.analyze_expression(&r.start);
                let _ = self.analyze_expression(&r.end);
                lo
            }
            Expression::Formatted(f) => {
                let ty = self.analyze_expression(&f.expr);
                if let Some(w) = &f.width {
                    self.analyze_expression(w);
                }
                if let Some(p) = &f.precision {
                    self.analyze_expression(p);
                }
                ty
            }
        }
    }

    fn analyze_binary(&mut self, b: &BinaryExpr) -> DataType {
        let lhs = self.analyze_expression(&b.lhs);
        let rhs = self.analyze_expression(&b.rhs);
        if lhs == DataType::Unknown || rhs == DataType::Unknown {
            return DataType::Unknown;
        }
        match b.op {
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
                DataType::arithmetic_result(&self.types.resolve(&lhs), &self.types.resolve(&rhs))
            }
            BinOp::IntDiv | BinOp::Mod => DataType::Integer,
            BinOp::And | BinOp::Or | BinOp::Xor => DataType::Boolean,
            BinOp::Eq | BinOp::NotEq | BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => {
                if !lhs.is_compatible_with(&rhs) {
                    self.report(
                        SemaErrorKind::TypeMismatch {
                            expected: lhs.clone(),
                            found: rhs,
                        },
                        b.span,
                    );
                }
                DataType::Boolean
            }
            BinOp::In => DataType::Boolean,
        }
    }

    fn analyze_call(&mut self, call: &CallExpr) -> DataType {
        let Expression::Identifier(callee_id) = call.callee.as_ref() else {
            self.report(SemaErrorKind::NotCallable("<expression>".to_string()), call.span);
            return DataType::Unknown;
        };
        let arg_types: Vec<DataType> = call.args.iter().map(|a| self.analyze_expression(a)).collect();

        // write/writeln/read/readln take a variadic, heterogeneous
        // argument list (each possibly `expr:width:precision`), so arity
        // is not checked against the registered zero-parameter signature.
        let variadic = matches!(
            callee_id.name.to_ascii_lowercase().as_str(),
            "write" | "writeln" | "read" | "readln"
        );

        let Some(overloads) = self.symbols.lookup_overloads(&callee_id.name) else {
            self.report(SemaErrorKind::UndefinedSymbol(callee_id.name.clone()), call.span);
            return DataType::Unknown;
        };

        if variadic {
            return overloads.first().map(|s| s.data_type.clone()).unwrap_or(DataType::Void);
        }

        match self.symbols.resolve_overload(&callee_id.name, &arg_types) {
            Some(sym) => {
                let expected = sym.params.as_ref().map(|p| p.len()).unwrap_or(0);
                if expected != call.args.len() {
                    self.report(
                        SemaErrorKind::WrongArgumentCount {
                            name: callee_id.name.clone(),
                            expected,
                            found: call.args.len(),
                        },
                        call.span,
                    );
                }
                sym.data_type.clone()
            }
            None => {
                self.report(SemaErrorKind::NoMatchingOverload(callee_id.name.clone()), call.span);
                DataType::Unknown
            }
        }
    }

    fn analyze_field(&mut self, field: &FieldExpr) -> DataType {
        let base_ty = self.analyze_expression(&field.base);
        let resolved = self.types.resolve(&base_ty);
        if let DataType::Custom(name) = &resolved {
            if let Some(TypeShape::Record { fields, variant_fields }) = self.types.shape(name) {
                if let Some((_, ty)) = fields
                    .iter()
                    .chain(variant_fields.iter())
                    .find(|(n, _)| n == &field.field)
                {
                    return ty.clone();
                }
            }
        }
        if resolved != DataType::Unknown {
            self.report(
                SemaErrorKind::TypeMismatch {
                    expected: DataType::Custom("record".to_string()),
                    found: resolved,
                },
                field.span,
            );
        }
        DataType::Unknown
    }

    fn analyze_index(&mut self, index: &IndexExpr) -> DataType {
        let base_ty = self.analyze_expression(&index.base);
        for idx in &index.indices {
            self.analyze_expression(idx);
        }
        let resolved = self.types.resolve(&base_ty);
        if let DataType::Custom(name) = &resolved {
            if let Some(TypeShape::Array { element, .. }) = self.types.shape(name) {
                return element.clone();
            }
        }
        if resolved != DataType::Unknown {
            self.report(
                SemaErrorKind::TypeMismatch {
                    expected: DataType::Custom("array".to_string()),
                    found: resolved,
                },
                index.span,
            );
        }
        DataType::Unknown
    }

    fn analyze_set_literal(&mut self, set: &SetLiteralExpr) -> DataType {
        let mut element = DataType::Unknown;
        for el in &set.elements {
            let ty = match el {
                SetElement::Single(e) => self.analyze_expression(e),
                SetElement::Range(lo, hi) => {
                    self.analyze_expression(lo);
                    self.analyze_expression(hi)
                }
            };
            if element == DataType::Unknown {
                element = ty;
            }
        }
        let name = self.synth_name("set", &element.to_string());
        self.types.define(name.clone(), TypeShape::Set { element });
        DataType::Custom(name)
    }
}
