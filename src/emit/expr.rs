use super::types::cpp_type_name;
use super::Emitter;
use crate::parser::ast::*;
use crate::sema::registry::TypeShape;
use crate::sema::types::DataType;

impl<'a> Emitter<'a> {
    /// Resolves a type as written in source the same way the analyzer
    /// does, re-synthesizing the identical registry name for an inline
    /// shape (array/set/bounded-string) so the lookup lands on the entry
    /// analysis already registered. Array dimension bounds are read
    /// straight off the write-once `lower_bounds` cell when the analyzer
    /// already populated it, rather than recomputed.
    pub(crate) fn resolve_type_expr(&mut self, type_expr: &TypeExpr) -> DataType {
        match type_expr {
            TypeExpr::Named(name) => match name.to_ascii_lowercase().as_str() {
                "integer" | "longint" | "word" => DataType::Integer,
                "real" | "double" | "single" => DataType::Real,
                "boolean" => DataType::Boolean,
                "char" => DataType::Char,
                "byte" | "shortint" => DataType::Byte,
                "string" => DataType::Str,
                _ => DataType::Custom(name.clone()),
            },
            TypeExpr::Range(lo, hi) => {
                let lo_ty = self.type_of(lo);
                let hi_ty = self.type_of(hi);
                if lo_ty == DataType::Char || hi_ty == DataType::Char {
                    DataType::Char
                } else {
                    DataType::Integer
                }
            }
            TypeExpr::Enum(members) => DataType::Custom(self.synth_name("anon_enum", &members.join(","))),
            TypeExpr::SetOf(inner) => {
                let element = self.resolve_type_expr(inner);
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
                let bounds: Vec<(i64, i64)> = match lower_bounds.borrow().as_ref() {
                    Some(lows) => lows
                        .iter()
                        .zip(dims.iter())
                        .map(|(lo, d)| (*lo, self.array_dim_upper(d, *lo)))
                        .collect(),
                    None => dims.iter().map(|d| self.array_dim(d)).collect(),
                };
                let element_ty = self.resolve_type_expr(element);
                let name = self.synth_name("array", &format!("{bounds:?}{element_ty}"));
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
                DataType::FileType(Box::new(inner.as_ref().map(|t| self.resolve_type_expr(t))))
            }
            TypeExpr::Pointer(inner) => DataType::Pointer(Box::new(self.resolve_type_expr(inner))),
        }
    }

    fn array_dim(&mut self, dim: &TypeExpr) -> (i64, i64) {
        match dim {
            TypeExpr::Range(lo, hi) => (self.ordinal_const(lo), self.ordinal_const(hi)),
            TypeExpr::Named(name) => match self.types.shape(name) {
                Some(TypeShape::Enum { members }) => (0, members.len() as i64 - 1),
                _ => (0, 0),
            },
            other => {
                self.resolve_type_expr(other);
                (0, 0)
            }
        }
    }

    fn array_dim_upper(&mut self, dim: &TypeExpr, lo: i64) -> i64 {
        let (_, hi) = self.array_dim(dim);
        hi.max(lo)
    }

    pub(crate) fn ordinal_const(&mut self, expr: &Expression) -> i64 {
        match expr {
            Expression::Literal(Literal::Integer(n), _) => *n,
            Expression::Literal(Literal::Char(c), _) => *c as i64,
            Expression::Identifier(id) => {
                self.types.enum_ordinal(&id.name).map(|(_, ord)| ord).unwrap_or(0)
            }
            Expression::Unary(u) if u.op == UnOp::Neg => -self.ordinal_const(&u.operand),
            _ => 0,
        }
    }

    pub(crate) fn synth_name(&self, prefix: &str, content: &str) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        let digest = hasher.finalize();
        format!("__{prefix}_{:x}", digest).chars().take(24).collect()
    }

    /// Best-effort re-derivation of an expression's type, used only to
    /// pick the right lowering (string-vs-array indexing, enum casts,
    /// set membership) — never to re-validate a program the analyzer
    /// already accepted.
    pub(crate) fn type_of(&mut self, expr: &Expression) -> DataType {
        match expr {
            Expression::Literal(lit, _) => match lit {
                Literal::Integer(_) => DataType::Integer,
                Literal::Real(_) => DataType::Real,
                Literal::Str(_) => DataType::Str,
                Literal::Char(_) => DataType::Char,
                Literal::Bool(_) => DataType::Boolean,
                Literal::Nil => DataType::Pointer(Box::new(DataType::Unknown)),
            },
            Expression::Identifier(id) => self.lookup_type(&id.name),
            Expression::Binary(b) => match b.op {
                BinOp::Eq | BinOp::NotEq | BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq
                | BinOp::And | BinOp::Or | BinOp::Xor | BinOp::In => DataType::Boolean,
                BinOp::IntDiv | BinOp::Mod => DataType::Integer,
                BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div => {
                    let lhs = self.types.resolve(&self.type_of(&b.lhs));
                    let rhs = self.types.resolve(&self.type_of(&b.rhs));
                    DataType::arithmetic_result(&lhs, &rhs)
                }
            },
            Expression::Unary(u) => match u.op {
                UnOp::Not => DataType::Boolean,
                UnOp::Plus | UnOp::Neg => self.type_of(&u.operand),
            },
            Expression::AddressOf(inner, _) => DataType::Pointer(Box::new(self.type_of(inner))),
            Expression::Dereference(inner, _) => match self.type_of(inner) {
                DataType::Pointer(pointee) => *pointee,
                other => other,
            },
            Expression::Call(call) => match call.callee.as_ref() {
                Expression::Identifier(id) => {
                    let args: Vec<DataType> = call.args.iter().map(|a| self.type_of(a)).collect();
                    self.symbols
                        .resolve_overload(&id.name, &args)
                        .map(|s| s.data_type.clone())
                        .unwrap_or(DataType::Unknown)
                }
                _ => DataType::Unknown,
            },
            Expression::Field(field) => {
                let base = self.types.resolve(&self.type_of(&field.base));
                if let DataType::Custom(name) = &base {
                    if let Some(TypeShape::Record { fields, variant_fields }) = self.types.shape(name) {
                        if let Some((_, ty)) = fields.iter().chain(variant_fields.iter()).find(|(n, _)| n == &field.field) {
                            return ty.clone();
                        }
                    }
                }
                DataType::Unknown
            }
            Expression::Index(index) => {
                let base = self.types.resolve(&self.type_of(&index.base));
                match &base {
                    DataType::Str => DataType::Char,
                    DataType::Custom(name) => match self.types.shape(name) {
                        Some(TypeShape::Array { element, .. }) => element.clone(),
                        _ => DataType::Unknown,
                    },
                    _ => DataType::Unknown,
                }
            }
            Expression::SetLiteral(_) => DataType::Unknown,
            Expression::Range(r) => self.type_of(&r.start),
            Expression::Formatted(f) => self.type_of(&f.expr),
        }
    }
}

/// Renders an expression to C++ text. A free function (rather than a
/// method) so it reads the same way at every call site regardless of
/// which statement-emission helper is driving it.
pub fn emit_expr(emitter: &mut Emitter, expr: &Expression) -> String {
    match expr {
        Expression::Literal(lit, _) => emit_literal(lit),
        Expression::Identifier(id) => emit_identifier(emitter, id),
        Expression::Binary(b) => emit_binary(emitter, b),
        Expression::Unary(u) => {
            let operand = emit_expr(emitter, &u.operand);
            match u.op {
                UnOp::Plus => format!("(+{operand})"),
                UnOp::Neg => format!("(-{operand})"),
                UnOp::Not => format!("(!{operand})"),
            }
        }
        Expression::AddressOf(inner, _) => format!("(&{})", emit_expr(emitter, inner)),
        Expression::Dereference(inner, _) => format!("(*{})", emit_expr(emitter, inner)),
        Expression::Call(call) => emit_call(emitter, call),
        Expression::Field(field) => {
            let base_ty = emitter.type_of(&field.base);
            let sep = if matches!(base_ty, DataType::Pointer(_)) { "->" } else { "." };
            format!("{}{sep}{}", emit_expr(emitter, &field.base), field.field)
        }
        Expression::Index(index) => emit_index(emitter, index),
        Expression::SetLiteral(set) => emit_set_literal(emitter, set),
        Expression::Range(r) => {
            // Only reachable outside a set-literal/case-branch context,
            // where a bare range has no direct C++ expression form;
            // emitted as a `pasrt::Range` value for the runtime to
            // interpret (e.g. a `for` loop bound computed indirectly).
            format!(
                "pasrt::Range{{{}, {}}}",
                emit_expr(emitter, &r.start),
                emit_expr(emitter, &r.end)
            )
        }
        Expression::Formatted(f) => {
            // `write`/`writeln` consume width/precision directly (see
            // `emit::stmt::emit_write_args`); standalone use just
            // degrades to the bare value.
            emit_expr(emitter, &f.expr)
        }
    }
}

fn emit_literal(lit: &Literal) -> String {
    match lit {
        Literal::Integer(n) => n.to_string(),
        Literal::Real(r) => format!("{r:?}"),
        Literal::Str(s) => format!("std::string({:?})", s),
        Literal::Char(c) => format!("'{}'", c.escape_default()),
        Literal::Bool(b) => b.to_string(),
        Literal::Nil => "nullptr".to_string(),
    }
}

fn emit_identifier(emitter: &mut Emitter, id: &Identifier) -> String {
    if emitter
        .routine_stack
        .last()
        .is_some_and(|name| name.eq_ignore_ascii_case(&id.name))
    {
        return "F_result".to_string();
    }
    if let Some(alias) = id.with_qualifier.borrow().as_ref() {
        return format!("{alias}.{}", id.name);
    }
    id.name.clone()
}

fn emit_binary(emitter: &mut Emitter, b: &BinaryExpr) -> String {
    if b.op == BinOp::In {
        let element = emit_expr(emitter, &b.lhs);
        let set = emit_expr(emitter, &b.rhs);
        return format!("({set}.contains({element}))");
    }
    let op = match b.op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::IntDiv => "/",
        BinOp::Mod => "%",
        BinOp::And => "&&",
        BinOp::Or => "||",
        BinOp::Xor => "!=", // boolean xor via inequality of 0/1-valued operands
        BinOp::Eq => "==",
        BinOp::NotEq => "!=",
        BinOp::Lt => "<",
        BinOp::LtEq => "<=",
        BinOp::Gt => ">",
        BinOp::GtEq => ">=",
        BinOp::In => unreachable!(),
    };
    let lhs_ty = emitter.type_of(&b.lhs);
    let rhs_ty = emitter.type_of(&b.rhs);
    let lhs = emit_expr(emitter, &b.lhs);
    let rhs = emit_expr(emitter, &b.rhs);
    if b.op == BinOp::Div && lhs_ty == DataType::Integer && rhs_ty == DataType::Integer {
        // Pascal's `/` is always real-valued division, even between two
        // integers, unlike `div`.
        return format!("(static_cast<double>({lhs}) / static_cast<double>({rhs}))");
    }
    format!("({lhs} {op} {rhs})")
}

/// Every built-in the runtime contract (§6) names, besides the I/O four
/// (which have their own stream-based emission in `emit_io_call`) —
/// mirrors `sema::builtins::register_builtins`'s name list so a call the
/// analyzer accepted as a built-in is always recognized here too.
const BUILTIN_RUNTIME_NAMES: &[&str] = &[
    "length", "copy", "pos", "concat", "insert", "delete", "trim", "trimleft", "trimright",
    "uppercase", "lowercase", "padleft", "padright", "upcase", "str", "val",
    "abs", "sqr", "sqrt", "sin", "cos", "arctan", "ln", "exp", "trunc", "round", "ord", "chr", "odd",
    "inttostr", "floattostr", "strtoint", "strtofloat",
    "new", "dispose", "getmem", "freemem", "mark", "release", "inc", "dec", "exit", "halt",
    "random", "randomize", "paramcount", "paramstr",
    "assign", "reset", "rewrite", "append", "close", "eof", "ioresult", "blockread", "blockwrite",
    "filepos", "filesize", "seek",
];

/// `new`/`delete` are reserved words in C++ and can't name a free
/// function in `pasrt`; every other built-in name is used verbatim.
fn runtime_function_name(name: &str) -> &str {
    match name {
        "new" => "new_object",
        "delete" => "erase",
        other => other,
    }
}

fn emit_call(emitter: &mut Emitter, call: &CallExpr) -> String {
    let Expression::Identifier(callee) = call.callee.as_ref() else {
        return "/* unsupported call target */ 0".to_string();
    };
    let lower = callee.name.to_ascii_lowercase();
    if matches!(lower.as_str(), "write" | "writeln" | "read" | "readln") {
        return super::stmt::emit_io_call(emitter, &lower, &call.args);
    }
    if BUILTIN_RUNTIME_NAMES.contains(&lower.as_str()) {
        let runtime_name = runtime_function_name(&lower);
        let rendered_args: Vec<String> = call.args.iter().map(|a| emit_expr(emitter, a)).collect();
        return format!("pasrt::{runtime_name}({})", rendered_args.join(", "));
    }

    let args: Vec<DataType> = call.args.iter().map(|a| emitter.type_of(a)).collect();
    let name = match emitter.symbols.resolve_overload(&callee.name, &args) {
        Some(sym) => {
            let params = sym.params.clone().unwrap_or_default();
            emitter.mangled(&callee.name, &params)
        }
        None => lower,
    };
    let rendered_args: Vec<String> = call.args.iter().map(|a| emit_expr(emitter, a)).collect();
    format!("{name}({})", rendered_args.join(", "))
}

/// Row-major multi-dimensional index flattening, or — when the base is a
/// `string` — Pascal's 1-based character access lowered to a 0-based
/// `.at()` call. Both subtract the declared lower bound, which for a
/// string is always 1.
fn emit_index(emitter: &mut Emitter, index: &IndexExpr) -> String {
    let base_ty = emitter.types.resolve(&emitter.type_of(&index.base));
    let base = emit_expr(emitter, &index.base);

    if base_ty == DataType::Str {
        let idx = emit_expr(emitter, &index.indices[0]);
        return format!("{base}.at(static_cast<std::size_t>(({idx}) - 1))");
    }

    if let DataType::Custom(name) = &base_ty {
        if let Some(TypeShape::Array { bounds, .. }) = emitter.types.shape(name).cloned().as_ref() {
            let mut strides = vec![1i64; bounds.len()];
            for i in (0..bounds.len().saturating_sub(1)).rev() {
                let extent = (bounds[i + 1].1 - bounds[i + 1].0 + 1).max(1);
                strides[i] = strides[i + 1] * extent;
            }
            let mut terms = Vec::new();
            for (i, idx_expr) in index.indices.iter().enumerate() {
                let (lo, _) = bounds.get(i).copied().unwrap_or((0, 0));
                let stride = strides.get(i).copied().unwrap_or(1);
                let idx = emit_expr(emitter, idx_expr);
                terms.push(format!("(({idx}) - {lo}) * {stride}"));
            }
            let offset = terms.join(" + ");
            return format!("{base}[{offset}]");
        }
    }

    // Fallback for an index into something the registry has no shape
    // for (e.g. analysis already reported an error on this program) —
    // emit a direct single-dimension index rather than aborting emission.
    let idx = emit_expr(emitter, &index.indices[0]);
    format!("{base}[{idx}]")
}

fn emit_set_literal(emitter: &mut Emitter, set: &SetLiteralExpr) -> String {
    let mut element_ty = DataType::Unknown;
    let mut inserts = Vec::new();
    for el in &set.elements {
        match el {
            SetElement::Single(e) => {
                if element_ty == DataType::Unknown {
                    element_ty = emitter.type_of(e);
                }
                inserts.push(format!("{{{}}}", emit_expr(emitter, e)));
            }
            SetElement::Range(lo, hi) => {
                if element_ty == DataType::Unknown {
                    element_ty = emitter.type_of(lo);
                }
                let lo_v = emitter.ordinal_const(lo);
                let hi_v = emitter.ordinal_const(hi);
                let count = (hi_v - lo_v + 1).max(0);
                if count > super::RANGE_EXPANSION_LIMIT {
                    emitter.report(
                        set.span,
                        format!("set range spans {count} ordinals, over the {} limit", super::RANGE_EXPANSION_LIMIT),
                    );
                } else {
                    let enum_name = match emitter.types.resolve(&element_ty) {
                        DataType::Custom(name)
                            if matches!(emitter.types.shape(&name), Some(TypeShape::Enum { .. })) =>
                        {
                            Some(name)
                        }
                        _ => None,
                    };
                    for label in emitter.expand_case_range(lo, hi, enum_name.as_deref()) {
                        inserts.push(format!("{{{label}}}"));
                    }
                }
            }
        }
    }
    let cpp_elem = cpp_type_name(&element_ty);
    format!(
        "pasrt::Set<{cpp_elem}>::from({{{}}})",
        inserts.join(", ")
    )
}
