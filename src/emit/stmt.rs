use std::fmt::Write as _;

use super::expr::emit_expr;
use super::Emitter;
use crate::parser::ast::*;
use crate::sema::registry::TypeShape;
use crate::sema::types::DataType;

impl<'a> Emitter<'a> {
    pub(crate) fn pad(&self, indent: usize) -> String {
        " ".repeat(self.config.indent_width * indent)
    }

    pub(crate) fn emit_statement(&mut self, out: &mut String, stmt: &Statement, indent: usize) {
        match stmt {
            Statement::Expression(e) => {
                let _ = writeln!(out, "{}{};", self.pad(indent), emit_expr(self, e));
            }
            Statement::Compound(c) => {
                let _ = writeln!(out, "{}{{", self.pad(indent));
                for s in &c.statements {
                    self.emit_statement(out, s, indent + 1);
                }
                let _ = writeln!(out, "{}}}", self.pad(indent));
            }
            Statement::Assignment(a) => {
                let target = emit_expr(self, &a.target);
                let value = emit_expr(self, &a.value);
                let _ = writeln!(out, "{}{target} = {value};", self.pad(indent));
            }
            Statement::If(s) => self.emit_if(out, s, indent),
            Statement::While(s) => {
                let cond = emit_expr(self, &s.condition);
                let _ = writeln!(out, "{}while ({cond}) {{", self.pad(indent));
                self.emit_statement(out, &s.body, indent + 1);
                let _ = writeln!(out, "{}}}", self.pad(indent));
            }
            Statement::For(s) => self.emit_for(out, s, indent),
            Statement::Repeat(s) => {
                let _ = writeln!(out, "{}do {{", self.pad(indent));
                for stmt in &s.body {
                    self.emit_statement(out, stmt, indent + 1);
                }
                let cond = emit_expr(self, &s.condition);
                let _ = writeln!(out, "{}}} while (!({cond}));", self.pad(indent));
            }
            Statement::Case(s) => self.emit_case(out, s, indent),
            Statement::With(s) => self.emit_with(out, s, indent),
            Statement::Label(s) => {
                let _ = writeln!(out, "{}{}:;", self.pad(indent), s.label);
                self.emit_statement(out, &s.statement, indent);
            }
            Statement::Goto(s) => {
                let _ = writeln!(out, "{}goto {};", self.pad(indent), s.label);
            }
            Statement::Break(_) => {
                let _ = writeln!(out, "{}break;", self.pad(indent));
            }
            Statement::Continue(_) => {
                let _ = writeln!(out, "{}continue;", self.pad(indent));
            }
        }
    }

    fn emit_if(&mut self, out: &mut String, s: &IfStatement, indent: usize) {
        let cond = emit_expr(self, &s.condition);
        let _ = writeln!(out, "{}if ({cond}) {{", self.pad(indent));
        self.emit_statement(out, &s.then_branch, indent + 1);
        let _ = writeln!(out, "{}}}", self.pad(indent));
        if let Some(else_branch) = &s.else_branch {
            let _ = writeln!(out, "{}else {{", self.pad(indent));
            self.emit_statement(out, else_branch, indent + 1);
            let _ = writeln!(out, "{}}}", self.pad(indent));
        }
    }

    /// `for v := a to b do` / `for v := a downto b do`, lowered to an
    /// ordinary C++ counted loop stepping by one in the matching
    /// direction. The loop variable is not redeclared — Pascal reuses an
    /// existing ordinal variable, so neither does the emitted code. The
    /// bound is evaluated once, into a synthesized temporary, ahead of
    /// the loop header — Pascal fixes the extent at entry, so a bound
    /// with a side effect or one the body can mutate must not be
    /// re-evaluated on every iteration the way re-emitting its text into
    /// the condition would.
    fn emit_for(&mut self, out: &mut String, s: &ForStatement, indent: usize) {
        let start = emit_expr(self, &s.start);
        let end_ty = self.type_of(&s.end);
        let end = emit_expr(self, &s.end);
        let bound = self.synth_name("for_bound", &format!("{:?}", s.span));
        let _ = writeln!(
            out,
            "{}{} {bound} = {end};",
            self.pad(indent),
            super::types::cpp_type_name(&end_ty)
        );
        let (cmp, step) = match s.direction {
            ForDirection::To => ("<=", "++"),
            ForDirection::Downto => (">=", "--"),
        };
        let _ = writeln!(
            out,
            "{}for ({} = {start}; {} {cmp} {bound}; {step}{}) {{",
            self.pad(indent),
            s.variable,
            s.variable,
            s.variable
        );
        self.emit_statement(out, &s.body, indent + 1);
        let _ = writeln!(out, "{}}}", self.pad(indent));
    }

    /// Renders one `case` value to a C++ `case` label: an enum-typed
    /// subject qualifies a bare member name (`Color::Red`), anything
    /// else is emitted as a literal constant expression the way a plain
    /// `switch` label already requires.
    fn case_label(&mut self, value: &Expression, enum_name: Option<&str>) -> String {
        match (value, enum_name) {
            (Expression::Identifier(id), Some(name)) => format!("{name}::{}", id.name),
            (Expression::Literal(Literal::Char(c), _), _) => format!("'{}'", c.escape_default()),
            (Expression::Literal(Literal::Integer(n), _), _) => n.to_string(),
            _ => emit_expr(self, value),
        }
    }

    /// Expands a `lo..hi` case/set range into the concrete ordinals it
    /// spans, each lowered through [`Self::case_label`] for its kind
    /// (enum member name vs. integer/char literal).
    pub(crate) fn expand_case_range(&mut self, lo: &Expression, hi: &Expression, enum_name: Option<&str>) -> Vec<String> {
        let lo_v = self.ordinal_const(lo);
        let hi_v = self.ordinal_const(hi);
        let mut labels = Vec::new();
        if let Some(name) = enum_name {
            if let Some(TypeShape::Enum { members }) = self.types.shape(name).cloned().as_ref() {
                for ord in lo_v..=hi_v.min(lo_v + super::RANGE_EXPANSION_LIMIT) {
                    if let Some(member) = members.get(ord as usize) {
                        labels.push(format!("{name}::{member}"));
                    }
                }
                return labels;
            }
        }
        let is_char = matches!(lo, Expression::Literal(Literal::Char(_), _));
        for ord in lo_v..=hi_v.min(lo_v + super::RANGE_EXPANSION_LIMIT) {
            if is_char {
                labels.push(format!("'{}'", (ord as u8 as char).escape_default()));
            } else {
                labels.push(ord.to_string());
            }
        }
        labels
    }

    fn emit_case(&mut self, out: &mut String, s: &CaseStatement, indent: usize) {
        let subject_ty = self.types.resolve(&self.type_of(&s.subject));
        let enum_name = match &subject_ty {
            DataType::Custom(name) if matches!(self.types.shape(name), Some(TypeShape::Enum { .. })) => {
                Some(name.clone())
            }
            _ => None,
        };
        let subject = emit_expr(self, &s.subject);
        let _ = writeln!(out, "{}switch ({subject}) {{", self.pad(indent));
        for branch in &s.branches {
            for value in &branch.values {
                match value {
                    Expression::Range(r) => {
                        for label in self.expand_case_range(&r.start, &r.end, enum_name.as_deref()) {
                            let _ = writeln!(out, "{}case {label}:", self.pad(indent + 1));
                        }
                    }
                    other => {
                        let label = self.case_label(other, enum_name.as_deref());
                        let _ = writeln!(out, "{}case {label}:", self.pad(indent + 1));
                    }
                }
            }
            let _ = writeln!(out, "{}{{", self.pad(indent + 1));
            self.emit_statement(out, &branch.body, indent + 2);
            let _ = writeln!(out, "{}break;", self.pad(indent + 2));
            let _ = writeln!(out, "{}}}", self.pad(indent + 1));
        }
        if let Some(else_branch) = &s.else_branch {
            let _ = writeln!(out, "{}default: {{", self.pad(indent + 1));
            self.emit_statement(out, else_branch, indent + 2);
            let _ = writeln!(out, "{}break;", self.pad(indent + 2));
            let _ = writeln!(out, "{}}}", self.pad(indent + 1));
        }
        let _ = writeln!(out, "{}}}", self.pad(indent));
    }

    /// A non-identifier `with` target has no existing C++ lvalue to
    /// qualify field access through, so a reference binding is declared
    /// for it first; a bare-identifier target already names one and
    /// needs no declaration of its own.
    fn emit_with(&mut self, out: &mut String, s: &WithStatement, indent: usize) {
        for target in &s.targets {
            if let Expression::Identifier(_) = target {
                continue;
            }
            let alias = self.synth_name("with", &format!("{:?}", target.span()));
            let rendered = emit_expr(self, target);
            let ty = self.type_of(target);
            let _ = writeln!(
                out,
                "{}auto& {alias} = {rendered}; (void){alias}; // {}",
                self.pad(indent),
                crate::emit::types::cpp_type_name(&ty)
            );
        }
        self.emit_statement(out, &s.body, indent);
    }
}

/// `write`/`writeln`/`read`/`readln` take a variadic argument list, each
/// possibly `expr:width:precision`; lowered to a chained `std::cout`/
/// `std::cin` statement rather than a function call.
pub(crate) fn emit_io_call(emitter: &mut Emitter, name: &str, args: &[Expression]) -> String {
    let is_output = matches!(name, "write" | "writeln");
    let stream = if is_output { "std::cout" } else { "std::cin" };
    let op = if is_output { "<<" } else { ">>" };

    let mut parts = Vec::new();
    for arg in args {
        if is_output {
            if let Expression::Formatted(f) = arg {
                let value = emit_expr(emitter, &f.expr);
                let width = f
                    .width
                    .as_ref()
                    .map(|w| emit_expr(emitter, w))
                    .unwrap_or_else(|| "0".to_string());
                let precision = f.precision.as_ref().map(|p| emit_expr(emitter, p));
                match precision {
                    Some(p) => parts.push(format!("pasrt::fmt({value}, {width}, {p})")),
                    None => parts.push(format!("pasrt::fmt({value}, {width})")),
                }
                continue;
            }
        }
        parts.push(emit_expr(emitter, arg));
    }

    let mut rendered = stream.to_string();
    for part in &parts {
        let _ = write!(rendered, " {op} {part}");
    }
    if name == "writeln" {
        let _ = write!(rendered, " {op} std::endl");
    }
    rendered
}
