use crate::lexer::TokenKind;
use crate::span::Span;

use super::ast::{
    Block, CompilationUnit, ConstantDecl, DeclarationBlock, LabelDecl, ParamMode, ParameterGroup,
    Program, Routine, TypeDecl, TypeDefBody, Unit, UsesClause, VariableDecl,
};
use super::{ParseError, Parser};

impl<'a> Parser<'a> {
    pub fn parse_compilation_unit(&mut self) -> Option<CompilationUnit> {
        let result = if self.check(TokenKind::Unit) {
            self.parse_unit().map(CompilationUnit::Unit)
        } else {
            self.parse_program().map(CompilationUnit::Program)
        };
        result.ok()
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        let start = Span::point(self.current.location);
        self.expect(TokenKind::Program, "'program'")?;
        let name = self.expect(TokenKind::Identifier, "a program name")?.text;
        self.expect(TokenKind::Semicolon, "';'")?;

        let uses = self.parse_optional_uses()?;
        let block = self.parse_block(false)?;
        self.expect(TokenKind::Dot, "'.'")?;
        let span = self.span_from(start);
        Ok(Program {
            name,
            uses,
            block,
            span,
        })
    }

    fn parse_unit(&mut self) -> Result<Unit, ParseError> {
        let start = Span::point(self.current.location);
        self.expect(TokenKind::Unit, "'unit'")?;
        let name = self.expect(TokenKind::Identifier, "a unit name")?.text;
        self.expect(TokenKind::Semicolon, "';'")?;

        self.expect(TokenKind::Interface, "'interface'")?;
        let interface_uses = self.parse_optional_uses()?;
        let interface = self.parse_declaration_block(true)?;

        self.expect(TokenKind::Implementation, "'implementation'")?;
        let implementation_uses = self.parse_optional_uses()?;
        let implementation = self.parse_declaration_block(false)?;

        let initialization = if self.matches(TokenKind::Begin) {
            let mut stmts = Vec::new();
            while !self.check(TokenKind::End) && !self.at_end() {
                stmts.push(self.parse_statement()?);
                if !self.matches(TokenKind::Semicolon) {
                    break;
                }
            }
            self.expect(TokenKind::End, "'end'")?;
            stmts
        } else {
            self.expect(TokenKind::End, "'end'")?;
            Vec::new()
        };
        self.expect(TokenKind::Dot, "'.'")?;

        let span = self.span_from(start);
        Ok(Unit {
            name,
            interface_uses,
            interface,
            implementation_uses,
            implementation,
            initialization,
            span,
        })
    }

    fn parse_optional_uses(&mut self) -> Result<UsesClause, ParseError> {
        if !self.matches(TokenKind::Uses) {
            return Ok(UsesClause::default());
        }
        let start = Span::point(self.current.location);
        let mut unit_names = vec![self.expect(TokenKind::Identifier, "a unit name")?.text];
        while self.matches(TokenKind::Comma) {
            unit_names.push(self.expect(TokenKind::Identifier, "a unit name")?.text);
        }
        self.expect(TokenKind::Semicolon, "';'")?;
        let span = self.span_from(start);
        Ok(UsesClause { unit_names, span })
    }

    /// A `program`'s body or a routine's body: declarations then a
    /// compound statement.
    fn parse_block(&mut self, in_interface: bool) -> Result<Block, ParseError> {
        let start = Span::point(self.current.location);
        let declarations = self.parse_declaration_block(in_interface)?;
        let compound = self.parse_compound()?;
        let span = self.span_from(start);
        Ok(Block {
            declarations,
            statements: compound.statements,
            span,
        })
    }

    /// Parses `const`/`label`/`type`/`var`/`procedure`/`function` sections
    /// in any order, any number of times, terminating at the first token
    /// that cannot start a declaration (typically `begin`, `implementation`
    /// or the enclosing `end`). `in_interface` is threaded through so
    /// routine bodies are only parsed in implementation context —
    /// interface routines record a signature with `body: None`.
    fn parse_declaration_block(&mut self, in_interface: bool) -> Result<DeclarationBlock, ParseError> {
        let mut block = DeclarationBlock::default();
        loop {
            match self.current.kind {
                TokenKind::Const => block.constants.extend(self.parse_const_section()?),
                TokenKind::Label => block.labels.push(self.parse_label_section()?),
                TokenKind::Type => block.types.extend(self.parse_type_section()?),
                TokenKind::Var => block.variables.extend(self.parse_var_section()?),
                TokenKind::Procedure | TokenKind::Function => {
                    block.routines.push(self.parse_routine(in_interface)?)
                }
                _ => break,
            }
        }
        self.check_unresolved_forwards(&block);
        Ok(block)
    }

    /// A `forward`-marked routine must be matched by a later full
    /// definition in the same section with the same signature; anything
    /// left forward-only (or only matched by a same-named routine with a
    /// different parameter/return signature) at the end of the section
    /// is reported.
    fn check_unresolved_forwards(&mut self, block: &DeclarationBlock) {
        for routine in &block.routines {
            if routine.is_forward && routine.body.is_none() {
                let resolved = block.routines.iter().any(|r| {
                    r.name.eq_ignore_ascii_case(&routine.name)
                        && r.body.is_some()
                        && signatures_match(routine, r)
                });
                if !resolved {
                    self.errors.push(ParseError::new(
                        format!("a body with a matching signature for forward-declared '{}'", routine.name),
                        self.current.clone(),
                    ));
                }
            }
        }
    }

    fn parse_const_section(&mut self) -> Result<Vec<ConstantDecl>, ParseError> {
        self.advance(); // 'const'
        let mut decls = Vec::new();
        while self.check(TokenKind::Identifier) {
            let start = Span::point(self.current.location);
            let name = self.advance().text;
            self.expect(TokenKind::Equal, "'='")?;
            let value = self.parse_expression()?;
            self.expect(TokenKind::Semicolon, "';'")?;
            let span = self.span_from(start);
            decls.push(ConstantDecl { name, value, span });
        }
        Ok(decls)
    }

    fn parse_label_section(&mut self) -> Result<LabelDecl, ParseError> {
        let start = Span::point(self.current.location);
        self.advance(); // 'label'
        let mut names = vec![self.expect(TokenKind::Identifier, "a label name")?.text];
        while self.matches(TokenKind::Comma) {
            names.push(self.expect(TokenKind::Identifier, "a label name")?.text);
        }
        self.expect(TokenKind::Semicolon, "';'")?;
        let span = self.span_from(start);
        Ok(LabelDecl { names, span })
    }

    fn parse_type_section(&mut self) -> Result<Vec<TypeDecl>, ParseError> {
        self.advance(); // 'type'
        let mut decls = Vec::new();
        while self.check(TokenKind::Identifier) {
            let start = Span::point(self.current.location);
            let name = self.advance().text;
            self.expect(TokenKind::Equal, "'='")?;
            let body = if self.check(TokenKind::Record) {
                let (record, raw) = self.with_raw(|p| p.parse_record_type())?;
                self.expect(TokenKind::Semicolon, "';'")?;
                let span = self.span_from(start);
                decls.push(TypeDecl {
                    name,
                    body: TypeDefBody::Record(record),
                    raw,
                    span,
                });
                continue;
            } else {
                let (ty, raw) = self.with_raw(|p| p.parse_type_expr())?;
                self.expect(TokenKind::Semicolon, "';'")?;
                (TypeDefBody::Alias(ty), raw)
            };
            let span = self.span_from(start);
            decls.push(TypeDecl {
                name,
                body: body.0,
                raw: body.1,
                span,
            });
        }
        Ok(decls)
    }

    fn with_raw<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<(T, String), ParseError> {
        let start_offset = self.current.location.offset;
        let value = f(self)?;
        let end_offset = self.current.location.offset;
        let raw = self
            .lexer
            .source()
            .get(start_offset..end_offset)
            .unwrap_or_default()
            .trim()
            .to_owned();
        Ok((value, raw))
    }

    fn parse_var_section(&mut self) -> Result<Vec<VariableDecl>, ParseError> {
        self.advance(); // 'var'
        let mut decls = Vec::new();
        while self.check(TokenKind::Identifier) {
            let start = Span::point(self.current.location);
            let mut names = vec![self.advance().text];
            while self.matches(TokenKind::Comma) {
                names.push(self.expect(TokenKind::Identifier, "a variable name")?.text);
            }
            self.expect(TokenKind::Colon, "':'")?;
            let type_name = self.parse_type_expr()?;
            self.expect(TokenKind::Semicolon, "';'")?;
            let span = self.span_from(start);
            decls.push(VariableDecl {
                names,
                type_name,
                mode: ParamMode::Value,
                span,
            });
        }
        Ok(decls)
    }

    /// `procedure Name(params); [forward|external];` or the same with a
    /// full `begin ... end;` body.
    fn parse_routine(&mut self, in_interface: bool) -> Result<Routine, ParseError> {
        let start = Span::point(self.current.location);
        let is_function = self.check(TokenKind::Function);
        self.advance(); // 'procedure' | 'function'
        let name = self.expect(TokenKind::Identifier, "a routine name")?.text;

        let parameters = if self.check(TokenKind::LParen) {
            self.parse_parameter_list()?
        } else {
            Vec::new()
        };

        let return_type = if is_function {
            self.expect(TokenKind::Colon, "':'")?;
            Some(self.parse_type_expr()?)
        } else {
            None
        };
        self.expect(TokenKind::Semicolon, "';'")?;

        let mut is_forward = false;
        let mut is_external = false;
        loop {
            if self.check(TokenKind::Forward) {
                self.advance();
                self.expect(TokenKind::Semicolon, "';'")?;
                is_forward = true;
                continue;
            }
            if self.check(TokenKind::External) {
                self.advance();
                self.expect(TokenKind::Semicolon, "';'")?;
                is_external = true;
                continue;
            }
            break;
        }

        let body = if in_interface || is_forward || is_external {
            None
        } else if self.check(TokenKind::Begin) || self.declaration_section_follows() {
            let block = self.parse_block(false)?;
            self.expect(TokenKind::Semicolon, "';'")?;
            Some(block)
        } else {
            None
        };

        let span = self.span_from(start);
        Ok(Routine {
            name,
            parameters,
            return_type,
            is_forward,
            is_external,
            body,
            span,
        })
    }

    fn declaration_section_follows(&self) -> bool {
        matches!(
            self.current.kind,
            TokenKind::Const | TokenKind::Label | TokenKind::Type | TokenKind::Var
        )
    }

    fn parse_parameter_list(&mut self) -> Result<Vec<ParameterGroup>, ParseError> {
        self.advance(); // '('
        let mut groups = Vec::new();
        if !self.check(TokenKind::RParen) {
            loop {
                groups.push(self.parse_parameter_group()?);
                if self.matches(TokenKind::Semicolon) {
                    continue;
                }
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'")?;
        Ok(groups)
    }

    fn parse_parameter_group(&mut self) -> Result<ParameterGroup, ParseError> {
        let start = Span::point(self.current.location);
        let mode = if self.matches(TokenKind::Var) {
            ParamMode::Reference
        } else if self.matches(TokenKind::Const) {
            ParamMode::ConstReference
        } else {
            ParamMode::Value
        };
        let mut names = vec![self.expect(TokenKind::Identifier, "a parameter name")?.text];
        while self.matches(TokenKind::Comma) {
            names.push(self.expect(TokenKind::Identifier, "a parameter name")?.text);
        }
        self.expect(TokenKind::Colon, "':'")?;
        let type_name = self.parse_type_expr()?;
        let span = self.span_from(start);
        Ok(ParameterGroup {
            names,
            type_name,
            mode,
            span,
        })
    }
}

/// One `(mode, type)` pair per individual parameter *name*, flattened
/// across parameter groups so a group sharing one type annotation across
/// several names (`a, b: integer`) counts as two parameters, not one.
fn flatten_params(routine: &Routine) -> Vec<(ParamMode, &super::ast::TypeExpr)> {
    let mut out = Vec::new();
    for group in &routine.parameters {
        for _ in &group.names {
            out.push((group.mode, &group.type_name));
        }
    }
    out
}

/// Whether two routine declarations share a signature: same parameter
/// count, modes and type expressions (in order), and the same return
/// type (`None` for both, or equal `TypeExpr`s).
fn signatures_match(a: &Routine, b: &Routine) -> bool {
    flatten_params(a) == flatten_params(b) && a.return_type == b.return_type
}

#[cfg(test)]
mod tests {
    use super::super::ast::*;
    use super::super::parse;

    #[test]
    fn parses_forward_declaration_matched_later() {
        let src = "program P; procedure Foo; forward; procedure Foo; begin end; begin end.";
        let (unit, errors) = parse(src);
        assert!(errors.is_empty(), "{errors:?}");
        let Some(CompilationUnit::Program(program)) = unit else {
            panic!("expected program");
        };
        assert_eq!(program.block.declarations.routines.len(), 2);
    }

    #[test]
    fn forward_declaration_with_mismatched_signature_is_reported() {
        let src = "program P; \
            procedure Foo(x: integer); forward; \
            procedure Foo(x: real); begin end; \
            begin end.";
        let (_unit, errors) = parse(src);
        assert!(!errors.is_empty(), "a mismatched forward signature should be reported");
    }

    #[test]
    fn parses_record_with_variant_part() {
        let src = "program P; type Shape = record \
            kind: integer; \
            case tag: integer of \
              0: (radius: real); \
              1: (width: real; height: real) \
            end; begin end.";
        let (unit, errors) = parse(src);
        assert!(errors.is_empty(), "{errors:?}");
        let Some(CompilationUnit::Program(program)) = unit else {
            panic!("expected program");
        };
        let TypeDefBody::Record(record) = &program.block.declarations.types[0].body else {
            panic!("expected record type");
        };
        assert_eq!(record.fields.len(), 1);
        let variant = record.variant.as_ref().expect("variant part");
        assert_eq!(variant.cases.len(), 2);
    }

    #[test]
    fn parses_function_with_params_and_return_type() {
        let src = "program P; function sq(n: integer): integer; begin sq := n * n end; \
            begin end.";
        let (unit, errors) = parse(src);
        assert!(errors.is_empty(), "{errors:?}");
        let Some(CompilationUnit::Program(program)) = unit else {
            panic!("expected program");
        };
        let routine = &program.block.declarations.routines[0];
        assert!(routine.return_type.is_some());
        assert!(routine.body.is_some());
    }

    #[test]
    fn parses_var_parameter_mode() {
        let src = "program P; procedure Swap(var a, b: integer); begin end; begin end.";
        let (unit, errors) = parse(src);
        assert!(errors.is_empty(), "{errors:?}");
        let Some(CompilationUnit::Program(program)) = unit else {
            panic!("expected program");
        };
        let routine = &program.block.declarations.routines[0];
        assert_eq!(routine.parameters[0].mode, ParamMode::Reference);
        assert_eq!(routine.parameters[0].names, vec!["a", "b"]);
    }
}
