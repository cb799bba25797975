//! Translates a Pascal-dialect source program into equivalent C++17
//! source text, preserving the source language's runtime semantics that
//! don't carry over to the target for free: 1-based strings, subrange
//! arrays, variant records, `var`/`const` parameter modes, set algebra.
pub mod diagnostic;
pub mod emit;
pub mod lexer;
pub mod parser;
pub mod sema;
pub mod span;

use diagnostic::Diagnostics;
use emit::config::Config;
use sema::loader::{NullLoader, UnitLoader};
use sema::Analyzer;

/// Everything a single `compile` call produced: the emitted C++ source
/// (empty when lex/parse errors suppressed emission) and every
/// diagnostic collected across all phases that ran.
pub struct CompileOutput {
    pub source: Option<String>,
    pub diagnostics: Diagnostics,
}

/// Runs the full pipeline — lex, parse, analyze, emit — over a single
/// compilation unit's source text. Lex or parse errors suppress analysis
/// and emission (there's no reliable AST to analyze); semantic errors do
/// not suppress emission, so a caller can still inspect the best-effort
/// translation alongside the reported problems.
pub fn compile(source: &str) -> CompileOutput {
    compile_with_loader(source, &NullLoader, &Config::default())
}

pub fn compile_with_loader(
    source: &str,
    loader: &dyn UnitLoader,
    config: &Config,
) -> CompileOutput {
    let mut diagnostics = Diagnostics::new();

    let (unit, parse_errors, lex_errors) = parser::parse_with_lexer_errors(source);
    for err in &lex_errors {
        diagnostics.push(diagnostic::Diagnostic::error(
            span::Span::point(err.location),
            err.to_string(),
        ));
    }
    for err in &parse_errors {
        diagnostics.push(diagnostic::Diagnostic::error(err.span, err.to_string()));
    }
    if !lex_errors.is_empty() || !parse_errors.is_empty() {
        return CompileOutput {
            source: None,
            diagnostics,
        };
    }

    let Some(unit) = unit else {
        return CompileOutput {
            source: None,
            diagnostics,
        };
    };

    let analyzer = Analyzer::new(loader);
    let analysis = analyzer.analyze(&unit);
    diagnostics.extend(analysis.diagnostics);

    let emitter = emit::Emitter::new(config.clone(), analysis.types, &analysis.symbols);
    let emitted = emitter.emit(&unit);
    diagnostics.extend(emitted.diagnostics);

    CompileOutput {
        source: Some(emitted.source),
        diagnostics,
    }
}
