use crate::span::Span;

use super::scope::SymbolTable;
use super::symbol::Symbol;
use super::types::DataType;

/// Registers every built-in routine the runtime contract (§6) names, at
/// global scope, before the program's own declarations are processed.
/// Each is a plain routine symbol the way a user-declared one would be,
/// so overload resolution and call-site checking treat built-ins
/// uniformly with user code.
pub fn register_builtins(table: &mut SymbolTable) {
    let at = Span::default();
    let mut define = |name: &str, params: Vec<DataType>, ret: DataType, is_function: bool| {
        let sym = Symbol::routine(name, params, ret, is_function, 0, at);
        let _ = table.define_overload(sym, at);
    };

    use DataType::*;

    // I/O. write/writeln/read/readln are variadic in real Pascal; the
    // analyzer special-cases their call sites rather than enforcing a
    // fixed arity here (see `Analyzer::check_call`), so they're
    // registered with an empty parameter list purely as a name anchor.
    for name in ["write", "writeln", "read", "readln"] {
        define(name, vec![], Void, false);
    }

    // String manipulation.
    define("length", vec![Str], Integer, true);
    define("copy", vec![Str, Integer, Integer], Str, true);
    define("pos", vec![Str, Str], Integer, true);
    define("concat", vec![Str, Str], Str, true);
    define("insert", vec![Str, Str, Integer], Void, false);
    define("delete", vec![Str, Integer, Integer], Void, false);
    define("trim", vec![Str], Str, true);
    define("trimleft", vec![Str], Str, true);
    define("trimright", vec![Str], Str, true);
    define("uppercase", vec![Str], Str, true);
    define("lowercase", vec![Str], Str, true);
    define("padleft", vec![Str, Integer], Str, true);
    define("padright", vec![Str, Integer], Str, true);
    define("upcase", vec![Char], Char, true);
    define("str", vec![Integer], Str, true);
    define("val", vec![Str], Integer, true);

    // Math.
    define("abs", vec![Integer], Integer, true);
    define("sqr", vec![Real], Real, true);
    define("sqrt", vec![Real], Real, true);
    define("sin", vec![Real], Real, true);
    define("cos", vec![Real], Real, true);
    define("arctan", vec![Real], Real, true);
    define("ln", vec![Real], Real, true);
    define("exp", vec![Real], Real, true);
    define("trunc", vec![Real], Integer, true);
    define("round", vec![Real], Integer, true);
    define("ord", vec![Char], Integer, true);
    define("chr", vec![Integer], Char, true);
    define("odd", vec![Integer], Boolean, true);

    // Conversion.
    define("inttostr", vec![Integer], Str, true);
    define("floattostr", vec![Real], Str, true);
    define("strtoint", vec![Str], Integer, true);
    define("strtofloat", vec![Str], Real, true);

    // Memory / system.
    define("new", vec![Pointer(Box::new(Unknown))], Void, false);
    define("dispose", vec![Pointer(Box::new(Unknown))], Void, false);
    define("getmem", vec![Pointer(Box::new(Unknown)), Integer], Void, false);
    define("freemem", vec![Pointer(Box::new(Unknown)), Integer], Void, false);
    define("mark", vec![Pointer(Box::new(Unknown))], Void, false);
    define("release", vec![Pointer(Box::new(Unknown))], Void, false);
    define("inc", vec![Integer], Void, false);
    define("dec", vec![Integer], Void, false);
    define("exit", vec![], Void, false);
    define("halt", vec![], Void, false);
    define("random", vec![Integer], Integer, true);
    define("randomize", vec![], Void, false);
    define("paramcount", vec![], Integer, true);
    define("paramstr", vec![Integer], Str, true);

    // File primitives.
    define("assign", vec![FileType(Box::new(None)), Str], Void, false);
    define("reset", vec![FileType(Box::new(None))], Void, false);
    define("rewrite", vec![FileType(Box::new(None))], Void, false);
    define("append", vec![FileType(Box::new(None))], Void, false);
    define("close", vec![FileType(Box::new(None))], Void, false);
    define("eof", vec![FileType(Box::new(None))], Boolean, true);
    define("ioresult", vec![], Integer, true);
    define("blockread", vec![FileType(Box::new(None)), Integer], Integer, true);
    define("blockwrite", vec![FileType(Box::new(None)), Integer], Integer, true);
    define("filepos", vec![FileType(Box::new(None))], Integer, true);
    define("filesize", vec![FileType(Box::new(None))], Integer, true);
    define("seek", vec![FileType(Box::new(None)), Integer], Void, false);
}
