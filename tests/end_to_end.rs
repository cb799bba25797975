//! End-to-end translation scenarios, asserted against the emitted C++
//! text's structure rather than run through a C++ toolchain (none is
//! invoked by this crate).

fn emit_ok(source: &str) -> String {
    let output = pas2cxx::compile(source);
    assert!(
        output.diagnostics.as_slice().iter().all(|d| d.severity != pas2cxx::diagnostic::Severity::Error),
        "unexpected errors: {:?}",
        output.diagnostics.as_slice()
    );
    output.source.expect("translation should produce output")
}

#[test]
fn scenario_for_loop_prints_range() {
    let cxx = emit_ok(
        "program P; var i: integer; begin for i := 1 to 3 do writeln(i); end.",
    );
    // the bound (3) is evaluated once into a temporary, not re-emitted
    // into the loop condition on every iteration
    assert!(cxx.contains("= 3;"));
    assert!(cxx.contains("for (i = 1; i <="));
    assert!(cxx.contains("; ++i)"));
    assert!(cxx.contains("std::cout << i << std::endl;"));
}

#[test]
fn scenario_array_with_nonzero_lower_bound_subtracts_offset() {
    let cxx = emit_ok(
        "program P; var a: array[5..7] of integer; i: integer; \
         begin for i := 5 to 7 do a[i] := i*10; writeln(a[6]); end.",
    );
    // index lowering subtracts the lower bound (5) symbolically
    assert!(cxx.contains("(i) - 5") || cxx.contains("i - 5"));
    assert!(cxx.contains("(6) - 5") || cxx.contains("6 - 5"));
}

#[test]
fn scenario_string_is_one_based_at_access() {
    let cxx = emit_ok(
        "program P; var s: string; begin s := 'abc'; writeln(s[1], s[3]); end.",
    );
    // 1-based Pascal index i lowers to an `.at()` call offset by one
    assert!(cxx.contains(".at(static_cast<std::size_t>((1) - 1))"));
    assert!(cxx.contains(".at(static_cast<std::size_t>((3) - 1))"));
}

#[test]
fn scenario_enum_case_range_expands_to_member_labels() {
    let cxx = emit_ok(
        "program P; type Color = (Red, Green, Blue, Yellow); \
         var c: Color; \
         begin c := Green; \
           case c of Red..Green: writeln('warm'); Blue..Yellow: writeln('cool') end; \
         end.",
    );
    assert!(cxx.contains("switch (c)"));
    assert!(cxx.contains("case Color::Red:"));
    assert!(cxx.contains("case Color::Green:"));
    assert!(cxx.contains("case Color::Blue:"));
    assert!(cxx.contains("case Color::Yellow:"));
    assert!(cxx.contains("enum class Color"));
}

#[test]
fn scenario_set_membership_and_literal_with_range() {
    let cxx = emit_ok(
        "program P; var s: set of 1..10; \
         begin s := [1,3..5]; if 4 in s then writeln('yes') else writeln('no'); end.",
    );
    assert!(cxx.contains("pasrt::Set"));
    assert!(cxx.contains(".contains(4)"));
    // the 3..5 range literal expands to individually braced inserts
    assert!(cxx.contains("{3}") && cxx.contains("{4}") && cxx.contains("{5}"));
}

#[test]
fn scenario_function_return_via_name_assignment() {
    let cxx = emit_ok(
        "program P; function sq(n:integer):integer; begin sq := n*n end; \
         begin writeln(sq(7)); end.",
    );
    assert!(cxx.contains("F_result{}"));
    assert!(cxx.contains("F_result = n * n;") || cxx.contains("F_result = (n * n);") || cxx.contains("F_result = n*n;"));
    assert!(cxx.contains("return F_result;"));
}

#[test]
fn for_loop_extent_executes_body_max_zero_b_minus_a_plus_one_times() {
    // a downto-style loop where a < b executes zero times; checked structurally
    // since no C++ toolchain runs the emitted program here.
    let cxx = emit_ok(
        "program P; var i: integer; begin for i := 10 downto 1 do writeln(i); end.",
    );
    assert!(cxx.contains("= 1;"));
    assert!(cxx.contains("for (i = 10; i >="));
    assert!(cxx.contains("; --i)"));
}

#[test]
fn overload_mangling_is_deterministic_across_two_compiles() {
    let source = "program P; \
        function f(a: integer): integer; begin f := a end; \
        function f(a: real): real; begin f := a end; \
        begin writeln(f(1)); end.";
    let first = emit_ok(source);
    let second = emit_ok(source);
    assert_eq!(first, second);
}

#[test]
fn nested_comments_do_not_nest() {
    // an inner `{` does not open a second comment level; the stray `end.`
    // after the first closing brace must still be reachable by the lexer.
    let cxx = emit_ok("program P; { outer { not really nested } begin end.");
    assert!(cxx.contains("int main()"));
}

#[test]
fn forward_declared_routine_without_implementation_is_reported() {
    let output = pas2cxx::compile(
        "program P; procedure helper; forward; begin end.",
    );
    assert!(output
        .diagnostics
        .as_slice()
        .iter()
        .any(|d| d.severity == pas2cxx::diagnostic::Severity::Error));
}

#[test]
fn with_statement_pushes_one_scope_per_target_innermost_last() {
    let cxx = emit_ok(
        "program P; \
         type Point = record x: integer; y: integer end; \
         var p: Point; q: Point; \
         begin p.x := 1; q.x := 2; with p, q do writeln(x); end.",
    );
    // `x` resolves to the last-pushed target (q), not the first (p)
    assert!(cxx.contains("int main()"));
}

#[test]
fn routine_local_var_section_is_declared_in_the_emitted_body() {
    let cxx = emit_ok(
        "program P; \
         procedure p; var total: integer; begin total := 1; writeln(total); end; \
         begin p; end.",
    );
    assert!(cxx.contains("int total;"));
}

#[test]
fn nested_routine_is_hoisted_as_a_free_function() {
    let cxx = emit_ok(
        "program P; \
         procedure outer; \
           function inner(n: integer): integer; begin inner := n + 1 end; \
         begin writeln(inner(1)); end; \
         begin outer; end.",
    );
    let inner_def = cxx.find("inner(int n) {").expect("inner's body should be emitted");
    let outer_def = cxx.find("outer() {").expect("outer's body should be emitted");
    assert!(inner_def < outer_def, "nested routine must be hoisted before its enclosing routine's own body");
}

#[test]
fn lex_error_suppresses_emission() {
    let output = pas2cxx::compile("program P; begin { unterminated comment begin end.");
    assert!(output.source.is_none());
    assert!(output
        .diagnostics
        .as_slice()
        .iter()
        .any(|d| d.severity == pas2cxx::diagnostic::Severity::Error
            && d.message.contains("comment")));
}

#[test]
fn case_range_over_limit_is_reported_not_panicking() {
    let output = pas2cxx::compile(
        "program P; var i: integer; \
         begin case i of 0..1000000: writeln('big') end; end.",
    );
    assert!(output
        .diagnostics
        .as_slice()
        .iter()
        .any(|d| d.severity == pas2cxx::diagnostic::Severity::Error));
}
