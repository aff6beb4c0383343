//! Error paths: every rejection carries a location and a readable message,
//! and the first diagnostic stops compilation.

use mcc::{CompileError, Error, Location};

fn compile_err(source: &str) -> Error {
    let sink = |_: Location, _: &str, _: &str| {};
    mcc::compile(source, &sink).expect_err("program should be rejected")
}

fn compile_compile_err(source: &str) -> CompileError {
    match compile_err(source) {
        Error::Compile(e) => e,
        other => panic!("expected a compile error, got {:?}", other),
    }
}

// ============================================================================
// name resolution
// ============================================================================

#[test]
fn undefined_symbol_names_the_identifier() {
    let e = compile_compile_err("int f() { return y; }");
    assert_eq!(e.message, "undefined symbol \"y\"");
    assert_eq!(e.location.line, 1);
}

#[test]
fn undefined_function_call() {
    let e = compile_compile_err("void main() { g(); }");
    assert_eq!(e.message, "function \"g\" is not defined");
}

#[test]
fn calling_a_variable_is_rejected() {
    let e = compile_compile_err("int x; void main() { x(); }");
    assert_eq!(e.message, "symbol \"x\" is not a function");
}

#[test]
fn names_resolve_from_the_declaration_point() {
    // y is declared after the use
    let e = compile_compile_err("void main() { x = 1; int x; }");
    assert_eq!(e.message, "undefined symbol \"x\"");
}

// ============================================================================
// redeclarations
// ============================================================================

#[test]
fn global_redeclaration_errors_at_the_second_site() {
    let e = compile_compile_err("int x;\nint x;");
    assert_eq!(e.message, "redeclaration of global variable \"x\"");
    assert_eq!(e.location.line, 2);
}

#[test]
fn function_redeclaration_is_rejected() {
    let e = compile_compile_err("void f() { }\nvoid f() { }");
    assert_eq!(e.message, "redeclaration of function \"f\"");
    assert_eq!(e.location.line, 2);
}

#[test]
fn builtins_occupy_the_global_namespace() {
    let e = compile_compile_err("void exit() { }");
    assert_eq!(e.message, "redeclaration of function \"exit\"");
}

#[test]
fn local_redeclaration_in_the_same_scope() {
    let e = compile_compile_err("void main() { int x; int x; }");
    assert_eq!(e.message, "redeclaration of local variable \"x\"");
}

#[test]
fn shadowing_in_a_nested_block_is_fine() {
    let sink = |_: Location, _: &str, _: &str| {};
    assert!(mcc::compile("void main() { int x; { int x; x = 1; } }", &sink).is_ok());
}

#[test]
fn duplicate_parameter_names_are_rejected() {
    let e = compile_compile_err("void f(int a, int a) { }");
    assert_eq!(e.message, "redeclaration of function parameter \"a\"");
}

// ============================================================================
// calls and types
// ============================================================================

#[test]
fn argument_count_must_match() {
    let e = compile_compile_err("void f(int a) { } void main() { f(); }");
    assert_eq!(e.message, "incorrect number of arguments");
    let e = compile_compile_err("void f(int a) { } void main() { f(1, 2); }");
    assert_eq!(e.message, "incorrect number of arguments");
}

#[test]
fn argument_element_width_must_match_pointer_parameters() {
    let e = compile_compile_err("int a[4]; void main() { print_string(a); }");
    assert_eq!(e.message, "argument of type char* is not compatible with type int[4]");
}

#[test]
fn char_pointer_accepts_char_arrays() {
    let sink = |_: Location, _: &str, _: &str| {};
    assert!(mcc::compile("char s[8]; void main() { print_string(s); }", &sink).is_ok());
}

#[test]
fn using_a_void_result_is_rejected() {
    let e = compile_compile_err("void f() { } void main() { int x; x = f(); }");
    assert_eq!(e.message, "type of result is \"void\"");
}

#[test]
fn void_call_as_a_statement_is_fine() {
    let sink = |_: Location, _: &str, _: &str| {};
    assert!(mcc::compile("void f() { } void main() { f(); }", &sink).is_ok());
}

// ============================================================================
// arrays
// ============================================================================

#[test]
fn indexing_a_scalar_is_rejected() {
    let e = compile_compile_err("void main() { int x; int y; y = x[0]; }");
    assert_eq!(e.message, "symbol \"x\" of type int is not indexable");
}

#[test]
fn assigning_a_whole_array_is_rejected() {
    let e = compile_compile_err("int a[4]; void main() { a = 0; }");
    assert!(e.message.contains("is not assignable"), "got: {}", e.message);
}

#[test]
fn static_bounds_cover_both_ends() {
    let e = compile_compile_err("void main() { int a[4]; int x; x = a[4]; }");
    assert_eq!(e.message, "array index is out of bounds");
    let e = compile_compile_err("void main() { int a[4]; int x; x = a[0 - 1]; }");
    assert_eq!(e.message, "array index is out of bounds");
}

// ============================================================================
// jumps and returns
// ============================================================================

#[test]
fn break_needs_a_loop_or_switch() {
    let e = compile_compile_err("void main() { break; }");
    assert_eq!(e.message, "no outer loop or switch statement exists");
}

#[test]
fn continue_needs_a_loop() {
    let e = compile_compile_err("void main() { continue; }");
    assert_eq!(e.message, "no outer loop exists");
    // a switch alone does not give continue a target
    let e = compile_compile_err("void main() { int x; switch (x) { case 1: continue; } }");
    assert_eq!(e.message, "no outer loop exists");
}

#[test]
fn break_after_the_loop_is_still_an_error() {
    let e = compile_compile_err("void main() { while (1) { } break; }");
    assert_eq!(e.message, "no outer loop or switch statement exists");
}

#[test]
fn return_type_must_match() {
    let e = compile_compile_err("void f() { return 1; }");
    assert_eq!(e.message, "return value type does not match function return type");
    let e = compile_compile_err("int f() { return; }");
    assert_eq!(e.message, "return value type does not match function return type");
}

// ============================================================================
// syntax errors from construction-time validation
// ============================================================================

#[test]
fn syntax_errors_carry_their_location() {
    let e = compile_err("int x = 2 +;");
    match e {
        Error::Syntax(e) => assert_eq!(e.location.line, 1),
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn oversize_string_initializer() {
    let e = compile_err("char s[2] = \"hi\";");
    match e {
        Error::Syntax(e) => {
            assert_eq!(e.message, "the assigned string literal does not fit in the array")
        }
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn non_constant_global_initializer() {
    let e = compile_err("int y; int x = y;");
    match e {
        Error::Syntax(e) => {
            assert_eq!(e.message, "value assigned to a global variable must be a constant expression")
        }
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn duplicate_case_is_a_syntax_error_at_the_second_case() {
    let e = compile_err("void main() { int x; switch (x) {\ncase 1: break;\ncase 1: break; } }");
    match e {
        Error::Syntax(e) => {
            assert_eq!(e.message, "redeclaration of a case with the same value");
            assert_eq!(e.location.line, 3);
        }
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

#[test]
fn division_by_zero_case_value_is_not_constant() {
    let e = compile_err("void main() { int x; switch (x) { case 1 / 0: break; } }");
    match e {
        Error::Syntax(e) => {
            assert_eq!(e.message, "case value must be a compile-time constant expression")
        }
        other => panic!("expected a syntax error, got {:?}", other),
    }
}
