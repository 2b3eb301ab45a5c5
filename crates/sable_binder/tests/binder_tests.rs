//! Binder integration tests.
//!
//! Each test parses Sable source, binds it and inspects the diagnostics or the
//! bound program.

use bumpalo::Bump;
use pretty_assertions::assert_eq;
use sable_binder::{bind, BinderOptions, BindingResult};
use sable_bound::tree::BoundProgram;
use sable_bound::types::TypeSymbol;
use sable_core::text::TextSpan;
use sable_parser::Parser;

/// Helper: parse and bind source that is expected to parse cleanly.
fn bind_source(source: &str) -> BindingResult {
    let arena = Bump::new();
    let mut parser = Parser::new(&arena, "test.sb", source);
    let unit = parser.parse_compilation_unit();
    let parse_errors = parser.take_diagnostics();
    assert!(parse_errors.is_empty(), "source: {source}\nerrors: {parse_errors:?}");
    bind(&unit, BinderOptions::default())
}

/// Helper: the diagnostic messages, in report order.
fn messages(source: &str) -> Vec<String> {
    bind_source(source)
        .diagnostics
        .into_iter()
        .map(|d| d.message_text)
        .collect()
}

/// Helper: assert that the source binds without any diagnostic.
fn assert_binds(source: &str) {
    let messages = messages(source);
    assert!(messages.is_empty(), "source: {source}\nerrors: {messages:?}");
}

fn return_type(program: &BoundProgram, full_name: &str) -> TypeSymbol {
    program
        .methods
        .iter()
        .find(|m| &*m.symbol.full_name == full_name)
        .map(|m| m.symbol.return_type.clone())
        .unwrap_or_else(|| panic!("method {full_name} not found"))
}

// ============================================================================
// Scopes
// ============================================================================

#[test]
fn test_shadowing_in_nested_block() {
    assert_binds(r#"var x = 1; { var x = "a"; Print(x); } Print(x);"#);
}

#[test]
fn test_duplicate_variable_reports_second_name() {
    let source = "var x = 1; var x = 2;";
    let result = bind_source(source);
    let diagnostics = result.diagnostics.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message_text, "Variable 'x' is already declared.");
    let second = source.rfind('x').unwrap() as u32;
    assert_eq!(diagnostics[0].span, Some(TextSpan::new(second, 1)));
}

#[test]
fn test_method_body_does_not_see_script_variables() {
    assert_eq!(
        messages("var x = 1; void F() { Print(x); } F();"),
        vec!["Undefined variable 'x'."]
    );
}

#[test]
fn test_read_only_assignment_reports_assignment_span() {
    let source = "set a = 0; a = 1;";
    let result = bind_source(source);
    let diagnostics = result.diagnostics.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].message_text, "Variable 'a' is read-only and cannot be modified.");
    let start = source.find("a = 1").unwrap() as u32;
    assert_eq!(diagnostics[0].span, Some(TextSpan::new(start, 5)));
}

#[test]
fn test_increment_requires_mutable_variable() {
    assert_eq!(
        messages("set a = 1; a++; 5++;"),
        vec![
            "Variable 'a' is read-only and cannot be modified.",
            "The operand of an increment or decrement operator must be a variable.",
        ]
    );
}

// ============================================================================
// Methods
// ============================================================================

#[test]
fn test_forward_reference() {
    assert_binds("void Main() { Print(Twice(2)); } int Twice(int n) { return n * 2; }");
}

#[test]
fn test_implicit_return_type_follows_forward_reference() {
    let result = bind_source("var A() { return B() + 1; } var B() { return 2.5; }");
    assert!(result.diagnostics.is_empty());
    assert_eq!(return_type(&result.program, "A"), TypeSymbol::Float);
    assert_eq!(return_type(&result.program, "B"), TypeSymbol::Float);
}

#[test]
fn test_implicit_return_type_without_returns_is_void() {
    let result = bind_source(r#"var Greet() { Print("hi"); }"#);
    assert!(result.diagnostics.is_empty());
    assert_eq!(return_type(&result.program, "Greet"), TypeSymbol::Void);
}

#[test]
fn test_recursive_method_infers_from_base_case() {
    let result = bind_source("var Fact(int n) { if (n <= 1) return 1; return n * Fact(n - 1); }");
    assert_eq!(return_type(&result.program, "Fact"), TypeSymbol::Int);
}

#[test]
fn test_mutual_recursion_cannot_be_inferred() {
    assert_eq!(
        messages("var A() { return B(); } var B() { return A(); }"),
        vec![
            "The return type of 'A' cannot be inferred.",
            "The return type of 'B' cannot be inferred.",
        ]
    );
}

#[test]
fn test_not_all_paths_return() {
    assert_eq!(
        messages("int F(bool b) { if (b) return 1; }"),
        vec!["Not all code paths return a value."]
    );
    assert_binds("int F(bool b) { if (b) return 1; else return 2; }");
    assert_binds("int F() { while (true) { } }");
}

#[test]
fn test_return_value_in_void_method() {
    assert_eq!(
        messages("void F() { return 1; }"),
        vec!["Since 'F' returns void, a return keyword must not be followed by an expression."]
    );
    assert_eq!(messages("int F() { return; }"), vec!["An expression of type 'int' is expected."]);
}

#[test]
fn test_overloads_and_duplicates() {
    assert_binds(r#"void F(int a) { } void F(string a) { } F(1); F("x");"#);
    assert_eq!(
        messages("void F(int a) { } void F(int b) { }"),
        vec!["Method 'F' is already declared."]
    );
    assert_eq!(
        messages("void F(int a, int a) { }"),
        vec!["Parameter 'a' is already declared."]
    );
}

#[test]
fn test_argument_count() {
    assert_eq!(
        messages("int Add(int a, int b) { return a + b; } Add(1);"),
        vec!["Method 'Add' requires 2 arguments but was given 1."]
    );
}

#[test]
fn test_undefined_method_reported_once() {
    assert_eq!(messages("Foo(); Foo();"), vec!["Undefined method 'Foo'."]);
}

#[test]
fn test_local_methods() {
    assert_binds("void Main() { int Square(int n) { return n * n; } Print(Square(3)); }");
    assert_eq!(
        messages("void Main() { int Square(int n) { return n * n; } } Square(2);"),
        vec![
            "A program cannot contain both top-level statements and a 'Main' method.",
            "Undefined method 'Square'.",
        ]
    );
}

#[test]
fn test_pipe_fills_placeholder() {
    assert_binds("int Sub(int a, int b) { return a - b; } var r = 3 |> Sub(10, _);");
    assert_binds("int Sub(int a, int b) { return a - b; } var r = 3 |> Sub(10);");
    assert_eq!(
        messages("int Sub(int a, int b) { return a - b; } var r = 3 |> Sub(10, 1);"),
        vec!["Method 'Sub' requires 2 arguments but was given 3."]
    );
    assert_eq!(
        messages("Print(_);"),
        vec!["The placeholder '_' can only be used as an argument of a piped call."]
    );
}

#[test]
fn test_main_signature() {
    assert_binds("void Main() { }");
    assert_eq!(
        messages("int Main() { return 0; }"),
        vec!["'Main' must be a void method without parameters."]
    );
    assert_eq!(
        messages("void Main() { } Print(1);"),
        vec!["A program cannot contain both top-level statements and a 'Main' method."]
    );
}

// ============================================================================
// Namespaces
// ============================================================================

#[test]
fn test_ambiguous_call_across_includes() {
    let source = "
        namespace A { void F() { } }
        namespace B { void F() { } }
        with A;
        with B;
        F();
    ";
    assert_eq!(
        messages(source),
        vec!["The call to 'F' is ambiguous between: 'A.F', 'B.F'."]
    );
}

#[test]
fn test_qualified_and_aliased_calls() {
    let source = "
        namespace Math.Ops { int Twice(int n) { return n * 2; } }
        with M = Math.Ops;
        Print(Math.Ops.Twice(1));
        Print(M.Twice(2));
        with Math.Ops { Print(Twice(3)); }
    ";
    assert_binds(source);
}

#[test]
fn test_namespace_rules() {
    assert_eq!(
        messages("namespace A { Print(1); }"),
        vec!["Only method, namespace and with declarations are allowed directly inside a namespace."]
    );
    assert_eq!(
        messages("void F() { namespace A { } }"),
        vec!["A namespace cannot be declared inside a method."]
    );
    assert_eq!(messages("with Missing;"), vec!["Undefined namespace 'Missing'."]);
}

// ============================================================================
// Statements and expressions
// ============================================================================

#[test]
fn test_loop_control_outside_loop() {
    assert_eq!(
        messages("break; continue;"),
        vec![
            "'break' can only be used inside a loop.",
            "'continue' can only be used inside a loop.",
        ]
    );
    assert_binds("while (true) { if (false) continue; break; }");
}

#[test]
fn test_labels() {
    assert_binds("goto end; Print(1); end: Print(2);");
    assert_eq!(messages("goto nowhere;"), vec!["Undefined label 'nowhere'."]);
    assert_eq!(messages("a: a:"), vec!["Label 'a' is already declared."]);
}

#[test]
fn test_conversions() {
    assert_binds("float f = 1; object o = f; string s = 'c'; int i = (int)2.5;");
    assert_eq!(
        messages("int i = 2.5;"),
        vec!["Cannot implicitly convert type 'float' to 'int'. An explicit conversion exists (are you missing a cast?)"]
    );
    assert_eq!(messages("bool b = 1;"), vec!["Cannot convert type 'int' to 'bool'."]);
    assert_eq!(messages("Print(Print(1));"), vec!["Expression must have a value."]);
    assert_eq!(
        messages("var v = Print(1);"),
        vec!["Cannot assign void to an implicitly-typed variable."]
    );
}

#[test]
fn test_operator_errors_do_not_cascade() {
    assert_eq!(
        messages("var x = true + 1; var y = x * 2;"),
        vec!["Binary operator '+' is not defined for types 'bool' and 'int'."]
    );
}

#[test]
fn test_arrays() {
    assert_binds("int[] a = new int[3] { 1, 2, 3 }; var b = new[] { 1, 2 }; var c = new int[4] { i => i * i };");
    assert_eq!(
        messages("var a = new int[2] { 1, 2, 3 };"),
        vec!["Array size 2 does not match the number of initializer elements 3."]
    );
    assert_eq!(
        messages("var a = new int[] { i => i };"),
        vec!["An array generator requires an explicit size."]
    );
}

#[test]
fn test_program_lists_script_first() {
    let result = bind_source("int F() { return 1; } Print(F());");
    let names: Vec<&str> = result.program.methods.iter().map(|m| &*m.symbol.full_name).collect();
    assert_eq!(names, vec!["<script>", "F"]);
    assert!(result.program.entry_point.as_ref().is_some_and(|m| m.is_script()));
    assert!(result
        .program
        .methods
        .iter()
        .all(|m| m.statements().iter().all(|s| s.is_flat())));
}

#[test]
fn test_parallel_lowering_matches_sequential() {
    let source = "int F(int n) { for (var i = 0; i < n; i++) { } return n; } var G() { return F(2); } Print(G());";
    let arena = Bump::new();
    let mut parser = Parser::new(&arena, "test.sb", source);
    let unit = parser.parse_compilation_unit();
    let sequential = bind(&unit, BinderOptions::default());
    let parallel = bind(&unit, BinderOptions { parallel_lowering: true });
    assert!(sequential.diagnostics.is_empty());
    assert_eq!(sequential.program.methods.len(), parallel.program.methods.len());
    for (a, b) in sequential.program.methods.iter().zip(&parallel.program.methods) {
        assert_eq!(a.symbol.full_name, b.symbol.full_name);
        assert_eq!(a.statements().len(), b.statements().len());
    }
}
