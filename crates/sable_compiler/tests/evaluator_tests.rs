//! Evaluation integration tests.
//!
//! End-to-end tests for the pipeline: parse -> bind -> lower -> evaluate.

use pretty_assertions::assert_eq;
use sable_compiler::{Compilation, CompilationOptions};
use sable_evaluator::{EvaluationResult, Value};

/// Helper: compile and evaluate with empty input, returning the result and the printed output.
fn run_with_input(source: &str, input: &str) -> (EvaluationResult, String) {
    let compilation = Compilation::new(source, CompilationOptions::default());
    let mut input = input.as_bytes();
    let mut output = Vec::new();
    let result = compilation.evaluate_with(&mut input, &mut output);
    (result, String::from_utf8(output).unwrap())
}

fn run(source: &str) -> (EvaluationResult, String) {
    run_with_input(source, "")
}

/// Helper: the value of the program, failing on diagnostics.
fn value_of(source: &str) -> Value {
    let (result, _) = run(source);
    match result {
        EvaluationResult::Value { value, .. } => value,
        EvaluationResult::Diagnostics(diagnostics) => panic!("source: {source}\ndiagnostics: {diagnostics:?}"),
    }
}

fn output_of(source: &str) -> String {
    let (result, output) = run(source);
    assert!(result.diagnostics().is_none(), "source: {source}\nresult: {result:?}");
    output
}

fn runtime_error(source: &str) -> String {
    let (result, _) = run(source);
    let diagnostics = result.diagnostics().expect("expected a runtime error");
    assert_eq!(diagnostics.len(), 1);
    diagnostics.diagnostics()[0].message_text.clone()
}

// ============================================================================
// Values
// ============================================================================

#[test]
fn test_postfix_increment_yields_old_value() {
    let (result, _) = run("var a = 11; var result = a++;");
    assert_eq!(result.value(), Some(&Value::Int(11)));
    assert_eq!(result.variable("result"), Some(&Value::Int(11)));
    assert_eq!(result.variable("a"), Some(&Value::Int(12)));
}

#[test]
fn test_prefix_increment_yields_new_value() {
    let (result, _) = run("var a = 11; var result = --a;");
    assert_eq!(result.variable("result"), Some(&Value::Int(10)));
    assert_eq!(result.variable("a"), Some(&Value::Int(10)));
}

#[test]
fn test_arithmetic() {
    assert_eq!(value_of("1 + 2 * 3;"), Value::Int(7));
    assert_eq!(value_of("(1 + 2) * 3;"), Value::Int(9));
    assert_eq!(value_of("7 / 2;"), Value::Int(3));
    assert_eq!(value_of("7 % 3;"), Value::Int(1));
    assert_eq!(value_of("1.5 * 2;"), Value::Float(3.0));
    assert_eq!(value_of(r#""a" + "b";"#), Value::from("ab"));
}

#[test]
fn test_compound_assignment() {
    let (result, _) = run("var x = 10; x += 5; x *= 2; x -= 1;");
    assert_eq!(result.variable("x"), Some(&Value::Int(29)));
}

#[test]
fn test_variables_listed_in_declaration_order() {
    let (result, _) = run("var b = 1; var a = 2; set c = 3;");
    let EvaluationResult::Value { variables, .. } = result else {
        panic!("expected a value");
    };
    let names: Vec<&str> = variables.keys().map(|k| &**k).collect();
    assert_eq!(names, vec!["b", "a", "c"]);
}

#[test]
fn test_logical_operators_short_circuit() {
    let source = r#"
        bool Touch() { Print("touched"); return true; }
        var a = false && Touch();
        var b = true || Touch();
    "#;
    let (result, output) = run(source);
    assert_eq!(result.variable("a"), Some(&Value::Bool(false)));
    assert_eq!(result.variable("b"), Some(&Value::Bool(true)));
    assert_eq!(output, "");
}

#[test]
fn test_explicit_cast() {
    assert_eq!(value_of("(int)2.9;"), Value::Int(2));
    assert_eq!(value_of(r#"(int)"42";"#), Value::Int(42));
    assert_eq!(value_of("(string)12;"), Value::from("12"));
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn test_for_loop_sum() {
    let (result, _) = run("var sum = 0; for (var i = 1; i <= 10; i++) { sum += i; }");
    assert_eq!(result.variable("sum"), Some(&Value::Int(55)));
}

#[test]
fn test_while_with_break_and_continue() {
    let source = "
        var i = 0;
        var odd = 0;
        while (true) {
            i++;
            if (i > 9) break;
            if (i % 2 == 0) continue;
            odd += i;
        }
    ";
    let (result, _) = run(source);
    assert_eq!(result.variable("odd"), Some(&Value::Int(25)));
}

#[test]
fn test_goto_skips_statements() {
    assert_eq!(output_of("goto end; Print(1); end: Print(2);"), "2\n");
}

#[test]
fn test_jump_over_declaration_reads_default() {
    assert_eq!(output_of("goto skip; var x = 5; skip: Print(x);"), "0\n");
    assert_eq!(output_of(r#"goto skip; var s = "set"; skip: Print(Length(s));"#), "0\n");
}

#[test]
fn test_recursion() {
    let source = "int Fib(int n) { if (n < 2) return n; return Fib(n - 1) + Fib(n - 2); } Fib(15);";
    assert_eq!(value_of(source), Value::Int(610));
}

#[test]
fn test_inferred_method_evaluates() {
    assert_eq!(value_of("var Half(float x) { return x / 2; } Half(5);"), Value::Float(2.5));
}

#[test]
fn test_local_method() {
    let source = "
        int Outer(int n) {
            int Square(int k) { return k * k; }
            return Square(n) + 1;
        }
        Outer(4);
    ";
    assert_eq!(value_of(source), Value::Int(17));
}

#[test]
fn test_pipe_call() {
    assert_eq!(value_of("int Sub(int a, int b) { return a - b; } 3 |> Sub(10, _);"), Value::Int(7));
    assert_eq!(value_of("int Sub(int a, int b) { return a - b; } 3 |> Sub(10);"), Value::Int(7));
}

#[test]
fn test_namespace_method() {
    let source = "
        namespace Geometry { int Area(int w, int h) { return w * h; } }
        Geometry.Area(3, 4);
    ";
    assert_eq!(value_of(source), Value::Int(12));
}

#[test]
fn test_main_entry_point() {
    let source = r#"void Main() { Print("from main"); }"#;
    let (result, output) = run(source);
    assert_eq!(result.value(), Some(&Value::Void));
    assert_eq!(output, "from main\n");
}

// ============================================================================
// Console and arrays
// ============================================================================

#[test]
fn test_print_and_write() {
    assert_eq!(output_of(r#"Write("a"); Write(1); Print(true); Print('c');"#), "a1true\nc\n");
}

#[test]
fn test_input_reads_one_line() {
    let (result, output) = run_with_input(r#"var name = Input(); Print("Hi " + name);"#, "Ada\nrest\n");
    assert_eq!(result.variable("name"), Some(&Value::from("Ada")));
    assert_eq!(output, "Hi Ada\n");
}

#[test]
fn test_string_intrinsics() {
    assert_eq!(value_of(r#"Length("hello");"#), Value::Int(5));
    assert_eq!(value_of(r#"CharAt("hello", 1);"#), Value::Char('e'));
}

#[test]
fn test_arrays() {
    assert_eq!(value_of("var a = new int[3] { 4, 5, 6 }; Count(a);"), Value::Int(3));
    assert_eq!(value_of("var a = new int[4] { i => i * i }; (int)ElementAt(a, 3);"), Value::Int(9));
    assert_eq!(value_of("var a = new int[2] { }; (int)ElementAt(a, 1);"), Value::Int(0));
    assert_eq!(output_of("Print(new[] { 1, 2 });"), "[1, 2]\n");
}

#[test]
fn test_generator_index_is_not_a_program_variable() {
    let (result, _) = run("var a = new int[3] { i => i * 2 };");
    let EvaluationResult::Value { variables, .. } = &result else {
        panic!("expected a value");
    };
    let names: Vec<&str> = variables.keys().map(|k| &**k).collect();
    assert_eq!(names, vec!["a"]);
    assert_eq!(result.variable("i"), None);
}

// ============================================================================
// Runtime errors and diagnostics
// ============================================================================

#[test]
fn test_division_by_zero() {
    assert_eq!(runtime_error("var zero = 0; 10 / zero;"), "Attempted to divide by zero.");
    assert_eq!(runtime_error("1 / 0;"), "Attempted to divide by zero.");
}

#[test]
fn test_index_out_of_range() {
    assert_eq!(
        runtime_error("var a = new[] { 1, 2 }; ElementAt(a, 5);"),
        "Index 5 is out of range."
    );
}

#[test]
fn test_output_before_runtime_error_is_kept() {
    let (result, output) = run("Print(1); var zero = 0; Print(1 / zero);");
    assert!(result.diagnostics().is_some());
    assert_eq!(output, "1\n");
}

#[test]
fn test_compile_errors_prevent_evaluation() {
    let (result, output) = run(r#"Print("never"); bool b = "s";"#);
    let diagnostics = result.diagnostics().expect("expected diagnostics");
    assert_eq!(
        diagnostics.diagnostics()[0].message_text,
        "Cannot convert type 'string' to 'bool'."
    );
    assert_eq!(output, "");
}

#[test]
fn test_empty_program() {
    assert_eq!(value_of(""), Value::Void);
}
