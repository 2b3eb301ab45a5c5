//! Compilation integration tests: diagnostics, printing and graph export.

use pretty_assertions::assert_eq;
use sable_compiler::{graph_file_name, Compilation, CompilationOptions, LoadError};
use std::cell::RefCell;
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;

fn compile(source: &str) -> Compilation {
    Compilation::new(source, CompilationOptions::default())
}

#[test]
fn test_clean_program_has_no_diagnostics() {
    let compilation = compile("int Twice(int n) { return n * 2; } Print(Twice(2));");
    assert!(compilation.diagnostics().is_empty());
    assert_eq!(compilation.program().methods.len(), 2);
    assert_eq!(compilation.bound_methods().len(), 2);
}

#[test]
fn test_parse_diagnostics_come_before_bind_diagnostics() {
    let compilation = compile("var x = ; Foo();");
    let diagnostics = compilation.diagnostics().diagnostics();
    assert!(diagnostics.len() >= 2, "{diagnostics:?}");
    assert!(diagnostics[0].code < 3000, "{diagnostics:?}");
    assert_eq!(
        diagnostics.last().map(|d| d.message_text.as_str()),
        Some("Undefined method 'Foo'.")
    );
}

#[test]
fn test_load_missing_file() {
    let result = Compilation::load(Path::new("/definitely/not/here.sb"), CompilationOptions::default());
    assert!(matches!(result, Err(LoadError::Io(_))));
}

#[test]
fn test_print_program_structured_and_lowered() {
    let compilation = compile("var i = 0; while (i < 3) { i++; }");
    let structured = compilation.print_program(false);
    assert!(structured.contains("while"), "{structured}");
    assert!(!structured.contains("goto"), "{structured}");

    let lowered = compilation.print_program(true);
    assert!(lowered.contains("goto"), "{lowered}");
    assert!(!lowered.contains("while"), "{lowered}");
}

#[test]
fn test_write_control_flow_graphs_one_per_method() {
    let compilation = compile("int Abs(int n) { if (n < 0) return -n; return n; } Print(Abs(-2));");
    let mut names = Vec::new();
    let buffer = Rc::new(RefCell::new(Vec::new()));
    compilation
        .write_control_flow_graphs(|method| {
            names.push(graph_file_name(method));
            Ok(Shared(buffer.clone()))
        })
        .unwrap();
    assert_eq!(names, vec!["script.dot".to_string(), "Abs.dot".to_string()]);

    let text = String::from_utf8(buffer.borrow().clone()).unwrap();
    assert_eq!(text.matches("digraph").count(), 2);
    assert!(text.starts_with("digraph \"<script>\""), "{text}");
    assert!(text.contains("digraph \"Abs\""), "{text}");
}

/// A writer appending to a buffer the test keeps.
struct Shared(Rc<RefCell<Vec<u8>>>);

impl Write for Shared {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
