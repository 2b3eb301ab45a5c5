//! sable_compiler: Compilation orchestration.
//!
//! A `Compilation` parses one source text, binds and lowers it, and keeps the
//! parse and bind diagnostics together. From there it can evaluate the
//! program, print it in structured or lowered form, and export one control
//! flow graph per method.

use bumpalo::Bump;
use sable_binder::{bind, BinderOptions};
use sable_bound::symbols::MethodSymbol;
use sable_bound::tree::{BoundMethod, BoundProgram};
use sable_core::text::LineMap;
use sable_diagnostics::{Diagnostic, DiagnosticBag};
use sable_evaluator::EvaluationResult;
use sable_flow::ControlFlowGraph;
use sable_parser::Parser;
use sable_printer::Printer;
use std::io::{self, BufRead, Write};
use std::path::Path;
use thiserror::Error;

/// Options for a compilation.
#[derive(Debug, Clone)]
pub struct CompilationOptions {
    /// Lower and flow-check methods in parallel.
    pub parallel_lowering: bool,
    /// Name shown in diagnostics.
    pub file_name: String,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            parallel_lowering: true,
            file_name: "<input>".to_string(),
        }
    }
}

/// Failure to read a source file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not read source file: {0}")]
    Io(#[from] io::Error),
}

/// A bound and lowered compilation unit.
#[derive(Debug)]
pub struct Compilation {
    options: CompilationOptions,
    line_map: LineMap,
    program: BoundProgram,
    bound_methods: Vec<BoundMethod>,
    diagnostics: DiagnosticBag,
}

impl Compilation {
    /// Parse, bind and lower source text.
    pub fn new(text: &str, options: CompilationOptions) -> Self {
        let arena = Bump::new();
        let mut parser = Parser::new(&arena, &options.file_name, text);
        let unit = parser.parse_compilation_unit();
        let mut diagnostics = parser.take_diagnostics();

        let result = bind(
            &unit,
            BinderOptions {
                parallel_lowering: options.parallel_lowering,
            },
        );
        diagnostics.extend(result.diagnostics);
        tracing::debug!(
            file = %options.file_name,
            methods = result.program.methods.len(),
            diagnostics = diagnostics.len(),
            "compiled"
        );

        Self {
            line_map: LineMap::new(text),
            options,
            program: result.program,
            bound_methods: result.methods,
            diagnostics,
        }
    }

    /// Read a file and compile it. The file name in the options is replaced by the path.
    pub fn load(path: &Path, options: CompilationOptions) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path)?;
        let options = CompilationOptions {
            file_name: path.display().to_string(),
            ..options
        };
        Ok(Self::new(&text, options))
    }

    pub fn options(&self) -> &CompilationOptions {
        &self.options
    }

    pub fn diagnostics(&self) -> &DiagnosticBag {
        &self.diagnostics
    }

    /// The lowered program.
    pub fn program(&self) -> &BoundProgram {
        &self.program
    }

    /// Methods as bound, before lowering.
    pub fn bound_methods(&self) -> &[BoundMethod] {
        &self.bound_methods
    }

    /// Evaluate against the process console. Does not run when there are diagnostics.
    pub fn evaluate(&self) -> EvaluationResult {
        if !self.diagnostics.is_empty() {
            return EvaluationResult::Diagnostics(self.diagnostics.clone());
        }
        sable_evaluator::evaluate(&self.program)
    }

    /// Evaluate with the given console.
    pub fn evaluate_with(&self, input: &mut dyn BufRead, output: &mut dyn Write) -> EvaluationResult {
        if !self.diagnostics.is_empty() {
            return EvaluationResult::Diagnostics(self.diagnostics.clone());
        }
        sable_evaluator::evaluate_with(&self.program, input, output)
    }

    /// Print every method, either as bound or in lowered form.
    pub fn print_program(&self, lowered: bool) -> String {
        let mut printer = Printer::new();
        if lowered {
            return printer.print_program(&self.program);
        }
        let methods: Vec<String> = self.bound_methods.iter().map(|m| printer.print_method(m)).collect();
        methods.join("\n")
    }

    /// Write the control flow graph of every lowered method. `create` opens the
    /// writer for a method.
    pub fn write_control_flow_graphs<F, W>(&self, mut create: F) -> io::Result<()>
    where
        F: FnMut(&MethodSymbol) -> io::Result<W>,
        W: Write,
    {
        for method in &self.program.methods {
            let graph = ControlFlowGraph::create(&method.body);
            let mut writer = create(&method.symbol)?;
            graph.write_dot(&method.symbol.full_name, &mut writer)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// `file(line,column): error SB3001: message`, with 1-based positions.
    pub fn format_diagnostic(&self, diagnostic: &Diagnostic) -> String {
        let location = match diagnostic.span {
            Some(span) => {
                let position = self.line_map.line_and_column_of(span.start);
                format!("{}({},{})", self.options.file_name, position.line + 1, position.character + 1)
            }
            None => self.options.file_name.clone(),
        };
        format!(
            "{}: {} SB{}: {}",
            location, diagnostic.category, diagnostic.code, diagnostic.message_text
        )
    }
}

/// A file name for a method's graph: the full name without characters that
/// are awkward in paths.
pub fn graph_file_name(method: &MethodSymbol) -> String {
    let name: String = method
        .full_name
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .collect();
    format!("{}.dot", name)
}
