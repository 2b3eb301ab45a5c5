//! sable_evaluator: Executes a lowered program.
//!
//! The evaluator walks the flat statement list of each method, jumping by
//! label index. Console I/O goes through caller-supplied reader and writer so
//! output can be captured. Runtime faults stop evaluation and come back as
//! diagnostics, never as panics.

mod error;
mod evaluator;
mod value;

pub use error::RuntimeError;
use evaluator::Evaluator;
pub use value::Value;

use indexmap::IndexMap;
use sable_bound::tree::BoundProgram;
use sable_diagnostics::{messages, Diagnostic, DiagnosticBag};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// The outcome of evaluating a program.
#[derive(Debug)]
pub enum EvaluationResult {
    Value {
        /// The returned value, or for top-level statements the value of the
        /// last expression statement or variable initializer.
        value: Value,
        /// Variables of the entry method, in declaration order.
        variables: IndexMap<Arc<str>, Value>,
    },
    Diagnostics(DiagnosticBag),
}

impl EvaluationResult {
    pub fn value(&self) -> Option<&Value> {
        match self {
            EvaluationResult::Value { value, .. } => Some(value),
            EvaluationResult::Diagnostics(_) => None,
        }
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        match self {
            EvaluationResult::Value { variables, .. } => variables.get(name),
            EvaluationResult::Diagnostics(_) => None,
        }
    }

    pub fn diagnostics(&self) -> Option<&DiagnosticBag> {
        match self {
            EvaluationResult::Diagnostics(diagnostics) => Some(diagnostics),
            EvaluationResult::Value { .. } => None,
        }
    }
}

/// Evaluate a program against the process console.
pub fn evaluate(program: &BoundProgram) -> EvaluationResult {
    let stdin = io::stdin();
    let stdout = io::stdout();
    evaluate_with(program, &mut stdin.lock(), &mut stdout.lock())
}

/// Evaluate a program with the given console.
pub fn evaluate_with(program: &BoundProgram, input: &mut dyn BufRead, output: &mut dyn Write) -> EvaluationResult {
    let Some(entry_point) = &program.entry_point else {
        return EvaluationResult::Value {
            value: Value::Void,
            variables: IndexMap::new(),
        };
    };
    tracing::debug!(entry_point = %entry_point.full_name, "evaluating program");

    let mut evaluator = Evaluator::new(program, input, output);
    match evaluator.run(entry_point) {
        Ok((value, frame)) => {
            let variables = frame
                .declared
                .iter()
                .filter_map(|variable| {
                    frame
                        .get(variable)
                        .map(|value| (variable.name.clone(), value.clone()))
                })
                .collect();
            EvaluationResult::Value { value, variables }
        }
        Err(error) => {
            tracing::debug!(%error, "runtime error");
            let message = error.to_string();
            let mut diagnostics = DiagnosticBag::new();
            diagnostics.add(Diagnostic::new(&messages::RUNTIME_ERROR_0, &[&message]));
            EvaluationResult::Diagnostics(diagnostics)
        }
    }
}
