//! Runtime faults.

use sable_bound::folding::OperatorError;
use sable_bound::types::TypeSymbol;
use thiserror::Error;

/// A fault raised while a program runs. Evaluation stops at the first one.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Attempted to divide by zero.")]
    DivideByZero,
    #[error("Index {0} is out of range.")]
    IndexOutOfRange(i64),
    #[error("Cannot convert '{value}' to '{ty}'.")]
    InvalidConversion { value: String, ty: TypeSymbol },
    #[error("Could not read file '{path}': {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Console I/O failed: {0}")]
    Console(#[from] std::io::Error),
    #[error("Operator '{0}' cannot be applied to these operands.")]
    InvalidOperands(&'static str),
}

impl From<OperatorError> for RuntimeError {
    fn from(error: OperatorError) -> Self {
        match error {
            OperatorError::DivideByZero => RuntimeError::DivideByZero,
            OperatorError::InvalidConversion { value, ty } => RuntimeError::InvalidConversion { value, ty },
            OperatorError::OperandMismatch(operator) => RuntimeError::InvalidOperands(operator),
        }
    }
}
