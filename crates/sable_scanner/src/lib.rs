//! sable_scanner: Lexer for Sable source code.
//!
//! Converts source text into a stream of tokens on demand. Positions are byte
//! offsets into the original text. Lexical errors are collected as diagnostics
//! and scanning always continues.

mod scanner;

pub use scanner::{Scanner, ScannerState};
