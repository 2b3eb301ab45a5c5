//! sable_parser: Recursive descent parser for Sable.
//!
//! Parses the scanner's token stream into an arena-allocated syntax tree.

mod parser;
mod precedence;

pub use parser::Parser;
