//! sable_syntax: Syntax tree definitions for the Sable language.
//!
//! Defines the `SyntaxKind` enum shared by the scanner and parser, and the
//! arena-allocated syntax tree the parser produces and the binder consumes.

pub mod node;
pub mod syntax_kind;

pub use node::*;
pub use syntax_kind::SyntaxKind;
