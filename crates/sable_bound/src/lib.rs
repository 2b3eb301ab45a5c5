//! sable_bound: The semantic model shared by the binder, lowering, flow
//! analysis, printer and evaluator.
//!
//! Contains the symbol model, type symbols, constant values, the Bound IR,
//! the static operator tables, conversion classification, constant folding,
//! the intrinsic method table and a tree rewriter.

pub mod constant;
pub mod conversion;
pub mod folding;
pub mod intrinsics;
pub mod operators;
pub mod rewriter;
pub mod symbols;
pub mod tree;
pub mod types;

pub use constant::ConstantValue;
pub use conversion::Conversion;
pub use operators::{BoundBinaryOperator, BoundBinaryOperatorKind, BoundUnaryOperator, BoundUnaryOperatorKind};
pub use rewriter::BoundTreeRewriter;
pub use symbols::*;
pub use tree::*;
pub use types::TypeSymbol;
