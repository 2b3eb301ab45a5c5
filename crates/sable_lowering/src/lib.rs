//! sable_lowering: Structured bound tree to flat label/goto form.
//!
//! Lowering runs once per method body. It desugars `if`, `while` and `for`
//! into labels and jumps, folds operators over literal operands, turns jumps
//! on constant conditions into plain gotos or nothing, and promotes locals
//! that are never reassigned and start from a literal into constants.
//!
//! The result is a single `Block` whose statements all satisfy
//! [`BoundStatement::is_flat`]. Lowering an already lowered body returns it
//! unchanged.

mod lowerer;
mod usage;

pub use lowerer::Lowerer;
pub use usage::{collect_reassigned, VariableUsage};

use sable_bound::tree::{BoundMethod, BoundStatement};

/// Lower a method body to flat form.
pub fn lower(body: BoundStatement) -> BoundStatement {
    Lowerer::new(&body).lower(body)
}

/// Lower a bound method, keeping its symbol.
pub fn lower_method(method: BoundMethod) -> BoundMethod {
    tracing::debug!(method = %method.symbol.full_name, "lowering method");
    BoundMethod {
        symbol: method.symbol,
        body: lower(method.body),
    }
}
