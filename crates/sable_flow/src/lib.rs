//! sable_flow: Control-flow graphs over lowered method bodies.
//!
//! A lowered body is split into basic blocks at labels and after jumps and
//! returns. Blocks nothing can reach are pruned before any question is asked
//! of the graph. The main question is whether every path that leaves the
//! method does so through a `return`.

mod dot;
mod graph;

pub use graph::{BasicBlock, BasicBlockEdge, BasicBlockId, BasicBlockKind, ControlFlowGraph};

use sable_bound::tree::BoundStatement;

/// Whether every reachable path through a lowered body ends in `return`.
pub fn all_paths_return(body: &BoundStatement) -> bool {
    ControlFlowGraph::create(body).all_paths_return()
}
