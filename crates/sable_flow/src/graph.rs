use rustc_hash::{FxHashMap, FxHashSet};
use sable_bound::symbols::SymbolId;
use sable_bound::tree::{BoundExpression, BoundStatement};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BasicBlockId(pub u32);

impl fmt::Display for BasicBlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "N{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicBlockKind {
    Start,
    End,
    Body,
}

/// A straight-line run of statements with a single entry and a single exit.
#[derive(Debug)]
pub struct BasicBlock<'a> {
    pub id: BasicBlockId,
    pub kind: BasicBlockKind,
    pub statements: Vec<&'a BoundStatement>,
}

impl<'a> BasicBlock<'a> {
    fn new(id: BasicBlockId, kind: BasicBlockKind) -> Self {
        Self {
            id,
            kind,
            statements: Vec::new(),
        }
    }

    pub fn last_statement(&self) -> Option<&'a BoundStatement> {
        self.statements.last().copied()
    }

    fn ends_in_return(&self) -> bool {
        matches!(self.last_statement(), Some(BoundStatement::Return { .. }))
    }
}

/// A transfer of control. Conditional edges carry the condition and the
/// value it must have for the edge to be taken.
#[derive(Debug, Clone)]
pub struct BasicBlockEdge<'a> {
    pub from: BasicBlockId,
    pub to: BasicBlockId,
    pub condition: Option<(&'a BoundExpression, bool)>,
}

#[derive(Debug)]
pub struct ControlFlowGraph<'a> {
    pub start: BasicBlockId,
    pub end: BasicBlockId,
    pub blocks: Vec<BasicBlock<'a>>,
    pub edges: Vec<BasicBlockEdge<'a>>,
}

impl<'a> ControlFlowGraph<'a> {
    /// Build the pruned graph of a lowered body.
    pub fn create(body: &'a BoundStatement) -> Self {
        let statements: &[BoundStatement] = match body {
            BoundStatement::Block { statements } => statements,
            other => std::slice::from_ref(other),
        };
        let mut graph = GraphBuilder::default().build(statements);
        graph.prune();
        tracing::debug!(blocks = graph.blocks.len(), edges = graph.edges.len(), "built control flow graph");
        graph
    }

    pub fn block(&self, id: BasicBlockId) -> Option<&BasicBlock<'a>> {
        self.blocks.iter().find(|b| b.id == id)
    }

    pub fn incoming(&self, id: BasicBlockId) -> impl Iterator<Item = &BasicBlockEdge<'a>> {
        self.edges.iter().filter(move |e| e.to == id)
    }

    pub fn outgoing(&self, id: BasicBlockId) -> impl Iterator<Item = &BasicBlockEdge<'a>> {
        self.edges.iter().filter(move |e| e.from == id)
    }

    /// True when every edge into the end block leaves a block ending in `return`.
    pub fn all_paths_return(&self) -> bool {
        self.incoming(self.end).all(|edge| {
            self.block(edge.from)
                .map(BasicBlock::ends_in_return)
                .unwrap_or(false)
        })
    }

    /// Repeatedly drop body blocks without predecessors, with their outgoing edges.
    fn prune(&mut self) {
        loop {
            let targets: FxHashSet<BasicBlockId> = self.edges.iter().map(|e| e.to).collect();
            let dead: FxHashSet<BasicBlockId> = self
                .blocks
                .iter()
                .filter(|b| b.kind == BasicBlockKind::Body && !targets.contains(&b.id))
                .map(|b| b.id)
                .collect();
            if dead.is_empty() {
                break;
            }
            tracing::trace!(count = dead.len(), "pruning unreachable blocks");
            self.blocks.retain(|b| !dead.contains(&b.id));
            self.edges.retain(|e| !dead.contains(&e.from));
        }
    }
}

// ============================================================================
// Construction
// ============================================================================

#[derive(Default)]
struct GraphBuilder<'a> {
    next_id: u32,
    blocks: Vec<BasicBlock<'a>>,
    current: Vec<&'a BoundStatement>,
}

impl<'a> GraphBuilder<'a> {
    fn allocate(&mut self, kind: BasicBlockKind) -> BasicBlock<'a> {
        let block = BasicBlock::new(BasicBlockId(self.next_id), kind);
        self.next_id += 1;
        block
    }

    fn end_block(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let mut block = self.allocate(BasicBlockKind::Body);
        block.statements = std::mem::take(&mut self.current);
        self.blocks.push(block);
    }

    fn build(mut self, statements: &'a [BoundStatement]) -> ControlFlowGraph<'a> {
        let start = self.allocate(BasicBlockKind::Start);

        for statement in statements {
            match statement {
                BoundStatement::Label { .. } => {
                    self.end_block();
                    self.current.push(statement);
                }
                BoundStatement::Goto { .. } | BoundStatement::ConditionalGoto { .. } | BoundStatement::Return { .. } => {
                    self.current.push(statement);
                    self.end_block();
                }
                BoundStatement::VariableDeclaration { .. } | BoundStatement::Expression { .. } | BoundStatement::NoOp => {
                    self.current.push(statement)
                }
                other => unreachable!("control flow graph over a structured statement: {:?}", other),
            }
        }
        self.end_block();

        let end = self.allocate(BasicBlockKind::End);
        let body = std::mem::take(&mut self.blocks);

        let mut block_of_label: FxHashMap<SymbolId, BasicBlockId> = FxHashMap::default();
        for block in &body {
            if let Some(BoundStatement::Label { label }) = block.statements.first() {
                block_of_label.insert(label.id, block.id);
            }
        }

        let mut edges = Vec::new();
        let connect = |edges: &mut Vec<BasicBlockEdge<'a>>, from, to, condition| {
            edges.push(BasicBlockEdge { from, to, condition });
        };

        connect(&mut edges, start.id, body.first().map_or(end.id, |b| b.id), None);

        for (i, block) in body.iter().enumerate() {
            let next = body.get(i + 1).map_or(end.id, |b| b.id);
            match block.last_statement() {
                Some(BoundStatement::Goto { label }) => {
                    if let Some(&target) = block_of_label.get(&label.id) {
                        connect(&mut edges, block.id, target, None);
                    }
                }
                Some(BoundStatement::ConditionalGoto {
                    label,
                    condition,
                    jump_if_true,
                }) => {
                    if let Some(&target) = block_of_label.get(&label.id) {
                        connect(&mut edges, block.id, target, Some((condition, *jump_if_true)));
                    }
                    connect(&mut edges, block.id, next, Some((condition, !*jump_if_true)));
                }
                Some(BoundStatement::Return { .. }) => connect(&mut edges, block.id, end.id, None),
                _ => connect(&mut edges, block.id, next, None),
            }
        }

        let mut blocks = Vec::with_capacity(body.len() + 2);
        let (start_id, end_id) = (start.id, end.id);
        blocks.push(start);
        blocks.extend(body);
        blocks.push(end);

        ControlFlowGraph {
            start: start_id,
            end: end_id,
            blocks,
            edges,
        }
    }
}
