//! Variable usage bookkeeping gathered before rewriting.

use rustc_hash::FxHashSet;
use sable_bound::symbols::SymbolId;
use sable_bound::tree::{BoundArrayInitializer, BoundExpression, BoundStatement};

/// Which variables a method body reads and which it writes after declaration.
#[derive(Debug, Default, Clone)]
pub struct VariableUsage {
    pub read: FxHashSet<SymbolId>,
    pub reassigned: FxHashSet<SymbolId>,
    /// The body declares labels, so a `goto` may skip a declaration.
    pub has_labels: bool,
}

impl VariableUsage {
    pub fn collect(body: &BoundStatement) -> Self {
        let mut usage = VariableUsage::default();
        usage.visit_statement(body);
        usage
    }

    pub fn is_reassigned(&self, id: SymbolId) -> bool {
        self.reassigned.contains(&id)
    }

    fn visit_statement(&mut self, statement: &BoundStatement) {
        match statement {
            BoundStatement::Block { statements } => {
                for s in statements {
                    self.visit_statement(s);
                }
            }
            BoundStatement::VariableDeclaration { initializer, .. } => self.visit_expression(initializer),
            BoundStatement::If {
                condition,
                then_statement,
                else_statement,
            } => {
                self.visit_expression(condition);
                self.visit_statement(then_statement);
                if let Some(e) = else_statement {
                    self.visit_statement(e);
                }
            }
            BoundStatement::While { condition, body, .. } => {
                self.visit_expression(condition);
                self.visit_statement(body);
            }
            BoundStatement::For {
                initializer,
                condition,
                incrementor,
                body,
                ..
            } => {
                if let Some(i) = initializer {
                    self.visit_statement(i);
                }
                if let Some(c) = condition {
                    self.visit_expression(c);
                }
                if let Some(i) = incrementor {
                    self.visit_expression(i);
                }
                self.visit_statement(body);
            }
            BoundStatement::ConditionalGoto { condition, .. } => self.visit_expression(condition),
            BoundStatement::Return { expression: Some(e) } => self.visit_expression(e),
            BoundStatement::Expression { expression } => self.visit_expression(expression),
            BoundStatement::Label { .. } => self.has_labels = true,
            BoundStatement::Return { expression: None }
            | BoundStatement::Goto { .. }
            | BoundStatement::MethodDeclaration { .. }
            | BoundStatement::NoOp => {}
        }
    }

    fn visit_expression(&mut self, expression: &BoundExpression) {
        match expression {
            BoundExpression::Variable { variable, .. } => {
                self.read.insert(variable.id);
            }
            BoundExpression::Assignment { variable, value, .. } => {
                self.reassigned.insert(variable.id);
                self.visit_expression(value);
            }
            BoundExpression::Unary { op, operand, .. } => {
                if op.kind.is_increment_or_decrement() {
                    if let BoundExpression::Variable { variable, .. } = operand.as_ref() {
                        self.reassigned.insert(variable.id);
                    }
                }
                self.visit_expression(operand);
            }
            BoundExpression::Binary { left, right, .. } => {
                self.visit_expression(left);
                self.visit_expression(right);
            }
            BoundExpression::Call { arguments, .. } => {
                for a in arguments {
                    self.visit_expression(a);
                }
            }
            BoundExpression::ExplicitCast { expression, .. } => self.visit_expression(expression),
            BoundExpression::ArrayInitialization { size, initializer, .. } => {
                if let Some(size) = size {
                    self.visit_expression(size);
                }
                match initializer {
                    BoundArrayInitializer::Items(items) => {
                        for i in items {
                            self.visit_expression(i);
                        }
                    }
                    BoundArrayInitializer::Generator { body, .. } => self.visit_expression(body),
                }
            }
            BoundExpression::Error { .. } | BoundExpression::Literal { .. } => {}
        }
    }
}

/// Shorthand for the reassignment set alone.
pub fn collect_reassigned(body: &BoundStatement) -> FxHashSet<SymbolId> {
    VariableUsage::collect(body).reassigned
}
