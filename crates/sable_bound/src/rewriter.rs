//! Bound tree rewriting.
//!
//! `BoundTreeRewriter` walks a bound tree by value and rebuilds it bottom-up.
//! Implementors override the hooks for the node kinds they transform; every
//! default hook rewrites the children and reassembles the same node kind.

use crate::constant::ConstantValue;
use crate::operators::{BoundBinaryOperator, BoundUnaryOperator};
use crate::tree::*;
use crate::types::TypeSymbol;
use sable_core::text::TextSpan;

pub trait BoundTreeRewriter {
    // ========================================================================
    // Statements
    // ========================================================================

    fn rewrite_statement(&mut self, node: BoundStatement) -> BoundStatement {
        match node {
            BoundStatement::Block { statements } => self.rewrite_block(statements),
            BoundStatement::VariableDeclaration { variable, initializer } => {
                self.rewrite_variable_declaration(variable, initializer)
            }
            BoundStatement::If {
                condition,
                then_statement,
                else_statement,
            } => self.rewrite_if(condition, *then_statement, else_statement.map(|s| *s)),
            BoundStatement::While {
                condition,
                body,
                break_label,
                continue_label,
            } => self.rewrite_while(condition, *body, break_label, continue_label),
            BoundStatement::For {
                initializer,
                condition,
                incrementor,
                body,
                break_label,
                continue_label,
            } => self.rewrite_for(
                initializer.map(|s| *s),
                condition,
                incrementor,
                *body,
                break_label,
                continue_label,
            ),
            BoundStatement::ConditionalGoto {
                label,
                condition,
                jump_if_true,
            } => self.rewrite_conditional_goto(label, condition, jump_if_true),
            BoundStatement::Return { expression } => self.rewrite_return(expression),
            BoundStatement::Expression { expression } => self.rewrite_expression_statement(expression),
            node @ (BoundStatement::Label { .. }
            | BoundStatement::Goto { .. }
            | BoundStatement::MethodDeclaration { .. }
            | BoundStatement::NoOp) => node,
        }
    }

    fn rewrite_block(&mut self, statements: Vec<BoundStatement>) -> BoundStatement {
        let statements = statements.into_iter().map(|s| self.rewrite_statement(s)).collect();
        BoundStatement::Block { statements }
    }

    fn rewrite_variable_declaration(&mut self, variable: VariableRef, initializer: BoundExpression) -> BoundStatement {
        let initializer = self.rewrite_expression(initializer);
        BoundStatement::VariableDeclaration { variable, initializer }
    }

    fn rewrite_if(
        &mut self,
        condition: BoundExpression,
        then_statement: BoundStatement,
        else_statement: Option<BoundStatement>,
    ) -> BoundStatement {
        BoundStatement::If {
            condition: self.rewrite_expression(condition),
            then_statement: Box::new(self.rewrite_statement(then_statement)),
            else_statement: else_statement.map(|s| Box::new(self.rewrite_statement(s))),
        }
    }

    fn rewrite_while(
        &mut self,
        condition: BoundExpression,
        body: BoundStatement,
        break_label: LabelRef,
        continue_label: LabelRef,
    ) -> BoundStatement {
        BoundStatement::While {
            condition: self.rewrite_expression(condition),
            body: Box::new(self.rewrite_statement(body)),
            break_label,
            continue_label,
        }
    }

    fn rewrite_for(
        &mut self,
        initializer: Option<BoundStatement>,
        condition: Option<BoundExpression>,
        incrementor: Option<BoundExpression>,
        body: BoundStatement,
        break_label: LabelRef,
        continue_label: LabelRef,
    ) -> BoundStatement {
        BoundStatement::For {
            initializer: initializer.map(|s| Box::new(self.rewrite_statement(s))),
            condition: condition.map(|c| self.rewrite_expression(c)),
            incrementor: incrementor.map(|i| self.rewrite_expression(i)),
            body: Box::new(self.rewrite_statement(body)),
            break_label,
            continue_label,
        }
    }

    fn rewrite_conditional_goto(
        &mut self,
        label: LabelRef,
        condition: BoundExpression,
        jump_if_true: bool,
    ) -> BoundStatement {
        BoundStatement::ConditionalGoto {
            label,
            condition: self.rewrite_expression(condition),
            jump_if_true,
        }
    }

    fn rewrite_return(&mut self, expression: Option<BoundExpression>) -> BoundStatement {
        BoundStatement::Return {
            expression: expression.map(|e| self.rewrite_expression(e)),
        }
    }

    fn rewrite_expression_statement(&mut self, expression: BoundExpression) -> BoundStatement {
        BoundStatement::Expression {
            expression: self.rewrite_expression(expression),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn rewrite_expression(&mut self, node: BoundExpression) -> BoundExpression {
        match node {
            BoundExpression::Literal { span, value } => self.rewrite_literal(span, value),
            BoundExpression::Variable { span, variable } => self.rewrite_variable(span, variable),
            BoundExpression::Assignment { span, variable, value } => self.rewrite_assignment(span, variable, *value),
            BoundExpression::Unary { span, op, operand } => self.rewrite_unary(span, op, *operand),
            BoundExpression::Binary { span, left, op, right } => self.rewrite_binary(span, *left, op, *right),
            BoundExpression::Call { span, method, arguments } => self.rewrite_call(span, method, arguments),
            BoundExpression::ExplicitCast { span, ty, expression } => self.rewrite_cast(span, ty, *expression),
            BoundExpression::ArrayInitialization {
                span,
                ty,
                size,
                initializer,
            } => self.rewrite_array_initialization(span, ty, size.map(|s| *s), initializer),
            node @ BoundExpression::Error { .. } => node,
        }
    }

    fn rewrite_literal(&mut self, span: TextSpan, value: ConstantValue) -> BoundExpression {
        BoundExpression::Literal { span, value }
    }

    fn rewrite_variable(&mut self, span: TextSpan, variable: VariableRef) -> BoundExpression {
        BoundExpression::Variable { span, variable }
    }

    fn rewrite_assignment(&mut self, span: TextSpan, variable: VariableRef, value: BoundExpression) -> BoundExpression {
        BoundExpression::Assignment {
            span,
            variable,
            value: Box::new(self.rewrite_expression(value)),
        }
    }

    fn rewrite_unary(
        &mut self,
        span: TextSpan,
        op: &'static BoundUnaryOperator,
        operand: BoundExpression,
    ) -> BoundExpression {
        BoundExpression::Unary {
            span,
            op,
            operand: Box::new(self.rewrite_expression(operand)),
        }
    }

    fn rewrite_binary(
        &mut self,
        span: TextSpan,
        left: BoundExpression,
        op: &'static BoundBinaryOperator,
        right: BoundExpression,
    ) -> BoundExpression {
        BoundExpression::Binary {
            span,
            left: Box::new(self.rewrite_expression(left)),
            op,
            right: Box::new(self.rewrite_expression(right)),
        }
    }

    fn rewrite_call(&mut self, span: TextSpan, method: MethodRef, arguments: Vec<BoundExpression>) -> BoundExpression {
        BoundExpression::Call {
            span,
            method,
            arguments: arguments.into_iter().map(|a| self.rewrite_expression(a)).collect(),
        }
    }

    fn rewrite_cast(&mut self, span: TextSpan, ty: TypeSymbol, expression: BoundExpression) -> BoundExpression {
        BoundExpression::ExplicitCast {
            span,
            ty,
            expression: Box::new(self.rewrite_expression(expression)),
        }
    }

    fn rewrite_array_initialization(
        &mut self,
        span: TextSpan,
        ty: TypeSymbol,
        size: Option<BoundExpression>,
        initializer: BoundArrayInitializer,
    ) -> BoundExpression {
        let size = size.map(|s| Box::new(self.rewrite_expression(s)));
        let initializer = match initializer {
            BoundArrayInitializer::Items(items) => {
                BoundArrayInitializer::Items(items.into_iter().map(|i| self.rewrite_expression(i)).collect())
            }
            BoundArrayInitializer::Generator { index, body } => BoundArrayInitializer::Generator {
                index,
                body: Box::new(self.rewrite_expression(*body)),
            },
        };
        BoundExpression::ArrayInitialization {
            span,
            ty,
            size,
            initializer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constant::ConstantValue;
    use crate::symbols::VariableSymbol;

    /// Replaces every int literal with zero.
    struct ZeroInts;

    impl BoundTreeRewriter for ZeroInts {
        fn rewrite_literal(&mut self, span: TextSpan, value: ConstantValue) -> BoundExpression {
            match value {
                ConstantValue::Int(_) => BoundExpression::literal(span, ConstantValue::Int(0)),
                other => BoundExpression::literal(span, other),
            }
        }
    }

    #[test]
    fn test_default_hooks_rebuild_children() {
        let span = TextSpan::new(0, 1);
        let x = VariableSymbol::local("x", false, TypeSymbol::Int);
        let body = BoundStatement::Block {
            statements: vec![
                BoundStatement::VariableDeclaration {
                    variable: x.clone(),
                    initializer: BoundExpression::literal(span, ConstantValue::Int(5)),
                },
                BoundStatement::Return {
                    expression: Some(BoundExpression::literal(span, ConstantValue::Bool(true))),
                },
            ],
        };
        let rewritten = ZeroInts.rewrite_statement(body);
        let expected = BoundStatement::Block {
            statements: vec![
                BoundStatement::VariableDeclaration {
                    variable: x,
                    initializer: BoundExpression::literal(span, ConstantValue::Int(0)),
                },
                BoundStatement::Return {
                    expression: Some(BoundExpression::literal(span, ConstantValue::Bool(true))),
                },
            ],
        };
        assert_eq!(rewritten, expected);
    }
}
