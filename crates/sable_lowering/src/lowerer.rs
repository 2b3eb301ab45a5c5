use crate::usage::VariableUsage;
use rustc_hash::FxHashMap;
use sable_bound::constant::ConstantValue;
use sable_bound::folding::{fold_binary, fold_cast, fold_unary};
use sable_bound::operators::{BoundBinaryOperator, BoundUnaryOperator};
use sable_bound::rewriter::BoundTreeRewriter;
use sable_bound::symbols::{LabelSymbol, SymbolId, VariableKind, VariableSymbol};
use sable_bound::tree::*;
use sable_bound::types::TypeSymbol;
use sable_core::text::TextSpan;

/// Rewrites one method body into flat form.
pub struct Lowerer {
    label_count: u32,
    usage: VariableUsage,
    /// Locals rebound to constants, keyed by the original symbol.
    promoted: FxHashMap<SymbolId, VariableRef>,
}

impl Lowerer {
    /// Prepare a lowerer for `body`, scanning it for reassigned variables.
    pub fn new(body: &BoundStatement) -> Self {
        Self {
            label_count: 0,
            usage: VariableUsage::collect(body),
            promoted: FxHashMap::default(),
        }
    }

    pub fn lower(mut self, body: BoundStatement) -> BoundStatement {
        let rewritten = self.rewrite_statement(body);
        let mut statements = Vec::new();
        flatten(rewritten, &mut statements);
        tracing::trace!(
            statements = statements.len(),
            labels = self.label_count,
            promoted = self.promoted.len(),
            "lowered body"
        );
        BoundStatement::Block { statements }
    }

    fn generate_label(&mut self) -> LabelRef {
        self.label_count += 1;
        LabelSymbol::new(&format!("Label{}", self.label_count))
    }
}

/// Append the flat statements of `statement` to `out`, dropping markers.
fn flatten(statement: BoundStatement, out: &mut Vec<BoundStatement>) {
    match statement {
        BoundStatement::Block { statements } => {
            for s in statements {
                flatten(s, out);
            }
        }
        BoundStatement::NoOp | BoundStatement::MethodDeclaration { .. } => {}
        s if s.is_flat() => out.push(s),
        s => unreachable!("structured statement survived lowering: {:?}", s),
    }
}

fn block(statements: Vec<BoundStatement>) -> BoundStatement {
    BoundStatement::Block { statements }
}

impl BoundTreeRewriter for Lowerer {
    fn rewrite_variable_declaration(&mut self, variable: VariableRef, initializer: BoundExpression) -> BoundStatement {
        let initializer = self.rewrite_expression(initializer);
        // A skipped declaration must still read as the type default.
        if self.usage.has_labels {
            return BoundStatement::VariableDeclaration { variable, initializer };
        }
        let promotable = match variable.kind {
            VariableKind::Local { read_only } => read_only || !self.usage.is_reassigned(variable.id),
            VariableKind::Parameter | VariableKind::Constant(_) => false,
        };
        if promotable && variable.ty.is_primitive() {
            if let BoundExpression::Literal { value, .. } = &initializer {
                if value.ty() == variable.ty {
                    let constant = VariableSymbol::constant(&variable.name, value.clone());
                    tracing::trace!(name = %variable.name, value = %value, "promoted local to constant");
                    self.promoted.insert(variable.id, constant.clone());
                    return BoundStatement::VariableDeclaration {
                        variable: constant,
                        initializer,
                    };
                }
            }
        }
        BoundStatement::VariableDeclaration { variable, initializer }
    }

    // if (c) T else E
    //
    //     goto Lelse unless c
    //     T
    //     goto Lend
    // Lelse:
    //     E
    // Lend:
    fn rewrite_if(
        &mut self,
        condition: BoundExpression,
        then_statement: BoundStatement,
        else_statement: Option<BoundStatement>,
    ) -> BoundStatement {
        match else_statement {
            None => {
                let end = self.generate_label();
                let jump = self.rewrite_conditional_goto(end.clone(), condition, false);
                let then_statement = self.rewrite_statement(then_statement);
                block(vec![jump, then_statement, BoundStatement::Label { label: end }])
            }
            Some(else_statement) => {
                let else_label = self.generate_label();
                let end = self.generate_label();
                let jump = self.rewrite_conditional_goto(else_label.clone(), condition, false);
                let then_statement = self.rewrite_statement(then_statement);
                let else_statement = self.rewrite_statement(else_statement);
                block(vec![
                    jump,
                    then_statement,
                    BoundStatement::Goto { label: end.clone() },
                    BoundStatement::Label { label: else_label },
                    else_statement,
                    BoundStatement::Label { label: end },
                ])
            }
        }
    }

    // while (c) body
    //
    //     goto Lcheck
    // Lstart:
    //     body
    // Lcontinue:
    // Lcheck:
    //     goto Lbreak unless c
    //     goto Lstart
    // Lbreak:
    fn rewrite_while(
        &mut self,
        condition: BoundExpression,
        body: BoundStatement,
        break_label: LabelRef,
        continue_label: LabelRef,
    ) -> BoundStatement {
        let start = self.generate_label();
        let check = self.generate_label();
        let body = self.rewrite_statement(body);
        let exit = self.rewrite_conditional_goto(break_label.clone(), condition, false);
        block(vec![
            BoundStatement::Goto { label: check.clone() },
            BoundStatement::Label { label: start.clone() },
            body,
            BoundStatement::Label { label: continue_label },
            BoundStatement::Label { label: check },
            exit,
            BoundStatement::Goto { label: start },
            BoundStatement::Label { label: break_label },
        ])
    }

    // for (init; c; update) body
    //
    //     init
    //     goto Lcheck
    // Lstart:
    //     body
    // Lcontinue:
    //     update
    // Lcheck:
    //     goto Lstart if c
    // Lbreak:
    fn rewrite_for(
        &mut self,
        initializer: Option<BoundStatement>,
        condition: Option<BoundExpression>,
        incrementor: Option<BoundExpression>,
        body: BoundStatement,
        break_label: LabelRef,
        continue_label: LabelRef,
    ) -> BoundStatement {
        let start = self.generate_label();
        let check = self.generate_label();
        let mut statements = Vec::with_capacity(9);
        if let Some(initializer) = initializer {
            statements.push(self.rewrite_statement(initializer));
        }
        statements.push(BoundStatement::Goto { label: check.clone() });
        statements.push(BoundStatement::Label { label: start.clone() });
        statements.push(self.rewrite_statement(body));
        statements.push(BoundStatement::Label { label: continue_label });
        if let Some(incrementor) = incrementor {
            statements.push(self.rewrite_expression_statement(incrementor));
        }
        statements.push(BoundStatement::Label { label: check });
        statements.push(match condition {
            Some(condition) => self.rewrite_conditional_goto(start, condition, true),
            None => BoundStatement::Goto { label: start },
        });
        statements.push(BoundStatement::Label { label: break_label });
        block(statements)
    }

    fn rewrite_conditional_goto(
        &mut self,
        label: LabelRef,
        condition: BoundExpression,
        jump_if_true: bool,
    ) -> BoundStatement {
        let condition = self.rewrite_expression(condition);
        match condition.constant_value() {
            Some(ConstantValue::Bool(value)) if *value == jump_if_true => BoundStatement::Goto { label },
            Some(ConstantValue::Bool(_)) => BoundStatement::NoOp,
            _ => BoundStatement::ConditionalGoto {
                label,
                condition,
                jump_if_true,
            },
        }
    }

    fn rewrite_variable(&mut self, span: TextSpan, variable: VariableRef) -> BoundExpression {
        let variable = self.promoted.get(&variable.id).cloned().unwrap_or(variable);
        match variable.constant_value() {
            Some(value) => BoundExpression::literal(span, value.clone()),
            None => BoundExpression::Variable { span, variable },
        }
    }

    fn rewrite_unary(
        &mut self,
        span: TextSpan,
        op: &'static BoundUnaryOperator,
        operand: BoundExpression,
    ) -> BoundExpression {
        // Increment targets must stay variables.
        let operand = if op.kind.is_increment_or_decrement() {
            operand
        } else {
            self.rewrite_expression(operand)
        };
        if let BoundExpression::Literal { value, .. } = &operand {
            if let Some(folded) = fold_unary(op, value) {
                return BoundExpression::literal(span, folded);
            }
        }
        BoundExpression::Unary {
            span,
            op,
            operand: Box::new(operand),
        }
    }

    fn rewrite_binary(
        &mut self,
        span: TextSpan,
        left: BoundExpression,
        op: &'static BoundBinaryOperator,
        right: BoundExpression,
    ) -> BoundExpression {
        let left = self.rewrite_expression(left);
        let right = self.rewrite_expression(right);
        if let (BoundExpression::Literal { value: l, .. }, BoundExpression::Literal { value: r, .. }) = (&left, &right) {
            if let Some(folded) = fold_binary(op, l, r) {
                return BoundExpression::literal(span, folded);
            }
        }
        BoundExpression::Binary {
            span,
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    fn rewrite_cast(&mut self, span: TextSpan, ty: TypeSymbol, expression: BoundExpression) -> BoundExpression {
        let expression = self.rewrite_expression(expression);
        if let BoundExpression::Literal { value, .. } = &expression {
            if let Some(folded) = fold_cast(value, &ty) {
                return BoundExpression::literal(span, folded);
            }
        }
        BoundExpression::ExplicitCast {
            span,
            ty,
            expression: Box::new(expression),
        }
    }
}
