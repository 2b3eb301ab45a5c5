//! Lowering tests over hand-built bound trees.

use pretty_assertions::assert_eq;
use sable_bound::operators::{bind_binary_operator, bind_prefix_operator};
use sable_bound::*;
use sable_core::text::TextSpan;
use sable_lowering::lower;
use sable_syntax::SyntaxKind;

// ============================================================================
// Helpers
// ============================================================================

fn span() -> TextSpan {
    TextSpan::new(0, 0)
}

fn int(value: i64) -> BoundExpression {
    BoundExpression::literal(span(), ConstantValue::Int(value))
}

fn boolean(value: bool) -> BoundExpression {
    BoundExpression::literal(span(), ConstantValue::Bool(value))
}

fn read(variable: &VariableRef) -> BoundExpression {
    BoundExpression::Variable {
        span: span(),
        variable: variable.clone(),
    }
}

fn binary(left: BoundExpression, kind: SyntaxKind, right: BoundExpression) -> BoundExpression {
    let op = bind_binary_operator(kind, &left.ty(), &right.ty()).unwrap();
    BoundExpression::Binary {
        span: span(),
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

fn pre_increment(variable: &VariableRef) -> BoundExpression {
    let op = bind_prefix_operator(SyntaxKind::PlusPlusToken, &variable.ty).unwrap();
    BoundExpression::Unary {
        span: span(),
        op,
        operand: Box::new(read(variable)),
    }
}

fn declare(variable: &VariableRef, initializer: BoundExpression) -> BoundStatement {
    BoundStatement::VariableDeclaration {
        variable: variable.clone(),
        initializer,
    }
}

/// One line per statement: the statement kind and the label it targets.
fn shape(body: &BoundStatement) -> Vec<String> {
    let BoundStatement::Block { statements } = body else {
        panic!("lowered body must be a block");
    };
    statements
        .iter()
        .map(|s| match s {
            BoundStatement::VariableDeclaration { variable, .. } => format!("decl {}", variable.name),
            BoundStatement::Label { label } => format!("{}:", label.name),
            BoundStatement::Goto { label } => format!("goto {}", label.name),
            BoundStatement::ConditionalGoto {
                label, jump_if_true, ..
            } => format!("goto {} {}", label.name, if *jump_if_true { "if" } else { "unless" }),
            BoundStatement::Return { expression } => match expression {
                Some(e) => format!("return {:?}", e.constant_value()),
                None => "return".to_string(),
            },
            BoundStatement::Expression { .. } => "expr".to_string(),
            other => panic!("unexpected statement in lowered form: {:?}", other),
        })
        .collect()
}

// ============================================================================
// Control flow
// ============================================================================

#[test]
fn test_if_else_lowering() {
    let flag = VariableSymbol::parameter("flag", TypeSymbol::Bool);
    let body = BoundStatement::Block {
        statements: vec![BoundStatement::If {
            condition: read(&flag),
            then_statement: Box::new(BoundStatement::Return { expression: Some(int(1)) }),
            else_statement: Some(Box::new(BoundStatement::Return { expression: Some(int(2)) })),
        }],
    };

    assert_eq!(
        shape(&lower(body)),
        vec![
            "goto Label1 unless",
            "return Some(Int(1))",
            "goto Label2",
            "Label1:",
            "return Some(Int(2))",
            "Label2:",
        ]
    );
}

#[test]
fn test_while_lowering_uses_bound_labels() {
    let flag = VariableSymbol::parameter("flag", TypeSymbol::Bool);
    let body = BoundStatement::Block {
        statements: vec![BoundStatement::While {
            condition: read(&flag),
            body: Box::new(BoundStatement::Goto {
                label: LabelSymbol::new("continue1"),
            }),
            break_label: LabelSymbol::new("break1"),
            continue_label: LabelSymbol::new("continue1"),
        }],
    };

    assert_eq!(
        shape(&lower(body)),
        vec![
            "goto Label2",
            "Label1:",
            "goto continue1",
            "continue1:",
            "Label2:",
            "goto break1 unless",
            "goto Label1",
            "break1:",
        ]
    );
}

#[test]
fn test_constant_true_loop_has_no_conditional_jump() {
    let body = BoundStatement::Block {
        statements: vec![BoundStatement::While {
            condition: boolean(true),
            body: Box::new(BoundStatement::Return { expression: Some(int(0)) }),
            break_label: LabelSymbol::new("break1"),
            continue_label: LabelSymbol::new("continue1"),
        }],
    };

    let lowered = lower(body);
    assert!(shape(&lowered).iter().all(|line| !line.ends_with("unless")));
}

#[test]
fn test_for_without_condition_jumps_back_unconditionally() {
    let body = BoundStatement::Block {
        statements: vec![BoundStatement::For {
            initializer: None,
            condition: None,
            incrementor: None,
            body: Box::new(BoundStatement::Block { statements: vec![] }),
            break_label: LabelSymbol::new("break1"),
            continue_label: LabelSymbol::new("continue1"),
        }],
    };

    assert_eq!(
        shape(&lower(body)),
        vec!["goto Label2", "Label1:", "continue1:", "Label2:", "goto Label1", "break1:"]
    );
}

#[test]
fn test_lowering_is_idempotent() {
    let a = VariableSymbol::local("a", false, TypeSymbol::Int);
    let i = VariableSymbol::local("i", false, TypeSymbol::Int);
    let body = BoundStatement::Block {
        statements: vec![
            declare(&a, int(0)),
            BoundStatement::For {
                initializer: Some(Box::new(declare(&i, int(0)))),
                condition: Some(binary(read(&i), SyntaxKind::LessThanEqualsToken, int(10))),
                incrementor: Some(pre_increment(&i)),
                body: Box::new(BoundStatement::Expression {
                    expression: BoundExpression::Assignment {
                        span: span(),
                        variable: a.clone(),
                        value: Box::new(binary(read(&a), SyntaxKind::PlusToken, read(&i))),
                    },
                }),
                break_label: LabelSymbol::new("break1"),
                continue_label: LabelSymbol::new("continue1"),
            },
        ],
    };

    let once = lower(body);
    let BoundStatement::Block { statements } = &once else {
        panic!("lowered body must be a block");
    };
    assert!(statements.iter().all(BoundStatement::is_flat));
    let twice = lower(once.clone());
    assert_eq!(twice, once);
}

// ============================================================================
// Constants
// ============================================================================

#[test]
fn test_never_reassigned_literal_locals_become_constants() {
    let x = VariableSymbol::local("x", false, TypeSymbol::Int);
    let y = VariableSymbol::local("y", false, TypeSymbol::Int);
    let body = BoundStatement::Block {
        statements: vec![
            declare(&x, int(2)),
            declare(&y, binary(read(&x), SyntaxKind::AsteriskToken, int(3))),
            BoundStatement::Return {
                expression: Some(read(&y)),
            },
        ],
    };

    let lowered = lower(body);
    assert_eq!(shape(&lowered), vec!["decl x", "decl y", "return Some(Int(6))"]);
    let BoundStatement::Block { statements } = &lowered else {
        unreachable!()
    };
    let BoundStatement::VariableDeclaration { variable, .. } = &statements[1] else {
        panic!("expected a declaration");
    };
    assert_eq!(variable.constant_value(), Some(&ConstantValue::Int(6)));
    assert_ne!(variable.id, y.id);
}

#[test]
fn test_incremented_locals_stay_variables() {
    let a = VariableSymbol::local("a", false, TypeSymbol::Int);
    let body = BoundStatement::Block {
        statements: vec![
            declare(&a, int(11)),
            BoundStatement::Expression {
                expression: pre_increment(&a),
            },
            BoundStatement::Return {
                expression: Some(read(&a)),
            },
        ],
    };

    let lowered = lower(body);
    let BoundStatement::Block { statements } = &lowered else {
        unreachable!()
    };
    assert_eq!(statements[0], declare(&a, int(11)));
    assert_eq!(statements[2], BoundStatement::Return { expression: Some(read(&a)) });
}

#[test]
fn test_read_only_literal_is_promoted_even_when_assigned() {
    let a = VariableSymbol::local("a", true, TypeSymbol::String);
    let body = BoundStatement::Block {
        statements: vec![
            declare(&a, BoundExpression::literal(span(), ConstantValue::from("hi"))),
            BoundStatement::Expression {
                expression: BoundExpression::Assignment {
                    span: span(),
                    variable: a.clone(),
                    value: Box::new(BoundExpression::literal(span(), ConstantValue::from("no"))),
                },
            },
        ],
    };

    let lowered = lower(body);
    let BoundStatement::Block { statements } = &lowered else {
        unreachable!()
    };
    let BoundStatement::VariableDeclaration { variable, .. } = &statements[0] else {
        panic!("expected a declaration");
    };
    assert!(variable.constant_value().is_some());
}

#[test]
fn test_locals_stay_variables_in_bodies_with_labels() {
    let x = VariableSymbol::local("x", false, TypeSymbol::Int);
    let skip = LabelSymbol::new("skip");
    let body = BoundStatement::Block {
        statements: vec![
            BoundStatement::Goto { label: skip.clone() },
            declare(&x, int(5)),
            BoundStatement::Label { label: skip },
            BoundStatement::Return {
                expression: Some(read(&x)),
            },
        ],
    };

    let lowered = lower(body);
    assert_eq!(shape(&lowered), vec!["goto skip", "decl x", "skip:", "return None"]);
    let BoundStatement::Block { statements } = &lowered else {
        unreachable!()
    };
    assert_eq!(statements[1], declare(&x, int(5)));
}
