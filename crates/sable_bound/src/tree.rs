//! Bound IR: the semantically checked, symbol-resolved tree.
//!
//! Nodes are plain owned trees. Passes that transform the IR build new nodes
//! rather than mutating in place.

use crate::constant::ConstantValue;
use crate::operators::{BoundBinaryOperator, BoundUnaryOperator};
use crate::symbols::{LabelSymbol, MethodSymbol, VariableSymbol};
use crate::types::TypeSymbol;
use sable_core::text::TextSpan;
use std::sync::Arc;

pub type VariableRef = Arc<VariableSymbol>;
pub type MethodRef = Arc<MethodSymbol>;
pub type LabelRef = Arc<LabelSymbol>;

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum BoundStatement {
    Block {
        statements: Vec<BoundStatement>,
    },
    VariableDeclaration {
        variable: VariableRef,
        initializer: BoundExpression,
    },
    If {
        condition: BoundExpression,
        then_statement: Box<BoundStatement>,
        else_statement: Option<Box<BoundStatement>>,
    },
    While {
        condition: BoundExpression,
        body: Box<BoundStatement>,
        break_label: LabelRef,
        continue_label: LabelRef,
    },
    For {
        initializer: Option<Box<BoundStatement>>,
        condition: Option<BoundExpression>,
        incrementor: Option<BoundExpression>,
        body: Box<BoundStatement>,
        break_label: LabelRef,
        continue_label: LabelRef,
    },
    Label {
        label: LabelRef,
    },
    Goto {
        label: LabelRef,
    },
    ConditionalGoto {
        label: LabelRef,
        condition: BoundExpression,
        jump_if_true: bool,
    },
    Return {
        expression: Option<BoundExpression>,
    },
    Expression {
        expression: BoundExpression,
    },
    /// Marks where a method was declared; carries no behavior.
    MethodDeclaration {
        method: MethodRef,
    },
    NoOp,
}

impl BoundStatement {
    /// Whether this node may appear at the top level of a lowered body.
    pub fn is_flat(&self) -> bool {
        matches!(
            self,
            BoundStatement::VariableDeclaration { .. }
                | BoundStatement::Label { .. }
                | BoundStatement::Goto { .. }
                | BoundStatement::ConditionalGoto { .. }
                | BoundStatement::Return { .. }
                | BoundStatement::Expression { .. }
                | BoundStatement::NoOp
        )
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum BoundArrayInitializer {
    Items(Vec<BoundExpression>),
    /// `{ i => body }`; `index` is the int index variable.
    Generator {
        index: VariableRef,
        body: Box<BoundExpression>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BoundExpression {
    /// Stands in for an expression that already produced a diagnostic.
    Error {
        span: TextSpan,
    },
    Literal {
        span: TextSpan,
        value: ConstantValue,
    },
    Variable {
        span: TextSpan,
        variable: VariableRef,
    },
    Assignment {
        span: TextSpan,
        variable: VariableRef,
        value: Box<BoundExpression>,
    },
    Unary {
        span: TextSpan,
        op: &'static BoundUnaryOperator,
        operand: Box<BoundExpression>,
    },
    Binary {
        span: TextSpan,
        left: Box<BoundExpression>,
        op: &'static BoundBinaryOperator,
        right: Box<BoundExpression>,
    },
    Call {
        span: TextSpan,
        method: MethodRef,
        arguments: Vec<BoundExpression>,
    },
    /// An explicit cast, or an implicit conversion inserted by the binder.
    ExplicitCast {
        span: TextSpan,
        ty: TypeSymbol,
        expression: Box<BoundExpression>,
    },
    ArrayInitialization {
        span: TextSpan,
        /// The array type, e.g. `int[]`.
        ty: TypeSymbol,
        size: Option<Box<BoundExpression>>,
        initializer: BoundArrayInitializer,
    },
}

impl BoundExpression {
    pub fn error(span: TextSpan) -> Self {
        BoundExpression::Error { span }
    }

    pub fn literal(span: TextSpan, value: ConstantValue) -> Self {
        BoundExpression::Literal { span, value }
    }

    pub fn span(&self) -> TextSpan {
        match self {
            BoundExpression::Error { span }
            | BoundExpression::Literal { span, .. }
            | BoundExpression::Variable { span, .. }
            | BoundExpression::Assignment { span, .. }
            | BoundExpression::Unary { span, .. }
            | BoundExpression::Binary { span, .. }
            | BoundExpression::Call { span, .. }
            | BoundExpression::ExplicitCast { span, .. }
            | BoundExpression::ArrayInitialization { span, .. } => *span,
        }
    }

    pub fn ty(&self) -> TypeSymbol {
        match self {
            BoundExpression::Error { .. } => TypeSymbol::Error,
            BoundExpression::Literal { value, .. } => value.ty(),
            BoundExpression::Variable { variable, .. } => variable.ty.clone(),
            BoundExpression::Assignment { variable, .. } => variable.ty.clone(),
            BoundExpression::Unary { op, .. } => op.result_type.clone(),
            BoundExpression::Binary { op, .. } => op.result_type.clone(),
            BoundExpression::Call { method, .. } => method.return_type.clone(),
            BoundExpression::ExplicitCast { ty, .. } => ty.clone(),
            BoundExpression::ArrayInitialization { ty, .. } => ty.clone(),
        }
    }

    /// The compile-time value, for literals and reads of constants.
    pub fn constant_value(&self) -> Option<&ConstantValue> {
        match self {
            BoundExpression::Literal { value, .. } => Some(value),
            BoundExpression::Variable { variable, .. } => variable.constant_value(),
            _ => None,
        }
    }
}

// ============================================================================
// Methods and programs
// ============================================================================

/// A method symbol with its bound body.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundMethod {
    pub symbol: MethodRef,
    /// Always a `Block`; flat after lowering.
    pub body: BoundStatement,
}

impl BoundMethod {
    /// The statements of the body block.
    pub fn statements(&self) -> &[BoundStatement] {
        match &self.body {
            BoundStatement::Block { statements } => statements,
            other => std::slice::from_ref(other),
        }
    }
}

/// The complete output of a successful bind: every method, lowered, plus the entry point.
#[derive(Debug, Clone, Default)]
pub struct BoundProgram {
    /// Methods in declaration order; the script method (if any) comes first.
    pub methods: Vec<BoundMethod>,
    pub entry_point: Option<MethodRef>,
}

impl BoundProgram {
    pub fn find_method(&self, method: &MethodSymbol) -> Option<&BoundMethod> {
        self.methods.iter().find(|m| m.symbol.id == method.id)
    }
}
