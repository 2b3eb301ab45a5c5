//! Static operator tables.
//!
//! Each entry maps a syntax operator and operand type(s) to an operator kind
//! and result type. The binder resolves operators by scanning these tables;
//! bound nodes keep a `&'static` reference to the matching entry.

use crate::types::TypeSymbol;
use sable_syntax::SyntaxKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundUnaryOperatorKind {
    Identity,
    Negation,
    LogicalNegation,
    OnesComplement,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl BoundUnaryOperatorKind {
    /// Whether the operator writes back to its operand.
    pub fn is_increment_or_decrement(self) -> bool {
        matches!(
            self,
            Self::PreIncrement | Self::PreDecrement | Self::PostIncrement | Self::PostDecrement
        )
    }

    pub fn is_postfix(self) -> bool {
        matches!(self, Self::PostIncrement | Self::PostDecrement)
    }
}

#[derive(Debug, PartialEq)]
pub struct BoundUnaryOperator {
    pub syntax_kind: SyntaxKind,
    pub kind: BoundUnaryOperatorKind,
    pub operand_type: TypeSymbol,
    pub result_type: TypeSymbol,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundBinaryOperatorKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulo,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    ShiftLeft,
    ShiftRight,
    LogicalAnd,
    LogicalOr,
    Equals,
    NotEquals,
    Less,
    LessOrEquals,
    Greater,
    GreaterOrEquals,
}

#[derive(Debug, PartialEq)]
pub struct BoundBinaryOperator {
    pub syntax_kind: SyntaxKind,
    pub kind: BoundBinaryOperatorKind,
    pub left_type: TypeSymbol,
    pub right_type: TypeSymbol,
    pub result_type: TypeSymbol,
}

impl BoundUnaryOperator {
    /// Operator text as written in source.
    pub fn text(&self) -> &'static str {
        self.syntax_kind.punctuation_text().unwrap_or("?")
    }
}

impl BoundBinaryOperator {
    pub fn text(&self) -> &'static str {
        self.syntax_kind.punctuation_text().unwrap_or("?")
    }
}

macro_rules! unary {
    ($syntax:ident, $kind:ident, $ty:ident) => {
        unary!($syntax, $kind, $ty, $ty)
    };
    ($syntax:ident, $kind:ident, $operand:ident, $result:ident) => {
        BoundUnaryOperator {
            syntax_kind: SyntaxKind::$syntax,
            kind: BoundUnaryOperatorKind::$kind,
            operand_type: TypeSymbol::$operand,
            result_type: TypeSymbol::$result,
        }
    };
}

macro_rules! binary {
    ($syntax:ident, $kind:ident, $ty:ident) => {
        binary!($syntax, $kind, $ty, $ty, $ty)
    };
    ($syntax:ident, $kind:ident, $operands:ident => $result:ident) => {
        binary!($syntax, $kind, $operands, $operands, $result)
    };
    ($syntax:ident, $kind:ident, $left:ident, $right:ident, $result:ident) => {
        BoundBinaryOperator {
            syntax_kind: SyntaxKind::$syntax,
            kind: BoundBinaryOperatorKind::$kind,
            left_type: TypeSymbol::$left,
            right_type: TypeSymbol::$right,
            result_type: TypeSymbol::$result,
        }
    };
}

// Prefix and postfix `++`/`--` share syntax kinds; the binder picks the table.
static PREFIX_OPERATORS: [BoundUnaryOperator; 10] = [
    unary!(PlusToken, Identity, Int),
    unary!(PlusToken, Identity, Float),
    unary!(MinusToken, Negation, Int),
    unary!(MinusToken, Negation, Float),
    unary!(ExclamationToken, LogicalNegation, Bool),
    unary!(TildeToken, OnesComplement, Int),
    unary!(PlusPlusToken, PreIncrement, Int),
    unary!(PlusPlusToken, PreIncrement, Float),
    unary!(MinusMinusToken, PreDecrement, Int),
    unary!(MinusMinusToken, PreDecrement, Float),
];

static POSTFIX_OPERATORS: [BoundUnaryOperator; 4] = [
    unary!(PlusPlusToken, PostIncrement, Int),
    unary!(PlusPlusToken, PostIncrement, Float),
    unary!(MinusMinusToken, PostDecrement, Int),
    unary!(MinusMinusToken, PostDecrement, Float),
];

static BINARY_OPERATORS: [BoundBinaryOperator; 57] = [
    // Arithmetic
    binary!(PlusToken, Addition, Int),
    binary!(PlusToken, Addition, Float),
    binary!(PlusToken, Addition, Int, Float, Float),
    binary!(PlusToken, Addition, Float, Int, Float),
    binary!(MinusToken, Subtraction, Int),
    binary!(MinusToken, Subtraction, Float),
    binary!(MinusToken, Subtraction, Int, Float, Float),
    binary!(MinusToken, Subtraction, Float, Int, Float),
    binary!(AsteriskToken, Multiplication, Int),
    binary!(AsteriskToken, Multiplication, Float),
    binary!(AsteriskToken, Multiplication, Int, Float, Float),
    binary!(AsteriskToken, Multiplication, Float, Int, Float),
    binary!(SlashToken, Division, Int),
    binary!(SlashToken, Division, Float),
    binary!(SlashToken, Division, Int, Float, Float),
    binary!(SlashToken, Division, Float, Int, Float),
    binary!(PercentToken, Modulo, Int),
    binary!(PercentToken, Modulo, Float),
    binary!(PercentToken, Modulo, Int, Float, Float),
    binary!(PercentToken, Modulo, Float, Int, Float),
    // Concatenation
    binary!(PlusToken, Addition, String),
    binary!(PlusToken, Addition, String, Char, String),
    binary!(PlusToken, Addition, Char, String, String),
    // Bitwise and logical
    binary!(AmpersandToken, BitwiseAnd, Int),
    binary!(AmpersandToken, BitwiseAnd, Bool),
    binary!(BarToken, BitwiseOr, Int),
    binary!(BarToken, BitwiseOr, Bool),
    binary!(CaretToken, BitwiseXor, Int),
    binary!(CaretToken, BitwiseXor, Bool),
    binary!(LessThanLessThanToken, ShiftLeft, Int),
    binary!(GreaterThanGreaterThanToken, ShiftRight, Int),
    binary!(AmpersandAmpersandToken, LogicalAnd, Bool),
    binary!(BarBarToken, LogicalOr, Bool),
    // Equality
    binary!(EqualsEqualsToken, Equals, Bool => Bool),
    binary!(EqualsEqualsToken, Equals, Int => Bool),
    binary!(EqualsEqualsToken, Equals, Float => Bool),
    binary!(EqualsEqualsToken, Equals, Char => Bool),
    binary!(EqualsEqualsToken, Equals, String => Bool),
    binary!(EqualsEqualsToken, Equals, Object => Bool),
    binary!(ExclamationEqualsToken, NotEquals, Bool => Bool),
    binary!(ExclamationEqualsToken, NotEquals, Int => Bool),
    binary!(ExclamationEqualsToken, NotEquals, Float => Bool),
    binary!(ExclamationEqualsToken, NotEquals, Char => Bool),
    binary!(ExclamationEqualsToken, NotEquals, String => Bool),
    binary!(ExclamationEqualsToken, NotEquals, Object => Bool),
    // Relational
    binary!(LessThanToken, Less, Int => Bool),
    binary!(LessThanToken, Less, Float => Bool),
    binary!(LessThanToken, Less, Char => Bool),
    binary!(LessThanEqualsToken, LessOrEquals, Int => Bool),
    binary!(LessThanEqualsToken, LessOrEquals, Float => Bool),
    binary!(LessThanEqualsToken, LessOrEquals, Char => Bool),
    binary!(GreaterThanToken, Greater, Int => Bool),
    binary!(GreaterThanToken, Greater, Float => Bool),
    binary!(GreaterThanToken, Greater, Char => Bool),
    binary!(GreaterThanEqualsToken, GreaterOrEquals, Int => Bool),
    binary!(GreaterThanEqualsToken, GreaterOrEquals, Float => Bool),
    binary!(GreaterThanEqualsToken, GreaterOrEquals, Char => Bool),
];

/// Resolve a prefix operator for an operand type.
pub fn bind_prefix_operator(syntax_kind: SyntaxKind, operand: &TypeSymbol) -> Option<&'static BoundUnaryOperator> {
    PREFIX_OPERATORS
        .iter()
        .find(|op| op.syntax_kind == syntax_kind && &op.operand_type == operand)
}

/// Resolve a postfix operator for an operand type.
pub fn bind_postfix_operator(syntax_kind: SyntaxKind, operand: &TypeSymbol) -> Option<&'static BoundUnaryOperator> {
    POSTFIX_OPERATORS
        .iter()
        .find(|op| op.syntax_kind == syntax_kind && &op.operand_type == operand)
}

/// Resolve a binary operator for a pair of operand types.
pub fn bind_binary_operator(
    syntax_kind: SyntaxKind,
    left: &TypeSymbol,
    right: &TypeSymbol,
) -> Option<&'static BoundBinaryOperator> {
    BINARY_OPERATORS
        .iter()
        .find(|op| op.syntax_kind == syntax_kind && &op.left_type == left && &op.right_type == right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_arithmetic() {
        let op = bind_binary_operator(SyntaxKind::PlusToken, &TypeSymbol::Int, &TypeSymbol::Float).unwrap();
        assert_eq!(op.kind, BoundBinaryOperatorKind::Addition);
        assert_eq!(op.result_type, TypeSymbol::Float);
        assert!(bind_binary_operator(SyntaxKind::PlusToken, &TypeSymbol::Bool, &TypeSymbol::Int).is_none());
    }

    #[test]
    fn test_bind_concatenation_and_comparison() {
        let op = bind_binary_operator(SyntaxKind::PlusToken, &TypeSymbol::Char, &TypeSymbol::String).unwrap();
        assert_eq!(op.result_type, TypeSymbol::String);
        for kind in [
            SyntaxKind::LessThanToken,
            SyntaxKind::LessThanEqualsToken,
            SyntaxKind::GreaterThanToken,
            SyntaxKind::GreaterThanEqualsToken,
        ] {
            for ty in [TypeSymbol::Int, TypeSymbol::Float, TypeSymbol::Char] {
                let op = bind_binary_operator(kind, &ty, &ty).unwrap();
                assert_eq!(op.result_type, TypeSymbol::Bool);
            }
        }
    }

    #[test]
    fn test_bind_unary() {
        let op = bind_prefix_operator(SyntaxKind::ExclamationToken, &TypeSymbol::Bool).unwrap();
        assert_eq!(op.kind, BoundUnaryOperatorKind::LogicalNegation);
        assert!(bind_prefix_operator(SyntaxKind::ExclamationToken, &TypeSymbol::Int).is_none());
        let op = bind_postfix_operator(SyntaxKind::PlusPlusToken, &TypeSymbol::Int).unwrap();
        assert!(op.kind.is_postfix());
        assert!(op.kind.is_increment_or_decrement());
        assert_eq!(op.text(), "++");
    }
}
