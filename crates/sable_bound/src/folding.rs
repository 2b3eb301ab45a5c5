//! Operator and conversion semantics on constant values.
//!
//! The same functions fold literal expressions at compile time and execute
//! primitive operators at run time, so both always agree.

use crate::constant::ConstantValue;
use crate::operators::{BoundBinaryOperator, BoundBinaryOperatorKind, BoundUnaryOperator, BoundUnaryOperatorKind};
use crate::types::TypeSymbol;
use std::sync::Arc;
use thiserror::Error;

/// Failure while applying an operator or conversion to values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OperatorError {
    #[error("Attempted to divide by zero.")]
    DivideByZero,
    #[error("Cannot convert '{value}' to '{ty}'.")]
    InvalidConversion { value: String, ty: TypeSymbol },
    #[error("Operator '{0}' cannot be applied to these operands.")]
    OperandMismatch(&'static str),
}

pub type OperatorResult = Result<ConstantValue, OperatorError>;

/// Apply a unary operator. Increment and decrement return the stepped value.
pub fn evaluate_unary(kind: BoundUnaryOperatorKind, operand: &ConstantValue) -> OperatorResult {
    use BoundUnaryOperatorKind::*;
    use ConstantValue as V;

    let value = match (kind, operand) {
        (Identity, V::Int(_) | V::Float(_)) => operand.clone(),
        (Negation, V::Int(i)) => V::Int(i.wrapping_neg()),
        (Negation, V::Float(f)) => V::Float(-f),
        (LogicalNegation, V::Bool(b)) => V::Bool(!b),
        (OnesComplement, V::Int(i)) => V::Int(!i),
        (PreIncrement | PostIncrement, V::Int(i)) => V::Int(i.wrapping_add(1)),
        (PreIncrement | PostIncrement, V::Float(f)) => V::Float(f + 1.0),
        (PreDecrement | PostDecrement, V::Int(i)) => V::Int(i.wrapping_sub(1)),
        (PreDecrement | PostDecrement, V::Float(f)) => V::Float(f - 1.0),
        _ => return Err(OperatorError::OperandMismatch("unary")),
    };
    Ok(value)
}

fn arithmetic(
    left: &ConstantValue,
    right: &ConstantValue,
    int_op: impl FnOnce(i64, i64) -> Result<i64, OperatorError>,
    float_op: impl FnOnce(f64, f64) -> f64,
) -> OperatorResult {
    match (left, right) {
        (ConstantValue::Int(a), ConstantValue::Int(b)) => int_op(*a, *b).map(ConstantValue::Int),
        _ => match (left.as_float(), right.as_float()) {
            (Some(a), Some(b)) => Ok(ConstantValue::Float(float_op(a, b))),
            _ => Err(OperatorError::OperandMismatch("arithmetic")),
        },
    }
}

fn integral(
    left: &ConstantValue,
    right: &ConstantValue,
    int_op: impl FnOnce(i64, i64) -> i64,
    bool_op: impl FnOnce(bool, bool) -> bool,
) -> OperatorResult {
    match (left, right) {
        (ConstantValue::Int(a), ConstantValue::Int(b)) => Ok(ConstantValue::Int(int_op(*a, *b))),
        (ConstantValue::Bool(a), ConstantValue::Bool(b)) => Ok(ConstantValue::Bool(bool_op(*a, *b))),
        _ => Err(OperatorError::OperandMismatch("bitwise")),
    }
}

fn compare(left: &ConstantValue, right: &ConstantValue) -> Result<std::cmp::Ordering, OperatorError> {
    let ordering = match (left, right) {
        (ConstantValue::Int(a), ConstantValue::Int(b)) => Some(a.cmp(b)),
        (ConstantValue::Char(a), ConstantValue::Char(b)) => Some(a.cmp(b)),
        (ConstantValue::Float(a), ConstantValue::Float(b)) => a.partial_cmp(b),
        _ => None,
    };
    // NaN compares as unordered; every relational test on it is false.
    ordering.ok_or(OperatorError::OperandMismatch("comparison"))
}

/// Apply a binary operator.
pub fn evaluate_binary(kind: BoundBinaryOperatorKind, left: &ConstantValue, right: &ConstantValue) -> OperatorResult {
    use BoundBinaryOperatorKind::*;
    use ConstantValue as V;

    let value = match kind {
        Addition => match (left, right) {
            (V::String(a), V::String(b)) => V::String(Arc::from(format!("{}{}", a, b))),
            (V::String(a), V::Char(c)) => V::String(Arc::from(format!("{}{}", a, c))),
            (V::Char(c), V::String(b)) => V::String(Arc::from(format!("{}{}", c, b))),
            _ => return arithmetic(left, right, |a, b| Ok(a.wrapping_add(b)), |a, b| a + b),
        },
        Subtraction => return arithmetic(left, right, |a, b| Ok(a.wrapping_sub(b)), |a, b| a - b),
        Multiplication => return arithmetic(left, right, |a, b| Ok(a.wrapping_mul(b)), |a, b| a * b),
        Division => {
            return arithmetic(
                left,
                right,
                |a, b| if b == 0 { Err(OperatorError::DivideByZero) } else { Ok(a.wrapping_div(b)) },
                |a, b| a / b,
            )
        }
        Modulo => {
            return arithmetic(
                left,
                right,
                |a, b| if b == 0 { Err(OperatorError::DivideByZero) } else { Ok(a.wrapping_rem(b)) },
                |a, b| a % b,
            )
        }
        BitwiseAnd => return integral(left, right, |a, b| a & b, |a, b| a & b),
        BitwiseOr => return integral(left, right, |a, b| a | b, |a, b| a | b),
        BitwiseXor => return integral(left, right, |a, b| a ^ b, |a, b| a ^ b),
        ShiftLeft | ShiftRight => match (left, right) {
            (V::Int(a), V::Int(b)) if kind == ShiftLeft => V::Int(a.wrapping_shl(*b as u32)),
            (V::Int(a), V::Int(b)) => V::Int(a.wrapping_shr(*b as u32)),
            _ => return Err(OperatorError::OperandMismatch("shift")),
        },
        LogicalAnd | LogicalOr => match (left, right) {
            (V::Bool(a), V::Bool(b)) if kind == LogicalAnd => V::Bool(*a && *b),
            (V::Bool(a), V::Bool(b)) => V::Bool(*a || *b),
            _ => return Err(OperatorError::OperandMismatch("logical")),
        },
        Equals => V::Bool(left == right),
        NotEquals => V::Bool(left != right),
        Less | LessOrEquals | Greater | GreaterOrEquals => {
            let result = match compare(left, right) {
                Ok(ordering) => match kind {
                    Less => ordering.is_lt(),
                    LessOrEquals => ordering.is_le(),
                    Greater => ordering.is_gt(),
                    _ => ordering.is_ge(),
                },
                Err(_) if left.ty() == TypeSymbol::Float => false,
                Err(e) => return Err(e),
            };
            V::Bool(result)
        }
    };
    Ok(value)
}

/// Convert a value to a target type using the cast rules.
pub fn convert(value: &ConstantValue, to: &TypeSymbol) -> OperatorResult {
    use ConstantValue as V;

    let converted = match (value, to) {
        (v, t) if &v.ty() == t => Some(v.clone()),
        (_, TypeSymbol::Object) => Some(value.clone()),
        (V::Int(i), TypeSymbol::Float) => Some(V::Float(*i as f64)),
        (V::Float(f), TypeSymbol::Int) => Some(V::Int(*f as i64)),
        (V::Int(i), TypeSymbol::Char) => u32::try_from(*i).ok().and_then(char::from_u32).map(V::Char),
        (V::Char(c), TypeSymbol::Int) => Some(V::Int(*c as i64)),
        (V::String(s), TypeSymbol::Bool) => s.trim().parse().ok().map(V::Bool),
        (V::String(s), TypeSymbol::Int) => s.trim().parse().ok().map(V::Int),
        (V::String(s), TypeSymbol::Float) => s.trim().parse().ok().map(V::Float),
        (v, TypeSymbol::String) => Some(V::String(Arc::from(v.to_string()))),
        _ => None,
    };
    converted.ok_or_else(|| OperatorError::InvalidConversion {
        value: value.to_string(),
        ty: to.clone(),
    })
}

// ============================================================================
// Compile-time folding
// ============================================================================

/// Fold a unary operator over a constant; increments never fold.
pub fn fold_unary(op: &BoundUnaryOperator, operand: &ConstantValue) -> Option<ConstantValue> {
    if op.kind.is_increment_or_decrement() {
        return None;
    }
    evaluate_unary(op.kind, operand).ok()
}

/// Fold a binary operator over two constants. Faults such as division by
/// zero are left for run time.
pub fn fold_binary(op: &BoundBinaryOperator, left: &ConstantValue, right: &ConstantValue) -> Option<ConstantValue> {
    evaluate_binary(op.kind, left, right).ok()
}

/// Fold a cast of a constant to a primitive type.
pub fn fold_cast(value: &ConstantValue, to: &TypeSymbol) -> Option<ConstantValue> {
    if !to.is_primitive() {
        return None;
    }
    convert(value, to).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::bind_binary_operator;
    use sable_syntax::SyntaxKind;

    fn binary(kind: SyntaxKind, left: ConstantValue, right: ConstantValue) -> OperatorResult {
        let op = bind_binary_operator(kind, &left.ty(), &right.ty()).unwrap();
        evaluate_binary(op.kind, &left, &right)
    }

    #[test]
    fn test_integer_arithmetic_matches_host() {
        let cases: [(i64, i64); 4] = [(7, 3), (-7, 3), (0, 5), (i64::MAX, 1)];
        for (a, b) in cases {
            let (l, r) = (ConstantValue::Int(a), ConstantValue::Int(b));
            assert_eq!(binary(SyntaxKind::PlusToken, l.clone(), r.clone()), Ok(ConstantValue::Int(a.wrapping_add(b))));
            assert_eq!(binary(SyntaxKind::MinusToken, l.clone(), r.clone()), Ok(ConstantValue::Int(a.wrapping_sub(b))));
            assert_eq!(binary(SyntaxKind::AsteriskToken, l.clone(), r.clone()), Ok(ConstantValue::Int(a.wrapping_mul(b))));
            assert_eq!(binary(SyntaxKind::SlashToken, l.clone(), r.clone()), Ok(ConstantValue::Int(a / b)));
            assert_eq!(binary(SyntaxKind::AmpersandToken, l.clone(), r.clone()), Ok(ConstantValue::Int(a & b)));
            assert_eq!(binary(SyntaxKind::BarToken, l.clone(), r.clone()), Ok(ConstantValue::Int(a | b)));
            assert_eq!(binary(SyntaxKind::CaretToken, l.clone(), r.clone()), Ok(ConstantValue::Int(a ^ b)));
            assert_eq!(binary(SyntaxKind::LessThanEqualsToken, l.clone(), r.clone()), Ok(ConstantValue::Bool(a <= b)));
            assert_eq!(binary(SyntaxKind::ExclamationEqualsToken, l, r), Ok(ConstantValue::Bool(a != b)));
        }
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(
            binary(SyntaxKind::SlashToken, ConstantValue::Int(1), ConstantValue::Int(0)),
            Err(OperatorError::DivideByZero)
        );
        assert_eq!(
            binary(SyntaxKind::PercentToken, ConstantValue::Int(1), ConstantValue::Int(0)),
            Err(OperatorError::DivideByZero)
        );
        assert_eq!(OperatorError::DivideByZero.to_string(), "Attempted to divide by zero.");
        let result = binary(SyntaxKind::SlashToken, ConstantValue::Float(1.0), ConstantValue::Float(0.0));
        assert_eq!(result, Ok(ConstantValue::Float(f64::INFINITY)));
    }

    #[test]
    fn test_mixed_and_logical() {
        assert_eq!(
            binary(SyntaxKind::PlusToken, ConstantValue::Int(1), ConstantValue::Float(0.5)),
            Ok(ConstantValue::Float(1.5))
        );
        assert_eq!(
            binary(SyntaxKind::AmpersandAmpersandToken, ConstantValue::Bool(true), ConstantValue::Bool(false)),
            Ok(ConstantValue::Bool(false))
        );
        assert_eq!(
            binary(SyntaxKind::CaretToken, ConstantValue::Bool(true), ConstantValue::Bool(false)),
            Ok(ConstantValue::Bool(true))
        );
        assert_eq!(
            binary(SyntaxKind::PlusToken, ConstantValue::from("ab"), ConstantValue::Char('c')),
            Ok(ConstantValue::from("abc"))
        );
    }

    #[test]
    fn test_conversions() {
        assert_eq!(convert(&ConstantValue::Float(2.9), &TypeSymbol::Int), Ok(ConstantValue::Int(2)));
        assert_eq!(convert(&ConstantValue::Int(65), &TypeSymbol::Char), Ok(ConstantValue::Char('A')));
        assert_eq!(convert(&ConstantValue::from("42"), &TypeSymbol::Int), Ok(ConstantValue::Int(42)));
        assert_eq!(convert(&ConstantValue::Bool(true), &TypeSymbol::String), Ok(ConstantValue::from("true")));
        let err = convert(&ConstantValue::from("abc"), &TypeSymbol::Int).unwrap_err();
        assert_eq!(err.to_string(), "Cannot convert 'abc' to 'int'.");
    }

    #[test]
    fn test_fold_cast_skips_object() {
        assert_eq!(fold_cast(&ConstantValue::Int(1), &TypeSymbol::Object), None);
        assert_eq!(fold_cast(&ConstantValue::Int(1), &TypeSymbol::Float), Some(ConstantValue::Float(1.0)));
    }
}
