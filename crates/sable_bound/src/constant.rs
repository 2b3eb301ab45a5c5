//! Compile-time constant values.

use crate::types::TypeSymbol;
use std::fmt;
use std::sync::Arc;

/// The value of a literal or folded expression.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Arc<str>),
    Char(char),
}

impl ConstantValue {
    pub fn ty(&self) -> TypeSymbol {
        match self {
            ConstantValue::Bool(_) => TypeSymbol::Bool,
            ConstantValue::Int(_) => TypeSymbol::Int,
            ConstantValue::Float(_) => TypeSymbol::Float,
            ConstantValue::String(_) => TypeSymbol::String,
            ConstantValue::Char(_) => TypeSymbol::Char,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConstantValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ConstantValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The value widened to float, for int and float constants.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConstantValue::Int(i) => Some(*i as f64),
            ConstantValue::Float(f) => Some(*f),
            _ => None,
        }
    }
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Bool(b) => write!(f, "{}", b),
            ConstantValue::Int(i) => write!(f, "{}", i),
            ConstantValue::Float(x) => write!(f, "{}", x),
            ConstantValue::String(s) => write!(f, "{}", s),
            ConstantValue::Char(c) => write!(f, "{}", c),
        }
    }
}

impl From<bool> for ConstantValue {
    fn from(value: bool) -> Self {
        ConstantValue::Bool(value)
    }
}

impl From<i64> for ConstantValue {
    fn from(value: i64) -> Self {
        ConstantValue::Int(value)
    }
}

impl From<f64> for ConstantValue {
    fn from(value: f64) -> Self {
        ConstantValue::Float(value)
    }
}

impl From<&str> for ConstantValue {
    fn from(value: &str) -> Self {
        ConstantValue::String(Arc::from(value))
    }
}

impl From<char> for ConstantValue {
    fn from(value: char) -> Self {
        ConstantValue::Char(value)
    }
}
