//! Runtime values.

use sable_bound::constant::ConstantValue;
use sable_bound::types::TypeSymbol;
use std::fmt;
use std::sync::Arc;

/// A value produced while evaluating a program.
#[derive(Debug, Clone)]
pub enum Value {
    /// The result of a `void` call, and the default of `object`.
    Void,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    String(Arc<str>),
    /// Arrays are immutable and shared.
    Array(Arc<[Value]>),
}

impl Value {
    /// The value a slot of this type holds before anything is stored in it.
    pub fn default_for(ty: &TypeSymbol) -> Value {
        match ty {
            TypeSymbol::Bool => Value::Bool(false),
            TypeSymbol::Int => Value::Int(0),
            TypeSymbol::Float => Value::Float(0.0),
            TypeSymbol::Char => Value::Char('\0'),
            TypeSymbol::String => Value::String(Arc::from("")),
            TypeSymbol::Array(_) => Value::Array(Arc::from(Vec::new())),
            TypeSymbol::Object | TypeSymbol::Void | TypeSymbol::Error => Value::Void,
        }
    }

    /// The primitive payload, if this value has one.
    pub fn to_constant(&self) -> Option<ConstantValue> {
        match self {
            Value::Bool(b) => Some(ConstantValue::Bool(*b)),
            Value::Int(i) => Some(ConstantValue::Int(*i)),
            Value::Float(f) => Some(ConstantValue::Float(*f)),
            Value::Char(c) => Some(ConstantValue::Char(*c)),
            Value::String(s) => Some(ConstantValue::String(s.clone())),
            Value::Void | Value::Array(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }
}

impl From<ConstantValue> for Value {
    fn from(value: ConstantValue) -> Self {
        match value {
            ConstantValue::Bool(b) => Value::Bool(b),
            ConstantValue::Int(i) => Value::Int(i),
            ConstantValue::Float(f) => Value::Float(f),
            ConstantValue::Char(c) => Value::Char(c),
            ConstantValue::String(s) => Value::String(s),
        }
    }
}

impl From<&ConstantValue> for Value {
    fn from(value: &ConstantValue) -> Self {
        Value::from(value.clone())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(Arc::from(value))
    }
}

/// Arrays compare by identity; every other value by content.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Char(c) => write!(f, "{}", c),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_identity() {
        let items: Arc<[Value]> = Arc::from(vec![Value::Int(1), Value::Int(2)]);
        let a = Value::Array(items.clone());
        assert_eq!(a, Value::Array(items));
        assert_ne!(a, Value::Array(Arc::from(vec![Value::Int(1), Value::Int(2)])));
        assert_eq!(a.to_string(), "[1, 2]");
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Value::default_for(&TypeSymbol::Int), Value::Int(0));
        assert_eq!(Value::default_for(&TypeSymbol::String), Value::from(""));
        assert!(Value::default_for(&TypeSymbol::Object).is_void());
    }
}
