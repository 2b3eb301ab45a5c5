//! Conversion classification between types.

use crate::types::TypeSymbol;

/// How a value of one type may become another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Same type.
    Identity,
    /// Always legal without a cast.
    Implicit,
    /// Legal only with a cast.
    Explicit,
    None,
}

impl Conversion {
    /// Classify the conversion from `from` to `to`.
    pub fn classify(from: &TypeSymbol, to: &TypeSymbol) -> Conversion {
        use TypeSymbol::*;

        if from == to || from.is_error() || to.is_error() {
            return Conversion::Identity;
        }
        if from.is_void() || to.is_void() {
            return Conversion::None;
        }
        match (from, to) {
            (_, Object) => Conversion::Implicit,
            (Int, Float) | (Char, String) => Conversion::Implicit,
            (Object, _) => Conversion::Explicit,
            (Float, Int) | (Int, Char) | (Char, Int) => Conversion::Explicit,
            (Bool | Int | Float, String) => Conversion::Explicit,
            (String, Bool | Int | Float) => Conversion::Explicit,
            _ => Conversion::None,
        }
    }

    /// Identity or implicit: accepted in assignments and arguments.
    #[inline]
    pub fn is_implicit(self) -> bool {
        matches!(self, Conversion::Identity | Conversion::Implicit)
    }

    #[inline]
    pub fn is_identity(self) -> bool {
        self == Conversion::Identity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_and_error() {
        assert_eq!(Conversion::classify(&TypeSymbol::Int, &TypeSymbol::Int), Conversion::Identity);
        assert_eq!(Conversion::classify(&TypeSymbol::Error, &TypeSymbol::Bool), Conversion::Identity);
        let ints = TypeSymbol::array_of(TypeSymbol::Int);
        assert_eq!(Conversion::classify(&ints, &ints.clone()), Conversion::Identity);
    }

    #[test]
    fn test_implicit_conversions() {
        assert_eq!(Conversion::classify(&TypeSymbol::Int, &TypeSymbol::Float), Conversion::Implicit);
        assert_eq!(Conversion::classify(&TypeSymbol::Char, &TypeSymbol::String), Conversion::Implicit);
        let ints = TypeSymbol::array_of(TypeSymbol::Int);
        assert_eq!(Conversion::classify(&ints, &TypeSymbol::Object), Conversion::Implicit);
    }

    #[test]
    fn test_explicit_conversions() {
        assert_eq!(Conversion::classify(&TypeSymbol::Float, &TypeSymbol::Int), Conversion::Explicit);
        assert_eq!(Conversion::classify(&TypeSymbol::String, &TypeSymbol::Int), Conversion::Explicit);
        assert_eq!(Conversion::classify(&TypeSymbol::Object, &TypeSymbol::Char), Conversion::Explicit);
        assert!(!Conversion::Explicit.is_implicit());
    }

    #[test]
    fn test_no_conversion() {
        assert_eq!(Conversion::classify(&TypeSymbol::Bool, &TypeSymbol::Int), Conversion::None);
        assert_eq!(Conversion::classify(&TypeSymbol::Void, &TypeSymbol::Object), Conversion::None);
        assert_eq!(Conversion::classify(&TypeSymbol::String, &TypeSymbol::Char), Conversion::None);
        let ints = TypeSymbol::array_of(TypeSymbol::Int);
        let floats = TypeSymbol::array_of(TypeSymbol::Float);
        assert_eq!(Conversion::classify(&ints, &floats), Conversion::None);
    }
}
