//! Type symbols.

use sable_syntax::SyntaxKind;
use std::fmt;
use std::sync::Arc;

/// A type in the Sable type system.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeSymbol {
    Object,
    Bool,
    Int,
    Float,
    String,
    Char,
    Void,
    /// Sentinel for expressions that already produced a diagnostic.
    Error,
    Array(Arc<TypeSymbol>),
}

impl TypeSymbol {
    pub fn array_of(item: TypeSymbol) -> TypeSymbol {
        TypeSymbol::Array(Arc::new(item))
    }

    /// Map a type keyword plus `[]` rank to a type.
    pub fn from_keyword(keyword: SyntaxKind, rank: u32) -> TypeSymbol {
        let mut ty = match keyword {
            SyntaxKind::ObjectKeyword => TypeSymbol::Object,
            SyntaxKind::BoolKeyword => TypeSymbol::Bool,
            SyntaxKind::IntKeyword => TypeSymbol::Int,
            SyntaxKind::FloatKeyword => TypeSymbol::Float,
            SyntaxKind::StringKeyword => TypeSymbol::String,
            SyntaxKind::CharKeyword => TypeSymbol::Char,
            SyntaxKind::VoidKeyword => TypeSymbol::Void,
            _ => TypeSymbol::Error,
        };
        for _ in 0..rank {
            ty = TypeSymbol::array_of(ty);
        }
        ty
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, TypeSymbol::Error)
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, TypeSymbol::Void)
    }

    /// Whether a constant of this type can be folded and promoted.
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            TypeSymbol::Bool | TypeSymbol::Int | TypeSymbol::Float | TypeSymbol::String | TypeSymbol::Char
        )
    }

    pub fn item_type(&self) -> Option<&TypeSymbol> {
        match self {
            TypeSymbol::Array(item) => Some(item),
            _ => None,
        }
    }

    /// The least common type of two item types: equal types stay, otherwise `object`.
    pub fn common_type(&self, other: &TypeSymbol) -> TypeSymbol {
        if self == other || other.is_error() {
            self.clone()
        } else if self.is_error() {
            other.clone()
        } else {
            TypeSymbol::Object
        }
    }
}

impl fmt::Display for TypeSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeSymbol::Object => write!(f, "object"),
            TypeSymbol::Bool => write!(f, "bool"),
            TypeSymbol::Int => write!(f, "int"),
            TypeSymbol::Float => write!(f, "float"),
            TypeSymbol::String => write!(f, "string"),
            TypeSymbol::Char => write!(f, "char"),
            TypeSymbol::Void => write!(f, "void"),
            TypeSymbol::Error => write!(f, "?"),
            TypeSymbol::Array(item) => write!(f, "{}[]", item),
        }
    }
}
