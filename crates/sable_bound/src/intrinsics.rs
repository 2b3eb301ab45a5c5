//! Built-in methods.
//!
//! The intrinsic symbols are created once per process. The evaluator
//! recognizes a call to one of them by comparing symbol ids against this
//! table before looking for a user-defined body.

use crate::symbols::{MethodFlags, MethodSymbol, SymbolId, VariableSymbol};
use crate::tree::MethodRef;
use crate::types::TypeSymbol;
use lazy_static::lazy_static;

/// The operation behind an intrinsic method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    /// `Print(object): void`, writes a line.
    Print,
    /// `Write(object): void`, writes without a newline.
    Write,
    /// `Input(): string`, reads a line.
    Input,
    /// `Length(string): int`
    Length,
    /// `CharAt(string, int): char`
    CharAt,
    /// `Count(object): int`, the length of an array.
    Count,
    /// `ElementAt(object, int): object`
    ElementAt,
    /// `ReadFile(string): string`
    ReadFile,
}

fn intrinsic(name: &str, parameters: &[(&str, TypeSymbol)], return_type: TypeSymbol) -> MethodRef {
    let parameters = parameters
        .iter()
        .map(|(name, ty)| VariableSymbol::parameter(name, ty.clone()))
        .collect();
    MethodSymbol::new(None, name, parameters, return_type, MethodFlags::INTRINSIC, None)
}

lazy_static! {
    static ref INTRINSICS: Vec<(MethodRef, Intrinsic)> = vec![
        (intrinsic("Print", &[("value", TypeSymbol::Object)], TypeSymbol::Void), Intrinsic::Print),
        (intrinsic("Write", &[("value", TypeSymbol::Object)], TypeSymbol::Void), Intrinsic::Write),
        (intrinsic("Input", &[], TypeSymbol::String), Intrinsic::Input),
        (intrinsic("Length", &[("text", TypeSymbol::String)], TypeSymbol::Int), Intrinsic::Length),
        (
            intrinsic("CharAt", &[("text", TypeSymbol::String), ("index", TypeSymbol::Int)], TypeSymbol::Char),
            Intrinsic::CharAt,
        ),
        (intrinsic("Count", &[("array", TypeSymbol::Object)], TypeSymbol::Int), Intrinsic::Count),
        (
            intrinsic("ElementAt", &[("array", TypeSymbol::Object), ("index", TypeSymbol::Int)], TypeSymbol::Object),
            Intrinsic::ElementAt,
        ),
        (intrinsic("ReadFile", &[("path", TypeSymbol::String)], TypeSymbol::String), Intrinsic::ReadFile),
    ];
}

/// Every intrinsic method, in table order.
pub fn all() -> impl Iterator<Item = &'static MethodRef> {
    INTRINSICS.iter().map(|(method, _)| method)
}

/// Identify an intrinsic by symbol id.
pub fn lookup(id: SymbolId) -> Option<Intrinsic> {
    INTRINSICS
        .iter()
        .find(|(method, _)| method.id == id)
        .map(|(_, intrinsic)| *intrinsic)
}

/// The symbol for an intrinsic.
pub fn symbol(intrinsic: Intrinsic) -> &'static MethodRef {
    INTRINSICS
        .iter()
        .find(|(_, candidate)| *candidate == intrinsic)
        .map(|(method, _)| method)
        .unwrap_or_else(|| unreachable!("every intrinsic has a table entry"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intrinsics_are_stable_and_identified() {
        let print = symbol(Intrinsic::Print);
        assert!(print.flags.contains(MethodFlags::INTRINSIC));
        assert_eq!(lookup(print.id), Some(Intrinsic::Print));
        assert_eq!(symbol(Intrinsic::Print).id, print.id);
        assert_eq!(all().count(), 8);
    }

    #[test]
    fn test_user_method_is_not_intrinsic() {
        let user = MethodSymbol::new(None, "Print", vec![], TypeSymbol::Void, MethodFlags::NONE, None);
        assert_eq!(lookup(user.id), None);
    }

    #[test]
    fn test_signatures() {
        assert_eq!(symbol(Intrinsic::CharAt).signature(), "CharAt(string, int): char");
        assert_eq!(symbol(Intrinsic::Input).parameters.len(), 0);
    }
}
