//! Lexical scopes for variables, labels and loop targets.

use rustc_hash::FxHashMap;
use sable_bound::tree::{LabelRef, VariableRef};
use std::sync::Arc;

/// A scope in the binding phase. Scopes form a chain from inner to outer.
///
/// A capturing scope lets lookups continue into its parent. A method body
/// scope is not capturing, so a method cannot see the locals of the code
/// that encloses its declaration.
#[derive(Debug)]
pub struct Scope {
    variables: FxHashMap<Arc<str>, VariableRef>,
    labels: FxHashMap<Arc<str>, LabelRef>,
    /// `(break, continue)` targets when this is a loop scope.
    loop_labels: Option<(LabelRef, LabelRef)>,
    capturing: bool,
    pub parent: Option<Box<Scope>>,
}

impl Scope {
    /// An ordinary block scope.
    pub fn new(parent: Option<Box<Scope>>) -> Self {
        Self {
            variables: FxHashMap::default(),
            labels: FxHashMap::default(),
            loop_labels: None,
            capturing: true,
            parent,
        }
    }

    /// The opaque scope at the root of a method body.
    pub fn method_body() -> Self {
        Self {
            capturing: false,
            ..Self::new(None)
        }
    }

    /// A block scope that is the target of `break` and `continue`.
    pub fn with_loop(parent: Option<Box<Scope>>, break_label: LabelRef, continue_label: LabelRef) -> Self {
        Self {
            loop_labels: Some((break_label, continue_label)),
            ..Self::new(parent)
        }
    }

    /// Declare a variable. Fails when the name is already declared in this scope.
    pub fn declare_variable(&mut self, variable: VariableRef) -> bool {
        if self.variables.contains_key(&variable.name) {
            return false;
        }
        self.variables.insert(variable.name.clone(), variable);
        true
    }

    pub fn declare_label(&mut self, label: LabelRef) -> bool {
        if self.labels.contains_key(&label.name) {
            return false;
        }
        self.labels.insert(label.name.clone(), label);
        true
    }

    pub fn lookup_variable(&self, name: &str) -> Option<VariableRef> {
        self.chain().find_map(|scope| scope.variables.get(name).cloned())
    }

    pub fn lookup_label(&self, name: &str) -> Option<LabelRef> {
        self.chain().find_map(|scope| scope.labels.get(name).cloned())
    }

    pub fn try_get_break_label(&self) -> Option<LabelRef> {
        self.chain()
            .find_map(|scope| scope.loop_labels.as_ref())
            .map(|(break_label, _)| break_label.clone())
    }

    pub fn try_get_continue_label(&self) -> Option<LabelRef> {
        self.chain()
            .find_map(|scope| scope.loop_labels.as_ref())
            .map(|(_, continue_label)| continue_label.clone())
    }

    /// This scope and the capturing ancestors visible from it.
    fn chain(&self) -> impl Iterator<Item = &Scope> {
        let mut next = Some(self);
        std::iter::from_fn(move || {
            let scope = next?;
            next = if scope.capturing { scope.parent.as_deref() } else { None };
            Some(scope)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sable_bound::symbols::{LabelSymbol, VariableSymbol};
    use sable_bound::types::TypeSymbol;

    #[test]
    fn test_shadowing_in_nested_scope() {
        let mut outer = Scope::method_body();
        assert!(outer.declare_variable(VariableSymbol::local("x", false, TypeSymbol::Int)));
        assert!(!outer.declare_variable(VariableSymbol::local("x", false, TypeSymbol::Int)));

        let mut inner = Scope::new(Some(Box::new(outer)));
        assert!(inner.declare_variable(VariableSymbol::local("x", false, TypeSymbol::String)));
        assert_eq!(inner.lookup_variable("x").unwrap().ty, TypeSymbol::String);
    }

    #[test]
    fn test_method_body_is_opaque() {
        let mut script = Scope::method_body();
        script.declare_variable(VariableSymbol::local("x", false, TypeSymbol::Int));
        let mut block = Scope::new(Some(Box::new(script)));
        assert!(block.lookup_variable("x").is_some());

        let body = Scope {
            parent: Some(Box::new(std::mem::replace(&mut block, Scope::method_body()))),
            ..Scope::method_body()
        };
        assert!(body.lookup_variable("x").is_none());
    }

    #[test]
    fn test_loop_labels_resolve_to_nearest_loop() {
        let outer = Scope::with_loop(None, LabelSymbol::new("break1"), LabelSymbol::new("continue1"));
        let inner = Scope::with_loop(
            Some(Box::new(outer)),
            LabelSymbol::new("break2"),
            LabelSymbol::new("continue2"),
        );
        let block = Scope::new(Some(Box::new(inner)));
        assert_eq!(&*block.try_get_break_label().unwrap().name, "break2");
        assert_eq!(&*block.try_get_continue_label().unwrap().name, "continue2");
        assert!(Scope::method_body().try_get_break_label().is_none());
    }
}
