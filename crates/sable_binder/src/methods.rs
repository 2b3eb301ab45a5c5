//! The method registry.
//!
//! Methods are not scoped lexically: every bind shares one registry keyed by
//! namespace-qualified full name, and each key holds an overload set. The
//! intrinsic methods live in a separate table built once per process.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use sable_bound::intrinsics;
use sable_bound::tree::MethodRef;
use std::sync::Arc;

#[derive(Debug, Default, Clone)]
pub struct MethodTable {
    methods: IndexMap<Arc<str>, Vec<MethodRef>>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a method to its overload set. Fails when an overload with the same
    /// parameter types is already present.
    pub fn declare(&mut self, method: MethodRef) -> bool {
        let overloads = self.methods.entry(method.full_name.clone()).or_default();
        if overloads.iter().any(|m| m.has_same_parameter_types(&method)) {
            return false;
        }
        overloads.push(method);
        true
    }

    pub fn lookup(&self, full_name: &str) -> Option<&[MethodRef]> {
        self.methods.get(full_name).map(Vec::as_slice).filter(|m| !m.is_empty())
    }

    pub fn contains(&self, full_name: &str) -> bool {
        self.lookup(full_name).is_some()
    }

    /// Every method in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &MethodRef> {
        self.methods.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.methods.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

lazy_static! {
    static ref ROOT_METHODS: MethodTable = {
        let mut table = MethodTable::new();
        for method in intrinsics::all() {
            table.declare(method.clone());
        }
        table
    };
}

/// The intrinsic methods; the outermost level of every method lookup.
pub fn root_methods() -> &'static MethodTable {
    &ROOT_METHODS
}
