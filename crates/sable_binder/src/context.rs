//! The immutable context threaded through recursive binding calls.

use sable_bound::symbols::{NamespaceSymbol, LOCAL_METHOD_SEPARATOR};
use sable_bound::tree::MethodRef;
use std::sync::Arc;

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ContextFlags: u8 {
        const NONE              = 0;
        /// Speculative bind used to infer a return type.
        const ANALYSIS          = 1 << 0;
        /// Directly inside the compilation unit.
        const TOP_LEVEL         = 1 << 1;
        /// Inside a namespace body, where only declarations are allowed.
        const IN_NAMESPACE_BODY = 1 << 2;
    }
}

/// Where the binder currently is: namespace, includes and enclosing method.
///
/// Contexts are cheap to clone and never mutated in place; entering a
/// construct derives a new context for the nested calls.
#[derive(Debug, Clone, Default)]
pub struct BindContext {
    pub namespace: Option<NamespaceSymbol>,
    /// Namespaces brought in with `with`, in inclusion order.
    pub includes: Vec<NamespaceSymbol>,
    pub aliases: Vec<(Arc<str>, NamespaceSymbol)>,
    /// The method whose body is being bound, if its symbol is known.
    pub method: Option<MethodRef>,
    /// Flat name of the enclosing method, `Outer$Inner` for local methods.
    pub method_path: Option<Arc<str>>,
    pub flags: ContextFlags,
}

impl BindContext {
    pub fn top_level() -> Self {
        Self {
            flags: ContextFlags::TOP_LEVEL,
            ..Self::default()
        }
    }

    pub fn is_analysis(&self) -> bool {
        self.flags.contains(ContextFlags::ANALYSIS)
    }

    pub fn is_top_level(&self) -> bool {
        self.flags.contains(ContextFlags::TOP_LEVEL)
    }

    pub fn is_in_namespace_body(&self) -> bool {
        self.flags.contains(ContextFlags::IN_NAMESPACE_BODY)
    }

    /// Whether the binder is inside some method body, including the script.
    pub fn is_in_method(&self) -> bool {
        self.method_path.is_some()
    }

    /// Enter `namespace name { ... }` or the rest of the file after `namespace name;`.
    pub fn enter_namespace(&self, names: &[&str]) -> Self {
        let namespace = match &self.namespace {
            Some(outer) => outer.join(names),
            None => NamespaceSymbol::new(names),
        };
        Self {
            namespace: Some(namespace),
            flags: self.flags | ContextFlags::IN_NAMESPACE_BODY,
            ..self.clone()
        }
    }

    pub fn with_include(&self, namespace: NamespaceSymbol) -> Self {
        let mut context = self.clone();
        if !context.includes.contains(&namespace) {
            context.includes.push(namespace);
        }
        context
    }

    pub fn with_alias(&self, alias: &str, namespace: NamespaceSymbol) -> Self {
        let mut context = self.clone();
        context.aliases.retain(|(name, _)| &**name != alias);
        context.aliases.push((Arc::from(alias), namespace));
        context
    }

    pub fn alias(&self, name: &str) -> Option<&NamespaceSymbol> {
        self.aliases.iter().rev().find(|(alias, _)| &**alias == name).map(|(_, ns)| ns)
    }

    /// Enter a method body. `flat_name` is the method's name without namespace.
    pub fn enter_method(&self, flat_name: &str, method: Option<MethodRef>) -> Self {
        Self {
            method,
            method_path: Some(Arc::from(flat_name)),
            flags: self.flags - ContextFlags::TOP_LEVEL - ContextFlags::IN_NAMESPACE_BODY,
            ..self.clone()
        }
    }

    /// The flat name a method named `name` gets when declared here.
    pub fn local_method_name(&self, name: &str) -> String {
        match &self.method_path {
            Some(path) if !self.is_script_path() => format!("{}{}{}", path, LOCAL_METHOD_SEPARATOR, name),
            _ => name.to_string(),
        }
    }

    /// Full registry key for a method named `flat_name` in the current namespace.
    pub fn qualify(&self, flat_name: &str) -> String {
        match &self.namespace {
            Some(ns) => ns.qualify(flat_name),
            None => flat_name.to_string(),
        }
    }

    pub fn analysis(&self) -> Self {
        Self {
            flags: self.flags | ContextFlags::ANALYSIS,
            ..self.clone()
        }
    }

    fn is_script_path(&self) -> bool {
        self.method.as_ref().is_some_and(|m| m.is_script())
    }
}
