//! Symbol definitions.
//!
//! Symbols are created once by the binder and shared through `Arc`. Every
//! symbol carries a `SymbolId` handle issued from a process-wide counter;
//! equality and hashing go through that handle, never through addresses.

use crate::constant::ConstantValue;
use crate::types::TypeSymbol;
use sable_core::text::TextSpan;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Unique identifier for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

static NEXT_SYMBOL_ID: AtomicU32 = AtomicU32::new(1);

impl SymbolId {
    /// Issue a fresh id, unique within the process.
    pub fn fresh() -> Self {
        SymbolId(NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

macro_rules! impl_identity {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.id == other.id
            }
        }

        impl Eq for $ty {}

        impl Hash for $ty {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }
    };
}

// ============================================================================
// Variables
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum VariableKind {
    Local { read_only: bool },
    /// Method parameter; never reassignable.
    Parameter,
    /// A read-only variable whose value is known at bind time.
    Constant(ConstantValue),
}

#[derive(Debug)]
pub struct VariableSymbol {
    pub id: SymbolId,
    pub name: Arc<str>,
    pub kind: VariableKind,
    pub ty: TypeSymbol,
}

impl_identity!(VariableSymbol);

impl VariableSymbol {
    pub fn local(name: &str, read_only: bool, ty: TypeSymbol) -> Arc<Self> {
        Arc::new(Self {
            id: SymbolId::fresh(),
            name: Arc::from(name),
            kind: VariableKind::Local { read_only },
            ty,
        })
    }

    pub fn parameter(name: &str, ty: TypeSymbol) -> Arc<Self> {
        Arc::new(Self {
            id: SymbolId::fresh(),
            name: Arc::from(name),
            kind: VariableKind::Parameter,
            ty,
        })
    }

    pub fn constant(name: &str, value: ConstantValue) -> Arc<Self> {
        Arc::new(Self {
            id: SymbolId::fresh(),
            name: Arc::from(name),
            ty: value.ty(),
            kind: VariableKind::Constant(value),
        })
    }

    pub fn is_read_only(&self) -> bool {
        match self.kind {
            VariableKind::Local { read_only } => read_only,
            VariableKind::Parameter | VariableKind::Constant(_) => true,
        }
    }

    pub fn constant_value(&self) -> Option<&ConstantValue> {
        match &self.kind {
            VariableKind::Constant(value) => Some(value),
            _ => None,
        }
    }
}

// ============================================================================
// Namespaces
// ============================================================================

/// A dotted namespace path such as `A.B`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceSymbol {
    names: Vec<Arc<str>>,
}

impl NamespaceSymbol {
    pub fn new<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            names: names.iter().map(|n| Arc::from(n.as_ref())).collect(),
        }
    }

    pub fn names(&self) -> &[Arc<str>] {
        &self.names
    }

    /// The enclosing namespace, if this one is nested.
    pub fn parent(&self) -> Option<NamespaceSymbol> {
        (self.names.len() > 1).then(|| Self {
            names: self.names[..self.names.len() - 1].to_vec(),
        })
    }

    /// Append more segments, e.g. `A` + `B.C` -> `A.B.C`.
    pub fn join<S: AsRef<str>>(&self, names: &[S]) -> NamespaceSymbol {
        let mut result = self.clone();
        result.names.extend(names.iter().map(|n| Arc::from(n.as_ref())));
        result
    }

    /// The canonical `A.B` form used for lookup.
    pub fn full_name(&self) -> String {
        self.names.join(".")
    }

    /// `A.B` + `Name` -> `A.B.Name`.
    pub fn qualify(&self, name: &str) -> String {
        format!("{}.{}", self.full_name(), name)
    }
}

impl fmt::Display for NamespaceSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

// ============================================================================
// Methods
// ============================================================================

bitflags::bitflags! {
    /// Flags describing how a method was declared.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MethodFlags: u32 {
        const NONE              = 0;
        /// Built in; evaluated by the host.
        const INTRINSIC         = 1 << 0;
        /// Error-typed stand-in declared for an undefined or uninferable name.
        const PLACEHOLDER       = 1 << 1;
        /// The synthetic method holding top-level statements.
        const SCRIPT            = 1 << 2;
        /// Declared inside another method's body.
        const LOCAL             = 1 << 3;
        /// Declared with `var`; return type inferred from its returns.
        const IMPLICIT_RETURN   = 1 << 4;
    }
}

/// Separator joining nested local method names into a flat unique name.
pub const LOCAL_METHOD_SEPARATOR: char = '$';

/// Name of the synthetic method holding top-level statements.
pub const SCRIPT_METHOD_NAME: &str = "<script>";

#[derive(Debug)]
pub struct MethodSymbol {
    pub id: SymbolId,
    pub namespace: Option<NamespaceSymbol>,
    /// Flat name; local methods are `Outer$Inner`.
    pub name: Arc<str>,
    /// Namespace-qualified name used as the registry key.
    pub full_name: Arc<str>,
    pub parameters: Vec<Arc<VariableSymbol>>,
    pub return_type: TypeSymbol,
    pub flags: MethodFlags,
    /// Span of the declaring identifier, absent for intrinsics.
    pub span: Option<TextSpan>,
}

impl_identity!(MethodSymbol);

impl MethodSymbol {
    pub fn new(
        namespace: Option<NamespaceSymbol>,
        name: &str,
        parameters: Vec<Arc<VariableSymbol>>,
        return_type: TypeSymbol,
        flags: MethodFlags,
        span: Option<TextSpan>,
    ) -> Arc<Self> {
        let full_name = match &namespace {
            Some(ns) => ns.qualify(name),
            None => name.to_string(),
        };
        Arc::new(Self {
            id: SymbolId::fresh(),
            namespace,
            name: Arc::from(name),
            full_name: Arc::from(full_name),
            parameters,
            return_type,
            flags,
            span,
        })
    }

    #[inline]
    pub fn is_script(&self) -> bool {
        self.flags.contains(MethodFlags::SCRIPT)
    }

    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.flags.contains(MethodFlags::PLACEHOLDER)
    }

    /// Whether both methods take the same parameter types in order.
    pub fn has_same_parameter_types(&self, other: &MethodSymbol) -> bool {
        self.parameters.len() == other.parameters.len()
            && self
                .parameters
                .iter()
                .zip(&other.parameters)
                .all(|(a, b)| a.ty == b.ty)
    }

    /// `Name(int, string): float`
    pub fn signature(&self) -> String {
        let parameters: Vec<String> = self.parameters.iter().map(|p| p.ty.to_string()).collect();
        format!("{}({}): {}", self.full_name, parameters.join(", "), self.return_type)
    }
}

impl fmt::Display for MethodSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name)
    }
}

// ============================================================================
// Labels
// ============================================================================

/// A jump target, either written by the user or generated.
#[derive(Debug)]
pub struct LabelSymbol {
    pub id: SymbolId,
    pub name: Arc<str>,
}

impl_identity!(LabelSymbol);

impl LabelSymbol {
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            id: SymbolId::fresh(),
            name: Arc::from(name),
        })
    }
}

impl fmt::Display for LabelSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
