//! sable_binder: Name resolution, type checking and bound tree construction.
//!
//! The binder walks a parsed compilation unit, declares every method before
//! binding any body, infers the return types of `var` methods, binds each
//! body against a chain of lexical scopes and finally lowers every method and
//! checks that non-void methods return on all paths.

mod binder;
mod context;
mod expressions;
mod methods;
mod scope;

pub use binder::{bind, Binder, BinderOptions, BindingResult};
pub use context::{BindContext, ContextFlags};
pub use methods::{root_methods, MethodTable};
pub use scope::Scope;
