//! Binding and scope registries
//!
//! Both registries are plain key-value stores. Which services a scope bound
//! is tracked by the lifecycle manager, not here.

mod modules;
mod scopes;
mod service;

pub use modules::ModuleRegistry;
pub use scopes::{Ancestors, ScopeEntry, ScopeRegistry};
pub use service::ServiceKey;
