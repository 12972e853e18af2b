//! Scope capability
//!
//! A scope is any host object that takes part in the injection tree. The
//! kernel tracks its id and parent; the object itself only supplies the
//! callbacks below.
//!
//! ```text
//! inject(parent chain) -> construct(binder) -> [descendant walk] -> initialize
//! ```

mod id;

pub use id::ScopeId;

use crate::binder::DependencyBinder;
use crate::error::DiResult;
use crate::resolver::Resolver;
use std::any::{self, Any};
use std::fmt;

/// How a scope's lifecycle is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    /// Scope boundary started by its own tree-entry notification.
    /// Descendant walks of enclosing scopes stop here.
    Node,
    /// Scope constructed by the descendant walk of its nearest enclosing scope
    Embedded,
}

/// Opaque configuration payload handed to a scope's construct phase
pub struct ScopeConfig {
    value: Box<dyn Any>,
    type_name: &'static str,
}

impl ScopeConfig {
    /// Wrap a value as a config payload
    pub fn new<T: 'static>(value: T) -> Self {
        Self {
            value: Box::new(value),
            type_name: any::type_name::<T>(),
        }
    }

    /// Whether the payload holds a `T`
    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Borrow the payload as `T`
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Take the payload as `T`, handing it back on mismatch
    pub fn downcast<T: 'static>(self) -> Result<T, Self> {
        let type_name = self.type_name;
        self.value
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|value| Self { value, type_name })
    }

    /// Typed view over an optional payload; a mismatched type reads as absent
    pub fn extract<T: 'static>(config: Option<Self>) -> Option<T> {
        match config?.downcast::<T>() {
            Ok(value) => Some(value),
            Err(other) => {
                log::warn!(
                    "Config of type {} ignored, expected {}",
                    other.type_name,
                    any::type_name::<T>()
                );
                None
            }
        }
    }

    /// Name of the wrapped type
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for ScopeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeConfig")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Upcast helper so trait objects can be type-checked
pub trait AsAny {
    /// Borrow as `Any`
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Object participating in the injection tree
pub trait Scope: AsAny {
    /// Lifecycle driver for this scope
    fn kind(&self) -> ScopeKind {
        ScopeKind::Node
    }

    /// Resolve injected dependencies.
    ///
    /// The resolver is anchored at the parent scope, so the scope never sees
    /// its own (not yet populated) bindings here.
    fn inject(&mut self, _resolver: &Resolver<'_>) -> DiResult<()> {
        Ok(())
    }

    /// Register this scope's services
    fn construct(
        &mut self,
        binder: &mut DependencyBinder<'_>,
        config: Option<ScopeConfig>,
    ) -> DiResult<()>;

    /// Post-wiring setup; the resolver is anchored at this scope
    fn initialize(&mut self, _resolver: &Resolver<'_>) {}

    /// Diagnostic name
    fn scope_name(&self) -> &'static str {
        any::type_name::<Self>()
    }
}
