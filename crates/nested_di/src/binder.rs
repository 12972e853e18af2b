//! Write-only binding handle used during a scope's construct phase

use crate::error::DiResult;
use crate::registry::{ModuleRegistry, ServiceKey};
use crate::scope::ScopeId;
use std::rc::Rc;

/// Binds services on behalf of one scope and records what it bound.
///
/// One binder exists per construct call. The recorded keys are what the
/// lifecycle manager retracts when the scope is torn down.
pub struct DependencyBinder<'a> {
    modules: &'a mut ModuleRegistry,
    scope: ScopeId,
    bound: &'a mut Vec<ServiceKey>,
}

impl<'a> DependencyBinder<'a> {
    /// Create a binder writing into `modules` under `scope`
    pub fn new(modules: &'a mut ModuleRegistry, scope: ScopeId, bound: &'a mut Vec<ServiceKey>) -> Self {
        Self { modules, scope, bound }
    }

    /// Bind a shared instance as service `T`.
    ///
    /// Trait objects are bound by naming the trait:
    /// `binder.bind::<dyn Clock>(Rc::new(SystemClock))`.
    pub fn bind<T: ?Sized + 'static>(&mut self, instance: Rc<T>) -> DiResult<()> {
        match self.modules.bind::<T>(self.scope, instance) {
            Ok(()) => {
                log::trace!("{} bound {}", self.scope, ServiceKey::of::<T>());
                self.bound.push(ServiceKey::of::<T>());
                Ok(())
            }
            Err(err) => {
                log::error!("{}", err);
                Err(err)
            }
        }
    }

    /// Bind an owned value as service `T`
    pub fn bind_value<T: 'static>(&mut self, value: T) -> DiResult<Rc<T>> {
        let shared = Rc::new(value);
        self.bind::<T>(Rc::clone(&shared))?;
        Ok(shared)
    }

    /// Scope the bindings belong to
    pub const fn scope_id(&self) -> ScopeId {
        self.scope
    }

    /// Keys bound through this binder so far
    pub fn bound(&self) -> &[ServiceKey] {
        self.bound.as_slice()
    }

    /// Whether this scope already binds `T`
    pub fn is_bound<T: ?Sized + 'static>(&self) -> bool {
        self.modules.is_bound(self.scope, ServiceKey::of::<T>())
    }
}
