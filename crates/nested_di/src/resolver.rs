//! Read-only resolution handle anchored at one scope

use crate::error::DiResult;
use crate::registry::{ModuleRegistry, ScopeRegistry, ServiceKey};
use crate::scope::ScopeId;
use std::rc::Rc;

/// Resolves services by walking the chain above an anchor scope
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    modules: &'a ModuleRegistry,
    scopes: &'a ScopeRegistry,
    anchor: ScopeId,
}

impl<'a> Resolver<'a> {
    /// Create a resolver starting at `anchor`
    pub const fn new(modules: &'a ModuleRegistry, scopes: &'a ScopeRegistry, anchor: ScopeId) -> Self {
        Self { modules, scopes, anchor }
    }

    /// Resolve `T`; a miss is an error
    pub fn resolve<T: ?Sized + 'static>(&self) -> DiResult<Rc<T>> {
        let resolved = self.modules.resolve::<T>(self.anchor, self.scopes);
        if let Err(err) = &resolved {
            log::error!("{}", err);
        }
        resolved
    }

    /// Resolve `T` if any ancestor binds it
    pub fn try_resolve<T: ?Sized + 'static>(&self) -> Option<Rc<T>> {
        self.modules.resolve::<T>(self.anchor, self.scopes).ok()
    }

    /// Scope that would provide `T`
    pub fn provider_of<T: ?Sized + 'static>(&self) -> Option<ScopeId> {
        self.modules.provider_of(ServiceKey::of::<T>(), self.anchor, self.scopes)
    }

    /// Scope the walk starts from
    pub const fn anchor(&self) -> ScopeId {
        self.anchor
    }
}
