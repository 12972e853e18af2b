//! Module registry: bindings keyed by owning scope and service type
//!
//! Resolution walks the scope chain nearest-first, so an inner scope can
//! shadow a service bound further out without touching the outer table.

use super::{ScopeRegistry, ServiceKey};
use crate::error::{DiError, DiResult};
use crate::scope::ScopeId;
use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

/// Per-scope binding table. Each value is an `Rc<T>` stored behind `Any`.
type BindingTable = HashMap<ServiceKey, Box<dyn Any>>;

/// Registry of every binding made by live scopes
#[derive(Default)]
pub struct ModuleRegistry {
    tables: HashMap<ScopeId, BindingTable>,
}

impl ModuleRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `instance` as service `T` owned by `scope`.
    ///
    /// Rebinding the same service in the same scope is rejected; the first
    /// binding stays authoritative.
    pub fn bind<T: ?Sized + 'static>(&mut self, scope: ScopeId, instance: Rc<T>) -> DiResult<()> {
        let key = ServiceKey::of::<T>();
        let table = self.tables.entry(scope).or_default();
        if table.contains_key(&key) {
            return Err(DiError::BindingConflict { scope, service: key });
        }
        table.insert(key, Box::new(instance));
        Ok(())
    }

    /// Resolve service `T` starting at `start` and walking its ancestors
    pub fn resolve<T: ?Sized + 'static>(
        &self,
        start: ScopeId,
        scopes: &ScopeRegistry,
    ) -> DiResult<Rc<T>> {
        let key = ServiceKey::of::<T>();
        scopes
            .ancestors(start)
            .find_map(|scope| self.lookup(scope, key))
            .and_then(|stored| stored.downcast_ref::<Rc<T>>())
            .cloned()
            .ok_or_else(|| DiError::missing::<T>(start))
    }

    /// Scope whose binding would satisfy a lookup of `key` from `start`
    pub fn provider_of(&self, key: ServiceKey, start: ScopeId, scopes: &ScopeRegistry) -> Option<ScopeId> {
        scopes
            .ancestors(start)
            .find(|scope| self.lookup(*scope, key).is_some())
    }

    fn lookup(&self, scope: ScopeId, key: ServiceKey) -> Option<&dyn Any> {
        self.tables
            .get(&scope)
            .and_then(|table| table.get(&key))
            .map(|stored| &**stored)
    }

    /// Retract a single binding. Returns whether anything was removed.
    pub fn remove(&mut self, scope: ScopeId, key: ServiceKey) -> bool {
        let Some(table) = self.tables.get_mut(&scope) else {
            return false;
        };
        let removed = table.remove(&key).is_some();
        if table.is_empty() {
            self.tables.remove(&scope);
        }
        removed
    }

    /// Retract the listed bindings of one scope, returning how many existed
    pub fn remove_scope(&mut self, scope: ScopeId, keys: &[ServiceKey]) -> usize {
        keys.iter().filter(|key| self.remove(scope, **key)).count()
    }

    /// Whether `scope` itself binds `key`
    pub fn is_bound(&self, scope: ScopeId, key: ServiceKey) -> bool {
        self.lookup(scope, key).is_some()
    }

    /// Number of bindings across all scopes
    pub fn len(&self) -> usize {
        self.tables.values().map(HashMap::len).sum()
    }

    /// Whether no bindings exist
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Drop every binding
    pub fn clear(&mut self) {
        self.tables.clear();
    }
}
