//! Scope registry: live scope lookup and ancestor walks

use crate::host::NodeId;
use crate::scope::ScopeId;
use std::collections::HashMap;

/// Registry entry for a live scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeEntry {
    /// Parent scope, absent only for the root
    pub parent: Option<ScopeId>,
    /// Host node carrying the scope
    pub node: NodeId,
}

/// Lookup table from scope id to its entry
#[derive(Debug, Default)]
pub struct ScopeRegistry {
    entries: HashMap<ScopeId, ScopeEntry>,
}

impl ScopeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scope. Returns `false` and keeps the existing entry if the
    /// id is already present, since parents never change once set.
    pub fn add(&mut self, id: ScopeId, entry: ScopeEntry) -> bool {
        debug_assert_ne!(Some(id), entry.parent, "scope cannot parent itself");
        if self.entries.contains_key(&id) {
            log::warn!("Scope {} registered twice, keeping first entry", id);
            return false;
        }
        self.entries.insert(id, entry);
        true
    }

    /// Look up a scope
    pub fn get(&self, id: ScopeId) -> Option<&ScopeEntry> {
        self.entries.get(&id)
    }

    /// Parent of a scope; unknown scopes have no parent
    pub fn parent_of(&self, id: ScopeId) -> Option<ScopeId> {
        self.entries.get(&id).and_then(|entry| entry.parent)
    }

    /// Whether the scope is registered
    pub fn contains(&self, id: ScopeId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Unregister a scope
    pub fn remove(&mut self, id: ScopeId) -> Option<ScopeEntry> {
        self.entries.remove(&id)
    }

    /// Walk from `start` (inclusive) to the root
    pub fn ancestors(&self, start: ScopeId) -> Ancestors<'_> {
        Ancestors {
            registry: self,
            next: Some(start),
        }
    }

    /// Number of live scopes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no scope is registered
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Iterator over a scope and its ancestors, nearest first
pub struct Ancestors<'a> {
    registry: &'a ScopeRegistry,
    next: Option<ScopeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = ScopeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.registry.parent_of(current);
        Some(current)
    }
}
