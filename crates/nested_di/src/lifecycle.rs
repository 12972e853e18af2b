//! Per-scope lifecycle bookkeeping

use crate::host::NodeId;
use crate::registry::ServiceKey;
use crate::scope::{ScopeId, ScopeKind};

/// Lifecycle state of a scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// Id assigned, parent resolved
    Created,
    /// Injection and construct phase running
    Constructing,
    /// Walking host descendants for embedded scopes
    InjectingDescendants,
    /// Initialize callbacks running
    Initializing,
    /// Fully wired
    Live,
    /// Bindings being retracted
    Retracting,
    /// Gone; only observable in logs
    Retracted,
}

impl LifecycleState {
    /// Whether the scope is still wiring up
    pub const fn is_starting(self) -> bool {
        matches!(
            self,
            Self::Created | Self::Constructing | Self::InjectingDescendants | Self::Initializing
        )
    }
}

/// What the lifecycle manager remembers about one scope
#[derive(Debug, Clone)]
pub struct ScopeRecord {
    /// Host node carrying the scope
    pub node: NodeId,
    /// How the scope was started
    pub kind: ScopeKind,
    /// Current state
    pub state: LifecycleState,
    /// Services this scope bound, retracted on teardown
    pub bound: Vec<ServiceKey>,
    /// Embedded scopes constructed by this scope's descendant walk
    pub embedded: Vec<ScopeId>,
}

impl ScopeRecord {
    /// Fresh record in the `Created` state
    pub const fn new(node: NodeId, kind: ScopeKind) -> Self {
        Self {
            node,
            kind,
            state: LifecycleState::Created,
            bound: Vec::new(),
            embedded: Vec::new(),
        }
    }

    /// Move to `next`, logging the transition
    pub fn transition(&mut self, id: ScopeId, next: LifecycleState) {
        log::trace!("{} {:?} -> {:?}", id, self.state, next);
        self.state = next;
    }
}
