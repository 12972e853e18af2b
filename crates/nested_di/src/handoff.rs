//! Single-slot parent/config handoff
//!
//! Carries a parent scope id and a config payload to the scope(s) inside a
//! subtree that is attached without being a scope itself, where neither can
//! be passed as arguments. The slot is tagged with the subtree root it was
//! prepared for; any other consumer is a protocol violation.

use crate::error::{DiError, DiResult};
use crate::host::NodeId;
use crate::scope::{ScopeConfig, ScopeId};

/// Temporary parent for scopes entering below `attach_point`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemporaryParent {
    /// Scope that becomes the parent
    pub scope: ScopeId,
    /// Host node the subtree is attached under
    pub attach_point: NodeId,
    /// Root node of the subtree the handoff was prepared for
    pub consumer: NodeId,
}

#[derive(Debug)]
struct PendingConfig {
    consumer: NodeId,
    config: ScopeConfig,
}

/// Handoff slot; holds at most one outstanding value
#[derive(Debug, Default)]
pub struct HandoffSlot {
    parent: Option<TemporaryParent>,
    config: Option<PendingConfig>,
}

impl HandoffSlot {
    /// Create an empty slot
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or clear the temporary parent. Setting while one is outstanding
    /// is rejected; the slot is not reentrant.
    pub fn set_temporary_parent(&mut self, parent: Option<TemporaryParent>) -> DiResult<()> {
        match (parent, self.parent) {
            (Some(next), Some(current)) => Err(DiError::HandoffViolation(format!(
                "temporary parent for {:?} requested while {:?} is still pending",
                next.consumer, current.consumer
            ))),
            (next, _) => {
                self.parent = next;
                Ok(())
            }
        }
    }

    /// Clear the temporary parent; a staged config is left for the caller
    /// to inspect with [`take_unconsumed`](Self::take_unconsumed)
    pub fn clear_temporary_parent(&mut self) {
        self.parent = None;
    }

    /// Outstanding temporary parent
    pub const fn temporary_parent(&self) -> Option<&TemporaryParent> {
        self.parent.as_ref()
    }

    /// Stage a config for `consumer`
    pub fn push_config(&mut self, consumer: NodeId, config: ScopeConfig) -> DiResult<()> {
        if let Some(pending) = &self.config {
            return Err(DiError::HandoffViolation(format!(
                "config for {:?} pushed while config for {:?} is unconsumed",
                consumer, pending.consumer
            )));
        }
        self.config = Some(PendingConfig { consumer, config });
        Ok(())
    }

    /// Read the staged config once. A consumer other than the tagged one is
    /// refused and the config stays staged.
    pub fn pop_config(&mut self, consumer: NodeId) -> DiResult<Option<ScopeConfig>> {
        match &self.config {
            None => Ok(None),
            Some(pending) if pending.consumer != consumer => Err(DiError::HandoffViolation(format!(
                "config staged for {:?} consumed by {:?}",
                pending.consumer, consumer
            ))),
            Some(_) => Ok(self.config.take().map(|pending| pending.config)),
        }
    }

    /// Remove a config nobody consumed
    pub fn take_unconsumed(&mut self) -> Option<ScopeConfig> {
        self.config.take().map(|pending| pending.config)
    }

    /// Whether nothing is outstanding
    pub const fn is_empty(&self) -> bool {
        self.parent.is_none() && self.config.is_none()
    }

    /// Drop any outstanding value
    pub fn clear(&mut self) {
        self.parent = None;
        self.config = None;
    }
}
