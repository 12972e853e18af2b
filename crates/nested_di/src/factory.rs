//! Injection-aware instantiation
//!
//! Scopes that create objects at runtime resolve `dyn NodeFactory` from their
//! chain instead of talking to the host directly, so anything they spawn is
//! parented to the scope they name and never to whatever happens to be
//! nearest in the host tree.

use crate::container::Container;
use crate::error::DiResult;
use crate::host::{HostTree, NodeId};
use crate::scope::{Scope, ScopeConfig, ScopeId};

/// Creates template instances wired under a chosen parent scope
pub trait NodeFactory {
    /// Instantiate `template`, attach it under `parent`, and start its scopes
    /// with `parent_scope` as their parent.
    ///
    /// Returns `Ok(None)` when the template does not exist; the failure is
    /// logged.
    fn instantiate(
        &self,
        container: &mut Container,
        tree: &mut dyn HostTree,
        parent_scope: ScopeId,
        template: &str,
        parent: NodeId,
        config: Option<ScopeConfig>,
    ) -> DiResult<Option<NodeId>>;

    /// Realize an instance placeholder next to the placeholder node
    fn instantiate_placeholder(
        &self,
        container: &mut Container,
        tree: &mut dyn HostTree,
        parent_scope: ScopeId,
        placeholder: NodeId,
        config: Option<ScopeConfig>,
    ) -> DiResult<Option<NodeId>>;
}

/// Factory that instantiates from the host's template library
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateNodeFactory;

impl NodeFactory for TemplateNodeFactory {
    fn instantiate(
        &self,
        container: &mut Container,
        tree: &mut dyn HostTree,
        parent_scope: ScopeId,
        template: &str,
        parent: NodeId,
        config: Option<ScopeConfig>,
    ) -> DiResult<Option<NodeId>> {
        container.instantiate(tree, parent_scope, template, parent, config)
    }

    fn instantiate_placeholder(
        &self,
        container: &mut Container,
        tree: &mut dyn HostTree,
        parent_scope: ScopeId,
        placeholder: NodeId,
        config: Option<ScopeConfig>,
    ) -> DiResult<Option<NodeId>> {
        container.instantiate_placeholder(tree, parent_scope, placeholder, config)
    }
}

impl TemplateNodeFactory {
    /// Instantiate `template` and hand back its root only if it carries a
    /// scope of type `S`
    pub fn instantiate_scope<S: Scope + 'static>(
        container: &mut Container,
        tree: &mut dyn HostTree,
        parent_scope: ScopeId,
        template: &str,
        parent: NodeId,
        config: Option<ScopeConfig>,
    ) -> DiResult<Option<NodeId>> {
        container.instantiate_scope::<S>(tree, parent_scope, template, parent, config)
    }
}
