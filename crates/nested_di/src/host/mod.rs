//! Host tree boundary
//!
//! The kernel never owns the object tree. It sees it through [`HostTree`]:
//! ordered children, parent links, the scope object (if any) carried by a
//! node, template instantiation and attach/detach with the list of nodes
//! whose tree membership changed.
//!
//! [`SceneTree`] is a slotmap-backed implementation used by the demo and
//! the tests.

mod scene_tree;
mod template;

pub use scene_tree::{SceneNode, SceneTree};
pub use template::{TemplateBuilder, TemplateLibrary};

use crate::error::DiResult;
use crate::scope::Scope;

slotmap::new_key_type! {
    /// Handle to a node in the host tree
    pub struct NodeId;
}

/// Object tree the kernel mirrors
pub trait HostTree {
    /// Permanent root node, always inside the tree
    fn root(&self) -> NodeId;

    /// Parent node, if attached
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children in order
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Whether the node is connected to the root
    fn is_inside_tree(&self, node: NodeId) -> bool;

    /// Scope object carried by the node
    fn scope(&self, node: NodeId) -> Option<&(dyn Scope + 'static)>;

    /// Mutable scope object carried by the node
    fn scope_mut(&mut self, node: NodeId) -> Option<&mut (dyn Scope + 'static)>;

    /// Node the object explicitly names as its parent scope
    fn declared_parent(&self, _node: NodeId) -> Option<NodeId> {
        None
    }

    /// Template name if the node is an instance placeholder
    fn placeholder(&self, _node: NodeId) -> Option<&str> {
        None
    }

    /// Build a detached instance of a named template
    fn instantiate(&mut self, template: &str) -> Option<NodeId>;

    /// Attach `child` under `parent`. Returns the nodes that entered the
    /// tree, parents before children.
    fn attach(&mut self, parent: NodeId, child: NodeId) -> DiResult<Vec<NodeId>>;

    /// Detach `node` from its parent. Returns the nodes that left the tree,
    /// children before parents.
    fn detach(&mut self, node: NodeId) -> DiResult<Vec<NodeId>>;

    /// Free a detached subtree
    fn discard(&mut self, node: NodeId);

    /// Human-readable node label for logs
    fn describe(&self, node: NodeId) -> String {
        format!("{:?}", node)
    }
}
