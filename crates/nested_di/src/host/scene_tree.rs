//! Slotmap-backed node tree
//!
//! Nodes are created detached, linked into subtrees, and enter the tree
//! when their subtree root is attached below a node that is already inside.

use super::{HostTree, NodeId, TemplateLibrary};
use crate::error::{DiError, DiResult};
use crate::scope::{AsAny, Scope};
use slotmap::SlotMap;

/// Node stored in the scene tree
pub struct SceneNode {
    /// Display name
    pub name: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    scope: Option<Box<dyn Scope>>,
    declared_parent: Option<NodeId>,
    placeholder: Option<String>,
    inside_tree: bool,
}

impl SceneNode {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            scope: None,
            declared_parent: None,
            placeholder: None,
            inside_tree: false,
        }
    }
}

/// Simple host tree with a permanent root node
pub struct SceneTree {
    nodes: SlotMap<NodeId, SceneNode>,
    root: NodeId,
    templates: TemplateLibrary,
}

impl SceneTree {
    /// Create a tree containing only the root node
    pub fn new() -> Self {
        Self::with_templates(TemplateLibrary::new())
    }

    /// Create a tree that instantiates from `templates`
    pub fn with_templates(templates: TemplateLibrary) -> Self {
        let mut nodes = SlotMap::with_key();
        let mut root = SceneNode::new("root");
        root.inside_tree = true;
        let root = nodes.insert(root);
        Self { nodes, root, templates }
    }

    /// Template library
    pub const fn templates(&self) -> &TemplateLibrary {
        &self.templates
    }

    /// Mutable template library
    pub fn templates_mut(&mut self) -> &mut TemplateLibrary {
        &mut self.templates
    }

    /// Create a detached plain node
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        self.nodes.insert(SceneNode::new(name))
    }

    /// Create a detached node carrying a scope object
    pub fn create_scope_node(&mut self, name: impl Into<String>, scope: impl Scope + 'static) -> NodeId {
        let mut node = SceneNode::new(name);
        node.scope = Some(Box::new(scope));
        self.nodes.insert(node)
    }

    /// Create a detached placeholder standing in for `template`
    pub fn create_placeholder(&mut self, name: impl Into<String>, template: impl Into<String>) -> NodeId {
        let mut node = SceneNode::new(name);
        node.placeholder = Some(template.into());
        self.nodes.insert(node)
    }

    /// Link `child` under `parent` while building a detached subtree
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> DiResult<NodeId> {
        self.attach(parent, child)?;
        Ok(child)
    }

    /// Name `parent` as the explicit parent scope of `node`
    pub fn set_declared_parent(&mut self, node: NodeId, parent: Option<NodeId>) {
        if let Some(entry) = self.nodes.get_mut(node) {
            entry.declared_parent = parent;
        }
    }

    /// Node by handle
    pub fn get(&self, node: NodeId) -> Option<&SceneNode> {
        self.nodes.get(node)
    }

    /// Node name
    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).map(|entry| entry.name.as_str())
    }

    /// First node inside the tree with the given name, in preorder
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.preorder(self.root)
            .into_iter()
            .find(|node| self.name(*node) == Some(name))
    }

    /// First node with the given name below `from`, in preorder
    pub fn find_below(&self, from: NodeId, name: &str) -> Option<NodeId> {
        self.preorder(from)
            .into_iter()
            .find(|node| self.name(*node) == Some(name))
    }

    /// Typed view of a node's scope object
    pub fn scope_as<S: Scope + 'static>(&self, node: NodeId) -> Option<&S> {
        self.scope(node)?.as_any().downcast_ref::<S>()
    }

    /// Mutable typed view of a node's scope object
    pub fn scope_as_mut<S: Scope + 'static>(&mut self, node: NodeId) -> Option<&mut S> {
        self.scope_mut(node)?.as_any_mut().downcast_mut::<S>()
    }

    /// Whether the handle refers to a live node
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(node)
    }

    /// Number of nodes, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn preorder(&self, from: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![from];
        while let Some(node) = stack.pop() {
            let Some(entry) = self.nodes.get(node) else {
                continue;
            };
            order.push(node);
            stack.extend(entry.children.iter().rev().copied());
        }
        order
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == candidate {
                return true;
            }
            cursor = self.nodes.get(current).and_then(|entry| entry.parent);
        }
        false
    }

    fn set_inside(&mut self, nodes: &[NodeId], inside: bool) {
        for node in nodes {
            if let Some(entry) = self.nodes.get_mut(*node) {
                entry.inside_tree = inside;
            }
        }
    }
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

impl HostTree for SceneTree {
    fn root(&self) -> NodeId {
        self.root
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node)?.parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes
            .get(node)
            .map(|entry| entry.children.clone())
            .unwrap_or_default()
    }

    fn is_inside_tree(&self, node: NodeId) -> bool {
        self.nodes.get(node).is_some_and(|entry| entry.inside_tree)
    }

    fn scope(&self, node: NodeId) -> Option<&(dyn Scope + 'static)> {
        self.nodes.get(node)?.scope.as_deref()
    }

    fn scope_mut(&mut self, node: NodeId) -> Option<&mut (dyn Scope + 'static)> {
        self.nodes.get_mut(node)?.scope.as_deref_mut()
    }

    fn declared_parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node)?.declared_parent
    }

    fn placeholder(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node)?.placeholder.as_deref()
    }

    fn instantiate(&mut self, template: &str) -> Option<NodeId> {
        let builder = self.templates.get(template)?;
        let instance = builder(self);
        self.contains(instance).then_some(instance)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) -> DiResult<Vec<NodeId>> {
        if !self.contains(parent) || !self.contains(child) {
            return Err(DiError::Host(format!("cannot attach {:?} to {:?}: unknown node", child, parent)));
        }
        if self.parent(child).is_some() || child == self.root {
            return Err(DiError::Host(format!("{} already has a parent", self.describe(child))));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(DiError::Host(format!(
                "attaching {} under {} would create a cycle",
                self.describe(child),
                self.describe(parent)
            )));
        }

        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);

        if !self.is_inside_tree(parent) {
            return Ok(Vec::new());
        }
        let entered = self.preorder(child);
        self.set_inside(&entered, true);
        Ok(entered)
    }

    fn detach(&mut self, node: NodeId) -> DiResult<Vec<NodeId>> {
        let Some(parent) = self.parent(node) else {
            return Err(DiError::Host(format!("{} is not attached", self.describe(node))));
        };
        let was_inside = self.is_inside_tree(node);

        self.nodes[parent].children.retain(|child| *child != node);
        self.nodes[node].parent = None;

        if !was_inside {
            return Ok(Vec::new());
        }
        let mut exited = self.preorder(node);
        self.set_inside(&exited, false);
        exited.reverse();
        Ok(exited)
    }

    fn discard(&mut self, node: NodeId) {
        if node == self.root {
            log::warn!("Refusing to discard the tree root");
            return;
        }
        if self.parent(node).is_some() {
            log::warn!("Discarding attached node {}, detaching first", self.describe(node));
            if let Err(err) = self.detach(node) {
                log::error!("Failed to detach {} before discarding: {}", self.describe(node), err);
                return;
            }
        }
        for doomed in self.preorder(node) {
            self.nodes.remove(doomed);
        }
    }

    fn describe(&self, node: NodeId) -> String {
        match self.name(node) {
            Some(name) => format!("'{}'", name),
            None => format!("{:?}", node),
        }
    }
}
