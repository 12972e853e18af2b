//! Scope lifecycle manager
//!
//! [`Container`] owns every registry the kernel needs: scope hierarchy,
//! service tables, the handoff slot and per-scope records. The host feeds it
//! tree notifications (or lets it drive attach/detach); it answers by
//! starting and retracting scopes.
//!
//! Start sequence for a scope entering the tree:
//!
//! ```text
//! resolve parent -> register -> inject (parent chain) -> construct (binder)
//!   -> walk descendants for embedded scopes -> initialize self, then embedded
//!   -> Live
//! ```
//!
//! Parent resolution order: explicit start recorded by the factory, declared
//! parent node, nearest registered scope above the node (switching to the
//! handoff parent when the walk leaves an instantiated subtree), the root.
//! With no root installed the scope becomes the root.

#[cfg(test)]
mod tests;

use crate::binder::DependencyBinder;
use crate::config::ContainerSettings;
use crate::error::{DiError, DiResult};
use crate::factory::NodeFactory;
use crate::handoff::{HandoffSlot, TemporaryParent};
use crate::host::{HostTree, NodeId};
use crate::lifecycle::{LifecycleState, ScopeRecord};
use crate::registry::{ModuleRegistry, ScopeEntry, ScopeRegistry, ServiceKey};
use crate::resolver::Resolver;
use crate::scope::{AsAny, Scope, ScopeConfig, ScopeId, ScopeKind};
use std::any;
use std::collections::HashMap;
use std::rc::Rc;

/// Parent and config the factory hands to a scope it instantiated
#[derive(Debug)]
struct ExplicitStart {
    parent: Option<ScopeId>,
    config: Option<ScopeConfig>,
}

/// Where a starting scope hangs in the hierarchy
#[derive(Debug)]
struct Placement {
    parent: Option<ScopeId>,
    config: Option<ScopeConfig>,
}

/// Injection context: registries plus scope lifecycle
pub struct Container {
    settings: ContainerSettings,
    modules: ModuleRegistry,
    scopes: ScopeRegistry,
    handoff: HandoffSlot,
    records: HashMap<ScopeId, ScopeRecord>,
    node_scopes: HashMap<NodeId, ScopeId>,
    explicit_starts: HashMap<NodeId, ExplicitStart>,
    root: Option<ScopeId>,
}

impl Container {
    /// Create an empty container
    pub fn new(settings: ContainerSettings) -> Self {
        Self {
            settings,
            modules: ModuleRegistry::new(),
            scopes: ScopeRegistry::new(),
            handoff: HandoffSlot::new(),
            records: HashMap::new(),
            node_scopes: HashMap::new(),
            explicit_starts: HashMap::new(),
            root: None,
        }
    }

    /// Settings in effect
    pub const fn settings(&self) -> &ContainerSettings {
        &self.settings
    }

    // ---- Queries ----

    /// Root scope, if one is installed
    pub const fn root(&self) -> Option<ScopeId> {
        self.root
    }

    /// Scope carried by a host node
    pub fn scope_of(&self, node: NodeId) -> Option<ScopeId> {
        self.node_scopes.get(&node).copied()
    }

    /// Host node carrying a scope
    pub fn node_of(&self, scope: ScopeId) -> Option<NodeId> {
        self.records.get(&scope).map(|record| record.node)
    }

    /// Parent of a registered scope
    pub fn parent_of(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes.parent_of(scope)
    }

    /// Lifecycle state of a registered scope
    pub fn state_of(&self, scope: ScopeId) -> Option<LifecycleState> {
        self.records.get(&scope).map(|record| record.state)
    }

    /// Whether a scope finished starting and has not been retracted
    pub fn is_live(&self, scope: ScopeId) -> bool {
        self.state_of(scope) == Some(LifecycleState::Live)
    }

    /// Number of registered scopes
    pub fn live_scopes(&self) -> usize {
        self.scopes.len()
    }

    /// Number of bindings across all scopes
    pub fn binding_count(&self) -> usize {
        self.modules.len()
    }

    /// Services bound by one scope
    pub fn bound_services(&self, scope: ScopeId) -> &[ServiceKey] {
        self.records
            .get(&scope)
            .map(|record| record.bound.as_slice())
            .unwrap_or_default()
    }

    /// Embedded scopes constructed by a scope's descendant walk
    pub fn embedded_scopes(&self, scope: ScopeId) -> &[ScopeId] {
        self.records
            .get(&scope)
            .map(|record| record.embedded.as_slice())
            .unwrap_or_default()
    }

    /// Handoff slot, for inspection
    pub const fn handoff(&self) -> &HandoffSlot {
        &self.handoff
    }

    /// Resolution handle anchored at `scope`
    pub const fn resolver(&self, scope: ScopeId) -> Resolver<'_> {
        Resolver::new(&self.modules, &self.scopes, scope)
    }

    /// Resolve `T` starting at `scope`
    pub fn resolve<T: ?Sized + 'static>(&self, scope: ScopeId) -> DiResult<Rc<T>> {
        self.resolver(scope).resolve::<T>()
    }

    /// Node factory visible from `scope`
    pub fn factory(&self, scope: ScopeId) -> DiResult<Rc<dyn NodeFactory>> {
        self.resolve::<dyn NodeFactory>(scope)
    }

    // ---- Host notifications ----

    /// Attach `child` under `parent` and start every scope that entered
    pub fn attach(&mut self, tree: &mut dyn HostTree, parent: NodeId, child: NodeId) -> DiResult<()> {
        let entered = tree.attach(parent, child)?;
        self.dispatch_entered(tree, &entered)
    }

    /// Detach `node` and retract every scope that left
    pub fn detach(&mut self, tree: &mut dyn HostTree, node: NodeId) -> DiResult<()> {
        for exited in tree.detach(node)? {
            self.node_exiting(exited);
        }
        Ok(())
    }

    /// Deliver entry notifications in order and return the first failure.
    ///
    /// Nodes below a scope that failed to start are skipped; they stay
    /// unwired rather than falling through to an unrelated parent.
    pub fn dispatch_entered(&mut self, tree: &mut dyn HostTree, entered: &[NodeId]) -> DiResult<()> {
        let mut first_error = None;
        let mut failed: Vec<NodeId> = Vec::new();
        for node in entered {
            if let Some(blocker) = Self::failed_ancestor(tree, *node, &failed) {
                log::warn!(
                    "Skipping {}: enclosing scope on {} failed to start",
                    tree.describe(*node),
                    tree.describe(blocker)
                );
                continue;
            }
            if let Err(err) = self.node_entered(tree, *node) {
                failed.push(*node);
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn failed_ancestor(tree: &dyn HostTree, node: NodeId, failed: &[NodeId]) -> Option<NodeId> {
        if failed.is_empty() {
            return None;
        }
        let mut cursor = tree.parent(node);
        while let Some(current) = cursor {
            if failed.contains(&current) {
                return Some(current);
            }
            cursor = tree.parent(current);
        }
        None
    }

    /// Tree-entry notification for one node
    pub fn node_entered(&mut self, tree: &mut dyn HostTree, node: NodeId) -> DiResult<Option<ScopeId>> {
        if let Some(existing) = self.scope_of(node) {
            // Embedded scopes are started by their enclosing scope's walk
            return Ok(Some(existing));
        }
        let Some(kind) = tree.scope(node).map(|scope| scope.kind()) else {
            self.explicit_starts.remove(&node);
            return Ok(None);
        };

        let placement = self.place(tree, node)?;
        self.start_scope(tree, node, kind, placement).map(Some)
    }

    /// Tree-exit notification for one node
    pub fn node_exiting(&mut self, node: NodeId) {
        self.explicit_starts.remove(&node);
        if let Some(scope) = self.scope_of(node) {
            self.retract(scope);
        }
    }

    // ---- Lifecycle ----

    fn place(&mut self, tree: &dyn HostTree, node: NodeId) -> DiResult<Placement> {
        let mut config = None;
        if let Some(start) = self.explicit_starts.remove(&node) {
            if let Some(parent) = start.parent {
                return Ok(Placement {
                    parent: Some(parent),
                    config: start.config,
                });
            }
            config = start.config;
        }

        if let Some(declared) = tree.declared_parent(node) {
            match self.scope_of(declared) {
                Some(parent) => return Ok(Placement { parent: Some(parent), config }),
                None => log::warn!(
                    "Declared parent {} of {} carries no registered scope, ignoring",
                    tree.describe(declared),
                    tree.describe(node)
                ),
            }
        }

        let handoff = self.handoff.temporary_parent().copied();
        let mut below = node;
        let mut cursor = tree.parent(node);
        while let Some(current) = cursor {
            if let Some(TemporaryParent {
                scope,
                attach_point,
                consumer,
            }) = handoff
            {
                if current == attach_point {
                    if below != consumer {
                        return Err(DiError::HandoffViolation(format!(
                            "{} entered below {} while the handoff is reserved for {}",
                            tree.describe(node),
                            tree.describe(attach_point),
                            tree.describe(consumer)
                        )));
                    }
                    let config = self.handoff.pop_config(consumer)?.or(config);
                    return Ok(Placement {
                        parent: Some(scope),
                        config,
                    });
                }
            }
            if let Some(parent) = self.scope_of(current) {
                return Ok(Placement { parent: Some(parent), config });
            }
            below = current;
            cursor = tree.parent(current);
        }

        Ok(Placement {
            parent: self.root,
            config,
        })
    }

    fn start_scope(
        &mut self,
        tree: &mut dyn HostTree,
        node: NodeId,
        kind: ScopeKind,
        placement: Placement,
    ) -> DiResult<ScopeId> {
        let id = self.register(node, kind, placement.parent);
        if placement.parent.is_none() {
            self.root = Some(id);
            log::info!("{} installed as root scope on {}", id, tree.describe(node));
        }
        log::debug!(
            "Starting {} on {} (parent {})",
            id,
            tree.describe(node),
            placement.parent.map_or_else(|| "none".to_string(), |parent| parent.to_string())
        );

        let started = self
            .construct_scope(tree, id, placement.parent, placement.config)
            .and_then(|()| {
                self.transition(id, LifecycleState::InjectingDescendants);
                self.construct_descendants(tree, node, id, id)
            });
        if let Err(err) = started {
            log::error!("Failed to start {} on {}: {}", id, tree.describe(node), err);
            self.retract(id);
            return Err(err);
        }

        self.initialize_scope(tree, id);
        self.transition(id, LifecycleState::Live);
        Ok(id)
    }

    fn register(&mut self, node: NodeId, kind: ScopeKind, parent: Option<ScopeId>) -> ScopeId {
        let id = ScopeId::create();
        self.scopes.add(id, ScopeEntry { parent, node });
        self.node_scopes.insert(node, id);
        self.records.insert(id, ScopeRecord::new(node, kind));
        id
    }

    fn transition(&mut self, id: ScopeId, next: LifecycleState) {
        if let Some(record) = self.records.get_mut(&id) {
            record.transition(id, next);
        }
    }

    /// Inject against the parent chain, then construct with a fresh binder
    fn construct_scope(
        &mut self,
        tree: &mut dyn HostTree,
        id: ScopeId,
        parent: Option<ScopeId>,
        config: Option<ScopeConfig>,
    ) -> DiResult<()> {
        self.transition(id, LifecycleState::Constructing);
        let node = self.node_of(id).ok_or(DiError::UnknownScope(id))?;
        let label = tree.describe(node);
        let scope = tree
            .scope_mut(node)
            .ok_or_else(|| DiError::Host(format!("{} carries no scope", label)))?;

        scope.inject(&Resolver::new(&self.modules, &self.scopes, parent.unwrap_or(id)))?;

        let mut bound = Vec::new();
        let constructed = {
            let mut binder = DependencyBinder::new(&mut self.modules, id, &mut bound);
            scope.construct(&mut binder, config)
        };
        // Partial bindings are recorded so a failed start retracts them
        if let Some(record) = self.records.get_mut(&id) {
            record.bound.extend(bound);
        }
        constructed
    }

    /// Walk host descendants of `node`, constructing embedded scopes and
    /// stopping at scope boundaries
    fn construct_descendants(
        &mut self,
        tree: &mut dyn HostTree,
        node: NodeId,
        enclosing: ScopeId,
        owner: ScopeId,
    ) -> DiResult<()> {
        for child in tree.children(node) {
            match tree.scope(child).map(|scope| scope.kind()) {
                Some(ScopeKind::Node) => {
                    log::trace!("Descendant walk of {} stops at {}", owner, tree.describe(child));
                }
                Some(ScopeKind::Embedded) if self.scope_of(child).is_none() => {
                    let embedded = self.start_embedded(tree, child, enclosing)?;
                    if let Some(record) = self.records.get_mut(&owner) {
                        record.embedded.push(embedded);
                    }
                    self.construct_descendants(tree, child, embedded, owner)?;
                }
                Some(ScopeKind::Embedded) => {}
                None => self.construct_descendants(tree, child, enclosing, owner)?,
            }
        }
        Ok(())
    }

    fn start_embedded(&mut self, tree: &mut dyn HostTree, node: NodeId, enclosing: ScopeId) -> DiResult<ScopeId> {
        let id = self.register(node, ScopeKind::Embedded, Some(enclosing));
        log::debug!("Constructing embedded {} on {} (parent {})", id, tree.describe(node), enclosing);
        if let Err(err) = self.construct_scope(tree, id, Some(enclosing), None) {
            self.retract(id);
            return Err(err);
        }
        Ok(id)
    }

    /// Initialize the scope itself, then the embedded scopes it constructed
    fn initialize_scope(&mut self, tree: &mut dyn HostTree, id: ScopeId) {
        let embedded = self.embedded_scopes(id).to_vec();
        for scope_id in std::iter::once(id).chain(embedded) {
            self.transition(scope_id, LifecycleState::Initializing);
            let Some(node) = self.node_of(scope_id) else {
                continue;
            };
            if let Some(scope) = tree.scope_mut(node) {
                scope.initialize(&Resolver::new(&self.modules, &self.scopes, scope_id));
            }
            let embedded_kind = self.records.get(&scope_id).map(|record| record.kind) == Some(ScopeKind::Embedded);
            if scope_id != id && embedded_kind {
                self.transition(scope_id, LifecycleState::Live);
            }
        }
    }

    /// Retract a scope: drop its bindings, its embedded scopes and its
    /// registration. Retracting the root resets the container. Returns
    /// `false` if the scope was already gone.
    pub fn retract(&mut self, id: ScopeId) -> bool {
        let Some(mut record) = self.records.remove(&id) else {
            log::trace!("{} already retracted", id);
            return false;
        };
        if record.state.is_starting() {
            log::debug!("Rolling back {} before it went live", id);
        }
        record.transition(id, LifecycleState::Retracting);

        let removed = self.modules.remove_scope(id, &record.bound);
        self.scopes.remove(id);
        if self.node_scopes.get(&record.node) == Some(&id) {
            self.node_scopes.remove(&record.node);
        }
        for embedded in std::mem::take(&mut record.embedded) {
            self.retract(embedded);
        }

        record.transition(id, LifecycleState::Retracted);
        log::debug!("Retracted {:?} scope {} ({} bindings)", record.kind, id, removed);

        if self.root == Some(id) {
            self.reset();
        }
        true
    }

    /// Drop all scopes, bindings and pending handoff state
    pub fn reset(&mut self) {
        log::info!(
            "Resetting container ({} scopes, {} bindings)",
            self.scopes.len(),
            self.modules.len()
        );
        self.modules.clear();
        self.scopes.clear();
        self.handoff.clear();
        self.records.clear();
        self.node_scopes.clear();
        self.explicit_starts.clear();
        self.root = None;
    }

    // ---- Instantiation ----

    /// Instantiate `template` under `parent` with `parent_scope` as the
    /// parent of its scopes. A missing template logs and yields `Ok(None)`.
    pub fn instantiate(
        &mut self,
        tree: &mut dyn HostTree,
        parent_scope: ScopeId,
        template: &str,
        parent: NodeId,
        config: Option<ScopeConfig>,
    ) -> DiResult<Option<NodeId>> {
        self.ensure_registered(parent_scope)?;
        let Some(instance) = Self::build_instance(tree, template) else {
            return Ok(None);
        };
        self.attach_instance(tree, Some(parent_scope), instance, parent, config)?;
        Ok(Some(instance))
    }

    /// Like [`instantiate`](Self::instantiate), but only accepts a template
    /// whose root carries a scope of type `S`. Anything else is discarded.
    pub fn instantiate_scope<S: Scope + 'static>(
        &mut self,
        tree: &mut dyn HostTree,
        parent_scope: ScopeId,
        template: &str,
        parent: NodeId,
        config: Option<ScopeConfig>,
    ) -> DiResult<Option<NodeId>> {
        self.ensure_registered(parent_scope)?;
        let Some(instance) = Self::build_instance(tree, template) else {
            return Ok(None);
        };
        let matches = tree.scope(instance).is_some_and(|scope| scope.as_any().is::<S>());
        if !matches {
            let err = DiError::WrongTemplateType {
                template: template.to_string(),
                expected: any::type_name::<S>(),
            };
            log::error!("{}", err);
            tree.discard(instance);
            return Ok(None);
        }
        self.attach_instance(tree, Some(parent_scope), instance, parent, config)?;
        Ok(Some(instance))
    }

    /// Realize a placeholder: its template is attached under the
    /// placeholder's parent node
    pub fn instantiate_placeholder(
        &mut self,
        tree: &mut dyn HostTree,
        parent_scope: ScopeId,
        placeholder: NodeId,
        config: Option<ScopeConfig>,
    ) -> DiResult<Option<NodeId>> {
        let Some(template) = tree.placeholder(placeholder).map(str::to_owned) else {
            log::error!("{} is not an instance placeholder", tree.describe(placeholder));
            return Ok(None);
        };
        let Some(parent) = tree.parent(placeholder) else {
            log::error!("Placeholder {} is not attached", tree.describe(placeholder));
            return Ok(None);
        };
        self.instantiate(tree, parent_scope, &template, parent, config)
    }

    /// Instantiate the configured root template under the host root
    pub fn bootstrap(&mut self, tree: &mut dyn HostTree) -> DiResult<Option<NodeId>> {
        let Some(template) = self.settings.root_template.clone().filter(|name| !name.is_empty()) else {
            log::warn!("No root template configured, nothing to bootstrap");
            return Ok(None);
        };
        if let Some(root) = self.root {
            log::warn!("Root scope {} already installed, skipping bootstrap", root);
            return Ok(None);
        }
        let Some(instance) = Self::build_instance(tree, &template) else {
            return Ok(None);
        };
        let host_root = tree.root();
        self.attach_instance(tree, None, instance, host_root, None)?;
        log::info!("Bootstrapped '{}' as {}", template, tree.describe(instance));
        Ok(Some(instance))
    }

    fn ensure_registered(&self, scope: ScopeId) -> DiResult<()> {
        if self.scopes.contains(scope) {
            Ok(())
        } else {
            let err = DiError::UnknownScope(scope);
            log::error!("{}", err);
            Err(err)
        }
    }

    fn build_instance(tree: &mut dyn HostTree, template: &str) -> Option<NodeId> {
        if template.is_empty() {
            log::error!("Template to instantiate is not set");
            return None;
        }
        let instance = tree.instantiate(template);
        if instance.is_none() {
            log::error!("{}", DiError::TemplateNotFound(template.to_string()));
        }
        instance
    }

    /// Attach a fresh instance. On failure the instance is detached, its
    /// scopes retracted and the subtree discarded.
    fn attach_instance(
        &mut self,
        tree: &mut dyn HostTree,
        parent_scope: Option<ScopeId>,
        instance: NodeId,
        parent: NodeId,
        config: Option<ScopeConfig>,
    ) -> DiResult<()> {
        let wired = self.wire_instance(tree, parent_scope, instance, parent, config);
        if let Err(err) = &wired {
            log::warn!("Discarding {} after failed instantiation: {}", tree.describe(instance), err);
            if tree.parent(instance).is_some() {
                if let Err(detach_err) = self.detach(tree, instance) {
                    log::error!("Failed to detach {}: {}", tree.describe(instance), detach_err);
                }
            }
            tree.discard(instance);
        }
        wired
    }

    /// A scope at the instance root gets its parent and config directly;
    /// otherwise both travel through the handoff slot.
    fn wire_instance(
        &mut self,
        tree: &mut dyn HostTree,
        parent_scope: Option<ScopeId>,
        instance: NodeId,
        parent: NodeId,
        config: Option<ScopeConfig>,
    ) -> DiResult<()> {
        if tree.scope(instance).is_some() {
            self.explicit_starts.insert(
                instance,
                ExplicitStart {
                    parent: parent_scope,
                    config,
                },
            );
            let attached = self.attach(tree, parent, instance);
            if self.explicit_starts.remove(&instance).is_some() {
                log::warn!("{} did not enter the tree, explicit start dropped", tree.describe(instance));
            }
            return attached;
        }

        let Some(scope) = parent_scope else {
            if config.is_some() {
                log::warn!("Config for {} dropped: no parent scope to hand it through", tree.describe(instance));
            }
            return self.attach(tree, parent, instance);
        };

        self.handoff.set_temporary_parent(Some(TemporaryParent {
            scope,
            attach_point: parent,
            consumer: instance,
        }))?;
        if let Some(config) = config {
            if let Err(err) = self.handoff.push_config(instance, config) {
                self.handoff.clear_temporary_parent();
                return Err(err);
            }
        }

        let attached = self.attach(tree, parent, instance);
        self.handoff.clear_temporary_parent();
        let leftover = self.handoff.take_unconsumed();
        attached?;

        if let Some(config) = leftover {
            let err = DiError::HandoffViolation(format!(
                "config of type {} for {} was not consumed by any scope",
                config.type_name(),
                tree.describe(instance)
            ));
            if self.settings.strict_handoff {
                log::error!("{}", err);
                return Err(err);
            }
            log::warn!("{}", err);
        }
        Ok(())
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(ContainerSettings::default())
    }
}
