//! Factory instantiation, handoff and bootstrap

use super::*;
use crate::config::ContainerSettings;
use crate::factory::TemplateNodeFactory;
use crate::project::ProjectContext;

struct World {
    tree: SceneTree,
    container: Container,
    events: Events,
    a_node: NodeId,
    a_scope: ScopeId,
}

fn register_templates(tree: &mut SceneTree, events: &Events) {
    let templates = tree.templates_mut();

    let log = Rc::clone(events);
    templates.register("enemy", move |tree: &mut SceneTree| {
        tree.create_scope_node("enemy", Recorder::new("enemy", &log))
    });

    let log = Rc::clone(events);
    templates.register("squad", move |tree: &mut SceneTree| {
        let squad = tree.create_node("squad");
        let leader = tree.create_scope_node("leader", Recorder::new("leader", &log).providing("leader"));
        let follower = tree.create_scope_node("follower", Recorder::new("follower", &log));
        let wing = tree.create_scope_node("wing", Recorder::new("wing", &log));
        let _ = tree.add_child(squad, leader);
        let _ = tree.add_child(leader, follower);
        let _ = tree.add_child(squad, wing);
        squad
    });

    templates.register("props", |tree: &mut SceneTree| {
        let props = tree.create_node("props");
        let crate_node = tree.create_node("crate");
        let _ = tree.add_child(props, crate_node);
        props
    });
}

fn world_with(settings: ContainerSettings) -> World {
    let events = events();
    let mut tree = SceneTree::new();
    register_templates(&mut tree, &events);
    let mut container = Container::new(settings);

    let project = tree.create_scope_node("project", ProjectContext::new());
    let a_node = tree.create_scope_node("a", Recorder::new("a", &events).providing("a"));
    tree.add_child(project, a_node).unwrap();
    attach_top(&mut container, &mut tree, project);
    let a_scope = container.scope_of(a_node).unwrap();

    World {
        tree,
        container,
        events,
        a_node,
        a_scope,
    }
}

fn world() -> World {
    world_with(ContainerSettings::default())
}

#[test]
fn test_instance_is_parented_to_requested_scope() {
    let World {
        mut tree,
        mut container,
        a_scope,
        ..
    } = world();
    let host_root = tree.root();

    let enemy = container
        .instantiate(&mut tree, a_scope, "enemy", host_root, None)
        .unwrap()
        .unwrap();

    // Attached beside the project, yet wired below `a`
    assert_eq!(tree.parent(enemy), Some(host_root));
    let enemy_scope = container.scope_of(enemy).unwrap();
    assert_eq!(container.parent_of(enemy_scope), Some(a_scope));
    assert_eq!(seen(&tree, enemy).as_deref(), Some("a"));
    assert!(container.is_live(enemy_scope));
}

#[test]
fn test_config_reaches_scope_rooted_instance() {
    let World {
        mut tree,
        mut container,
        a_node,
        a_scope,
        ..
    } = world();

    let enemy = container
        .instantiate(&mut tree, a_scope, "enemy", a_node, Some(ScopeConfig::new(5_u32)))
        .unwrap()
        .unwrap();
    assert_eq!(config_of(&tree, enemy), Some(5));
}

#[test]
fn test_handoff_reaches_first_scope_below_plain_instance() {
    let World {
        mut tree,
        mut container,
        a_scope,
        ..
    } = world();
    let host_root = tree.root();

    let squad = container
        .instantiate(&mut tree, a_scope, "squad", host_root, Some(ScopeConfig::new(9_u32)))
        .unwrap()
        .unwrap();
    assert!(container.handoff().is_empty());

    let leader = tree.find_below(squad, "leader").unwrap();
    let follower = tree.find_below(squad, "follower").unwrap();
    let wing = tree.find_below(squad, "wing").unwrap();
    let leader_scope = container.scope_of(leader).unwrap();

    assert_eq!(config_of(&tree, leader), Some(9));
    assert_eq!(config_of(&tree, wing), None);
    assert_eq!(container.parent_of(leader_scope), Some(a_scope));
    assert_eq!(container.parent_of(container.scope_of(wing).unwrap()), Some(a_scope));
    assert_eq!(container.parent_of(container.scope_of(follower).unwrap()), Some(leader_scope));
    assert_eq!(seen(&tree, follower).as_deref(), Some("leader"));
}

#[test]
fn test_unconsumed_config_is_flagged_in_strict_mode() {
    let World {
        mut tree,
        mut container,
        a_node,
        a_scope,
        ..
    } = world();
    let children_before = tree.children(a_node).len();
    let nodes_before = tree.len();

    let err = container
        .instantiate(&mut tree, a_scope, "props", a_node, Some(ScopeConfig::new(1_u32)))
        .unwrap_err();
    assert!(matches!(err, DiError::HandoffViolation(_)));
    assert!(container.handoff().is_empty());

    // The rejected instance is detached and freed
    assert_eq!(tree.children(a_node).len(), children_before);
    assert_eq!(tree.len(), nodes_before);
    assert!(tree.find("props").is_none());

    // The slot is usable again afterwards
    let squad = container.instantiate(&mut tree, a_scope, "squad", a_node, None).unwrap();
    assert!(squad.is_some());
}

/// Host that slips an extra node under the first attach point it sees
struct IntrudingTree {
    inner: SceneTree,
    intruder: Option<NodeId>,
}

impl HostTree for IntrudingTree {
    fn root(&self) -> NodeId {
        self.inner.root()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.parent(node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner.children(node)
    }

    fn is_inside_tree(&self, node: NodeId) -> bool {
        self.inner.is_inside_tree(node)
    }

    fn scope(&self, node: NodeId) -> Option<&(dyn Scope + 'static)> {
        self.inner.scope(node)
    }

    fn scope_mut(&mut self, node: NodeId) -> Option<&mut (dyn Scope + 'static)> {
        self.inner.scope_mut(node)
    }

    fn instantiate(&mut self, template: &str) -> Option<NodeId> {
        self.inner.instantiate(template)
    }

    fn attach(&mut self, parent: NodeId, child: NodeId) -> DiResult<Vec<NodeId>> {
        let mut entered = self.inner.attach(parent, child)?;
        if let Some(intruder) = self.intruder.take() {
            entered.extend(self.inner.attach(parent, intruder)?);
        }
        Ok(entered)
    }

    fn detach(&mut self, node: NodeId) -> DiResult<Vec<NodeId>> {
        self.inner.detach(node)
    }

    fn discard(&mut self, node: NodeId) {
        self.inner.discard(node);
    }

    fn describe(&self, node: NodeId) -> String {
        self.inner.describe(node)
    }
}

#[test]
fn test_foreign_node_at_attach_point_is_a_handoff_violation() {
    let World {
        mut tree,
        mut container,
        events,
        a_node,
        a_scope,
    } = world();
    let stray = tree.create_scope_node("stray", Recorder::new("stray", &events));
    let scopes_before = container.live_scopes();
    let mut host = IntrudingTree {
        inner: tree,
        intruder: Some(stray),
    };

    let err = container
        .instantiate(&mut host, a_scope, "squad", a_node, None)
        .unwrap_err();
    assert!(matches!(err, DiError::HandoffViolation(_)));
    assert!(container.scope_of(stray).is_none());
    assert!(container.handoff().is_empty());

    // The squad itself was rolled back and freed
    assert!(host.inner.find("leader").is_none());
    assert_eq!(container.live_scopes(), scopes_before);
    assert_eq!(host.inner.parent(stray), Some(a_node));
}

#[test]
fn test_ambient_placement_resumes_after_handoff() {
    let World {
        mut tree,
        mut container,
        events,
        a_node,
        a_scope,
    } = world();
    let project_scope = container.root().unwrap();

    let squad = container
        .instantiate(&mut tree, project_scope, "squad", a_node, Some(ScopeConfig::new(4_u32)))
        .unwrap()
        .unwrap();
    let leader = tree.find_below(squad, "leader").unwrap();
    assert_eq!(container.parent_of(container.scope_of(leader).unwrap()), Some(project_scope));
    assert!(container.handoff().is_empty());

    // Attached outside any factory call: nearest host scope, no config
    let late = tree.create_scope_node("late", Recorder::new("late", &events));
    container.attach(&mut tree, a_node, late).unwrap();
    let late_scope = container.scope_of(late).unwrap();
    assert_eq!(container.parent_of(late_scope), Some(a_scope));
    assert_eq!(config_of(&tree, late), None);
    assert_eq!(seen(&tree, late).as_deref(), Some("a"));

    // And the container root when no host scope encloses it
    let host_root = tree.root();
    let loose = tree.create_scope_node("loose", Recorder::new("loose", &events));
    container.attach(&mut tree, host_root, loose).unwrap();
    assert_eq!(container.parent_of(container.scope_of(loose).unwrap()), Some(project_scope));
}

#[test]
fn test_unconsumed_config_only_warns_when_lenient() {
    let settings = ContainerSettings {
        strict_handoff: false,
        ..ContainerSettings::default()
    };
    let World {
        mut tree,
        mut container,
        a_node,
        a_scope,
        ..
    } = world_with(settings);
    let scopes_before = container.live_scopes();

    let props = container
        .instantiate(&mut tree, a_scope, "props", a_node, Some(ScopeConfig::new(1_u32)))
        .unwrap();
    assert!(props.is_some());
    assert_eq!(container.live_scopes(), scopes_before);
    assert!(container.handoff().is_empty());
}

#[test]
fn test_missing_template_yields_nothing() {
    let World {
        mut tree,
        mut container,
        a_node,
        a_scope,
        ..
    } = world();
    let nodes_before = tree.len();

    assert!(container.instantiate(&mut tree, a_scope, "boss", a_node, None).unwrap().is_none());
    assert!(container.instantiate(&mut tree, a_scope, "", a_node, None).unwrap().is_none());
    assert_eq!(tree.len(), nodes_before);
}

#[test]
fn test_unknown_parent_scope_is_rejected() {
    let World {
        mut tree,
        mut container,
        a_node,
        ..
    } = world();

    let err = container
        .instantiate(&mut tree, ScopeId::create(), "enemy", a_node, None)
        .unwrap_err();
    assert!(matches!(err, DiError::UnknownScope(_)));
}

#[test]
fn test_typed_instantiation_discards_wrong_type() {
    let World {
        mut tree,
        mut container,
        a_node,
        a_scope,
        ..
    } = world();
    let nodes_before = tree.len();

    let wrong = container
        .instantiate_scope::<ProjectContext>(&mut tree, a_scope, "enemy", a_node, None)
        .unwrap();
    assert!(wrong.is_none());
    assert_eq!(tree.len(), nodes_before);

    let right = TemplateNodeFactory::instantiate_scope::<Recorder>(&mut container, &mut tree, a_scope, "enemy", a_node, None)
        .unwrap()
        .unwrap();
    assert!(tree.scope_as::<Recorder>(right).is_some());
}

#[test]
fn test_placeholder_realized_beside_itself() {
    let World {
        mut tree,
        mut container,
        a_node,
        a_scope,
        ..
    } = world();

    let slot = tree.create_placeholder("slot", "enemy");
    container.attach(&mut tree, a_node, slot).unwrap();

    let enemy = container
        .instantiate_placeholder(&mut tree, a_scope, slot, Some(ScopeConfig::new(3_u32)))
        .unwrap()
        .unwrap();
    assert_eq!(tree.parent(enemy), Some(a_node));
    assert_eq!(config_of(&tree, enemy), Some(3));
    assert!(tree.contains(slot));

    let not_placeholder = container.instantiate_placeholder(&mut tree, a_scope, enemy, None).unwrap();
    assert!(not_placeholder.is_none());
}

#[test]
fn test_factory_resolved_from_chain() {
    let World {
        mut tree,
        mut container,
        a_node,
        a_scope,
        events,
    } = world();

    let factory = container.factory(a_scope).unwrap();
    let enemy = factory
        .instantiate(&mut container, &mut tree, a_scope, "enemy", a_node, None)
        .unwrap()
        .unwrap();

    assert!(container.scope_of(enemy).is_some());
    assert!(log_of(&events).contains(&"init:enemy".to_string()));
}

#[test]
fn test_instantiated_subtree_tears_down_cleanly() {
    let World {
        mut tree,
        mut container,
        a_node,
        a_scope,
        ..
    } = world();
    let bindings_before = container.binding_count();
    let scopes_before = container.live_scopes();

    let squad = container
        .instantiate(&mut tree, a_scope, "squad", a_node, None)
        .unwrap()
        .unwrap();
    assert_eq!(container.binding_count(), bindings_before + 1);

    container.detach(&mut tree, squad).unwrap();
    assert_eq!(container.binding_count(), bindings_before);
    assert_eq!(container.live_scopes(), scopes_before);
}

#[test]
fn test_bootstrap_installs_project_root() {
    let events = events();
    let mut tree = SceneTree::new();
    let log = Rc::clone(&events);
    tree.templates_mut().register("project", move |tree: &mut SceneTree| {
        let project = tree.create_scope_node("project", ProjectContext::new());
        let level = tree.create_scope_node("level", Recorder::new("level", &log));
        let _ = tree.add_child(project, level);
        project
    });
    let mut container = Container::new(ContainerSettings::with_root_template("project"));

    let project = container.bootstrap(&mut tree).unwrap().unwrap();
    let root_scope = container.scope_of(project).unwrap();
    assert_eq!(container.root(), Some(root_scope));

    let level = tree.find("level").unwrap();
    let level_scope = container.scope_of(level).unwrap();
    assert!(container.factory(level_scope).is_ok());

    // Already bootstrapped
    assert!(container.bootstrap(&mut tree).unwrap().is_none());
}

#[test]
fn test_bootstrap_without_template_is_noop() {
    let mut tree = SceneTree::new();
    let mut container = Container::default();
    assert!(container.bootstrap(&mut tree).unwrap().is_none());
    assert_eq!(container.live_scopes(), 0);
}
