//! Container tests
//!
//! Shared fixtures for the lifecycle and instantiation suites. [`Recorder`]
//! records every callback into a shared event log so ordering can be
//! asserted.

mod instantiation;

use crate::binder::DependencyBinder;
use crate::container::Container;
use crate::error::{DiError, DiResult};
use crate::host::{HostTree, NodeId, SceneTree};
use crate::resolver::Resolver;
use crate::scope::{Scope, ScopeConfig, ScopeId, ScopeKind};
use std::cell::RefCell;
use std::rc::Rc;

type Events = Rc<RefCell<Vec<String>>>;

fn events() -> Events {
    Rc::default()
}

fn log_of(events: &Events) -> Vec<String> {
    events.borrow().clone()
}

#[derive(Debug, PartialEq, Eq)]
struct Named(String);

struct Recorder {
    label: &'static str,
    kind: ScopeKind,
    provides: Option<&'static str>,
    fail: bool,
    events: Events,
    seen: Option<Rc<Named>>,
    config: Option<u32>,
    initialized_with: Option<Rc<Named>>,
}

impl Recorder {
    fn new(label: &'static str, events: &Events) -> Self {
        Self {
            label,
            kind: ScopeKind::Node,
            provides: None,
            fail: false,
            events: Rc::clone(events),
            seen: None,
            config: None,
            initialized_with: None,
        }
    }

    fn providing(mut self, value: &'static str) -> Self {
        self.provides = Some(value);
        self
    }

    fn embedded(mut self) -> Self {
        self.kind = ScopeKind::Embedded;
        self
    }

    fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    fn record(&self, phase: &str) {
        self.events.borrow_mut().push(format!("{}:{}", phase, self.label));
    }
}

impl Scope for Recorder {
    fn kind(&self) -> ScopeKind {
        self.kind
    }

    fn inject(&mut self, resolver: &Resolver<'_>) -> DiResult<()> {
        self.record("inject");
        self.seen = resolver.try_resolve::<Named>();
        Ok(())
    }

    fn construct(&mut self, binder: &mut DependencyBinder<'_>, config: Option<ScopeConfig>) -> DiResult<()> {
        self.record("construct");
        self.config = ScopeConfig::extract::<u32>(config);
        if let Some(value) = self.provides {
            binder.bind_value(Named(value.to_string()))?;
        }
        if self.fail {
            return Err(DiError::construct(format!("{} refused to construct", self.label)));
        }
        Ok(())
    }

    fn initialize(&mut self, resolver: &Resolver<'_>) {
        self.record("init");
        self.initialized_with = resolver.try_resolve::<Named>();
    }
}

/// Binds the same service twice
struct DoubleBind;

impl Scope for DoubleBind {
    fn construct(&mut self, binder: &mut DependencyBinder<'_>, _config: Option<ScopeConfig>) -> DiResult<()> {
        binder.bind_value(Named("first".into()))?;
        binder.bind_value(Named("second".into()))?;
        Ok(())
    }
}

fn seen(tree: &SceneTree, node: NodeId) -> Option<String> {
    tree.scope_as::<Recorder>(node)
        .and_then(|recorder| recorder.seen.as_ref())
        .map(|named| named.0.clone())
}

fn config_of(tree: &SceneTree, node: NodeId) -> Option<u32> {
    tree.scope_as::<Recorder>(node).and_then(|recorder| recorder.config)
}

/// Attach a detached subtree under the host root and return the scope on `node`
fn attach_top(container: &mut Container, tree: &mut SceneTree, node: NodeId) -> ScopeId {
    let root = tree.root();
    container.attach(tree, root, node).unwrap();
    container.scope_of(node).unwrap()
}
