//! # Nested DI
//!
//! Hierarchical, scope-based dependency injection for object trees.
//!
//! ## Features
//!
//! - **Nested Scopes**: Every scope binds services visible to its descendants
//! - **Nearest Wins**: Resolution walks the parent chain, closest binding first
//! - **Exact Teardown**: A retracted scope removes exactly what it bound
//! - **Scoped Instantiation**: Runtime-spawned subtrees are parented to the scope that asked
//! - **Host Agnostic**: The object tree is reached through the [`HostTree`](host::HostTree) trait
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nested_di::prelude::*;
//! use std::rc::Rc;
//!
//! struct Score(u32);
//!
//! struct Level;
//!
//! impl Scope for Level {
//!     fn construct(&mut self, binder: &mut DependencyBinder<'_>, _config: Option<ScopeConfig>) -> DiResult<()> {
//!         binder.bind_value(Score(0))?;
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> DiResult<()> {
//!     let mut tree = SceneTree::new();
//!     let mut container = Container::new(ContainerSettings::default());
//!
//!     let project = tree.create_scope_node("project", ProjectContext::new());
//!     let level = tree.create_scope_node("level", Level);
//!     tree.add_child(project, level)?;
//!
//!     let root = tree.root();
//!     container.attach(&mut tree, root, project)?;
//!
//!     let level_scope = container.scope_of(level).expect("level started");
//!     let score: Rc<Score> = container.resolve(level_scope)?;
//!     assert_eq!(score.0, 0);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core kernel
pub mod binder;
pub mod container;
pub mod error;
pub mod handoff;
pub mod lifecycle;
pub mod registry;
pub mod resolver;
pub mod scope;

// Host boundary and instantiation
pub mod factory;
pub mod host;
pub mod project;

// Ambient
pub mod config;
pub mod foundation;

pub use binder::DependencyBinder;
pub use container::Container;
pub use error::{DiError, DiResult};
pub use resolver::Resolver;
pub use scope::{Scope, ScopeConfig, ScopeId, ScopeKind};

/// Common imports for kernel users
pub mod prelude {
    pub use crate::{
        config::{Config, ContainerSettings},
        factory::{NodeFactory, TemplateNodeFactory},
        host::{HostTree, NodeId, SceneTree, TemplateLibrary},
        lifecycle::LifecycleState,
        project::ProjectContext,
        Container, DependencyBinder, DiError, DiResult, Resolver, Scope, ScopeConfig, ScopeId, ScopeKind,
    };
}
