//! Project-level scope
//!
//! [`ProjectContext`] is meant to sit at the root of the scope tree. It binds
//! the [`NodeFactory`] every descendant instantiates through, then runs any
//! installers registered for project-wide services.

use crate::binder::DependencyBinder;
use crate::error::DiResult;
use crate::factory::{NodeFactory, TemplateNodeFactory};
use crate::scope::{Scope, ScopeConfig};
use std::rc::Rc;

/// Registers services on the project scope's binder
pub type Installer = Box<dyn Fn(&mut DependencyBinder<'_>) -> DiResult<()>>;

/// Root scope binding project-wide services
pub struct ProjectContext {
    factory: Rc<dyn NodeFactory>,
    installers: Vec<Installer>,
}

impl ProjectContext {
    /// Project scope using [`TemplateNodeFactory`]
    pub fn new() -> Self {
        Self {
            factory: Rc::new(TemplateNodeFactory),
            installers: Vec::new(),
        }
    }

    /// Swap the factory bound for descendants
    #[must_use]
    pub fn with_factory(mut self, factory: Rc<dyn NodeFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Add an installer, run in registration order after the factory is bound
    #[must_use]
    pub fn with_installer<F>(mut self, installer: F) -> Self
    where
        F: Fn(&mut DependencyBinder<'_>) -> DiResult<()> + 'static,
    {
        self.installers.push(Box::new(installer));
        self
    }

    /// Number of registered installers
    pub fn installer_count(&self) -> usize {
        self.installers.len()
    }
}

impl Default for ProjectContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope for ProjectContext {
    fn construct(&mut self, binder: &mut DependencyBinder<'_>, config: Option<ScopeConfig>) -> DiResult<()> {
        if let Some(config) = config {
            log::warn!("Project context ignores config of type {}", config.type_name());
        }
        binder.bind::<dyn NodeFactory>(Rc::clone(&self.factory))?;
        for installer in &self.installers {
            installer(binder)?;
        }
        log::debug!(
            "Project context bound {} services from {} installers",
            binder.bound().len(),
            self.installer_count()
        );
        Ok(())
    }

    fn scope_name(&self) -> &'static str {
        "ProjectContext"
    }
}
