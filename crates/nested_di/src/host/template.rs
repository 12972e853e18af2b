//! Named templates that build detached node subtrees

use super::{NodeId, SceneTree};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Builds one instance of a template and returns its (detached) root
pub type TemplateBuilder = Rc<dyn Fn(&mut SceneTree) -> NodeId>;

/// Template registry keyed by name
#[derive(Default, Clone)]
pub struct TemplateLibrary {
    builders: HashMap<String, TemplateBuilder>,
}

impl TemplateLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a template
    pub fn register<F>(&mut self, name: impl Into<String>, builder: F)
    where
        F: Fn(&mut SceneTree) -> NodeId + 'static,
    {
        let name = name.into();
        if self.builders.insert(name.clone(), Rc::new(builder)).is_some() {
            log::debug!("Template '{}' replaced", name);
        }
    }

    /// Builder for a template
    pub fn get(&self, name: &str) -> Option<TemplateBuilder> {
        self.builders.get(name).cloned()
    }

    /// Whether a template is registered
    pub fn contains(&self, name: &str) -> bool {
        self.builders.contains_key(name)
    }

    /// Registered template names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.builders.keys().map(String::as_str)
    }
}

impl fmt::Debug for TemplateLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}
