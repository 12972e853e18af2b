//! Error types for scope and binding operations

use crate::config::ConfigError;
use crate::registry::ServiceKey;
use crate::scope::ScopeId;
use thiserror::Error;

/// Convenience result alias used throughout the crate
pub type DiResult<T> = Result<T, DiError>;

/// Errors raised by the injection kernel
#[derive(Error, Debug)]
pub enum DiError {
    /// The same service was bound twice within one scope
    #[error("Binding conflict: {service} is already bound in scope {scope}")]
    BindingConflict {
        /// Scope that attempted the second bind
        scope: ScopeId,
        /// Service key that was already present
        service: ServiceKey,
    },

    /// No scope in the ancestor chain binds the requested service
    #[error("Resolution miss: no scope in the chain of {from} binds {service}")]
    ResolutionMiss {
        /// Requested service key
        service: ServiceKey,
        /// Scope the walk started from
        from: ScopeId,
    },

    /// The host could not produce an instance for a template name
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// The template produced an object of an unexpected type
    #[error("Template '{template}' does not contain a {expected}")]
    WrongTemplateType {
        /// Template name
        template: String,
        /// Expected scope type name
        expected: &'static str,
    },

    /// Parent/config handoff was used out of protocol
    #[error("Handoff protocol violation: {0}")]
    HandoffViolation(String),

    /// Scope id is not (or no longer) registered
    #[error("Unknown scope: {0}")]
    UnknownScope(ScopeId),

    /// The host tree rejected an operation
    #[error("Host tree error: {0}")]
    Host(String),

    /// A scope's own construct or inject logic failed
    #[error("Construct error: {0}")]
    Construct(String),

    /// Settings could not be loaded or saved
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl DiError {
    /// Create a resolution miss for a concrete service type
    pub fn missing<T: ?Sized + 'static>(from: ScopeId) -> Self {
        Self::ResolutionMiss {
            service: ServiceKey::of::<T>(),
            from,
        }
    }

    /// Create a construct error from any message
    pub fn construct(reason: impl Into<String>) -> Self {
        Self::Construct(reason.into())
    }

    /// Whether this error is a duplicate bind
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::BindingConflict { .. })
    }

    /// Whether this error is a resolution miss
    pub const fn is_resolution_miss(&self) -> bool {
        matches!(self, Self::ResolutionMiss { .. })
    }
}
