//! Container settings

use super::Config;
use serde::{Deserialize, Serialize};

/// Settings for a [`Container`](crate::Container)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    /// Template instantiated under the host root at bootstrap; its root
    /// scope becomes the project scope
    pub root_template: Option<String>,
    /// Treat an unconsumed handoff config as an error instead of a warning
    pub strict_handoff: bool,
    /// `env_logger` filter used by [`init_with_filter`](crate::foundation::logging::init_with_filter)
    pub log_filter: Option<String>,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            root_template: None,
            strict_handoff: true,
            log_filter: None,
        }
    }
}

impl ContainerSettings {
    /// Settings that bootstrap from `template`
    pub fn with_root_template(template: impl Into<String>) -> Self {
        Self {
            root_template: Some(template.into()),
            ..Self::default()
        }
    }
}

impl Config for ContainerSettings {}
