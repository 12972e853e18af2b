//! Scope identifier

use std::fmt;
use uuid::Uuid;

/// Unique, immutable scope identifier
///
/// Ids are minted once per scope and never reused; equality is by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(Uuid);

impl ScopeId {
    /// Mint a fresh id
    pub fn create() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short form keeps log lines readable
        let simple = self.0.simple().to_string();
        write!(f, "scope#{}", &simple[..8])
    }
}
