//! Service type keys

use std::any::{self, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Key identifying a bindable service type
///
/// Works for unsized types, so `dyn Trait` services get their own key.
/// Equality and hashing use the `TypeId`; the name is diagnostic only.
#[derive(Clone, Copy)]
pub struct ServiceKey {
    id: TypeId,
    name: &'static str,
}

impl ServiceKey {
    /// Key for service type `T`
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: any::type_name::<T>(),
        }
    }

    /// Type name of the service
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Underlying type id
    pub const fn type_id(&self) -> TypeId {
        self.id
    }
}

impl PartialEq for ServiceKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceKey {}

impl Hash for ServiceKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ServiceKey({})", self.name)
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
