//! Stable identity for mapped types.

use std::any::{Any, TypeId};
use std::hash::{Hash, Hasher};

/// Identity of a backing type: its Rust [`TypeId`] plus the
/// fully-qualified name carried on the wire as the discriminator value.
///
/// Equality and hashing use the `TypeId` only; the name is diagnostic and
/// wire-facing.
#[derive(Debug, Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Creates a key for `T` under the given fully-qualified name.
    pub fn of<T: Any>(name: &'static str) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name,
        }
    }

    /// Returns the backing type's `TypeId`.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the fully-qualified type name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
