use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A typed, generation-tagged reference to an entity of type `T` in a
/// [`TopologyArena`](crate::TopologyArena).
///
/// Handles are plain `Copy` values. Resolving one against an arena that
/// has since been reset, or against a different arena, fails instead of
/// silently aliasing a newer entity with the same id.
pub struct Handle<T> {
    id: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    pub(crate) fn new(id: u32, generation: u32) -> Self {
        Self {
            id,
            generation,
            _marker: PhantomData,
        }
    }

    /// The entity id (also its STEP instance number).
    pub fn id(self) -> u32 {
        self.id
    }

    /// The arena generation that issued this handle.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.id, self.generation)
    }
}
