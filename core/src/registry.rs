//! Append-only indexed entity storage.
//!
//! An [`EntityRegistry`] is an arena: items are pushed onto a growable vector
//! and the push position becomes their identity. Identities are handed out as
//! `0, 1, 2, ...`, are stable for the lifetime of the registry, and are never
//! reused. There is no public update or delete; domain registries built on
//! top of this one mutate entities in place through `get_mut`.

use crate::error::RegistryError;
use std::fmt;

/// Typed identity of a registry entity.
///
/// Implemented by the newtype ids (`FlightId`, `PassengerId`) so that a flight
/// identity can never be used to look up a passenger.
pub trait EntityId: Copy + Eq + fmt::Debug + fmt::Display {
    /// Build an identity from a registry index
    fn from_index(index: usize) -> Self;

    /// Registry index of this identity
    fn index(self) -> usize;
}

/// An item that can be stored in an [`EntityRegistry`].
pub trait Entity {
    /// Identity type issued for this entity
    type Id: EntityId;

    /// Human-readable entity kind, used in `NotFound` errors
    const KIND: &'static str;
}

/// Append-only indexed store.
///
/// Not internally synchronized; wrap it in a lock to share it between tasks.
///
/// # Example
///
/// ```
/// use flight_control_core::{EntityRegistry, Passenger};
///
/// let mut registry = EntityRegistry::new();
/// let first = registry.add(Passenger::new("Valentina", "Tereshkova"));
/// let second = registry.add(Passenger::new("Sally", "Ride"));
///
/// assert_eq!(first.to_string(), "0");
/// assert_eq!(second.to_string(), "1");
/// assert_eq!(registry.get(second).map(|p| p.surname.as_str()), Ok("Ride"));
/// ```
#[derive(Debug, Clone)]
pub struct EntityRegistry<T: Entity> {
    items: Vec<T>,
}

impl<T: Entity> Default for EntityRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> EntityRegistry<T> {
    /// Create an empty registry
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Append an item and return its freshly assigned identity.
    pub fn add(&mut self, item: T) -> T::Id {
        let id = T::Id::from_index(self.items.len());
        self.items.push(item);
        id
    }

    /// Look up an item by identity.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if `id` was never issued.
    pub fn get(&self, id: T::Id) -> Result<&T, RegistryError> {
        self.items.get(id.index()).ok_or(RegistryError::NotFound {
            entity: T::KIND,
            id: id.index(),
        })
    }

    /// Mutable lookup for domain registries in this crate.
    pub(crate) fn get_mut(&mut self, id: T::Id) -> Result<&mut T, RegistryError> {
        self.items.get_mut(id.index()).ok_or(RegistryError::NotFound {
            entity: T::KIND,
            id: id.index(),
        })
    }

    /// Number of issued identities
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no identity has been issued yet
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over `(id, item)` pairs in identity order
    pub fn iter(&self) -> impl Iterator<Item = (T::Id, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(index, item)| (T::Id::from_index(index), item))
    }
}
