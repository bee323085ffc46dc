//! Passengers and the passenger registry.

use crate::error::RegistryError;
use crate::registry::{Entity, EntityId, EntityRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a passenger (its index in the registry)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PassengerId(usize);

impl PassengerId {
    /// Create a `PassengerId` from a raw index
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index
    #[must_use]
    pub const fn get(self) -> usize {
        self.0
    }
}

impl EntityId for PassengerId {
    fn from_index(index: usize) -> Self {
        Self(index)
    }

    fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for PassengerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered passenger.
///
/// Field order is the column order of the passenger log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    /// Given name
    pub name: String,
    /// Family name
    pub surname: String,
}

impl Passenger {
    /// Column names in declaration order
    pub const FIELDS: [&'static str; 2] = ["name", "surname"];

    /// Create a passenger
    #[must_use]
    pub fn new(name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            surname: surname.into(),
        }
    }

    /// Attribute values in declaration order
    #[must_use]
    pub fn values(&self) -> [&str; 2] {
        [&self.name, &self.surname]
    }
}

impl Entity for Passenger {
    type Id = PassengerId;
    const KIND: &'static str = "Passenger";
}

/// Registry of passengers. Passengers are never mutated or removed.
#[derive(Debug, Clone, Default)]
pub struct PassengerRegistry {
    passengers: EntityRegistry<Passenger>,
}

impl PassengerRegistry {
    /// Create an empty registry
    #[must_use]
    pub const fn new() -> Self {
        Self {
            passengers: EntityRegistry::new(),
        }
    }

    /// Register a passenger. Always succeeds.
    pub fn add_passenger(
        &mut self,
        name: impl Into<String>,
        surname: impl Into<String>,
    ) -> PassengerId {
        self.passengers.add(Passenger::new(name, surname))
    }

    /// Look up a passenger.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] for an unknown id.
    pub fn get_passenger(&self, id: PassengerId) -> Result<&Passenger, RegistryError> {
        self.passengers.get(id)
    }

    /// Iterate over passengers in identity order
    pub fn passengers(&self) -> impl Iterator<Item = (PassengerId, &Passenger)> {
        self.passengers.iter()
    }

    /// Owned copy of every passenger, in identity order
    #[must_use]
    pub fn snapshot(&self) -> Vec<Passenger> {
        self.passengers.iter().map(|(_, p)| p.clone()).collect()
    }

    /// Number of registered passengers
    #[must_use]
    pub fn len(&self) -> usize {
        self.passengers.len()
    }

    /// Whether no passenger has been registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.passengers.is_empty()
    }
}
