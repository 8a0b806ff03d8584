// Immutable and mutable trait sets of an entity

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::id::Id;
use crate::properties::Properties;
use crate::property::Property;

/// Traits fixed at creation; part of the entity's identity
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[serde(transparent)]
pub struct Immutables(Properties);

impl Immutables {
    pub fn new(properties: Properties) -> Self {
        Self(properties)
    }

    pub fn get(&self, id: &Id) -> Option<&Property> {
        self.0.get(id)
    }

    pub fn properties(&self) -> &Properties {
        &self.0
    }
}

impl From<Properties> for Immutables {
    fn from(properties: Properties) -> Self {
        Self(properties)
    }
}

/// Traits that later transactions may replace
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
#[serde(transparent)]
pub struct Mutables(Properties);

impl Mutables {
    pub fn new(properties: Properties) -> Self {
        Self(properties)
    }

    pub fn get(&self, id: &Id) -> Option<&Property> {
        self.0.get(id)
    }

    pub fn properties(&self) -> &Properties {
        &self.0
    }

    /// The full replacement set after applying `update`
    pub fn mutate(&self, update: &Properties) -> Mutables {
        Mutables(self.0.merge(update))
    }
}

impl From<Properties> for Mutables {
    fn from(properties: Properties) -> Self {
        Self(properties)
    }
}
