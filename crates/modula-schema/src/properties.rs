// Property collections
//
// Collections are keyed by property ID, so iteration is always in ID order
// regardless of insertion order. That order is the canonical one used for
// hashing and for the binary encoding.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Read, Write};

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use modula_error::{SchemaError, SchemaResult};

use crate::id::Id;
use crate::property::{MetaProperty, Property};

/// ID-unique, ID-ordered collection of [`Property`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Property>", into = "Vec<Property>")]
pub struct Properties(BTreeMap<Id, Property>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection where a later property replaces an earlier one with the same ID
    pub fn from_list(list: impl IntoIterator<Item = Property>) -> Self {
        let mut map = BTreeMap::new();
        for property in list {
            map.insert(property.id.clone(), property);
        }
        Self(map)
    }

    /// Build a collection, rejecting repeated IDs
    pub fn try_from_list(list: impl IntoIterator<Item = Property>) -> SchemaResult<Self> {
        let mut properties = Self::new();
        for property in list {
            properties.add(property)?;
        }
        Ok(properties)
    }

    /// Meta-derived properties first, then user properties; the user wins on a shared ID
    pub fn compose(meta: &Properties, user: &Properties) -> Self {
        Self::from_list(meta.get_list().chain(user.get_list()).cloned())
    }

    /// Parse a comma separated list of `id:code|value` entries
    pub fn read(text: &str) -> SchemaResult<Self> {
        let entries = text.split(',').map(str::trim).filter(|entry| !entry.is_empty());
        let list = entries.map(Property::read).collect::<SchemaResult<Vec<_>>>()?;
        Self::try_from_list(list)
    }

    pub fn get(&self, id: &Id) -> Option<&Property> {
        self.0.get(id)
    }

    /// Look up a property that must be present
    pub fn require(&self, id: &Id) -> SchemaResult<&Property> {
        self.get(id)
            .ok_or_else(|| SchemaError::PropertyNotFound(id.to_string()))
    }

    pub fn add(&mut self, property: Property) -> SchemaResult<()> {
        if self.0.contains_key(&property.id) {
            return Err(SchemaError::DuplicateProperty(property.id.to_string()));
        }
        self.0.insert(property.id.clone(), property);
        Ok(())
    }

    /// Replace the fact of an existing property
    pub fn mutate(&mut self, property: Property) -> SchemaResult<()> {
        match self.0.get_mut(&property.id) {
            Some(existing) => {
                *existing = property;
                Ok(())
            }
            None => Err(SchemaError::PropertyNotFound(property.id.to_string())),
        }
    }

    pub fn remove(&mut self, id: &Id) -> Option<Property> {
        self.0.remove(id)
    }

    /// Properties in ID order; the iterator can be cloned to restart it
    pub fn get_list(&self) -> impl Iterator<Item = &Property> + Clone {
        self.0.values()
    }

    pub fn ids(&self) -> BTreeSet<Id> {
        self.0.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// A copy of this collection overlaid with `update`
    pub fn merge(&self, update: &Properties) -> Properties {
        let mut merged = self.clone();
        for property in update.get_list() {
            merged.0.insert(property.id.clone(), property.clone());
        }
        merged
    }

    /// Every fact replaced by its digest
    pub fn scrub(&self) -> Properties {
        Self::from_list(self.get_list().map(Property::scrub))
    }
}

impl TryFrom<Vec<Property>> for Properties {
    type Error = SchemaError;

    fn try_from(list: Vec<Property>) -> Result<Self, Self::Error> {
        Self::try_from_list(list)
    }
}

impl From<Properties> for Vec<Property> {
    fn from(properties: Properties) -> Self {
        properties.0.into_values().collect()
    }
}

impl BorshSerialize for Properties {
    fn serialize<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let len = u32::try_from(self.0.len())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
        BorshSerialize::serialize(&len, writer)?;
        for property in self.get_list() {
            BorshSerialize::serialize(property, writer)?;
        }
        Ok(())
    }
}

impl BorshDeserialize for Properties {
    fn deserialize_reader<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let len = u32::deserialize_reader(reader)?;
        let mut list = Vec::new();
        for _ in 0..len {
            list.push(Property::deserialize_reader(reader)?);
        }
        Self::try_from_list(list)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }
}

/// ID-unique collection of [`MetaProperty`]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<MetaProperty>", into = "Vec<MetaProperty>")]
pub struct MetaProperties(BTreeMap<Id, MetaProperty>);

impl MetaProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_list(list: impl IntoIterator<Item = MetaProperty>) -> Self {
        let mut map = BTreeMap::new();
        for meta in list {
            map.insert(meta.id.clone(), meta);
        }
        Self(map)
    }

    pub fn try_from_list(list: impl IntoIterator<Item = MetaProperty>) -> SchemaResult<Self> {
        let mut metas = Self::new();
        for meta in list {
            metas.add(meta)?;
        }
        Ok(metas)
    }

    pub fn read(text: &str) -> SchemaResult<Self> {
        let entries = text.split(',').map(str::trim).filter(|entry| !entry.is_empty());
        let list = entries.map(MetaProperty::read).collect::<SchemaResult<Vec<_>>>()?;
        Self::try_from_list(list)
    }

    pub fn get(&self, id: &Id) -> Option<&MetaProperty> {
        self.0.get(id)
    }

    pub fn add(&mut self, meta: MetaProperty) -> SchemaResult<()> {
        if self.0.contains_key(&meta.id) {
            return Err(SchemaError::DuplicateProperty(meta.id.to_string()));
        }
        self.0.insert(meta.id.clone(), meta);
        Ok(())
    }

    pub fn get_list(&self) -> impl Iterator<Item = &MetaProperty> + Clone {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The stored form of every meta property
    pub fn scrub(&self) -> Properties {
        Properties::from_list(self.get_list().map(MetaProperty::scrub))
    }

    /// The revealed form of every meta property
    pub fn properties(&self) -> Properties {
        Properties::from_list(self.get_list().map(MetaProperty::property))
    }
}

impl TryFrom<Vec<MetaProperty>> for MetaProperties {
    type Error = SchemaError;

    fn try_from(list: Vec<MetaProperty>) -> Result<Self, Self::Error> {
        Self::try_from_list(list)
    }
}

impl From<MetaProperties> for Vec<MetaProperty> {
    fn from(metas: MetaProperties) -> Self {
        metas.0.into_values().collect()
    }
}
