use std::collections::BTreeSet;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use modula_error::SchemaResult;
use modula_schema::{derive_id, Fact, Id, Immutables, Mutables, Properties, Property};
use modula_store::{Mappable, Mapper};

use crate::constants::properties::{CLASSIFICATION_ID, IDENTITY_ID};

/// Permissions an identity holds over the mutables of one classification
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Maintainer {
    pub id: Id,
    pub classification_id: Id,
    pub identity_id: Id,
    /// Mutable property IDs this maintainer may change
    pub maintained_properties: BTreeSet<Id>,
    pub add_maintainer: bool,
    pub remove_maintainer: bool,
    pub mutate_maintainer: bool,
}

impl Maintainer {
    pub fn maintains(&self, property_id: &Id) -> bool {
        self.maintained_properties.contains(property_id)
    }
}

impl Mappable for Maintainer {
    fn id(&self) -> Id {
        self.id.clone()
    }
}

/// At most one maintainer exists per (classification, identity) pair
pub fn maintainer_id(chain_id: &Id, classification_id: &Id, identity_id: &Id) -> SchemaResult<Id> {
    let immutables = Immutables::new(Properties::from_list([
        Property::new(CLASSIFICATION_ID, Fact::Id(classification_id.clone())),
        Property::new(IDENTITY_ID, Fact::Id(identity_id.clone())),
    ]));
    derive_id(chain_id, &immutables, &Mutables::default())
}

pub const MAINTAINERS: Mapper<Maintainer> = Mapper::new("maintainers");
