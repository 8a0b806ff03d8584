use std::collections::BTreeSet;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use modula_error::SchemaResult;
use modula_schema::{derive_id, Address, Id, Immutables, Mutables};
use modula_store::{Mappable, Mapper};

/// An identity of some classification, acted for by its provisioned addresses
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Identity {
    pub id: Id,
    pub classification_id: Id,
    pub immutables: Immutables,
    pub mutables: Mutables,
    pub provisioned: BTreeSet<Address>,
    pub unprovisioned: BTreeSet<Address>,
}

impl Identity {
    pub fn is_provisioned(&self, address: &Address) -> bool {
        self.provisioned.contains(address)
    }
}

impl Mappable for Identity {
    fn id(&self) -> Id {
        self.id.clone()
    }
}

/// Identity IDs are scoped by classification, whose own ID commits to the chain
pub fn identity_id(classification_id: &Id, immutables: &Immutables, mutables: &Mutables) -> SchemaResult<Id> {
    derive_id(classification_id, immutables, mutables)
}

pub const IDENTITIES: Mapper<Identity> = Mapper::new("identities");
