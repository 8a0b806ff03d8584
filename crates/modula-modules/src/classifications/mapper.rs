use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use modula_schema::{Id, Immutables, Mutables};
use modula_store::{Mappable, Mapper};

/// The trait schema entities of one class conform to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Classification {
    pub id: Id,
    pub immutables: Immutables,
    pub mutables: Mutables,
}

impl Mappable for Classification {
    fn id(&self) -> Id {
        self.id.clone()
    }
}

pub const CLASSIFICATIONS: Mapper<Classification> = Mapper::new("classifications");
