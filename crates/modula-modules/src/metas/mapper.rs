use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use modula_schema::{Fact, Id};
use modula_store::{Mappable, Mapper};

/// Revealed data, keyed by the hash it scrubs to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Meta {
    pub id: Id,
    pub data: Fact,
}

impl Meta {
    pub fn new(data: Fact) -> Self {
        Self {
            id: data.hash(),
            data,
        }
    }
}

impl Mappable for Meta {
    fn id(&self) -> Id {
        self.id.clone()
    }
}

pub const METAS: Mapper<Meta> = Mapper::new("metas");
