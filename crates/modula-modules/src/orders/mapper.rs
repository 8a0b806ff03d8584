use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use modula_error::ModuleResult;
use modula_schema::{Dec, Id, Immutables, Mutables};
use modula_store::{Mappable, Mapper};

use crate::common::{dec_fact, id_fact};
use crate::constants::properties::{EXCHANGE_RATE, MAKER_ID, MAKER_SPLIT, MAKER_SPLIT_ID, TAKER_SPLIT_ID};

/// An offer to exchange an escrowed maker split for a taker split
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Order {
    pub id: Id,
    pub immutables: Immutables,
    pub mutables: Mutables,
}

impl Mappable for Order {
    fn id(&self) -> Id {
        self.id.clone()
    }
}

/// The settlement terms an order stores in its own traits
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Terms {
    pub maker_id: Id,
    pub maker_split_id: Id,
    pub taker_split_id: Id,
    /// Maker units given per taker unit
    pub exchange_rate: Dec,
    /// Maker units still escrowed
    pub maker_split: Dec,
}

impl Order {
    pub fn terms(&self) -> ModuleResult<Terms> {
        let immutables = self.immutables.properties();
        Ok(Terms {
            maker_id: id_fact(immutables, MAKER_ID)?,
            maker_split_id: id_fact(immutables, MAKER_SPLIT_ID)?,
            taker_split_id: id_fact(immutables, TAKER_SPLIT_ID)?,
            exchange_rate: dec_fact(immutables, EXCHANGE_RATE)?,
            maker_split: dec_fact(self.mutables.properties(), MAKER_SPLIT)?,
        })
    }
}

pub const ORDERS: Mapper<Order> = Mapper::new("orders");
