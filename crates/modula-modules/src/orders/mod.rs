//! Orders module: maker offers backed by escrowed splits.
//!
//! Making an order moves the maker split into escrow through `custody`.
//! Taking pays the maker through `transfer` and releases escrow to the taker
//! through `reverse`; cancelling releases what is left back to the maker.

pub mod mapper;
pub mod queries;
pub mod transactions;

use modula_core::{
    handle_query, Auxiliary, AuxiliaryRegistry, GenesisState, Message, Module, TransactionKeeper,
    TransactionResponse,
};
use modula_error::{ModuleResult, RegistryResult};
use modula_store::Context;

use crate::common::{not_initialized, unknown_kind, unknown_query};

use self::mapper::{Order, ORDERS};
use self::queries::OrderQueryKeeper;
use self::transactions::{CancelKeeper, MakeKeeper, TakeKeeper};

pub const MODULE_NAME: &str = "orders";

struct Keepers {
    make: MakeKeeper,
    cancel: CancelKeeper,
    take: TakeKeeper,
}

pub struct OrdersModule {
    keepers: Option<Keepers>,
    order: OrderQueryKeeper,
}

impl OrdersModule {
    pub fn new() -> Self {
        Self {
            keepers: None,
            order: OrderQueryKeeper::new(ORDERS),
        }
    }
}

impl Default for OrdersModule {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for OrdersModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn auxiliaries(&self) -> Vec<Auxiliary> {
        Vec::new()
    }

    fn initialize(&mut self, registry: &AuxiliaryRegistry) -> RegistryResult<()> {
        self.keepers = Some(Keepers {
            make: MakeKeeper::initialize(ORDERS, registry)?,
            cancel: CancelKeeper::initialize(ORDERS, registry)?,
            take: TakeKeeper::initialize(ORDERS, registry)?,
        });
        Ok(())
    }

    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse {
        let Some(keepers) = &self.keepers else {
            return not_initialized(MODULE_NAME);
        };
        match message.kind() {
            "make" => keepers.make.transact(ctx, message),
            "cancel" => keepers.cancel.transact(ctx, message),
            "take" => keepers.take.transact(ctx, message),
            kind => unknown_kind(MODULE_NAME, kind),
        }
    }

    fn query(&self, ctx: &Context<'_>, path: &str, body: &[u8]) -> ModuleResult<Vec<u8>> {
        match path {
            "order" => handle_query(&self.order, ctx, body),
            _ => Err(unknown_query(MODULE_NAME, path)),
        }
    }

    fn init_genesis(&self, ctx: &mut Context<'_>, state: &serde_json::Value) -> ModuleResult<()> {
        GenesisState::<Order>::from_value(state)?.initialize(ctx, &ORDERS)
    }

    fn export_genesis(&self, ctx: &Context<'_>) -> ModuleResult<serde_json::Value> {
        GenesisState::export(ctx, &ORDERS)?.to_value()
    }
}
