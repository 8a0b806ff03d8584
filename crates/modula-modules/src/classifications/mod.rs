//! Classifications module: trait schemas that identities and other entities
//! conform to.

pub mod auxiliaries;
pub mod mapper;
pub mod queries;
pub mod transactions;

use std::sync::Arc;

use modula_core::{
    handle_query, Auxiliary, AuxiliaryRegistry, GenesisState, Message, Module, TransactionKeeper,
    TransactionResponse,
};
use modula_error::{ModuleResult, RegistryResult};
use modula_store::Context;

use crate::common::{not_initialized, unknown_kind, unknown_query};
use crate::constants::auxiliaries::CONFORM;

use self::auxiliaries::ConformKeeper;
use self::mapper::{Classification, CLASSIFICATIONS};
use self::queries::ClassificationQueryKeeper;
use self::transactions::DefineKeeper;

pub const MODULE_NAME: &str = "classifications";

pub struct ClassificationsModule {
    define: Option<DefineKeeper>,
    classification: ClassificationQueryKeeper,
}

impl ClassificationsModule {
    pub fn new() -> Self {
        Self {
            define: None,
            classification: ClassificationQueryKeeper::new(CLASSIFICATIONS),
        }
    }
}

impl Default for ClassificationsModule {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for ClassificationsModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn auxiliaries(&self) -> Vec<Auxiliary> {
        vec![Auxiliary::new(CONFORM, Arc::new(ConformKeeper::new(CLASSIFICATIONS)))]
    }

    fn initialize(&mut self, registry: &AuxiliaryRegistry) -> RegistryResult<()> {
        self.define = Some(DefineKeeper::initialize(CLASSIFICATIONS, registry)?);
        Ok(())
    }

    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse {
        let Some(define) = &self.define else {
            return not_initialized(MODULE_NAME);
        };
        match message.kind() {
            "define" => define.transact(ctx, message),
            kind => unknown_kind(MODULE_NAME, kind),
        }
    }

    fn query(&self, ctx: &Context<'_>, path: &str, body: &[u8]) -> ModuleResult<Vec<u8>> {
        match path {
            "classification" => handle_query(&self.classification, ctx, body),
            _ => Err(unknown_query(MODULE_NAME, path)),
        }
    }

    fn init_genesis(&self, ctx: &mut Context<'_>, state: &serde_json::Value) -> ModuleResult<()> {
        GenesisState::<Classification>::from_value(state)?.initialize(ctx, &CLASSIFICATIONS)
    }

    fn export_genesis(&self, ctx: &Context<'_>) -> ModuleResult<serde_json::Value> {
        GenesisState::export(ctx, &CLASSIFICATIONS)?.to_value()
    }
}
