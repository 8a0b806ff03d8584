//! Maintainers module: who may change which mutables of a classification.

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
use crate::constants::auxiliaries::{MAINTAIN, SUPER};

use self::auxiliaries::{MaintainKeeper, SuperKeeper};
use self::mapper::{Maintainer, MAINTAINERS};
use self::queries::MaintainerQueryKeeper;
use self::transactions::DeputizeKeeper;

pub const MODULE_NAME: &str = "maintainers";

pub struct MaintainersModule {
    deputize: Option<DeputizeKeeper>,
    maintainer: MaintainerQueryKeeper,
}

impl MaintainersModule {
    pub fn new() -> Self {
        Self {
            deputize: None,
            maintainer: MaintainerQueryKeeper::new(MAINTAINERS),
        }
    }
}

impl Default for MaintainersModule {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for MaintainersModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn auxiliaries(&self) -> Vec<Auxiliary> {
        vec![
            Auxiliary::new(SUPER, Arc::new(SuperKeeper::new(MAINTAINERS))),
            Auxiliary::new(MAINTAIN, Arc::new(MaintainKeeper::new(MAINTAINERS))),
        ]
    }

    fn initialize(&mut self, registry: &AuxiliaryRegistry) -> RegistryResult<()> {
        self.deputize = Some(DeputizeKeeper::initialize(MAINTAINERS, registry)?);
        Ok(())
    }

    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse {
        let Some(deputize) = &self.deputize else {
            return not_initialized(MODULE_NAME);
        };
        match message.kind() {
            "deputize" => deputize.transact(ctx, message),
            kind => unknown_kind(MODULE_NAME, kind),
        }
    }

    fn query(&self, ctx: &Context<'_>, path: &str, body: &[u8]) -> ModuleResult<Vec<u8>> {
        match path {
            "maintainer" => handle_query(&self.maintainer, ctx, body),
            _ => Err(unknown_query(MODULE_NAME, path)),
        }
    }

    fn init_genesis(&self, ctx: &mut Context<'_>, state: &serde_json::Value) -> ModuleResult<()> {
        GenesisState::<Maintainer>::from_value(state)?.initialize(ctx, &MAINTAINERS)
    }

    fn export_genesis(&self, ctx: &Context<'_>) -> ModuleResult<serde_json::Value> {
        GenesisState::export(ctx, &MAINTAINERS)?.to_value()
    }
}
