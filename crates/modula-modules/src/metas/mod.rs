//! Metas module: revealed data behind scrubbed facts.

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

use crate::common::{unknown_kind, unknown_query};
use crate::constants::auxiliaries::SCRUB;

use self::auxiliaries::ScrubKeeper;
use self::mapper::{Meta, METAS};
use self::queries::MetaQueryKeeper;
use self::transactions::RevealKeeper;

pub const MODULE_NAME: &str = "metas";

pub struct MetasModule {
    reveal: RevealKeeper,
    meta: MetaQueryKeeper,
}

impl MetasModule {
    pub fn new() -> Self {
        Self {
            reveal: RevealKeeper::new(METAS),
            meta: MetaQueryKeeper::new(METAS),
        }
    }
}

impl Default for MetasModule {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for MetasModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn auxiliaries(&self) -> Vec<Auxiliary> {
        vec![Auxiliary::new(SCRUB, Arc::new(ScrubKeeper::new(METAS)))]
    }

    fn initialize(&mut self, _registry: &AuxiliaryRegistry) -> RegistryResult<()> {
        Ok(())
    }

    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse {
        match message.kind() {
            "reveal" => self.reveal.transact(ctx, message),
            kind => unknown_kind(MODULE_NAME, kind),
        }
    }

    fn query(&self, ctx: &Context<'_>, path: &str, body: &[u8]) -> ModuleResult<Vec<u8>> {
        match path {
            "meta" => handle_query(&self.meta, ctx, body),
            _ => Err(unknown_query(MODULE_NAME, path)),
        }
    }

    fn init_genesis(&self, ctx: &mut Context<'_>, state: &serde_json::Value) -> ModuleResult<()> {
        GenesisState::<Meta>::from_value(state)?.initialize(ctx, &METAS)
    }

    fn export_genesis(&self, ctx: &Context<'_>) -> ModuleResult<serde_json::Value> {
        GenesisState::export(ctx, &METAS)?.to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metas::auxiliaries::{validate_scrub_response, ScrubRequest};
    use crate::metas::transactions::RevealMessage;
    use modula_error::ModuleError;
    use modula_schema::{Address, Fact, Id, MetaProperties};
    use modula_store::{Header, MemoryStore};

    #[test]
    fn test_scrub_records_revealed_data() {
        let store = MemoryStore::new();
        let mut ctx = Context::new(Header::new("test-1", 1), &store);
        let module = MetasModule::new();
        let scrub = module.auxiliaries().remove(0);

        let metas = MetaProperties::read("name:S|alice,age:D|30").unwrap();
        let response = validate_scrub_response(scrub.help(&mut ctx, &ScrubRequest::new(metas.clone()))).unwrap();
        assert_eq!(response.properties, metas.scrub());

        let hash = Fact::String("alice".into()).hash();
        let stored = METAS.fetch(&ctx, &hash).unwrap();
        assert_eq!(stored.get(&hash).unwrap().data, Fact::String("alice".into()));
    }

    #[test]
    fn test_reveal_twice_fails() {
        let store = MemoryStore::new();
        let mut ctx = Context::new(Header::new("test-1", 1), &store);
        let module = MetasModule::new();
        let message = RevealMessage {
            from: Address::new("addr1"),
            data: Fact::String("secret".into()),
        };

        let first = module.transact(&mut ctx, &message);
        assert_eq!(first.id, Some(Fact::String("secret".into()).hash()));

        let second = module.transact(&mut ctx, &message);
        assert!(matches!(second.error, Some(ModuleError::EntityAlreadyExists(_))));

        let hash_only = RevealMessage {
            from: Address::new("addr1"),
            data: Fact::Hash(Id::new("abc")),
        };
        assert!(matches!(
            module.transact(&mut ctx, &hash_only).error,
            Some(ModuleError::IncorrectMessage(_))
        ));
    }
}
