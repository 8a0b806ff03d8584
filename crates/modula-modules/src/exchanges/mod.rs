//! Exchanges module: split balances of ownables and the escrow that backs
//! open orders.

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
use crate::constants::auxiliaries::{CUSTODY, REVERSE, TRANSFER};

use self::auxiliaries::{CustodyKeeper, ReverseKeeper, TransferKeeper};
use self::mapper::{Split, SPLITS};
use self::queries::SplitsQueryKeeper;
use self::transactions::SendKeeper;

pub const MODULE_NAME: &str = "exchanges";

pub struct ExchangesModule {
    send: Option<SendKeeper>,
    splits: SplitsQueryKeeper,
}

impl ExchangesModule {
    pub fn new() -> Self {
        Self {
            send: None,
            splits: SplitsQueryKeeper::new(SPLITS),
        }
    }
}

impl Default for ExchangesModule {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for ExchangesModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn auxiliaries(&self) -> Vec<Auxiliary> {
        vec![
            Auxiliary::new(CUSTODY, Arc::new(CustodyKeeper::new(SPLITS))),
            Auxiliary::new(REVERSE, Arc::new(ReverseKeeper::new(SPLITS))),
            Auxiliary::new(TRANSFER, Arc::new(TransferKeeper::new(SPLITS))),
        ]
    }

    fn initialize(&mut self, registry: &AuxiliaryRegistry) -> RegistryResult<()> {
        self.send = Some(SendKeeper::initialize(registry)?);
        Ok(())
    }

    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse {
        let Some(send) = &self.send else {
            return not_initialized(MODULE_NAME);
        };
        match message.kind() {
            "send" => send.transact(ctx, message),
            kind => unknown_kind(MODULE_NAME, kind),
        }
    }

    fn query(&self, ctx: &Context<'_>, path: &str, body: &[u8]) -> ModuleResult<Vec<u8>> {
        match path {
            "splits" => handle_query(&self.splits, ctx, body),
            _ => Err(unknown_query(MODULE_NAME, path)),
        }
    }

    fn init_genesis(&self, ctx: &mut Context<'_>, state: &serde_json::Value) -> ModuleResult<()> {
        GenesisState::<Split>::from_value(state)?.initialize(ctx, &SPLITS)
    }

    fn export_genesis(&self, ctx: &Context<'_>) -> ModuleResult<serde_json::Value> {
        GenesisState::export(ctx, &SPLITS)?.to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchanges::auxiliaries::{CustodyRequest, ReverseRequest};
    use crate::exchanges::mapper::{credit, escrow_id, split_id};
    use crate::exchanges::queries::SplitsRequest;
    use modula_core::QueryResponse;
    use modula_error::ModuleError;
    use modula_schema::{Dec, Id};
    use modula_store::{Header, MemoryStore};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_custody_then_reverse() {
        let store = MemoryStore::new();
        let mut ctx = Context::new(Header::new("test-1", 1), &store);
        let mut auxiliaries = ExchangesModule::new().auxiliaries().into_iter();
        let custody = auxiliaries.next().unwrap();
        let reverse = auxiliaries.next().unwrap();
        let (alice, coin) = (Id::new("alice"), Id::new("coin"));

        credit(&mut ctx, &SPLITS, &alice, &coin, &Dec::from_integer(10)).unwrap();
        assert!(custody
            .help(&mut ctx, &CustodyRequest::new(alice.clone(), coin.clone(), Dec::from_integer(4)))
            .is_successful());

        let escrowed = split_id(ctx.chain_id(), &escrow_id(), &coin).unwrap();
        assert_eq!(
            SPLITS.fetch(&ctx, &escrowed).unwrap().get(&escrowed).unwrap().value,
            Dec::from_integer(4)
        );

        assert!(matches!(
            reverse
                .help(&mut ctx, &ReverseRequest::new(alice.clone(), coin.clone(), Dec::from_integer(5)))
                .error(),
            Some(ModuleError::InsufficientBalance(_))
        ));
        assert!(reverse
            .help(&mut ctx, &ReverseRequest::new(alice, coin.clone(), Dec::from_integer(4)))
            .is_successful());
        assert!(SPLITS.fetch(&ctx, &escrowed).unwrap().is_empty());

        assert!(matches!(
            custody
                .help(&mut ctx, &CustodyRequest::new(Id::new("bob"), coin, Dec::zero()))
                .error(),
            Some(ModuleError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_splits_query_distinguishes_empty_from_failure() {
        let store = MemoryStore::new();
        let mut ctx = Context::new(Header::new("test-1", 1), &store);
        let module = ExchangesModule::new();
        credit(&mut ctx, &SPLITS, &Id::new("alice"), &Id::new("coin"), &Dec::from_integer(1)).unwrap();
        credit(&mut ctx, &SPLITS, &Id::new("alice"), &Id::new("gem"), &Dec::from_integer(2)).unwrap();
        credit(&mut ctx, &SPLITS, &Id::new("bob"), &Id::new("coin"), &Dec::from_integer(3)).unwrap();

        let ask = |owner: &str| -> QueryResponse<Split> {
            let body = serde_json::to_vec(&SplitsRequest { owner_id: Id::new(owner) }).unwrap();
            serde_json::from_slice(&module.query(&ctx, "splits", &body).unwrap()).unwrap()
        };

        let alice = ask("alice");
        assert!(alice.success);
        assert_eq!(alice.list.len(), 2);

        let carol = ask("carol");
        assert!(carol.success && carol.list.is_empty());

        let nobody = ask("");
        assert!(!nobody.success);
        assert!(matches!(nobody.error, Some(ModuleError::InvalidRequest(_))));
    }
}
