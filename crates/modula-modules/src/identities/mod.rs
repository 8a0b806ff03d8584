//! Identities module: actors that sign for entities through provisioned
//! addresses.
//!
//! Provides the `verify` auxiliary. Issuing and mutating identities relies on
//! `scrub`, `conform` and `maintain` from the metas, classifications and
//! maintainers modules.

pub mod auxiliaries;
pub mod mapper;
pub mod queries;
pub mod transactions;

use std::sync::Arc;

use tracing::debug;

use modula_core::{
    handle_query, Auxiliary, AuxiliaryRegistry, GenesisState, Message, Module, TransactionKeeper,
    TransactionResponse,
};
use modula_error::{ModuleResult, RegistryResult};
use modula_store::Context;

use crate::common::{not_initialized, unknown_kind, unknown_query};
use crate::constants::auxiliaries::VERIFY;

use self::auxiliaries::VerifyKeeper;
use self::mapper::{Identity, IDENTITIES};
use self::queries::IdentityQueryKeeper;
use self::transactions::{IssueKeeper, MutateKeeper, ProvisionKeeper, UnprovisionKeeper};

pub const MODULE_NAME: &str = "identities";

struct Keepers {
    issue: IssueKeeper,
    provision: ProvisionKeeper,
    unprovision: UnprovisionKeeper,
    mutate: MutateKeeper,
}

pub struct IdentitiesModule {
    keepers: Option<Keepers>,
    identity: IdentityQueryKeeper,
}

impl IdentitiesModule {
    pub fn new() -> Self {
        Self {
            keepers: None,
            identity: IdentityQueryKeeper::new(IDENTITIES),
        }
    }
}

impl Default for IdentitiesModule {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for IdentitiesModule {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn auxiliaries(&self) -> Vec<Auxiliary> {
        vec![Auxiliary::new(VERIFY, Arc::new(VerifyKeeper::new(IDENTITIES)))]
    }

    fn initialize(&mut self, registry: &AuxiliaryRegistry) -> RegistryResult<()> {
        self.keepers = Some(Keepers {
            issue: IssueKeeper::initialize(IDENTITIES, registry)?,
            provision: ProvisionKeeper::initialize(IDENTITIES, registry)?,
            unprovision: UnprovisionKeeper::initialize(IDENTITIES, registry)?,
            mutate: MutateKeeper::initialize(IDENTITIES, registry)?,
        });
        debug!(module = MODULE_NAME, "Initialized keepers");
        Ok(())
    }

    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse {
        let Some(keepers) = &self.keepers else {
            return not_initialized(MODULE_NAME);
        };
        match message.kind() {
            "issue" => keepers.issue.transact(ctx, message),
            "provision" => keepers.provision.transact(ctx, message),
            "unprovision" => keepers.unprovision.transact(ctx, message),
            "mutate" => keepers.mutate.transact(ctx, message),
            kind => unknown_kind(MODULE_NAME, kind),
        }
    }

    fn query(&self, ctx: &Context<'_>, path: &str, body: &[u8]) -> ModuleResult<Vec<u8>> {
        match path {
            "identity" => handle_query(&self.identity, ctx, body),
            _ => Err(unknown_query(MODULE_NAME, path)),
        }
    }

    fn init_genesis(&self, ctx: &mut Context<'_>, state: &serde_json::Value) -> ModuleResult<()> {
        GenesisState::<Identity>::from_value(state)?.initialize(ctx, &IDENTITIES)
    }

    fn export_genesis(&self, ctx: &Context<'_>) -> ModuleResult<serde_json::Value> {
        GenesisState::export(ctx, &IDENTITIES)?.to_value()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::identities::auxiliaries::VerifyRequest;
    use modula_error::ModuleError;
    use modula_schema::{Address, Id, Immutables, Mutables};
    use modula_store::{Header, MemoryStore};

    fn seed(ctx: &mut Context<'_>) -> Id {
        let identity = Identity {
            id: Id::new("alice"),
            classification_id: Id::new("person"),
            immutables: Immutables::default(),
            mutables: Mutables::default(),
            provisioned: BTreeSet::from([Address::new("addr1")]),
            unprovisioned: BTreeSet::from([Address::new("addr0")]),
        };
        IDENTITIES.create(ctx, &identity).unwrap();
        identity.id
    }

    #[test]
    fn test_verify_checks_provisioned_addresses() {
        let store = MemoryStore::new();
        let mut ctx = Context::new(Header::new("test-1", 1), &store);
        let id = seed(&mut ctx);
        let verify = IdentitiesModule::new().auxiliaries().remove(0);

        assert!(verify
            .help(&mut ctx, &VerifyRequest::new(Address::new("addr1"), id.clone()))
            .is_successful());
        assert!(matches!(
            verify
                .help(&mut ctx, &VerifyRequest::new(Address::new("addr0"), id))
                .error(),
            Some(ModuleError::NotAuthorized(_))
        ));
        assert!(matches!(
            verify
                .help(&mut ctx, &VerifyRequest::new(Address::new("addr1"), Id::new("bob")))
                .error(),
            Some(ModuleError::EntityNotFound(_))
        ));
        assert!(matches!(
            verify
                .help(&mut ctx, &VerifyRequest::new(Address::new(""), Id::new("bob")))
                .error(),
            Some(ModuleError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_transact_before_initialize_fails() {
        let store = MemoryStore::new();
        let mut ctx = Context::new(Header::new("test-1", 1), &store);
        let message = transactions::ProvisionMessage {
            from: Address::new("addr1"),
            identity_id: Id::new("alice"),
            to: Address::new("addr2"),
        };
        let response = IdentitiesModule::new().transact(&mut ctx, &message);
        assert!(matches!(response.error, Some(ModuleError::Uninitialized(_))));
    }

    #[test]
    fn test_identity_query() {
        let store = MemoryStore::new();
        let mut ctx = Context::new(Header::new("test-1", 1), &store);
        let id = seed(&mut ctx);
        let module = IdentitiesModule::new();

        let body = serde_json::to_vec(&queries::IdentityRequest { identity_id: id }).unwrap();
        let raw = module.query(&ctx, "identity", &body).unwrap();
        let response: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(response["success"], serde_json::Value::Bool(true));
        assert_eq!(response["list"][0]["id"], serde_json::Value::String("alice".into()));

        assert!(module.query(&ctx, "nothing", &body).is_err());
    }
}
