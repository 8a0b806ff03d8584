// Identity transactions
//
// issue:       verify, scrub, scrub, conform, must-not-exist, add
// provision:   verify, must-exist, replace
// unprovision: verify, must-exist, replace
// mutate:      verify, must-exist, scrub, maintain, conform, replace

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use modula_core::{
    message_from, Auxiliary, AuxiliaryRegistry, Message, TransactionKeeper, TransactionResponse,
};
use modula_error::{ModuleError, ModuleResult, RegistryResult};
use modula_schema::{Address, Id, Immutables, MetaProperties, Mutables, Properties};
use modula_store::{Context, Mapper, WorkingSet};

use crate::classifications::auxiliaries::ConformRequest;
use crate::common::scrub_and_compose;
use crate::constants::auxiliaries::{CONFORM, MAINTAIN, SCRUB, VERIFY};
use crate::maintainers::auxiliaries::MaintainRequest;

use super::auxiliaries::VerifyRequest;
use super::mapper::{identity_id, Identity};
use super::MODULE_NAME;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueMessage {
    pub from: Address,
    /// Identity signing for the issue
    pub from_id: Id,
    /// Address provisioned for the new identity
    pub to: Address,
    pub classification_id: Id,
    pub immutable_meta_properties: MetaProperties,
    pub immutable_properties: Properties,
    pub mutable_meta_properties: MetaProperties,
    pub mutable_properties: Properties,
}

message!(IssueMessage, MODULE_NAME, "issue");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionMessage {
    pub from: Address,
    pub identity_id: Id,
    pub to: Address,
}

message!(ProvisionMessage, MODULE_NAME, "provision");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnprovisionMessage {
    pub from: Address,
    pub identity_id: Id,
    pub to: Address,
}

message!(UnprovisionMessage, MODULE_NAME, "unprovision");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutateMessage {
    pub from: Address,
    /// Identity acting as maintainer of the target's classification
    pub from_id: Id,
    pub identity_id: Id,
    pub mutable_meta_properties: MetaProperties,
    pub mutable_properties: Properties,
}

message!(MutateMessage, MODULE_NAME, "mutate");

fn fetch_existing(
    mapper: &Mapper<Identity>,
    ctx: &Context<'_>,
    identity_id: &Id,
) -> ModuleResult<(WorkingSet<Identity>, Identity)> {
    let identities = mapper.fetch(ctx, identity_id)?;
    let identity = identities
        .get(identity_id)
        .cloned()
        .ok_or_else(|| ModuleError::entity_not_found(identity_id.to_string()))?;
    Ok((identities, identity))
}

pub struct IssueKeeper {
    mapper: Mapper<Identity>,
    verify: Auxiliary,
    scrub: Auxiliary,
    conform: Auxiliary,
}

impl IssueKeeper {
    pub fn initialize(mapper: Mapper<Identity>, registry: &AuxiliaryRegistry) -> RegistryResult<Self> {
        Ok(Self {
            mapper,
            verify: registry.resolve("identities/issue", VERIFY)?,
            scrub: registry.resolve("identities/issue", SCRUB)?,
            conform: registry.resolve("identities/issue", CONFORM)?,
        })
    }

    fn issue(&self, ctx: &mut Context<'_>, message: &IssueMessage) -> ModuleResult<Option<Id>> {
        self.verify
            .help(ctx, &VerifyRequest::new(message.from.clone(), message.from_id.clone()))
            .into_result()?;

        let immutables = Immutables::new(scrub_and_compose(
            &self.scrub,
            ctx,
            &message.immutable_meta_properties,
            &message.immutable_properties,
        )?);
        let mutables = Mutables::new(scrub_and_compose(
            &self.scrub,
            ctx,
            &message.mutable_meta_properties,
            &message.mutable_properties,
        )?);

        self.conform
            .help(
                ctx,
                &ConformRequest::new(message.classification_id.clone(), immutables.clone(), mutables.clone()),
            )
            .into_result()?;

        let id = identity_id(&message.classification_id, &immutables, &mutables)?;
        let mut identities = self.mapper.fetch(ctx, &id)?;
        if identities.get(&id).is_some() {
            return Err(ModuleError::entity_already_exists(id.to_string()));
        }

        identities.add(
            ctx,
            Identity {
                id: id.clone(),
                classification_id: message.classification_id.clone(),
                immutables,
                mutables,
                provisioned: BTreeSet::from([message.to.clone()]),
                unprovisioned: BTreeSet::new(),
            },
        )?;

        info!(identity_id = %id, to = %message.to, "Issued identity");
        Ok(Some(id))
    }
}

impl TransactionKeeper for IssueKeeper {
    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse {
        message_from::<IssueMessage>(message)
            .and_then(|message| self.issue(ctx, message))
            .into()
    }
}

pub struct ProvisionKeeper {
    mapper: Mapper<Identity>,
    verify: Auxiliary,
}

impl ProvisionKeeper {
    pub fn initialize(mapper: Mapper<Identity>, registry: &AuxiliaryRegistry) -> RegistryResult<Self> {
        Ok(Self {
            mapper,
            verify: registry.resolve("identities/provision", VERIFY)?,
        })
    }

    fn provision(&self, ctx: &mut Context<'_>, message: &ProvisionMessage) -> ModuleResult<Option<Id>> {
        self.verify
            .help(ctx, &VerifyRequest::new(message.from.clone(), message.identity_id.clone()))
            .into_result()?;

        let (mut identities, mut identity) = fetch_existing(&self.mapper, ctx, &message.identity_id)?;
        if identity.provisioned.contains(&message.to) {
            return Err(ModuleError::entity_already_exists(message.to.to_string()));
        }
        if identity.unprovisioned.contains(&message.to) {
            return Err(ModuleError::not_authorized(format!(
                "{} was unprovisioned from {}",
                message.to, message.identity_id
            )));
        }

        identity.provisioned.insert(message.to.clone());
        identities.mutate(ctx, identity)?;
        Ok(None)
    }
}

impl TransactionKeeper for ProvisionKeeper {
    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse {
        message_from::<ProvisionMessage>(message)
            .and_then(|message| self.provision(ctx, message))
            .into()
    }
}

pub struct UnprovisionKeeper {
    mapper: Mapper<Identity>,
    verify: Auxiliary,
}

impl UnprovisionKeeper {
    pub fn initialize(mapper: Mapper<Identity>, registry: &AuxiliaryRegistry) -> RegistryResult<Self> {
        Ok(Self {
            mapper,
            verify: registry.resolve("identities/unprovision", VERIFY)?,
        })
    }

    fn unprovision(&self, ctx: &mut Context<'_>, message: &UnprovisionMessage) -> ModuleResult<Option<Id>> {
        self.verify
            .help(ctx, &VerifyRequest::new(message.from.clone(), message.identity_id.clone()))
            .into_result()?;

        let (mut identities, mut identity) = fetch_existing(&self.mapper, ctx, &message.identity_id)?;
        if !identity.provisioned.remove(&message.to) {
            return Err(ModuleError::entity_not_found(message.to.to_string()));
        }

        identity.unprovisioned.insert(message.to.clone());
        identities.mutate(ctx, identity)?;
        Ok(None)
    }
}

impl TransactionKeeper for UnprovisionKeeper {
    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse {
        message_from::<UnprovisionMessage>(message)
            .and_then(|message| self.unprovision(ctx, message))
            .into()
    }
}

pub struct MutateKeeper {
    mapper: Mapper<Identity>,
    verify: Auxiliary,
    scrub: Auxiliary,
    maintain: Auxiliary,
    conform: Auxiliary,
}

impl MutateKeeper {
    pub fn initialize(mapper: Mapper<Identity>, registry: &AuxiliaryRegistry) -> RegistryResult<Self> {
        Ok(Self {
            mapper,
            verify: registry.resolve("identities/mutate", VERIFY)?,
            scrub: registry.resolve("identities/mutate", SCRUB)?,
            maintain: registry.resolve("identities/mutate", MAINTAIN)?,
            conform: registry.resolve("identities/mutate", CONFORM)?,
        })
    }

    fn mutate(&self, ctx: &mut Context<'_>, message: &MutateMessage) -> ModuleResult<Option<Id>> {
        self.verify
            .help(ctx, &VerifyRequest::new(message.from.clone(), message.from_id.clone()))
            .into_result()?;

        let (mut identities, mut identity) = fetch_existing(&self.mapper, ctx, &message.identity_id)?;

        let update = Mutables::new(scrub_and_compose(
            &self.scrub,
            ctx,
            &message.mutable_meta_properties,
            &message.mutable_properties,
        )?);

        self.maintain
            .help(
                ctx,
                &MaintainRequest::new(identity.classification_id.clone(), message.from_id.clone(), update.clone()),
            )
            .into_result()?;

        let mutables = identity.mutables.mutate(update.properties());
        self.conform
            .help(
                ctx,
                &ConformRequest::new(
                    identity.classification_id.clone(),
                    identity.immutables.clone(),
                    mutables.clone(),
                ),
            )
            .into_result()?;

        identity.mutables = mutables;
        identities.mutate(ctx, identity)?;
        info!(identity_id = %message.identity_id, "Mutated identity");
        Ok(None)
    }
}

impl TransactionKeeper for MutateKeeper {
    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse {
        message_from::<MutateMessage>(message)
            .and_then(|message| self.mutate(ctx, message))
            .into()
    }
}
