// Define: create a classification and make its definer the super maintainer.
//
// Order: verify, scrub immutables, scrub mutables, derive ID, must-not-exist,
// super, add. Any failure leaves the context to be discarded.

use serde::{Deserialize, Serialize};
use tracing::info;

use modula_core::{
    message_from, Auxiliary, AuxiliaryRegistry, Message, TransactionKeeper, TransactionResponse,
};
use modula_error::{ModuleError, ModuleResult, RegistryResult};
use modula_schema::{derive_id, Address, Id, Immutables, MetaProperties, Mutables, Properties};
use modula_store::{Context, Mapper};

use crate::common::scrub_and_compose;
use crate::constants::auxiliaries::{SCRUB, SUPER, VERIFY};
use crate::identities::auxiliaries::VerifyRequest;
use crate::maintainers::auxiliaries::SuperRequest;

use super::mapper::Classification;
use super::MODULE_NAME;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefineMessage {
    pub from: Address,
    pub from_id: Id,
    pub immutable_meta_properties: MetaProperties,
    pub immutable_properties: Properties,
    pub mutable_meta_properties: MetaProperties,
    pub mutable_properties: Properties,
}

message!(DefineMessage, MODULE_NAME, "define");

pub struct DefineKeeper {
    mapper: Mapper<Classification>,
    verify: Auxiliary,
    scrub: Auxiliary,
    super_: Auxiliary,
}

impl DefineKeeper {
    pub fn initialize(mapper: Mapper<Classification>, registry: &AuxiliaryRegistry) -> RegistryResult<Self> {
        Ok(Self {
            mapper,
            verify: registry.resolve("classifications/define", VERIFY)?,
            scrub: registry.resolve("classifications/define", SCRUB)?,
            super_: registry.resolve("classifications/define", SUPER)?,
        })
    }

    fn define(&self, ctx: &mut Context<'_>, message: &DefineMessage) -> ModuleResult<Option<Id>> {
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

        let id = derive_id(ctx.chain_id(), &immutables, &mutables)?;
        let mut classifications = self.mapper.fetch(ctx, &id)?;
        if classifications.get(&id).is_some() {
            return Err(ModuleError::entity_already_exists(id.to_string()));
        }

        self.super_
            .help(ctx, &SuperRequest::new(id.clone(), message.from_id.clone(), mutables.clone()))
            .into_result()?;

        classifications.add(
            ctx,
            Classification {
                id: id.clone(),
                immutables,
                mutables,
            },
        )?;

        info!(classification_id = %id, from_id = %message.from_id, "Defined classification");
        Ok(Some(id))
    }
}

impl TransactionKeeper for DefineKeeper {
    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse {
        message_from::<DefineMessage>(message)
            .and_then(|message| self.define(ctx, message))
            .into()
    }
}
