// Deputize: an existing maintainer appoints another identity with a subset
// of its own permissions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::info;

use modula_core::{
    message_from, Auxiliary, AuxiliaryRegistry, Message, TransactionKeeper, TransactionResponse,
};
use modula_error::{ModuleError, ModuleResult, RegistryResult};
use modula_schema::{Address, Id};
use modula_store::{Context, Mapper};

use crate::constants::auxiliaries::VERIFY;
use crate::identities::auxiliaries::VerifyRequest;

use super::mapper::{maintainer_id, Maintainer};
use super::MODULE_NAME;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeputizeMessage {
    pub from: Address,
    pub from_id: Id,
    pub to_id: Id,
    pub classification_id: Id,
    pub maintained_properties: BTreeSet<Id>,
    pub add_maintainer: bool,
    pub remove_maintainer: bool,
    pub mutate_maintainer: bool,
}

message!(DeputizeMessage, MODULE_NAME, "deputize");

pub struct DeputizeKeeper {
    mapper: Mapper<Maintainer>,
    verify: Auxiliary,
}

impl DeputizeKeeper {
    pub fn initialize(mapper: Mapper<Maintainer>, registry: &AuxiliaryRegistry) -> RegistryResult<Self> {
        Ok(Self {
            mapper,
            verify: registry.resolve("maintainers/deputize", VERIFY)?,
        })
    }

    fn deputize(&self, ctx: &mut Context<'_>, message: &DeputizeMessage) -> ModuleResult<Option<Id>> {
        self.verify
            .help(ctx, &VerifyRequest::new(message.from.clone(), message.from_id.clone()))
            .into_result()?;

        let from_maintainer_id = maintainer_id(ctx.chain_id(), &message.classification_id, &message.from_id)?;
        let deputizer = self
            .mapper
            .fetch(ctx, &from_maintainer_id)?
            .get(&from_maintainer_id)
            .cloned()
            .ok_or_else(|| ModuleError::entity_not_found(from_maintainer_id.to_string()))?;

        if !deputizer.add_maintainer {
            return Err(ModuleError::not_authorized(format!(
                "{} may not add maintainers",
                message.from_id
            )));
        }
        if !message.maintained_properties.is_subset(&deputizer.maintained_properties) {
            return Err(ModuleError::not_authorized(format!(
                "{} cannot grant properties it does not maintain",
                message.from_id
            )));
        }
        // A deputy never holds a permission flag its deputizer lacks
        if (message.remove_maintainer && !deputizer.remove_maintainer)
            || (message.mutate_maintainer && !deputizer.mutate_maintainer)
        {
            return Err(ModuleError::not_authorized(format!(
                "{} cannot grant permissions it does not hold",
                message.from_id
            )));
        }

        let id = maintainer_id(ctx.chain_id(), &message.classification_id, &message.to_id)?;
        let mut maintainers = self.mapper.fetch(ctx, &id)?;
        if maintainers.get(&id).is_some() {
            return Err(ModuleError::entity_already_exists(id.to_string()));
        }

        maintainers.add(
            ctx,
            Maintainer {
                id: id.clone(),
                classification_id: message.classification_id.clone(),
                identity_id: message.to_id.clone(),
                maintained_properties: message.maintained_properties.clone(),
                add_maintainer: message.add_maintainer,
                remove_maintainer: message.remove_maintainer,
                mutate_maintainer: message.mutate_maintainer,
            },
        )?;

        info!(maintainer_id = %id, to_id = %message.to_id, "Deputized maintainer");
        Ok(Some(id))
    }
}

impl TransactionKeeper for DeputizeKeeper {
    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse {
        message_from::<DeputizeMessage>(message)
            .and_then(|message| self.deputize(ctx, message))
            .into()
    }
}
