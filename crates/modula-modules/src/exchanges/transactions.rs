use serde::{Deserialize, Serialize};
use tracing::info;

use modula_core::{
    message_from, Auxiliary, AuxiliaryRegistry, Message, TransactionKeeper, TransactionResponse,
};
use modula_error::{ModuleResult, RegistryResult};
use modula_schema::{Address, Dec, Id};
use modula_store::Context;

use crate::constants::auxiliaries::{TRANSFER, VERIFY};
use crate::identities::auxiliaries::VerifyRequest;

use super::auxiliaries::TransferRequest;
use super::MODULE_NAME;

/// Move part of the sender's split of an ownable to another identity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessage {
    pub from: Address,
    pub from_id: Id,
    pub to_id: Id,
    pub ownable_id: Id,
    pub value: Dec,
}

message!(SendMessage, MODULE_NAME, "send");

pub struct SendKeeper {
    verify: Auxiliary,
    transfer: Auxiliary,
}

impl SendKeeper {
    pub fn initialize(registry: &AuxiliaryRegistry) -> RegistryResult<Self> {
        Ok(Self {
            verify: registry.resolve("exchanges/send", VERIFY)?,
            transfer: registry.resolve("exchanges/send", TRANSFER)?,
        })
    }

    fn send(&self, ctx: &mut Context<'_>, message: &SendMessage) -> ModuleResult<Option<Id>> {
        self.verify
            .help(ctx, &VerifyRequest::new(message.from.clone(), message.from_id.clone()))
            .into_result()?;
        self.transfer
            .help(
                ctx,
                &TransferRequest::new(
                    message.from_id.clone(),
                    message.to_id.clone(),
                    message.ownable_id.clone(),
                    message.value.clone(),
                ),
            )
            .into_result()?;

        info!(from_id = %message.from_id, to_id = %message.to_id, value = %message.value, "Sent split");
        Ok(None)
    }
}

impl TransactionKeeper for SendKeeper {
    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse {
        message_from::<SendMessage>(message)
            .and_then(|message| self.send(ctx, message))
            .into()
    }
}
