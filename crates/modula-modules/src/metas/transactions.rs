use serde::{Deserialize, Serialize};
use tracing::info;

use modula_core::{message_from, Message, TransactionKeeper, TransactionResponse};
use modula_error::{ModuleError, ModuleResult};
use modula_schema::{Address, Fact, Id};
use modula_store::{Context, Mapper};

use super::mapper::Meta;
use super::MODULE_NAME;

/// Publish the data behind a hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealMessage {
    pub from: Address,
    pub data: Fact,
}

message!(RevealMessage, MODULE_NAME, "reveal");

pub struct RevealKeeper {
    mapper: Mapper<Meta>,
}

impl RevealKeeper {
    pub fn new(mapper: Mapper<Meta>) -> Self {
        Self { mapper }
    }

    fn reveal(&self, ctx: &mut Context<'_>, message: &RevealMessage) -> ModuleResult<Option<Id>> {
        if message.data.is_scrubbed() {
            return Err(ModuleError::incorrect_message("cannot reveal a hash"));
        }

        let meta = Meta::new(message.data.clone());
        let meta_id = meta.id.clone();
        let mut metas = self.mapper.fetch(ctx, &meta_id)?;
        if metas.get(&meta_id).is_some() {
            return Err(ModuleError::entity_already_exists(meta_id.to_string()));
        }
        metas.add(ctx, meta)?;

        info!(meta_id = %meta_id, from = %message.from, "Revealed meta");
        Ok(Some(meta_id))
    }
}

impl TransactionKeeper for RevealKeeper {
    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse {
        message_from::<RevealMessage>(message)
            .and_then(|message| self.reveal(ctx, message))
            .into()
    }
}
