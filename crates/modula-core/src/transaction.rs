// Transaction messages and keepers
//
// A transaction keeper runs its steps strictly in order and returns the first
// error unchanged. It never commits anything itself: its writes sit in the
// context buffer and the host applies them only for a successful response.

use std::any::Any;
use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use modula_error::{ModuleError, ModuleResult};
use modula_schema::Id;
use modula_store::Context;

/// A decoded inbound transaction
pub trait Message: Debug + Send + Sync {
    /// Name of the module that handles this message
    fn route(&self) -> &'static str;

    /// Message kind within the module, e.g. `define`
    fn kind(&self) -> &'static str;

    fn as_any(&self) -> &dyn Any;
}

/// Downcast a message to the concrete type a keeper handles
pub fn message_from<M: Message + 'static>(message: &dyn Message) -> ModuleResult<&M> {
    message.as_any().downcast_ref::<M>().ok_or_else(|| {
        ModuleError::incorrect_message(format!("{}/{}", message.route(), message.kind()))
    })
}

/// Result of one transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub success: bool,
    pub error: Option<ModuleError>,
    /// ID of the entity the transaction created, where there is one
    pub id: Option<Id>,
}

impl TransactionResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            id: None,
        }
    }

    pub fn created(id: Id) -> Self {
        Self {
            success: true,
            error: None,
            id: Some(id),
        }
    }

    pub fn failure(error: ModuleError) -> Self {
        Self {
            success: false,
            error: Some(error),
            id: None,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> Option<&ModuleError> {
        self.error.as_ref()
    }

    pub fn into_result(self) -> ModuleResult<Option<Id>> {
        if self.success {
            return Ok(self.id);
        }
        Err(self
            .error
            .unwrap_or_else(|| ModuleError::invalid_request("transaction failed without an error")))
    }
}

impl From<ModuleResult<Option<Id>>> for TransactionResponse {
    fn from(result: ModuleResult<Option<Id>>) -> Self {
        match result {
            Ok(Some(id)) => Self::created(id),
            Ok(None) => Self::ok(),
            Err(error) => Self::failure(error),
        }
    }
}

/// State-transition handler for one message kind
pub trait TransactionKeeper: Send + Sync {
    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse;
}
