// Helpers shared by the module keepers

use modula_core::{Auxiliary, TransactionResponse};
use modula_error::{ModuleError, ModuleResult};
use modula_schema::{Dec, Id, MetaProperties, Properties};
use modula_store::Context;

use crate::metas::auxiliaries::{validate_scrub_response, ScrubRequest};

/// Implement `Message` for a transaction message type
macro_rules! message {
    ($message:ty, $route:expr, $kind:expr) => {
        impl modula_core::Message for $message {
            fn route(&self) -> &'static str {
                $route
            }

            fn kind(&self) -> &'static str {
                $kind
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }
        }
    };
}

/// Scrub `metas` through the metas module and put the result in front of `user`
pub(crate) fn scrub_and_compose(
    scrub: &Auxiliary,
    ctx: &mut Context<'_>,
    metas: &MetaProperties,
    user: &Properties,
) -> ModuleResult<Properties> {
    let scrubbed = validate_scrub_response(scrub.help(ctx, &ScrubRequest::new(metas.clone())))?;
    Ok(Properties::compose(&scrubbed.properties, user))
}

/// Read an ID fact the module itself stored
pub(crate) fn id_fact(properties: &Properties, id: &str) -> ModuleResult<Id> {
    Ok(properties.require(&Id::new(id))?.fact.as_id()?.clone())
}

/// Read a decimal fact the module itself stored
pub(crate) fn dec_fact(properties: &Properties, id: &str) -> ModuleResult<Dec> {
    Ok(properties.require(&Id::new(id))?.fact.as_dec()?.clone())
}

/// Reject user supplied properties that use IDs a module reserves for itself
pub(crate) fn reject_reserved(properties: &Properties, reserved: &[&str]) -> ModuleResult<()> {
    for id in reserved {
        if properties.get(&Id::new(*id)).is_some() {
            return Err(ModuleError::incorrect_message(format!("property {} is reserved", id)));
        }
    }
    Ok(())
}

pub(crate) fn not_initialized(module: &str) -> TransactionResponse {
    TransactionResponse::failure(ModuleError::Uninitialized(module.to_string()))
}

pub(crate) fn unknown_kind(module: &str, kind: &str) -> TransactionResponse {
    TransactionResponse::failure(ModuleError::incorrect_message(format!("{}/{}", module, kind)))
}

pub(crate) fn unknown_query(module: &str, path: &str) -> ModuleError {
    ModuleError::invalid_request(format!("unknown query {}/{}", module, path))
}
