// Conform auxiliary
//
// Checks that a set of traits has exactly the property IDs of a
// classification. Values are not compared. Read-only.

use std::any::Any;

use tracing::debug;

use modula_core::{request_from, AuxiliaryKeeper, AuxiliaryRequest, AuxiliaryResponse};
use modula_error::{ModuleError, ModuleResult};
use modula_schema::{Id, Immutables, Mutables};
use modula_store::{Context, Mapper};

use super::mapper::Classification;

#[derive(Debug, Clone)]
pub struct ConformRequest {
    pub classification_id: Id,
    pub immutables: Immutables,
    pub mutables: Mutables,
}

impl ConformRequest {
    pub fn new(classification_id: Id, immutables: Immutables, mutables: Mutables) -> Self {
        Self {
            classification_id,
            immutables,
            mutables,
        }
    }
}

impl AuxiliaryRequest for ConformRequest {
    fn validate(&self) -> ModuleResult<()> {
        if self.classification_id.is_zero() {
            return Err(ModuleError::invalid_request("conform: missing classification ID"));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct ConformKeeper {
    mapper: Mapper<Classification>,
}

impl ConformKeeper {
    pub fn new(mapper: Mapper<Classification>) -> Self {
        Self { mapper }
    }

    fn conform(&self, ctx: &Context<'_>, request: &ConformRequest) -> ModuleResult<()> {
        let classifications = self.mapper.fetch(ctx, &request.classification_id)?;
        let classification = classifications
            .get(&request.classification_id)
            .ok_or_else(|| ModuleError::entity_not_found(request.classification_id.to_string()))?;

        if classification.immutables.properties().ids() != request.immutables.properties().ids() {
            debug!(classification_id = %request.classification_id, "Immutable property IDs differ");
            return Err(ModuleError::NonConformingTraits(format!(
                "immutables do not match classification {}",
                request.classification_id
            )));
        }
        if classification.mutables.properties().ids() != request.mutables.properties().ids() {
            debug!(classification_id = %request.classification_id, "Mutable property IDs differ");
            return Err(ModuleError::NonConformingTraits(format!(
                "mutables do not match classification {}",
                request.classification_id
            )));
        }
        Ok(())
    }
}

impl AuxiliaryKeeper for ConformKeeper {
    fn help(&self, ctx: &mut Context<'_>, request: &dyn AuxiliaryRequest) -> AuxiliaryResponse {
        request_from::<ConformRequest>(request)
            .and_then(|request| self.conform(ctx, request))
            .into()
    }
}
