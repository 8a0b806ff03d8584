// Super and maintain auxiliaries
//
// `super` creates the first maintainer of a new classification with every
// permission over all of its mutables; creating it is part of the contract.
// `maintain` checks that a maintainer may change a set of mutables and does
// not write.

use std::any::Any;

use tracing::debug;

use modula_core::{request_from, AuxiliaryKeeper, AuxiliaryRequest, AuxiliaryResponse};
use modula_error::{ModuleError, ModuleResult};
use modula_schema::{Id, Mutables};
use modula_store::{Context, Mapper};

use super::mapper::{maintainer_id, Maintainer};

#[derive(Debug, Clone)]
pub struct SuperRequest {
    pub classification_id: Id,
    pub identity_id: Id,
    pub mutables: Mutables,
}

impl SuperRequest {
    pub fn new(classification_id: Id, identity_id: Id, mutables: Mutables) -> Self {
        Self {
            classification_id,
            identity_id,
            mutables,
        }
    }
}

impl AuxiliaryRequest for SuperRequest {
    fn validate(&self) -> ModuleResult<()> {
        if self.classification_id.is_zero() || self.identity_id.is_zero() {
            return Err(ModuleError::invalid_request("super: missing classification or identity ID"));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct SuperKeeper {
    mapper: Mapper<Maintainer>,
}

impl SuperKeeper {
    pub fn new(mapper: Mapper<Maintainer>) -> Self {
        Self { mapper }
    }

    fn appoint(&self, ctx: &mut Context<'_>, request: &SuperRequest) -> ModuleResult<()> {
        let id = maintainer_id(ctx.chain_id(), &request.classification_id, &request.identity_id)?;
        let mut maintainers = self.mapper.fetch(ctx, &id)?;
        if maintainers.get(&id).is_some() {
            return Err(ModuleError::entity_already_exists(id.to_string()));
        }

        debug!(maintainer_id = %id, classification_id = %request.classification_id, "Appointing super maintainer");
        maintainers.add(
            ctx,
            Maintainer {
                id,
                classification_id: request.classification_id.clone(),
                identity_id: request.identity_id.clone(),
                maintained_properties: request.mutables.properties().ids(),
                add_maintainer: true,
                remove_maintainer: true,
                mutate_maintainer: true,
            },
        )?;
        Ok(())
    }
}

impl AuxiliaryKeeper for SuperKeeper {
    fn help(&self, ctx: &mut Context<'_>, request: &dyn AuxiliaryRequest) -> AuxiliaryResponse {
        request_from::<SuperRequest>(request)
            .and_then(|request| self.appoint(ctx, request))
            .into()
    }
}

#[derive(Debug, Clone)]
pub struct MaintainRequest {
    pub classification_id: Id,
    pub identity_id: Id,
    pub maintained_mutables: Mutables,
}

impl MaintainRequest {
    pub fn new(classification_id: Id, identity_id: Id, maintained_mutables: Mutables) -> Self {
        Self {
            classification_id,
            identity_id,
            maintained_mutables,
        }
    }
}

impl AuxiliaryRequest for MaintainRequest {
    fn validate(&self) -> ModuleResult<()> {
        if self.classification_id.is_zero() || self.identity_id.is_zero() {
            return Err(ModuleError::invalid_request("maintain: missing classification or identity ID"));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct MaintainKeeper {
    mapper: Mapper<Maintainer>,
}

impl MaintainKeeper {
    pub fn new(mapper: Mapper<Maintainer>) -> Self {
        Self { mapper }
    }

    fn check(&self, ctx: &Context<'_>, request: &MaintainRequest) -> ModuleResult<()> {
        let id = maintainer_id(ctx.chain_id(), &request.classification_id, &request.identity_id)?;
        let maintainers = self.mapper.fetch(ctx, &id)?;
        let maintainer = maintainers
            .get(&id)
            .ok_or_else(|| ModuleError::entity_not_found(id.to_string()))?;

        for property in request.maintained_mutables.properties().get_list() {
            if !maintainer.maintains(&property.id) {
                return Err(ModuleError::not_authorized(format!(
                    "{} does not maintain {}",
                    request.identity_id, property.id
                )));
            }
        }
        Ok(())
    }
}

impl AuxiliaryKeeper for MaintainKeeper {
    fn help(&self, ctx: &mut Context<'_>, request: &dyn AuxiliaryRequest) -> AuxiliaryResponse {
        request_from::<MaintainRequest>(request)
            .and_then(|request| self.check(ctx, request))
            .into()
    }
}
