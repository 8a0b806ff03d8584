// Verify auxiliary
//
// Confirms that an address is provisioned to act for an identity. Read-only.

use std::any::Any;

use modula_core::{request_from, AuxiliaryKeeper, AuxiliaryRequest, AuxiliaryResponse};
use modula_error::{ModuleError, ModuleResult};
use modula_schema::{Address, Id};
use modula_store::{Context, Mapper};

use super::mapper::Identity;

#[derive(Debug, Clone)]
pub struct VerifyRequest {
    pub address: Address,
    pub identity_id: Id,
}

impl VerifyRequest {
    pub fn new(address: Address, identity_id: Id) -> Self {
        Self { address, identity_id }
    }
}

impl AuxiliaryRequest for VerifyRequest {
    fn validate(&self) -> ModuleResult<()> {
        if self.address.is_empty() {
            return Err(ModuleError::invalid_request("verify: missing address"));
        }
        if self.identity_id.is_zero() {
            return Err(ModuleError::invalid_request("verify: missing identity ID"));
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct VerifyKeeper {
    mapper: Mapper<Identity>,
}

impl VerifyKeeper {
    pub fn new(mapper: Mapper<Identity>) -> Self {
        Self { mapper }
    }

    fn verify(&self, ctx: &Context<'_>, request: &VerifyRequest) -> ModuleResult<()> {
        let identities = self.mapper.fetch(ctx, &request.identity_id)?;
        let identity = identities
            .get(&request.identity_id)
            .ok_or_else(|| ModuleError::entity_not_found(request.identity_id.to_string()))?;
        if !identity.is_provisioned(&request.address) {
            return Err(ModuleError::not_authorized(format!(
                "{} is not provisioned for {}",
                request.address, request.identity_id
            )));
        }
        Ok(())
    }
}

impl AuxiliaryKeeper for VerifyKeeper {
    fn help(&self, ctx: &mut Context<'_>, request: &dyn AuxiliaryRequest) -> AuxiliaryResponse {
        request_from::<VerifyRequest>(request)
            .and_then(|request| self.verify(ctx, request))
            .into()
    }
}
