// Custody, reverse and transfer auxiliaries
//
// All three move split value and write through the caller's context:
// custody moves an owner's value into escrow, reverse releases escrowed value
// to an owner, transfer moves value between owners.

use std::any::Any;

use tracing::debug;

use modula_core::{request_from, AuxiliaryKeeper, AuxiliaryRequest, AuxiliaryResponse};
use modula_error::{ModuleError, ModuleResult};
use modula_schema::{Dec, Id};
use modula_store::{Context, Mapper};

use super::mapper::{escrow_id, move_split, Split};

fn validate_movement(name: &str, ids: &[&Id], value: &Dec) -> ModuleResult<()> {
    if ids.iter().any(|id| id.is_zero()) {
        return Err(ModuleError::invalid_request(format!("{}: missing ID", name)));
    }
    if !value.is_positive() {
        return Err(ModuleError::invalid_request(format!("{}: value must be positive", name)));
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct CustodyRequest {
    pub owner_id: Id,
    pub ownable_id: Id,
    pub value: Dec,
}

impl CustodyRequest {
    pub fn new(owner_id: Id, ownable_id: Id, value: Dec) -> Self {
        Self {
            owner_id,
            ownable_id,
            value,
        }
    }
}

impl AuxiliaryRequest for CustodyRequest {
    fn validate(&self) -> ModuleResult<()> {
        validate_movement("custody", &[&self.owner_id, &self.ownable_id], &self.value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct CustodyKeeper {
    mapper: Mapper<Split>,
}

impl CustodyKeeper {
    pub fn new(mapper: Mapper<Split>) -> Self {
        Self { mapper }
    }

    fn custody(&self, ctx: &mut Context<'_>, request: &CustodyRequest) -> ModuleResult<()> {
        debug!(owner_id = %request.owner_id, ownable_id = %request.ownable_id, value = %request.value, "Custody");
        move_split(
            ctx,
            &self.mapper,
            &request.owner_id,
            &escrow_id(),
            &request.ownable_id,
            &request.value,
        )
    }
}

impl AuxiliaryKeeper for CustodyKeeper {
    fn help(&self, ctx: &mut Context<'_>, request: &dyn AuxiliaryRequest) -> AuxiliaryResponse {
        request_from::<CustodyRequest>(request)
            .and_then(|request| self.custody(ctx, request))
            .into()
    }
}

#[derive(Debug, Clone)]
pub struct ReverseRequest {
    pub owner_id: Id,
    pub ownable_id: Id,
    pub value: Dec,
}

impl ReverseRequest {
    pub fn new(owner_id: Id, ownable_id: Id, value: Dec) -> Self {
        Self {
            owner_id,
            ownable_id,
            value,
        }
    }
}

impl AuxiliaryRequest for ReverseRequest {
    fn validate(&self) -> ModuleResult<()> {
        validate_movement("reverse", &[&self.owner_id, &self.ownable_id], &self.value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct ReverseKeeper {
    mapper: Mapper<Split>,
}

impl ReverseKeeper {
    pub fn new(mapper: Mapper<Split>) -> Self {
        Self { mapper }
    }

    fn reverse(&self, ctx: &mut Context<'_>, request: &ReverseRequest) -> ModuleResult<()> {
        debug!(owner_id = %request.owner_id, ownable_id = %request.ownable_id, value = %request.value, "Reverse");
        move_split(
            ctx,
            &self.mapper,
            &escrow_id(),
            &request.owner_id,
            &request.ownable_id,
            &request.value,
        )
    }
}

impl AuxiliaryKeeper for ReverseKeeper {
    fn help(&self, ctx: &mut Context<'_>, request: &dyn AuxiliaryRequest) -> AuxiliaryResponse {
        request_from::<ReverseRequest>(request)
            .and_then(|request| self.reverse(ctx, request))
            .into()
    }
}

#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub from_id: Id,
    pub to_id: Id,
    pub ownable_id: Id,
    pub value: Dec,
}

impl TransferRequest {
    pub fn new(from_id: Id, to_id: Id, ownable_id: Id, value: Dec) -> Self {
        Self {
            from_id,
            to_id,
            ownable_id,
            value,
        }
    }
}

impl AuxiliaryRequest for TransferRequest {
    fn validate(&self) -> ModuleResult<()> {
        validate_movement(
            "transfer",
            &[&self.from_id, &self.to_id, &self.ownable_id],
            &self.value,
        )
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub struct TransferKeeper {
    mapper: Mapper<Split>,
}

impl TransferKeeper {
    pub fn new(mapper: Mapper<Split>) -> Self {
        Self { mapper }
    }

    fn transfer(&self, ctx: &mut Context<'_>, request: &TransferRequest) -> ModuleResult<()> {
        debug!(from_id = %request.from_id, to_id = %request.to_id, value = %request.value, "Transfer");
        move_split(
            ctx,
            &self.mapper,
            &request.from_id,
            &request.to_id,
            &request.ownable_id,
            &request.value,
        )
    }
}

impl AuxiliaryKeeper for TransferKeeper {
    fn help(&self, ctx: &mut Context<'_>, request: &dyn AuxiliaryRequest) -> AuxiliaryResponse {
        request_from::<TransferRequest>(request)
            .and_then(|request| self.transfer(ctx, request))
            .into()
    }
}
