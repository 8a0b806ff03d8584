use serde::{Deserialize, Serialize};

use modula_core::{QueryKeeper, QueryResponse};
use modula_error::{ModuleError, ModuleResult};
use modula_schema::Id;
use modula_store::{Context, Mapper};

use super::mapper::Split;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitsRequest {
    pub owner_id: Id,
}

/// Every split held by one owner; an owner holding nothing is found-empty
pub struct SplitsQueryKeeper {
    mapper: Mapper<Split>,
}

impl SplitsQueryKeeper {
    pub fn new(mapper: Mapper<Split>) -> Self {
        Self { mapper }
    }

    fn lookup(&self, ctx: &Context<'_>, request: &SplitsRequest) -> ModuleResult<Vec<Split>> {
        if request.owner_id.is_zero() {
            return Err(ModuleError::invalid_request("splits: missing owner ID"));
        }

        let mut held = Vec::new();
        self.mapper.iterate(ctx, &Id::zero(), |split| {
            if split.owner_id == request.owner_id {
                held.push(split.clone());
            }
            false
        })?;
        Ok(held)
    }
}

impl QueryKeeper for SplitsQueryKeeper {
    type Request = SplitsRequest;
    type Entity = Split;

    fn enquire(&self, ctx: &Context<'_>, request: &SplitsRequest) -> QueryResponse<Split> {
        self.lookup(ctx, request).into()
    }
}
