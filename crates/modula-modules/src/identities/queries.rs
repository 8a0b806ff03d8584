use serde::{Deserialize, Serialize};

use modula_core::{QueryKeeper, QueryResponse};
use modula_error::{ModuleError, ModuleResult};
use modula_schema::Id;
use modula_store::{Context, Mapper};

use super::mapper::Identity;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRequest {
    pub identity_id: Id,
}

pub struct IdentityQueryKeeper {
    mapper: Mapper<Identity>,
}

impl IdentityQueryKeeper {
    pub fn new(mapper: Mapper<Identity>) -> Self {
        Self { mapper }
    }

    fn lookup(&self, ctx: &Context<'_>, request: &IdentityRequest) -> ModuleResult<Vec<Identity>> {
        let identities = self.mapper.fetch(ctx, &request.identity_id)?;
        identities
            .get(&request.identity_id)
            .map(|identity| vec![identity.clone()])
            .ok_or_else(|| ModuleError::entity_not_found(request.identity_id.to_string()))
    }
}

impl QueryKeeper for IdentityQueryKeeper {
    type Request = IdentityRequest;
    type Entity = Identity;

    fn enquire(&self, ctx: &Context<'_>, request: &IdentityRequest) -> QueryResponse<Identity> {
        self.lookup(ctx, request).into()
    }
}
