use serde::{Deserialize, Serialize};

use modula_core::{QueryKeeper, QueryResponse};
use modula_error::{ModuleError, ModuleResult};
use modula_schema::Id;
use modula_store::{Context, Mapper};

use super::mapper::Maintainer;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaintainerRequest {
    pub maintainer_id: Id,
}

pub struct MaintainerQueryKeeper {
    mapper: Mapper<Maintainer>,
}

impl MaintainerQueryKeeper {
    pub fn new(mapper: Mapper<Maintainer>) -> Self {
        Self { mapper }
    }

    fn lookup(&self, ctx: &Context<'_>, request: &MaintainerRequest) -> ModuleResult<Vec<Maintainer>> {
        let maintainers = self.mapper.fetch(ctx, &request.maintainer_id)?;
        maintainers
            .get(&request.maintainer_id)
            .map(|maintainer| vec![maintainer.clone()])
            .ok_or_else(|| ModuleError::entity_not_found(request.maintainer_id.to_string()))
    }
}

impl QueryKeeper for MaintainerQueryKeeper {
    type Request = MaintainerRequest;
    type Entity = Maintainer;

    fn enquire(&self, ctx: &Context<'_>, request: &MaintainerRequest) -> QueryResponse<Maintainer> {
        self.lookup(ctx, request).into()
    }
}
