use serde::{Deserialize, Serialize};

use modula_core::{QueryKeeper, QueryResponse};
use modula_error::{ModuleError, ModuleResult};
use modula_schema::Id;
use modula_store::{Context, Mapper};

use super::mapper::Meta;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaRequest {
    pub meta_id: Id,
}

pub struct MetaQueryKeeper {
    mapper: Mapper<Meta>,
}

impl MetaQueryKeeper {
    pub fn new(mapper: Mapper<Meta>) -> Self {
        Self { mapper }
    }

    fn lookup(&self, ctx: &Context<'_>, request: &MetaRequest) -> ModuleResult<Vec<Meta>> {
        let metas = self.mapper.fetch(ctx, &request.meta_id)?;
        match metas.get(&request.meta_id) {
            Some(meta) => Ok(vec![meta.clone()]),
            None => Err(ModuleError::entity_not_found(request.meta_id.to_string())),
        }
    }
}

impl QueryKeeper for MetaQueryKeeper {
    type Request = MetaRequest;
    type Entity = Meta;

    fn enquire(&self, ctx: &Context<'_>, request: &MetaRequest) -> QueryResponse<Meta> {
        self.lookup(ctx, request).into()
    }
}
