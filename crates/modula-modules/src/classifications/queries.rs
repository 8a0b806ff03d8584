use serde::{Deserialize, Serialize};

use modula_core::{QueryKeeper, QueryResponse};
use modula_error::{ModuleError, ModuleResult};
use modula_schema::Id;
use modula_store::{Context, Mapper};

use super::mapper::Classification;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRequest {
    pub classification_id: Id,
}

pub struct ClassificationQueryKeeper {
    mapper: Mapper<Classification>,
}

impl ClassificationQueryKeeper {
    pub fn new(mapper: Mapper<Classification>) -> Self {
        Self { mapper }
    }

    fn lookup(&self, ctx: &Context<'_>, request: &ClassificationRequest) -> ModuleResult<Vec<Classification>> {
        let classifications = self.mapper.fetch(ctx, &request.classification_id)?;
        classifications
            .get(&request.classification_id)
            .map(|classification| vec![classification.clone()])
            .ok_or_else(|| ModuleError::entity_not_found(request.classification_id.to_string()))
    }
}

impl QueryKeeper for ClassificationQueryKeeper {
    type Request = ClassificationRequest;
    type Entity = Classification;

    fn enquire(&self, ctx: &Context<'_>, request: &ClassificationRequest) -> QueryResponse<Classification> {
        self.lookup(ctx, request).into()
    }
}
