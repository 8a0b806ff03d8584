use serde::{Deserialize, Serialize};

use modula_core::{QueryKeeper, QueryResponse};
use modula_error::{ModuleError, ModuleResult};
use modula_schema::Id;
use modula_store::{Context, Mapper};

use super::mapper::Order;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub order_id: Id,
}

pub struct OrderQueryKeeper {
    mapper: Mapper<Order>,
}

impl OrderQueryKeeper {
    pub fn new(mapper: Mapper<Order>) -> Self {
        Self { mapper }
    }

    fn lookup(&self, ctx: &Context<'_>, request: &OrderRequest) -> ModuleResult<Vec<Order>> {
        let orders = self.mapper.fetch(ctx, &request.order_id)?;
        orders
            .get(&request.order_id)
            .map(|order| vec![order.clone()])
            .ok_or_else(|| ModuleError::entity_not_found(request.order_id.to_string()))
    }
}

impl QueryKeeper for OrderQueryKeeper {
    type Request = OrderRequest;
    type Entity = Order;

    fn enquire(&self, ctx: &Context<'_>, request: &OrderRequest) -> QueryResponse<Order> {
        self.lookup(ctx, request).into()
    }
}
