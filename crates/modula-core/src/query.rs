// Query keepers
//
// Queries read through a context and never write. A response always carries
// the success flag and error explicitly, so "not found" and "found, but the
// list is empty" stay distinguishable.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use modula_error::{ModuleError, ModuleResult};
use modula_store::Context;

/// Query result: `{success, error, list}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse<E> {
    pub success: bool,
    pub error: Option<ModuleError>,
    pub list: Vec<E>,
}

impl<E> QueryResponse<E> {
    pub fn found(list: Vec<E>) -> Self {
        Self {
            success: true,
            error: None,
            list,
        }
    }

    pub fn failure(error: ModuleError) -> Self {
        Self {
            success: false,
            error: Some(error),
            list: Vec::new(),
        }
    }
}

impl<E> From<ModuleResult<Vec<E>>> for QueryResponse<E> {
    fn from(result: ModuleResult<Vec<E>>) -> Self {
        match result {
            Ok(list) => Self::found(list),
            Err(error) => Self::failure(error),
        }
    }
}

/// Read-only handler for one query path
pub trait QueryKeeper: Send + Sync {
    type Request: DeserializeOwned;
    type Entity: Serialize;

    fn enquire(&self, ctx: &Context<'_>, request: &Self::Request) -> QueryResponse<Self::Entity>;
}

/// Decode a JSON request body, run the keeper and encode its response
pub fn handle_query<K: QueryKeeper>(keeper: &K, ctx: &Context<'_>, body: &[u8]) -> ModuleResult<Vec<u8>> {
    let request: K::Request = serde_json::from_slice(body)
        .map_err(|e| ModuleError::invalid_request(format!("query body: {}", e)))?;
    let response = keeper.enquire(ctx, &request);
    serde_json::to_vec(&response)
        .map_err(|e| ModuleError::incorrect_format(format!("query response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_and_empty_are_distinct() {
        let empty: QueryResponse<u8> = QueryResponse::found(Vec::new());
        let missing: QueryResponse<u8> = QueryResponse::failure(ModuleError::entity_not_found("x"));

        assert!(empty.success && empty.list.is_empty());
        assert!(!missing.success && missing.list.is_empty());
        assert_ne!(empty, missing);

        let json = serde_json::to_value(&empty).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "error": null, "list": []}));
    }
}
