// Scrub auxiliary
//
// Turns meta properties into stored properties by replacing each fact with
// its hash. The revealed data is recorded in the metas store so it can be
// looked up by that hash later; this write is part of the contract.

use std::any::Any;

use tracing::debug;

use modula_core::{request_from, AuxiliaryKeeper, AuxiliaryRequest, AuxiliaryResponse};
use modula_error::ModuleResult;
use modula_schema::{MetaProperties, Properties};
use modula_store::{Context, Mapper};

use super::mapper::Meta;

#[derive(Debug, Clone)]
pub struct ScrubRequest {
    pub meta_properties: MetaProperties,
}

impl ScrubRequest {
    pub fn new(meta_properties: MetaProperties) -> Self {
        Self { meta_properties }
    }
}

impl AuxiliaryRequest for ScrubRequest {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrubResponse {
    pub properties: Properties,
}

/// Unpack the scrubbed properties, or the scrub error unchanged
pub fn validate_scrub_response(response: AuxiliaryResponse) -> ModuleResult<ScrubResponse> {
    response.into_payload()
}

pub struct ScrubKeeper {
    mapper: Mapper<Meta>,
}

impl ScrubKeeper {
    pub fn new(mapper: Mapper<Meta>) -> Self {
        Self { mapper }
    }

    fn scrub(&self, ctx: &mut Context<'_>, request: &ScrubRequest) -> ModuleResult<ScrubResponse> {
        for meta_property in request.meta_properties.get_list() {
            if meta_property.data.is_scrubbed() {
                continue;
            }
            let meta = Meta::new(meta_property.data.clone());
            let mut metas = self.mapper.fetch(ctx, &meta.id)?;
            if metas.get(&meta.id).is_none() {
                debug!(meta_id = %meta.id, "Recording revealed meta");
                metas.add(ctx, meta)?;
            }
        }
        Ok(ScrubResponse {
            properties: request.meta_properties.scrub(),
        })
    }
}

impl AuxiliaryKeeper for ScrubKeeper {
    fn help(&self, ctx: &mut Context<'_>, request: &dyn AuxiliaryRequest) -> AuxiliaryResponse {
        let result = request_from::<ScrubRequest>(request).and_then(|request| self.scrub(ctx, request));
        match result {
            Ok(response) => AuxiliaryResponse::with_payload(response),
            Err(error) => AuxiliaryResponse::failure(error),
        }
    }
}
