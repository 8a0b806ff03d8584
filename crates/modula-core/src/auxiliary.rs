// Auxiliary capabilities
//
// An auxiliary is a named capability one module exposes so that other
// modules can call into it without importing its internals. Callers hold an
// `Auxiliary` handle resolved from the registry at startup and exchange typed
// request/response values with it.

use std::any::Any;
use std::fmt::{self, Debug};
use std::sync::Arc;

use tracing::debug;

use modula_error::{LedgerError, ModuleError, ModuleResult};
use modula_store::Context;

/// Payload sent to an auxiliary
pub trait AuxiliaryRequest: Debug + Send + Sync {
    /// Check the request's own fields before the keeper acts on it
    fn validate(&self) -> ModuleResult<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any;
}

/// Downcast a request to the concrete type an auxiliary keeper accepts
pub fn request_from<R: AuxiliaryRequest + 'static>(
    request: &dyn AuxiliaryRequest,
) -> ModuleResult<&R> {
    request
        .as_any()
        .downcast_ref::<R>()
        .ok_or_else(|| ModuleError::invalid_request(format!("unexpected request {:?}", request)))
}

/// Outcome of an auxiliary call
pub struct AuxiliaryResponse {
    pub success: bool,
    pub error: Option<ModuleError>,
    payload: Option<Box<dyn Any + Send>>,
}

impl AuxiliaryResponse {
    pub fn success() -> Self {
        Self {
            success: true,
            error: None,
            payload: None,
        }
    }

    /// Successful response carrying a typed result
    pub fn with_payload<T: Any + Send>(payload: T) -> Self {
        Self {
            success: true,
            error: None,
            payload: Some(Box::new(payload)),
        }
    }

    pub fn failure(error: ModuleError) -> Self {
        Self {
            success: false,
            error: Some(error),
            payload: None,
        }
    }

    pub fn is_successful(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> Option<&ModuleError> {
        self.error.as_ref()
    }

    /// The carried error, unchanged, or `Ok` on success
    pub fn into_result(self) -> ModuleResult<()> {
        self.into_outcome().map(|_| ())
    }

    /// Take the typed payload of a successful response
    pub fn into_payload<T: Any>(self) -> ModuleResult<T> {
        match self.into_outcome()? {
            Some(payload) => payload
                .downcast::<T>()
                .map(|boxed| *boxed)
                .map_err(|_| ModuleError::incorrect_format("auxiliary payload has unexpected type")),
            None => Err(ModuleError::incorrect_format("auxiliary response carries no payload")),
        }
    }

    fn into_outcome(self) -> ModuleResult<Option<Box<dyn Any + Send>>> {
        if self.success {
            return Ok(self.payload);
        }
        Err(self
            .error
            .unwrap_or_else(|| ModuleError::invalid_request("auxiliary failed without an error")))
    }
}

impl From<ModuleResult<()>> for AuxiliaryResponse {
    fn from(result: ModuleResult<()>) -> Self {
        match result {
            Ok(()) => Self::success(),
            Err(error) => Self::failure(error),
        }
    }
}

impl Debug for AuxiliaryResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuxiliaryResponse")
            .field("success", &self.success)
            .field("error", &self.error)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}

/// Implementation behind an auxiliary
pub trait AuxiliaryKeeper: Send + Sync {
    /// Serve one request. May read state through `ctx`; writes are allowed
    /// only where the capability documents them.
    fn help(&self, ctx: &mut Context<'_>, request: &dyn AuxiliaryRequest) -> AuxiliaryResponse;
}

/// A named capability handle
#[derive(Clone)]
pub struct Auxiliary {
    name: &'static str,
    keeper: Arc<dyn AuxiliaryKeeper>,
}

impl Auxiliary {
    pub fn new(name: &'static str, keeper: Arc<dyn AuxiliaryKeeper>) -> Self {
        Self { name, keeper }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Validate the request, then pass it to the keeper
    pub fn help(&self, ctx: &mut Context<'_>, request: &dyn AuxiliaryRequest) -> AuxiliaryResponse {
        if let Err(error) = request.validate() {
            debug!(auxiliary = self.name, code = %error.qualified_code(), "Rejected auxiliary request");
            return AuxiliaryResponse::failure(error);
        }

        let response = self.keeper.help(ctx, request);
        match response.error() {
            Some(error) => debug!(auxiliary = self.name, code = %error.qualified_code(), "Auxiliary failed"),
            None => debug!(auxiliary = self.name, "Auxiliary succeeded"),
        }
        response
    }
}

impl Debug for Auxiliary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auxiliary").field("name", &self.name).finish()
    }
}
