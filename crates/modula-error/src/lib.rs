// Modula Error Handling
// Central location for the error types shared by schema, store, registry and modules

use std::error::Error as StdError;
use std::fmt;

use serde::{Deserialize, Serialize};

// Module structure
mod module;
mod registry;
mod schema;
mod store;

pub use module::{ModuleError, ModuleResult};
pub use registry::{RegistryError, RegistryResult};
pub use schema::{SchemaError, SchemaResult};
pub use store::{StoreError, StoreResult};

/// Error domains representing the layers of the ledger substrate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorDomain {
    Schema,
    Store,
    Module,
    Registry,
}

impl fmt::Display for ErrorDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDomain::Schema => write!(f, "schema"),
            ErrorDomain::Store => write!(f, "store"),
            ErrorDomain::Module => write!(f, "module"),
            ErrorDomain::Registry => write!(f, "registry"),
        }
    }
}

/// Numeric error code, stable across releases so client tooling can classify failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u32);

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

/// Base trait for all errors raised by the ledger substrate.
pub trait LedgerError: StdError + Send + Sync + 'static {
    /// Numeric code of this error.
    fn code(&self) -> ErrorCode;

    /// Unique static string code for this error variant.
    fn error_code(&self) -> &'static str;

    /// The layer the error originates from.
    fn domain(&self) -> ErrorDomain;

    /// Codespace-qualified rendering used in log lines, e.g. `module/3002`.
    fn qualified_code(&self) -> String {
        format!("{}/{}", self.domain(), self.code())
    }
}
