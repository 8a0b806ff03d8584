// Module contract
//
// Modules start in two phases. In the first the application collects the
// auxiliaries every module provides and freezes them into one registry. In
// the second each module resolves the auxiliaries its keepers depend on.

use modula_error::{ModuleResult, RegistryResult};
use modula_store::Context;

use crate::auxiliary::Auxiliary;
use crate::registry::AuxiliaryRegistry;
use crate::transaction::{Message, TransactionResponse};

/// A ledger module as seen by the host application
pub trait Module: Send + Sync {
    /// Route name; messages and queries address the module by it
    fn name(&self) -> &'static str;

    /// Capabilities this module offers to the others
    fn auxiliaries(&self) -> Vec<Auxiliary>;

    /// Bind the keepers to the auxiliaries they require
    fn initialize(&mut self, registry: &AuxiliaryRegistry) -> RegistryResult<()>;

    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse;

    /// Answer the query at `path` with a JSON request body
    fn query(&self, ctx: &Context<'_>, path: &str, body: &[u8]) -> ModuleResult<Vec<u8>>;

    fn init_genesis(&self, ctx: &mut Context<'_>, state: &serde_json::Value) -> ModuleResult<()>;

    fn export_genesis(&self, ctx: &Context<'_>) -> ModuleResult<serde_json::Value>;
}
