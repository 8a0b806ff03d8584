// Host application harness
//
// Plays the part of the surrounding chain node: owns the committed store,
// wires the modules together at startup and applies each transaction's
// writes only when the transaction succeeds.

use std::collections::BTreeMap;

use tracing::{debug, info, info_span, warn};

use modula_error::{LedgerError, ModuleError, ModuleResult, RegistryError, RegistryResult};
use modula_schema::Id;
use modula_store::{Context, Header, MemoryStore};

use crate::config::AppConfig;
use crate::module::Module;
use crate::registry::AuxiliaryRegistry;
use crate::transaction::{Message, TransactionResponse};

/// Module host with a committed in-memory store
pub struct Application {
    config: AppConfig,
    store: MemoryStore,
    modules: Vec<Box<dyn Module>>,
    routes: BTreeMap<&'static str, usize>,
    registry: AuxiliaryRegistry,
    height: u64,
}

impl Application {
    /// Build the application and run both module initialization phases.
    ///
    /// Fails on an invalid config, on duplicate module or auxiliary names and
    /// on any keeper whose required auxiliary is not provided by some module.
    pub fn new(config: AppConfig, mut modules: Vec<Box<dyn Module>>) -> RegistryResult<Self> {
        config
            .validate()
            .map_err(|error| RegistryError::InvalidConfig(error.to_string()))?;

        let mut routes = BTreeMap::new();
        for (index, module) in modules.iter().enumerate() {
            if routes.insert(module.name(), index).is_some() {
                return Err(RegistryError::DuplicateModule(module.name().to_string()));
            }
        }

        let provided = modules.iter().flat_map(|module| module.auxiliaries()).collect();
        let registry = AuxiliaryRegistry::new(provided)?;

        for module in modules.iter_mut() {
            module.initialize(&registry)?;
            debug!(module = module.name(), "Initialized module");
        }

        info!(
            chain_id = %config.chain_id,
            modules = modules.len(),
            auxiliaries = registry.len(),
            "Application ready"
        );

        let height = config.initial_height;
        Ok(Self {
            config,
            store: MemoryStore::new(),
            modules,
            routes,
            registry,
            height,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn chain_id(&self) -> Id {
        Id::new(self.config.chain_id.clone())
    }

    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn registry(&self) -> &AuxiliaryRegistry {
        &self.registry
    }

    /// Digest of the committed store
    pub fn state_hash(&self) -> String {
        self.store.state_hash()
    }

    /// Advance to the next block height
    pub fn begin_block(&mut self, height: u64) {
        debug!(height, "Begin block");
        self.height = height;
    }

    fn header(&self) -> Header {
        Header::new(self.chain_id(), self.height)
    }

    fn module(&self, route: &str) -> Result<&dyn Module, RegistryError> {
        self.routes
            .get(route)
            .map(|index| self.modules[*index].as_ref())
            .ok_or_else(|| RegistryError::UnknownModule(route.to_string()))
    }

    /// Execute one transaction; its writes are committed only on success
    pub fn deliver(&mut self, message: &dyn Message) -> TransactionResponse {
        let span = info_span!("deliver", module = message.route(), kind = message.kind(), height = self.height);
        let _guard = span.enter();

        let header = self.header();
        let module = match self.module(message.route()) {
            Ok(module) => module,
            Err(error) => {
                warn!(%error, "No module for message");
                return TransactionResponse::failure(ModuleError::incorrect_message(error.to_string()));
            }
        };

        let mut ctx = Context::new(header, &self.store);
        let response = module.transact(&mut ctx, message);

        match response.error() {
            None => {
                let change_set = ctx.into_change_set();
                info!(writes = change_set.len(), "Transaction committed");
                self.store.apply(change_set);
            }
            Some(error) => {
                warn!(code = %error.qualified_code(), %error, "Transaction failed, discarding writes");
            }
        }
        response
    }

    /// Answer a JSON query against committed state
    pub fn query(&self, route: &str, path: &str, body: &[u8]) -> ModuleResult<Vec<u8>> {
        let module = self
            .module(route)
            .map_err(|error| ModuleError::invalid_request(error.to_string()))?;
        let ctx = Context::new(self.header(), &self.store);
        module.query(&ctx, path, body)
    }

    /// Load genesis state for every module named in `states`.
    ///
    /// Nothing is committed unless every module loads its state.
    pub fn init_genesis(&mut self, states: &BTreeMap<String, serde_json::Value>) -> ModuleResult<()> {
        for route in states.keys() {
            if !self.routes.contains_key(route.as_str()) {
                return Err(ModuleError::invalid_request(
                    RegistryError::UnknownModule(route.clone()).to_string(),
                ));
            }
        }

        let header = self.header();
        let mut ctx = Context::new(header, &self.store);
        for module in &self.modules {
            if let Some(state) = states.get(module.name()) {
                module.init_genesis(&mut ctx, state)?;
            }
        }
        let change_set = ctx.into_change_set();
        info!(writes = change_set.len(), "Genesis committed");
        self.store.apply(change_set);
        Ok(())
    }

    /// Export the state of every module, keyed by module name
    pub fn export_genesis(&self) -> ModuleResult<BTreeMap<String, serde_json::Value>> {
        let ctx = Context::new(self.header(), &self.store);
        let mut states = BTreeMap::new();
        for module in &self.modules {
            states.insert(module.name().to_string(), module.export_genesis(&ctx)?);
        }
        Ok(states)
    }
}
