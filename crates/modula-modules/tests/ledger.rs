//! End-to-end ledger tests: every module wired through the application host.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;

use modula_core::{
    init_test_logging, AppConfig, Application, Auxiliary, AuxiliaryKeeper, AuxiliaryRegistry,
    AuxiliaryRequest, AuxiliaryResponse, GenesisState, Message, Module, QueryResponse,
    TransactionResponse,
};
use modula_error::{ModuleError, ModuleResult, RegistryError, RegistryResult};
use modula_modules::classifications::transactions::DefineMessage;
use modula_modules::exchanges::mapper::{escrow_id, split_id, Split};
use modula_modules::exchanges::queries::SplitsRequest;
use modula_modules::exchanges::transactions::SendMessage;
use modula_modules::identities::mapper::Identity;
use modula_modules::identities::transactions::{IssueMessage, MutateMessage, ProvisionMessage, UnprovisionMessage};
use modula_modules::maintainers::transactions::DeputizeMessage;
use modula_modules::metas::mapper::Meta;
use modula_modules::metas::queries::MetaRequest;
use modula_modules::orders::mapper::Order;
use modula_modules::orders::queries::OrderRequest;
use modula_modules::orders::transactions::{CancelMessage, MakeMessage, TakeMessage};
use modula_modules::{
    modules, ClassificationsModule, ExchangesModule, IdentitiesModule, MaintainersModule,
    MetasModule, OrdersModule,
};
use modula_schema::{
    derive_id, Address, Dec, Fact, Id, Immutables, MetaProperties, Mutables, Properties,
};
use modula_store::Context;

const CHAIN: &str = "test-1";

fn alice() -> Id {
    Id::new("alice")
}

fn bob() -> Id {
    Id::new("bob")
}

fn coin() -> Id {
    Id::new("coin")
}

fn gem() -> Id {
    Id::new("gem")
}

fn dec(value: i64) -> Dec {
    Dec::from_integer(value)
}

fn properties(list: &str) -> Properties {
    Properties::read(list).unwrap()
}

fn genesis_identity(id: Id, address: &str) -> Identity {
    Identity {
        id,
        classification_id: Id::new("genesis"),
        immutables: Immutables::default(),
        mutables: Mutables::default(),
        provisioned: BTreeSet::from([Address::new(address)]),
        unprovisioned: BTreeSet::new(),
    }
}

fn genesis_split(owner_id: Id, ownable_id: Id, value: Dec) -> Split {
    Split {
        id: split_id(&Id::new(CHAIN), &owner_id, &ownable_id).unwrap(),
        owner_id,
        ownable_id,
        value,
    }
}

/// alice (alice-addr) holds 100 coin, bob (bob-addr) holds 50 gem
fn seed() -> BTreeMap<String, serde_json::Value> {
    let identities = GenesisState::new(vec![
        genesis_identity(alice(), "alice-addr"),
        genesis_identity(bob(), "bob-addr"),
    ]);
    let splits = GenesisState::new(vec![
        genesis_split(alice(), coin(), dec(100)),
        genesis_split(bob(), gem(), dec(50)),
    ]);
    BTreeMap::from([
        ("identities".to_string(), identities.to_value().unwrap()),
        ("exchanges".to_string(), splits.to_value().unwrap()),
    ])
}

fn start(modules: Vec<Box<dyn Module>>) -> Application {
    init_test_logging();
    let mut app = Application::new(AppConfig::new().with_chain_id(CHAIN), modules).unwrap();
    app.init_genesis(&seed()).unwrap();
    app
}

fn query<R: serde::Serialize, E: serde::de::DeserializeOwned>(
    app: &Application,
    route: &str,
    path: &str,
    request: &R,
) -> QueryResponse<E> {
    let body = serde_json::to_vec(request).unwrap();
    serde_json::from_slice(&app.query(route, path, &body).unwrap()).unwrap()
}

fn balance(app: &Application, owner_id: Id, ownable_id: &Id) -> Option<Dec> {
    let response: QueryResponse<Split> = query(app, "exchanges", "splits", &SplitsRequest { owner_id });
    assert!(response.success);
    response
        .list
        .into_iter()
        .find(|split| &split.ownable_id == ownable_id)
        .map(|split| split.value)
}

fn define(app: &mut Application, from: &str, from_id: Id, immutables: &str, mutables: &str) -> TransactionResponse {
    app.deliver(&DefineMessage {
        from: Address::new(from),
        from_id,
        immutable_meta_properties: MetaProperties::new(),
        immutable_properties: properties(immutables),
        mutable_meta_properties: MetaProperties::new(),
        mutable_properties: properties(mutables),
    })
}

fn make(app: &mut Application, maker_split: i64, exchange_rate: i64) -> TransactionResponse {
    app.deliver(&MakeMessage {
        from: Address::new("alice-addr"),
        from_id: alice(),
        maker_split_id: coin(),
        taker_split_id: gem(),
        exchange_rate: dec(exchange_rate),
        maker_split: dec(maker_split),
        immutable_meta_properties: MetaProperties::new(),
        immutable_properties: properties("market:S|spot"),
        mutable_meta_properties: MetaProperties::new(),
        mutable_properties: Properties::new(),
    })
}

#[test]
fn test_define_derives_id_and_rejects_repeat() -> anyhow::Result<()> {
    let mut app = start(modules());

    let response = define(&mut app, "alice-addr", alice(), "type:S|X", "status:S|active");
    let expected = derive_id(
        &Id::new(CHAIN),
        &Immutables::new(properties("type:S|X")),
        &Mutables::new(properties("status:S|active")),
    )?;
    assert_eq!(response.clone().into_result()?, Some(expected));

    let before = app.state_hash();
    let repeat = define(&mut app, "alice-addr", alice(), "type:S|X", "status:S|active");
    assert!(matches!(repeat.error(), Some(ModuleError::EntityAlreadyExists(_))));
    assert_eq!(app.state_hash(), before);
    Ok(())
}

#[test]
fn test_define_requires_provisioned_signer() {
    let mut app = start(modules());
    let before = app.state_hash();

    let response = define(&mut app, "bob-addr", alice(), "type:S|X", "status:S|active");
    assert!(matches!(response.error(), Some(ModuleError::NotAuthorized(_))));
    assert_eq!(app.state_hash(), before);
}

#[test]
fn test_cancel_unknown_order_leaves_state() {
    let mut app = start(modules());
    let before = app.state_hash();

    let response = app.deliver(&CancelMessage {
        from: Address::new("alice-addr"),
        order_id: Id::new("no-such-order"),
    });
    assert!(matches!(response.error(), Some(ModuleError::EntityNotFound(_))));
    assert_eq!(app.state_hash(), before);
}

#[test]
fn test_order_lifecycle() -> anyhow::Result<()> {
    let mut app = start(modules());

    let order_id = make(&mut app, 10, 2).into_result()?.ok_or_else(|| anyhow::anyhow!("no order ID"))?;
    assert_eq!(balance(&app, alice(), &coin()), Some(dec(90)));
    assert_eq!(balance(&app, escrow_id(), &coin()), Some(dec(10)));

    // 3 gem at 2 coin per gem
    app.deliver(&TakeMessage {
        from: Address::new("bob-addr"),
        from_id: bob(),
        order_id: order_id.clone(),
        taker_split: dec(3),
    })
    .into_result()?;
    assert_eq!(balance(&app, bob(), &gem()), Some(dec(47)));
    assert_eq!(balance(&app, alice(), &gem()), Some(dec(3)));
    assert_eq!(balance(&app, bob(), &coin()), Some(dec(6)));
    assert_eq!(balance(&app, escrow_id(), &coin()), Some(dec(4)));

    let order: QueryResponse<Order> = query(&app, "orders", "order", &OrderRequest { order_id: order_id.clone() });
    assert_eq!(order.list[0].mutables.get(&Id::new("makerSplit")).map(|p| p.fact.clone()), Some(Fact::Dec(dec(4))));

    let before = app.state_hash();
    let greedy = app.deliver(&TakeMessage {
        from: Address::new("bob-addr"),
        from_id: bob(),
        order_id: order_id.clone(),
        taker_split: dec(3),
    });
    assert!(matches!(greedy.error(), Some(ModuleError::InsufficientBalance(_))));
    assert_eq!(app.state_hash(), before);

    let stranger = app.deliver(&CancelMessage {
        from: Address::new("bob-addr"),
        order_id: order_id.clone(),
    });
    assert!(matches!(stranger.error(), Some(ModuleError::NotAuthorized(_))));
    assert_eq!(app.state_hash(), before);

    app.deliver(&CancelMessage {
        from: Address::new("alice-addr"),
        order_id: order_id.clone(),
    })
    .into_result()?;
    assert_eq!(balance(&app, alice(), &coin()), Some(dec(94)));
    assert_eq!(balance(&app, escrow_id(), &coin()), None);

    let gone: QueryResponse<Order> = query(&app, "orders", "order", &OrderRequest { order_id });
    assert!(matches!(gone.error, Some(ModuleError::EntityNotFound(_))));
    Ok(())
}

#[test]
fn test_take_filling_order_removes_it() -> anyhow::Result<()> {
    let mut app = start(modules());
    let order_id = make(&mut app, 10, 2).into_result()?.ok_or_else(|| anyhow::anyhow!("no order ID"))?;

    app.deliver(&TakeMessage {
        from: Address::new("bob-addr"),
        from_id: bob(),
        order_id: order_id.clone(),
        taker_split: dec(5),
    })
    .into_result()?;

    assert_eq!(balance(&app, bob(), &coin()), Some(dec(10)));
    assert_eq!(balance(&app, escrow_id(), &coin()), None);
    let gone: QueryResponse<Order> = query(&app, "orders", "order", &OrderRequest { order_id });
    assert!(!gone.success);
    Ok(())
}

#[test]
fn test_make_rejects_reserved_properties_and_overdraw() {
    let mut app = start(modules());
    let before = app.state_hash();

    let reserved = app.deliver(&MakeMessage {
        from: Address::new("alice-addr"),
        from_id: alice(),
        maker_split_id: coin(),
        taker_split_id: gem(),
        exchange_rate: dec(1),
        maker_split: dec(1),
        immutable_meta_properties: MetaProperties::new(),
        immutable_properties: properties("makerID:I|bob"),
        mutable_meta_properties: MetaProperties::new(),
        mutable_properties: Properties::new(),
    });
    assert!(matches!(reserved.error(), Some(ModuleError::IncorrectMessage(_))));

    let overdraw = make(&mut app, 101, 1);
    assert!(matches!(overdraw.error(), Some(ModuleError::InsufficientBalance(_))));
    assert_eq!(app.state_hash(), before);
}

#[test]
fn test_send_moves_split() -> anyhow::Result<()> {
    let mut app = start(modules());
    app.deliver(&SendMessage {
        from: Address::new("alice-addr"),
        from_id: alice(),
        to_id: bob(),
        ownable_id: coin(),
        value: dec(40),
    })
    .into_result()?;

    assert_eq!(balance(&app, alice(), &coin()), Some(dec(60)));
    assert_eq!(balance(&app, bob(), &coin()), Some(dec(40)));
    Ok(())
}

#[test]
fn test_identity_issue_mutate_and_deputize() -> anyhow::Result<()> {
    let mut app = start(modules());

    let classification_id = app
        .deliver(&DefineMessage {
            from: Address::new("alice-addr"),
            from_id: alice(),
            immutable_meta_properties: MetaProperties::read("name:S|")?,
            immutable_properties: Properties::new(),
            mutable_meta_properties: MetaProperties::new(),
            mutable_properties: properties("status:S|active"),
        })
        .into_result()?
        .ok_or_else(|| anyhow::anyhow!("no classification ID"))?;

    let issue = |name: &str| IssueMessage {
        from: Address::new("alice-addr"),
        from_id: alice(),
        to: Address::new("carol-addr"),
        classification_id: classification_id.clone(),
        immutable_meta_properties: MetaProperties::read(&format!("name:S|{}", name)).unwrap(),
        immutable_properties: Properties::new(),
        mutable_meta_properties: MetaProperties::new(),
        mutable_properties: properties("status:S|active"),
    };
    let carol = app.deliver(&issue("carol")).into_result()?.ok_or_else(|| anyhow::anyhow!("no identity ID"))?;

    // The revealed name is recorded by scrub
    let name_hash = Fact::String("carol".into()).hash();
    let meta: QueryResponse<Meta> = query(&app, "metas", "meta", &MetaRequest { meta_id: name_hash });
    assert_eq!(meta.list[0].data, Fact::String("carol".into()));

    let nonconforming = app.deliver(&IssueMessage {
        mutable_properties: properties("owner:S|dave"),
        ..issue("dave")
    });
    assert!(matches!(nonconforming.error(), Some(ModuleError::NonConformingTraits(_))));

    let mutate = |from: &str, from_id: Id| MutateMessage {
        from: Address::new(from),
        from_id,
        identity_id: carol.clone(),
        mutable_meta_properties: MetaProperties::new(),
        mutable_properties: properties("status:S|retired"),
    };

    // bob is no maintainer of the classification yet
    let refused = app.deliver(&mutate("bob-addr", bob()));
    assert!(matches!(refused.error(), Some(ModuleError::EntityNotFound(_))));

    app.deliver(&DeputizeMessage {
        from: Address::new("alice-addr"),
        from_id: alice(),
        to_id: bob(),
        classification_id: classification_id.clone(),
        maintained_properties: BTreeSet::from([Id::new("status")]),
        add_maintainer: false,
        remove_maintainer: false,
        mutate_maintainer: false,
    })
    .into_result()?;

    app.deliver(&mutate("bob-addr", bob())).into_result()?;
    let identity: QueryResponse<Identity> = query(
        &app,
        "identities",
        "identity",
        &serde_json::json!({ "identity_id": carol }),
    );
    assert_eq!(
        identity.list[0].mutables.get(&Id::new("status")).map(|p| p.fact.clone()),
        Some(Fact::String("retired".into()))
    );

    let escalation = app.deliver(&DeputizeMessage {
        from: Address::new("bob-addr"),
        from_id: bob(),
        to_id: Id::new("dave"),
        classification_id,
        maintained_properties: BTreeSet::new(),
        add_maintainer: false,
        remove_maintainer: false,
        mutate_maintainer: false,
    });
    assert!(matches!(escalation.error(), Some(ModuleError::NotAuthorized(_))));
    Ok(())
}

#[test]
fn test_issue_requires_provisioned_signer() -> anyhow::Result<()> {
    let mut app = start(modules());
    let classification_id = define(&mut app, "alice-addr", alice(), "type:S|X", "status:S|active")
        .into_result()?
        .ok_or_else(|| anyhow::anyhow!("no classification ID"))?;

    let before = app.state_hash();
    let issued = app.deliver(&IssueMessage {
        from: Address::new("mallory-addr"),
        from_id: alice(),
        to: Address::new("mallory-addr"),
        classification_id,
        immutable_meta_properties: MetaProperties::new(),
        immutable_properties: properties("type:S|X"),
        mutable_meta_properties: MetaProperties::new(),
        mutable_properties: properties("status:S|active"),
    });
    assert!(matches!(issued.error(), Some(ModuleError::NotAuthorized(_))));
    assert_eq!(app.state_hash(), before);
    Ok(())
}

#[test]
fn test_provision_and_unprovision() -> anyhow::Result<()> {
    let mut app = start(modules());
    let provision = ProvisionMessage {
        from: Address::new("alice-addr"),
        identity_id: alice(),
        to: Address::new("alice-cold"),
    };
    app.deliver(&provision).into_result()?;
    assert!(matches!(
        app.deliver(&provision).error(),
        Some(ModuleError::EntityAlreadyExists(_))
    ));

    app.deliver(&UnprovisionMessage {
        from: Address::new("alice-addr"),
        identity_id: alice(),
        to: Address::new("alice-cold"),
    })
    .into_result()?;

    // An unprovisioned address can neither act nor come back
    let send = app.deliver(&SendMessage {
        from: Address::new("alice-cold"),
        from_id: alice(),
        to_id: bob(),
        ownable_id: coin(),
        value: dec(1),
    });
    assert!(matches!(send.error(), Some(ModuleError::NotAuthorized(_))));
    assert!(matches!(
        app.deliver(&provision).error(),
        Some(ModuleError::NotAuthorized(_))
    ));
    Ok(())
}

#[test]
fn test_export_then_import_reproduces_state() -> anyhow::Result<()> {
    let mut app = start(modules());
    define(&mut app, "alice-addr", alice(), "type:S|X", "status:S|active").into_result()?;
    make(&mut app, 10, 2).into_result()?;

    let exported = app.export_genesis()?;
    let mut restored = Application::new(AppConfig::new().with_chain_id(CHAIN), modules())?;
    restored.init_genesis(&exported)?;

    assert_eq!(restored.export_genesis()?, exported);
    assert_eq!(restored.state_hash(), app.state_hash());

    let orders: GenesisState<Order> = serde_json::from_value(exported["orders"].clone())?;
    assert_eq!(orders.entities.len(), 1);
    Ok(())
}

#[test]
fn test_importing_duplicate_ids_fails() {
    init_test_logging();
    let mut app = Application::new(AppConfig::new().with_chain_id(CHAIN), modules()).unwrap();
    let twice = GenesisState::new(vec![
        genesis_identity(alice(), "alice-addr"),
        genesis_identity(alice(), "alice-addr"),
    ]);
    let states = BTreeMap::from([("identities".to_string(), twice.to_value().unwrap())]);

    let result = app.init_genesis(&states);
    assert!(matches!(result, Err(ModuleError::EntityAlreadyExists(_))));
    assert!(app.store().is_empty());
}

#[test]
fn test_missing_exchanges_fails_startup() {
    let without_exchanges: Vec<Box<dyn Module>> = vec![
        Box::new(MetasModule::new()),
        Box::new(IdentitiesModule::new()),
        Box::new(ClassificationsModule::new()),
        Box::new(MaintainersModule::new()),
        Box::new(OrdersModule::new()),
    ];
    let result = Application::new(AppConfig::default(), without_exchanges);
    assert!(matches!(result, Err(RegistryError::UnboundAuxiliary { .. })));
}

/// Module wrapper that records every auxiliary call it serves
struct Recorded {
    inner: Box<dyn Module>,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

struct RecordingKeeper {
    inner: Auxiliary,
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl AuxiliaryKeeper for RecordingKeeper {
    fn help(&self, ctx: &mut Context<'_>, request: &dyn AuxiliaryRequest) -> AuxiliaryResponse {
        self.calls.lock().unwrap().push(self.inner.name());
        self.inner.help(ctx, request)
    }
}

impl Module for Recorded {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn auxiliaries(&self) -> Vec<Auxiliary> {
        self.inner
            .auxiliaries()
            .into_iter()
            .map(|auxiliary| {
                let name = auxiliary.name();
                let keeper = RecordingKeeper {
                    inner: auxiliary,
                    calls: Arc::clone(&self.calls),
                };
                Auxiliary::new(name, Arc::new(keeper))
            })
            .collect()
    }

    fn initialize(&mut self, registry: &AuxiliaryRegistry) -> RegistryResult<()> {
        self.inner.initialize(registry)
    }

    fn transact(&self, ctx: &mut Context<'_>, message: &dyn Message) -> TransactionResponse {
        self.inner.transact(ctx, message)
    }

    fn query(&self, ctx: &Context<'_>, path: &str, body: &[u8]) -> ModuleResult<Vec<u8>> {
        self.inner.query(ctx, path, body)
    }

    fn init_genesis(&self, ctx: &mut Context<'_>, state: &serde_json::Value) -> ModuleResult<()> {
        self.inner.init_genesis(ctx, state)
    }

    fn export_genesis(&self, ctx: &Context<'_>) -> ModuleResult<serde_json::Value> {
        self.inner.export_genesis(ctx)
    }
}

#[test]
fn test_cancel_with_failed_verify_never_reverses() -> anyhow::Result<()> {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = |inner: Box<dyn Module>| -> Box<dyn Module> {
        Box::new(Recorded {
            inner,
            calls: Arc::clone(&calls),
        })
    };
    let mut app = start(vec![
        Box::new(MetasModule::new()),
        recorded(Box::new(IdentitiesModule::new())),
        Box::new(ClassificationsModule::new()),
        Box::new(MaintainersModule::new()),
        recorded(Box::new(ExchangesModule::new())),
        Box::new(OrdersModule::new()),
    ]);

    let order_id = make(&mut app, 10, 2).into_result()?.ok_or_else(|| anyhow::anyhow!("no order ID"))?;
    assert_eq!(*calls.lock().unwrap(), vec!["verify", "custody"]);
    calls.lock().unwrap().clear();

    let before = app.state_hash();
    let response = app.deliver(&CancelMessage {
        from: Address::new("bob-addr"),
        order_id,
    });
    assert!(matches!(response.error(), Some(ModuleError::NotAuthorized(_))));
    assert_eq!(*calls.lock().unwrap(), vec!["verify"]);
    assert_eq!(app.state_hash(), before);
    Ok(())
}
