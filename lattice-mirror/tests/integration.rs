//! Integration Tests for Store Bindings
//!
//! These tests drive bindings through a reference store and check the
//! mirror after each notification.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::json;

use lattice_mirror::snapshot::build_snapshot;
use lattice_mirror::store::{Listener, ListenerId};
use lattice_mirror::{
    BindError, Binding, Dependency, EventPayload, MemoryStore, MirrorConfig, MultiBinding, Node,
    PathHandle, Store, StoreDescriptor, StoreGroup, StoreId, StoreRegistry, Topic,
};

/// A store whose notifications are driven by the test.
struct ScriptedStore {
    id: StoreId,
    state: Node,
    listeners: Mutex<Vec<(Topic, Listener)>>,
}

impl ScriptedStore {
    fn new(id: &str, state: serde_json::Value) -> Self {
        Self {
            id: StoreId::from(id),
            state: Node::from_json(state),
            listeners: Mutex::new(Vec::new()),
        }
    }

    fn emit(&self, topic: &Topic, payload: &EventPayload) {
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .iter()
            .filter(|(t, _)| t == topic)
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener.notify(payload);
        }
    }
}

impl Store for ScriptedStore {
    fn identity(&self) -> Option<StoreId> {
        Some(self.id.clone())
    }

    fn state(&self) -> Node {
        self.state.clone()
    }

    fn subscribe(&self, topic: &Topic, listener: Listener) {
        self.listeners.lock().push((topic.clone(), listener));
    }

    fn unsubscribe(&self, topic: &Topic, listener: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(t, l)| !(t == topic && l.id() == listener));
        listeners.len() != before
    }
}

fn app_store() -> (Arc<MemoryStore>, StoreRegistry) {
    let store = Arc::new(MemoryStore::new(
        "app",
        json!({"count": 1, "user": {"name": "Ann", "age": 9}}),
    ));
    let registry = StoreRegistry::new();
    registry.register(store.clone()).unwrap();
    (store, registry)
}

/// Initial mirror takes the shape of the declared paths.
#[test]
fn scoped_dependencies_scenario() {
    let (store, registry) = app_store();
    let deps: Vec<Dependency> = vec!["count".into(), vec!["user", "name"].into()];
    let binding = Binding::mount("app", &deps, &registry, &MirrorConfig::default()).unwrap();

    assert_eq!(binding.state(), json!({"count": 1, "user": {"name": "Ann"}}));

    store.set_path(vec!["user", "name"], Node::from_json("Bea"));
    assert_eq!(binding.state(), json!({"count": 1, "user": {"name": "Bea"}}));
}

/// A wildcard binding mirrors the full state and is replaced on update.
#[test]
fn wildcard_scenario() {
    let (store, registry) = app_store();
    let binding = Binding::mount("app", &["*".into()], &registry, &MirrorConfig::default()).unwrap();
    assert_eq!(binding.state(), json!({"count": 1, "user": {"name": "Ann", "age": 9}}));

    let next = json!({"count": 2, "user": {"name": "Ann", "age": 9}});
    store.set_state(next.clone());
    assert_eq!(binding.state(), next);
}

/// Every declared leaf matches the store at snapshot time.
#[test]
fn snapshot_leaves_match_store_reads() {
    let (store, registry) = app_store();
    let deps: Vec<Dependency> = vec![
        "count".into(),
        vec!["user", "age"].into(),
        PathHandle::root().child("user").child("name").into(),
    ];
    let binding = Binding::mount("app", &deps, &registry, &MirrorConfig::default()).unwrap();
    let mirror = binding.state();

    for path in [vec!["count"], vec!["user", "age"], vec!["user", "name"]] {
        let path: Vec<String> = path.into_iter().map(String::from).collect();
        assert_eq!(mirror.get_path(&path), store.read_path(&path).as_ref());
    }
}

/// Updating one top-level key keeps every other key's identity.
#[test]
fn single_key_update_preserves_other_identities() {
    let (store, registry) = app_store();
    let binding = Binding::mount(
        "app",
        &["count".into(), "user".into()],
        &registry,
        &MirrorConfig::default(),
    )
    .unwrap();
    let before = binding.state();

    store.set_path(vec!["count"], Node::from_json(5));
    let after = binding.state();

    assert_eq!(after.get("count").unwrap(), &json!(5));
    assert!(after.get("user").unwrap().ptr_eq(before.get("user").unwrap()));
}

/// Updating a nested key keeps unrelated subtrees' identity.
#[test]
fn nested_update_preserves_unrelated_identities() {
    let store = Arc::new(MemoryStore::new(
        "app",
        json!({"count": 1, "user": {"name": "Ann", "age": 9}, "prefs": {"theme": "dark"}}),
    ));
    let binding = Binding::mount(
        store.clone(),
        &[
            vec!["user", "name"].into(),
            vec!["user", "age"].into(),
            "prefs".into(),
        ],
        &StoreRegistry::new(),
        &MirrorConfig::default(),
    )
    .unwrap();
    let before = binding.state();

    store.set_path(vec!["user", "name"], Node::from_json("Bea"));
    let after = binding.state();

    assert_eq!(after, json!({"user": {"name": "Bea", "age": 9}, "prefs": {"theme": "dark"}}));
    assert!(after.get("prefs").unwrap().ptr_eq(before.get("prefs").unwrap()));
    assert!(!after.get("user").unwrap().ptr_eq(before.get("user").unwrap()));
}

/// Teardown removes every listener and can be repeated.
#[test]
fn teardown_leaves_no_listeners() {
    let (store, registry) = app_store();
    let mut binding = Binding::mount(
        "app",
        &["*".into(), "count".into(), vec!["user", "name"].into(), vec!["user", "name"].into()],
        &registry,
        &MirrorConfig::default(),
    )
    .unwrap();

    assert_eq!(store.total_listeners(), 3);
    assert_eq!(binding.unmount(), 3);
    assert_eq!(store.total_listeners(), 0);
    assert_eq!(binding.unmount(), 0);
}

/// Two bindings on two stores never remove each other's listener.
#[test]
fn bindings_on_distinct_stores_are_independent() {
    let alpha = Arc::new(MemoryStore::new("alpha", json!({"count": 1})));
    let beta = Arc::new(MemoryStore::new("beta", json!({"count": 1})));
    let config = MirrorConfig::default();
    let registry = StoreRegistry::new();

    let mut first = Binding::mount(alpha.clone(), &["count".into()], &registry, &config).unwrap();
    let second = Binding::mount(beta.clone(), &["count".into()], &registry, &config).unwrap();

    first.unmount();
    assert_eq!(alpha.total_listeners(), 0);
    assert_eq!(beta.listener_count(&Topic::Named("on_count_update".into())), 1);

    beta.set_path(vec!["count"], Node::from_json(2));
    assert_eq!(second.state(), json!({"count": 2}));
}

/// Setup errors surface before anything is attached.
#[test]
fn setup_errors() {
    let registry = StoreRegistry::new();
    let config = MirrorConfig::default();

    let err = Binding::mount("missing", &["count".into()], &registry, &config).err().unwrap();
    assert_eq!(err, BindError::StoreNotFound { id: StoreId::from("missing") });

    let err = Binding::mount(StoreDescriptor::Handle(None), &["count".into()], &registry, &config)
        .err()
        .unwrap();
    assert_eq!(err, BindError::MissingHandle);

    let anonymous = Arc::new(MemoryStore::anonymous(json!({"count": 1})));
    let err = Binding::mount(anonymous.clone(), &["count".into()], &registry, &config)
        .err()
        .unwrap();
    assert_eq!(err, BindError::UnidentifiableHandle);
    assert_eq!(anonymous.total_listeners(), 0);
}

/// Empty sequences are skipped instead of failing the mount.
#[test]
fn empty_dependency_is_skipped() {
    let (store, registry) = app_store();
    let binding = Binding::mount(
        "app",
        &[Vec::<String>::new().into(), "count".into()],
        &registry,
        &MirrorConfig::default(),
    )
    .unwrap();

    assert_eq!(binding.state(), json!({"count": 1}));
    assert_eq!(store.total_listeners(), 1);
}

/// A scoped event deeper than the declared structure leaves the mirror as is.
#[test]
fn untracked_depth_is_ignored() {
    let store = Arc::new(ScriptedStore::new("scripted", json!({"user": {"name": "Ann"}})));
    let binding = Binding::mount(
        store.clone(),
        &[vec!["user", "name"].into()],
        &StoreRegistry::new(),
        &MirrorConfig::default(),
    )
    .unwrap();
    let before = binding.state();

    let topic = Topic::Path(vec!["user", "name"].into());
    store.emit(&topic, &EventPayload::scoped(vec!["profile", "bio"], Node::from_json("hi")));

    assert!(binding.state().ptr_eq(&before));
    assert_eq!(binding.version(), 0);
}

/// Payloads decoded from JSON drive the same merge as in-process events.
#[test]
fn json_payloads_through_an_injected_store() {
    let store = Arc::new(ScriptedStore::new("scripted", json!({"count": 1, "user": {"name": "Ann"}})));
    let binding = Binding::mount(
        store.clone(),
        &["count".into(), vec!["user", "name"].into()],
        &StoreRegistry::new(),
        &MirrorConfig::default(),
    )
    .unwrap();

    let scoped: EventPayload =
        serde_json::from_str(r#"{"path": ["user", "name"], "value": "Cy"}"#).unwrap();
    store.emit(&Topic::Path(vec!["user", "name"].into()), &scoped);

    let shallow: EventPayload = serde_json::from_str(r#"{"path": ["count"], "value": 7}"#).unwrap();
    store.emit(&Topic::Named("on_count_update".into()), &shallow);

    assert_eq!(binding.state(), json!({"count": 7, "user": {"name": "Cy"}}));
    assert_eq!(binding.version(), 2);

    // A global payload on a scoped topic does not apply.
    store.emit(&Topic::Named("on_count_update".into()), &EventPayload::global_empty());
    assert_eq!(binding.version(), 2);
}

/// Writes above or around a declared path keep the mirror equal to a fresh
/// snapshot of the store.
#[test]
fn mirror_tracks_parent_and_whole_state_writes() {
    let (store, registry) = app_store();
    let binding = Binding::mount(
        "app",
        &["count".into(), vec!["user", "name"].into()],
        &registry,
        &MirrorConfig::default(),
    )
    .unwrap();
    let fresh = || build_snapshot(store.as_ref(), binding.dependencies());

    store.set_path(vec!["user"], Node::from_json(json!({"name": "Bea"})));
    assert_eq!(binding.state(), json!({"count": 1, "user": {"name": "Bea"}}));
    assert_eq!(binding.state(), fresh());

    store.set_state(json!({"count": 1, "user": {"name": "Zed"}}));
    assert_eq!(binding.state(), json!({"count": 1, "user": {"name": "Zed"}}));
    assert_eq!(binding.state(), fresh());

    store.set_state(json!({"user": {"name": "Zed"}}));
    assert_eq!(binding.state(), json!({"count": null, "user": {"name": "Zed"}}));
    assert_eq!(binding.state(), fresh());

    store.set_state(json!({}));
    assert_eq!(binding.state(), json!({"count": null, "user": {"name": null}}));
    assert_eq!(binding.state(), fresh());
}

/// Unchanged keys are not renotified when the whole state is replaced.
#[test]
fn whole_state_write_skips_unchanged_keys() {
    let (store, registry) = app_store();
    let binding = Binding::mount(
        "app",
        &["count".into(), vec!["user", "name"].into()],
        &registry,
        &MirrorConfig::default(),
    )
    .unwrap();

    store.set_state(json!({"count": 1, "user": {"name": "Ann", "age": 10}}));
    assert_eq!(binding.version(), 0);
}

/// The process-wide registry resolves stores by identity like any other
/// directory.
#[test]
fn mount_through_the_global_registry() {
    let store = Arc::new(MemoryStore::new("global-settings", json!({"theme": "dark"})));
    StoreRegistry::global().register(store.clone()).unwrap();

    let mut binding = Binding::mount(
        "global-settings",
        &["theme".into()],
        StoreRegistry::global(),
        &MirrorConfig::default(),
    )
    .unwrap();
    store.set_path(vec!["theme"], Node::from_json("light"));
    assert_eq!(binding.state(), json!({"theme": "light"}));

    binding.unmount();
    assert_eq!(store.total_listeners(), 0);
    StoreRegistry::global().remove(&StoreId::from("global-settings"));
}

/// A notification raised while another is being handled sees the latest mirror.
#[test]
fn reentrant_notifications_compose() {
    let (store, registry) = app_store();
    let binding = Binding::mount(
        "app",
        &["count".into(), vec!["user", "name"].into()],
        &registry,
        &MirrorConfig::default(),
    )
    .unwrap();

    let writer = store.clone();
    let fired = AtomicBool::new(false);
    binding.on_change(move |mirror| {
        if mirror.get("count") == Some(&Node::from_json(2)) && !fired.swap(true, Ordering::SeqCst) {
            writer.set_path(vec!["user", "name"], Node::from_json("Bea"));
        }
    });

    store.set_path(vec!["count"], Node::from_json(2));

    assert_eq!(binding.state(), json!({"count": 2, "user": {"name": "Bea"}}));
    assert_eq!(binding.version(), 2);
}

/// Multi-store bindings namespace internally and flatten for consumers.
#[test]
fn multi_store_binding() {
    let (app, registry) = app_store();
    let cart = Arc::new(MemoryStore::new("cart", json!({"items": 3, "total": 12})));

    let mut binding = MultiBinding::mount(
        vec![
            StoreGroup::new("app", vec!["count".into()]),
            StoreGroup::new(cart.clone(), vec!["items".into()]),
        ],
        &registry,
        &MirrorConfig::default(),
    )
    .unwrap();

    assert_eq!(binding.namespaced(), json!({"app": {"count": 1}, "cart": {"items": 3}}));

    cart.set_path(vec!["items"], Node::from_json(4));
    app.set_path(vec!["count"], Node::from_json(2));

    let props = binding.props(&Node::from_json(json!({"title": "Checkout"})));
    assert_eq!(props, json!({"title": "Checkout", "count": 2, "items": 4}));

    assert_eq!(binding.unmount(), 2);
    assert_eq!(app.total_listeners(), 0);
    assert_eq!(cart.total_listeners(), 0);
}
