use crate::config::StoreConfig;
use fxhash::FxHashMap;
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use storemod_core::{
    ActionContext, Args, Category, CommitOptions, GetterValue, Host, ModuleDescriptor, ModuleError,
    SharedState, Tracer, TracingSink, Value,
};
use tracing::{debug, trace, warn};

/// A committed mutation, as seen by [`Store::subscribe`] callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRecord {
    pub key: String,
    pub args: Args,
}

/// A dispatched action, as seen by [`Store::subscribe_action`] callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionRecord {
    pub key: String,
    pub args: Args,
}

/// Handle returned by the subscribe methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Hook<R> = Arc<dyn Fn(&R) + Send + Sync>;

struct Hooks<R> {
    entries: Mutex<Vec<(SubscriptionId, Hook<R>)>>,
}

impl<R> Default for Hooks<R> {
    fn default() -> Self {
        Self { entries: Mutex::new(Vec::new()) }
    }
}

impl<R> Hooks<R> {
    fn add(&self, id: SubscriptionId, hook: Hook<R>) {
        self.entries.lock().push((id, hook));
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|(existing, _)| *existing != id);
        entries.len() != before
    }

    /// Calls every hook with no lock held, so hooks may subscribe or commit themselves.
    fn notify(&self, record: &R) {
        let hooks: Vec<Hook<R>> = self.entries.lock().iter().map(|(_, hook)| Arc::clone(hook)).collect();
        for hook in hooks {
            hook(record);
        }
    }
}

/// In-memory host for store modules.
///
/// Keeps one descriptor per module name and routes `<module>/<operation>` keys to the bound
/// entries. Internal locks are released before an entry runs, so entries may call back into the
/// store (an action committing mutations, for instance).
///
/// Installed modules hold the store and the store holds their descriptors; call
/// [`Store::unregister_module`] to release a module.
pub struct Store {
    config: StoreConfig,
    tracer: Tracer,
    modules: RwLock<FxHashMap<String, Arc<ModuleDescriptor>>>,
    mutation_hooks: Hooks<MutationRecord>,
    action_hooks: Hooks<ActionRecord>,
    next_subscription: AtomicU64,
}

impl Store {
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        let tracer = Tracer::new(config.debug, Arc::new(TracingSink));
        Self {
            config,
            tracer,
            modules: RwLock::new(FxHashMap::default()),
            mutation_hooks: Hooks::default(),
            action_hooks: Hooks::default(),
            next_subscription: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// A tracer for modules installed into this store, enabled when `debug` is set.
    #[must_use]
    pub fn tracer(&self) -> Tracer {
        self.tracer.clone()
    }

    #[must_use]
    pub fn has_module(&self, name: &str) -> bool {
        self.modules.read().contains_key(name)
    }

    /// Registered module names, sorted.
    #[must_use]
    pub fn module_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.modules.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Removes a module and drops its descriptor. Returns whether it was registered.
    pub fn unregister_module(&self, name: &str) -> bool {
        let removed = self.modules.write().remove(name).is_some();
        if removed {
            debug!(module = name, "Module unregistered");
        }
        removed
    }

    /// Clones the current state of module `name`.
    ///
    /// # Errors
    /// Returns [`ModuleError::UnknownOperation`] for an unknown module and
    /// [`ModuleError::StateMismatch`] if its state is not an `S`.
    pub fn snapshot<S>(&self, name: &str) -> Result<S, ModuleError>
    where
        S: Clone + Send + Sync + 'static,
    {
        let state = self.descriptor(name).map(|d| Arc::clone(&d.state)).ok_or_else(|| {
            ModuleError::UnknownOperation {
                message: format!("no module registered as `{name}`").into(),
                context: None,
            }
        })?;
        let typed = state.downcast::<RwLock<S>>().map_err(|_| ModuleError::StateMismatch {
            message: format!("module `{name}` does not hold a `{}`", std::any::type_name::<S>()).into(),
            context: None,
        })?;
        let snapshot = typed.read().clone();
        Ok(snapshot)
    }

    /// Calls `hook` after every mutation committed without the `silent` option.
    pub fn subscribe(&self, hook: impl Fn(&MutationRecord) + Send + Sync + 'static) -> SubscriptionId {
        let id = self.next_id();
        self.mutation_hooks.add(id, Arc::new(hook));
        id
    }

    /// Calls `hook` before every dispatched action.
    pub fn subscribe_action(&self, hook: impl Fn(&ActionRecord) + Send + Sync + 'static) -> SubscriptionId {
        let id = self.next_id();
        self.action_hooks.add(id, Arc::new(hook));
        id
    }

    /// Removes a subscription. Returns whether it existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.mutation_hooks.remove(id) || self.action_hooks.remove(id)
    }

    fn next_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed))
    }

    fn descriptor(&self, name: &str) -> Option<Arc<ModuleDescriptor>> {
        self.modules.read().get(name).cloned()
    }

    /// Splits `key` at its last `/` and looks up the module; module names may contain `/`.
    fn route<'k>(&self, key: &'k str) -> Option<(Arc<ModuleDescriptor>, &'k str)> {
        let (module, operation) = key.rsplit_once('/')?;
        self.descriptor(module).map(|descriptor| (descriptor, operation))
    }

    fn unknown(&self, category: Category, key: &str) -> Result<(), ModuleError> {
        if self.config.strict {
            return Err(ModuleError::UnknownOperation {
                message: format!("no {} registered at `{key}`", category.noun()).into(),
                context: None,
            });
        }
        warn!(key, category = %category, "Ignoring call to an unknown operation");
        Ok(())
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl Host for Store {
    fn register_module(&self, name: &str, descriptor: ModuleDescriptor) -> Result<(), ModuleError> {
        if name.is_empty() {
            return Err(ModuleError::Registration {
                message: "module name cannot be empty".into(),
                context: None,
            });
        }

        let mut modules = self.modules.write();
        if modules.contains_key(name) {
            return Err(ModuleError::Registration {
                message: format!("module `{name}` is already registered").into(),
                context: None,
            });
        }
        debug!(
            module = name,
            getters = descriptor.getters.len(),
            mutations = descriptor.mutations.len(),
            actions = descriptor.actions.len(),
            "Module registered"
        );
        modules.insert(name.to_owned(), Arc::new(descriptor));
        Ok(())
    }

    fn commit(&self, key: &str, args: Args, options: Option<CommitOptions>) -> Result<(), ModuleError> {
        let Some((descriptor, operation)) = self.route(key) else {
            return self.unknown(Category::Mutation, key);
        };
        let Some(mutation) = descriptor.mutations.get(operation) else {
            return self.unknown(Category::Mutation, key);
        };

        trace!(key, ?options, "Committing mutation");
        let silent = options.is_some_and(|o| o.silent);
        if silent {
            return mutation.call(&descriptor.state, args);
        }
        mutation.call(&descriptor.state, args.clone())?;
        self.mutation_hooks.notify(&MutationRecord { key: key.to_owned(), args });
        Ok(())
    }

    fn dispatch(&self, key: &str, args: Args) -> Result<(), ModuleError> {
        let Some((descriptor, operation)) = self.route(key) else {
            return self.unknown(Category::Action, key);
        };
        let Some(action) = descriptor.actions.get(operation) else {
            return self.unknown(Category::Action, key);
        };

        trace!(key, "Dispatching action");
        self.action_hooks.notify(&ActionRecord { key: key.to_owned(), args: args.clone() });
        let context = ActionContext { state: SharedState::clone(&descriptor.state) };
        action.call(context, args).map(drop)
    }

    fn getter(&self, key: &str) -> Result<GetterValue, ModuleError> {
        let found = self
            .route(key)
            .and_then(|(descriptor, operation)| {
                descriptor.getters.get(operation).cloned().map(|getter| (getter, descriptor))
            });
        let Some((getter, descriptor)) = found else {
            self.unknown(Category::Getter, key)?;
            return Ok(GetterValue::Value(Value::Null));
        };

        trace!(key, "Reading getter");
        getter.call(&descriptor.state)
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .field("modules", &self.module_names())
            .finish_non_exhaustive()
    }
}
