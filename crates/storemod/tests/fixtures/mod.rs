#![allow(dead_code)]

use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use storemod::prelude::*;
use storemod::engine::{GetterValue, ModuleDescriptor};

pub const MODULE_NAME: &str = "moduleName";
pub const INITIAL_TOKEN: &str = "initialToken";

/// What the spy saw of one `register_module` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: String,
    pub namespaced: bool,
    pub getters: Vec<&'static str>,
    pub mutations: Vec<&'static str>,
    pub actions: Vec<&'static str>,
}

fn sorted_keys<F>(registry: &storemod::engine::Registry<F>) -> Vec<&'static str> {
    let mut keys: Vec<_> = registry.keys().copied().collect();
    keys.sort_unstable();
    keys
}

/// Records every host call before forwarding it to a real [`Store`].
///
/// With a canned read value, getter lookups are answered by the spy and never reach the store.
#[derive(Default)]
pub struct SpyHost {
    inner: Store,
    canned: Mutex<Option<Value>>,
    pub registrations: Mutex<Vec<Registration>>,
    pub commits: Mutex<Vec<(String, Args, Option<CommitOptions>)>>,
    pub dispatches: Mutex<Vec<(String, Args)>>,
    pub reads: Mutex<Vec<String>>,
}

impl SpyHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn store(&self) -> &Store {
        &self.inner
    }

    pub fn answer_reads_with(&self, value: Value) {
        *self.canned.lock() = Some(value);
    }
}

impl Host for SpyHost {
    fn register_module(&self, name: &str, descriptor: ModuleDescriptor) -> Result<(), ModuleError> {
        self.registrations.lock().push(Registration {
            name: name.to_owned(),
            namespaced: descriptor.namespaced,
            getters: sorted_keys(&descriptor.getters),
            mutations: sorted_keys(&descriptor.mutations),
            actions: sorted_keys(&descriptor.actions),
        });
        self.inner.register_module(name, descriptor)
    }

    fn commit(&self, key: &str, args: Args, options: Option<CommitOptions>) -> Result<(), ModuleError> {
        self.commits.lock().push((key.to_owned(), args.clone(), options));
        self.inner.commit(key, args, options)
    }

    fn dispatch(&self, key: &str, args: Args) -> Result<(), ModuleError> {
        self.dispatches.lock().push((key.to_owned(), args.clone()));
        self.inner.dispatch(key, args)
    }

    fn getter(&self, key: &str) -> Result<GetterValue, ModuleError> {
        self.reads.lock().push(key.to_owned());
        let canned = self.canned.lock().clone();
        match canned {
            Some(value) => Ok(GetterValue::Value(value)),
            None => self.inner.getter(key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenState {
    pub token: String,
}

impl Default for TokenState {
    fn default() -> Self {
        Self { token: INITIAL_TOKEN.to_owned() }
    }
}

pub struct TokenModule {
    base: ModuleBase<TokenState>,
    /// How many times a `get_token` body ran, in this type or an override.
    pub body_reads: AtomicUsize,
}

impl TokenModule {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self::with_base(ModuleBase::new(MODULE_NAME, TokenState::default(), host))
    }

    pub fn with_base(base: ModuleBase<TokenState>) -> Self {
        Self { base, body_reads: AtomicUsize::new(0) }
    }

    pub fn body_reads(&self) -> usize {
        self.body_reads.load(Ordering::SeqCst)
    }
}

#[store_module(state = TokenState)]
impl TokenModule {
    #[getter]
    pub fn get_token(&self) -> String {
        self.body_reads.fetch_add(1, Ordering::SeqCst);
        self.base.state().token.clone()
    }

    /// Same value as `get_token`, registered under a different name.
    #[getter(name = "token")]
    pub fn current_token(&self) -> String {
        self.base.state().token.clone()
    }

    #[getter]
    pub fn has_prefix(&self, prefix: String) -> bool {
        self.base.state().token.starts_with(&prefix)
    }

    #[mutation]
    pub fn set_token(&self, token: String) -> String {
        self.base.state_mut().token.clone_from(&token);
        token
    }

    #[mutation(silent, name = "restore")]
    pub fn restore_token(&self, token: Option<String>) {
        self.base.state_mut().token = token.unwrap_or_else(|| INITIAL_TOKEN.to_owned());
    }

    #[action]
    pub fn set_special_token(&self, token: String) -> Result<(), ModuleError> {
        self.set_token(token)?;
        Ok(())
    }
}

/// Overrides both token operations and adds `clear`.
pub struct SecureTokenModule {
    pub parent: Arc<TokenModule>,
}

impl SecureTokenModule {
    pub fn new(host: Arc<dyn Host>) -> Self {
        Self { parent: Arc::new(TokenModule::new(host)) }
    }
}

#[store_module(extends = TokenModule)]
impl SecureTokenModule {
    #[getter]
    pub fn get_token(&self) -> String {
        self.parent.body_reads.fetch_add(1, Ordering::SeqCst);
        format!("secure:{}", self.base().state().token)
    }

    #[mutation]
    pub fn set_token(&self, token: String) -> String {
        let token = token.to_uppercase();
        self.base().state_mut().token.clone_from(&token);
        token
    }

    #[mutation]
    pub fn clear(&self) {
        self.base().state_mut().token.clear();
    }
}
