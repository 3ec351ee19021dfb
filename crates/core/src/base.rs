//! The module base and the construction protocol.

use crate::error::ModuleError;
use crate::host::{Host, ModuleDescriptor, SharedState};
use crate::table::{Lineage, OperationTable, rebind};
use crate::trace::Tracer;
use crate::value::{Args, CommitOptions, Value, decode};
use fxhash::FxHashMap;
use parking_lot::{ArcRwLockReadGuard, ArcRwLockWriteGuard, Mutex, RawRwLock, RwLock};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub type StateReadGuard<S> = ArcRwLockReadGuard<RawRwLock, S>;
pub type StateWriteGuard<S> = ArcRwLockWriteGuard<RawRwLock, S>;

/// Per-instance plumbing every store module embeds.
///
/// Holds the module name, the state slot the host refreshes before each entry runs, the host
/// handle the redirects call into, the tracer and the result cache.
pub struct ModuleBase<S> {
    name: String,
    current: Mutex<Arc<RwLock<S>>>,
    host: Arc<dyn Host>,
    tracer: Tracer,
    results: Mutex<FxHashMap<&'static str, Value>>,
}

impl<S: Send + Sync + 'static> ModuleBase<S> {
    /// Creates a base with tracing disabled. Nothing is registered until the module is installed.
    pub fn new(name: impl Into<String>, state: S, host: Arc<dyn Host>) -> Self {
        Self {
            name: name.into(),
            current: Mutex::new(Arc::new(RwLock::new(state))),
            host,
            tracer: Tracer::disabled(),
            results: Mutex::new(FxHashMap::default()),
        }
    }

    #[must_use]
    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = tracer;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    #[must_use]
    pub const fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// The host key of `operation`: `<module>/<operation>`.
    #[must_use]
    pub fn key(&self, operation: &str) -> String {
        format!("{}/{operation}", self.name)
    }

    /// Read access to the current state.
    ///
    /// Do not hold the guard across a redirect call; the entry behind it may lock the same state.
    #[must_use]
    pub fn state(&self) -> StateReadGuard<S> {
        self.current_state().read_arc()
    }

    /// Write access to the current state. Meant for mutation bodies.
    #[must_use]
    pub fn state_mut(&self) -> StateWriteGuard<S> {
        self.current_state().write_arc()
    }

    /// The current state, type-erased the way hosts store it.
    #[must_use]
    pub fn shared_state(&self) -> SharedState {
        self.current_state()
    }

    /// Replaces the current state with the one supplied by the host.
    ///
    /// # Errors
    /// Returns [`ModuleError::StateMismatch`] if `state` is not an `RwLock<S>`.
    pub fn set_state(&self, state: &SharedState) -> Result<(), ModuleError> {
        let typed = Arc::clone(state).downcast::<RwLock<S>>().map_err(|_| ModuleError::StateMismatch {
            message: format!(
                "module `{}` expects state of type `{}`",
                self.name,
                std::any::type_name::<S>()
            )
            .into(),
            context: None,
        })?;
        *self.current.lock() = typed;
        Ok(())
    }

    /// Stores the result of the latest call of `operation`.
    pub fn record(&self, operation: &'static str, value: Value) {
        self.results.lock().insert(operation, value);
    }

    /// The result of the latest call of `operation`, `null` if it never ran.
    #[must_use]
    pub fn last_result(&self, operation: &str) -> Value {
        self.results.lock().get(operation).cloned().unwrap_or(Value::Null)
    }

    /// Read redirect: resolves `operation` through the host's read surface.
    ///
    /// # Errors
    /// Propagates host errors and fails with [`ModuleError::Serialization`] if the value does
    /// not decode as `T`.
    pub fn read<T: DeserializeOwned>(&self, operation: &str, args: Args) -> Result<T, ModuleError> {
        let value = self.host.getter(&self.key(operation))?.resolve(args)?;
        decode(value)
    }

    /// Mutation redirect: commits `operation` and returns the latest recorded result.
    ///
    /// # Errors
    /// Propagates host errors and fails with [`ModuleError::Serialization`] if the cached
    /// result does not decode as `T`.
    pub fn commit<T: DeserializeOwned>(
        &self,
        operation: &str,
        args: Args,
        options: Option<CommitOptions>,
    ) -> Result<T, ModuleError> {
        self.host.commit(&self.key(operation), args, options)?;
        decode(self.last_result(operation))
    }

    /// Action redirect: dispatches `operation` and returns the latest recorded result.
    ///
    /// # Errors
    /// Propagates host errors and fails with [`ModuleError::Serialization`] if the cached
    /// result does not decode as `T`.
    pub fn dispatch<T: DeserializeOwned>(&self, operation: &str, args: Args) -> Result<T, ModuleError> {
        self.host.dispatch(&self.key(operation), args)?;
        decode(self.last_result(operation))
    }

    fn current_state(&self) -> Arc<RwLock<S>> {
        Arc::clone(&*self.current.lock())
    }
}

impl<S> fmt::Debug for ModuleBase<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleBase")
            .field("name", &self.name)
            .field("tracer", &self.tracer)
            .finish_non_exhaustive()
    }
}

/// A state module.
///
/// Usually implemented by `#[store_module]`, which generates [`StoreModule::operations`] from
/// the marked methods and, for derived modules, [`StoreModule::lineage`].
pub trait StoreModule: Send + Sync + Sized + 'static {
    type State: Send + Sync + 'static;

    fn base(&self) -> &ModuleBase<Self::State>;

    /// The operations this type declares itself.
    ///
    /// Every call assembles fresh entries, so [`crate::MutationEntry::same_as`] and friends only
    /// relate entries taken from one returned table.
    ///
    /// # Errors
    /// Returns [`ModuleError::Configuration`] for a name declared twice in one category.
    fn operations() -> Result<OperationTable<Self>, ModuleError>;

    /// The full ownership chain, most-derived first.
    ///
    /// # Errors
    /// Propagates table construction errors of any type in the chain.
    fn lineage() -> Result<Lineage<Self>, ModuleError> {
        Ok(Lineage::root(Self::operations()?))
    }

    /// Registers the module with its host. See [`install`].
    ///
    /// # Errors
    /// See [`install`].
    fn install(self) -> Result<Arc<Self>, ModuleError> {
        install(self)
    }
}

/// Builds the module descriptor and hands it to the host's `register_module`, once.
///
/// The descriptor is complete before the host is called; a table error aborts with nothing
/// registered.
///
/// # Errors
/// Returns table construction errors and whatever the host's registration returns.
pub fn install<M: StoreModule>(module: M) -> Result<Arc<M>, ModuleError> {
    let lineage = M::lineage()?;
    let module = Arc::new(module);
    let base = module.base();

    let descriptor = ModuleDescriptor {
        namespaced: true,
        state: base.shared_state(),
        getters: rebind(&lineage.getters(), &module),
        mutations: rebind(&lineage.mutations(), &module),
        actions: rebind(&lineage.actions(), &module),
    };
    debug!(
        module = base.name(),
        chain = ?lineage.owners(),
        getters = descriptor.getters.len(),
        mutations = descriptor.mutations.len(),
        actions = descriptor.actions.len(),
        "Registering store module"
    );

    base.host().register_module(base.name(), descriptor)?;
    Ok(module)
}
