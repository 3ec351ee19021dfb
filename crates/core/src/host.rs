//! The contract between modules and the state-container host.
//!
//! A host owns module state, keeps the registered descriptors and routes
//! `commit`/`dispatch`/read calls to the bound entries of those descriptors.

use crate::error::ModuleError;
use crate::table::Registry;
use crate::value::{Args, CommitOptions, Value};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased live state of one module, as stored by the host.
///
/// Behind the erasure sits an `Arc<parking_lot::RwLock<S>>` for the module's state type `S`.
pub type SharedState = Arc<dyn Any + Send + Sync>;

/// A read operation that takes arguments, handed out by the host's read surface.
pub type ReadFn = Arc<dyn Fn(Args) -> Result<Value, ModuleError> + Send + Sync>;

/// What the host's read surface holds for a key.
#[derive(Clone)]
pub enum GetterValue {
    /// Accessor-style read: the computed value.
    Value(Value),
    /// Callable-style read: a function applied to the forwarded arguments.
    Callable(ReadFn),
}

impl GetterValue {
    /// Resolves the read with `args`; arguments are only used by callable reads.
    ///
    /// # Errors
    /// Propagates the error of a callable read.
    pub fn resolve(self, args: Args) -> Result<Value, ModuleError> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Callable(read) => read(args),
        }
    }
}

impl fmt::Debug for GetterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Callable(_) => f.write_str("Callable(..)"),
        }
    }
}

/// State carrier handed to action entries.
#[derive(Clone)]
pub struct ActionContext {
    pub state: SharedState,
}

impl fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext").finish_non_exhaustive()
    }
}

macro_rules! bound_fn {
    ($(#[$meta:meta])* $name:ident, ($($arg:ident: $ty:ty),*) -> $out:ty) => {
        $(#[$meta])*
        #[derive(Clone)]
        pub struct $name(Arc<dyn Fn($($ty),*) -> Result<$out, ModuleError> + Send + Sync>);

        impl $name {
            pub fn new(f: impl Fn($($ty),*) -> Result<$out, ModuleError> + Send + Sync + 'static) -> Self {
                Self(Arc::new(f))
            }

            /// Invokes the entry; every call runs the underlying function afresh.
            ///
            /// # Errors
            /// Propagates the error of the entry.
            pub fn call(&self, $($arg: $ty),*) -> Result<$out, ModuleError> {
                (self.0)($($arg),*)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($name), "(..)"))
            }
        }
    };
}

bound_fn!(
    /// A getter entry bound to its module instance.
    BoundGetter, (state: &SharedState) -> GetterValue
);
bound_fn!(
    /// A mutation entry bound to its module instance.
    BoundMutation, (state: &SharedState, args: Args) -> ()
);
bound_fn!(
    /// An action entry bound to its module instance.
    BoundAction, (context: ActionContext, args: Args) -> Value
);

/// Everything a host needs to serve one module.
#[derive(Debug, Clone)]
pub struct ModuleDescriptor {
    /// Always `true`: operations are addressed as `<module>/<operation>`.
    pub namespaced: bool,
    pub state: SharedState,
    pub getters: Registry<BoundGetter>,
    pub mutations: Registry<BoundMutation>,
    pub actions: Registry<BoundAction>,
}

/// The state-container host.
///
/// Keys have the form `<module>/<operation>`.
pub trait Host: Send + Sync {
    /// Registers a module under `name`. Called exactly once per module instance.
    ///
    /// # Errors
    /// Host specific, e.g. [`ModuleError::Registration`] for a taken name.
    fn register_module(&self, name: &str, descriptor: ModuleDescriptor) -> Result<(), ModuleError>;

    /// Synchronously applies the mutation at `key`.
    ///
    /// # Errors
    /// Host specific, plus whatever the mutation entry returns.
    fn commit(&self, key: &str, args: Args, options: Option<CommitOptions>) -> Result<(), ModuleError>;

    /// Dispatches the action at `key`.
    ///
    /// # Errors
    /// Host specific, plus whatever the action entry returns.
    fn dispatch(&self, key: &str, args: Args) -> Result<(), ModuleError>;

    /// Looks up the read surface at `key`.
    ///
    /// # Errors
    /// Host specific, plus whatever the getter entry returns.
    fn getter(&self, key: &str) -> Result<GetterValue, ModuleError>;
}
