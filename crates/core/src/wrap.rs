//! Category wrappers.
//!
//! Each wrapper turns an operation body into the registry entry the host executes: the
//! entry traces the call, stores the host supplied state on the receiver, applies the body
//! and, for mutations and actions, records the result in the module's result cache.
//!
//! Entries are typed on the declaring module `M` and receive the instance as `&Arc<M>`.
//! They can be lifted onto a derived module through a field projection and bound to a
//! fixed receiver, which yields the `Bound*` functions of a [`ModuleDescriptor`].
//!
//! [`ModuleDescriptor`]: crate::host::ModuleDescriptor

use crate::base::StoreModule;
use crate::category::Category;
use crate::error::ModuleError;
use crate::host::{ActionContext, BoundAction, BoundGetter, BoundMutation, GetterValue, SharedState};
use crate::value::{Args, Value};
use std::fmt;
use std::sync::Arc;

type Body<M> = Arc<dyn Fn(&M, Args) -> Result<Value, ModuleError> + Send + Sync>;
type GetterFn<M> = dyn Fn(&Arc<M>, &SharedState) -> Result<GetterValue, ModuleError> + Send + Sync;
type MutationFn<M> = dyn Fn(&Arc<M>, &SharedState, Args) -> Result<(), ModuleError> + Send + Sync;
type ActionFn<M> = dyn Fn(&Arc<M>, ActionContext, Args) -> Result<Value, ModuleError> + Send + Sync;

/// A registry entry that can be bound to a receiver.
pub trait Entry<M>: Clone {
    /// The receiver-free function handed to the host.
    type Bound;

    /// Fixes `receiver` as the instance every call of the bound function runs against.
    fn bind(&self, receiver: Arc<M>) -> Self::Bound;
}

/// Registry entry of a getter.
pub struct GetterEntry<M>(Arc<GetterFn<M>>);

impl<M: StoreModule> GetterEntry<M> {
    /// Wraps an accessor-style read: the entry evaluates `body` right away and hands the
    /// value to the host.
    pub fn accessor<F>(operation: &'static str, body: F) -> Self
    where
        F: Fn(&M) -> Result<Value, ModuleError> + Send + Sync + 'static,
    {
        Self(Arc::new(move |this: &Arc<M>, state: &SharedState| {
            let base = this.base();
            base.set_state(state)?;
            base.tracer().trace(Category::Getter, base.name(), operation, &[]);
            body(&**this).map(GetterValue::Value)
        }))
    }

    /// Wraps a callable-style read: the entry returns a function the host calls later with
    /// the forwarded arguments. Each of those calls is traced.
    pub fn callable<F>(operation: &'static str, body: F) -> Self
    where
        F: Fn(&M, Args) -> Result<Value, ModuleError> + Send + Sync + 'static,
    {
        let body: Body<M> = Arc::new(body);
        Self(Arc::new(move |this: &Arc<M>, state: &SharedState| {
            this.base().set_state(state)?;
            let this = Arc::clone(this);
            let body = Arc::clone(&body);
            Ok(GetterValue::Callable(Arc::new(move |args: Args| {
                let base = this.base();
                base.tracer().trace(Category::Getter, base.name(), operation, &args);
                body(&*this, args)
            })))
        }))
    }

    /// Re-targets the entry at a module `C` that holds this module as `Arc<M>`.
    #[must_use]
    pub fn lift<C: StoreModule>(&self, project: fn(&C) -> &Arc<M>) -> GetterEntry<C> {
        let inner = Arc::clone(&self.0);
        GetterEntry(Arc::new(move |this: &Arc<C>, state: &SharedState| inner(project(&**this), state)))
    }

    /// Runs the entry against an explicit receiver.
    ///
    /// # Errors
    /// Propagates state and body failures.
    pub fn invoke(&self, this: &Arc<M>, state: &SharedState) -> Result<GetterValue, ModuleError> {
        (self.0)(this, state)
    }
}

impl<M: StoreModule> Entry<M> for GetterEntry<M> {
    type Bound = BoundGetter;

    fn bind(&self, receiver: Arc<M>) -> BoundGetter {
        let inner = Arc::clone(&self.0);
        BoundGetter::new(move |state: &SharedState| inner(&receiver, state))
    }
}

/// Registry entry of a mutation.
pub struct MutationEntry<M>(Arc<MutationFn<M>>);

impl<M: StoreModule> MutationEntry<M> {
    pub fn new<F>(operation: &'static str, body: F) -> Self
    where
        F: Fn(&M, Args) -> Result<Value, ModuleError> + Send + Sync + 'static,
    {
        Self(Arc::new(move |this: &Arc<M>, state: &SharedState, args: Args| {
            let base = this.base();
            base.tracer().trace(Category::Mutation, base.name(), operation, &args);
            base.set_state(state)?;
            let result = body(&**this, args)?;
            base.record(operation, result);
            Ok(())
        }))
    }

    #[must_use]
    pub fn lift<C: StoreModule>(&self, project: fn(&C) -> &Arc<M>) -> MutationEntry<C> {
        let inner = Arc::clone(&self.0);
        MutationEntry(Arc::new(move |this: &Arc<C>, state: &SharedState, args: Args| {
            inner(project(&**this), state, args)
        }))
    }

    /// Runs the entry against an explicit receiver.
    ///
    /// # Errors
    /// Propagates state and body failures.
    pub fn invoke(&self, this: &Arc<M>, state: &SharedState, args: Args) -> Result<(), ModuleError> {
        (self.0)(this, state, args)
    }
}

impl<M: StoreModule> Entry<M> for MutationEntry<M> {
    type Bound = BoundMutation;

    fn bind(&self, receiver: Arc<M>) -> BoundMutation {
        let inner = Arc::clone(&self.0);
        BoundMutation::new(move |state: &SharedState, args: Args| inner(&receiver, state, args))
    }
}

/// Registry entry of an action.
pub struct ActionEntry<M>(Arc<ActionFn<M>>);

impl<M: StoreModule> ActionEntry<M> {
    pub fn new<F>(operation: &'static str, body: F) -> Self
    where
        F: Fn(&M, Args) -> Result<Value, ModuleError> + Send + Sync + 'static,
    {
        Self(Arc::new(move |this: &Arc<M>, context: ActionContext, args: Args| {
            let base = this.base();
            base.tracer().trace(Category::Action, base.name(), operation, &args);
            base.set_state(&context.state)?;
            let result = body(&**this, args)?;
            base.record(operation, result.clone());
            Ok(result)
        }))
    }

    #[must_use]
    pub fn lift<C: StoreModule>(&self, project: fn(&C) -> &Arc<M>) -> ActionEntry<C> {
        let inner = Arc::clone(&self.0);
        ActionEntry(Arc::new(move |this: &Arc<C>, context: ActionContext, args: Args| {
            inner(project(&**this), context, args)
        }))
    }

    /// Runs the entry against an explicit receiver.
    ///
    /// # Errors
    /// Propagates state and body failures.
    pub fn invoke(
        &self,
        this: &Arc<M>,
        context: ActionContext,
        args: Args,
    ) -> Result<Value, ModuleError> {
        (self.0)(this, context, args)
    }
}

impl<M: StoreModule> Entry<M> for ActionEntry<M> {
    type Bound = BoundAction;

    fn bind(&self, receiver: Arc<M>) -> BoundAction {
        let inner = Arc::clone(&self.0);
        BoundAction::new(move |context: ActionContext, args: Args| inner(&receiver, context, args))
    }
}

macro_rules! entry_common {
    ($($entry:ident),*) => {$(
        impl<M> Clone for $entry<M> {
            fn clone(&self) -> Self {
                Self(Arc::clone(&self.0))
            }
        }

        impl<M> fmt::Debug for $entry<M> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($entry), "(..)"))
            }
        }

        impl<M> $entry<M> {
            /// Whether two handles point at the same wrapped function.
            #[must_use]
            pub fn same_as(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0)
            }
        }
    )*};
}

entry_common!(GetterEntry, MutationEntry, ActionEntry);
