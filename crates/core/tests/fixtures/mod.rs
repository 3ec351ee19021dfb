#![allow(dead_code)]

use fxhash::FxHashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use storemod_core::*;

/// Minimal host: keeps descriptors and routes calls to their bound entries.
#[derive(Default)]
pub struct MockHost {
    modules: Mutex<FxHashMap<String, ModuleDescriptor>>,
    pub registrations: Mutex<Vec<String>>,
    pub commits: Mutex<Vec<(String, Args, Option<CommitOptions>)>>,
    pub dispatches: Mutex<Vec<(String, Args)>>,
}

impl MockHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn descriptor(&self, module: &str) -> Option<ModuleDescriptor> {
        self.modules.lock().get(module).cloned()
    }

    fn resolve(&self, key: &str) -> Result<(ModuleDescriptor, String), ModuleError> {
        let (module, operation) = key.rsplit_once('/').ok_or("malformed key")?;
        let descriptor = self.descriptor(module).ok_or_else(|| ModuleError::UnknownOperation {
            message: key.to_owned().into(),
            context: None,
        })?;
        Ok((descriptor, operation.to_owned()))
    }
}

fn unknown(key: &str) -> ModuleError {
    ModuleError::UnknownOperation { message: key.to_owned().into(), context: None }
}

impl Host for MockHost {
    fn register_module(&self, name: &str, descriptor: ModuleDescriptor) -> Result<(), ModuleError> {
        self.registrations.lock().push(name.to_owned());
        self.modules.lock().insert(name.to_owned(), descriptor);
        Ok(())
    }

    fn commit(&self, key: &str, args: Args, options: Option<CommitOptions>) -> Result<(), ModuleError> {
        self.commits.lock().push((key.to_owned(), args.clone(), options));
        let (descriptor, operation) = self.resolve(key)?;
        let mutation = descriptor.mutations.get(operation.as_str()).ok_or_else(|| unknown(key))?;
        mutation.call(&descriptor.state, args)
    }

    fn dispatch(&self, key: &str, args: Args) -> Result<(), ModuleError> {
        self.dispatches.lock().push((key.to_owned(), args.clone()));
        let (descriptor, operation) = self.resolve(key)?;
        let action = descriptor.actions.get(operation.as_str()).ok_or_else(|| unknown(key))?;
        action.call(ActionContext { state: Arc::clone(&descriptor.state) }, args).map(drop)
    }

    fn getter(&self, key: &str) -> Result<GetterValue, ModuleError> {
        let (descriptor, operation) = self.resolve(key)?;
        let getter = descriptor.getters.get(operation.as_str()).ok_or_else(|| unknown(key))?;
        getter.call(&descriptor.state)
    }
}

#[derive(Debug, Default)]
pub struct CounterState {
    pub count: i64,
}

/// Written by hand the way `#[store_module]` would expand it.
pub struct Counter {
    pub base: ModuleBase<CounterState>,
}

impl Counter {
    pub fn new(name: &str, host: Arc<dyn Host>) -> Self {
        Self { base: ModuleBase::new(name, CounterState::default(), host) }
    }

    pub fn count(&self) -> Result<i64, ModuleError> {
        self.base.read("count", vec![])
    }

    pub fn plus(&self, n: i64) -> Result<i64, ModuleError> {
        self.base.read("plus", vec![encode(&n)?])
    }

    pub fn add(&self, n: i64) -> Result<i64, ModuleError> {
        self.base.commit("add", vec![encode(&n)?], None)
    }

    pub fn double(&self) -> Result<i64, ModuleError> {
        self.base.dispatch("double", vec![])
    }

    fn count_body(&self) -> i64 {
        self.base.state().count
    }

    fn add_body(&self, n: i64) -> i64 {
        let mut state = self.base.state_mut();
        state.count += n;
        state.count
    }

    fn double_body(&self) -> Result<i64, ModuleError> {
        let current = self.count()?;
        self.add(current)
    }
}

impl StoreModule for Counter {
    type State = CounterState;

    fn base(&self) -> &ModuleBase<CounterState> {
        &self.base
    }

    fn operations() -> Result<OperationTable<Self>, ModuleError> {
        let mut table = OperationTable::new("Counter");
        table.add_getter("count", GetterEntry::accessor("count", |this: &Self| encode(&this.count_body())))?;
        table.add_getter(
            "plus",
            GetterEntry::callable("plus", |this: &Self, args: Args| {
                let n: i64 = ArgReader::new("plus", args).next_arg()?;
                encode(&(this.count_body() + n))
            }),
        )?;
        table.add_mutation(
            "add",
            MutationEntry::new("add", |this: &Self, args: Args| {
                let n: i64 = ArgReader::new("add", args).next_arg()?;
                encode(&this.add_body(n))
            }),
        )?;
        table.add_action("double", ActionEntry::new("double", |this: &Self, _| encode(&this.double_body()?)))?;
        Ok(table)
    }
}

/// Derived module: overrides `add` to count in tens and adds `reset`.
pub struct TenCounter {
    pub parent: Arc<Counter>,
}

impl TenCounter {
    pub fn new(name: &str, host: Arc<dyn Host>) -> Self {
        Self { parent: Arc::new(Counter::new(name, host)) }
    }

    pub fn reset(&self) -> Result<(), ModuleError> {
        self.base().commit("reset", vec![], None)
    }
}

impl StoreModule for TenCounter {
    type State = CounterState;

    fn base(&self) -> &ModuleBase<CounterState> {
        self.parent.base()
    }

    fn operations() -> Result<OperationTable<Self>, ModuleError> {
        let mut table = OperationTable::new("TenCounter");
        table.add_mutation(
            "add",
            MutationEntry::new("add", |this: &Self, args: Args| {
                let n: i64 = ArgReader::new("add", args).next_arg()?;
                encode(&this.parent.add_body(n * 10))
            }),
        )?;
        table.add_mutation(
            "reset",
            MutationEntry::new("reset", |this: &Self, _| {
                this.base().state_mut().count = 0;
                encode(&())
            }),
        )?;
        Ok(table)
    }

    fn lineage() -> Result<Lineage<Self>, ModuleError> {
        Ok(Counter::lineage()?.lift(|this: &Self| &this.parent).derive(Self::operations()?))
    }
}

/// A module whose table is broken: `count` is declared twice.
pub struct Broken {
    pub base: ModuleBase<()>,
}

impl StoreModule for Broken {
    type State = ();

    fn base(&self) -> &ModuleBase<()> {
        &self.base
    }

    fn operations() -> Result<OperationTable<Self>, ModuleError> {
        let mut table = OperationTable::new("Broken");
        table.add_getter("count", GetterEntry::accessor("count", |_: &Self| encode(&1)))?;
        table.add_getter("count", GetterEntry::accessor("count", |_: &Self| encode(&2)))?;
        Ok(table)
    }
}
