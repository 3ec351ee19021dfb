#![allow(dead_code)]

use std::sync::Arc;
use storemod_core::{ModuleBase, ModuleError};
use storemod_derive::store_module;
use storemod_store::Store;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    pub total: i64,
    pub labels: Vec<String>,
}

pub struct TallyModule {
    base: ModuleBase<Tally>,
}

impl TallyModule {
    pub fn new(name: &str, store: &Arc<Store>) -> Self {
        let base = ModuleBase::new(name, Tally::default(), store.clone()).with_tracer(store.tracer());
        Self { base }
    }
}

#[store_module(state = Tally)]
impl TallyModule {
    #[getter]
    pub fn total(&self) -> i64 {
        self.base.state().total
    }

    #[getter]
    pub fn total_plus(&self, extra: i64) -> i64 {
        self.base.state().total + extra
    }

    #[mutation]
    pub fn add(&self, amount: i64, label: Option<String>) -> i64 {
        let mut state = self.base.state_mut();
        state.total += amount;
        state.labels.extend(label);
        state.total
    }

    #[mutation(silent)]
    pub fn reset(&self) {
        *self.base.state_mut() = Tally::default();
    }

    #[action]
    pub fn add_twice(&self, amount: i64) -> Result<i64, ModuleError> {
        self.add(amount, None)?;
        self.add(amount, None)
    }
}

pub fn store(strict: bool) -> Arc<Store> {
    Arc::new(Store::new(storemod_store::StoreConfig { strict, ..Default::default() }))
}
